//! Claude Code hooks schema
//!
//! Every payload carries `hook_event_name`; unrecognized event names decode
//! to [`ClaudeHookEvent::Unknown`] instead of failing the whole parse.

use serde::Deserialize;

use super::tool_input::ToolInput;
use super::{format_project_info, with_prefix, HooksEvent};

/// Claude Code hooks のイベント種別（12種類 + unknown）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ClaudeHookEvent {
    SessionStart,
    UserPromptSubmit,
    PreToolUse,
    PermissionRequest,
    PostToolUse,
    PostToolUseFailure,
    Notification,
    SubagentStart,
    SubagentStop,
    Stop,
    PreCompact,
    SessionEnd,
    Unknown,
}

impl From<String> for ClaudeHookEvent {
    fn from(value: String) -> Self {
        match value.as_str() {
            "SessionStart" => ClaudeHookEvent::SessionStart,
            "UserPromptSubmit" => ClaudeHookEvent::UserPromptSubmit,
            "PreToolUse" => ClaudeHookEvent::PreToolUse,
            "PermissionRequest" => ClaudeHookEvent::PermissionRequest,
            "PostToolUse" => ClaudeHookEvent::PostToolUse,
            "PostToolUseFailure" => ClaudeHookEvent::PostToolUseFailure,
            "Notification" => ClaudeHookEvent::Notification,
            "SubagentStart" => ClaudeHookEvent::SubagentStart,
            "SubagentStop" => ClaudeHookEvent::SubagentStop,
            "Stop" => ClaudeHookEvent::Stop,
            "PreCompact" => ClaudeHookEvent::PreCompact,
            "SessionEnd" => ClaudeHookEvent::SessionEnd,
            _ => ClaudeHookEvent::Unknown,
        }
    }
}

impl ClaudeHookEvent {
    /// Wire name as sent by Claude Code (`unknown` for the catch-all)
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaudeHookEvent::SessionStart => "SessionStart",
            ClaudeHookEvent::UserPromptSubmit => "UserPromptSubmit",
            ClaudeHookEvent::PreToolUse => "PreToolUse",
            ClaudeHookEvent::PermissionRequest => "PermissionRequest",
            ClaudeHookEvent::PostToolUse => "PostToolUse",
            ClaudeHookEvent::PostToolUseFailure => "PostToolUseFailure",
            ClaudeHookEvent::Notification => "Notification",
            ClaudeHookEvent::SubagentStart => "SubagentStart",
            ClaudeHookEvent::SubagentStop => "SubagentStop",
            ClaudeHookEvent::Stop => "Stop",
            ClaudeHookEvent::PreCompact => "PreCompact",
            ClaudeHookEvent::SessionEnd => "SessionEnd",
            ClaudeHookEvent::Unknown => "unknown",
        }
    }

    /// 共通イベント種別に変換
    pub fn normalized(&self) -> HooksEvent {
        match self {
            ClaudeHookEvent::SessionStart => HooksEvent::SessionStart,
            ClaudeHookEvent::UserPromptSubmit => HooksEvent::UserPromptSubmit,
            ClaudeHookEvent::PreToolUse => HooksEvent::PreToolUse,
            ClaudeHookEvent::PermissionRequest => HooksEvent::PermissionRequest,
            ClaudeHookEvent::PostToolUse => HooksEvent::PostToolUse,
            ClaudeHookEvent::PostToolUseFailure => HooksEvent::PostToolUseFailure,
            ClaudeHookEvent::Notification => HooksEvent::Notification,
            ClaudeHookEvent::SubagentStart => HooksEvent::SubagentStart,
            ClaudeHookEvent::SubagentStop => HooksEvent::SubagentStop,
            ClaudeHookEvent::Stop => HooksEvent::Stop,
            ClaudeHookEvent::PreCompact => HooksEvent::PreCompact,
            ClaudeHookEvent::SessionEnd => HooksEvent::SessionEnd,
            ClaudeHookEvent::Unknown => HooksEvent::Unknown,
        }
    }
}

/// Notification イベントの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    PermissionPrompt,
    IdlePrompt,
    AuthSuccess,
    ElicitationDialog,
}

impl NotificationType {
    fn from_raw(s: &str) -> Option<Self> {
        match s {
            "permission_prompt" => Some(NotificationType::PermissionPrompt),
            "idle_prompt" => Some(NotificationType::IdlePrompt),
            "auth_success" => Some(NotificationType::AuthSuccess),
            "elicitation_dialog" => Some(NotificationType::ElicitationDialog),
            _ => None,
        }
    }
}

/// SessionStart イベントのソース種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStartSource {
    Startup,
    Resume,
    Clear,
    Compact,
}

impl SessionStartSource {
    fn from_raw(s: &str) -> Option<Self> {
        match s {
            "startup" => Some(SessionStartSource::Startup),
            "resume" => Some(SessionStartSource::Resume),
            "clear" => Some(SessionStartSource::Clear),
            "compact" => Some(SessionStartSource::Compact),
            _ => None,
        }
    }
}

/// SessionEnd イベントの終了理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEndReason {
    Clear,
    Logout,
    PromptInputExit,
    BypassPermissionsDisabled,
    Other,
}

impl SessionEndReason {
    fn from_raw(s: &str) -> Option<Self> {
        match s {
            "clear" => Some(SessionEndReason::Clear),
            "logout" => Some(SessionEndReason::Logout),
            "prompt_input_exit" => Some(SessionEndReason::PromptInputExit),
            "bypass_permissions_disabled" => Some(SessionEndReason::BypassPermissionsDisabled),
            "other" => Some(SessionEndReason::Other),
            _ => None,
        }
    }
}

/// PreCompact イベントのトリガー種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactTrigger {
    Manual,
    Auto,
}

impl CompactTrigger {
    fn from_raw(s: &str) -> Option<Self> {
        match s {
            "manual" => Some(CompactTrigger::Manual),
            "auto" => Some(CompactTrigger::Auto),
            _ => None,
        }
    }
}

/// Claude Code hooks の入力JSON（全フィールド）
#[derive(Debug, Clone, Deserialize)]
pub struct ClaudeHookInput {
    pub hook_event_name: ClaudeHookEvent,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub transcript_path: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub permission_mode: Option<String>,

    // Notification
    #[serde(default)]
    pub notification_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub title: Option<String>,

    // Tool events
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub tool_input: Option<ToolInput>,
    #[serde(default)]
    pub tool_response: Option<serde_json::Value>,
    #[serde(default)]
    pub tool_use_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub is_interrupt: Option<bool>,

    // SessionStart
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub agent_type: Option<String>,

    // SessionEnd
    #[serde(default)]
    pub reason: Option<String>,

    // PreCompact
    #[serde(default)]
    pub trigger: Option<String>,
    #[serde(default)]
    pub custom_instructions: Option<String>,

    // Subagent
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub agent_transcript_path: Option<String>,

    // Stop
    #[serde(default)]
    pub stop_hook_active: Option<bool>,

    // UserPromptSubmit
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Claude Code hooks の解析結果
#[derive(Debug, Clone, PartialEq)]
pub struct ClaudeHookContext {
    pub event: ClaudeHookEvent,
    pub cwd: Option<String>,
    pub session_id: Option<String>,
    pub notification_type: Option<NotificationType>,
    pub message: Option<String>,
    pub title: Option<String>,
    pub tool_name: Option<String>,
    pub tool_input: Option<ToolInput>,
    pub error: Option<String>,
    pub is_interrupt: bool,
    pub source: Option<SessionStartSource>,
    pub model: Option<String>,
    pub end_reason: Option<SessionEndReason>,
    pub compact_trigger: Option<CompactTrigger>,
    pub agent_type: Option<String>,
    pub agent_id: Option<String>,
    pub stop_hook_active: bool,
    pub user_prompt: Option<String>,
}

impl From<ClaudeHookInput> for ClaudeHookContext {
    fn from(input: ClaudeHookInput) -> Self {
        Self {
            event: input.hook_event_name,
            cwd: input.cwd,
            session_id: input.session_id,
            notification_type: input
                .notification_type
                .as_deref()
                .and_then(NotificationType::from_raw),
            message: input.message,
            title: input.title,
            tool_name: input.tool_name,
            tool_input: input.tool_input,
            error: input.error,
            is_interrupt: input.is_interrupt.unwrap_or(false),
            source: input.source.as_deref().and_then(SessionStartSource::from_raw),
            model: input.model,
            end_reason: input.reason.as_deref().and_then(SessionEndReason::from_raw),
            compact_trigger: input.trigger.as_deref().and_then(CompactTrigger::from_raw),
            agent_type: input.agent_type,
            agent_id: input.agent_id,
            stop_hook_active: input.stop_hook_active.unwrap_or(false),
            user_prompt: input.prompt,
        }
    }
}

impl ClaudeHookContext {
    /// JSONバイト列から解析（失敗時は None）
    pub fn parse(data: &[u8]) -> Option<Self> {
        serde_json::from_slice::<ClaudeHookInput>(data)
            .ok()
            .map(Self::from)
    }

    /// イベントに応じたデフォルトメッセージを生成
    pub fn generate_default_message(&self, project_name: Option<&str>, branch: Option<&str>) -> String {
        let prefix = format_project_info(project_name, branch);
        let tool = self.tool_name.as_deref();

        let body = match self.event {
            ClaudeHookEvent::SessionStart => match self.source {
                Some(SessionStartSource::Resume) => "Session resumed!".to_string(),
                Some(SessionStartSource::Clear) => "Session cleared!".to_string(),
                Some(SessionStartSource::Compact) => "Context compacted!".to_string(),
                Some(SessionStartSource::Startup) | None => "Session started!".to_string(),
            },
            ClaudeHookEvent::UserPromptSubmit => "Processing prompt...".to_string(),
            ClaudeHookEvent::PreToolUse => {
                if tool == Some("AskUserQuestion") {
                    "Question for you!".to_string()
                } else {
                    format!("Running: {}", tool.unwrap_or("tool"))
                }
            }
            ClaudeHookEvent::PermissionRequest => {
                format!("Permission needed: {}", tool.unwrap_or("action"))
            }
            ClaudeHookEvent::PostToolUse => format!("Completed: {}", tool.unwrap_or("tool")),
            ClaudeHookEvent::PostToolUseFailure => {
                if self.is_interrupt {
                    format!("Interrupted: {}", tool.unwrap_or("tool"))
                } else {
                    format!("Failed: {}", tool.unwrap_or("tool"))
                }
            }
            ClaudeHookEvent::Notification => match self.notification_type {
                Some(NotificationType::PermissionPrompt) => "Permission required!".to_string(),
                Some(NotificationType::IdlePrompt) => "Waiting for input!".to_string(),
                Some(NotificationType::AuthSuccess) => "Authentication successful!".to_string(),
                Some(NotificationType::ElicitationDialog) => "Dialog needed!".to_string(),
                // フック側のメッセージはそのまま（プレフィックスなし）
                None => match &self.message {
                    Some(message) => return message.clone(),
                    None => "Notification".to_string(),
                },
            },
            ClaudeHookEvent::SubagentStart => {
                format!("Agent started: {}", self.agent_type.as_deref().unwrap_or("agent"))
            }
            ClaudeHookEvent::SubagentStop => {
                format!("Agent finished: {}", self.agent_type.as_deref().unwrap_or("agent"))
            }
            ClaudeHookEvent::Stop => {
                if self.stop_hook_active {
                    "Continuing...".to_string()
                } else {
                    "Done!".to_string()
                }
            }
            ClaudeHookEvent::PreCompact => match self.compact_trigger {
                Some(CompactTrigger::Manual) => "Manual compaction...".to_string(),
                Some(CompactTrigger::Auto) => "Auto compaction...".to_string(),
                None => "Compacting...".to_string(),
            },
            ClaudeHookEvent::SessionEnd => match self.end_reason {
                Some(SessionEndReason::Clear) => "Session cleared".to_string(),
                Some(SessionEndReason::Logout) => "Logged out".to_string(),
                _ => "Session ended".to_string(),
            },
            ClaudeHookEvent::Unknown => "Event".to_string(),
        };

        with_prefix(&prefix, &body)
    }

    /// ツール情報の簡潔な説明
    pub fn tool_description(&self) -> Option<String> {
        let tool_name = self.tool_name.as_deref()?;
        self.tool_input.as_ref()?.describe(tool_name)
    }
}
