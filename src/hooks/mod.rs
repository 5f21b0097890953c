//! Hook payload normalization
//!
//! Two external hook ecosystems post JSON to `peekaboo notify --hooks`:
//! Claude Code (keyed by `hook_event_name`) and GitHub Copilot CLI (keyed by
//! `timestamp`, event inferred from field presence). Both are folded into a
//! single [`HooksContext`].

pub mod claude;
pub mod copilot;
pub mod tool_input;

use std::io::{IsTerminal, Read};

use serde_json::{Map, Value};

pub use claude::{ClaudeHookContext, ClaudeHookEvent};
pub use copilot::CopilotHookInput;
pub use tool_input::ToolInput;

/// Hooksのソース
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HooksSource {
    ClaudeCode,
    Copilot,
}

/// 共通イベント種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HooksEvent {
    SessionStart,
    SessionEnd,
    UserPromptSubmit,
    PreToolUse,
    PostToolUse,
    PostToolUseFailure,
    PermissionRequest,
    Notification,
    SubagentStart,
    SubagentStop,
    Stop,
    PreCompact,
    ErrorOccurred,
    Unknown,
}

impl HooksEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            HooksEvent::SessionStart => "sessionStart",
            HooksEvent::SessionEnd => "sessionEnd",
            HooksEvent::UserPromptSubmit => "userPromptSubmit",
            HooksEvent::PreToolUse => "preToolUse",
            HooksEvent::PostToolUse => "postToolUse",
            HooksEvent::PostToolUseFailure => "postToolUseFailure",
            HooksEvent::PermissionRequest => "permissionRequest",
            HooksEvent::Notification => "notification",
            HooksEvent::SubagentStart => "subagentStart",
            HooksEvent::SubagentStop => "subagentStop",
            HooksEvent::Stop => "stop",
            HooksEvent::PreCompact => "preCompact",
            HooksEvent::ErrorOccurred => "errorOccurred",
            HooksEvent::Unknown => "unknown",
        }
    }
}

/// Result of inspecting the top-level keys of a hook payload
#[derive(Debug, Clone, PartialEq)]
pub enum DetectedSchema {
    Claude,
    Copilot(Map<String, Value>),
    Unrecognized,
}

/// Schema markers, checked in order. Claude's marker wins when both are present.
const SCHEMA_MARKERS: &[(&str, HooksSource)] = &[
    ("hook_event_name", HooksSource::ClaudeCode),
    ("timestamp", HooksSource::Copilot),
];

/// JSONのトップレベルキーからスキーマを判定
///
/// Non-objects are unrecognized. An object without any marker is treated as
/// Claude Code, whose decoder then rejects it for lacking an event name.
pub fn detect_schema(json: Value) -> DetectedSchema {
    let Value::Object(map) = json else {
        return DetectedSchema::Unrecognized;
    };

    let source = SCHEMA_MARKERS
        .iter()
        .find(|(key, _)| map.contains_key(*key))
        .map(|(_, source)| *source)
        .unwrap_or(HooksSource::ClaudeCode);

    match source {
        HooksSource::ClaudeCode => DetectedSchema::Claude,
        HooksSource::Copilot => DetectedSchema::Copilot(map),
    }
}

/// 統一されたHooksコンテキスト
#[derive(Debug, Clone, PartialEq)]
pub struct HooksContext {
    pub source: HooksSource,
    pub event: HooksEvent,
    pub cwd: Option<String>,
    pub tool_name: Option<String>,
    pub tool_input: Option<ToolInput>,
    pub error: Option<String>,
    pub message: Option<String>,
    pub user_prompt: Option<String>,
    /// Claude Code 専用の詳細
    pub claude: Option<ClaudeHookContext>,
}

impl From<ClaudeHookContext> for HooksContext {
    fn from(ctx: ClaudeHookContext) -> Self {
        Self {
            source: HooksSource::ClaudeCode,
            event: ctx.event.normalized(),
            cwd: ctx.cwd.clone(),
            tool_name: ctx.tool_name.clone(),
            tool_input: ctx.tool_input.clone(),
            error: ctx.error.clone(),
            message: ctx.message.clone(),
            user_prompt: ctx.user_prompt.clone(),
            claude: Some(ctx),
        }
    }
}

impl HooksContext {
    fn from_copilot(input: CopilotHookInput, event: HooksEvent) -> Self {
        Self {
            source: HooksSource::Copilot,
            event,
            tool_input: input.parsed_tool_args(),
            user_prompt: input.user_prompt(),
            error: input.error.and_then(|e| e.message),
            cwd: input.cwd,
            tool_name: input.tool_name,
            message: None,
            claude: None,
        }
    }

    /// JSONを自動判定して解析。どんな失敗も None になる
    pub fn parse(data: &[u8]) -> Option<Self> {
        let json: Value = serde_json::from_slice(data).ok()?;

        match detect_schema(json) {
            DetectedSchema::Claude => ClaudeHookContext::parse(data).map(Self::from),
            DetectedSchema::Copilot(map) => {
                let event = copilot::infer_event(&map);
                let input: CopilotHookInput = serde_json::from_value(Value::Object(map)).ok()?;
                Some(Self::from_copilot(input, event))
            }
            DetectedSchema::Unrecognized => None,
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        Self::parse(s.as_bytes())
    }

    /// 標準入力からJSONを読み取り解析（TTYの場合は読まない）
    pub fn read_from_stdin() -> Option<Self> {
        Self::parse(&read_stdin_payload()?)
    }

    /// Event name for `$event`: Claude's wire name, or the normalized
    /// camelCase name for Copilot payloads
    pub fn event_name(&self) -> &'static str {
        match &self.claude {
            Some(claude) => claude.event.as_str(),
            None => self.event.as_str(),
        }
    }

    /// イベントに応じたデフォルトメッセージを生成
    pub fn generate_default_message(&self, project_name: Option<&str>, branch: Option<&str>) -> String {
        if let Some(claude) = &self.claude {
            return claude.generate_default_message(project_name, branch);
        }

        let prefix = format_project_info(project_name, branch);
        let tool = self.tool_name.as_deref().unwrap_or("tool");
        let body = match self.event {
            HooksEvent::SessionStart => "Session started!".to_string(),
            HooksEvent::SessionEnd => "Session ended".to_string(),
            HooksEvent::UserPromptSubmit => "Processing prompt...".to_string(),
            HooksEvent::PreToolUse => format!("Running: {}", tool),
            HooksEvent::PostToolUse => format!("Completed: {}", tool),
            HooksEvent::ErrorOccurred => {
                format!("Error: {}", self.error.as_deref().unwrap_or("unknown"))
            }
            _ => "Event".to_string(),
        };
        with_prefix(&prefix, &body)
    }

    pub fn tool_description(&self) -> Option<String> {
        match &self.claude {
            Some(claude) => claude.tool_description(),
            None => self
                .tool_input
                .as_ref()
                .zip(self.tool_name.as_deref())
                .and_then(|(input, name)| input.describe(name)),
        }
    }
}

/// Read stdin to the end unless it is a terminal. Empty input is `None`.
pub fn read_stdin_payload() -> Option<Vec<u8>> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return None;
    }
    let mut buf = Vec::new();
    stdin.read_to_end(&mut buf).ok()?;
    if buf.iter().all(|b| b.is_ascii_whitespace()) {
        return None;
    }
    Some(buf)
}

/// `[name:branch]`、`[name]`、またはプロジェクト名がなければ空
pub(crate) fn format_project_info(project_name: Option<&str>, branch: Option<&str>) -> String {
    match (project_name, branch) {
        (None, _) => String::new(),
        (Some(name), Some(branch)) if !branch.is_empty() => format!("[{}:{}]", name, branch),
        (Some(name), _) => format!("[{}]", name),
    }
}

pub(crate) fn with_prefix(prefix: &str, body: &str) -> String {
    if prefix.is_empty() {
        body.to_string()
    } else {
        format!("{} {}", prefix, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_schema_order() {
        let both: Value =
            serde_json::from_str(r#"{"hook_event_name":"Stop","timestamp":1}"#).unwrap();
        assert_eq!(detect_schema(both), DetectedSchema::Claude);

        let copilot: Value = serde_json::from_str(r#"{"timestamp":1}"#).unwrap();
        assert!(matches!(detect_schema(copilot), DetectedSchema::Copilot(_)));

        let neither: Value = serde_json::from_str(r#"{"cwd":"/p"}"#).unwrap();
        assert_eq!(detect_schema(neither), DetectedSchema::Claude);

        assert_eq!(detect_schema(Value::from(3)), DetectedSchema::Unrecognized);
    }

    #[test]
    fn test_claude_stop_message() {
        let ctx = HooksContext::parse_str(r#"{"hook_event_name":"Stop","cwd":"/p/myproject"}"#)
            .unwrap();
        assert_eq!(ctx.source, HooksSource::ClaudeCode);
        assert_eq!(ctx.event, HooksEvent::Stop);
        assert_eq!(ctx.cwd.as_deref(), Some("/p/myproject"));
        assert_eq!(ctx.event_name(), "Stop");
        assert_eq!(
            ctx.generate_default_message(Some("myproject"), None),
            "[myproject] Done!"
        );
    }

    #[test]
    fn test_claude_question_message() {
        let ctx = HooksContext::parse_str(
            r#"{"hook_event_name":"PreToolUse","tool_name":"AskUserQuestion"}"#,
        )
        .unwrap();
        assert_eq!(ctx.event, HooksEvent::PreToolUse);
        assert_eq!(ctx.tool_name.as_deref(), Some("AskUserQuestion"));
        assert_eq!(
            ctx.generate_default_message(Some("myproject"), Some("feature")),
            "[myproject:feature] Question for you!"
        );
    }

    #[test]
    fn test_copilot_timestamp_only_is_session_end() {
        let ctx = HooksContext::parse_str(r#"{"timestamp":1704614400000,"cwd":"/p"}"#).unwrap();
        assert_eq!(ctx.source, HooksSource::Copilot);
        assert_eq!(ctx.event, HooksEvent::SessionEnd);
        assert_eq!(ctx.event_name(), "sessionEnd");
        assert_eq!(ctx.generate_default_message(Some("p"), Some("")), "[p] Session ended");
    }

    #[test]
    fn test_copilot_fields() {
        let ctx = HooksContext::parse_str(
            r#"{"timestamp":1,"cwd":"/w","toolName":"bash","toolArgs":"{\"command\":\"ls -la\"}"}"#,
        )
        .unwrap();
        assert_eq!(ctx.event, HooksEvent::PreToolUse);
        assert_eq!(ctx.tool_input.as_ref().and_then(|t| t.command.as_deref()), Some("ls -la"));
        // Copilot tool names are lowercase and have no description rule
        assert_eq!(ctx.tool_description(), None);
        assert_eq!(ctx.generate_default_message(None, None), "Running: bash");

        let err = HooksContext::parse_str(
            r#"{"timestamp":1,"error":{"message":"rate limited","name":"Error"}}"#,
        )
        .unwrap();
        assert_eq!(err.event, HooksEvent::ErrorOccurred);
        assert_eq!(err.error.as_deref(), Some("rate limited"));
        assert_eq!(err.generate_default_message(None, None), "Error: rate limited");

        let prompt =
            HooksContext::parse_str(r#"{"timestamp":1,"initialPrompt":"hello"}"#).unwrap();
        assert_eq!(prompt.event, HooksEvent::SessionStart);
        assert_eq!(prompt.user_prompt.as_deref(), Some("hello"));
    }

    #[test]
    fn test_decode_failures_yield_none() {
        assert!(HooksContext::parse(b"").is_none());
        assert!(HooksContext::parse(b"not json").is_none());
        assert!(HooksContext::parse(b"[1,2]").is_none());
        assert!(HooksContext::parse_str(r#"{"cwd":"/p"}"#).is_none());
        // Copilot error must be an object
        assert!(HooksContext::parse_str(r#"{"timestamp":1,"error":"boom"}"#).is_none());
    }

    #[test]
    fn test_format_project_info() {
        assert_eq!(format_project_info(None, Some("main")), "");
        assert_eq!(format_project_info(Some("app"), None), "[app]");
        assert_eq!(format_project_info(Some("app"), Some("")), "[app]");
        assert_eq!(format_project_info(Some("app"), Some("dev")), "[app:dev]");
    }
}
