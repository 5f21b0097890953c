//! GitHub Copilot CLI hooks schema
//!
//! Copilot payloads carry no event name. The event is inferred from which
//! keys are present, see [`infer_event`].

use serde::Deserialize;
use serde_json::{Map, Value};

use super::tool_input::ToolInput;
use super::HooksEvent;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CopilotError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub stack: Option<String>,
}

/// GitHub Copilot CLI hooks の入力JSON
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopilotHookInput {
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub cwd: Option<String>,
    /// sessionStart: "new", "resume", "startup"
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub initial_prompt: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub tool_name: Option<String>,
    /// JSON文字列として渡されるツール引数
    #[serde(default)]
    pub tool_args: Option<String>,
    #[serde(default)]
    pub tool_result: Option<Value>,
    #[serde(default)]
    pub error: Option<CopilotError>,
}

impl CopilotHookInput {
    pub fn parsed_tool_args(&self) -> Option<ToolInput> {
        self.tool_args.as_deref().and_then(ToolInput::from_json_str)
    }

    pub fn user_prompt(&self) -> Option<String> {
        self.prompt.clone().or_else(|| self.initial_prompt.clone())
    }
}

/// Inference rules, checked top to bottom. The first matching key wins.
///
/// The order is significant: a payload with both `error` and `toolName` is an
/// error, not a tool call.
const INFERENCE_ORDER: &[(&[&str], HooksEvent)] = &[
    (&["error"], HooksEvent::ErrorOccurred),
    (&["toolResult"], HooksEvent::PostToolUse),
    (&["toolName"], HooksEvent::PreToolUse),
    (&["prompt"], HooksEvent::UserPromptSubmit),
    (&["source", "initialPrompt"], HooksEvent::SessionStart),
];

/// フィールドの有無からイベント種別を推測
///
/// Only the timestamp left means the session ended.
pub fn infer_event(json: &Map<String, Value>) -> HooksEvent {
    INFERENCE_ORDER
        .iter()
        .find(|(keys, _)| keys.iter().any(|k| json.contains_key(*k)))
        .map(|(_, event)| *event)
        .unwrap_or(HooksEvent::SessionEnd)
}
