use serde::{Deserialize, Serialize};
use std::path::Path;

/// ツール入力の共通構造
///
/// Claude Code の `tool_input` と Copilot CLI の `toolArgs` の両方をカバーする。
/// 未知のキーは無視する。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolInput {
    // Bash
    pub command: Option<String>,
    pub description: Option<String>,
    pub timeout: Option<u64>,
    pub run_in_background: Option<bool>,

    // Write/Edit/Read
    pub file_path: Option<String>,
    pub content: Option<String>,
    pub old_string: Option<String>,
    pub new_string: Option<String>,
    pub replace_all: Option<bool>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,

    // Glob/Grep
    pub pattern: Option<String>,
    pub path: Option<String>,
    pub glob: Option<String>,
    pub output_mode: Option<String>,

    // WebFetch/WebSearch
    pub url: Option<String>,
    pub query: Option<String>,
    pub prompt: Option<String>,

    // Task
    pub subagent_type: Option<String>,
}

const MAX_COMMAND_CHARS: usize = 50;

impl ToolInput {
    /// `toolArgs` のようにJSON文字列で渡された入力を解析
    pub fn from_json_str(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }

    /// ツール名に応じた短い説明
    pub fn describe(&self, tool_name: &str) -> Option<String> {
        match tool_name {
            "Bash" => self.command.as_deref().map(|cmd| {
                if cmd.chars().count() > MAX_COMMAND_CHARS {
                    let short: String = cmd.chars().take(MAX_COMMAND_CHARS - 3).collect();
                    format!("$ {}...", short)
                } else {
                    format!("$ {}", cmd)
                }
            }),
            "Write" | "Edit" | "Read" => self.file_path.as_deref().map(|p| {
                Path::new(p)
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| p.to_string())
            }),
            "Glob" | "Grep" => self.pattern.clone(),
            "WebFetch" => self.url.clone(),
            "WebSearch" => self.query.clone(),
            "Task" => self.subagent_type.clone().or_else(|| self.description.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bash_command_truncation() {
        let short = ToolInput {
            command: Some("cargo test".to_string()),
            ..Default::default()
        };
        assert_eq!(short.describe("Bash").as_deref(), Some("$ cargo test"));

        let long = ToolInput {
            command: Some("x".repeat(60)),
            ..Default::default()
        };
        let desc = long.describe("Bash").unwrap();
        assert_eq!(desc, format!("$ {}...", "x".repeat(47)));
    }

    #[test]
    fn test_file_tools_use_basename() {
        let input = ToolInput {
            file_path: Some("/work/project/src/main.rs".to_string()),
            ..Default::default()
        };
        assert_eq!(input.describe("Edit").as_deref(), Some("main.rs"));
        assert_eq!(input.describe("Unknown"), None);
    }

    #[test]
    fn test_task_prefers_subagent_type() {
        let input: ToolInput = serde_json::from_str(
            r#"{"subagent_type":"Explore","description":"look around","extra":1}"#,
        )
        .unwrap();
        assert_eq!(input.describe("Task").as_deref(), Some("Explore"));

        let input = ToolInput::from_json_str(r#"{"description":"look around"}"#).unwrap();
        assert_eq!(input.describe("Task").as_deref(), Some("look around"));
    }

    #[test]
    fn test_invalid_tool_args() {
        assert!(ToolInput::from_json_str("not json").is_none());
        assert!(ToolInput::from_json_str(r#"{"pattern":"*.rs"}"#).is_some());
    }
}
