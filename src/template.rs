//! Message template expansion
//!
//! Recognized tokens: `$dir`, `$branch`, `$cwd`, `$event`, `$tool`.
//! Tokens are plain literals: `$direction` expands `$dir` and keeps `ection`.
//! Substituted values are never scanned again.

use std::path::Path;

/// テンプレート展開用のコンテキスト
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext {
    pub cwd: Option<String>,
    /// `cwd` の最後のパス要素
    pub directory_name: Option<String>,
    pub branch: Option<String>,
    pub event_name: Option<String>,
    pub tool_name: Option<String>,
}

impl TemplateContext {
    pub fn new(
        cwd: Option<String>,
        branch: Option<String>,
        event_name: Option<String>,
        tool_name: Option<String>,
    ) -> Self {
        let directory_name = cwd.as_deref().map(last_component);
        Self {
            cwd,
            directory_name,
            branch,
            event_name,
            tool_name,
        }
    }

    fn value(&self, token: Token) -> &str {
        let value = match token {
            Token::Dir => &self.directory_name,
            Token::Branch => &self.branch,
            Token::Cwd => &self.cwd,
            Token::Event => &self.event_name,
            Token::Tool => &self.tool_name,
        };
        value.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy)]
enum Token {
    Dir,
    Branch,
    Cwd,
    Event,
    Tool,
}

const TOKENS: &[(&str, Token)] = &[
    ("$dir", Token::Dir),
    ("$branch", Token::Branch),
    ("$cwd", Token::Cwd),
    ("$event", Token::Event),
    ("$tool", Token::Tool),
];

/// テンプレート変数を展開。値がない変数は空文字になる
pub fn expand(template: &str, context: &TemplateContext) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        match TOKENS.iter().find(|(literal, _)| tail.starts_with(literal)) {
            Some((literal, token)) => {
                out.push_str(context.value(*token));
                rest = &tail[literal.len()..];
            }
            None => {
                out.push('$');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// `"/"` のようにファイル名を持たないパスはそのまま返す
fn last_component(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_context() -> TemplateContext {
        TemplateContext::new(
            Some("/Users/a/myproject".to_string()),
            Some("feature/x".to_string()),
            Some("Notification".to_string()),
            Some("Bash".to_string()),
        )
    }

    #[test]
    fn test_expand_all_tokens() {
        assert_eq!(
            expand("[$dir:$branch] $event - $tool", &full_context()),
            "[myproject:feature/x] Notification - Bash"
        );
        assert_eq!(expand("in $cwd", &full_context()), "in /Users/a/myproject");
    }

    #[test]
    fn test_no_tokens_is_verbatim() {
        let ctx = full_context();
        for template in ["plain text", "costs $5", "$", "trailing $", "$$", "$unknown token"] {
            assert_eq!(expand(template, &ctx), template);
        }
    }

    #[test]
    fn test_missing_values_become_empty() {
        let ctx = TemplateContext::default();
        assert_eq!(expand("[$dir:$branch] $event", &ctx), "[:] ");
    }

    #[test]
    fn test_repeated_tokens() {
        assert_eq!(expand("$tool/$tool/$tool", &full_context()), "Bash/Bash/Bash");
    }

    #[test]
    fn test_token_is_a_literal_prefix() {
        assert_eq!(expand("$direction", &full_context()), "myprojectection");
    }

    #[test]
    fn test_values_are_not_reexpanded() {
        let ctx = TemplateContext::new(
            Some("/tmp/$branch".to_string()),
            Some("main".to_string()),
            None,
            None,
        );
        assert_eq!(expand("$dir", &ctx), "$branch");
    }

    #[test]
    fn test_directory_name() {
        assert_eq!(full_context().directory_name.as_deref(), Some("myproject"));
        let root = TemplateContext::new(Some("/".to_string()), None, None, None);
        assert_eq!(root.directory_name.as_deref(), Some("/"));
    }
}
