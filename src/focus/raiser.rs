use std::process::{Command, Stdio};
use std::sync::Arc;

use tracing::debug;

use super::{SharedRaiser, WindowRaiser};

/// tmux のウィンドウ切り替えによるフォーカス
///
/// Only works when peekaboo itself runs inside tmux. Application ids are
/// ignored: the pane's current path is matched against the title instead.
pub struct TmuxRaiser;

impl TmuxRaiser {
    pub fn is_available() -> bool {
        std::env::var("TMUX").is_ok()
    }

    /// 全セッションのペインから、パスが一致するウィンドウを検索
    fn find_window(&self, title: &str) -> Option<String> {
        let output = Command::new("tmux")
            .args([
                "list-panes",
                "-a",
                "-F",
                "#{session_name}:#{window_index}\t#{pane_current_path}",
            ])
            .output()
            .ok()
            .filter(|o| o.status.success())?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_pane_target(&stdout, title)
    }
}

/// `list-panes` 出力から、パスに `title` を含む最初のウィンドウを返す
fn parse_pane_target(list_panes: &str, title: &str) -> Option<String> {
    list_panes.lines().find_map(|line| {
        let (target, path) = line.split_once('\t')?;
        path.contains(title).then(|| target.to_string())
    })
}

impl WindowRaiser for TmuxRaiser {
    fn name(&self) -> &'static str {
        "tmux"
    }

    fn raise(&self, _app_ids: &[&str], title: &str) -> bool {
        let Some(target) = self.find_window(title) else {
            return false;
        };

        let switched = Command::new("tmux")
            .args(["switch-client", "-t", &target])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false);
        let selected = Command::new("tmux")
            .args(["select-window", "-t", &target])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false);

        debug!("tmux focus {}: switch={} select={}", target, switched, selected);
        selected
    }
}

/// macOS System Events 経由でウィンドウを前面に出す
pub struct OsascriptRaiser;

impl OsascriptRaiser {
    pub fn is_available() -> bool {
        cfg!(target_os = "macos")
    }
}

fn escape_applescript(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn raise_script(app_id: &str, title: &str) -> String {
    format!(
        r#"tell application "System Events"
    set procs to (every process whose bundle identifier is "{app}")
    repeat with p in procs
        repeat with w in (every window of p)
            if name of w contains "{title}" then
                set frontmost of p to true
                perform action "AXRaise" of w
                return "ok"
            end if
        end repeat
    end repeat
end tell
return "none""#,
        app = escape_applescript(app_id),
        title = escape_applescript(title),
    )
}

impl WindowRaiser for OsascriptRaiser {
    fn name(&self) -> &'static str {
        "osascript"
    }

    fn raise(&self, app_ids: &[&str], title: &str) -> bool {
        app_ids.iter().any(|app_id| {
            let output = Command::new("osascript")
                .args(["-e", &raise_script(app_id, title)])
                .stderr(Stdio::null())
                .output();
            match output {
                Ok(o) if o.status.success() => String::from_utf8_lossy(&o.stdout).trim() == "ok",
                Ok(_) => false,
                Err(e) => {
                    debug!("osascript failed: {}", e);
                    false
                }
            }
        })
    }
}

/// 何もしない（フォーカス手段がない環境用）
pub struct NoopRaiser;

impl WindowRaiser for NoopRaiser {
    fn name(&self) -> &'static str {
        "none"
    }

    fn raise(&self, _app_ids: &[&str], _title: &str) -> bool {
        false
    }
}

/// 実行環境に合ったフォーカス手段を選ぶ
pub fn default_raiser() -> SharedRaiser {
    if TmuxRaiser::is_available() {
        Arc::new(TmuxRaiser)
    } else if OsascriptRaiser::is_available() {
        Arc::new(OsascriptRaiser)
    } else {
        Arc::new(NoopRaiser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pane_target() {
        let output = "main:0\t/home/me\nmain:1\t/home/me/work/myproject\nwork:2\t/srv/myproject-old\n";
        assert_eq!(
            parse_pane_target(output, "/home/me/work/myproject"),
            Some("main:1".to_string())
        );
        assert_eq!(parse_pane_target(output, "myproject"), Some("main:1".to_string()));
        assert_eq!(parse_pane_target(output, "nothing"), None);
        assert_eq!(parse_pane_target("garbage line", "x"), None);
    }

    #[test]
    fn test_script_escapes_quotes() {
        let script = raise_script("com.apple.Terminal", r#"say "hi""#);
        assert!(script.contains(r#"bundle identifier is "com.apple.Terminal""#));
        assert!(script.contains(r#"contains "say \"hi\"""#));
    }

    #[test]
    fn test_noop_never_raises() {
        assert!(!NoopRaiser.raise(&["com.apple.Terminal"], "/tmp"));
    }
}
