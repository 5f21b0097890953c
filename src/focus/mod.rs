//! Raising the window a notification came from
//!
//! A bubble captures a [`BubbleFocusInfo`] when it is created. Clicking the
//! bubble asks a [`WindowRaiser`] to bring the originating terminal or editor
//! window to the front.

pub mod raiser;
pub mod registry;

use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

pub use raiser::{default_raiser, NoopRaiser, OsascriptRaiser, TmuxRaiser};

/// ウィンドウを前面に出す操作の共通インターフェース
///
/// `app_ids` are the candidate application bundle ids, `title` a substring
/// of the window title (or of the pane path for terminal multiplexers).
pub trait WindowRaiser {
    /// 名前（ログ用）
    fn name(&self) -> &'static str;

    /// 一致するウィンドウを前面に出せたら true
    fn raise(&self, app_ids: &[&str], title: &str) -> bool;
}

/// スレッド間で共有するフォーカス手段
pub type SharedRaiser = Arc<dyn WindowRaiser + Send + Sync>;

/// 別スレッドでフォーカスする
///
/// Raising runs external commands once per candidate app, so it stays off the
/// render loop. Spawn failures are logged and reported as `None`.
pub fn focus_in_background(info: BubbleFocusInfo, raiser: SharedRaiser) -> Option<JoinHandle<bool>> {
    let spawned = thread::Builder::new()
        .name("peekaboo-focus".to_string())
        .spawn(move || info.focus(&*raiser));
    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Failed to spawn focus thread: {}", e);
            None
        }
    }
}

/// Where a bubble should send the user back to when clicked
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BubbleFocusInfo {
    pub cwd: Option<String>,
    pub caller_app: Option<String>,
}

impl BubbleFocusInfo {
    pub fn new(cwd: Option<String>, caller_app: Option<String>) -> Self {
        Self { cwd, caller_app }
    }

    /// 候補アプリのバンドルID一覧を解決
    ///
    /// Falls back to every known terminal and IDE when the caller is absent
    /// or unknown.
    pub fn candidate_app_ids(&self) -> Vec<&'static str> {
        let ids = self
            .caller_app
            .as_deref()
            .map(registry::candidates_for)
            .unwrap_or_default();
        if ids.is_empty() {
            registry::all_bundle_ids()
        } else {
            ids
        }
    }

    /// フォーカスを実行。フルパス一致を試し、だめならフォルダ名で再試行
    pub fn focus(&self, raiser: &dyn WindowRaiser) -> bool {
        let Some(cwd) = self.cwd.as_deref() else {
            debug!("focus skipped: no cwd");
            return false;
        };

        let app_ids = self.candidate_app_ids();
        debug!(
            "focus via {}: cwd={} caller={:?} candidates={:?}",
            raiser.name(),
            cwd,
            self.caller_app,
            app_ids
        );

        if raiser.raise(&app_ids, cwd) {
            return true;
        }

        let dir_name = Path::new(cwd)
            .file_name()
            .map(|n| n.to_string_lossy().to_string());
        match dir_name {
            Some(name) if name != cwd => {
                let raised = raiser.raise(&app_ids, &name);
                if !raised {
                    debug!("focus failed: no window matches {}", name);
                }
                raised
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::sync::{mpsc, Mutex};

    /// Records every raise attempt and succeeds for one title
    #[derive(Default)]
    struct RecordingRaiser {
        accept_title: Option<String>,
        calls: RefCell<Vec<(Vec<String>, String)>>,
    }

    impl WindowRaiser for RecordingRaiser {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn raise(&self, app_ids: &[&str], title: &str) -> bool {
            self.calls.borrow_mut().push((
                app_ids.iter().map(|s| s.to_string()).collect(),
                title.to_string(),
            ));
            self.accept_title.as_deref() == Some(title)
        }
    }

    #[test]
    fn test_no_cwd_does_nothing() {
        let raiser = RecordingRaiser::default();
        let info = BubbleFocusInfo::new(None, Some("iTerm.app".to_string()));
        assert!(!info.focus(&raiser));
        assert!(raiser.calls.borrow().is_empty());
    }

    #[test]
    fn test_full_path_then_basename() {
        let raiser = RecordingRaiser {
            accept_title: Some("myproject".to_string()),
            ..Default::default()
        };
        let info = BubbleFocusInfo::new(
            Some("/Users/a/myproject".to_string()),
            Some("iTerm.app".to_string()),
        );

        assert!(info.focus(&raiser));
        let calls = raiser.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, vec!["com.googlecode.iterm2".to_string()]);
        assert_eq!(calls[0].1, "/Users/a/myproject");
        assert_eq!(calls[1].1, "myproject");
    }

    #[test]
    fn test_full_path_match_stops_early() {
        let raiser = RecordingRaiser {
            accept_title: Some("/w/app".to_string()),
            ..Default::default()
        };
        let info = BubbleFocusInfo::new(Some("/w/app".to_string()), None);
        assert!(info.focus(&raiser));
        assert_eq!(raiser.calls.borrow().len(), 1);
    }

    /// Blocks inside `raise` until the test releases it
    struct GatedRaiser {
        gate: Mutex<mpsc::Receiver<()>>,
        titles: Mutex<Vec<String>>,
    }

    impl WindowRaiser for GatedRaiser {
        fn name(&self) -> &'static str {
            "gated"
        }

        fn raise(&self, _app_ids: &[&str], title: &str) -> bool {
            if let Ok(gate) = self.gate.lock() {
                let _ = gate.recv();
            }
            if let Ok(mut titles) = self.titles.lock() {
                titles.push(title.to_string());
            }
            true
        }
    }

    #[test]
    fn test_background_focus_does_not_block_caller() {
        let (release, gate) = mpsc::channel();
        let raiser = Arc::new(GatedRaiser {
            gate: Mutex::new(gate),
            titles: Mutex::new(Vec::new()),
        });
        let info = BubbleFocusInfo::new(Some("/w/app".to_string()), None);

        // returns while the raise is still blocked
        let handle = focus_in_background(info, raiser.clone()).unwrap();
        assert!(raiser.titles.lock().unwrap().is_empty());

        release.send(()).unwrap();
        assert!(handle.join().unwrap());
        assert_eq!(*raiser.titles.lock().unwrap(), vec!["/w/app".to_string()]);
    }

    #[test]
    fn test_unknown_caller_tries_every_app() {
        let info = BubbleFocusInfo::new(Some("/w".to_string()), Some("emacs".to_string()));
        assert_eq!(info.candidate_app_ids(), registry::all_bundle_ids());

        let none = BubbleFocusInfo::new(Some("/w".to_string()), None);
        assert_eq!(none.candidate_app_ids(), registry::all_bundle_ids());
    }
}
