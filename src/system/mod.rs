//! Thin wrappers around the host system: git metadata, the calling
//! terminal, sound playback.

pub mod git;
pub mod process;
pub mod sound;

pub use git::GitInfo;
pub use process::detect_caller_app;

use std::path::PathBuf;

/// `~/` で始まるパスをホームディレクトリに展開
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = || directories::BaseDirs::new().map(|base| base.home_dir().to_path_buf());
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = home() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = home() {
            return home;
        }
    }
    PathBuf::from(path)
}
