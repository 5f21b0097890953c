use std::process::{Command, Stdio};

use tracing::{debug, warn};

/// 音声ファイルを再生するコマンド
#[cfg(target_os = "macos")]
const PLAYER: &str = "afplay";
#[cfg(not(target_os = "macos"))]
const PLAYER: &str = "paplay";

/// 音声ファイルを再生（完了を待たない）
///
/// Returns false when the file is missing or the player cannot be spawned.
pub fn play(path: &str) -> bool {
    let path = super::expand_tilde(path);
    if !path.exists() {
        warn!("Sound file not found: {}", path.display());
        return false;
    }

    match Command::new(PLAYER)
        .arg(&path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(mut child) => {
            debug!("Playing {} with {} (pid {})", path.display(), PLAYER, child.id());
            // reap in the background
            std::thread::spawn(move || {
                let _ = child.wait();
            });
            true
        }
        Err(e) => {
            warn!("Failed to start {}: {}", PLAYER, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_not_played() {
        assert!(!play("/definitely/not/here.aiff"));
    }
}
