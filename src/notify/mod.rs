//! Notification module for the peekaboo daemon
//!
//! This module provides Unix Domain Socket based communication between
//! short-lived client processes (hooks, scripts, CI) and the long-running daemon.

pub mod client;
pub mod error;
pub mod protocol;
pub mod server;

use std::path::{Path, PathBuf};

pub use client::NotifyClient;
pub use error::DaemonError;
pub use protocol::{DaemonResponse, NotificationLevel, NotificationMessage};
pub use server::DaemonServer;

const SOCKET_FILE_NAME: &str = "peekaboo-daemon.sock";
const PID_FILE_NAME: &str = "peekaboo-daemon.pid";

/// Well-known locations of the daemon socket and pid marker
///
/// Computed once at startup and handed to the server and client explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonPaths {
    pub socket_path: PathBuf,
    pub pid_path: PathBuf,
}

impl DaemonPaths {
    /// Paths under the system temp directory
    pub fn from_temp_dir() -> Self {
        Self::in_dir(&std::env::temp_dir())
    }

    /// Paths under an arbitrary directory
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            socket_path: dir.join(SOCKET_FILE_NAME),
            pid_path: dir.join(PID_FILE_NAME),
        }
    }

    /// Pid recorded by the running daemon, if the marker file is readable
    pub fn read_pid(&self) -> Option<u32> {
        std::fs::read_to_string(&self.pid_path)
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }
}

impl Default for DaemonPaths {
    fn default() -> Self {
        Self::from_temp_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_paths_share_directory() {
        let paths = DaemonPaths::in_dir(Path::new("/tmp/x"));
        assert_eq!(paths.socket_path, PathBuf::from("/tmp/x/peekaboo-daemon.sock"));
        assert_eq!(paths.pid_path, PathBuf::from("/tmp/x/peekaboo-daemon.pid"));
    }

    #[test]
    fn test_read_pid() {
        let dir = tempdir().unwrap();
        let paths = DaemonPaths::in_dir(dir.path());
        assert_eq!(paths.read_pid(), None);

        std::fs::write(&paths.pid_path, "4242\n").unwrap();
        assert_eq!(paths.read_pid(), Some(4242));

        std::fs::write(&paths.pid_path, "garbage").unwrap();
        assert_eq!(paths.read_pid(), None);
    }
}
