//! Client for sending notifications to the peekaboo daemon
//!
//! Synchronous and single-shot: every call opens its own connection,
//! writes one request, reads one response and closes.

use std::io::{self, Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::DaemonError;
use super::protocol::{DaemonResponse, NotificationLevel, NotificationMessage, MAX_RESPONSE_BYTES};
use super::DaemonPaths;

#[derive(Debug, Clone)]
pub struct NotifyClient {
    socket_path: PathBuf,
}

impl NotifyClient {
    pub fn new(paths: &DaemonPaths) -> Self {
        Self {
            socket_path: paths.socket_path.clone(),
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Liveness probe: the socket file exists and something accepts on it
    pub fn is_daemon_running(&self) -> bool {
        if !self.socket_path.exists() {
            return false;
        }
        UnixStream::connect(&self.socket_path).is_ok()
    }

    /// Send a notification message to the daemon
    ///
    /// A connection that closes without any response bytes counts as success.
    pub fn send(&self, message: &NotificationMessage) -> Result<DaemonResponse, DaemonError> {
        if !self.socket_path.exists() {
            return Err(DaemonError::NotRunning);
        }

        let mut stream = UnixStream::connect(&self.socket_path).map_err(classify_connect_error)?;

        let payload = message.encode().map_err(DaemonError::Encode)?;
        stream.write_all(&payload).map_err(DaemonError::SendFailed)?;

        let mut buf = [0u8; MAX_RESPONSE_BYTES];
        match stream.read(&mut buf) {
            Ok(0) => Ok(DaemonResponse::ok()),
            Ok(n) => serde_json::from_slice(&buf[..n]).map_err(DaemonError::InvalidResponse),
            Err(e) => {
                debug!("No response from daemon: {}", e);
                Ok(DaemonResponse::ok())
            }
        }
    }

    /// Send a plain text message
    pub fn send_text(
        &self,
        text: &str,
        level: NotificationLevel,
    ) -> Result<DaemonResponse, DaemonError> {
        self.send(&NotificationMessage::text(text, level))
    }
}

fn classify_connect_error(e: io::Error) -> DaemonError {
    match e.kind() {
        io::ErrorKind::NotFound
        | io::ErrorKind::ConnectionRefused
        | io::ErrorKind::PermissionDenied => DaemonError::NotRunning,
        _ => DaemonError::SocketCreationFailed(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::net::UnixListener;
    use tempfile::tempdir;

    #[test]
    fn test_send_notification() {
        let dir = tempdir().unwrap();
        let paths = DaemonPaths::in_dir(dir.path());

        // Start a listener in a thread
        let listener = UnixListener::bind(&paths.socket_path).unwrap();
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = vec![0u8; 65536];
            let n = stream.read(&mut buf).unwrap();
            stream
                .write_all(br#"{"success":false,"error":"busy"}"#)
                .unwrap();
            String::from_utf8(buf[..n].to_vec()).unwrap()
        });

        let client = NotifyClient::new(&paths);
        let response = client.send_text("hello", NotificationLevel::Error).unwrap();

        let received = handle.join().unwrap();
        assert!(received.contains("\"message\":\"hello\""));
        assert!(received.contains("\"level\":\"error\""));
        assert_eq!(response, DaemonResponse::failure("busy"));
    }

    #[test]
    fn test_closed_connection_counts_as_success() {
        let dir = tempdir().unwrap();
        let paths = DaemonPaths::in_dir(dir.path());

        let listener = UnixListener::bind(&paths.socket_path).unwrap();
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = vec![0u8; 1024];
            let _ = stream.read(&mut buf).unwrap();
            // close without answering
        });

        let response = NotifyClient::new(&paths)
            .send_text("quiet", NotificationLevel::Info)
            .unwrap();
        handle.join().unwrap();
        assert!(response.success);
        assert!(response.error.is_none());
    }

    #[test]
    fn test_send_without_socket_is_not_running() {
        let dir = tempdir().unwrap();
        let client = NotifyClient::new(&DaemonPaths::in_dir(dir.path()));

        let err = client
            .send_text("nobody home", NotificationLevel::Info)
            .unwrap_err();
        assert!(matches!(err, DaemonError::NotRunning));
    }

    #[test]
    fn test_liveness_probe() {
        let dir = tempdir().unwrap();
        let paths = DaemonPaths::in_dir(dir.path());
        let client = NotifyClient::new(&paths);

        // no socket file
        assert!(!client.is_daemon_running());

        // live listener
        let listener = UnixListener::bind(&paths.socket_path).unwrap();
        assert!(client.is_daemon_running());

        // stale file left behind by a dead listener
        drop(listener);
        assert!(paths.socket_path.exists());
        assert!(!client.is_daemon_running());
        assert!(matches!(
            client.send_text("stale", NotificationLevel::Info),
            Err(DaemonError::NotRunning)
        ));
    }
}
