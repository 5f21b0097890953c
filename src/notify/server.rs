//! Unix Domain Socket server for receiving notifications
//!
//! Connections are handled strictly one after another: read one request,
//! forward it to the main loop channel, write one response, close.

use std::io;
use std::os::unix::net::UnixListener as StdUnixListener;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::error::DaemonError;
use super::protocol::{DaemonResponse, NotificationMessage, MAX_MESSAGE_BYTES};
use super::DaemonPaths;

/// Handle to the running accept loop
///
/// Dropping the handle stops the server and removes the socket and pid files.
pub struct DaemonServer {
    paths: DaemonPaths,
    running: Arc<AtomicBool>,
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl DaemonServer {
    /// Bind the socket, write the pid marker and spawn the accept loop
    ///
    /// Must be called from within a Tokio runtime context. Decoded messages
    /// are pushed into `tx` in the order their connections were read.
    pub fn start(
        paths: DaemonPaths,
        tx: mpsc::Sender<NotificationMessage>,
    ) -> Result<Self, DaemonError> {
        // A leftover socket from a crashed daemon blocks bind
        remove_if_exists(&paths.socket_path);

        let std_listener = StdUnixListener::bind(&paths.socket_path)
            .map_err(|e| classify_bind_error(&paths.socket_path, e))?;
        std_listener
            .set_nonblocking(true)
            .map_err(DaemonError::ListenFailed)?;
        let listener = UnixListener::from_std(std_listener).map_err(DaemonError::ListenFailed)?;

        if let Err(source) = std::fs::write(&paths.pid_path, std::process::id().to_string()) {
            remove_if_exists(&paths.socket_path);
            return Err(DaemonError::PidFileFailed {
                path: paths.pid_path.clone(),
                source,
            });
        }

        let running = Arc::new(AtomicBool::new(true));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(accept_loop(listener, tx, running.clone(), shutdown_rx));

        info!("Notification server started at: {}", paths.socket_path.display());

        Ok(Self {
            paths,
            running,
            shutdown_tx,
            task: Some(task),
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn paths(&self) -> &DaemonPaths {
        &self.paths
    }

    /// Stop accepting and remove the socket and pid files. Idempotent.
    pub fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        let _ = self.shutdown_tx.send(true);
        remove_if_exists(&self.paths.socket_path);
        remove_if_exists(&self.paths.pid_path);
        info!("Notification server stopped");
    }

    /// Stop and wait until the accept loop has dropped the listener
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Accept loop ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for DaemonServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn accept_loop(
    listener: UnixListener,
    tx: mpsc::Sender<NotificationMessage>,
    running: Arc<AtomicBool>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    debug!("Accept loop started");

    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, _addr)) => {
                    // A silent client must not hold up shutdown
                    tokio::select! {
                        _ = handle_connection(stream, &tx) => {}
                        _ = shutdown_rx.changed() => {
                            debug!("Dropping in-flight connection on shutdown");
                            break;
                        }
                    }
                }
                Err(e) => {
                    // Only the running flag decides whether the loop ends
                    if !running.load(Ordering::SeqCst) {
                        break;
                    }
                    warn!("Failed to accept connection: {}", e);
                }
            },
        }
    }

    debug!("Accept loop stopped");
}

async fn handle_connection(mut stream: UnixStream, tx: &mpsc::Sender<NotificationMessage>) {
    let mut buf = vec![0u8; MAX_MESSAGE_BYTES];

    let response = match stream.read(&mut buf).await {
        Ok(0) => DaemonResponse::failure("No data received"),
        Ok(n) => match NotificationMessage::decode(&buf[..n]) {
            Ok(message) => {
                debug!(
                    "Received notification: message={:?} level={} hooks={}",
                    message.message,
                    message.level.as_str(),
                    message.hooks_json.is_some()
                );
                if tx.send(message).await.is_err() {
                    DaemonResponse::failure("Daemon is shutting down")
                } else {
                    DaemonResponse::ok()
                }
            }
            Err(e) => {
                debug!("Failed to decode message: {}", e);
                DaemonResponse::failure(e.to_string())
            }
        },
        Err(e) => {
            debug!("Failed to read request: {}", e);
            DaemonResponse::failure(format!("Failed to read request: {}", e))
        }
    };

    write_response(&mut stream, &response).await;
}

async fn write_response(stream: &mut UnixStream, response: &DaemonResponse) {
    let Ok(body) = serde_json::to_vec(response) else {
        return;
    };
    // The peer may already be gone; nothing to retry
    if let Err(e) = stream.write_all(&body).await {
        debug!("Failed to write response: {}", e);
    }
}

fn classify_bind_error(path: &Path, e: io::Error) -> DaemonError {
    match e.kind() {
        io::ErrorKind::AddrInUse
        | io::ErrorKind::AddrNotAvailable
        | io::ErrorKind::PermissionDenied
        | io::ErrorKind::NotFound
        | io::ErrorKind::InvalidInput => DaemonError::BindFailed {
            path: path.to_path_buf(),
            source: e,
        },
        _ => DaemonError::SocketCreationFailed(e),
    }
}

fn remove_if_exists(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
    }
}
