//! Error taxonomy shared by the notification server and client

use std::io;
use std::path::PathBuf;

/// Failures of the daemon socket layer
///
/// Startup variants (`SocketCreationFailed`, `BindFailed`, `ListenFailed`,
/// `PidFileFailed`, `AlreadyRunning`) are fatal to the daemon. The rest are
/// local to one client call and are never retried.
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("failed to create socket")]
    SocketCreationFailed(#[source] io::Error),

    #[error("failed to bind socket at {}", path.display())]
    BindFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to listen on socket")]
    ListenFailed(#[source] io::Error),

    #[error("failed to write pid file {}", path.display())]
    PidFileFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("daemon is already running")]
    AlreadyRunning,

    #[error("daemon is not running")]
    NotRunning,

    #[error("failed to send notification")]
    SendFailed(#[source] io::Error),

    #[error("failed to encode notification")]
    Encode(#[source] serde_json::Error),

    #[error("invalid response from daemon")]
    InvalidResponse(#[source] serde_json::Error),
}
