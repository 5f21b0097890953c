pub mod bubbles;
pub mod config;
pub mod daemon;
pub mod events;
pub mod peek;

pub use bubbles::{Bubble, BubbleId, BubbleQueue};
pub use config::Config;
pub use daemon::{DaemonController, NotificationEnv, SystemEnv};
pub use events::{Action, AppEvent, poll_event};
pub use peek::{next_interval, PeekDirection, PeekPhase, PeekTimeline};
