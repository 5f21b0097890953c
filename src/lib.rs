pub mod app;
pub mod focus;
pub mod hooks;
pub mod notify;
pub mod system;
pub mod template;
pub mod ui;
