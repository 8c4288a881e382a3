//! IPC module for daemon-UI communication

mod protocol;
mod server;

pub use protocol::{ComposerStatus, Notification, Request, Response};
pub use server::Server;
