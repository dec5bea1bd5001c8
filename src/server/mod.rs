// Server module entry point
// Listener startup, the accept loop, per-connection serving, and shutdown signals

pub mod connection;
pub mod lifecycle;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module file is mapped to another name
#[path = "loop.rs"]
pub mod server_loop;

pub use lifecycle::{FilesLister, Running};
pub use listener::create_listener;
