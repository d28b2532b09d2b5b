//! Live reload for the development server.
//!
//! Browsers load `livereload.js`, which connects to a WebSocket server and
//! reloads the page when it receives [`RELOAD_MESSAGE`].

mod server;

pub use server::{RELOAD_MESSAGE, ReloadServer};
