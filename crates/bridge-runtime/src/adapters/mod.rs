//! Host adapters for the outbound ports.
//!
//! - `http`: `Transport` over reqwest for network targets and tokio::fs for
//!   local ones
//! - `clipboard`: `Clipboard` over the host's clipboard command

pub mod clipboard;
pub mod http;

pub use clipboard::{ClipboardCommand, CommandClipboard};
pub use http::{resolve_local, HttpTransport};
