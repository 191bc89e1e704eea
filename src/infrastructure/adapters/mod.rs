//! Channel adapters

pub mod console;
pub mod http;

pub use console::ConsoleAdapter;
pub use http::{router, AppState, ConnectorClient};
