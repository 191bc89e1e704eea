//! Domain traits - Abstractions for infrastructure implementations

pub mod bot;
pub mod recognizer;
pub mod store;

pub use bot::{Bot, BotInfo};
pub use recognizer::Recognizer;
pub use store::StateStore;
