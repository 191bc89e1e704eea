//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Storage / Database: Conversation state persistence
//! - Recognizer: LUIS and keyword intent recognition
//! - Adapters: Channel integrations (HTTP, console)
//! - Publish: Deployment upload

pub mod config;
pub mod storage;
pub mod database;
pub mod recognizer;
pub mod adapters;
pub mod publish;
