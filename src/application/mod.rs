//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Catalog: The cake card table
//! - Cards: Adaptive card rendering
//! - Services: Turn handling, greeting dialog, console commands
//! - Errors: Domain-specific errors
//! - Messaging: Activity parsing, middleware, dispatching

pub mod cards;
pub mod catalog;
pub mod errors;
pub mod messaging;
pub mod services;
