//! Domain layer - Core business types
//! 
//! This layer contains:
//! - Entities: Activities, intents, cake selections, cards, user profiles
//! - Traits: Abstractions for infrastructure (Bot, Recognizer, StateStore)

pub mod entities;
pub mod traits;
