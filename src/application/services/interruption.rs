//! Interruption detection - intents that break into whatever is running

use crate::domain::entities::Intent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interruption {
    Cancel,
    Help,
}

/// Only cancel and help interrupt; every other intent flows to the
/// active dialog or the selection flow.
pub fn detect_interruption(intent: Intent) -> Option<Interruption> {
    match intent {
        Intent::Cancel => Some(Interruption::Cancel),
        Intent::Help => Some(Interruption::Help),
        _ => None,
    }
}
