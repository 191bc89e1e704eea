use serde::{Deserialize, Serialize};
use super::selection::CakeSelection;

/// Step the greeting dialog is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GreetingStep {
    AskName,
    AskCity,
}

/// Everything the bot keeps for one conversation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    #[serde(default)]
    pub selection: CakeSelection,
    #[serde(default)]
    pub greeting: Option<GreetingStep>,
}

impl ConversationState {
    pub fn has_active_dialog(&self) -> bool {
        self.greeting.is_some()
    }

    /// Whether there is anything a cancel would discard
    pub fn is_idle(&self) -> bool {
        !self.has_active_dialog() && self.selection.is_empty()
    }

    pub fn cancel_all(&mut self) {
        self.greeting = None;
        self.selection.clear();
    }
}
