use std::collections::HashMap;
use super::selection::{Shape, Color, Topping, Candle};

/// Intent vocabulary understood by the bot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    Cancel,
    Help,
    Shape(Shape),
    Color(Color),
    Topping(Topping),
    Candle(Candle),
    None,
}

impl Intent {
    /// Parse a recognizer label; anything outside the vocabulary is `None`
    pub fn from_label(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "greeting" => return Intent::Greeting,
            "cancel" => return Intent::Cancel,
            "help" => return Intent::Help,
            _ => {}
        }

        if let Some(shape) = Shape::from_label(label) {
            Intent::Shape(shape)
        } else if let Some(color) = Color::from_label(label) {
            Intent::Color(color)
        } else if let Some(topping) = Topping::from_label(label) {
            Intent::Topping(topping)
        } else if let Some(candle) = Candle::from_label(label) {
            Intent::Candle(candle)
        } else {
            Intent::None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Intent::Greeting => "Greeting",
            Intent::Cancel => "Cancel",
            Intent::Help => "Help",
            Intent::Shape(s) => s.as_str(),
            Intent::Color(c) => c.as_str(),
            Intent::Topping(t) => t.as_str(),
            Intent::Candle(c) => c.as_str(),
            Intent::None => "None",
        }
    }

    pub fn is_cake_attribute(&self) -> bool {
        matches!(
            self,
            Intent::Shape(_) | Intent::Color(_) | Intent::Topping(_) | Intent::Candle(_)
        )
    }
}

/// A scored intent label
#[derive(Debug, Clone, PartialEq)]
pub struct IntentScore {
    pub label: String,
    pub score: f32,
}

/// Output of one recognizer call
#[derive(Debug, Clone, Default)]
pub struct RecognizerResult {
    pub text: String,
    pub intents: Vec<IntentScore>,
    pub entities: HashMap<String, Vec<String>>,
}

impl RecognizerResult {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            intents: Vec::new(),
            entities: HashMap::new(),
        }
    }

    pub fn with_intent(mut self, label: impl Into<String>, score: f32) -> Self {
        self.intents.push(IntentScore { label: label.into(), score });
        self
    }

    pub fn with_entity(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.entities.entry(name.into()).or_default().push(value.into());
        self
    }

    /// Highest scoring intent, `None` when nothing beats `min_score`
    pub fn top_intent(&self, min_score: f32) -> Intent {
        self.intents
            .iter()
            .filter(|i| i.score >= min_score)
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .map(|i| Intent::from_label(&i.label))
            .unwrap_or(Intent::None)
    }

    /// First value of the last entity present among `names`, later names win
    pub fn first_entity(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .filter_map(|name| self.entities.get(*name))
            .filter_map(|values| values.first())
            .map(String::as_str)
            .last()
    }
}
