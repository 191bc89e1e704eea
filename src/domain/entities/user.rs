use serde::{Deserialize, Serialize};
use std::fmt;

/// What the bot remembers about a user across conversations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: Option<String>,
    pub city: Option<String>,
}

impl UserProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| "friend".to_string())
    }
}

impl fmt::Display for UserProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, &self.city) {
            (Some(name), Some(city)) => write!(f, "{} from {}", name, city),
            (Some(name), None) => write!(f, "{}", name),
            (None, Some(city)) => write!(f, "someone from {}", city),
            (None, None) => write!(f, "unknown user"),
        }
    }
}

/// Upper-case the first character, leave the rest untouched
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
