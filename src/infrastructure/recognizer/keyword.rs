//! Keyword recognizer - offline fallback when no LUIS app is configured

use async_trait::async_trait;
use regex_lite::Regex;

use crate::application::errors::RecognizerError;
use crate::application::services::profile_service::{USER_LOCATION_ENTITIES, USER_NAME_ENTITIES};
use crate::domain::entities::RecognizerResult;
use crate::domain::traits::Recognizer;

/// Intent patterns in priority order, earlier rules score higher
const INTENT_RULES: &[(&str, &str)] = &[
    ("Cancel", r"(?i)\b(cancel|stop|never\s*mind|forget it)\b"),
    ("Help", r"(?i)\b(help|what can you do)\b"),
    ("Round", r"(?i)\b(round|circle|circular)\b"),
    ("Rectangle", r"(?i)\b(rectangle|rectangular|square)\b"),
    ("Triangle", r"(?i)\b(triangle|triangular)\b"),
    ("Yellow", r"(?i)\byellow\b"),
    ("Blue", r"(?i)\bblue\b"),
    ("Red", r"(?i)\bred\b"),
    ("White", r"(?i)\bwhite\b"),
    ("Brown", r"(?i)\b(brown|chocolate)\b"),
    ("Cream", r"(?i)\bcream\b"),
    ("Cherries", r"(?i)\bcherr(y|ies)\b"),
    ("Roses", r"(?i)\broses?\b"),
    ("Shells", r"(?i)\bshells?\b"),
    ("Yes", r"(?i)\b(yes|yeah|yep|sure|with a candle)\b"),
    ("No", r"(?i)\b(no|nope|without)\b"),
    ("Greeting", r"(?i)\b(hi|hello|hey|good (morning|afternoon|evening))\b"),
];

const NAME_PATTERN: &str = r"(?i)\b(?:my name is|call me)\s+([a-z][a-z'-]*)";
const CITY_PATTERN: &str = r"(?i)\b(?:live in|i'm from|i am from)\s+([a-z][a-z'-]*(?:\s+[a-z][a-z'-]*){0,2})";

/// Words that follow "my name is" without being a name
const NOT_NAMES: &[&str] = &["not", "a", "the", "what", "and", "so", "just"];

/// A city name ends before any of these
const CLAUSE_WORDS: &[&str] = &["and", "but", "with", "so", "please", "i", "want", "for", "because", "now"];

/// Regex based recognizer
pub struct KeywordRecognizer {
    rules: Vec<(&'static str, Regex)>,
    name: Regex,
    city: Regex,
}

impl KeywordRecognizer {
    pub fn new() -> Result<Self, RecognizerError> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| RecognizerError::Parse(format!("{}: {}", pattern, e)))
        };

        let rules = INTENT_RULES
            .iter()
            .map(|(label, pattern)| compile(*pattern).map(|re| (*label, re)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            rules,
            name: compile(NAME_PATTERN)?,
            city: compile(CITY_PATTERN)?,
        })
    }

    /// Synchronous classification
    pub fn classify(&self, text: &str) -> RecognizerResult {
        let mut result = RecognizerResult::new(text);

        for (index, (label, re)) in self.rules.iter().enumerate() {
            if re.is_match(text) {
                result = result.with_intent(*label, 0.9 - index as f32 * 0.01);
            }
        }

        if let Some(name) = self.capture(&self.name, text).filter(|name| self.is_name(name)) {
            result = result.with_entity(USER_NAME_ENTITIES[0], name);
        }
        if let Some(city) = self.capture(&self.city, text).and_then(|city| city_name(&city)) {
            result = result.with_entity(USER_LOCATION_ENTITIES[0], city);
        }

        if result.intents.is_empty() {
            result = result.with_intent("None", 0.5);
        }
        result
    }

    fn capture(&self, re: &Regex, text: &str) -> Option<String> {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Intent vocabulary ("sure", "round", "hello") is never taken for a name
    fn is_name(&self, word: &str) -> bool {
        !NOT_NAMES.contains(&word.to_lowercase().as_str())
            && !self.rules.iter().any(|(_, re)| re.is_match(word))
    }

    /// Every label this recognizer can emit
    pub fn labels() -> Vec<&'static str> {
        let mut labels: Vec<&'static str> = INTENT_RULES.iter().map(|(label, _)| *label).collect();
        labels.push("None");
        labels
    }
}

/// Leading words of a captured place, up to the first clause word
fn city_name(captured: &str) -> Option<String> {
    let words: Vec<&str> = captured
        .split_whitespace()
        .take_while(|word| !CLAUSE_WORDS.contains(&word.to_lowercase().as_str()))
        .collect();

    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

#[async_trait]
impl Recognizer for KeywordRecognizer {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn recognize(&self, text: &str) -> Result<RecognizerResult, RecognizerError> {
        Ok(self.classify(text))
    }
}
