//! LUIS recognizer - v2 prediction endpoint

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::application::errors::{ConfigError, RecognizerError};
use crate::domain::entities::RecognizerResult;
use crate::domain::traits::Recognizer;
use crate::infrastructure::config::LuisConfig;

/// Remote LUIS application
pub struct LuisRecognizer {
    app_id: String,
    endpoint_key: String,
    endpoint: String,
    client: Client,
}

impl LuisRecognizer {
    pub fn new(config: &LuisConfig) -> Result<Self, ConfigError> {
        let app_id = config
            .app_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ConfigError::MissingField("luis.app-id".to_string()))?;
        let endpoint_key = config
            .endpoint_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::MissingField("luis.endpoint-key".to_string()))?;

        Ok(Self {
            app_id,
            endpoint_key,
            endpoint: config.endpoint(),
            client: Client::new(),
        })
    }

    fn prediction_url(&self) -> String {
        format!("{}/luis/v2.0/apps/{}", self.endpoint, self.app_id)
    }
}

/// Prediction response
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PredictionResponse {
    #[serde(default)]
    query: String,
    top_scoring_intent: Option<ScoredIntent>,
    #[serde(default)]
    intents: Vec<ScoredIntent>,
    #[serde(default)]
    entities: Vec<PredictedEntity>,
}

#[derive(Deserialize, Debug)]
struct ScoredIntent {
    intent: String,
    #[serde(default)]
    score: f32,
}

#[derive(Deserialize, Debug)]
struct PredictedEntity {
    entity: String,
    #[serde(rename = "type")]
    entity_type: String,
}

impl PredictionResponse {
    fn into_result(self, text: &str) -> RecognizerResult {
        let query = if self.query.is_empty() { text.to_string() } else { self.query };
        let mut result = RecognizerResult::new(query);

        // Non-verbose responses only carry the top intent
        if self.intents.is_empty() {
            if let Some(top) = self.top_scoring_intent {
                result = result.with_intent(top.intent, top.score);
            }
        } else {
            for intent in self.intents {
                result = result.with_intent(intent.intent, intent.score);
            }
        }

        for entity in self.entities {
            result = result.with_entity(entity.entity_type, entity.entity);
        }
        result
    }
}

#[async_trait]
impl Recognizer for LuisRecognizer {
    fn name(&self) -> &str {
        "luis"
    }

    async fn recognize(&self, text: &str) -> Result<RecognizerResult, RecognizerError> {
        let response = self.client
            .get(self.prediction_url())
            .query(&[
                ("subscription-key", self.endpoint_key.as_str()),
                ("verbose", "true"),
                ("timezoneOffset", "0"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| RecognizerError::Network(e.to_string()))?;

        if response.status() == 429 {
            return Err(RecognizerError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RecognizerError::Api(format!("status: {}, body: {}", status, body)));
        }

        let prediction: PredictionResponse = response
            .json()
            .await
            .map_err(|e| RecognizerError::Parse(e.to_string()))?;

        Ok(prediction.into_result(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Intent, Shape};

    const VERBOSE: &str = r#"{
        "query": "round one please, my name is sam",
        "topScoringIntent": { "intent": "Round", "score": 0.92 },
        "intents": [
            { "intent": "Round", "score": 0.92 },
            { "intent": "Greeting", "score": 0.31 },
            { "intent": "None", "score": 0.02 }
        ],
        "entities": [
            { "entity": "sam", "type": "userName", "startIndex": 29, "endIndex": 31, "score": 0.88 }
        ]
    }"#;

    #[test]
    fn test_parse_verbose_prediction() {
        let prediction: PredictionResponse = serde_json::from_str(VERBOSE).unwrap();
        let result = prediction.into_result("ignored");

        assert_eq!(result.text, "round one please, my name is sam");
        assert_eq!(result.intents.len(), 3);
        assert_eq!(result.top_intent(0.5), Intent::Shape(Shape::Round));
        assert_eq!(result.first_entity(&["userName"]), Some("sam"));
    }

    #[test]
    fn test_parse_top_intent_only() {
        let json = r#"{ "query": "", "topScoringIntent": { "intent": "Cancel", "score": 0.7 } }"#;
        let prediction: PredictionResponse = serde_json::from_str(json).unwrap();
        let result = prediction.into_result("stop");

        assert_eq!(result.text, "stop");
        assert_eq!(result.top_intent(0.0), Intent::Cancel);
        assert!(result.entities.is_empty());
    }

    #[test]
    fn test_requires_app_id_and_key() {
        let mut config = LuisConfig::default();
        assert!(matches!(LuisRecognizer::new(&config), Err(ConfigError::MissingField(_))));

        config.app_id = Some("app".to_string());
        assert!(matches!(LuisRecognizer::new(&config), Err(ConfigError::MissingField(f)) if f == "luis.endpoint-key"));

        config.endpoint_key = Some("key".to_string());
        config.region = Some("westeurope".to_string());
        let recognizer = LuisRecognizer::new(&config).unwrap();
        assert_eq!(
            recognizer.prediction_url(),
            "https://westeurope.api.cognitive.microsoft.com/luis/v2.0/apps/app"
        );
    }
}
