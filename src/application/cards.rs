//! Card rendering - adaptive card payloads for every `CardId`

use std::collections::HashMap;
use std::path::PathBuf;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::application::errors::BotError;
use crate::domain::entities::CardId;

const ADAPTIVE_CARD_SCHEMA: &str = "http://adaptivecards.io/schemas/adaptive-card.json";

/// Renders cards from template files, falling back to built-in layouts
pub struct CardRenderer {
    directory: Option<PathBuf>,
    image_base_url: String,
    templates: RwLock<HashMap<String, Option<Value>>>,
}

impl CardRenderer {
    pub fn new(directory: Option<PathBuf>, image_base_url: impl Into<String>) -> Self {
        Self {
            directory,
            image_base_url: image_base_url.into().trim_end_matches('/').to_string(),
            templates: RwLock::new(HashMap::new()),
        }
    }

    /// Render `card`; `options` are the choices offered on prompt cards
    pub async fn render(&self, card: CardId, options: &[&str]) -> Result<Value, BotError> {
        let asset = card.asset_name();
        if let Some(template) = self.template(&asset).await? {
            return Ok(template);
        }

        Ok(match card {
            CardId::Welcome => prompt_card(
                &card.title(),
                Some("I can help you design a cake. Pick a shape to get started, or say hello to introduce yourself."),
                options,
            ),
            CardId::Cake(_) => json!({
                "type": "AdaptiveCard",
                "$schema": ADAPTIVE_CARD_SCHEMA,
                "version": "1.0",
                "body": [
                    text_block(&card.title()),
                    {
                        "type": "Image",
                        "url": format!("{}/{}.png", self.image_base_url, asset),
                        "size": "Stretch",
                        "altText": card.title(),
                    }
                ]
            }),
            _ => prompt_card(&card.title(), None, options),
        })
    }

    /// Template file for `asset`, cached after the first read
    async fn template(&self, asset: &str) -> Result<Option<Value>, BotError> {
        let Some(dir) = &self.directory else {
            return Ok(None);
        };

        if let Some(cached) = self.templates.read().await.get(asset) {
            return Ok(cached.clone());
        }

        let path = dir.join(format!("{}.json", asset));
        let loaded = match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                let value: Value = serde_json::from_str(&content)
                    .map_err(|e| BotError::Card(format!("{}: {}", path.display(), e)))?;
                tracing::debug!("Loaded card template {}", path.display());
                Some(value)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(BotError::Card(format!("{}: {}", path.display(), e))),
        };

        self.templates.write().await.insert(asset.to_string(), loaded.clone());
        Ok(loaded)
    }
}

fn text_block(text: &str) -> Value {
    json!({
        "type": "TextBlock",
        "text": text,
        "size": "Medium",
        "weight": "Bolder",
        "wrap": true,
    })
}

fn prompt_card(title: &str, subtitle: Option<&str>, options: &[&str]) -> Value {
    let mut body = vec![text_block(title)];
    if let Some(subtitle) = subtitle {
        body.push(json!({ "type": "TextBlock", "text": subtitle, "wrap": true }));
    }

    let actions: Vec<Value> = options
        .iter()
        .map(|option| json!({
            "type": "Action.Submit",
            "title": option,
            "data": { "choice": option },
        }))
        .collect();

    json!({
        "type": "AdaptiveCard",
        "$schema": ADAPTIVE_CARD_SCHEMA,
        "version": "1.0",
        "body": body,
        "actions": actions,
    })
}

/// Plain-text rendering of a card: first text block plus option titles
pub fn card_summary(card: &Value) -> String {
    let title = card["body"]
        .as_array()
        .and_then(|body| body.iter().find_map(|b| b["text"].as_str()))
        .unwrap_or("[card]");

    let options: Vec<&str> = card["actions"]
        .as_array()
        .map(|actions| actions.iter().filter_map(|a| a["title"].as_str()).collect())
        .unwrap_or_default();

    let image = card["body"]
        .as_array()
        .and_then(|body| body.iter().find(|b| b["type"] == "Image"))
        .and_then(|img| img["url"].as_str());

    let mut out = title.to_string();
    if let Some(url) = image {
        out.push_str(&format!("\n  [Image] {}", url));
    }
    if !options.is_empty() {
        out.push_str(&format!("\n  [Choices] {}", options.join(" | ")));
    }
    out
}
