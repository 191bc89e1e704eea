//! HTTP adapter - Bot Framework style messaging endpoint

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use reqwest::Client;
use serde::Deserialize;

use crate::application::errors::BotError;
use crate::application::messaging::TurnDispatcher;
use crate::domain::entities::Activity;
use crate::domain::traits::{Bot, BotInfo};

/// Shared state for the messaging routes
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<TurnDispatcher>,
    /// Delivers replies for activities that carry a `serviceUrl`
    pub connector: Arc<dyn Bot>,
}

/// POST /api/messages
///
/// Replies are returned in the body when the caller asked for
/// `expectReplies` or gave no `serviceUrl`; otherwise each reply is sent
/// back through the connector and the body is empty.
async fn post_messages(State(state): State<AppState>, Json(activity): Json<Activity>) -> Response {
    let key = activity.conversation_key();

    let replies = match state.dispatcher.process(activity.clone()).await {
        Ok(replies) => replies,
        Err(e) => {
            tracing::error!("[{}] Turn failed: {}", key, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };

    if activity.expects_replies() || activity.service_url.is_none() {
        return Json(serde_json::json!({ "activities": replies })).into_response();
    }

    if let Err(e) = state.connector.send_activities(&replies).await {
        state.dispatcher.delivery_failed(&activity, &e).await;
        return (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response();
    }

    StatusCode::OK.into_response()
}

/// GET /health
async fn health() -> impl IntoResponse {
    "ok"
}

/// Build the bot routes
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/messages", post(post_messages))
        .route("/health", get(health))
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<(), BotError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| BotError::Network(format!("Failed to bind {}: {}", addr, e)))?;
    tracing::info!("Listening on http://{}/api/messages", addr);

    axum::serve(listener, router(state))
        .await
        .map_err(|e| BotError::Network(e.to_string()))
}

/// Connector client - posts replies to the channel's service URL
pub struct ConnectorClient {
    client: Client,
    info: BotInfo,
}

#[derive(Deserialize, Debug, Default)]
struct ResourceResponse {
    #[serde(default)]
    id: String,
}

impl ConnectorClient {
    pub fn new(info: BotInfo) -> Self {
        Self {
            client: Client::new(),
            info,
        }
    }

    fn activity_url(activity: &Activity) -> Option<String> {
        let service_url = activity.service_url.as_deref()?.trim_end_matches('/');
        let conversation = &activity.conversation.id;
        Some(match activity.reply_to_id.as_deref() {
            Some(reply_to) => format!("{}/v3/conversations/{}/activities/{}", service_url, conversation, reply_to),
            None => format!("{}/v3/conversations/{}/activities", service_url, conversation),
        })
    }
}

#[async_trait]
impl Bot for ConnectorClient {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Connector client ready for {}", self.info.name);
        Ok(())
    }

    async fn send_activity(&self, activity: &Activity) -> Result<String, BotError> {
        let url = Self::activity_url(activity)
            .ok_or_else(|| BotError::Delivery("Activity has no service URL".to_string()))?;

        let response = self.client
            .post(&url)
            .json(activity)
            .send()
            .await
            .map_err(|e| BotError::Delivery(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Delivery(format!("status: {}, body: {}", status, body)));
        }

        let resource: ResourceResponse = response.json().await.unwrap_or_default();
        Ok(resource.id)
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests;
