use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::application::cards::CardRenderer;
use crate::application::errors::BotError;
use crate::application::messaging::TurnDispatcher;
use crate::application::services::TurnService;
use crate::domain::entities::{Activity, ChannelAccount, ConversationAccount, GreetingStep};
use crate::domain::traits::{Bot, BotInfo, StateStore};
use crate::infrastructure::recognizer::KeywordRecognizer;
use crate::infrastructure::storage::MemoryStore;
use super::{router, AppState, ConnectorClient};

/// Connector whose channel is always down
struct UnreachableChannel;

#[async_trait]
impl Bot for UnreachableChannel {
    async fn start(&self) -> Result<(), BotError> {
        Ok(())
    }

    async fn send_activity(&self, _activity: &Activity) -> Result<String, BotError> {
        Err(BotError::Delivery("connection refused".to_string()))
    }

    fn bot_info(&self) -> BotInfo {
        BotInfo { id: "bot".to_string(), name: "bot".to_string() }
    }
}

fn state(store: Arc<MemoryStore>) -> AppState {
    let turns = TurnService::new(
        Arc::new(KeywordRecognizer::new().unwrap()),
        store,
        CardRenderer::new(None, "https://img.example"),
    );
    AppState {
        dispatcher: Arc::new(TurnDispatcher::new(turns)),
        connector: Arc::new(UnreachableChannel),
    }
}

fn post(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/messages")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = router(state(Arc::new(MemoryStore::new())));
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_replies_returned_in_body_without_service_url() {
    let app = router(state(Arc::new(MemoryStore::new())));
    let response = app
        .oneshot(post(json!({
            "type": "message",
            "id": "m1",
            "channelId": "web",
            "from": { "id": "u1" },
            "recipient": { "id": "bot" },
            "conversation": { "id": "c1" },
            "text": "round"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let activities = body["activities"].as_array().unwrap();
    assert_eq!(activities[0]["text"], "You have selected Round shape . Please select the cake colour");
    assert_eq!(activities[0]["replyToId"], "m1");
    assert_eq!(activities[0]["recipient"]["id"], "u1");
    assert_eq!(
        activities[1]["attachments"][0]["contentType"],
        "application/vnd.microsoft.card.adaptive"
    );
}

#[tokio::test]
async fn test_welcome_card_on_conversation_update() {
    let app = router(state(Arc::new(MemoryStore::new())));
    let response = app
        .oneshot(post(json!({
            "type": "conversationUpdate",
            "channelId": "web",
            "recipient": { "id": "bot" },
            "conversation": { "id": "c2" },
            "membersAdded": [{ "id": "bot" }, { "id": "u2" }],
            "deliveryMode": "expectReplies",
            "serviceUrl": "https://channel.example"
        })))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["activities"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delivery_failure_cancels_greeting() {
    let store = Arc::new(MemoryStore::new());
    let app = router(state(store.clone()));

    let response = app
        .oneshot(post(json!({
            "type": "message",
            "channelId": "web",
            "serviceUrl": "https://channel.example",
            "from": { "id": "u3" },
            "recipient": { "id": "bot" },
            "conversation": { "id": "c3" },
            "text": "hello"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let saved = store.load_conversation("web/conversations/c3").await.unwrap().unwrap();
    assert_eq!(saved.greeting, None::<GreetingStep>);
}

#[tokio::test]
async fn test_malformed_activity_is_rejected() {
    let app = router(state(Arc::new(MemoryStore::new())));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/messages")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[test]
fn test_connector_reply_url() {
    let mut activity = Activity::message("web", "c1", ChannelAccount::new("u1"), "hi");
    activity.service_url = Some("https://channel.example/".to_string());
    let reply = activity.reply_text("hello");

    assert_eq!(
        ConnectorClient::activity_url(&reply).unwrap(),
        format!("https://channel.example/v3/conversations/c1/activities/{}", activity.id.clone().unwrap())
    );

    let mut proactive = Activity::default();
    proactive.service_url = Some("https://channel.example".to_string());
    proactive.conversation = ConversationAccount { id: "c9".to_string() };
    assert_eq!(
        ConnectorClient::activity_url(&proactive).unwrap(),
        "https://channel.example/v3/conversations/c9/activities"
    );
}
