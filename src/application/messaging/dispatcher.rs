//! Turn dispatcher - Routes activities through middleware to the turn service

use std::sync::Arc;
use crate::domain::entities::{Activity, ActivityType};
use crate::application::errors::BotError;
use crate::application::services::TurnService;
use super::middleware::{TurnContext, Middleware, MiddlewareChain, Next, MiddlewareError};

const RATE_LIMITED_REPLY: &str = "Rate limited. Please try again later.";

/// Routes each inbound activity by type after the middleware chain admits it
pub struct TurnDispatcher {
    middleware: Vec<Arc<dyn Middleware>>,
    turns: TurnService,
}

impl TurnDispatcher {
    pub fn new(turns: TurnService) -> Self {
        Self {
            middleware: Vec::new(),
            turns,
        }
    }

    /// Add middleware to the chain
    pub fn with_middleware<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Append every middleware of a built chain, in order
    pub fn with_chain(mut self, chain: MiddlewareChain) -> Self {
        self.middleware.extend(chain.build());
        self
    }

    pub fn turns(&self) -> &TurnService {
        &self.turns
    }

    /// Process one inbound activity, returns the replies to deliver
    pub async fn process(&self, activity: Activity) -> Result<Vec<Activity>, BotError> {
        let next = Next::new(self.middleware.clone());

        let ctx = match next.run(TurnContext::new(activity.clone())) {
            Ok(ctx) => ctx,
            Err(MiddlewareError::RateLimited { retry_after }) => {
                tracing::debug!("[{}] Rate limited for {:?}", activity.conversation_key(), retry_after);
                return Ok(vec![activity.reply_text(RATE_LIMITED_REPLY)]);
            }
            Err(MiddlewareError::Internal(msg)) => return Err(BotError::Internal(msg)),
        };

        let activity = &ctx.activity;
        match activity.activity_type {
            ActivityType::Message => self.turns.on_message(activity).await,
            ActivityType::ConversationUpdate => self.turns.on_members_added(activity).await,
            ActivityType::Other => {
                tracing::debug!("Ignoring activity of unhandled type in {}", ctx.conversation_key);
                Ok(Vec::new())
            }
        }
    }

    /// Called when replies of a turn could not be delivered
    pub async fn delivery_failed(&self, activity: &Activity, error: &BotError) {
        let key = activity.conversation_key();
        tracing::error!("[{}] Failed to deliver replies: {}", key, error);
        if let Err(e) = self.turns.cancel_dialogs(&key).await {
            tracing::error!("[{}] Failed to cancel dialogs: {}", key, e);
        }
    }
}
