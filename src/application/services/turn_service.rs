//! Turn service - the per-turn driver
//!
//! One message turn: recognize, update the profile from entities, handle
//! interruptions, then either continue the greeting dialog or advance the
//! cake selection. Conversation state and the user's profile are loaded and
//! saved around the turn under the conversation's lock, then the user's.

use std::sync::Arc;

use crate::application::cards::CardRenderer;
use crate::application::catalog::{CakeCatalog, SelectionOutcome};
use crate::application::errors::BotError;
use crate::application::messaging::parser::ActivityParser;
use crate::domain::entities::{
    Activity, CardId, ConversationState, Intent, Question, RecognizerResult,
};
use crate::domain::traits::{Recognizer, StateStore};
use super::greeting;
use super::interruption::{detect_interruption, Interruption};
use super::locks::ConversationLocks;
use super::profile_service::apply_entities;

const NOT_UNDERSTOOD: &str = "I didn't understand what you just said to me.";

/// Handles message and membership turns
pub struct TurnService {
    recognizer: Arc<dyn Recognizer>,
    store: Arc<dyn StateStore>,
    catalog: &'static CakeCatalog,
    cards: CardRenderer,
    parser: ActivityParser,
    locks: ConversationLocks,
    min_score: f32,
}

impl TurnService {
    pub fn new(
        recognizer: Arc<dyn Recognizer>,
        store: Arc<dyn StateStore>,
        cards: CardRenderer,
    ) -> Self {
        Self {
            recognizer,
            store,
            catalog: CakeCatalog::standard(),
            cards,
            parser: ActivityParser::new("/"),
            locks: ConversationLocks::new(),
            min_score: 0.0,
        }
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    /// Greet every added member that is not the bot itself
    pub async fn on_members_added(&self, activity: &Activity) -> Result<Vec<Activity>, BotError> {
        let mut replies = Vec::new();
        for member in &activity.members_added {
            if member.id == activity.recipient.id {
                continue;
            }
            tracing::info!("Welcoming {} to {}", member.id, activity.conversation_key());
            let shapes = self.catalog.options(Question::Shape, &Default::default());
            let card = self.cards.render(CardId::Welcome, &shapes).await?;
            replies.push(activity.reply_card(card));
        }
        Ok(replies)
    }

    /// Run one message turn
    pub async fn on_message(&self, activity: &Activity) -> Result<Vec<Activity>, BotError> {
        let Some(text) = self.parser.utterance(activity) else {
            tracing::debug!("Ignoring message without text in {}", activity.conversation_key());
            return Ok(Vec::new());
        };

        let conversation_key = activity.conversation_key();
        let user_key = activity.user_key();
        // Always conversation first, then user
        let _conversation = self.locks.lock(&conversation_key).await;
        let _user = self.locks.lock(&user_key).await;

        let mut state = self.store.load_conversation(&conversation_key).await?.unwrap_or_default();
        let loaded_profile = self.store.load_profile(&user_key).await?.unwrap_or_default();
        let mut profile = loaded_profile.clone();

        let result = self.recognize(&text).await;
        let intent = result.top_intent(self.min_score);
        tracing::info!("[{}] '{}' -> {}", conversation_key, text, intent.label());

        let captured = apply_entities(&result, &mut profile);
        let mut replies = Vec::new();

        match detect_interruption(intent) {
            Some(Interruption::Cancel) => {
                if state.is_idle() {
                    replies.push(activity.reply_text("I don't have anything to cancel."));
                } else {
                    state.cancel_all();
                    replies.push(activity.reply_text("Ok.  I've cancelled our last activity."));
                }
            }
            Some(Interruption::Help) => {
                replies.push(activity.reply_text("Let me try to provide some help."));
                replies.push(activity.reply_text(
                    "I understand greetings, being asked for help, or being asked to cancel what I am doing.",
                ));
                replies.push(activity.reply_text(
                    "To order a cake, pick a shape, a colour, a topping and whether you want a candle.",
                ));
                if let Some(step) = state.greeting {
                    replies.push(activity.reply_text(greeting::reprompt(step, &profile)));
                } else if !state.selection.is_empty() {
                    if let Some(question) = self.catalog.next_question(&state.selection) {
                        replies.push(self.question_card(activity, question, &state).await?);
                    }
                }
            }
            None => {
                if let Some(step) = state.greeting {
                    let turn = greeting::continue_dialog(step, &text, captured, &mut profile);
                    state.greeting = turn.next;
                    replies.extend(turn.replies.into_iter().map(|r| activity.reply_text(r)));
                } else if intent.is_cake_attribute() {
                    self.select(activity, intent, &mut state, &mut replies).await?;
                } else if intent == Intent::Greeting {
                    let turn = greeting::begin(&profile);
                    state.greeting = turn.next;
                    replies.extend(turn.replies.into_iter().map(|r| activity.reply_text(r)));
                } else {
                    replies.push(activity.reply_text(NOT_UNDERSTOOD));
                }
            }
        }

        self.store.save_conversation(&conversation_key, &state).await?;
        if profile != loaded_profile {
            self.store.save_profile(&user_key, &profile).await?;
        }

        Ok(replies)
    }

    /// Drop the active dialog of a conversation, used when replies could not be delivered
    pub async fn cancel_dialogs(&self, conversation_key: &str) -> Result<(), BotError> {
        let _guard = self.locks.lock(conversation_key).await;
        if let Some(mut state) = self.store.load_conversation(conversation_key).await? {
            if state.greeting.take().is_some() {
                tracing::warn!("Cancelled active dialog in {}", conversation_key);
                self.store.save_conversation(conversation_key, &state).await?;
            }
        }
        Ok(())
    }

    /// Forget everything about a conversation
    pub async fn reset(&self, conversation_key: &str) -> Result<(), BotError> {
        let _guard = self.locks.lock(conversation_key).await;
        self.store.delete_conversation(conversation_key).await?;
        Ok(())
    }

    async fn recognize(&self, text: &str) -> RecognizerResult {
        match self.recognizer.recognize(text).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("{} recognizer failed: {}", self.recognizer.name(), e);
                RecognizerResult::new(text)
            }
        }
    }

    async fn select(
        &self,
        activity: &Activity,
        intent: Intent,
        state: &mut ConversationState,
        replies: &mut Vec<Activity>,
    ) -> Result<(), BotError> {
        match self.catalog.apply(&mut state.selection, intent) {
            SelectionOutcome::Ask(question) => {
                if let (Intent::Shape(shape), Question::Color) = (intent, question) {
                    replies.push(activity.reply_text(format!(
                        "You have selected {} shape . Please select the cake colour",
                        shape
                    )));
                }
                replies.push(self.question_card(activity, question, state).await?);
            }
            SelectionOutcome::Complete(key) => match self.catalog.lookup(&key) {
                Some(card) => {
                    tracing::info!("[{}] Serving {}", activity.conversation_key(), card.asset_name());
                    replies.push(activity.reply_card(self.cards.render(card, &[]).await?));
                }
                None => {
                    replies.push(activity.reply_text("Sorry, we don't have a picture of that cake."));
                }
            },
            SelectionOutcome::Missing(question) => {
                replies.push(activity.reply_text(format!("Please choose a {} first.", question.field())));
                replies.push(self.question_card(activity, question, state).await?);
            }
            SelectionOutcome::Unavailable { question, value } => {
                replies.push(activity.reply_text(format!(
                    "Sorry, {} is not available as a {} for this cake.",
                    value,
                    question.field()
                )));
                replies.push(self.question_card(activity, question, state).await?);
            }
        }
        Ok(())
    }

    async fn question_card(
        &self,
        activity: &Activity,
        question: Question,
        state: &ConversationState,
    ) -> Result<Activity, BotError> {
        let options = self.catalog.options(question, &state.selection);
        let card = self.cards.render(question.card(), &options).await?;
        Ok(activity.reply_card(card))
    }
}
