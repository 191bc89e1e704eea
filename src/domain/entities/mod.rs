//! Domain entities - Core business objects

pub mod activity;
pub mod card;
pub mod command;
pub mod conversation;
pub mod intent;
pub mod selection;
pub mod user;

pub use activity::{Activity, ActivityType, Attachment, ChannelAccount, ConversationAccount};
pub use card::{CardId, Question};
pub use command::{Command, CommandRegistry, CommandReply};
pub use conversation::{ConversationState, GreetingStep};
pub use intent::{Intent, IntentScore, RecognizerResult};
pub use selection::{CakeKey, CakeSelection, Candle, Color, Shape, Topping};
pub use user::UserProfile;
