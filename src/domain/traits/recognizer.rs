use async_trait::async_trait;
use crate::application::errors::RecognizerError;
use crate::domain::entities::RecognizerResult;

/// Recognizer trait - natural-language intent classification
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Provider name, for logs
    fn name(&self) -> &str;

    /// Classify one utterance
    async fn recognize(&self, text: &str) -> Result<RecognizerResult, RecognizerError>;
}
