//! Answer model abstraction

use crate::domain::Result;
use async_trait::async_trait;

/// Produces an answer from retrieved context and a question
///
/// Both inputs are already anonymized; the answer is deanonymized by the
/// caller.
#[async_trait]
pub trait AnswerModel: Send + Sync {
    async fn answer(&self, context: &str, question: &str) -> Result<String>;

    /// Identifier used in logs
    fn model_id(&self) -> &str;
}
