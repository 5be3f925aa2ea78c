//! The seam between the conversation orchestrator and the remote services.

use crate::error::Result;
use crate::types::{ChatCompletion, ChatCompletionParams, ModerationParams, ModerationResponse};

/// The two remote calls a chat session depends on.
///
/// [`OpenAi`](crate::OpenAi) implements this against the hosted API; tests
/// and alternative backends supply their own.
#[async_trait::async_trait]
pub trait ChatService: Send + Sync {
    /// Classifies `params.input` against the moderation taxonomy.
    async fn moderate(&self, params: ModerationParams) -> Result<ModerationResponse>;

    /// Produces a completion for the given role-tagged messages.
    async fn complete(&self, params: ChatCompletionParams) -> Result<ChatCompletion>;
}
