// Public modules
pub mod chat_completion;
pub mod chat_completion_params;
pub mod chat_message;
pub mod model;
pub mod moderation;
pub mod usage;

// Re-exports
pub use chat_completion::{ChatCompletion, Choice, ResponseMessage};
pub use chat_completion_params::ChatCompletionParams;
pub use chat_message::{ChatMessage, ChatRole};
pub use model::{KnownModel, Model};
pub use moderation::{ModerationCategory, ModerationParams, ModerationResponse, ModerationResult};
pub use usage::Usage;
