// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod error;
pub mod observability;
pub mod service;
pub mod types;
pub mod utils;

// Re-exports
pub use client::OpenAi;
pub use client_logger::{ClientLogger, JsonLinesLogger};
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use service::ChatService;
pub use types::*;
