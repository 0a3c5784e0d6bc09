pub mod runtime_env;

pub mod bootstrap;
pub mod config;
mod context;
mod error;
mod handlers;
pub mod mapping;
pub mod messaging;
pub mod signature;
pub mod token;
pub mod webhook;

pub use context::AppContext;
pub use error::{lambda_error, AppError};
pub use handlers::{handle_join_event, handle_request, handle_webhook, JoinOutcome, WebhookStatus};
