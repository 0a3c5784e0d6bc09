use lambda_http::Error as LambdaError;
use thiserror::Error;
use tracing::error;

/// Internal application errors surfaced during webhook handling.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("dynamodb error: {0}")]
    Dynamo(String),
    #[error("messaging error: {0}")]
    Messaging(String),
    #[error("invalid webhook payload: {0}")]
    Payload(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Short classification string used for logging.
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Dynamo(_) => "dynamodb",
            AppError::Messaging(_) => "messaging",
            AppError::Payload(_) => "payload",
            AppError::Config(_) => "config",
        }
    }
}

/// Convert an internal application error into the Lambda runtime error type.
pub fn lambda_error(err: AppError) -> LambdaError {
    let category = err.category();
    let message = err.to_string();
    error!(
        category = %category,
        error = ?err,
        message = %message,
        "unhandled application error forwarded to Lambda runtime"
    );
    LambdaError::from(message)
}
