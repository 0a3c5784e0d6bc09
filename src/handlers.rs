use std::sync::Arc;

use lambda_http::{
    http::{Method, StatusCode},
    Body, Error as LambdaError, Request, Response,
};
use tracing::{debug, error, info, warn};

use crate::{
    context::AppContext,
    error::AppError,
    mapping::{GroupUrlMapping, PutOutcome},
    messaging::TextMessage,
    signature::SIGNATURE_HEADER,
    token::{generate_token, TOKEN_LENGTH},
    webhook::{Event, JoinEvent, WebhookPayload},
};

/// Status returned to the platform for one webhook invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookStatus {
    /// Every event was processed or ignored.
    Ok,
    /// Signature missing or invalid, or the signed body is not a webhook envelope.
    Abort,
    /// A downstream collaborator failed.
    Failed,
}

impl WebhookStatus {
    pub fn text(self) -> &'static str {
        match self {
            WebhookStatus::Ok => "OK",
            WebhookStatus::Abort => "Abort",
            WebhookStatus::Failed => "Internal Server Error",
        }
    }

    pub fn status_code(self) -> StatusCode {
        match self {
            WebhookStatus::Ok => StatusCode::OK,
            WebhookStatus::Abort => StatusCode::BAD_REQUEST,
            WebhookStatus::Failed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// What a join event led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    Registered { token: String },
    AlreadyRegistered { token: String },
    /// The source was not a group or room.
    Skipped,
}

/// Top-level request dispatcher used by the Lambda runtime.
pub async fn handle_request(
    ctx: Arc<AppContext>,
    event: Request,
) -> Result<Response<Body>, LambdaError> {
    if *event.method() != Method::POST {
        return Ok(text_response(
            StatusCode::METHOD_NOT_ALLOWED,
            "Method Not Allowed",
        ));
    }

    let signature = event
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    let status = handle_webhook(ctx.as_ref(), event.body().as_ref(), signature).await;

    Ok(text_response(status.status_code(), status.text()))
}

/// Verify, parse and dispatch one webhook body.
pub async fn handle_webhook(
    ctx: &AppContext,
    raw_body: &[u8],
    signature: Option<&str>,
) -> WebhookStatus {
    let Some(signature) = signature else {
        warn!("webhook rejected: missing {SIGNATURE_HEADER} header");
        return WebhookStatus::Abort;
    };
    if !ctx.verifier().verify(raw_body, signature) {
        warn!("webhook rejected: signature mismatch");
        return WebhookStatus::Abort;
    }

    let payload = match WebhookPayload::parse(raw_body) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(error = %err, "signed webhook body could not be parsed");
            return WebhookStatus::Abort;
        }
    };

    debug!(
        destination = payload.destination.as_deref().unwrap_or_default(),
        event_count = payload.events.len(),
        "webhook verified"
    );

    for event in payload.into_events() {
        match event {
            Event::Join(join) => {
                if let Err(err) = handle_join_event(ctx, join).await {
                    error!(category = %err.category(), error = %err, "join event failed");
                    return WebhookStatus::Failed;
                }
            }
            Event::Unsupported => debug!("ignoring unsupported webhook event"),
        }
    }

    WebhookStatus::Ok
}

/// Register a URL for the joined group, or tell the group it already has one.
pub async fn handle_join_event(
    ctx: &AppContext,
    event: JoinEvent,
) -> Result<JoinOutcome, AppError> {
    let Some(group_id) = event.source.chat_id() else {
        warn!("join event without a group or room source");
        return Ok(JoinOutcome::Skipped);
    };

    if let Some(existing) = ctx.store().get(group_id).await? {
        reply_already_registered(ctx, &event, &existing).await?;
        return Ok(JoinOutcome::AlreadyRegistered {
            token: existing.token,
        });
    }

    let mapping = GroupUrlMapping::new(group_id, generate_token(TOKEN_LENGTH));
    match ctx.store().put(&mapping).await? {
        PutOutcome::Created => {
            info!(%group_id, redelivery = event.is_redelivery(), "registered group URL");
            let text = format!(
                "Group ID: {}\nYour group URL: {}",
                mapping.group_id,
                mapping.url(ctx.public_base_url())
            );
            reply(ctx, &event, text).await?;
            Ok(JoinOutcome::Registered {
                token: mapping.token,
            })
        }
        PutOutcome::Exists => {
            // Lost a race with a concurrent join; report the winner's token.
            let existing = ctx.store().get(group_id).await?.ok_or_else(|| {
                AppError::Dynamo(format!("mapping for `{group_id}` vanished after conflict"))
            })?;
            reply_already_registered(ctx, &event, &existing).await?;
            Ok(JoinOutcome::AlreadyRegistered {
                token: existing.token,
            })
        }
    }
}

async fn reply_already_registered(
    ctx: &AppContext,
    event: &JoinEvent,
    existing: &GroupUrlMapping,
) -> Result<(), AppError> {
    info!(group_id = %existing.group_id, "group URL already exists");
    let text = format!(
        "This group already has a registered URL: {}",
        existing.url(ctx.public_base_url())
    );
    reply(ctx, event, text).await
}

async fn reply(ctx: &AppContext, event: &JoinEvent, text: String) -> Result<(), AppError> {
    let Some(reply_token) = event.reply_token.as_deref() else {
        warn!("join event has no reply token; reply skipped");
        return Ok(());
    };
    ctx.messenger()
        .reply_message(reply_token, vec![TextMessage::new(text)])
        .await
}

fn text_response(status: StatusCode, text: &'static str) -> Response<Body> {
    if status.is_server_error() {
        error!(
            http_status = status.as_u16(),
            body = text,
            "returning server error response"
        );
    } else if status.is_client_error() {
        warn!(
            http_status = status.as_u16(),
            body = text,
            "returning client error response"
        );
    }

    let mut response = Response::new(Body::Text(text.to_string()));
    *response.status_mut() = status;
    response.headers_mut().insert(
        lambda_http::http::header::CONTENT_TYPE,
        lambda_http::http::HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
