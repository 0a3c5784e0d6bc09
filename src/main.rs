//! Lambda entrypoint.
//!
//! The binary initialises logging, reads configuration, resolves the LINE
//! channel secrets (SSM first, environment as fallback), optionally creates the
//! mapping table locally, and then hands execution to `lambda_http`. The
//! `AppContext` is built once so SDK and HTTP clients are reused across
//! invocations.

use std::sync::Arc;

use aws_sdk_dynamodb::Client;
use lambda_http::{run, service_fn, Error as LambdaError};
use line_group_url_webhook::{
    bootstrap::ensure_mapping_table,
    config::{
        resolve_secret, Settings, CHANNEL_ACCESS_TOKEN_ENV, CHANNEL_ACCESS_TOKEN_PARAMETER_ENV,
        CHANNEL_SECRET_ENV, CHANNEL_SECRET_PARAMETER_ENV,
    },
    handle_request, lambda_error,
    mapping::DynamoMappingStore,
    messaging::LineMessagingClient,
    runtime_env::DeploymentEnv,
    signature::LineSignatureVerifier,
    AppContext,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .json()
        .with_current_span(false)
        .init();

    let environment = DeploymentEnv::detect();
    let settings = Settings::from_env().map_err(lambda_error)?;
    let table_name = settings
        .table_name
        .clone()
        .unwrap_or_else(|| environment.table_name());
    info!(
        environment = environment.name(),
        %table_name,
        resolution = %environment.source(),
        "initialising Lambda runtime"
    );

    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let client = Client::new(&config);

    let bootstrap_tables = std::env::var("BOOTSTRAP_DYNAMODB_TABLES")
        .map(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
        .unwrap_or_else(|_| environment.is_local());

    if bootstrap_tables {
        ensure_mapping_table(&client, &table_name)
            .await
            .map_err(|e| LambdaError::from(format!("failed to ensure DynamoDB table: {e}")))?;
    } else {
        info!(
            environment = environment.name(),
            "skipping DynamoDB table bootstrap"
        );
    }

    let ssm = aws_sdk_ssm::Client::new(&config);
    let channel_secret = resolve_secret(&ssm, CHANNEL_SECRET_PARAMETER_ENV, CHANNEL_SECRET_ENV)
        .await
        .map_err(lambda_error)?;
    let access_token = resolve_secret(
        &ssm,
        CHANNEL_ACCESS_TOKEN_PARAMETER_ENV,
        CHANNEL_ACCESS_TOKEN_ENV,
    )
    .await
    .map_err(lambda_error)?;

    let ctx = Arc::new(AppContext::new(
        Arc::new(LineSignatureVerifier::new(channel_secret)),
        Arc::new(DynamoMappingStore::new(client, table_name)),
        Arc::new(LineMessagingClient::with_endpoint(
            settings.line_api_endpoint.clone(),
            access_token,
        )),
        settings.public_base_url.clone(),
    ));

    run(service_fn(move |event| {
        let ctx = ctx.clone();
        async move { handle_request(ctx, event).await }
    }))
    .await
}
