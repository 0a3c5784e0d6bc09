//! Settings read from the process environment at cold start.

use std::env;

use tracing::warn;

use crate::{error::AppError, messaging::DEFAULT_LINE_API_ENDPOINT};

pub const CHANNEL_ACCESS_TOKEN_ENV: &str = "LINE_CHANNEL_ACCESS_TOKEN";
pub const CHANNEL_SECRET_ENV: &str = "LINE_CHANNEL_SECRET";
pub const CHANNEL_ACCESS_TOKEN_PARAMETER_ENV: &str = "LINE_CHANNEL_ACCESS_TOKEN_PARAMETER";
pub const CHANNEL_SECRET_PARAMETER_ENV: &str = "LINE_CHANNEL_SECRET_PARAMETER";
pub const PUBLIC_BASE_URL_ENV: &str = "PUBLIC_BASE_URL";
pub const LINE_API_ENDPOINT_ENV: &str = "LINE_API_ENDPOINT";
pub const TABLE_NAME_ENV: &str = "GROUP_URL_TABLE_NAME";

/// Non-secret settings. Secrets go through [`resolve_secret`].
#[derive(Debug, Clone)]
pub struct Settings {
    pub public_base_url: String,
    pub line_api_endpoint: String,
    pub table_name: Option<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self, AppError> {
        let public_base_url = non_empty_var(PUBLIC_BASE_URL_ENV)
            .ok_or_else(|| AppError::Config(format!("missing {PUBLIC_BASE_URL_ENV} env var")))?;
        if !public_base_url.starts_with("http://") && !public_base_url.starts_with("https://") {
            return Err(AppError::Config(format!(
                "{PUBLIC_BASE_URL_ENV} must be an http(s) URL, got `{public_base_url}`"
            )));
        }

        Ok(Self {
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            line_api_endpoint: non_empty_var(LINE_API_ENDPOINT_ENV)
                .unwrap_or_else(|| DEFAULT_LINE_API_ENDPOINT.to_string()),
            table_name: non_empty_var(TABLE_NAME_ENV),
        })
    }
}

/// Resolve a secret, preferring the SSM parameter named by `parameter_var`.
///
/// When the parameter is unset or SSM cannot be reached, falls back to the
/// plain `value_var` environment variable.
pub async fn resolve_secret(
    ssm: &aws_sdk_ssm::Client,
    parameter_var: &str,
    value_var: &str,
) -> Result<String, AppError> {
    if let Some(parameter) = non_empty_var(parameter_var) {
        match ssm
            .get_parameter()
            .name(&parameter)
            .with_decryption(true)
            .send()
            .await
        {
            Ok(resp) => {
                return resp.parameter.and_then(|p| p.value).ok_or_else(|| {
                    AppError::Config(format!("SSM parameter `{parameter}` has no value"))
                })
            }
            Err(err) => warn!(
                %parameter,
                "failed to fetch secret from SSM ({}); falling back to {} env var",
                err,
                value_var
            ),
        }
    }

    non_empty_var(value_var).ok_or_else(|| AppError::Config(format!("missing {value_var} env var")))
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|raw| raw.trim().to_owned())
        .filter(|value| !value.is_empty())
}
