use std::{borrow::Cow, env, fmt};

const ENVIRONMENT_NAME_ENV: &str = "ENVIRONMENT_NAME";
const REMOTE_ENVIRONMENT: &str = "Prod";
const LOCAL_ENVIRONMENT: &str = "Local";

/// Variables set by `cargo lambda watch`, SAM local or LocalStack.
const LOCAL_TOOLING_VARS: [&str; 3] = [
    "AWS_SAM_LOCAL",
    "CARGO_LAMBDA_HTTP_PORT",
    "LOCALSTACK_HOSTNAME",
];
/// Variables the Lambda service sets for every function.
const LAMBDA_RUNTIME_VARS: [&str; 3] = [
    "AWS_EXECUTION_ENV",
    "AWS_LAMBDA_FUNCTION_NAME",
    "LAMBDA_TASK_ROOT",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    ExplicitVar,
    LocalTooling,
    LambdaRuntime,
    DefaultLocal,
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResolutionSource::ExplicitVar => "explicit ENVIRONMENT_NAME",
            ResolutionSource::LocalTooling => "local tooling auto-detect",
            ResolutionSource::LambdaRuntime => "Lambda runtime auto-detect",
            ResolutionSource::DefaultLocal => "fallback to Local",
        };
        f.write_str(label)
    }
}

/// Deployment environment the function runs in (Prod, Staging, Local, ...).
///
/// Resolution order: explicit `ENVIRONMENT_NAME`, local tooling hints, Lambda
/// runtime variables, then `Local`.
#[derive(Debug, Clone)]
pub struct DeploymentEnv {
    name: Cow<'static, str>,
    source: ResolutionSource,
}

impl DeploymentEnv {
    pub fn detect() -> Self {
        if let Some(explicit) = env::var(ENVIRONMENT_NAME_ENV)
            .ok()
            .map(|raw| raw.trim().to_owned())
            .filter(|name| !name.is_empty())
        {
            return Self {
                name: Cow::Owned(explicit),
                source: ResolutionSource::ExplicitVar,
            };
        }
        if any_set(&LOCAL_TOOLING_VARS) {
            return Self::fixed(LOCAL_ENVIRONMENT, ResolutionSource::LocalTooling);
        }
        if any_set(&LAMBDA_RUNTIME_VARS) {
            return Self::fixed(REMOTE_ENVIRONMENT, ResolutionSource::LambdaRuntime);
        }
        Self::fixed(LOCAL_ENVIRONMENT, ResolutionSource::DefaultLocal)
    }

    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    pub fn source(&self) -> ResolutionSource {
        self.source
    }

    pub fn is_local(&self) -> bool {
        self.name().eq_ignore_ascii_case(LOCAL_ENVIRONMENT)
    }

    /// Default mapping table for this environment, e.g. `GroupUrls_Prod`.
    pub fn table_name(&self) -> String {
        format!("GroupUrls_{}", self.name())
    }

    fn fixed(name: &'static str, source: ResolutionSource) -> Self {
        Self {
            name: Cow::Borrowed(name),
            source,
        }
    }
}

fn any_set(keys: &[&str]) -> bool {
    keys.iter().any(|key| env::var_os(key).is_some())
}
