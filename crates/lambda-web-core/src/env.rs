// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;

/// Environment variable set by the Lambda runtime to the directory containing
/// the deployment package. The package tree is read-only at runtime.
pub const ENV_TASK_ROOT: &str = "LAMBDA_TASK_ROOT";

/// Environment variable carrying the name of the executing function.
pub const ENV_FUNCTION_NAME: &str = "AWS_LAMBDA_FUNCTION_NAME";

/// Environment variable carrying the published version of the executing function.
pub const ENV_FUNCTION_VERSION: &str = "AWS_LAMBDA_FUNCTION_VERSION";

/// Environment variable carrying the id of the current invocation.
pub const ENV_REQUEST_ID: &str = "AWS_REQUEST_ID";

/// Snapshot of the Lambda-provided process environment markers.
///
/// Each marker is an explicit `Option`: absent means the host did not provide
/// it, which is never an error. Snapshots are cheap and taken per request so a
/// warm process always tags with the current invocation's values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LambdaEnv {
    pub task_root: Option<String>,
    pub function_name: Option<String>,
    pub function_version: Option<String>,
    pub request_id: Option<String>,
}

impl LambdaEnv {
    /// Reads the Lambda markers from the process environment.
    pub fn from_env() -> Self {
        LambdaEnv {
            task_root: env::var(ENV_TASK_ROOT).ok(),
            function_name: env::var(ENV_FUNCTION_NAME).ok(),
            function_version: env::var(ENV_FUNCTION_VERSION).ok(),
            request_id: env::var(ENV_REQUEST_ID).ok(),
        }
    }

    /// Returns true if this snapshot was taken inside an AWS Lambda function.
    ///
    /// Presence of either marker is sufficient; the values are irrelevant.
    pub fn is_lambda(&self) -> bool {
        self.task_root.is_some() || self.function_name.is_some()
    }
}

/// Returns true if the current process is running inside an AWS Lambda
/// function. Read-only, safe to call repeatedly and concurrently.
pub fn is_lambda_environment() -> bool {
    LambdaEnv::from_env().is_lambda()
}
