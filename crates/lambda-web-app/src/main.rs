// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::{env, sync::Arc};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use lambda_web_core::{
    config::Config, env::is_lambda_environment, server::WebServer, storage::S3StorageVerifier,
};

#[tokio::main]
pub async fn main() {
    let log_level = env::var("LAMBDA_LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or("info".to_string());

    let env_filter = format!(
        "h2=off,hyper=off,aws_config=off,aws_smithy_runtime=off,{}",
        log_level
    );

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");

    let mut config = Config::from_env();

    // One mutation pass over the runtime settings; read-only from here on.
    if is_lambda_environment() {
        debug!("Lambda environment detected, adapting runtime settings");
        config.runtime.adapt_for_serverless();
    }
    if let Err(e) = config.runtime.ensure_directories() {
        error!("Error creating runtime cache directories on startup: {e}");
        return;
    }

    let storage = Arc::new(S3StorageVerifier::new(config.storage.clone()));
    let server = WebServer {
        config: Arc::new(config),
        storage,
    };

    if let Err(e) = server.start().await {
        error!("Error when starting the web server: {e:?}");
    }
}
