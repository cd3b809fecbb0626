// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;

use crate::runtime::RuntimeSettings;

const DEFAULT_HTTP_PORT: u16 = 8000;

/// Settings for the S3-compatible object store used by the connectivity
/// diagnostic. The defaults match a LocalStack container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Custom endpoint for LocalStack or another S3-compatible store;
    /// absent means real AWS.
    pub endpoint: Option<String>,
    pub bucket: String,
}

impl StorageConfig {
    pub fn from_env() -> Self {
        StorageConfig {
            region: env::var("AWS_DEFAULT_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            access_key_id: env::var("AWS_ACCESS_KEY_ID").unwrap_or_else(|_| "test".to_string()),
            secret_access_key: env::var("AWS_SECRET_ACCESS_KEY")
                .unwrap_or_else(|_| "test".to_string()),
            endpoint: env::var("AWS_ENDPOINT_URL").ok(),
            bucket: env::var("AWS_BUCKET").unwrap_or_else(|_| "lambda-web-local".to_string()),
        }
    }
}

/// Cold-start warm-up settings. Carried in config and reported by the
/// diagnostics; the warm-up traffic itself originates outside this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarmupConfig {
    pub enabled: bool,
    pub source: String,
}

impl WarmupConfig {
    fn from_env() -> Self {
        WarmupConfig {
            enabled: env::var("LAMBDA_WARMUP_ENABLED")
                .map(|val| val.to_lowercase() == "true" || val == "1")
                .unwrap_or(false),
            source: env::var("LAMBDA_WARMUP_SOURCE")
                .unwrap_or_else(|_| "serverless-warmup-plugin".to_string()),
        }
    }
}

/// Application configuration, built once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub app_name: String,
    pub app_env: String,
    pub app_debug: bool,
    pub app_url: String,
    pub http_port: u16,
    pub db_connection: String,
    pub session_driver: String,
    pub warmup: WarmupConfig,
    pub storage: StorageConfig,
    pub runtime: RuntimeSettings,
}

impl Config {
    /// Reads the whole configuration from the process environment. Every key
    /// has a default; a malformed port falls back rather than failing boot.
    pub fn from_env() -> Config {
        Config {
            app_name: env::var("APP_NAME").unwrap_or_else(|_| "lambda-web".to_string()),
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "production".to_string()),
            app_debug: env::var("APP_DEBUG")
                .map(|val| val.to_lowercase() == "true" || val == "1")
                .unwrap_or(false),
            app_url: env::var("APP_URL").unwrap_or_else(|_| "http://localhost".to_string()),
            http_port: env::var("PORT")
                .ok()
                .and_then(|port| port.parse::<u16>().ok())
                .unwrap_or(DEFAULT_HTTP_PORT),
            db_connection: env::var("DB_CONNECTION").unwrap_or_else(|_| "sqlite".to_string()),
            session_driver: env::var("SESSION_DRIVER").unwrap_or_else(|_| "file".to_string()),
            warmup: WarmupConfig::from_env(),
            storage: StorageConfig::from_env(),
            runtime: RuntimeSettings::from_env(),
        }
    }
}
