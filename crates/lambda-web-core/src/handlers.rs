// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use chrono::{SecondsFormat, Utc};
use hyper::{http, Request, StatusCode};
use serde_json::json;
use tracing::error;

use crate::config::Config;
use crate::env::is_lambda_environment;
use crate::http_utils::{
    html_response, json_response, log_and_create_http_response, HttpResponse,
};
use crate::storage::StorageVerifier;
use crate::views;

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const REQUEST_ID_HEADER: &str = "x-request-id";
const DEFAULT_REQUEST_ID: &str = "local-test";

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Liveness payload. The service fields are fixed strings: reaching the
/// handler at all is the signal; no downstream dependency is probed here.
pub fn health(config: &Config) -> http::Result<HttpResponse> {
    json_response(
        StatusCode::OK,
        json!({
            "status": "healthy",
            "environment": config.app_env,
            "timestamp": now_rfc3339(),
            "version": APP_VERSION,
            "services": {
                "database": "connected",
                "cache": "working",
                "storage": "accessible",
            },
        }),
    )
}

/// Identity/echo diagnostic: reflects the request back, including every
/// header, so an operator can see exactly what the function received after
/// the inbound tagging stage.
pub fn lambda_test<B>(config: &Config, req: &Request<B>) -> http::Result<HttpResponse> {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(DEFAULT_REQUEST_ID);
    let headers: serde_json::Map<String, serde_json::Value> = req
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                json!(value.to_str().unwrap_or_default()),
            )
        })
        .collect();

    json_response(
        StatusCode::OK,
        json!({
            "message": "Lambda function is working!",
            "environment": config.app_env,
            "request_id": request_id,
            "timestamp": now_rfc3339(),
            "headers": headers,
            "method": req.method().as_str(),
            "path": req.uri().path(),
        }),
    )
}

/// Smoke test for the serverless wiring: reports whether the detector sees a
/// Lambda host plus the effective runtime tuning.
pub fn serverless_test(config: &Config) -> http::Result<HttpResponse> {
    json_response(
        StatusCode::OK,
        json!({
            "message": "Serverless test endpoint working!",
            "environment": config.app_env,
            "timestamp": now_rfc3339(),
            "is_lambda": is_lambda_environment(),
            "version": APP_VERSION,
            "memory_limit_mb": config.runtime.memory_limit_mb,
            "warmup": {
                "enabled": config.warmup.enabled,
                "source": config.warmup.source,
            },
        }),
    )
}

/// Object-store connectivity diagnostic. One shot: any fault in the sequence
/// becomes a 500 with the error message, never a partial report.
pub async fn aws_test(
    config: &Config,
    storage: &(dyn StorageVerifier + Send + Sync),
) -> http::Result<HttpResponse> {
    let s3_config = json!({
        "region": config.storage.region,
        "endpoint": config.storage.endpoint,
        "bucket": config.storage.bucket,
    });

    match storage.verify().await {
        Ok(report) => json_response(
            StatusCode::OK,
            json!({
                "message": report.message,
                "environment": config.app_env,
                "timestamp": now_rfc3339(),
                "bucket_name": report.bucket_name,
                "endpoint": report.endpoint,
                "test_file_key": report.test_file_key,
                "uploaded_content": report.uploaded_content,
                "downloaded_content": report.downloaded_content,
                "content_match": report.content_match,
                "s3_config": s3_config,
            }),
        ),
        Err(err) => {
            error!("S3 connectivity check failed: {err:#}");
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "S3 connectivity check failed",
                    "message": format!("{err:#}"),
                    "environment": config.app_env,
                    "timestamp": now_rfc3339(),
                    "s3_config": s3_config,
                }),
            )
        }
    }
}

pub fn env_info(config: &Config) -> http::Result<HttpResponse> {
    let ctx = minijinja::context! {
        app_name => config.app_name,
        app_env => config.app_env,
        app_debug => config.app_debug,
        app_url => config.app_url,
        db_connection => config.db_connection,
        cache_driver => config.runtime.cache_driver,
        session_driver => config.session_driver,
        is_lambda => is_lambda_environment(),
        memory_limit_mb => config.runtime.memory_limit_mb,
        version => APP_VERSION,
    };
    match views::render(&config.runtime, "env-info", ctx) {
        Ok(body) => html_response(StatusCode::OK, body),
        Err(err) => log_and_create_http_response(
            &format!("Error rendering environment info page: {err}"),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    }
}

pub fn welcome(config: &Config) -> http::Result<HttpResponse> {
    let ctx = minijinja::context! {
        app_name => config.app_name,
        app_env => config.app_env,
        version => APP_VERSION,
    };
    match views::render(&config.runtime, "welcome", ctx) {
        Ok(body) => html_response(StatusCode::OK, body),
        Err(err) => log_and_create_http_response(
            &format!("Error rendering welcome page: {err}"),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use async_trait::async_trait;
    use http_body_util::BodyExt;
    use hyper::header::CONTENT_TYPE;
    use hyper::{Request, StatusCode};
    use std::path::PathBuf;

    use super::{aws_test, env_info, health, lambda_test, serverless_test, APP_VERSION};
    use crate::config::{Config, StorageConfig, WarmupConfig};
    use crate::http_utils::HttpResponse;
    use crate::runtime::{RuntimeSettings, TemplateCacheSettings};
    use crate::storage::{ConnectivityReport, StorageVerifier};

    fn create_test_config() -> Config {
        Config {
            app_name: "lambda-web".to_string(),
            app_env: "testing".to_string(),
            app_debug: false,
            app_url: "http://localhost".to_string(),
            http_port: 8000,
            db_connection: "sqlite".to_string(),
            session_driver: "file".to_string(),
            warmup: WarmupConfig {
                enabled: false,
                source: "serverless-warmup-plugin".to_string(),
            },
            storage: StorageConfig {
                region: "us-east-1".to_string(),
                access_key_id: "test".to_string(),
                secret_access_key: "test".to_string(),
                endpoint: Some("http://localhost:4566".to_string()),
                bucket: "lambda-web-local".to_string(),
            },
            runtime: RuntimeSettings {
                session_encrypt: true,
                cache_driver: "file".to_string(),
                view_cache_path: PathBuf::from("storage/views"),
                file_cache_path: PathBuf::from("storage/cache"),
                memory_limit_mb: 512,
                tmp_storage: PathBuf::from("/tmp"),
                template_cache: Some(TemplateCacheSettings::default()),
            },
        }
    }

    async fn body_as_json(response: HttpResponse) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    struct OkStorageVerifier;

    #[async_trait]
    impl StorageVerifier for OkStorageVerifier {
        async fn verify(&self) -> anyhow::Result<ConnectivityReport> {
            Ok(ConnectivityReport {
                message: "S3 connectivity check passed".to_string(),
                bucket_name: "lambda-web-local".to_string(),
                endpoint: Some("http://localhost:4566".to_string()),
                test_file_key: "test-files/serverless-test-0.txt".to_string(),
                uploaded_content: "hello".to_string(),
                downloaded_content: "hello".to_string(),
                content_match: true,
            })
        }
    }

    struct FailingStorageVerifier;

    #[async_trait]
    impl StorageVerifier for FailingStorageVerifier {
        async fn verify(&self) -> anyhow::Result<ConnectivityReport> {
            Err(anyhow!("listing buckets: connection refused"))
        }
    }

    #[tokio::test]
    async fn test_health_payload_shape() {
        let response = health(&create_test_config()).unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_as_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["environment"], "testing");
        assert_eq!(body["version"], APP_VERSION);
        assert_eq!(body["services"]["database"], "connected");
        assert_eq!(body["services"]["cache"], "working");
        assert_eq!(body["services"]["storage"], "accessible");
    }

    #[tokio::test]
    async fn test_lambda_test_echoes_request() {
        let request = Request::builder()
            .method("GET")
            .uri("/api/lambda-test")
            .header("x-request-id", "req-42")
            .header("user-agent", "smoke-client")
            .body(())
            .unwrap();

        let response = lambda_test(&create_test_config(), &request).unwrap();
        let body = body_as_json(response).await;

        assert_eq!(body["request_id"], "req-42");
        assert_eq!(body["method"], "GET");
        assert_eq!(body["path"], "/api/lambda-test");
        assert_eq!(body["headers"]["user-agent"], "smoke-client");
    }

    #[tokio::test]
    async fn test_lambda_test_defaults_request_id() {
        let request = Request::builder()
            .method("GET")
            .uri("/api/lambda-test")
            .body(())
            .unwrap();

        let response = lambda_test(&create_test_config(), &request).unwrap();
        let body = body_as_json(response).await;
        assert_eq!(body["request_id"], "local-test");
    }

    #[tokio::test]
    async fn test_serverless_test_reports_runtime_tuning() {
        let response = serverless_test(&create_test_config()).unwrap();
        let body = body_as_json(response).await;

        assert_eq!(body["message"], "Serverless test endpoint working!");
        assert_eq!(body["memory_limit_mb"], 512);
        assert_eq!(body["warmup"]["enabled"], false);
        assert_eq!(body["warmup"]["source"], "serverless-warmup-plugin");
    }

    #[tokio::test]
    async fn test_aws_test_success_payload() {
        let response = aws_test(&create_test_config(), &OkStorageVerifier)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_as_json(response).await;
        assert_eq!(body["content_match"], true);
        assert_eq!(body["uploaded_content"], "hello");
        assert_eq!(body["downloaded_content"], "hello");
        assert_eq!(body["s3_config"]["bucket"], "lambda-web-local");
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_aws_test_failure_is_all_or_nothing() {
        let response = aws_test(&create_test_config(), &FailingStorageVerifier)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_as_json(response).await;
        assert_eq!(body["error"], "S3 connectivity check failed");
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("connection refused"));
        assert!(body.get("downloaded_content").is_none());
        assert_eq!(body["s3_config"]["region"], "us-east-1");
    }

    #[tokio::test]
    async fn test_env_info_renders_html() {
        let response = env_info(&create_test_config()).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/html; charset=utf-8");

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("lambda-web"));
        assert!(html.contains("sqlite"));
    }
}
