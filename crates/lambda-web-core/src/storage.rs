// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::debug;

use crate::config::StorageConfig;

const TEST_OBJECT_PREFIX: &str = "test-files/serverless-test";
const OPERATION_TIMEOUT: Duration = Duration::from_secs(10);
const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of a successful end-to-end object-store round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectivityReport {
    pub message: String,
    pub bucket_name: String,
    pub endpoint: Option<String>,
    pub test_file_key: String,
    pub uploaded_content: String,
    pub downloaded_content: String,
    pub content_match: bool,
}

/// Seam for the object-store connectivity diagnostic, so tests can stand in
/// for a live S3 endpoint.
#[async_trait]
pub trait StorageVerifier {
    /// Runs the whole round trip. All-or-nothing: the first fault anywhere in
    /// the sequence surfaces as the error, with no retry and no partial
    /// report.
    async fn verify(&self) -> Result<ConnectivityReport>;
}

pub struct S3StorageVerifier {
    config: StorageConfig,
}

impl S3StorageVerifier {
    pub fn new(config: StorageConfig) -> Self {
        S3StorageVerifier { config }
    }

    /// Builds the S3 client: explicit region and static credentials (the
    /// LocalStack defaults), optional endpoint override, path-style
    /// addressing, SDK retries off since this is a one-shot diagnostic.
    async fn client(&self) -> Client {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.config.region.clone()))
            .credentials_provider(Credentials::new(
                self.config.access_key_id.clone(),
                self.config.secret_access_key.clone(),
                None,
                None,
                "lambda-web-config",
            ))
            .retry_config(RetryConfig::disabled())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(OPERATION_TIMEOUT)
                    .operation_attempt_timeout(ATTEMPT_TIMEOUT)
                    .build(),
            );
        if let Some(endpoint) = &self.config.endpoint {
            loader = loader.endpoint_url(endpoint.clone());
        }
        let sdk_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            // LocalStack serves buckets under the path, not a subdomain.
            .force_path_style(true)
            .build();
        Client::from_conf(s3_config)
    }
}

#[async_trait]
impl StorageVerifier for S3StorageVerifier {
    async fn verify(&self) -> Result<ConnectivityReport> {
        let client = self.client().await;
        let bucket = &self.config.bucket;

        let buckets = client
            .list_buckets()
            .send()
            .await
            .context("listing buckets")?;
        let bucket_exists = buckets
            .buckets()
            .iter()
            .any(|candidate| candidate.name() == Some(bucket.as_str()));
        if !bucket_exists {
            debug!("bucket {bucket} not found, creating it");
            client
                .create_bucket()
                .bucket(bucket)
                .send()
                .await
                .with_context(|| format!("creating bucket {bucket}"))?;
        }

        let now = Utc::now();
        let uploaded_content = format!(
            "Hello from the serverless environment - {}",
            now.to_rfc3339_opts(SecondsFormat::Micros, true)
        );
        let test_file_key = format!("{TEST_OBJECT_PREFIX}-{}.txt", now.timestamp());

        client
            .put_object()
            .bucket(bucket)
            .key(&test_file_key)
            .content_type("text/plain")
            .body(ByteStream::from(uploaded_content.clone().into_bytes()))
            .send()
            .await
            .context("uploading test object")?;

        let object = client
            .get_object()
            .bucket(bucket)
            .key(&test_file_key)
            .send()
            .await
            .context("downloading test object")?;
        let bytes = object
            .body
            .collect()
            .await
            .context("reading test object body")?
            .into_bytes();
        let downloaded_content = String::from_utf8_lossy(&bytes).into_owned();

        Ok(ConnectivityReport {
            message: "S3 connectivity check passed".to_string(),
            bucket_name: bucket.clone(),
            endpoint: self.config.endpoint.clone(),
            test_file_key,
            content_match: uploaded_content == downloaded_content,
            uploaded_content,
            downloaded_content,
        })
    }
}
