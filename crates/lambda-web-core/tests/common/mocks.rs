// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use lambda_web_core::storage::{ConnectivityReport, StorageVerifier};

/// Stands in for a live S3 endpoint and always reports a clean round trip.
pub struct MockStorageVerifier;

#[async_trait]
impl StorageVerifier for MockStorageVerifier {
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
