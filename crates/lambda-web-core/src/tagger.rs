// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use hyper::header::{HeaderMap, HeaderValue, CACHE_CONTROL, CONTENT_TYPE};
use tracing::debug;

use crate::env::LambdaEnv;

pub const AWS_REQUEST_ID_HEADER: &str = "x-aws-request-id";
pub const FUNCTION_NAME_HEADER: &str = "x-lambda-function-name";
pub const FUNCTION_VERSION_HEADER: &str = "x-lambda-function-version";
pub const POWERED_BY_HEADER: &str = "x-powered-by";

/// Fixed marker identifying the serving stack.
pub const POWERED_BY_VALUE: &str = "Lambda-Web-Serverless";

/// Static assets are immutable for the lifetime of a deployment, so clients
/// and CDNs may cache them for a year.
pub const STATIC_ASSET_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

const STATIC_ASSET_TYPES: [&str; 4] = ["css", "javascript", "image/", "font/"];

/// Copies the Lambda invocation metadata into the request headers so
/// downstream handlers and logs can correlate with the host's records.
///
/// Pass-through outside Lambda. Each header is set independently, only when
/// its marker is present in the snapshot.
pub fn tag_request(headers: &mut HeaderMap, lambda: &LambdaEnv) {
    if !lambda.is_lambda() {
        return;
    }
    set_header(headers, AWS_REQUEST_ID_HEADER, lambda.request_id.as_deref());
    set_header(headers, FUNCTION_NAME_HEADER, lambda.function_name.as_deref());
    set_header(
        headers,
        FUNCTION_VERSION_HEADER,
        lambda.function_version.as_deref(),
    );
}

/// Stamps the outbound response: the serving-stack marker, the invocation id
/// when the host provided one, and a long-lived cache-control directive for
/// static-asset content types.
///
/// Pass-through outside Lambda. Only headers are touched, never the body or
/// status code.
pub fn tag_response(headers: &mut HeaderMap, lambda: &LambdaEnv) {
    if !lambda.is_lambda() {
        return;
    }
    headers.insert(POWERED_BY_HEADER, HeaderValue::from_static(POWERED_BY_VALUE));
    set_header(headers, AWS_REQUEST_ID_HEADER, lambda.request_id.as_deref());

    let static_asset = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(is_static_asset);
    if static_asset {
        headers.insert(
            CACHE_CONTROL,
            HeaderValue::from_static(STATIC_ASSET_CACHE_CONTROL),
        );
    }
}

/// Classifies a content type as a long-term-cacheable static asset.
///
/// Substring containment, case-sensitive as authored.
pub fn is_static_asset(content_type: &str) -> bool {
    STATIC_ASSET_TYPES
        .iter()
        .any(|asset_type| content_type.contains(asset_type))
}

fn set_header(headers: &mut HeaderMap, name: &'static str, value: Option<&str>) {
    let Some(value) = value else {
        return;
    };
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        // Marker values come from the host; an unrepresentable one is
        // "feature not applicable", not a failure.
        Err(_) => debug!("{name}: environment value is not a valid header value, skipping"),
    }
}
