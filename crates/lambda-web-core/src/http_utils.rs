// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use bytes::Bytes;
use http_body_util::Full;
use hyper::{
    header::{HeaderValue, CONTENT_TYPE},
    http, Response, StatusCode,
};
use serde_json::json;
use tracing::{debug, error};

pub type HttpResponse = Response<Full<Bytes>>;

const APPLICATION_JSON: &str = "application/json";
const TEXT_HTML: &str = "text/html; charset=utf-8";

/// Does two things:
/// 1. Logs the given message. A success status code (within 200-299) will
///    cause a debug log to be written, otherwise error will be written.
/// 2. Returns the given message in the body of a JSON response with the given
///    status code.
///
/// Response body format:
/// {
///     "message": message
/// }
pub fn log_and_create_http_response(
    message: &str,
    status: StatusCode,
) -> http::Result<HttpResponse> {
    if status.is_success() {
        debug!("{message}");
    } else {
        error!("{message}");
    }
    let body = json!({ "message": message }).to_string();
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON))
        .body(Full::new(Bytes::from(body)))
}

pub fn json_response(
    status: StatusCode,
    body: serde_json::Value,
) -> http::Result<HttpResponse> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON))
        .body(Full::new(Bytes::from(body.to_string())))
}

pub fn html_response(status: StatusCode, body: String) -> http::Result<HttpResponse> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, HeaderValue::from_static(TEXT_HTML))
        .body(Full::new(Bytes::from(body)))
}
