// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

pub mod config;
pub mod env;
pub mod handlers;
pub mod http_utils;
pub mod runtime;
pub mod server;
pub mod storage;
pub mod tagger;
pub mod views;
