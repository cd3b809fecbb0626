// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::sync::OnceLock;

use minijinja::{Environment, Value};
use tracing::error;

use crate::runtime::RuntimeSettings;

const WELCOME_TEMPLATE: &str = include_str!("templates/welcome.html");
const ENV_INFO_TEMPLATE: &str = include_str!("templates/env_info.html");

static CACHED_ENGINE: OnceLock<Environment<'static>> = OnceLock::new();

fn build_engine() -> Environment<'static> {
    let mut engine = Environment::new();
    for (name, source) in [
        ("welcome", WELCOME_TEMPLATE),
        ("env-info", ENV_INFO_TEMPLATE),
    ] {
        // Sources are embedded; a failure here is a template syntax error and
        // surfaces as "template not found" at render time.
        if let Err(e) = engine.add_template(name, source) {
            error!("failed to register template {name}: {e}");
        }
    }
    engine
}

/// Renders an embedded template.
///
/// When the template cache is enabled and staleness checks are off (the
/// serverless adaptation), the compiled engine is built once per process;
/// otherwise every render compiles fresh, the development-friendly mode.
pub fn render(
    settings: &RuntimeSettings,
    name: &str,
    ctx: Value,
) -> Result<String, minijinja::Error> {
    let use_cached = settings
        .template_cache
        .as_ref()
        .is_some_and(|cache| cache.enabled && !cache.validate_timestamps);
    if use_cached {
        CACHED_ENGINE.get_or_init(build_engine).get_template(name)?.render(ctx)
    } else {
        build_engine().get_template(name)?.render(ctx)
    }
}
