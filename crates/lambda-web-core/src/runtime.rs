// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_MEMORY_LIMIT_MB: u64 = 512;
const DEFAULT_TMP_STORAGE: &str = "/tmp";
const SERVERLESS_MEMORY_LIMIT_MB: u64 = 512;
const SERVERLESS_TEMPLATE_CACHE_MAX_FILES: u32 = 20_000;
const SERVERLESS_TEMPLATE_CACHE_MEMORY_MB: u32 = 256;
const SERVERLESS_VIEW_CACHE_DIR: &str = "lambda-web/views";
const SERVERLESS_FILE_CACHE_DIR: &str = "lambda-web/cache";

/// Tuning for the view engine's compiled-template cache.
///
/// `validate_timestamps` controls whether template sources are re-read on
/// every render; with an immutable deployment package that check is wasted
/// work, so the serverless adaptation turns it off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateCacheSettings {
    pub enabled: bool,
    pub validate_timestamps: bool,
    pub max_cached_files: u32,
    pub memory_mb: u32,
}

impl Default for TemplateCacheSettings {
    fn default() -> Self {
        TemplateCacheSettings {
            enabled: true,
            validate_timestamps: true,
            max_cached_files: 1_000,
            memory_mb: 64,
        }
    }
}

/// Process-wide runtime settings with a one-mutation-pass lifecycle: built at
/// startup, optionally adapted for serverless, read-only thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSettings {
    /// Encrypt the session store at rest.
    pub session_encrypt: bool,
    /// Backend for the application cache store (`file`, `redis`, ...).
    pub cache_driver: String,
    /// Where compiled views are written.
    pub view_cache_path: PathBuf,
    /// Where the file-backed cache store keeps its entries.
    pub file_cache_path: PathBuf,
    /// Process memory ceiling, in megabytes.
    pub memory_limit_mb: u64,
    /// The host's ephemeral writable directory.
    pub tmp_storage: PathBuf,
    /// Compiled-template cache tuning; `None` when the view engine is not
    /// compiled in.
    pub template_cache: Option<TemplateCacheSettings>,
}

impl RuntimeSettings {
    pub fn from_env() -> Self {
        RuntimeSettings {
            session_encrypt: true,
            cache_driver: env::var("CACHE_DRIVER").unwrap_or_else(|_| "file".to_string()),
            view_cache_path: PathBuf::from("storage/views"),
            file_cache_path: PathBuf::from("storage/cache"),
            memory_limit_mb: env::var("LAMBDA_MEMORY_LIMIT")
                .ok()
                .and_then(|limit| limit.parse::<u64>().ok())
                .unwrap_or(DEFAULT_MEMORY_LIMIT_MB),
            tmp_storage: env::var("LAMBDA_TMP_STORAGE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_TMP_STORAGE)),
            template_cache: Some(TemplateCacheSettings::default()),
        }
    }

    /// Applies the serverless runtime adaptations. Invoked once at boot when
    /// the process runs inside a Lambda function.
    ///
    /// Each mutation is independent: a missing template cache block skips only
    /// that mutation. Re-running the whole pass leaves the settings in the
    /// same final state, since a warm host may re-initialize the process.
    pub fn adapt_for_serverless(&mut self) {
        // Transport security already covers the session payload; encrypting
        // it again just burns cold-start CPU.
        self.session_encrypt = false;

        // The deployment package is read-only; anything written at runtime
        // has to live under the ephemeral tmp directory.
        self.view_cache_path = self.tmp_storage.join(SERVERLESS_VIEW_CACHE_DIR);
        if self.cache_driver == "file" {
            self.file_cache_path = self.tmp_storage.join(SERVERLESS_FILE_CACHE_DIR);
        } else {
            debug!(
                "cache driver is {}, leaving its store untouched",
                self.cache_driver
            );
        }

        self.memory_limit_mb = self.memory_limit_mb.max(SERVERLESS_MEMORY_LIMIT_MB);

        match self.template_cache.as_mut() {
            Some(cache) => {
                cache.enabled = true;
                // The package is immutable per invocation environment, so
                // staleness checks never fire.
                cache.validate_timestamps = false;
                cache.max_cached_files = SERVERLESS_TEMPLATE_CACHE_MAX_FILES;
                cache.memory_mb = SERVERLESS_TEMPLATE_CACHE_MEMORY_MB;
            }
            None => debug!("no template cache configured, skipping cache tuning"),
        }
    }

    /// Creates the cache directories so the first write never races directory
    /// creation. Safe to call on every boot.
    pub fn ensure_directories(&self) -> io::Result<()> {
        fs::create_dir_all(&self.view_cache_path)?;
        fs::create_dir_all(&self.file_cache_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{RuntimeSettings, TemplateCacheSettings};

    fn local_settings() -> RuntimeSettings {
        RuntimeSettings {
            session_encrypt: true,
            cache_driver: "file".to_string(),
            view_cache_path: PathBuf::from("storage/views"),
            file_cache_path: PathBuf::from("storage/cache"),
            memory_limit_mb: 512,
            tmp_storage: PathBuf::from("/tmp"),
            template_cache: Some(TemplateCacheSettings::default()),
        }
    }

    #[test]
    fn test_adapt_redirects_writable_paths() {
        let mut settings = local_settings();
        settings.adapt_for_serverless();

        assert!(!settings.session_encrypt);
        assert_eq!(settings.view_cache_path, PathBuf::from("/tmp/lambda-web/views"));
        assert_eq!(settings.file_cache_path, PathBuf::from("/tmp/lambda-web/cache"));
    }

    #[test]
    fn test_adapt_is_idempotent() {
        let mut once = local_settings();
        once.adapt_for_serverless();

        let mut twice = local_settings();
        twice.adapt_for_serverless();
        twice.adapt_for_serverless();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_adapt_respects_non_file_cache_driver() {
        let mut settings = local_settings();
        settings.cache_driver = "redis".to_string();
        settings.adapt_for_serverless();

        // The redis store has no filesystem path to redirect.
        assert_eq!(settings.file_cache_path, PathBuf::from("storage/cache"));
        assert_eq!(settings.view_cache_path, PathBuf::from("/tmp/lambda-web/views"));
    }

    #[test]
    fn test_adapt_raises_memory_limit() {
        let mut settings = local_settings();
        settings.memory_limit_mb = 128;
        settings.adapt_for_serverless();
        assert_eq!(settings.memory_limit_mb, 512);
    }

    #[test]
    fn test_adapt_keeps_higher_memory_limit() {
        let mut settings = local_settings();
        settings.memory_limit_mb = 1024;
        settings.adapt_for_serverless();
        assert_eq!(settings.memory_limit_mb, 1024);
    }

    #[test]
    fn test_adapt_tunes_template_cache() {
        let mut settings = local_settings();
        settings.adapt_for_serverless();

        let cache = settings.template_cache.expect("cache block present");
        assert!(cache.enabled);
        assert!(!cache.validate_timestamps);
        assert_eq!(cache.max_cached_files, 20_000);
        assert_eq!(cache.memory_mb, 256);
    }

    #[test]
    fn test_adapt_without_template_cache_applies_the_rest() {
        let mut settings = local_settings();
        settings.template_cache = None;
        settings.adapt_for_serverless();

        assert!(!settings.session_encrypt);
        assert_eq!(settings.view_cache_path, PathBuf::from("/tmp/lambda-web/views"));
        assert_eq!(settings.template_cache, None);
    }

    #[test]
    fn test_ensure_directories_creates_cache_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let mut settings = local_settings();
        settings.view_cache_path = tmp.path().join("views");
        settings.file_cache_path = tmp.path().join("cache");

        settings.ensure_directories().unwrap();
        assert!(settings.view_cache_path.is_dir());
        assert!(settings.file_cache_path.is_dir());

        // Re-running on a warm boot is a no-op.
        settings.ensure_directories().unwrap();
    }
}
