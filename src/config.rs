//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory when
//! present, falling back to built-in defaults otherwise, then applies the
//! `GEOINTEL_LOG_LEVEL` env override. API credentials come from env only
//! (`GEOINTEL_API_KEY`, `GEOINTEL_FALLBACK_API_KEY`) — never from TOML.

use std::{env, fs, path::Path};

use serde::Deserialize;

use crate::error::AppError;

/// Primary provider configuration (`[primary]` in the TOML).
#[derive(Debug, Clone)]
pub struct PrimaryConfig {
    /// Base URL of the generation API, up to but not including `/models/...`.
    pub base_url: String,
    /// Model name interpolated into the request path.
    pub model: String,
    /// API key from `GEOINTEL_API_KEY` env.
    pub api_key: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// Fallback provider configuration (`[fallback]` in the TOML).
#[derive(Debug, Clone)]
pub struct FallbackConfig {
    /// Full chat completions endpoint URL.
    pub base_url: String,
    /// Model name passed in the request body.
    pub model: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// Fully-resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub primary: PrimaryConfig,
    pub fallback: FallbackConfig,
    /// Fallback key from `GEOINTEL_FALLBACK_API_KEY` env — `None` means the
    /// fallback path is unconfigured and quota exhaustion surfaces as a
    /// needs-configuration failure.
    pub fallback_api_key: Option<String>,
}

/// Raw TOML shape — `serde` target before resolution.
#[derive(Deserialize)]
struct RawConfig {
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default)]
    primary: RawPrimary,
    #[serde(default)]
    fallback: RawFallback,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            primary: RawPrimary::default(),
            fallback: RawFallback::default(),
        }
    }
}

#[derive(Deserialize)]
struct RawPrimary {
    #[serde(default = "default_primary_base_url")]
    base_url: String,
    #[serde(default = "default_primary_model")]
    model: String,
    #[serde(default = "default_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawPrimary {
    fn default() -> Self {
        Self {
            base_url: default_primary_base_url(),
            model: default_primary_model(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Deserialize)]
struct RawFallback {
    #[serde(default = "default_fallback_base_url")]
    base_url: String,
    #[serde(default = "default_fallback_model")]
    model: String,
    #[serde(default = "default_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawFallback {
    fn default() -> Self {
        Self {
            base_url: default_fallback_base_url(),
            model: default_fallback_model(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_primary_base_url() -> String { "https://generativelanguage.googleapis.com/v1beta".to_string() }
fn default_primary_model() -> String { "gemini-2.5-flash".to_string() }
fn default_fallback_base_url() -> String { "https://openrouter.ai/api/v1/chat/completions".to_string() }
fn default_fallback_model() -> String { "google/gemini-flash-1.5".to_string() }
fn default_timeout_seconds() -> u64 { 90 }

/// Load config from `config/default.toml` (built-in defaults when the file is
/// absent), then apply env-var overrides and read credentials from env.
pub fn load() -> Result<Config, AppError> {
    let log_level_override = env::var("GEOINTEL_LOG_LEVEL").ok();
    load_from(
        Path::new("config/default.toml"),
        log_level_override.as_deref(),
        env::var("GEOINTEL_API_KEY").ok(),
        env::var("GEOINTEL_FALLBACK_API_KEY").ok(),
    )
}

/// Internal loader — accepts an explicit path and optional overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(
    path: &Path,
    log_level_override: Option<&str>,
    api_key: Option<String>,
    fallback_api_key: Option<String>,
) -> Result<Config, AppError> {
    let parsed: RawConfig = match fs::read_to_string(path) {
        Ok(raw) => toml::from_str(&raw)
            .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => RawConfig::default(),
        Err(e) => return Err(AppError::Config(format!("cannot read {}: {e}", path.display()))),
    };

    let api_key = api_key
        .ok_or_else(|| AppError::Config("GEOINTEL_API_KEY is not set".to_string()))?;

    Ok(Config {
        log_level: log_level_override.unwrap_or(&parsed.log_level).to_string(),
        primary: PrimaryConfig {
            base_url: parsed.primary.base_url,
            model: parsed.primary.model,
            api_key,
            timeout_seconds: parsed.primary.timeout_seconds,
        },
        fallback: FallbackConfig {
            base_url: parsed.fallback.base_url,
            model: parsed.fallback.model,
            timeout_seconds: parsed.fallback.timeout_seconds,
        },
        fallback_api_key,
    })
}
