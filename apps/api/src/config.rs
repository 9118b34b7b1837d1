use anyhow::{Context, Result};

use crate::generation::pipeline::PipelineMode;

const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Every variable has a default; startup fails only on unparsable values.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Base URL of the completion API, without the `/v1/completions` path.
    pub openai_api_base: String,
    /// Pipeline mode used when a request does not pick one.
    pub pipeline_mode: PipelineMode,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: optional_env("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            openai_api_base: optional_env("OPENAI_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_OPENAI_API_BASE.to_string()),
            pipeline_mode: match optional_env("PIPELINE_MODE") {
                Some(raw) => raw
                    .parse::<PipelineMode>()
                    .with_context(|| format!("PIPELINE_MODE '{raw}' is not a known mode"))?,
                None => PipelineMode::default(),
            },
            max_upload_bytes: match optional_env("MAX_UPLOAD_BYTES") {
                Some(raw) => raw
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            openai_api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            pipeline_mode: PipelineMode::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Reads an env var, treating blank values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
