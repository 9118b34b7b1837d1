//! Job description acquisition: pasted text, or the raw body of a single GET.

use reqwest::Client;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Error fetching URL: {0}")]
    Request(#[from] reqwest::Error),
}

/// Where the job description comes from. The two modes are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobDescriptionSource {
    Text(String),
    Url(String),
}

/// Form value selecting the source mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceKind {
    #[default]
    Text,
    Url,
}

impl SourceKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "text" | "paste" => Some(SourceKind::Text),
            "url" | "link" => Some(SourceKind::Url),
            _ => None,
        }
    }
}

/// Outcome of acquisition. A failed fetch leaves `text` empty and records why.
#[derive(Debug, Default)]
pub struct AcquiredJobDescription {
    pub text: String,
    pub error: Option<FetchError>,
}

/// Resolves a source to job description text. Never fails: fetch errors are
/// carried in the result so the caller can report them next to validation.
pub async fn acquire(source: &JobDescriptionSource, http: &Client) -> AcquiredJobDescription {
    match source {
        JobDescriptionSource::Text(text) => AcquiredJobDescription {
            text: text.clone(),
            error: None,
        },
        JobDescriptionSource::Url(url) if url.trim().is_empty() => {
            AcquiredJobDescription::default()
        }
        JobDescriptionSource::Url(url) => match fetch_job_description(http, url.trim()).await {
            Ok(text) => AcquiredJobDescription { text, error: None },
            Err(e) => {
                warn!("Job description fetch failed: {e}");
                AcquiredJobDescription {
                    text: String::new(),
                    error: Some(e),
                }
            }
        },
    }
}

/// One GET, body returned as-is. 4xx/5xx and transport errors are failures.
pub async fn fetch_job_description(http: &Client, url: &str) -> Result<String, FetchError> {
    info!("Fetching job description from {url}");
    let body = http
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(body)
}
