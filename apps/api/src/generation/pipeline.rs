//! The generation pipeline: validate → acquire → extract → complete → render.
//!
//! One configurable pipeline covers every product variant; `PipelineMode`
//! picks which completion tasks run and whether the rewritten résumé is
//! rendered to PDF. Steps run strictly in sequence and nothing outlives the
//! request: the caller gets a `GenerationResult` back and owns it.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::extraction::{extract_resume_text, ExtractionError};
use crate::generation::prompts::{build_prompt, CompletionTask};
use crate::generation::validation::{missing_inputs, missing_message, MissingInput};
use crate::job_description::{acquire, JobDescriptionSource};
use crate::llm_client::{CompletionError, CompletionRequest, TextCompleter};
use crate::render::{render_text_pdf_blocking, RenderError};

/// Which post-processing steps are enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineMode {
    /// Cover letter only.
    CoverLetter,
    /// Cover letter plus a rewritten résumé (text).
    CoverLetterAndResume,
    /// Cover letter plus a rewritten résumé rendered to PDF.
    #[default]
    CoverLetterResumePdf,
}

impl PipelineMode {
    pub fn tasks(self) -> &'static [CompletionTask] {
        match self {
            PipelineMode::CoverLetter => &[CompletionTask::CoverLetter],
            PipelineMode::CoverLetterAndResume | PipelineMode::CoverLetterResumePdf => {
                &[CompletionTask::CoverLetter, CompletionTask::ResumeUpdate]
            }
        }
    }

    pub fn renders_pdf(self) -> bool {
        matches!(self, PipelineMode::CoverLetterResumePdf)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PipelineMode::CoverLetter => "cover_letter",
            PipelineMode::CoverLetterAndResume => "cover_letter_and_resume",
            PipelineMode::CoverLetterResumePdf => "cover_letter_resume_pdf",
        }
    }
}

impl fmt::Display for PipelineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown pipeline mode '{0}'")]
pub struct UnknownMode(pub String);

impl FromStr for PipelineMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "cover_letter" => Ok(PipelineMode::CoverLetter),
            "cover_letter_and_resume" => Ok(PipelineMode::CoverLetterAndResume),
            "cover_letter_resume_pdf" => Ok(PipelineMode::CoverLetterResumePdf),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

/// Everything one interaction supplies.
#[derive(Debug, Clone)]
pub struct GenerationInput {
    pub api_key: String,
    /// Uploaded résumé bytes. An empty upload counts as no upload.
    pub resume: Option<Bytes>,
    pub job_description: JobDescriptionSource,
    pub mode: PipelineMode,
}

/// Artifacts produced by one successful run.
#[derive(Debug, Default)]
pub struct GenerationResult {
    pub cover_letter: Option<String>,
    pub updated_resume: Option<String>,
    pub resume_pdf: Option<Vec<u8>>,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    /// `notices` carries errors met while acquiring inputs (a failed fetch).
    #[error("{}", missing_message(.missing))]
    MissingInput {
        missing: Vec<MissingInput>,
        notices: Vec<String>,
    },

    #[error("Error reading resume: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("{}: {source}", .task.failure_label())]
    Completion {
        task: CompletionTask,
        source: CompletionError,
    },

    #[error("Error rendering resume PDF: {0}")]
    Render(#[from] RenderError),
}

/// Runs one interaction end to end. Any failure is terminal: no partial result
/// is returned and nothing is retried.
pub async fn run(
    input: GenerationInput,
    completer: &dyn TextCompleter,
    http: &Client,
) -> Result<GenerationResult, PipelineError> {
    let resume = input.resume.filter(|bytes| !bytes.is_empty());

    // Nothing is fetched while the résumé or key is absent; a blank URL counts
    // as a missing job description.
    let requested = match &input.job_description {
        JobDescriptionSource::Text(text) | JobDescriptionSource::Url(text) => text.as_str(),
    };
    let missing = missing_inputs(resume.is_some(), requested, &input.api_key);
    let resume = match resume {
        Some(resume) if missing.is_empty() => resume,
        _ => {
            return Err(PipelineError::MissingInput {
                missing,
                notices: Vec::new(),
            })
        }
    };

    let acquired = acquire(&input.job_description, http).await;
    if acquired.text.trim().is_empty() {
        return Err(PipelineError::MissingInput {
            missing: vec![MissingInput::JobDescription],
            notices: acquired.error.iter().map(|e| e.to_string()).collect(),
        });
    }

    info!("Running {} pipeline", input.mode);
    let resume_text = extract_resume_text(resume).await?;
    let api_key = input.api_key.trim();

    let mut result = GenerationResult::default();
    for &task in input.mode.tasks() {
        let prompt = build_prompt(task, &resume_text, &acquired.text);
        let request = CompletionRequest {
            prompt: &prompt,
            max_tokens: task.max_tokens(),
            temperature: task.temperature(),
        };
        let text = completer
            .complete(api_key, &request)
            .await
            .map_err(|source| PipelineError::Completion { task, source })?;
        info!("{task:?} generated ({} chars)", text.chars().count());

        match task {
            CompletionTask::CoverLetter => result.cover_letter = Some(text),
            CompletionTask::ResumeUpdate => result.updated_resume = Some(text),
        }
    }

    if input.mode.renders_pdf() {
        if let Some(updated) = &result.updated_resume {
            result.resume_pdf = Some(render_text_pdf_blocking(updated.clone()).await?);
        }
    }

    Ok(result)
}
