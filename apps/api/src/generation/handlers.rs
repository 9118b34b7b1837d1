//! Axum route handlers for generation and artifact downloads.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::generation::pipeline::{run, GenerationInput, PipelineMode};
use crate::job_description::{JobDescriptionSource, SourceKind};
use crate::render::render_text_pdf_blocking;
use crate::state::AppState;

pub const COVER_LETTER_FILE_NAME: &str = "generated_cover_letter.txt";
pub const RESUME_PDF_FILE_NAME: &str = "updated_resume.pdf";

const COVER_LETTER_DOWNLOAD_PATH: &str = "/api/v1/download/cover-letter";
const RESUME_PDF_DOWNLOAD_PATH: &str = "/api/v1/download/resume-pdf";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Raw multipart fields of the generate form.
#[derive(Debug, Default)]
struct GenerateForm {
    api_key: String,
    resume: Option<Bytes>,
    jd_source: String,
    job_description: String,
    job_url: String,
    mode: Option<String>,
}

impl GenerateForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = GenerateForm::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "resume" => form.resume = Some(field.bytes().await?),
                "api_key" => form.api_key = field.text().await?,
                "jd_source" => form.jd_source = field.text().await?,
                "job_description" => form.job_description = field.text().await?,
                "job_url" => form.job_url = field.text().await?,
                "mode" => form.mode = Some(field.text().await?),
                _ => {}
            }
        }
        Ok(form)
    }

    fn into_input(self, default_mode: PipelineMode) -> Result<GenerationInput, AppError> {
        let kind = SourceKind::parse(&self.jd_source).ok_or_else(|| {
            AppError::Validation(format!("unknown jd_source '{}'", self.jd_source))
        })?;
        let job_description = match kind {
            SourceKind::Text => JobDescriptionSource::Text(self.job_description),
            SourceKind::Url => JobDescriptionSource::Url(self.job_url),
        };

        let mode = match self.mode.as_deref().map(str::trim) {
            None | Some("") => default_mode,
            Some(raw) => raw
                .parse::<PipelineMode>()
                .map_err(|e| AppError::Validation(e.to_string()))?,
        };

        Ok(GenerationInput {
            api_key: self.api_key,
            resume: self.resume,
            job_description,
            mode,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct DownloadLink {
    pub file_name: &'static str,
    pub mime: &'static str,
    /// POST endpoint that turns `{ "text": ... }` into this file.
    pub endpoint: &'static str,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub mode: PipelineMode,
    pub cover_letter: Option<String>,
    pub updated_resume: Option<String>,
    /// The rendered résumé PDF, ready to save as-is. The download endpoint is
    /// only needed once the text has been edited.
    pub resume_pdf_base64: Option<String>,
    pub downloads: Vec<DownloadLink>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/generate
///
/// Multipart form: `api_key`, `resume` (file), `jd_source` (`text` | `url`),
/// `job_description`, `job_url`, optional `mode`.
pub async fn handle_generate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<GenerateResponse>, AppError> {
    let input = GenerateForm::read(multipart)
        .await?
        .into_input(state.config.pipeline_mode)?;
    let mode = input.mode;

    let result = run(input, state.completer.as_ref(), &state.http).await?;

    let mut downloads = Vec::new();
    if result.cover_letter.is_some() {
        downloads.push(DownloadLink {
            file_name: COVER_LETTER_FILE_NAME,
            mime: "text/plain",
            endpoint: COVER_LETTER_DOWNLOAD_PATH,
        });
    }
    if result.resume_pdf.is_some() {
        downloads.push(DownloadLink {
            file_name: RESUME_PDF_FILE_NAME,
            mime: "application/pdf",
            endpoint: RESUME_PDF_DOWNLOAD_PATH,
        });
    }

    Ok(Json(GenerateResponse {
        mode,
        cover_letter: result.cover_letter,
        updated_resume: result.updated_resume,
        resume_pdf_base64: result.resume_pdf.map(|pdf| STANDARD.encode(pdf)),
        downloads,
    }))
}

/// POST /api/v1/download/cover-letter
///
/// Returns the (possibly user-edited) cover letter as a text attachment.
pub async fn handle_download_cover_letter(
    Json(request): Json<DownloadRequest>,
) -> Result<Response, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, attachment(COVER_LETTER_FILE_NAME)),
        ],
        request.text,
    )
        .into_response())
}

/// POST /api/v1/download/resume-pdf
///
/// Renders the (possibly user-edited) résumé text to PDF.
pub async fn handle_download_resume_pdf(
    Json(request): Json<DownloadRequest>,
) -> Result<Response, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }

    let pdf = render_text_pdf_blocking(request.text)
        .await
        .map_err(|e| AppError::Render(format!("Error rendering resume PDF: {e}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, attachment(RESUME_PDF_FILE_NAME)),
        ],
        pdf,
    )
        .into_response())
}

fn attachment(file_name: &str) -> String {
    format!("attachment; filename=\"{file_name}\"")
}
