pub mod form;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(form::index_handler))
        .route("/health", get(health::health_handler))
        .route("/api/v1/generate", post(handlers::handle_generate))
        .route(
            "/api/v1/download/cover-letter",
            post(handlers::handle_download_cover_letter),
        )
        .route(
            "/api/v1/download/resume-pdf",
            post(handlers::handle_download_resume_pdf),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::generation::pipeline::PipelineMode;
    use crate::llm_client::TextCompleter;
    use crate::render::render_pages;
    use crate::test_support::{MultipartBody, StubCompleter};

    fn app(completer: Arc<StubCompleter>, mode: PipelineMode) -> Router {
        let completer: Arc<dyn TextCompleter> = completer;
        build_router(AppState {
            completer,
            http: reqwest::Client::new(),
            config: Config {
                pipeline_mode: mode,
                ..Config::default()
            },
        })
    }

    fn generate_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/generate")
            .header(header::CONTENT_TYPE, MultipartBody::content_type())
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn resume_pdf() -> Vec<u8> {
        render_pages(&["Jane Doe\nRust Engineer"]).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(Arc::new(StubCompleter::replying("x")), PipelineMode::default())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_index_serves_form() {
        let response = app(Arc::new(StubCompleter::replying("x")), PipelineMode::default())
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("name=\"api_key\""));
        assert!(html.contains("type=\"password\""));
        assert!(html.contains("resume_pdf_base64"));
    }

    #[tokio::test]
    async fn test_generate_pdf_mode_returns_all_artifacts() {
        let completer = Arc::new(StubCompleter::replying("Generated body"));
        let body = MultipartBody::new()
            .text("api_key", "sk-test")
            .file("resume", "resume.pdf", &resume_pdf())
            .text("jd_source", "text")
            .text("job_description", "Senior Rust Engineer")
            .finish();

        let response = app(completer.clone(), PipelineMode::CoverLetterResumePdf)
            .oneshot(generate_request(body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["mode"], "cover_letter_resume_pdf");
        assert_eq!(json["cover_letter"], "Generated body");
        assert_eq!(json["updated_resume"], "Generated body");
        let pdf = STANDARD
            .decode(json["resume_pdf_base64"].as_str().unwrap())
            .unwrap();
        assert!(pdf.starts_with(b"%PDF-"));

        let files: Vec<&str> = json["downloads"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["file_name"].as_str().unwrap())
            .collect();
        assert_eq!(files, vec!["generated_cover_letter.txt", "updated_resume.pdf"]);

        let calls = completer.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].prompt.contains("Rust Engineer"));
    }

    #[tokio::test]
    async fn test_generate_mode_field_overrides_default() {
        let completer = Arc::new(StubCompleter::replying("Dear team"));
        let body = MultipartBody::new()
            .text("api_key", "sk-test")
            .file("resume", "resume.pdf", &resume_pdf())
            .text("job_description", "Senior Rust Engineer")
            .text("mode", "cover_letter")
            .finish();

        let response = app(completer.clone(), PipelineMode::CoverLetterResumePdf)
            .oneshot(generate_request(body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["cover_letter"], "Dear team");
        assert!(json["updated_resume"].is_null());
        assert!(json["resume_pdf_base64"].is_null());
        assert_eq!(completer.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_generate_lists_every_missing_input() {
        let completer = Arc::new(StubCompleter::replying("unused"));
        let body = MultipartBody::new()
            .text("api_key", "")
            .file("resume", "", b"")
            .text("job_description", "   ")
            .finish();

        let response = app(completer.clone(), PipelineMode::default())
            .oneshot(generate_request(body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "MISSING_INPUT");
        assert_eq!(
            json["error"]["message"],
            "Please provide: resume, job description, OpenAI API key"
        );
        assert_eq!(
            json["error"]["details"],
            json!(["resume", "job description", "OpenAI API key"])
        );
        assert!(completer.calls().is_empty());
    }

    #[tokio::test]
    async fn test_generate_reports_completion_failure_text() {
        let completer = Arc::new(StubCompleter::failing("You exceeded your current quota"));
        let body = MultipartBody::new()
            .text("api_key", "sk-test")
            .file("resume", "resume.pdf", &resume_pdf())
            .text("job_description", "Senior Rust Engineer")
            .finish();

        let response = app(completer, PipelineMode::default())
            .oneshot(generate_request(body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "COMPLETION_QUOTA_ERROR");
        let message = json["error"]["message"].as_str().unwrap();
        assert!(message.contains("You exceeded your current quota"));
        assert!(json.get("cover_letter").is_none());
    }

    #[tokio::test]
    async fn test_generate_rejects_unknown_source() {
        let body = MultipartBody::new()
            .text("api_key", "sk-test")
            .text("jd_source", "carrier-pigeon")
            .finish();

        let response = app(Arc::new(StubCompleter::replying("x")), PipelineMode::default())
            .oneshot(generate_request(body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_download_cover_letter_is_text_attachment() {
        let request = Request::post("/api/v1/download/cover-letter")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "text": "Dear Hiring Manager" }).to_string()))
            .unwrap();

        let response = app(Arc::new(StubCompleter::replying("x")), PipelineMode::default())
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"generated_cover_letter.txt\""
        );
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"Dear Hiring Manager");
    }

    #[tokio::test]
    async fn test_download_resume_pdf_is_pdf_attachment() {
        let request = Request::post("/api/v1/download/resume-pdf")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "text": "Jane Doe\nRust Engineer" }).to_string()))
            .unwrap();

        let response = app(Arc::new(StubCompleter::replying("x")), PipelineMode::default())
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"updated_resume.pdf\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_download_rejects_blank_text() {
        let request = Request::post("/api/v1/download/cover-letter")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "text": "  " }).to_string()))
            .unwrap();

        let response = app(Arc::new(StubCompleter::replying("x")), PipelineMode::default())
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
