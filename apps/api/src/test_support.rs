//! Shared helpers for unit tests: a scripted completer, local HTTP servers
//! and multipart bodies.

use std::sync::Mutex;

use async_trait::async_trait;
use axum::Router;

use crate::llm_client::{CompletionError, CompletionRequest, TextCompleter};

/// One completion call as seen by [`StubCompleter`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub api_key: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Completer that answers every call the same way and records what it was sent.
pub struct StubCompleter {
    reply: Result<String, String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl StubCompleter {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fails every call with a quota error carrying `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextCompleter for StubCompleter {
    async fn complete(
        &self,
        api_key: &str,
        request: &CompletionRequest<'_>,
    ) -> Result<String, CompletionError> {
        self.calls.lock().unwrap().push(RecordedCall {
            api_key: api_key.to_string(),
            prompt: request.prompt.to_string(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        });
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(CompletionError::Quota {
                status: 429,
                message: message.clone(),
            }),
        }
    }
}

/// Serves `app` on an ephemeral localhost port and returns its base URL.
pub async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

pub const BOUNDARY: &str = "coverletter-test-boundary";

/// A multipart/form-data body built field by field.
#[derive(Default)]
pub struct MultipartBody {
    bytes: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content: &[u8]) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(content);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.bytes
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.bytes
    }

    pub fn content_type() -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }
}
