//! Natural-language profile summaries via a local text-generation runtime.
//!
//! The Ollama-backed client issues a single non-streaming `POST /api/generate` per summary. No
//! retries are attempted and no results are cached; a timeout is applied only when configured.

use crate::config::Config;
use crate::store::Student;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced while generating a summary.
#[derive(Debug, Error)]
pub enum SummaryClientError {
    /// HTTP client could not be constructed.
    #[error("Failed to build summarization client: {0}")]
    Setup(#[source] reqwest::Error),
    /// Provider could not be reached.
    #[error("Summarization provider unavailable: {0}")]
    Unavailable(String),
    /// Provider answered with a non-success status.
    #[error("Failed to generate summary: {0}")]
    GenerationFailed(String),
    /// Provider response could not be decoded.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by summary providers.
#[async_trait]
pub trait SummaryClient: Send + Sync {
    /// Produce a natural-language summary of `student`.
    async fn summarize(&self, student: &Student) -> Result<String, SummaryClientError>;
}

/// Build the fixed prompt embedding every field of the record.
pub fn build_prompt(student: &Student) -> String {
    format!(
        "Summarize the following student profile:\n\nID: {}\nName: {}\nAge: {}\nEmail: {}",
        student.id, student.name, student.age, student.email
    )
}

/// Summary client talking to an Ollama-compatible `/api/generate` endpoint.
pub struct OllamaSummaryClient {
    http: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    // Absent field yields an empty summary rather than an error.
    #[serde(default)]
    response: String,
}

impl OllamaSummaryClient {
    /// Construct a client for `base_url`, optionally bounding each request by `timeout`.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, SummaryClientError> {
        let mut builder = Client::builder().user_agent("student-records/summary");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(SummaryClientError::Setup)?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    /// Construct a client from the loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, SummaryClientError> {
        Self::new(
            config.ollama_url.clone(),
            config.summary_model.clone(),
            config.summary_timeout,
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SummaryClient for OllamaSummaryClient {
    async fn summarize(&self, student: &Student) -> Result<String, SummaryClientError> {
        let payload = GenerateRequest {
            model: &self.model,
            prompt: build_prompt(student),
            stream: false,
        };

        tracing::debug!(
            student_id = student.id,
            model = %self.model,
            endpoint = %self.endpoint(),
            "Requesting summary"
        );

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                SummaryClientError::Unavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SummaryClientError::GenerationFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: GenerateResponse = response.json().await.map_err(|error| {
            SummaryClientError::InvalidResponse(format!(
                "failed to decode Ollama response: {error}"
            ))
        })?;

        Ok(body.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};
    use serde_json::json;

    fn ada() -> Student {
        Student {
            id: 1,
            name: "Ada".into(),
            age: 30,
            email: "a@x.com".into(),
        }
    }

    fn client_for(server: &MockServer) -> OllamaSummaryClient {
        OllamaSummaryClient::new(server.base_url(), "llama2", None).expect("client")
    }

    #[test]
    fn prompt_embeds_every_field() {
        assert_eq!(
            build_prompt(&ada()),
            "Summarize the following student profile:\n\nID: 1\nName: Ada\nAge: 30\nEmail: a@x.com"
        );
    }

    #[tokio::test]
    async fn returns_generated_text() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate").json_body(json!({
                    "model": "llama2",
                    "prompt": build_prompt(&ada()),
                    "stream": false
                }));
                then.status(200).json_body(json!({
                    "response": "Ada is a 30 year old student.",
                    "done": true
                }));
            })
            .await;

        let summary = client_for(&server).summarize(&ada()).await.expect("summary");

        mock.assert_async().await;
        assert_eq!(summary, "Ada is a 30 year old student.");
    }

    #[tokio::test]
    async fn missing_response_field_is_empty_summary() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(200).json_body(json!({ "done": true }));
            })
            .await;

        let summary = client_for(&server).summarize(&ada()).await.expect("summary");
        assert_eq!(summary, "");
    }

    #[tokio::test]
    async fn non_json_body_is_invalid_response() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(200).body("not json");
            })
            .await;

        let error = client_for(&server)
            .summarize(&ada())
            .await
            .expect_err("decode failure");
        assert!(matches!(error, SummaryClientError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn error_status_is_generation_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(500).body("boom");
            })
            .await;

        let error = client_for(&server)
            .summarize(&ada())
            .await
            .expect_err("error response");
        assert!(
            matches!(&error, SummaryClientError::GenerationFailed(message) if message.contains("500"))
        );
    }

    #[tokio::test]
    async fn unreachable_provider_is_unavailable() {
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .and_then(|listener| listener.local_addr())
            .expect("reserve port");
        let client = OllamaSummaryClient::new(
            format!("http://{addr}"),
            "llama2",
            Some(Duration::from_secs(5)),
        )
        .expect("client");
        let error = client.summarize(&ada()).await.expect_err("connection error");
        assert!(matches!(error, SummaryClientError::Unavailable(_)));
    }

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let client =
            OllamaSummaryClient::new("http://localhost:11434/", "llama2", None).expect("client");
        assert_eq!(client.endpoint(), "http://localhost:11434/api/generate");
    }
}
