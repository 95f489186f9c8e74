//! HTTP surface for the student records service.
//!
//! This module exposes a compact Axum router:
//!
//! - `POST /students` – Validate and store a new record; returns `201` with the assigned `id`.
//! - `GET /students` – List every record in insertion order.
//! - `GET /students/:id` – Fetch one record.
//! - `PUT /students/:id` – Replace `name`, `age` and `email` of an existing record. Any `id` in
//!   the body is ignored; the path identifier wins.
//! - `DELETE /students/:id` – Remove a record.
//! - `GET /students/:id/summary` – Ask the configured text-generation service to describe a record.
//! - `GET /metrics` – Observe mutation and summary counters plus the current record count.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools.
//!
//! Every failure is reported as `{"error": "..."}` with a `400`, `404` or `500` status.

use crate::metrics::{MetricsSnapshot, RecordMetrics};
use crate::store::{NewStudent, StoreError, Student, StudentId, StudentStore, ValidationError};
use crate::summarization::SummaryClient;
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn StudentStore>,
    summarizer: Arc<dyn SummaryClient>,
    metrics: Arc<RecordMetrics>,
}

impl AppState {
    /// Bundle the store and summary client built at startup.
    pub fn new(store: Arc<dyn StudentStore>, summarizer: Arc<dyn SummaryClient>) -> Self {
        Self {
            store,
            summarizer,
            metrics: Arc::new(RecordMetrics::new()),
        }
    }
}

/// Build the HTTP router exposing the student API surface.
pub fn create_router(store: Arc<dyn StudentStore>, summarizer: Arc<dyn SummaryClient>) -> Router {
    Router::new()
        .route("/students", get(list_students).post(create_student))
        .route(
            "/students/:id",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/students/:id/summary", get(get_student_summary))
        .route("/metrics", get(get_metrics))
        .route("/commands", get(get_commands))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(store, summarizer))
}

/// Request body for create and update.
///
/// Missing fields fall back to empty values so they are reported by validation rather than by
/// the JSON decoder. Unknown fields, including `id`, are ignored.
#[derive(Deserialize)]
struct StudentPayload {
    #[serde(default)]
    name: String,
    #[serde(default)]
    age: i64,
    #[serde(default)]
    email: String,
}

impl StudentPayload {
    fn validate(self) -> Result<NewStudent, ValidationError> {
        NewStudent::new(self.name, self.age, self.email)
    }
}

/// Response body for `POST /students`.
#[derive(Serialize)]
struct CreatedResponse {
    message: &'static str,
    student: Student,
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

/// Response body for `GET /students/:id/summary`.
#[derive(Serialize)]
struct SummaryResponse {
    summary: String,
}

fn parse_id(raw: &str) -> Result<StudentId, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid ID".into()))
}

fn parse_body(
    payload: Result<Json<StudentPayload>, JsonRejection>,
) -> Result<NewStudent, AppError> {
    let Json(payload) = payload?;
    Ok(payload.validate()?)
}

/// Validate the body and append a new record.
async fn create_student(
    State(state): State<AppState>,
    payload: Result<Json<StudentPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let input = parse_body(payload)?;
    let student = state.store.create(input).await;
    state.metrics.record_created();
    tracing::info!(student_id = student.id, "Student created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Student created successfully",
            student,
        }),
    ))
}

async fn list_students(State(state): State<AppState>) -> Json<Vec<Student>> {
    Json(state.store.list().await)
}

async fn get_student(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Student>, AppError> {
    let id = parse_id(&raw_id)?;
    Ok(Json(state.store.get(id).await?))
}

/// Overwrite every field but the identifier.
///
/// The identifier is checked before the body so that a bad path wins over a bad payload.
async fn update_student(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<StudentPayload>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&raw_id)?;
    let input = parse_body(payload)?;
    state.store.update(id, input).await?;
    state.metrics.record_updated();
    tracing::info!(student_id = id, "Student updated");
    Ok(Json(MessageResponse {
        message: "Student updated successfully",
    }))
}

async fn delete_student(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&raw_id)?;
    state.store.delete(id).await?;
    state.metrics.record_deleted();
    tracing::info!(student_id = id, "Student deleted");
    Ok(Json(MessageResponse {
        message: "Student deleted successfully",
    }))
}

/// Generate a natural-language summary of one record.
///
/// The record is copied out of the store before the outbound call, so a slow generation service
/// never blocks other store operations. Provider failures are logged and collapsed into a generic
/// `500`.
async fn get_student_summary(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<SummaryResponse>, AppError> {
    let id = parse_id(&raw_id)?;
    let student = state.store.get(id).await?;
    match state.summarizer.summarize(&student).await {
        Ok(summary) => {
            state.metrics.record_summary(true);
            Ok(Json(SummaryResponse { summary }))
        }
        Err(error) => {
            state.metrics.record_summary(false);
            tracing::warn!(student_id = id, %error, "Summary generation failed");
            Err(AppError::Internal("Failed to generate summary"))
        }
    }
}

/// Response body for `GET /metrics`.
#[derive(Serialize)]
struct MetricsResponse {
    #[serde(flatten)]
    counters: MetricsSnapshot,
    student_count: usize,
}

/// Return the counters together with the number of records currently stored.
async fn get_metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        counters: state.metrics.snapshot(),
        student_count: state.store.len().await,
    })
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery.
async fn get_commands() -> Json<CommandsResponse> {
    let student_example = json!({
        "name": "Ada",
        "age": 30,
        "email": "ada@example.org"
    });
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "create_student",
                method: "POST",
                path: "/students",
                description: "Store a new student. Response returns { \"message\": string, \"student\": { \"id\": number, ... } }.",
                request_example: Some(student_example.clone()),
            },
            CommandDescriptor {
                name: "list_students",
                method: "GET",
                path: "/students",
                description: "Return every stored student in insertion order.",
                request_example: None,
            },
            CommandDescriptor {
                name: "get_student",
                method: "GET",
                path: "/students/:id",
                description: "Return a single student by identifier.",
                request_example: None,
            },
            CommandDescriptor {
                name: "update_student",
                method: "PUT",
                path: "/students/:id",
                description: "Replace name, age and email of an existing student; the identifier is kept.",
                request_example: Some(student_example),
            },
            CommandDescriptor {
                name: "delete_student",
                method: "DELETE",
                path: "/students/:id",
                description: "Remove a student. Identifiers are never reused.",
                request_example: None,
            },
            CommandDescriptor {
                name: "summarize_student",
                method: "GET",
                path: "/students/:id/summary",
                description: "Generate a natural-language summary of a student with the configured model.",
                request_example: None,
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return mutation and summary counters plus the current student count.",
                request_example: None,
            },
        ],
    })
}

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound,
    Internal(&'static str),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Student not found".to_string()),
            AppError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(inner: StoreError) -> Self {
        match inner {
            StoreError::NotFound(_) => Self::NotFound,
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(inner: ValidationError) -> Self {
        Self::BadRequest(format!("Invalid input data: {inner}"))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
