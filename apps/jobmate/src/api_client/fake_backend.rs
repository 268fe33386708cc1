//! In-process stand-in for the JobMate backend, served with axum on an
//! ephemeral port. Mirrors the routes and payload shapes the client uses.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use super::{paths, ApiClient};
use crate::i18n::Language;

pub const SESSION_ID: &str = "fake-session";
const INTERVIEW_LENGTH: usize = 4;

struct FakeState {
    health_status: u16,
    warming_checks: usize,
    health_hits: AtomicUsize,
    api_hits: AtomicUsize,
    answers: AtomicUsize,
    feedback: Mutex<Vec<Value>>,
    cv_deleted: AtomicBool,
}

pub struct FakeBackend {
    addr: SocketAddr,
    state: Arc<FakeState>,
    server: JoinHandle<()>,
}

impl FakeBackend {
    pub async fn start() -> Self {
        Self::spawn(200, 0).await
    }

    /// `/health` answers 503 for the first `checks` requests.
    pub async fn start_warming(checks: usize) -> Self {
        Self::spawn(200, checks).await
    }

    pub async fn start_with_health_status(status: u16) -> Self {
        Self::spawn(status, 0).await
    }

    async fn spawn(health_status: u16, warming_checks: usize) -> Self {
        let state = Arc::new(FakeState {
            health_status,
            warming_checks,
            health_hits: AtomicUsize::new(0),
            api_hits: AtomicUsize::new(0),
            answers: AtomicUsize::new(0),
            feedback: Mutex::new(Vec::new()),
            cv_deleted: AtomicBool::new(false),
        });

        let app = Router::new()
            .route(paths::HEALTH, get(health))
            .route(paths::CV_UPLOAD, post(upload_cv))
            .route(paths::CV_LIST, get(list_cvs))
            .route(&format!("{}/:cv_id", paths::CV), get(get_cv).delete(delete_cv))
            .route(&format!("{}/:cv_id/skills", paths::CV), get(cv_skills))
            .route(&format!("{}/:cv_id/raw-text", paths::CV), get(cv_raw_text))
            .route(paths::COVER_LETTER, post(cover_letter))
            .route(paths::JOB_MATCH, post(job_match))
            .route(paths::INTERVIEW_QUESTIONS, post(generate_questions))
            .route(paths::INTERVIEW_ANSWER, post(submit_answer))
            .route(&format!("{}/:session_id", paths::INTERVIEW_SESSION), get(fetch_session))
            .route(paths::CODE_REVIEW, post(code_review))
            .route(paths::STATISTICS, get(statistics))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake backend");
        let addr = listener.local_addr().expect("fake backend address");
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake backend crashed");
        });

        Self {
            addr,
            state,
            server,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(self.url(), Language::En, Duration::from_secs(5)).expect("build client")
    }

    pub fn health_hits(&self) -> usize {
        self.state.health_hits.load(Ordering::SeqCst)
    }

    /// Requests to anything but `/health`.
    pub fn api_hits(&self) -> usize {
        self.state.api_hits.load(Ordering::SeqCst)
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn not_found(message: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": message }))).into_response()
}

async fn health(State(state): State<Arc<FakeState>>) -> Response {
    let hit = state.health_hits.fetch_add(1, Ordering::SeqCst) + 1;
    if state.health_status != 200 {
        let status = StatusCode::from_u16(state.health_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, Json(json!({ "detail": "boom" }))).into_response();
    }
    if hit <= state.warming_checks {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "uptime_seconds": hit,
                "services": { "ai_client": false, "parser": true },
                "detail": { "message": "Loading AI models" }
            })),
        )
            .into_response();
    }
    Json(json!({
        "uptime_seconds": 120.0,
        "services": { "ai_client": true, "parser": true }
    }))
    .into_response()
}

async fn upload_cv(State(state): State<Arc<FakeState>>, mut multipart: Multipart) -> Response {
    state.api_hits.fetch_add(1, Ordering::SeqCst);
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let Ok(data) = field.bytes().await else {
            break;
        };
        return Json(json!({
            "success": true,
            "cv_id": "1",
            "filename": filename,
            "analysis": {
                "structure": { "has_experience": true },
                "ai_feedback": "Add a summary section",
                "extracted_skills": ["rust", "sql"],
                "word_count": data.len(),
                "missing_sections": ["summary"]
            }
        }))
        .into_response();
    }
    (StatusCode::BAD_REQUEST, Json(json!({ "detail": "No file uploaded." }))).into_response()
}

async fn list_cvs(State(state): State<Arc<FakeState>>) -> Json<Value> {
    state.api_hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "cvs": [{ "id": "1", "filename": "resume.pdf", "extracted_skills": ["rust"] }],
        "total_cvs": 1
    }))
}

/// Only CV "1" exists, until it is deleted.
fn stored_cv(state: &FakeState, cv_id: &str) -> Result<(), Response> {
    state.api_hits.fetch_add(1, Ordering::SeqCst);
    if cv_id != "1" || state.cv_deleted.load(Ordering::SeqCst) {
        return Err(not_found("CV not found"));
    }
    Ok(())
}

async fn get_cv(State(state): State<Arc<FakeState>>, Path(cv_id): Path<String>) -> Response {
    if let Err(missing) = stored_cv(&state, &cv_id) {
        return missing;
    }
    Json(json!({
        "cv_id": cv_id,
        "filename": "resume.pdf",
        "analysis": {
            "structure": { "has_experience": true },
            "ai_feedback": "Add a summary section",
            "extracted_skills": ["rust", "sql"],
            "word_count": 3,
            "missing_sections": ["summary"]
        }
    }))
    .into_response()
}

async fn cv_skills(State(state): State<Arc<FakeState>>, Path(cv_id): Path<String>) -> Response {
    if let Err(missing) = stored_cv(&state, &cv_id) {
        return missing;
    }
    Json(json!({ "cv_id": cv_id, "skills": ["rust", "sql"], "total_skills": 2 })).into_response()
}

async fn cv_raw_text(State(state): State<Arc<FakeState>>, Path(cv_id): Path<String>) -> Response {
    if let Err(missing) = stored_cv(&state, &cv_id) {
        return missing;
    }
    let raw_text = "Rust SQL engineer";
    Json(json!({
        "cv_id": cv_id,
        "raw_text": raw_text,
        "word_count": 3,
        "character_count": raw_text.len()
    }))
    .into_response()
}

async fn delete_cv(State(state): State<Arc<FakeState>>, Path(cv_id): Path<String>) -> Response {
    if let Err(missing) = stored_cv(&state, &cv_id) {
        return missing;
    }
    state.cv_deleted.store(true, Ordering::SeqCst);
    Json(json!({ "success": true, "message": format!("CV {cv_id} deleted successfully") }))
        .into_response()
}

async fn cover_letter(State(state): State<Arc<FakeState>>, Json(body): Json<Value>) -> Response {
    state.api_hits.fetch_add(1, Ordering::SeqCst);
    if body["cv_id"] != "1" {
        return not_found("CV not found. Please upload your CV first.");
    }
    let jd = body["job_description"].as_str().unwrap_or_default();
    Json(json!({
        "success": true,
        "cover_letter": format!("Dear hiring manager, I am applying for {jd}."),
        "company_name": "Acme",
        "language": body["language"]
    }))
    .into_response()
}

async fn job_match(State(state): State<Arc<FakeState>>, Json(_body): Json<Value>) -> Json<Value> {
    state.api_hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "success": true,
        "match_percent": 50,
        "matched_skills": ["rust"],
        "missing_skills": ["kubernetes"],
        "soft_skill_percent": 100,
        "matched_soft_skills": ["communication"],
        "missing_soft_skills": [],
        "job_info": { "skills": ["rust"], "technologies": ["kubernetes"], "soft_skills": ["communication"] },
        "suggestions": [
            { "category": "skills", "suggestion": "Highlight container orchestration work", "priority": "high" }
        ]
    }))
}

async fn generate_questions(
    State(state): State<Arc<FakeState>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.api_hits.fetch_add(1, Ordering::SeqCst);
    state.answers.store(0, Ordering::SeqCst);
    state.feedback.lock().unwrap().clear();
    Json(json!({
        "success": true,
        "session_id": SESSION_ID,
        "current_question": "Question 1",
        "question_type": body["interview_type"],
        "is_complete": false
    }))
}

async fn submit_answer(State(state): State<Arc<FakeState>>, Json(body): Json<Value>) -> Response {
    state.api_hits.fetch_add(1, Ordering::SeqCst);
    if body["session_id"] != SESSION_ID {
        return not_found("Session not found.");
    }
    let n = state.answers.fetch_add(1, Ordering::SeqCst) + 1;
    let is_complete = n >= INTERVIEW_LENGTH;
    let feedback = json!({
        "question": format!("Question {n}"),
        "answer": body["answer"],
        "evaluation": "Clear and structured",
        "type": "technical",
        "score": 8
    });
    state.feedback.lock().unwrap().push(feedback.clone());
    Json(json!({
        "success": true,
        "feedback": feedback,
        // Sent even on completion; the client must ignore it then.
        "next_question": format!("Question {}", n + 1),
        "question_type": "technical",
        "is_complete": is_complete
    }))
    .into_response()
}

async fn fetch_session(
    State(state): State<Arc<FakeState>>,
    Path(session_id): Path<String>,
) -> Response {
    state.api_hits.fetch_add(1, Ordering::SeqCst);
    if session_id != SESSION_ID {
        return not_found(&format!("Session {session_id} not found."));
    }
    let feedback = state.feedback.lock().unwrap().clone();
    let questions: Vec<String> = (1..=feedback.len().max(1))
        .map(|i| format!("Question {i}"))
        .collect();
    Json(json!({
        "session_id": SESSION_ID,
        "stage": "technical",
        "questions": questions,
        "answers": [],
        "feedback": feedback
    }))
    .into_response()
}

async fn code_review(State(state): State<Arc<FakeState>>, Json(body): Json<Value>) -> Response {
    state.api_hits.fetch_add(1, Ordering::SeqCst);
    if body["code"] == "boom" {
        return StatusCode::BAD_GATEWAY.into_response();
    }
    Json(json!({
        "success": true,
        "review": "Readable and idiomatic.",
        "detected_language": "Rust"
    }))
    .into_response()
}

async fn statistics(
    State(state): State<Arc<FakeState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.api_hits.fetch_add(1, Ordering::SeqCst);
    if params.get("session_id").map(String::as_str) != Some(SESSION_ID) {
        return not_found("Session not found.");
    }
    Json(json!({
        "success": true,
        "bar_chart": {
            "labels": ["HR", "Technical"],
            "datasets": [{ "label": "Performance Score", "data": [7, 0] }]
        },
        "pie_chart": {
            "labels": ["Theory", "Practical"],
            "datasets": [{ "data": [0, 0] }]
        }
    }))
    .into_response()
}
