//! API client: the single point of entry for all JobMate backend calls.
//!
//! Every request carries the UI language as `Accept-Language`. Inputs that
//! can be checked locally (empty job description, wrong file type, ...) are
//! rejected before any request is sent. There are no automatic retries;
//! availability is the health poller's job.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT_LANGUAGE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::errors::{extract_error_message, ClientError};
use crate::health::{HealthChecker, CheckOutcome};
use crate::i18n::{Language, MessageKey};
use crate::interview::InterviewService;
use crate::models::code_review::{CodeReviewRequest, CodeReviewResponse};
use crate::models::cover_letter::{CoverLetterRequest, CoverLetterResponse};
use crate::models::cv::{
    CvAnalysisResponse, CvListResponse, CvRawTextResponse, CvSkillsResponse, CvUploadResponse,
    DeleteCvResponse,
};
use crate::models::health::HealthReport;
use crate::models::interview::{
    GenerateQuestionRequest, GenerateQuestionResponse, SessionRecord, SubmitAnswerRequest,
    SubmitAnswerResponse,
};
use crate::models::job_match::{JobMatchRequest, JobMatchResponse, MatchResult};
use crate::models::statistics::StatisticsResponse;

#[cfg(test)]
pub(crate) mod fake_backend;
pub mod paths;

/// Upload ceiling enforced by the backend; checked locally first.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
const ALLOWED_EXTENSIONS: [&str; 2] = ["pdf", "docx"];

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    language: Language,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        language: Language,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url,
            language,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `path` followed by `segments`, each percent-encoded as one segment.
    fn resource_url(&self, path: &str, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url =
            Url::parse(&self.url(path)).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn fetch<T: DeserializeOwned>(&self, method: Method, url: Url) -> Result<T, ClientError> {
        debug!("{method} {}", url.path());
        let response = self
            .client
            .request(method, url)
            .header(ACCEPT_LANGUAGE, self.language.code())
            .send()
            .await?;
        decode(response).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        debug!("GET {path}");
        let response = self
            .client
            .get(self.url(path))
            .header(ACCEPT_LANGUAGE, self.language.code())
            .query(query)
            .send()
            .await?;
        decode(response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        debug!("POST {path}");
        let response = self
            .client
            .post(self.url(path))
            .header(ACCEPT_LANGUAGE, self.language.code())
            .json(body)
            .send()
            .await?;
        decode(response).await
    }

    // ────────────────────────────────────────────────────────────────────
    // CV analyzer
    // ────────────────────────────────────────────────────────────────────

    /// Uploads a PDF or DOCX resume for parsing and AI analysis.
    pub async fn upload_cv(&self, path: &Path) -> Result<CvUploadResponse, ClientError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ClientError::Validation(MessageKey::UnsupportedFileType));
        }

        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            warn!("Cannot stat {}: {e}", path.display());
            ClientError::Validation(MessageKey::FileUnreadable)
        })?;
        if metadata.len() > MAX_UPLOAD_BYTES {
            return Err(ClientError::Validation(MessageKey::FileTooLarge));
        }
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            warn!("Cannot read {}: {e}", path.display());
            ClientError::Validation(MessageKey::FileUnreadable)
        })?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("resume")
            .to_string();
        let mime = if extension == "pdf" {
            "application/pdf"
        } else {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        };
        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name).mime_str(mime)?);

        debug!("POST {} ({} bytes)", paths::CV_UPLOAD, metadata.len());
        let response = self
            .client
            .post(self.url(paths::CV_UPLOAD))
            .header(ACCEPT_LANGUAGE, self.language.code())
            .multipart(form)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn list_cvs(&self) -> Result<CvListResponse, ClientError> {
        self.get_json(paths::CV_LIST, &[]).await
    }

    /// Stored analysis of an uploaded CV.
    pub async fn get_cv(&self, cv_id: &str) -> Result<CvAnalysisResponse, ClientError> {
        let url = self.cv_url(cv_id, None)?;
        self.fetch(Method::GET, url).await
    }

    pub async fn cv_skills(&self, cv_id: &str) -> Result<CvSkillsResponse, ClientError> {
        let url = self.cv_url(cv_id, Some("skills"))?;
        self.fetch(Method::GET, url).await
    }

    pub async fn cv_raw_text(&self, cv_id: &str) -> Result<CvRawTextResponse, ClientError> {
        let url = self.cv_url(cv_id, Some("raw-text"))?;
        self.fetch(Method::GET, url).await
    }

    pub async fn delete_cv(&self, cv_id: &str) -> Result<DeleteCvResponse, ClientError> {
        let url = self.cv_url(cv_id, None)?;
        self.fetch(Method::DELETE, url).await
    }

    fn cv_url(&self, cv_id: &str, sub: Option<&str>) -> Result<Url, ClientError> {
        let cv_id = cv_id.trim();
        if cv_id.is_empty() {
            return Err(ClientError::Validation(MessageKey::CvIdRequired));
        }
        match sub {
            Some(sub) => self.resource_url(paths::CV, &[cv_id, sub]),
            None => self.resource_url(paths::CV, &[cv_id]),
        }
    }

    // ────────────────────────────────────────────────────────────────────
    // Cover letter, job scanner, code review, statistics
    // ────────────────────────────────────────────────────────────────────

    pub async fn generate_cover_letter(
        &self,
        cv_id: &str,
        job_description: &str,
        language: &str,
    ) -> Result<CoverLetterResponse, ClientError> {
        require_cv_and_description(cv_id, job_description)?;
        self.post_json(
            paths::COVER_LETTER,
            &CoverLetterRequest {
                cv_id: cv_id.trim(),
                job_description: job_description.trim(),
                language,
            },
        )
        .await
    }

    /// Matches a stored CV against a job description. The two response
    /// layouts are resolved here into a [`MatchResult`].
    pub async fn match_job(
        &self,
        cv_id: &str,
        job_description: &str,
    ) -> Result<MatchResult, ClientError> {
        require_cv_and_description(cv_id, job_description)?;
        let raw: JobMatchResponse = self
            .post_json(
                paths::JOB_MATCH,
                &JobMatchRequest {
                    cv_id: cv_id.trim(),
                    job_description: job_description.trim(),
                },
            )
            .await?;
        Ok(MatchResult::from(raw))
    }

    pub async fn review_code(&self, code: &str) -> Result<CodeReviewResponse, ClientError> {
        if code.trim().is_empty() {
            return Err(ClientError::Validation(MessageKey::CodeRequired));
        }
        self.post_json(paths::CODE_REVIEW, &CodeReviewRequest { code })
            .await
    }

    /// Server-side record of an interview session, including its feedback.
    pub async fn fetch_session(&self, session_id: &str) -> Result<SessionRecord, ClientError> {
        let url = self.resource_url(paths::INTERVIEW_SESSION, &[session_id.trim()])?;
        self.fetch(Method::GET, url).await
    }

    pub async fn statistics(&self, session_id: &str) -> Result<StatisticsResponse, ClientError> {
        self.get_json(paths::STATISTICS, &[("session_id", session_id)])
            .await
    }
}

fn require_cv_and_description(cv_id: &str, job_description: &str) -> Result<(), ClientError> {
    if cv_id.trim().is_empty() {
        return Err(ClientError::Validation(MessageKey::CvIdRequired));
    }
    if job_description.trim().is_empty() {
        return Err(ClientError::Validation(MessageKey::JobDescriptionRequired));
    }
    Ok(())
}

/// Maps a response to `T`, or to `Api`/`UnexpectedStatus` for non-2xx.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(match extract_error_message(&body) {
            Some(message) => ClientError::Api {
                status: status.as_u16(),
                message,
            },
            None => {
                warn!("Backend returned {status} without a readable error body");
                ClientError::UnexpectedStatus {
                    status: status.as_u16(),
                }
            }
        });
    }
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl HealthChecker for ApiClient {
    async fn check_health(&self) -> CheckOutcome {
        let response = match self
            .client
            .get(self.url(paths::HEALTH))
            .header(ACCEPT_LANGUAGE, self.language.code())
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return CheckOutcome::Failed(format!("Cannot reach backend: {e}")),
        };

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::SERVICE_UNAVAILABLE {
            return CheckOutcome::Failed(format!("Unexpected health status {status}"));
        }

        let report = match response.bytes().await {
            Ok(bytes) if bytes.is_empty() => HealthReport::default(),
            Ok(bytes) => match serde_json::from_slice::<HealthReport>(&bytes) {
                Ok(report) => report,
                Err(e) => return CheckOutcome::Failed(format!("Unreadable health response: {e}")),
            },
            Err(e) => return CheckOutcome::Failed(format!("Health response interrupted: {e}")),
        };

        if status == StatusCode::OK {
            CheckOutcome::Ready(report)
        } else {
            CheckOutcome::Starting(report)
        }
    }
}

#[async_trait]
impl InterviewService for ApiClient {
    async fn generate_question(
        &self,
        request: GenerateQuestionRequest<'_>,
    ) -> Result<GenerateQuestionResponse, ClientError> {
        self.post_json(paths::INTERVIEW_QUESTIONS, &request).await
    }

    async fn submit_answer(
        &self,
        request: SubmitAnswerRequest<'_>,
    ) -> Result<SubmitAnswerResponse, ClientError> {
        self.post_json(paths::INTERVIEW_ANSWER, &request).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::fake_backend::FakeBackend;
    use super::*;
    use crate::health::{HealthPoller, HealthStatus, PollPolicy};
    use crate::interview::InterviewController;
    use crate::models::interview::{InterviewLength, InterviewType};
    use crate::session_store::{MemorySessionStore, SessionStore};

    #[tokio::test]
    async fn test_health_ready() {
        let backend = FakeBackend::start().await;
        let outcome = backend.client().check_health().await;
        let CheckOutcome::Ready(report) = outcome else {
            panic!("expected ready, got {outcome:?}");
        };
        assert_eq!(report.uptime_seconds, Some(120.0));
        assert_eq!(report.services.get("ai_client"), Some(&true));
    }

    #[tokio::test]
    async fn test_health_starting_then_ready() {
        let backend = FakeBackend::start_warming(1).await;
        let client = backend.client();

        let first = client.check_health().await;
        let CheckOutcome::Starting(report) = first else {
            panic!("expected starting, got {first:?}");
        };
        assert_eq!(report.detail_message(), Some("Loading AI models"));
        assert!(matches!(client.check_health().await, CheckOutcome::Ready(_)));
    }

    #[tokio::test]
    async fn test_health_unexpected_status_is_failure() {
        let backend = FakeBackend::start_with_health_status(500).await;
        let outcome = backend.client().check_health().await;
        assert!(
            matches!(&outcome, CheckOutcome::Failed(msg) if msg.contains("500")),
            "got {outcome:?}"
        );
    }

    #[tokio::test]
    async fn test_health_unreachable_is_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            ApiClient::new(format!("http://{addr}"), Language::En, Duration::from_secs(2)).unwrap();
        assert!(matches!(
            client.check_health().await,
            CheckOutcome::Failed(_)
        ));
    }

    #[tokio::test]
    async fn test_poller_against_warming_backend() {
        let backend = FakeBackend::start_warming(3).await;
        let policy = PollPolicy {
            retry_delay: Duration::from_millis(10),
            max_retries: 10,
            recheck_interval: Duration::from_secs(60),
        };
        let handle = HealthPoller::spawn(Arc::new(backend.client()), policy);

        tokio::time::timeout(Duration::from_secs(5), handle.wait_until_ready())
            .await
            .expect("poller should settle")
            .expect("backend should become ready");

        let state = handle.state();
        assert_eq!(state.status, HealthStatus::Ready);
        assert_eq!(state.retry_count, 3);
        assert_eq!(backend.health_hits(), 4);
    }

    #[tokio::test]
    async fn test_interview_flow_over_http() {
        let backend = FakeBackend::start().await;
        let store = Arc::new(MemorySessionStore::default());
        let mut ctl = InterviewController::new(
            Arc::new(backend.client()),
            store.clone(),
            Language::En,
        );

        assert!(
            ctl.start_interview("Backend engineer, Rust", InterviewType::Technical, InterviewLength::Short)
                .await
        );
        while !ctl.session().is_complete() {
            assert!(ctl.submit_answer("I would profile first").await);
        }

        assert_eq!(ctl.session().feedback().len(), 4);
        assert_eq!(ctl.session().questions().len(), 4);
        assert_eq!(ctl.session().feedback()[3].score, Some(8.0));
        let stored = store.load().unwrap().unwrap();
        assert_eq!(stored.session_id, "fake-session");
        assert_eq!(stored.feedback.len(), 4);
    }

    #[tokio::test]
    async fn test_fetch_session_after_answers() {
        let backend = FakeBackend::start().await;
        let client = backend.client();
        let mut ctl = InterviewController::new(
            Arc::new(client.clone()),
            Arc::new(MemorySessionStore::default()),
            Language::En,
        );
        assert!(ctl.start_interview("SRE", InterviewType::Hr, InterviewLength::Short).await);
        assert!(ctl.submit_answer("On-call rotations").await);

        let record = client.fetch_session("fake-session").await.unwrap();
        assert_eq!(record.session_id, "fake-session");
        assert_eq!(record.feedback.len(), 1);
        assert_eq!(record.feedback[0].answer, "On-call rotations");

        let err = client.fetch_session("nope").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_resource_url_encodes_each_segment() {
        let client =
            ApiClient::new("http://localhost:8000/", Language::En, Duration::from_secs(1)).unwrap();
        let url = client
            .resource_url(paths::INTERVIEW_SESSION, &["a/b?c#d"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/interview/session/a%2Fb%3Fc%23d"
        );
        let url = client.resource_url(paths::CV, &["7", "raw-text"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/cv/7/raw-text");
    }

    #[tokio::test]
    async fn test_fetch_session_id_stays_one_segment() {
        let backend = FakeBackend::start().await;
        let err = backend.client().fetch_session("a/b?c#d").await.unwrap_err();
        assert_eq!(err.user_message(Language::En), "Session a/b?c#d not found.");
    }

    #[tokio::test]
    async fn test_cv_show_skills_text_and_delete() {
        let backend = FakeBackend::start().await;
        let client = backend.client();

        let cv = client.get_cv("1").await.unwrap();
        assert_eq!(cv.filename, "resume.pdf");
        assert_eq!(cv.analysis.word_count, 3);
        assert_eq!(cv.analysis.missing_sections, vec!["summary"]);

        let skills = client.cv_skills("1").await.unwrap();
        assert_eq!(skills.skills, vec!["rust", "sql"]);
        assert_eq!(skills.total_skills, 2);

        let text = client.cv_raw_text("1").await.unwrap();
        assert_eq!(text.raw_text, "Rust SQL engineer");
        assert_eq!(text.character_count, 17);

        let deleted = client.delete_cv("1").await.unwrap();
        assert!(deleted.success);
        assert!(client.get_cv("1").await.unwrap_err().is_not_found());
        assert!(client.delete_cv("1").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_cv_lookup_requires_id() {
        let backend = FakeBackend::start().await;
        let err = backend.client().cv_skills("  ").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(MessageKey::CvIdRequired)));
        assert_eq!(backend.api_hits(), 0);
    }

    #[tokio::test]
    async fn test_structured_error_is_surfaced_verbatim() {
        let backend = FakeBackend::start().await;
        let err = backend
            .client()
            .generate_cover_letter("missing", "Rust developer", "English")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(
            err.user_message(Language::En),
            "CV not found. Please upload your CV first."
        );
    }

    #[tokio::test]
    async fn test_cover_letter_success() {
        let backend = FakeBackend::start().await;
        let letter = backend
            .client()
            .generate_cover_letter("1", "Rust developer at Acme", "English")
            .await
            .unwrap();
        assert!(letter.cover_letter.contains("Rust developer at Acme"));
        assert_eq!(letter.company_name.as_deref(), Some("Acme"));
    }

    #[tokio::test]
    async fn test_local_validation_sends_nothing() {
        let backend = FakeBackend::start().await;
        let client = backend.client();

        let err = client.generate_cover_letter("1", "  ", "English").await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Validation(MessageKey::JobDescriptionRequired)
        ));
        let err = client.review_code("\n\t").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(MessageKey::CodeRequired)));
        let err = client.match_job("", "jd").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(MessageKey::CvIdRequired)));

        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("resume.txt");
        std::fs::write(&txt, "plain text").unwrap();
        let err = client.upload_cv(&txt).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Validation(MessageKey::UnsupportedFileType)
        ));

        assert_eq!(backend.api_hits(), 0);
    }

    #[tokio::test]
    async fn test_oversized_upload_rejected_locally() {
        let backend = FakeBackend::start().await;
        let dir = tempfile::tempdir().unwrap();
        let big = dir.path().join("resume.pdf");
        let file = std::fs::File::create(&big).unwrap();
        file.set_len(MAX_UPLOAD_BYTES + 1).unwrap();

        let err = backend.client().upload_cv(&big).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(MessageKey::FileTooLarge)));
        assert_eq!(backend.api_hits(), 0);
    }

    #[tokio::test]
    async fn test_upload_cv_sends_multipart_file() {
        let backend = FakeBackend::start().await;
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("Jane_Doe.PDF");
        std::fs::write(&pdf, b"%PDF-1.4 fake").unwrap();

        let resp = backend.client().upload_cv(&pdf).await.unwrap();
        assert_eq!(resp.filename, "Jane_Doe.PDF");
        assert_eq!(resp.analysis.word_count, 13);
        assert_eq!(resp.skills(), ["rust".to_string(), "sql".to_string()]);
    }

    #[tokio::test]
    async fn test_list_cvs() {
        let backend = FakeBackend::start().await;
        let list = backend.client().list_cvs().await.unwrap();
        assert_eq!(list.total_cvs, 1);
        assert_eq!(list.cvs[0].filename, "resume.pdf");
    }

    #[tokio::test]
    async fn test_match_job_resolves_suggestion_layout() {
        let backend = FakeBackend::start().await;
        let result = backend
            .client()
            .match_job("1", "Rust and Kubernetes")
            .await
            .unwrap();
        assert!(matches!(result, MatchResult::SuggestionBased(_)));
        assert_eq!(result.overlap().match_percent, 50);
        assert_eq!(result.suggestions().len(), 1);
    }

    #[tokio::test]
    async fn test_review_code() {
        let backend = FakeBackend::start().await;
        let review = backend
            .client()
            .review_code("fn main() { println!(\"hi\"); }")
            .await
            .unwrap();
        assert_eq!(review.detected_language, "Rust");
    }

    #[tokio::test]
    async fn test_statistics_passes_session_id() {
        let backend = FakeBackend::start().await;
        let stats = backend.client().statistics("fake-session").await.unwrap();
        assert_eq!(stats.bar_chart.series()[0], ("HR", 7.0));

        let err = backend.client().statistics("unknown").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_bad_gateway_without_body_is_unexpected_status() {
        let backend = FakeBackend::start().await;
        let err = backend.client().review_code("boom").await.unwrap_err();
        assert!(matches!(err, ClientError::UnexpectedStatus { status: 502 }));
    }
}
