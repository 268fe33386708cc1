use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::i18n::{translate, Language, MessageKey};
use crate::interview::{InterviewService, InterviewSession};
use crate::models::interview::{
    GenerateQuestionRequest, InterviewLength, InterviewType, Question, SubmitAnswerRequest,
    SubmitAnswerResponse,
};
use crate::session_store::SessionStore;

/// Drives an interview: owns the session plus the form state around it
/// (job description, selected type and length, answer draft, loading flag,
/// last error).
///
/// Every backend failure is caught here and turned into one user-visible
/// string in [`error`](Self::error); the session is left as it was so the
/// same step can be retried.
pub struct InterviewController {
    service: Arc<dyn InterviewService>,
    store: Arc<dyn SessionStore>,
    language: Language,
    session: InterviewSession,
    interview_type: InterviewType,
    length: InterviewLength,
    job_description: String,
    pub answer_input: String,
    is_loading: bool,
    error: Option<String>,
}

impl InterviewController {
    pub fn new(
        service: Arc<dyn InterviewService>,
        store: Arc<dyn SessionStore>,
        language: Language,
    ) -> Self {
        Self {
            service,
            store,
            language,
            session: InterviewSession::default(),
            interview_type: InterviewType::default(),
            length: InterviewLength::default(),
            job_description: String::new(),
            answer_input: String::new(),
            is_loading: false,
            error: None,
        }
    }

    pub fn session(&self) -> &InterviewSession {
        &self.session
    }

    pub fn interview_type(&self) -> InterviewType {
        self.interview_type
    }

    pub fn length(&self) -> InterviewLength {
        self.length
    }

    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Requests the first question. An empty job description fails locally
    /// without contacting the backend. Returns whether a session was started.
    pub async fn start_interview(
        &mut self,
        job_description: &str,
        interview_type: InterviewType,
        length: InterviewLength,
    ) -> bool {
        self.job_description = job_description.to_string();
        self.interview_type = interview_type;
        self.length = length;
        self.error = None;

        if job_description.trim().is_empty() {
            self.error = Some(translate(self.language, MessageKey::JobDescriptionRequired).to_string());
            return false;
        }

        self.session = InterviewSession::new(interview_type);
        self.answer_input.clear();

        self.is_loading = true;
        let result = self
            .service
            .generate_question(GenerateQuestionRequest {
                job_description: job_description.trim(),
                interview_type,
                length,
            })
            .await;
        self.is_loading = false;

        match result {
            Ok(response) => {
                let first = Question {
                    text: response.current_question,
                    question_type: response
                        .question_type
                        .unwrap_or_else(|| interview_type.as_str().to_string()),
                };
                info!(
                    "Interview {} started ({interview_type}, {length:?})",
                    response.session_id
                );
                self.session = InterviewSession::begin(interview_type, response.session_id, first);
                true
            }
            Err(e) => {
                warn!("Failed to start interview: {e}");
                self.error = Some(e.user_message(self.language));
                false
            }
        }
    }

    /// Sends the answer for the current question. Does nothing when there is
    /// no active session or no open question. Returns whether the answer was
    /// accepted by the backend.
    pub async fn submit_answer(&mut self, answer_text: &str) -> bool {
        let Some(session_id) = self.session.session_id().map(str::to_string) else {
            debug!("Answer ignored: no active session");
            return false;
        };
        if self.session.current_question().is_none() {
            debug!("Answer ignored: no open question in session {session_id}");
            return false;
        }

        self.error = None;
        self.is_loading = true;
        let result = self
            .service
            .submit_answer(SubmitAnswerRequest {
                session_id: &session_id,
                answer: answer_text,
            })
            .await;
        self.is_loading = false;
        self.answer_input.clear();

        match result {
            Ok(response) => {
                self.apply_answer(answer_text, response);
                true
            }
            Err(e) => {
                warn!("Failed to submit answer for session {session_id}: {e}");
                self.error = Some(e.user_message(self.language));
                false
            }
        }
    }

    /// Back to a blank interview; only the selected interview type survives.
    pub fn restart_interview(&mut self) {
        info!("Interview restarted");
        self.session = InterviewSession::new(self.interview_type);
        self.job_description.clear();
        self.answer_input.clear();
        self.is_loading = false;
        self.error = None;
    }

    fn apply_answer(&mut self, answer_text: &str, response: SubmitAnswerResponse) {
        let mut record = response.feedback;
        if record.answer.is_empty() {
            record.answer = answer_text.to_string();
        }
        self.session.record_feedback(record);

        if response.is_complete {
            if response.next_question.is_some() {
                debug!("Discarding next_question sent alongside completion");
            }
            self.finish();
            return;
        }

        match response.next_question {
            Some(text) => {
                let question_type = response
                    .question_type
                    .unwrap_or_else(|| self.interview_type.as_str().to_string());
                self.session.push_question(Question {
                    text,
                    question_type,
                });
            }
            None => {
                warn!("Backend sent neither a next question nor completion; ending interview");
                self.finish();
            }
        }
    }

    fn finish(&mut self) {
        self.session.mark_complete();
        info!(
            "Interview complete: {} questions answered",
            self.session.feedback().len()
        );

        let Some(snapshot) = self.session.snapshot(Utc::now()) else {
            return;
        };
        if let Err(e) = self.store.save(&snapshot) {
            warn!("Could not store finished interview {}: {e}", snapshot.session_id);
        }
    }
}
