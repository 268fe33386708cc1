use chrono::{DateTime, Utc};

use crate::models::interview::{FeedbackRecord, InterviewSnapshot, InterviewType, Question};

/// One end-to-end interview attempt.
///
/// Questions and feedback are append-only and index-aligned: `feedback[i]`
/// answers `questions[i]`, and `feedback.len() <= questions.len()` always.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterviewSession {
    session_id: Option<String>,
    interview_type: InterviewType,
    questions: Vec<Question>,
    current_question_index: usize,
    feedback: Vec<FeedbackRecord>,
    is_complete: bool,
}

impl InterviewSession {
    pub fn new(interview_type: InterviewType) -> Self {
        Self {
            interview_type,
            ..Self::default()
        }
    }

    /// Starts a fresh session from the backend's first question.
    pub fn begin(interview_type: InterviewType, session_id: String, first_question: Question) -> Self {
        Self {
            session_id: Some(session_id),
            interview_type,
            questions: vec![first_question],
            current_question_index: 0,
            feedback: Vec::new(),
            is_complete: false,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn interview_type(&self) -> InterviewType {
        self.interview_type
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn feedback(&self) -> &[FeedbackRecord] {
        &self.feedback
    }

    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    /// The question awaiting an answer, if any.
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_complete || self.feedback.len() > self.current_question_index {
            return None;
        }
        self.questions.get(self.current_question_index)
    }

    /// Records the evaluation of the current question. The stored question
    /// text is always the one that was asked, whatever the backend echoed.
    pub fn record_feedback(&mut self, mut record: FeedbackRecord) -> bool {
        let Some(asked) = self.current_question() else {
            return false;
        };
        if record.question != asked.text {
            tracing::debug!("Backend echoed a different question text, keeping the asked one");
            record.question = asked.text.clone();
        }
        if record.question_type.is_empty() {
            record.question_type = asked.question_type.clone();
        }
        self.feedback.push(record);
        true
    }

    /// Appends the next question and moves the cursor to it. Only valid once
    /// every previous question has feedback.
    pub fn push_question(&mut self, question: Question) -> bool {
        if self.is_complete || self.feedback.len() != self.questions.len() {
            return false;
        }
        self.questions.push(question);
        self.current_question_index = self.questions.len() - 1;
        true
    }

    pub fn mark_complete(&mut self) {
        self.is_complete = true;
    }

    pub fn snapshot(&self, timestamp: DateTime<Utc>) -> Option<InterviewSnapshot> {
        Some(InterviewSnapshot {
            session_id: self.session_id.clone()?,
            questions: self.questions.clone(),
            feedback: self.feedback.clone(),
            interview_type: self.interview_type,
            timestamp,
        })
    }
}
