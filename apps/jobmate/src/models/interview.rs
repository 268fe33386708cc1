#![allow(dead_code)]

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewType {
    #[default]
    Hr,
    Technical,
    Mixed,
    NonTechnical,
}

impl InterviewType {
    pub fn as_str(self) -> &'static str {
        match self {
            InterviewType::Hr => "hr",
            InterviewType::Technical => "technical",
            InterviewType::Mixed => "mixed",
            InterviewType::NonTechnical => "non_technical",
        }
    }
}

impl fmt::Display for InterviewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterviewType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "hr" => Ok(InterviewType::Hr),
            "technical" | "tech" => Ok(InterviewType::Technical),
            "mixed" => Ok(InterviewType::Mixed),
            "non_technical" => Ok(InterviewType::NonTechnical),
            other => Err(format!(
                "unknown interview type '{other}' (expected hr, technical, mixed or non_technical)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewLength {
    #[default]
    Short,
    Medium,
    Long,
}

impl InterviewLength {
    /// Number of questions the backend plans for this length. Used for
    /// progress display only; completion is always signalled by the backend.
    pub fn expected_questions(self) -> usize {
        match self {
            InterviewLength::Short => 4,
            InterviewLength::Medium => 7,
            InterviewLength::Long => 10,
        }
    }
}

impl FromStr for InterviewLength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(InterviewLength::Short),
            "medium" => Ok(InterviewLength::Medium),
            "long" => Ok(InterviewLength::Long),
            other => Err(format!(
                "unknown interview length '{other}' (expected short, medium or long)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: String,
}

/// Backend evaluation of one answered question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub evaluation: String,
    #[serde(rename = "type", default)]
    pub question_type: String,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct GenerateQuestionRequest<'a> {
    pub job_description: &'a str,
    pub interview_type: InterviewType,
    pub length: InterviewLength,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateQuestionResponse {
    #[serde(default)]
    pub success: bool,
    pub session_id: String,
    pub current_question: String,
    #[serde(default)]
    pub question_type: Option<String>,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default)]
    pub next_question: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitAnswerRequest<'a> {
    pub session_id: &'a str,
    pub answer: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitAnswerResponse {
    #[serde(default)]
    pub success: bool,
    pub feedback: FeedbackRecord,
    #[serde(default)]
    pub next_question: Option<String>,
    #[serde(default)]
    pub question_type: Option<String>,
    #[serde(default)]
    pub is_complete: bool,
}

/// Server-side view of an interview session.
///
/// Question entries are kept as raw JSON: depending on the backend version
/// they are plain strings or `{text, type}` objects.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub questions: Vec<serde_json::Value>,
    #[serde(default)]
    pub feedback: Vec<FeedbackRecord>,
}

impl SessionRecord {
    pub fn question_texts(&self) -> Vec<&str> {
        self.questions
            .iter()
            .filter_map(|q| q.as_str().or_else(|| q.get("text").and_then(|t| t.as_str())))
            .collect()
    }
}

/// A finished interview as persisted for the statistics view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSnapshot {
    pub session_id: String,
    pub questions: Vec<Question>,
    pub feedback: Vec<FeedbackRecord>,
    pub interview_type: InterviewType,
    pub timestamp: DateTime<Utc>,
}
