//! Backend endpoint paths, relative to the configured base URL.

pub const HEALTH: &str = "/health";
pub const CV_UPLOAD: &str = "/api/cv/upload";
pub const CV_LIST: &str = "/api/cv/list";
/// Followed by `/{cv_id}`, optionally `/skills` or `/raw-text`.
pub const CV: &str = "/api/cv";
pub const COVER_LETTER: &str = "/api/cover-letter/generate";
pub const JOB_MATCH: &str = "/api/job-scanner/match";
pub const INTERVIEW_QUESTIONS: &str = "/api/interview/generate-questions";
pub const INTERVIEW_ANSWER: &str = "/api/interview/submit-answer";
/// Followed by `/{session_id}`.
pub const INTERVIEW_SESSION: &str = "/api/interview/session";
pub const CODE_REVIEW: &str = "/api/code-review/review";
pub const STATISTICS: &str = "/api/statistics/charts";
