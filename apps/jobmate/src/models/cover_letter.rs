#![allow(dead_code)]

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct CoverLetterRequest<'a> {
    pub cv_id: &'a str,
    pub job_description: &'a str,
    pub language: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverLetterResponse {
    #[serde(default)]
    pub success: bool,
    pub cover_letter: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}
