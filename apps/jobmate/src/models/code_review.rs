#![allow(dead_code)]

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct CodeReviewRequest<'a> {
    pub code: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeReviewResponse {
    #[serde(default)]
    pub success: bool,
    pub review: String,
    #[serde(default = "unknown_language")]
    pub detected_language: String,
}

fn unknown_language() -> String {
    "Unknown".to_string()
}
