#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Section analysis and AI feedback returned after a CV upload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CvAnalysis {
    /// Detected section structure; passed through unchanged.
    #[serde(default)]
    pub structure: Value,
    #[serde(default)]
    pub ai_feedback: String,
    #[serde(default)]
    pub extracted_skills: Vec<String>,
    #[serde(default)]
    pub word_count: u32,
    #[serde(default)]
    pub missing_sections: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvUploadResponse {
    #[serde(default)]
    pub success: bool,
    pub cv_id: String,
    pub filename: String,
    #[serde(default)]
    pub parsed_data: Value,
    #[serde(default)]
    pub extracted_skills: Vec<String>,
    #[serde(default)]
    pub analysis: CvAnalysis,
}

impl CvUploadResponse {
    /// Skills from the top level, falling back to the analysis block.
    pub fn skills(&self) -> &[String] {
        if self.extracted_skills.is_empty() {
            &self.analysis.extracted_skills
        } else {
            &self.extracted_skills
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvData {
    #[serde(alias = "cv_id")]
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub extracted_skills: Vec<String>,
    #[serde(default)]
    pub upload_timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CvListResponse {
    #[serde(default)]
    pub cvs: Vec<CvData>,
    #[serde(default)]
    pub total_cvs: u32,
}

/// Stored analysis of one CV, as returned by `GET /api/cv/{cv_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvAnalysisResponse {
    pub cv_id: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub analysis: CvAnalysis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvSkillsResponse {
    pub cv_id: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub total_skills: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvRawTextResponse {
    pub cv_id: String,
    #[serde(default)]
    pub raw_text: String,
    #[serde(default)]
    pub word_count: u32,
    #[serde(default)]
    pub character_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteCvResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}
