//! Job-match results.
//!
//! The backend answers in two shapes: the older skill-overlap payload, and a
//! newer one that adds structured improvement suggestions. Both are resolved
//! once into [`MatchResult`] so rendering code never inspects optional fields.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct JobMatchRequest<'a> {
    pub cv_id: &'a str,
    pub job_description: &'a str,
}

/// Requirements the backend extracted from the job description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobInfo {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub soft_skills: Vec<String>,
}

/// A structured improvement recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(default)]
    pub category: String,
    #[serde(alias = "suggestion", alias = "text")]
    pub description: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub skill: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillOverlap {
    pub match_percent: u32,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub soft_skill_percent: u32,
    pub matched_soft_skills: Vec<String>,
    pub missing_soft_skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegacyMatchResult {
    pub overlap: SkillOverlap,
    pub job_info: JobInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionBasedMatchResult {
    pub overlap: SkillOverlap,
    pub job_info: JobInfo,
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    Legacy(LegacyMatchResult),
    SuggestionBased(SuggestionBasedMatchResult),
}

impl MatchResult {
    pub fn overlap(&self) -> &SkillOverlap {
        match self {
            MatchResult::Legacy(r) => &r.overlap,
            MatchResult::SuggestionBased(r) => &r.overlap,
        }
    }

    pub fn job_info(&self) -> &JobInfo {
        match self {
            MatchResult::Legacy(r) => &r.job_info,
            MatchResult::SuggestionBased(r) => &r.job_info,
        }
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        match self {
            MatchResult::Legacy(_) => &[],
            MatchResult::SuggestionBased(r) => &r.suggestions,
        }
    }
}

/// Raw response of `POST /api/job-scanner/match` as sent over the wire.
#[derive(Debug, Deserialize)]
pub struct JobMatchResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub match_percent: u32,
    #[serde(default)]
    pub matched_skills: Vec<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
    #[serde(default)]
    pub soft_skill_percent: u32,
    #[serde(default)]
    pub matched_soft_skills: Vec<String>,
    #[serde(default)]
    pub missing_soft_skills: Vec<String>,
    #[serde(default)]
    pub job_info: JobInfo,
    #[serde(default)]
    pub suggestions: Option<Vec<Suggestion>>,
}

impl From<JobMatchResponse> for MatchResult {
    fn from(raw: JobMatchResponse) -> Self {
        let overlap = SkillOverlap {
            match_percent: raw.match_percent.min(100),
            matched_skills: raw.matched_skills,
            missing_skills: raw.missing_skills,
            soft_skill_percent: raw.soft_skill_percent.min(100),
            matched_soft_skills: raw.matched_soft_skills,
            missing_soft_skills: raw.missing_soft_skills,
        };
        match raw.suggestions {
            Some(suggestions) if !suggestions.is_empty() => {
                MatchResult::SuggestionBased(SuggestionBasedMatchResult {
                    overlap,
                    job_info: raw.job_info,
                    suggestions,
                })
            }
            _ => MatchResult::Legacy(LegacyMatchResult {
                overlap,
                job_info: raw.job_info,
            }),
        }
    }
}
