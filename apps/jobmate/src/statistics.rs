//! Interview statistics: server charts when the backend still knows the
//! session, otherwise a local summary of the last stored interview.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::api_client::ApiClient;
use crate::errors::ClientError;
use crate::models::interview::{FeedbackRecord, InterviewSnapshot, InterviewType, SessionRecord};
use crate::models::statistics::{ChartData, Dataset, StatisticsResponse};
use crate::session_store::SessionStore;

/// Weight given to an answered question the backend did not score.
const UNSCORED_WEIGHT: f64 = 7.0;
const MAX_SCORE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatisticsSource {
    Server,
    Local,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsReport {
    pub source: StatisticsSource,
    pub session_id: String,
    pub answered: usize,
    pub average_score: f64,
    pub bar_chart: ChartData,
    pub pie_chart: ChartData,
}

/// Mean of the scores within `0..=10`, rounded to one decimal. `0.0` when
/// nothing was scored.
pub fn calculate_average_score(feedback: &[FeedbackRecord]) -> f64 {
    let scores: Vec<f64> = feedback
        .iter()
        .filter_map(|fb| fb.score)
        .filter(|s| (0.0..=MAX_SCORE).contains(s))
        .collect();
    if scores.is_empty() {
        return 0.0;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    (mean * 10.0).round() / 10.0
}

enum Category {
    Hr,
    TechnicalTheory,
    TechnicalPractical,
}

fn categorize(fb: &FeedbackRecord, interview_type: InterviewType) -> Category {
    let kind = if fb.question_type.is_empty() {
        interview_type.as_str()
    } else {
        fb.question_type.as_str()
    };
    match kind.to_ascii_lowercase().as_str() {
        "hr" | "non_technical" | "behavioral" => Category::Hr,
        _ if fb.question.to_lowercase().contains("theory") => Category::TechnicalTheory,
        _ => Category::TechnicalPractical,
    }
}

fn chart(labels: [&str; 2], label: Option<&str>, data: [f64; 2]) -> ChartData {
    ChartData {
        labels: labels.iter().map(|l| l.to_string()).collect(),
        datasets: vec![Dataset {
            label: label.map(str::to_string),
            data: data.to_vec(),
        }],
    }
}

fn aggregate(
    source: StatisticsSource,
    session_id: String,
    feedback: &[FeedbackRecord],
    interview_type: InterviewType,
) -> StatisticsReport {
    let (mut hr, mut theory, mut practical) = (0.0, 0.0, 0.0);
    for fb in feedback {
        let weight = fb
            .score
            .filter(|s| (0.0..=MAX_SCORE).contains(s))
            .unwrap_or(UNSCORED_WEIGHT);
        match categorize(fb, interview_type) {
            Category::Hr => hr += weight,
            Category::TechnicalTheory => theory += weight,
            Category::TechnicalPractical => practical += weight,
        }
    }

    StatisticsReport {
        source,
        session_id,
        answered: feedback.len(),
        average_score: calculate_average_score(feedback),
        bar_chart: chart(["HR", "Technical"], Some("Performance Score"), [hr, theory + practical]),
        pie_chart: chart(["Theory", "Practical"], None, [theory, practical]),
    }
}

/// Local aggregation of a stored interview.
pub fn summarize(snapshot: &InterviewSnapshot) -> StatisticsReport {
    aggregate(
        StatisticsSource::Local,
        snapshot.session_id.clone(),
        &snapshot.feedback,
        snapshot.interview_type,
    )
}

/// Backend calls the statistics view needs.
#[async_trait]
pub trait StatisticsService: Send + Sync {
    async fn statistics(&self, session_id: &str) -> Result<StatisticsResponse, ClientError>;
    async fn fetch_session(&self, session_id: &str) -> Result<SessionRecord, ClientError>;
}

#[async_trait]
impl StatisticsService for ApiClient {
    async fn statistics(&self, session_id: &str) -> Result<StatisticsResponse, ClientError> {
        ApiClient::statistics(self, session_id).await
    }

    async fn fetch_session(&self, session_id: &str) -> Result<SessionRecord, ClientError> {
        ApiClient::fetch_session(self, session_id).await
    }
}

pub struct StatisticsView {
    service: Arc<dyn StatisticsService>,
    store: Arc<dyn SessionStore>,
}

impl StatisticsView {
    pub fn new(service: Arc<dyn StatisticsService>, store: Arc<dyn SessionStore>) -> Self {
        Self { service, store }
    }

    /// Server statistics for `session_id` when the backend answers, else the
    /// stored snapshot, else `None`.
    pub async fn load(&self, session_id: Option<&str>) -> Option<StatisticsReport> {
        if let Some(id) = session_id.map(str::trim).filter(|id| !id.is_empty()) {
            match self.from_server(id).await {
                Ok(report) => return Some(report),
                Err(e) => warn!("Server statistics for {id} unavailable, using stored interview: {e}"),
            }
        }

        match self.store.load() {
            Ok(Some(snapshot)) => {
                info!("Summarizing stored interview {}", snapshot.session_id);
                Some(summarize(&snapshot))
            }
            Ok(None) => {
                debug!("No stored interview to summarize");
                None
            }
            Err(e) => {
                warn!("Cannot read stored interview: {e}");
                None
            }
        }
    }

    async fn from_server(&self, session_id: &str) -> Result<StatisticsReport, ClientError> {
        let response = self.service.statistics(session_id).await?;

        // The charts endpoint carries no per-answer data; the session record
        // fills in the count and average when available.
        let (answered, average) = match self.service.fetch_session(session_id).await {
            Ok(record) => (
                record.feedback.len(),
                calculate_average_score(&record.feedback),
            ),
            Err(e) => {
                debug!("Session record for {session_id} unavailable: {e}");
                (0, 0.0)
            }
        };

        Ok(StatisticsReport {
            source: StatisticsSource::Server,
            session_id: session_id.to_string(),
            answered,
            average_score: response.average_score.unwrap_or(average),
            bar_chart: response.bar_chart,
            pie_chart: response.pie_chart,
        })
    }
}
