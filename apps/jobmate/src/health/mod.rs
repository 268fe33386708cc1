//! Backend availability: a pure polling state machine plus the tokio task
//! that drives it.
//!
//! `machine` holds every transition rule and is tested without timers.
//! `poller` owns the timers, publishes state over a `watch` channel and is
//! torn down when its handle is dropped.

pub mod machine;
pub mod poller;

use async_trait::async_trait;

use crate::i18n::{translate, Language, MessageKey};
use crate::models::health::HealthReport;

pub use machine::{BackendHealthState, HealthMachine, HealthStatus, NextCheck, PollPolicy};
pub use poller::{HealthHandle, HealthPoller};

/// Result of a single health request. Checks never fail: every transport or
/// decoding problem is folded into `Failed`.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// `200`: backend accepts requests.
    Ready(HealthReport),
    /// `503` with a body: backend is up but still warming.
    Starting(HealthReport),
    /// Network error, unexpected status or unreadable body.
    Failed(String),
}

#[async_trait]
pub trait HealthChecker: Send + Sync {
    async fn check_health(&self) -> CheckOutcome;
}

/// Text for the availability overlay. Empty once the backend is ready.
pub fn overlay_message(state: &BackendHealthState, policy: &PollPolicy, lang: Language) -> String {
    match state.status {
        HealthStatus::Checking => translate(lang, MessageKey::BackendChecking).to_string(),
        HealthStatus::Starting => {
            let base = translate(lang, MessageKey::BackendStarting);
            match state.uptime_seconds {
                Some(uptime) => format!(
                    "{base} ({uptime:.0}s, {}/{})",
                    state.retry_count, policy.max_retries
                ),
                None => format!("{base} ({}/{})", state.retry_count, policy.max_retries),
            }
        }
        HealthStatus::Ready => String::new(),
        HealthStatus::Error if state.is_exhausted(policy) => {
            translate(lang, MessageKey::BackendTooSlow).to_string()
        }
        HealthStatus::Error => {
            let base = translate(lang, MessageKey::BackendUnavailable);
            match &state.last_error {
                Some(detail) => format!("{base} {detail}"),
                None => base.to_string(),
            }
        }
    }
}
