use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, warn};

use super::CheckOutcome;

pub const TOO_SLOW_MESSAGE: &str = "Backend is taking too long to start";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Checking,
    Starting,
    Ready,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendHealthState {
    pub status: HealthStatus,
    pub uptime_seconds: Option<f64>,
    pub services: BTreeMap<String, bool>,
    pub last_error: Option<String>,
    /// Consecutive failed checks since the last reset. Never exceeds
    /// `PollPolicy::max_retries`.
    pub retry_count: u32,
}

impl Default for BackendHealthState {
    fn default() -> Self {
        Self {
            status: HealthStatus::Checking,
            uptime_seconds: None,
            services: BTreeMap::new(),
            last_error: None,
            retry_count: 0,
        }
    }
}

impl BackendHealthState {
    /// Polling gave up and waits for an explicit reset.
    pub fn is_exhausted(&self, policy: &PollPolicy) -> bool {
        self.status == HealthStatus::Error && self.retry_count >= policy.max_retries
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    /// Delay before the next check after a failed one.
    pub retry_delay: Duration,
    pub max_retries: u32,
    /// Slow background re-check once the backend is ready.
    pub recheck_interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_secs(2),
            max_retries: 30,
            recheck_interval: Duration::from_secs(30),
        }
    }
}

/// What the driver should do after an outcome has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextCheck {
    After(Duration),
    /// Stop polling until `reset`.
    Halt,
}

/// Backend availability state machine.
///
/// ```text
/// checking ──▶ ready | starting | error
/// starting ──▶ ready | starting | error      (retries)
/// error    ──▶ starting | ready | error      (retries left)
/// any failure with retries exhausted ──▶ error, halt
/// ready    ──(failed re-check)──▶ reset ──▶ checking
/// ```
#[derive(Debug, Clone)]
pub struct HealthMachine {
    state: BackendHealthState,
    policy: PollPolicy,
}

impl HealthMachine {
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            state: BackendHealthState::default(),
            policy,
        }
    }

    pub fn state(&self) -> &BackendHealthState {
        &self.state
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Back to `Checking` with a fresh retry budget and no recorded detail.
    pub fn reset(&mut self) {
        debug!("Health check reset (was {:?})", self.state.status);
        self.state = BackendHealthState::default();
    }

    pub fn on_outcome(&mut self, outcome: CheckOutcome) -> NextCheck {
        let was_ready = self.state.status == HealthStatus::Ready;

        match outcome {
            CheckOutcome::Ready(report) => {
                if !was_ready {
                    debug!(
                        "Backend ready after {} retries (uptime {:?}s)",
                        self.state.retry_count, report.uptime_seconds
                    );
                }
                self.state.status = HealthStatus::Ready;
                self.state.uptime_seconds = report.uptime_seconds;
                self.state.services = report.services;
                self.state.last_error = None;
                NextCheck::After(self.policy.recheck_interval)
            }
            CheckOutcome::Starting(_) | CheckOutcome::Failed(_) if was_ready => {
                warn!("Backend re-check failed, restarting availability polling");
                self.reset();
                NextCheck::After(Duration::ZERO)
            }
            CheckOutcome::Starting(report) => {
                self.state.status = HealthStatus::Starting;
                if report.uptime_seconds.is_some() {
                    self.state.uptime_seconds = report.uptime_seconds;
                }
                if let Some(message) = report.detail_message() {
                    self.state.last_error = Some(message.to_string());
                }
                self.state.services = report.services;
                self.record_failure()
            }
            CheckOutcome::Failed(message) => {
                self.state.status = HealthStatus::Error;
                self.state.last_error = Some(message);
                self.record_failure()
            }
        }
    }

    fn record_failure(&mut self) -> NextCheck {
        let max = self.policy.max_retries;
        self.state.retry_count = (self.state.retry_count + 1).min(max);

        if self.state.retry_count >= max {
            error!("Backend not ready after {max} checks, giving up");
            self.state.status = HealthStatus::Error;
            self.state.last_error = Some(TOO_SLOW_MESSAGE.to_string());
            return NextCheck::Halt;
        }

        warn!(
            "Backend not ready ({:?}), retry {}/{} in {}ms",
            self.state.status,
            self.state.retry_count,
            max,
            self.policy.retry_delay.as_millis()
        );
        NextCheck::After(self.policy.retry_delay)
    }
}
