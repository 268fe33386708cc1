use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::machine::{BackendHealthState, HealthMachine, HealthStatus, NextCheck, PollPolicy};
use super::HealthChecker;

/// The machine plus a counter bumped on every reset. A check started under
/// an older generation is stale and its outcome is dropped.
struct Slot {
    machine: HealthMachine,
    generation: u64,
}

struct Shared {
    slot: Mutex<Slot>,
    tx: watch::Sender<BackendHealthState>,
    wake: Notify,
}

impl Shared {
    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: BackendHealthState) {
        self.tx.send_replace(state);
    }
}

pub struct HealthPoller;

impl HealthPoller {
    /// Starts polling immediately on the current tokio runtime.
    pub fn spawn(checker: Arc<dyn HealthChecker>, policy: PollPolicy) -> HealthHandle {
        let machine = HealthMachine::new(policy.clone());
        let (tx, rx) = watch::channel(machine.state().clone());
        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot {
                machine,
                generation: 0,
            }),
            tx,
            wake: Notify::new(),
        });

        let task = tokio::spawn(run(checker, shared.clone()));
        info!("Backend availability polling started");

        HealthHandle {
            shared,
            rx,
            policy,
            task,
        }
    }
}

async fn run(checker: Arc<dyn HealthChecker>, shared: Arc<Shared>) {
    loop {
        let generation = shared.slot().generation;
        let outcome = checker.check_health().await;

        let applied = {
            let mut slot = shared.slot();
            if slot.generation == generation {
                let next = slot.machine.on_outcome(outcome);
                Some((next, slot.machine.state().clone()))
            } else {
                None
            }
        };
        let Some((next, state)) = applied else {
            // The reset that made this result stale left a wake-up permit.
            debug!("Dropping health result from before a reset");
            shared.wake.notified().await;
            continue;
        };
        debug!(
            "Health status {:?} (retry {}), next check {:?}",
            state.status, state.retry_count, next
        );
        shared.publish(state);

        match next {
            NextCheck::After(delay) => {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = shared.wake.notified() => debug!("Pending health check pre-empted by reset"),
                }
            }
            NextCheck::Halt => {
                shared.wake.notified().await;
                debug!("Health polling resumed after reset");
            }
        }
    }
}

/// Owner of a running poller. Dropping it cancels the background task, so no
/// scheduled check can fire afterwards.
pub struct HealthHandle {
    shared: Arc<Shared>,
    rx: watch::Receiver<BackendHealthState>,
    policy: PollPolicy,
    task: JoinHandle<()>,
}

impl HealthHandle {
    pub fn state(&self) -> BackendHealthState {
        self.rx.borrow().clone()
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    pub fn subscribe(&self) -> watch::Receiver<BackendHealthState> {
        self.rx.clone()
    }

    /// Returns to `Checking` with a fresh retry budget and checks right away,
    /// also when polling had halted.
    pub fn reset(&self) {
        let state = {
            let mut slot = self.shared.slot();
            slot.generation += 1;
            slot.machine.reset();
            slot.machine.state().clone()
        };
        self.shared.publish(state);
        self.shared.wake.notify_one();
    }

    /// Resolves once the backend is ready, or with the final state when
    /// polling gives up.
    pub async fn wait_until_ready(&self) -> Result<(), BackendHealthState> {
        let mut rx = self.rx.clone();
        loop {
            {
                let state = rx.borrow_and_update();
                if state.status == HealthStatus::Ready {
                    return Ok(());
                }
                if state.is_exhausted(&self.policy) {
                    return Err(state.clone());
                }
            }
            if rx.changed().await.is_err() {
                return Err(self.state());
            }
        }
    }
}

impl Drop for HealthHandle {
    fn drop(&mut self) {
        self.task.abort();
        debug!("Backend availability polling stopped");
    }
}
