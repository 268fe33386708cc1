//! Hand-off of the last finished interview between the interview flow
//! (writer) and the statistics view (reader).
//!
//! Contract: one slot under [`SESSION_KEY`], JSON envelope
//! `{key, saved_at, expires_at, snapshot}`, expired or foreign envelopes read
//! as empty. The store is a convenience cache, not a durability guarantee.

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::ClientError;
use crate::models::interview::InterviewSnapshot;

pub const SESSION_KEY: &str = "jobmate_last_interview";

pub trait SessionStore: Send + Sync {
    fn save(&self, snapshot: &InterviewSnapshot) -> Result<(), ClientError>;
    /// `None` when nothing is stored or the stored snapshot has expired.
    fn load(&self) -> Result<Option<InterviewSnapshot>, ClientError>;
    fn clear(&self) -> Result<(), ClientError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Envelope {
    key: String,
    saved_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    snapshot: InterviewSnapshot,
}

impl Envelope {
    fn wrap(snapshot: &InterviewSnapshot, ttl: Duration) -> Result<Self, ClientError> {
        let saved_at = Utc::now();
        let expires_at = saved_at.checked_add_signed(ttl).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("session expiry out of range (ttl {ttl})"),
            )
        })?;
        Ok(Self {
            key: SESSION_KEY.to_string(),
            saved_at,
            expires_at,
            snapshot: snapshot.clone(),
        })
    }

    fn into_live_snapshot(self, now: DateTime<Utc>) -> Option<InterviewSnapshot> {
        if self.key != SESSION_KEY {
            warn!("Ignoring stored session with unexpected key '{}'", self.key);
            return None;
        }
        if self.expires_at <= now {
            debug!("Stored session expired at {}", self.expires_at);
            return None;
        }
        Some(self.snapshot)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// File-backed store
// ────────────────────────────────────────────────────────────────────────────

/// Persists the envelope as `<dir>/<key>.json`.
pub struct FileSessionStore {
    dir: PathBuf,
    ttl: Duration,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{SESSION_KEY}.json"))
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, snapshot: &InterviewSnapshot) -> Result<(), ClientError> {
        std::fs::create_dir_all(&self.dir)?;
        let envelope = Envelope::wrap(snapshot, self.ttl)?;
        let json = serde_json::to_vec_pretty(&envelope)?;

        // Write-then-rename so a reader never sees a half-written file.
        let path = self.path();
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &path)?;

        debug!(
            "Saved interview {} to {}",
            snapshot.session_id,
            path.display()
        );
        Ok(())
    }

    fn load(&self) -> Result<Option<InterviewSnapshot>, ClientError> {
        let path = self.path();
        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice::<Envelope>(&bytes) {
            Ok(envelope) => Ok(envelope.into_live_snapshot(Utc::now())),
            Err(e) => {
                warn!("Discarding unreadable session file {}: {e}", path.display());
                Ok(None)
            }
        }
    }

    fn clear(&self) -> Result<(), ClientError> {
        match std::fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory store
// ────────────────────────────────────────────────────────────────────────────

/// Process-local store, for ephemeral runs and tests.
pub struct MemorySessionStore {
    slot: Mutex<Option<Envelope>>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            ttl,
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(Duration::days(7))
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, snapshot: &InterviewSnapshot) -> Result<(), ClientError> {
        let envelope = Envelope::wrap(snapshot, self.ttl)?;
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(envelope);
        Ok(())
    }

    fn load(&self) -> Result<Option<InterviewSnapshot>, ClientError> {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        Ok(slot
            .clone()
            .and_then(|envelope| envelope.into_live_snapshot(Utc::now())))
    }

    fn clear(&self) -> Result<(), ClientError> {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = None;
        Ok(())
    }
}
