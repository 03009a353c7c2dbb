//! sled-backed store: opaque report blobs and the append-only funnel event log.
//!
//! Reports are stored as JSON envelopes keyed by email (when given) or session
//! id. Events are append-only with an "already sent" dedupe marker per scope, so
//! the client can fire-and-forget the same event without double-counting.

use chrono::Utc;
use lifeclock_core::ReportBundle;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("db: {0}")]
    Db(#[from] sled::Error),
    #[error("encode: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Funnel events the client reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedEvent {
    PageVisit,
    EmailGiven,
    QuizComplete,
    PaymentComplete,
}

impl TrackedEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackedEvent::PageVisit => "page_visit",
            TrackedEvent::EmailGiven => "email_given",
            TrackedEvent::QuizComplete => "quiz_complete",
            TrackedEvent::PaymentComplete => "payment_complete",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "page_visit" => Some(TrackedEvent::PageVisit),
            "email_given" => Some(TrackedEvent::EmailGiven),
            "quiz_complete" => Some(TrackedEvent::QuizComplete),
            "payment_complete" => Some(TrackedEvent::PaymentComplete),
            _ => None,
        }
    }

    /// Events that dedupe per email (when present) instead of per session, so a
    /// returning visitor on a fresh session does not double-count.
    fn email_scoped(&self) -> bool {
        matches!(
            self,
            TrackedEvent::EmailGiven | TrackedEvent::PaymentComplete
        )
    }
}

/// Persistence envelope for a computed report. Downstream treats it as an opaque
/// JSON blob; only this module knows its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredReport {
    pub generated_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub bundle: ReportBundle,
}

pub struct ReportStore {
    db: sled::Db,
    reports: sled::Tree,
    events: sled::Tree,
}

impl ReportStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        let reports = db.open_tree("reports")?;
        let events = db.open_tree("events")?;
        Ok(Self {
            db,
            reports,
            events,
        })
    }

    /// Flushes pending writes to disk. Called on shutdown paths that care.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    pub fn save_report(&self, key: &str, report: &StoredReport) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(report)?;
        self.reports.insert(key.as_bytes(), bytes)?;
        Ok(())
    }

    pub fn load_report(&self, key: &str) -> Result<Option<StoredReport>, StoreError> {
        match self.reports.get(key.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Appends an event unless its dedupe marker is already set. Returns whether
    /// a new event was recorded.
    pub fn record_event(
        &self,
        event: TrackedEvent,
        session_id: &str,
        email: Option<&str>,
    ) -> Result<bool, StoreError> {
        let email = email.map(str::trim).filter(|s| !s.is_empty());
        let scope = match email {
            Some(addr) if event.email_scoped() => format!("email/{}", addr.to_lowercase()),
            _ => format!("session/{}", session_id),
        };
        let marker_key = format!("seen/{}/{}", event.as_str(), scope);
        if self.events.get(marker_key.as_bytes())?.is_some() {
            return Ok(false);
        }

        let ts_ms = Utc::now().timestamp_millis() as u64;
        let event_key = format!("event/{}/{:016x}/{}", event.as_str(), ts_ms, Uuid::new_v4());
        let value = serde_json::json!({
            "event": event.as_str(),
            "sessionId": session_id,
            "email": email,
            "timestampMs": ts_ms,
        });
        self.events
            .insert(event_key.as_bytes(), value.to_string().into_bytes())?;
        self.events.insert(marker_key.as_bytes(), &[1u8][..])?;
        Ok(true)
    }

    /// Number of recorded events of one kind.
    pub fn count_events(&self, event: TrackedEvent) -> Result<u64, StoreError> {
        let prefix = format!("event/{}/", event.as_str());
        let mut count = 0u64;
        for item in self.events.scan_prefix(prefix.as_bytes()) {
            item?;
            count += 1;
        }
        Ok(count)
    }

    /// Emails that left an address but have not received the nurture campaign.
    pub fn pending_nurture(&self) -> Result<Vec<String>, StoreError> {
        const PREFIX: &str = "seen/email_given/email/";
        let mut out = Vec::new();
        for item in self.events.scan_prefix(PREFIX.as_bytes()) {
            let (key, _) = item?;
            let key = String::from_utf8_lossy(&key).to_string();
            let email = key.trim_start_matches(PREFIX);
            if email.is_empty() {
                continue;
            }
            let marker = format!("nurture_sent/{}", email);
            if self.events.get(marker.as_bytes())?.is_none() {
                out.push(email.to_string());
            }
        }
        Ok(out)
    }

    pub fn mark_nurture_sent(&self, email: &str) -> Result<(), StoreError> {
        let key = format!("nurture_sent/{}", email.trim().to_lowercase());
        self.events.insert(key.as_bytes(), &[1u8][..])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifeclock_core::{assemble_report, EnergyType, PhaseResult, ReportConfig};

    fn open_store() -> (ReportStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = ReportStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn sample_bundle() -> ReportBundle {
        let phases: Vec<PhaseResult> = (1..=10)
            .map(|id| PhaseResult {
                id,
                title: None,
                total: 50.0,
                archetype: "X".to_string(),
                energy_type: Some(EnergyType::Mind),
            })
            .collect();
        assemble_report(&phases, &ReportConfig::default()).unwrap()
    }

    #[test]
    fn report_round_trips() {
        let (store, _dir) = open_store();
        let envelope = StoredReport {
            generated_at_ms: 1_700_000_000_000,
            user_name: Some("Ada".to_string()),
            bundle: sample_bundle(),
        };
        store.save_report("ada@example.com", &envelope).unwrap();
        let loaded = store.load_report("ada@example.com").unwrap().unwrap();
        assert_eq!(loaded, envelope);
        assert!(store.load_report("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn events_dedupe_per_session() {
        let (store, _dir) = open_store();
        assert!(store
            .record_event(TrackedEvent::PageVisit, "s1", None)
            .unwrap());
        assert!(!store
            .record_event(TrackedEvent::PageVisit, "s1", None)
            .unwrap());
        assert!(store
            .record_event(TrackedEvent::PageVisit, "s2", None)
            .unwrap());
        assert_eq!(store.count_events(TrackedEvent::PageVisit).unwrap(), 2);
    }

    #[test]
    fn email_scoped_events_dedupe_across_sessions() {
        let (store, _dir) = open_store();
        assert!(store
            .record_event(TrackedEvent::PaymentComplete, "s1", Some("Ada@Example.com"))
            .unwrap());
        // Same buyer, new session, different casing: still one event.
        assert!(!store
            .record_event(TrackedEvent::PaymentComplete, "s2", Some("ada@example.com"))
            .unwrap());
        assert_eq!(
            store.count_events(TrackedEvent::PaymentComplete).unwrap(),
            1
        );
    }

    #[test]
    fn nurture_queue_drains_once_marked() {
        let (store, _dir) = open_store();
        store
            .record_event(TrackedEvent::EmailGiven, "s1", Some("a@example.com"))
            .unwrap();
        store
            .record_event(TrackedEvent::EmailGiven, "s2", Some("b@example.com"))
            .unwrap();
        let mut pending = store.pending_nurture().unwrap();
        pending.sort();
        assert_eq!(pending, vec!["a@example.com", "b@example.com"]);

        store.mark_nurture_sent("a@example.com").unwrap();
        assert_eq!(store.pending_nurture().unwrap(), vec!["b@example.com"]);
    }
}
