use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::audit::utils::atomic_write;
use crate::errors::CooError;
use crate::models::state::{PentestState, REQUIRED_FIELDS};
use tracing::debug;

pub const SNAPSHOT_FILE: &str = "session_state.json";

/// Single snapshot document, overwritten on every save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub timestamp: DateTime<Utc>,
    pub state: Value,
    #[serde(default)]
    pub metadata: Value,
}

/// Persists the canonical state of a run to one JSON file.
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(output_dir: &Path) -> Self {
        Self { path: output_dir.join(SNAPSHOT_FILE) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True iff every required key is present. Contents are not inspected.
    pub fn validate(document: &Value) -> bool {
        match document.as_object() {
            Some(map) => REQUIRED_FIELDS.iter().all(|key| map.contains_key(*key)),
            None => false,
        }
    }

    /// Validate a document and decode it into the typed state.
    pub fn accept(document: &Value) -> Result<PentestState, CooError> {
        if !Self::validate(document) {
            let missing: Vec<&str> = REQUIRED_FIELDS
                .iter()
                .copied()
                .filter(|key| document.get(*key).is_none())
                .collect();
            return Err(CooError::StateValidation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }
        serde_json::from_value(document.clone())
            .map_err(|e| CooError::StateValidation(format!("malformed state: {}", e)))
    }

    pub async fn save(&self, state: &PentestState, metadata: Value) -> Result<(), CooError> {
        let snapshot = StateSnapshot {
            timestamp: Utc::now(),
            state: serde_json::to_value(state)?,
            metadata,
        };
        let json = serde_json::to_string_pretty(&snapshot)?;
        atomic_write(&self.path, &json).await?;
        debug!(path = %self.path.display(), "State snapshot saved");
        Ok(())
    }

    /// Load the last snapshot, or an empty state if none was written yet.
    pub async fn load(&self) -> Result<PentestState, CooError> {
        if !self.path.exists() {
            return Ok(PentestState::default());
        }
        let content = tokio::fs::read_to_string(&self.path).await?;
        let snapshot: StateSnapshot = serde_json::from_str(&content)?;
        Self::accept(&snapshot.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::models::state::{OpenPort, Vulnerability};
    use tempfile::TempDir;

    fn full_document() -> Value {
        json!({
            "target_ip": "10.0.0.1",
            "open_ports": [],
            "vulnerabilities": [],
            "web_directories": [],
            "notes": ""
        })
    }

    #[test]
    fn test_validate_accepts_all_fields() {
        assert!(StateStore::validate(&full_document()));
    }

    #[test]
    fn test_validate_rejects_each_missing_field() {
        for key in REQUIRED_FIELDS {
            let mut doc = full_document();
            doc.as_object_mut().unwrap().remove(key);
            assert!(!StateStore::validate(&doc), "accepted without {}", key);
        }
    }

    #[test]
    fn test_validate_ignores_contents() {
        let doc = json!({
            "target_ip": 42,
            "open_ports": "none",
            "vulnerabilities": null,
            "web_directories": {},
            "notes": []
        });
        assert!(StateStore::validate(&doc));
    }

    #[test]
    fn test_validate_rejects_non_object() {
        assert!(!StateStore::validate(&json!([])));
        assert!(!StateStore::validate(&json!("state")));
    }

    #[test]
    fn test_accept_reports_missing_fields() {
        let err = StateStore::accept(&json!({"target_ip": "10.0.0.1"})).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("open_ports"));
        assert!(msg.contains("notes"));
    }

    #[test]
    fn test_accept_rejects_wrong_types() {
        let doc = json!({
            "target_ip": "10.0.0.1",
            "open_ports": "none",
            "vulnerabilities": [],
            "web_directories": [],
            "notes": ""
        });
        assert!(matches!(StateStore::accept(&doc), Err(CooError::StateValidation(_))));
    }

    #[test]
    fn test_accept_tolerates_null_strings() {
        let doc = json!({
            "target_ip": "10.0.0.1",
            "open_ports": [{"port": 22, "service": "ssh"}, {"port": 9999, "service": null}],
            "vulnerabilities": [{"cve": null, "description": "anonymous ftp", "port": 21}],
            "web_directories": [],
            "notes": "two ports"
        });
        assert!(StateStore::validate(&doc));
        let state = StateStore::accept(&doc).unwrap();
        assert_eq!(state.open_ports[1], OpenPort { port: 9999, service: String::new(), version: None });
        assert_eq!(state.vulnerabilities[0].cve, "");
    }

    #[tokio::test]
    async fn test_load_without_snapshot_is_empty_state() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path());
        let state = store.load().await.unwrap();
        assert_eq!(state, PentestState::default());
        assert!(StateStore::validate(&serde_json::to_value(&state).unwrap()));
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path());
        let mut state = PentestState::new("192.168.1.10");
        state.open_ports.push(OpenPort { port: 22, service: "ssh".into(), version: Some("OpenSSH 8.2".into()) });
        state.vulnerabilities.push(Vulnerability {
            cve: "CVE-2020-15778".into(),
            description: "scp command injection".into(),
            port: Some(22),
            severity: Some("medium".into()),
        });
        state.web_directories.push("/admin".into());
        state.notes = "ssh enumerated".into();

        store.save(&state, json!({"command_count": 3})).await.unwrap();
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, state);

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert!(raw["timestamp"].is_string());
        assert_eq!(raw["metadata"]["command_count"], 3);
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path());
        store.save(&PentestState::new("10.0.0.1"), json!({"iteration": 1})).await.unwrap();
        let mut next = PentestState::new("10.0.0.1");
        next.notes = "second".into();
        store.save(&next, json!({"iteration": 2})).await.unwrap();

        assert_eq!(store.load().await.unwrap().notes, "second");
        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }
}
