use serde::{Deserialize, Serialize};
use super::lenient::null_as_empty;

/// Keys every state document must carry to be accepted as canonical.
pub const REQUIRED_FIELDS: [&str; 5] = [
    "target_ip",
    "open_ports",
    "vulnerabilities",
    "web_directories",
    "notes",
];

/// Canonical accumulated findings for the run's target.
///
/// The oracle resends the whole document every step; it replaces the
/// previous one wholesale once it passes validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PentestState {
    #[serde(rename = "target_ip")]
    pub target: String,
    pub open_ports: Vec<OpenPort>,
    pub vulnerabilities: Vec<Vulnerability>,
    pub web_directories: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub notes: String,
}

impl PentestState {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            open_ports: Vec::new(),
            vulnerabilities: Vec::new(),
            web_directories: Vec::new(),
            notes: "Penetration test initialized".to_string(),
        }
    }

    /// Short counts line for logs.
    pub fn summary(&self) -> String {
        format!(
            "{} ports, {} vulnerabilities, {} directories",
            self.open_ports.len(),
            self.vulnerabilities.len(),
            self.web_directories.len(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPort {
    pub port: u32,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub service: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cve: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub port: Option<u32>,
    #[serde(default)]
    pub severity: Option<String>,
}
