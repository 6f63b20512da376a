use std::path::Path;
use std::sync::LazyLock;
use regex::Regex;
use serde::{Deserialize, Serialize};
use crate::errors::CooError;
use tracing::debug;

/// File written by `coo save-api-key`, read as the last fallback.
pub const SAVED_KEY_FILE: &str = "groq_config.json";

#[derive(Debug, Serialize, Deserialize)]
struct SavedKey {
    api_key: String,
}

/// Resolve a credential value. If the value starts with '$', treat it as an
/// environment variable reference and resolve from the environment.
pub fn resolve_credential(value: &str) -> String {
    if let Some(var_name) = value.strip_prefix('$') {
        match std::env::var(var_name) {
            Ok(resolved) => {
                debug!(var = %var_name, "Resolved credential from environment");
                resolved
            }
            Err(_) => {
                debug!(var = %var_name, "Environment variable not set, using literal");
                value.to_string()
            }
        }
    } else {
        value.to_string()
    }
}

/// Read the key stored by `save_api_key`, if any.
pub fn load_saved_api_key(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let saved: SavedKey = serde_json::from_str(&content).ok()?;
    Some(saved.api_key).filter(|k| !k.is_empty())
}

pub async fn save_api_key(path: &Path, api_key: &str) -> Result<(), CooError> {
    if api_key.trim().is_empty() {
        return Err(CooError::Authentication("Refusing to save an empty API key".into()));
    }
    let json = serde_json::to_string_pretty(&SavedKey { api_key: api_key.trim().to_string() })?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Pick the API key from, in order: explicit flag, config file value,
/// provider environment variable, saved key file.
pub fn resolve_api_key(
    flag: Option<&str>,
    file_value: Option<&str>,
    env_var: &str,
    saved_key_path: &Path,
) -> Option<String> {
    flag.map(str::to_string)
        .or_else(|| file_value.map(resolve_credential).filter(|v| !v.starts_with('$')))
        .or_else(|| {
            if env_var.is_empty() {
                None
            } else {
                std::env::var(env_var).ok()
            }
        })
        .or_else(|| load_saved_api_key(saved_key_path))
        .filter(|k| !k.trim().is_empty())
}

/// Redact sensitive values in a string. Replaces known credential patterns
/// with [REDACTED].
pub fn redact_credentials(text: &str, secrets: &[&str]) -> String {
    let mut result = text.to_string();
    for secret in secrets {
        if !secret.is_empty() && secret.len() >= 4 {
            result = result.replace(secret, "[REDACTED]");
        }
    }
    result
}

static PASSWORD_ARG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?P<flag>--password[= ]|-p\s+|--cookie[= ]|-P\s+)(?P<value>"[^"]*"|'[^']*'|\S+)"#)
        .expect("static regex")
});

/// Redact a command string by masking password-like arguments before it is
/// logged. Handles --password=X, --password X, -p X, -P X, --cookie "X".
/// `-p` also matches nmap's port list.
pub fn redact_command(command: &str) -> String {
    PASSWORD_ARG.replace_all(command, "${flag}[REDACTED]").into_owned()
}
