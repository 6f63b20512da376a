use std::path::Path;
use crate::errors::CooError;
use super::types::CooConfig;
use super::schema::CONFIG_SCHEMA;
use tracing::warn;

pub async fn parse_config(path: &Path) -> Result<CooConfig, CooError> {
    if !path.exists() {
        return Err(CooError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > 1_048_576 {
        return Err(CooError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    parse_config_str(&content)
}

pub fn parse_config_str(content: &str) -> Result<CooConfig, CooError> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;
    if yaml.is_null() {
        return Ok(CooConfig::default());
    }

    // JSON Schema validation
    validate_schema(&yaml)?;

    let config: CooConfig = serde_yaml::from_value(yaml)?;

    validate_values(&config)?;

    Ok(config)
}

/// Validate config against the JSON schema for structural correctness.
fn validate_schema(yaml: &serde_yaml::Value) -> Result<(), CooError> {
    let json_value = serde_json::to_value(yaml)
        .map_err(|e| CooError::Config(format!("Config conversion error: {}", e)))?;

    let compiled = jsonschema::JSONSchema::compile(&CONFIG_SCHEMA)
        .map_err(|e| CooError::Config(format!("Schema compilation error: {}", e)))?;

    let result = compiled.validate(&json_value);
    if let Err(errors) = result {
        // Advisory: typed parsing and value checks below are authoritative.
        for e in errors {
            warn!(validation_error = %format!("{} at {}", e, e.instance_path), "Config schema warning");
        }
    }

    Ok(())
}

/// Reject values the run loop cannot work with.
fn validate_values(config: &CooConfig) -> Result<(), CooError> {
    if let Some(run) = &config.run {
        if run.max_iterations == Some(0) {
            return Err(CooError::Config("run.max_iterations must be at least 1".into()));
        }
        if run.command_timeout_secs == Some(0) {
            return Err(CooError::Config("run.command_timeout_secs must be at least 1".into()));
        }
    }

    if let Some(tools) = &config.tools {
        for (name, tool) in tools {
            if tool.timeout_secs == Some(0) {
                return Err(CooError::Config(format!("tools.{}.timeout_secs must be at least 1", name)));
            }
        }
    }

    if let Some(llm) = &config.llm {
        if let Some(t) = llm.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(CooError::Config(format!("llm.temperature {} outside 0.0..=2.0", t)));
            }
        }
    }

    Ok(())
}
