use serde_json::{json, Value};
use std::sync::LazyLock;

pub static CONFIG_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "llm": {
                "type": "object",
                "properties": {
                    "provider": { "type": "string", "enum": ["groq", "openai", "openrouter", "local"] },
                    "model": { "type": "string" },
                    "api_key": { "type": "string" },
                    "base_url": { "type": "string" },
                    "temperature": { "type": "number", "minimum": 0, "maximum": 2 },
                    "max_tokens": { "type": "integer", "minimum": 1 },
                    "request_timeout_secs": { "type": "integer", "minimum": 1 }
                }
            },
            "run": {
                "type": "object",
                "properties": {
                    "max_iterations": { "type": "integer", "minimum": 1 },
                    "command_timeout_secs": { "type": "integer", "minimum": 1 },
                    "iteration_delay_secs": { "type": "integer", "minimum": 0 },
                    "rate_limit_backoff_secs": { "type": "integer", "minimum": 0 },
                    "max_retries": { "type": "integer", "minimum": 0 }
                }
            },
            "tools": {
                "type": "object",
                "additionalProperties": { "$ref": "#/$defs/tool" }
            },
            "output": {
                "type": "object",
                "properties": {
                    "directory": { "type": "string" }
                }
            }
        },
        "$defs": {
            "tool": {
                "type": "object",
                "properties": {
                    "binary": { "type": "string" },
                    "timeout_secs": { "type": "integer", "minimum": 1 }
                }
            }
        }
    })
});
