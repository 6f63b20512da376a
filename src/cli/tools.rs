use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use console::style;
use tokio::process::Command;
use crate::cli::commands::ToolsArgs;
use crate::config::{self, CooConfig, ToolConfig};
use crate::errors::CooError;
use tracing::debug;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn handle_tools(args: ToolsArgs) -> Result<(), CooError> {
    let file_config = match &args.config {
        Some(path) => config::parse_config(&PathBuf::from(path)).await?,
        None => CooConfig::default(),
    };
    let status = probe_tools(&file_config.tool_table()).await;

    let available = status.values().filter(|ok| **ok).count();
    for (name, ok) in &status {
        let mark = if *ok { style("✔").green() } else { style("✘").red() };
        println!("  {} {}", mark, name);
    }
    println!("\n  {}/{} tools available", available, status.len());
    Ok(())
}

/// A tool counts as installed when `<binary> --help` launches and exits
/// within the probe timeout, whatever its exit status.
pub async fn probe_tools(tools: &BTreeMap<String, ToolConfig>) -> BTreeMap<String, bool> {
    let mut status = BTreeMap::new();
    for (name, tool) in tools {
        let binary = tool.binary.as_deref().unwrap_or(name);
        status.insert(name.clone(), probe(binary).await);
    }
    status
}

async fn probe(binary: &str) -> bool {
    let child = Command::new(binary)
        .arg("--help")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn();
    let mut child = match child {
        Ok(child) => child,
        Err(e) => {
            debug!(binary, error = %e, "Tool not launchable");
            return false;
        }
    };
    match tokio::time::timeout(PROBE_TIMEOUT, child.wait()).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            debug!(binary, error = %e, "Tool probe failed");
            false
        }
        Err(_) => {
            debug!(binary, "Tool probe timed out");
            false
        }
    }
}
