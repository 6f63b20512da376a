use console::style;
use tokio::sync::mpsc;
use crate::config::credentials::redact_command;
use crate::pipeline::{RunEvent, RunSummary, Termination};
use crate::utils::formatting::format_duration;
use crate::utils::truncation::truncate_error;

/// Print events as they arrive until the loop drops its sender.
pub async fn render_events(mut rx: mpsc::UnboundedReceiver<RunEvent>) {
    while let Some(event) = rx.recv().await {
        if let Some(line) = render_event(&event) {
            println!("{}", line);
        }
    }
}

pub fn render_event(event: &RunEvent) -> Option<String> {
    let line = match event {
        RunEvent::RunStarted { target, max_iterations, .. } => format!(
            "{} {} (up to {} iterations)",
            style("COO").cyan().bold(),
            style(target).white().bold(),
            max_iterations,
        ),
        RunEvent::IterationStarted { iteration, max_iterations } => format!(
            "\n{}",
            style(format!("── Iteration {}/{} ──", iteration, max_iterations)).dim(),
        ),
        RunEvent::DecisionReceived { analysis, .. } if !analysis.trim().is_empty() => format!(
            "  {} {}",
            style("analysis").cyan(),
            truncate_error(analysis.trim()),
        ),
        RunEvent::DecisionReceived { .. } => return None,
        RunEvent::StateAccepted { summary } => format!("  {} {}", style("state").green(), summary),
        RunEvent::StateRejected { reason } => format!(
            "  {} update rejected: {}",
            style("state").yellow(),
            reason,
        ),
        RunEvent::CommandStarted { sequence, command } => format!(
            "  {} {}",
            style(format!("[{:03}] $", sequence)).color256(208),
            redact_command(command),
        ),
        RunEvent::CommandFinished { sequence, status, exit_code, duration_ms } => {
            let status = match *status {
                "completed" => style(match exit_code {
                    Some(code) => format!("exit {}", code),
                    None => "signalled".to_string(),
                }).green(),
                other => style(other.replace('_', " ")).red(),
            };
            format!(
                "  {} {} in {}",
                style(format!("[{:03}]", sequence)).dim(),
                status,
                format_duration(*duration_ms),
            )
        }
        RunEvent::Terminated { termination, .. } => {
            let marker = if termination.is_success() {
                style("✔").green().bold()
            } else {
                style("✘").red().bold()
            };
            format!("\n{} Run {}", marker, termination)
        }
    };
    Some(line)
}

pub fn print_summary(summary: &RunSummary) {
    let state = &summary.final_state;
    println!();
    println!("  {}", style("Summary").white().bold());
    let rows = [
        ("Run ID", summary.run_id.clone()),
        ("Outcome", summary.termination.to_string()),
        ("Iterations", summary.iterations.to_string()),
        ("Commands", summary.commands_executed.to_string()),
        ("Duration", format_duration(summary.duration.as_millis() as u64)),
        ("Open ports", state.open_ports.len().to_string()),
        ("Vulnerabilities", state.vulnerabilities.len().to_string()),
        ("Directories", state.web_directories.len().to_string()),
    ];
    for (label, value) in rows {
        println!("  {:<17}{}", format!("{}:", label), value);
    }
    if let Termination::Complete { report_path: Some(path) } = &summary.termination {
        println!("  {:<17}{}", "Report:", style(path.display()).cyan());
    }
}
