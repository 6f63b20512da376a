use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;
use coo::decision::DecisionSource;
use coo::errors::OracleError;
use coo::executor::ShellExecutor;
use coo::models::{Decision, OpenPort, PentestState, Vulnerability};
use coo::pipeline::{Orchestrator, OrchestratorConfig, Termination};
use coo::session::StateStore;
use serde_json::{json, Value};
use tempfile::TempDir;

struct Script {
    replies: Mutex<VecDeque<Decision>>,
    outputs: Arc<Mutex<Vec<String>>>,
}

impl Script {
    fn new(replies: Vec<Value>) -> (Self, Arc<Mutex<Vec<String>>>) {
        let outputs = Arc::new(Mutex::new(Vec::new()));
        let replies = replies
            .into_iter()
            .map(|v| serde_json::from_value(v).unwrap())
            .collect();
        (Self { replies: Mutex::new(replies), outputs: outputs.clone() }, outputs)
    }
}

#[async_trait]
impl DecisionSource for Script {
    async fn decide(&self, _state: &PentestState, last_output: &str) -> Result<Decision, OracleError> {
        self.outputs.lock().unwrap().push(last_output.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| OracleError::Api("no more replies".into()))
    }
}

fn config(dir: &TempDir, max_iterations: u32) -> OrchestratorConfig {
    let mut config = OrchestratorConfig::new("127.0.0.1", dir.path());
    config.max_iterations = max_iterations;
    config.iteration_delay = Duration::ZERO;
    config.command_timeout = Duration::from_secs(10);
    config
}

#[cfg(unix)]
#[tokio::test]
async fn test_full_run_against_real_shell() {
    let dir = TempDir::new().unwrap();
    let (script, outputs) = Script::new(vec![
        json!({
            "analysis": "Initial scan",
            "next_command": "echo '80/tcp open http'",
            "updated_state": null,
            "final_report": null
        }),
        json!({
            "analysis": "HTTP found",
            "next_command": "echo missing >&2; exit 2",
            "updated_state": {
                "target_ip": "127.0.0.1",
                "open_ports": [{"port": 80, "service": "http", "version": null}],
                "vulnerabilities": [],
                "web_directories": [],
                "notes": "web server"
            },
            "final_report": null
        }),
        json!({
            "analysis": "Done",
            "next_command": "COMPLETE",
            "final_report": "# Report\n\nPort 80 open."
        }),
    ]);
    let mut orchestrator = Orchestrator::new(
        config(&dir, 10),
        Box::new(script),
        Box::new(ShellExecutor::new(dir.path())),
    );

    let summary = orchestrator.run().await.unwrap();

    assert!(matches!(summary.termination, Termination::Complete { report_path: Some(_) }));
    assert_eq!(summary.exit_code(), 0);
    assert_eq!(summary.iterations, 3);
    assert_eq!(summary.commands_executed, 2);
    assert_eq!(summary.final_state.open_ports[0].port, 80);

    let outputs = outputs.lock().unwrap();
    assert_eq!(outputs[0], "");
    assert!(outputs[1].starts_with("STDOUT:\n80/tcp open http"));
    assert!(outputs[2].contains("STDERR:\nmissing"));
    assert!(outputs[2].ends_with("RETURN CODE: 2"));

    for name in ["command_001.txt", "output_001.txt", "command_002.txt", "output_002.txt"] {
        assert!(dir.path().join(name).exists(), "missing {}", name);
    }
    assert!(!dir.path().join("command_003.txt").exists());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("final_report.md")).unwrap(),
        "# Report\n\nPort 80 open."
    );

    let restored = StateStore::new(dir.path()).load().await.unwrap();
    assert_eq!(restored, summary.final_state);
}

#[cfg(unix)]
#[tokio::test]
async fn test_timed_out_command_feeds_next_decision() {
    let dir = TempDir::new().unwrap();
    let (script, outputs) = Script::new(vec![
        json!({"analysis": "", "next_command": "sleep 5"}),
        json!({"analysis": "", "next_command": "echo after"}),
    ]);
    let mut cfg = config(&dir, 2);
    cfg.command_timeout = Duration::from_millis(200);
    let mut orchestrator = Orchestrator::new(cfg, Box::new(script), Box::new(ShellExecutor::new(dir.path())));

    let summary = orchestrator.run().await.unwrap();

    assert_eq!(summary.termination, Termination::Exhausted);
    assert_eq!(summary.commands_executed, 2);
    let outputs = outputs.lock().unwrap();
    assert!(outputs[1].starts_with("Command timed out after"));
    assert!(!outputs[1].contains("RETURN CODE"));
}

#[tokio::test]
async fn test_snapshot_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = StateStore::new(dir.path());
    let state = PentestState {
        target: "10.10.10.5".into(),
        open_ports: vec![
            OpenPort { port: 22, service: "ssh".into(), version: Some("OpenSSH 8.2p1".into()) },
            OpenPort { port: 22, service: "ssh".into(), version: None },
        ],
        vulnerabilities: vec![Vulnerability {
            cve: "CVE-2021-41773".into(),
            description: "Apache path traversal".into(),
            port: Some(80),
            severity: Some("critical".into()),
        }],
        web_directories: vec!["/cgi-bin".into()],
        notes: "duplicates kept as reported".into(),
    };

    store.save(&state, json!({"iteration": 4})).await.unwrap();
    assert_eq!(store.load().await.unwrap(), state);
}

#[tokio::test]
async fn test_load_without_snapshot_is_empty_but_valid() {
    let dir = TempDir::new().unwrap();
    let state = StateStore::new(dir.path()).load().await.unwrap();
    assert!(StateStore::validate(&serde_json::to_value(&state).unwrap()));
    assert!(state.open_ports.is_empty());
}
