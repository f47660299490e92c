//! Session tests: catalog dispatch, inhibition and both execution strategies

use futures::channel::mpsc;
use futures::{stream, StreamExt};
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use wizard_core::{ActionCatalog, Error, Session, SessionConfig};
use wizard_runner::{BridgeEnd, Frame, RunnerConfig};

const CATALOG: &str = r#"
[[screens]]
title = "Basics"

[[screens.actions]]
id = "echo"
title = "Say hello"
script = "echo hello"

[[screens.actions]]
id = "blank"
title = "Nothing to do"
script = "   "

[[screens.actions]]
id = "touch"
title = "Leave a marker"
script = "touch \"$WIZARD_MARKER\""

[[screens.actions]]
id = "stubborn"
title = "Ignore hangups"
script = "trap '' HUP; sleep 30; true"

[[screens.actions]]
id = "wait"
title = "Wait for input"
script = "read line; echo \"got:$line\""
"#;

const TIMEOUT: Duration = Duration::from_secs(10);

fn session(scratch: &Path) -> Session {
    let catalog = ActionCatalog::from_toml_str(CATALOG).unwrap();
    let runner = RunnerConfig {
        // `sh <script>` stands in for a terminal emulator.
        terminal_program: "sh".to_string(),
        terminal_args: Vec::new(),
        scratch_dir: Some(scratch.to_path_buf()),
        ..RunnerConfig::default()
    };
    Session::new(
        Arc::new(catalog),
        SessionConfig {
            runner,
            ..SessionConfig::default()
        },
    )
}

fn output_text(frames: Vec<Frame>) -> String {
    let bytes: Vec<u8> = frames
        .into_iter()
        .flat_map(|frame| match frame {
            Frame::Binary(chunk) => chunk,
            Frame::Text(text) => text.into_bytes(),
        })
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[tokio::test]
async fn test_attached_stream_runs_catalog_action() {
    let scratch = tempfile::tempdir().unwrap();
    let session = session(scratch.path());
    let (tx, rx) = mpsc::unbounded();

    let outcome = tokio::time::timeout(
        TIMEOUT,
        session.open_attached_stream("echo", tx, stream::pending::<Result<Frame, io::Error>>()),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(outcome.end, BridgeEnd::ProcessExited);
    assert_eq!(outcome.exit_code, Some(0));
    let text = output_text(rx.collect().await);
    assert!(text.contains("hello"), "unexpected output: {text:?}");
    assert!(!session.inhibit().is_inhibited());
}

#[tokio::test]
async fn test_attached_session_inhibits_until_finished() {
    let scratch = tempfile::tempdir().unwrap();
    let session = session(scratch.path());

    let attached = session.start_attached("wait").unwrap();
    assert_eq!(attached.action_id(), "wait");
    assert!(session.inhibit().is_inhibited());

    let (out_tx, out_rx) = mpsc::unbounded();
    let (in_tx, in_rx) = mpsc::unbounded::<Result<Frame, io::Error>>();
    in_tx
        .unbounded_send(Ok(Frame::Binary(b"ping\n".to_vec())))
        .unwrap();

    let outcome = tokio::time::timeout(TIMEOUT, attached.run(out_tx, in_rx))
        .await
        .unwrap();

    assert_eq!(outcome.end, BridgeEnd::ProcessExited);
    assert!(output_text(out_rx.collect().await).contains("got:ping"));
    assert!(!session.inhibit().is_inhibited());
}

/// Running and not a zombie awaiting reaping.
fn is_running(pid: u32) -> bool {
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(stat) => !matches!(
            stat.rsplit_once(')').and_then(|(_, rest)| rest.trim_start().chars().next()),
            Some('Z') | Some('X')
        ),
        Err(_) => false,
    }
}

#[tokio::test]
async fn test_dropping_unbridged_session_kills_script_and_releases_inhibit() {
    let scratch = tempfile::tempdir().unwrap();
    let session = session(scratch.path());

    let attached = session.start_attached("stubborn").unwrap();
    let pid = attached.pid().unwrap();
    assert_eq!(session.inhibit().count(), 1);
    assert!(is_running(pid));

    drop(attached);
    assert!(!session.inhibit().is_inhibited());

    let gone = tokio::time::timeout(TIMEOUT, async {
        while is_running(pid) {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    assert!(gone.is_ok(), "pid {pid} survived dropping its session");
}

#[tokio::test]
async fn test_failed_spawn_releases_inhibit() {
    let scratch = tempfile::tempdir().unwrap();
    let catalog = ActionCatalog::from_toml_str(CATALOG).unwrap();
    let session = Session::new(
        Arc::new(catalog),
        SessionConfig {
            runner: RunnerConfig {
                shell: "/nonexistent/shell".to_string(),
                scratch_dir: Some(scratch.path().to_path_buf()),
                ..RunnerConfig::default()
            },
            ..SessionConfig::default()
        },
    );

    let err = session.start_attached("echo").unwrap_err();
    assert!(matches!(err, Error::Runner(wizard_runner::Error::Spawn { .. })));
    assert!(!session.inhibit().is_inhibited());

    let (tx, _rx) = mpsc::unbounded();
    let result = session
        .open_attached_stream("echo", tx, stream::pending::<Result<Frame, io::Error>>())
        .await;
    assert!(matches!(result, Err(Error::Runner(_))));
    assert!(!session.inhibit().is_inhibited());
}

#[tokio::test]
async fn test_unknown_action_is_rejected() {
    let scratch = tempfile::tempdir().unwrap();
    let session = session(scratch.path());

    assert!(matches!(
        session.trigger_detached("missing-id"),
        Err(Error::ActionNotFound(id)) if id == "missing-id"
    ));
    assert!(matches!(
        session.start_attached("missing-id"),
        Err(Error::ActionNotFound(_))
    ));
    assert!(matches!(
        session.run_detached("missing-id").await,
        Err(Error::ActionNotFound(_))
    ));
    assert!(!session.inhibit().is_inhibited());
    assert!(std::fs::read_dir(scratch.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn test_empty_script_is_rejected() {
    let scratch = tempfile::tempdir().unwrap();
    let session = session(scratch.path());

    assert!(matches!(
        session.trigger_detached("blank"),
        Err(Error::EmptyScript(id)) if id == "blank"
    ));
    assert!(matches!(
        session.start_attached("blank"),
        Err(Error::EmptyScript(_))
    ));
    assert!(!session.inhibit().is_inhibited());
}

#[tokio::test]
async fn test_triggered_detached_run_inhibits_until_done() {
    let scratch = tempfile::tempdir().unwrap();
    let marker_dir = tempfile::tempdir().unwrap();
    let marker = marker_dir.path().join("ran");
    std::env::set_var("WIZARD_MARKER", &marker);

    let session = session(scratch.path());
    let handle = session.trigger_detached("touch").unwrap();
    assert!(session.inhibit().is_inhibited());

    tokio::time::timeout(TIMEOUT, handle).await.unwrap().unwrap();

    assert!(marker.exists());
    assert!(!session.inhibit().is_inhibited());
    assert!(std::fs::read_dir(scratch.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn test_run_detached_reports_terminal_failure() {
    let scratch = tempfile::tempdir().unwrap();
    let catalog = ActionCatalog::from_toml_str(CATALOG).unwrap();
    let session = Session::new(
        Arc::new(catalog),
        SessionConfig {
            runner: RunnerConfig {
                terminal_program: "/nonexistent/terminal".to_string(),
                terminal_args: Vec::new(),
                scratch_dir: Some(scratch.path().to_path_buf()),
                ..RunnerConfig::default()
            },
            ..SessionConfig::default()
        },
    );

    let err = session.run_detached("echo").await.unwrap_err();
    assert!(matches!(err, Error::Runner(_)));
    assert!(!err.is_client_error());
    assert!(!session.inhibit().is_inhibited());
}

#[tokio::test]
async fn test_heartbeat_is_recorded() {
    let scratch = tempfile::tempdir().unwrap();
    let session = session(scratch.path());

    tokio::time::sleep(Duration::from_millis(50)).await;
    session.record_heartbeat();
    assert!(session.supervisor().since_last_beat() < Duration::from_millis(50));
}
