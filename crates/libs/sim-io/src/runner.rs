//! Supervised process execution.
//!
//! [`Runner::run`] resolves once the child exits or is told to stop.
//! Everything the child prints is forwarded line by line as [`RunEvent`]s so
//! the caller can react while the process is still running.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::process;

/// How often a running child is checked for exit or stop requests.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Which pipe a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// Events emitted while a child runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// The child could not be started.
    SpawnFailed(String),
    /// The child started.
    Spawned { pid: Option<u32> },
    /// A line of output, trailing newline included.
    Line { stream: OutputStream, text: String },
    /// The child is gone. Always the last event after a successful spawn.
    Exited { success: bool, killed: bool },
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunOutcome {
    /// Exit status, `None` when the child never started or could not be reaped.
    pub exit_status: Option<ExitStatus>,
    /// Whether the child was killed on request.
    pub killed: bool,
}

impl RunOutcome {
    /// Exit code, if the child exited on its own.
    pub fn code(&self) -> Option<i32> {
        self.exit_status.and_then(|status| status.code())
    }

    /// Whether the child exited on its own with status zero.
    pub fn success(&self) -> bool {
        self.exit_status.is_some_and(|status| status.success())
    }
}

/// Command line of a supervised child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Runner {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
}

impl Runner {
    /// Run `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    ///
    /// ```rust
    /// use sim_io::runner::Runner;
    ///
    /// let runner = Runner::new("gem5.opt").args(["run_micro.py", "LTAGE"]);
    /// assert_eq!(runner.command_line(), "gem5.opt run_micro.py LTAGE");
    /// ```
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run the child inside `dir`.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Program and arguments joined by spaces, for logs.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the child to completion.
    ///
    /// Raising `should_stop` kills the child. The future resolves only after
    /// both output pipes are drained, so every [`RunEvent::Line`] is sent
    /// before [`RunEvent::Exited`].
    pub async fn run(
        &self,
        tx: UnboundedSender<RunEvent>,
        should_stop: Arc<AtomicBool>,
    ) -> RunOutcome {
        let mut child = match process::spawn(&self.program, &self.args, self.current_dir.as_deref())
        {
            Ok(child) => child,
            Err(err) => {
                let _ = tx.send(RunEvent::SpawnFailed(format!("{}: {}", self.program, err)));
                return RunOutcome::default();
            }
        };

        let pid = child.id();
        debug!("Spawned '{}' (pid {:?})", self.command_line(), pid);
        let _ = tx.send(RunEvent::Spawned { pid });

        let readers: Vec<JoinHandle<()>> = [
            child
                .stdout
                .take()
                .map(|pipe| forward_lines(tx.clone(), OutputStream::Stdout, pipe)),
            child
                .stderr
                .take()
                .map(|pipe| forward_lines(tx.clone(), OutputStream::Stderr, pipe)),
        ]
        .into_iter()
        .flatten()
        .collect();

        let mut outcome = RunOutcome::default();
        loop {
            if should_stop.load(Ordering::Relaxed) {
                outcome.killed = true;
                match process::kill(&mut child).await {
                    Ok(status) => outcome.exit_status = Some(status),
                    Err(err) => warn!("Failed to kill pid {:?} - {}", pid, err),
                }
                break;
            }
            match process::poll(&mut child) {
                Ok(Some(status)) => {
                    outcome.exit_status = Some(status);
                    break;
                }
                Ok(None) => tokio::time::sleep(POLL_INTERVAL).await,
                Err(err) => {
                    warn!("Lost track of pid {:?} - {}", pid, err);
                    break;
                }
            }
        }

        for reader in readers {
            let _ = reader.await;
        }

        let _ = tx.send(RunEvent::Exited {
            success: outcome.success(),
            killed: outcome.killed,
        });
        outcome
    }
}

fn forward_lines<T>(tx: UnboundedSender<RunEvent>, stream: OutputStream, pipe: T) -> JoinHandle<()>
where
    T: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(pipe);
        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            match reader.read_until(b'\n', &mut buffer).await {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    let text = String::from_utf8_lossy(&buffer).into_owned();
                    if tx.send(RunEvent::Line { stream, text }).is_err() {
                        break;
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
    use tokio::time::timeout;

    use super::*;

    const TEST_TIMEOUT: Duration = Duration::from_secs(5);

    fn shell(script: &str) -> Runner {
        Runner::new("sh").args(["-c", script])
    }

    fn launch(
        runner: Runner,
        stop: Arc<AtomicBool>,
    ) -> (JoinHandle<RunOutcome>, UnboundedReceiver<RunEvent>) {
        let (tx, rx) = unbounded_channel();
        (tokio::spawn(async move { runner.run(tx, stop).await }), rx)
    }

    async fn finish(handle: JoinHandle<RunOutcome>) -> RunOutcome {
        timeout(TEST_TIMEOUT, handle)
            .await
            .expect("runner timed out")
            .expect("Couldn't join task")
    }

    async fn drain(mut rx: UnboundedReceiver<RunEvent>) -> Vec<RunEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    fn lines(events: &[RunEvent], wanted: OutputStream) -> Vec<&str> {
        events
            .iter()
            .filter_map(|event| match event {
                RunEvent::Line { stream, text } if *stream == wanted => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn streams_are_tagged_and_ordered() {
        let (handle, rx) = launch(
            shell("echo 'Exit Eventworkbegin'; echo warn: slow >&2; echo 'Exit Eventworkend'"),
            Arc::new(AtomicBool::new(false)),
        );
        let outcome = finish(handle).await;
        assert!(outcome.success());
        assert!(!outcome.killed);

        let events = drain(rx).await;
        assert!(matches!(events.first(), Some(RunEvent::Spawned { .. })));
        assert_eq!(
            events.last(),
            Some(&RunEvent::Exited {
                success: true,
                killed: false
            })
        );
        assert_eq!(
            lines(&events, OutputStream::Stdout),
            vec!["Exit Eventworkbegin\n", "Exit Eventworkend\n"]
        );
        assert_eq!(lines(&events, OutputStream::Stderr), vec!["warn: slow\n"]);
    }

    #[tokio::test]
    async fn spawn_failure() {
        let (handle, rx) = launch(
            Runner::new("./no-such-simulator"),
            Arc::new(AtomicBool::new(false)),
        );
        let outcome = finish(handle).await;
        assert_eq!(outcome, RunOutcome::default());

        let events = drain(rx).await;
        assert_eq!(events.len(), 1);
        match &events[0] {
            RunEvent::SpawnFailed(message) => assert!(message.contains("no-such-simulator")),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn exit_code_is_kept() {
        let (handle, _rx) = launch(shell("exit 3"), Arc::new(AtomicBool::new(false)));
        let outcome = finish(handle).await;
        assert_eq!(outcome.code(), Some(3));
        assert!(!outcome.success());
    }

    #[tokio::test]
    async fn stop_kills_child() {
        let stop = Arc::new(AtomicBool::new(false));
        let (handle, mut rx) = launch(shell("echo ready; exec sleep 30"), Arc::clone(&stop));
        loop {
            match timeout(TEST_TIMEOUT, rx.recv()).await {
                Ok(Some(RunEvent::Line { .. })) => break,
                Ok(Some(_)) => continue,
                other => panic!("runner ended early: {other:?}"),
            }
        }
        stop.store(true, Ordering::Relaxed);

        let outcome = finish(handle).await;
        assert!(outcome.killed);
        assert!(!outcome.success());
        assert_eq!(outcome.code(), None);
    }

    #[tokio::test]
    async fn runs_in_current_dir() {
        let dir = tempfile::tempdir().expect("Couldn't create temp dir");
        let (handle, _rx) = launch(
            shell("echo roi > marker.txt").current_dir(dir.path()),
            Arc::new(AtomicBool::new(false)),
        );
        assert!(finish(handle).await.success());
        assert!(dir.path().join("marker.txt").exists());
    }

    #[test]
    fn command_line_without_args() {
        assert_eq!(Runner::new("pwd").command_line(), "pwd");
        assert_eq!(Runner::new("sh").arg("-c").arg("true").command_line(), "sh -c true");
    }
}
