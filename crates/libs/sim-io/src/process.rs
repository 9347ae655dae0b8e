//! Async child process primitives.

use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, Command};

/// Spawn `program` with piped stdout and stderr and a closed stdin.
///
/// A closed stdin makes a child that waits for input see EOF instead of
/// hanging the job. The child is killed if its handle is dropped.
pub fn spawn(program: &str, args: &[String], current_dir: Option<&Path>) -> io::Result<Child> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = current_dir {
        command.current_dir(dir);
    }
    command.spawn()
}

/// Exit status of `child` if it already exited, without blocking.
pub fn poll(child: &mut Child) -> io::Result<Option<ExitStatus>> {
    child.try_wait()
}

/// Kill `child` and reap it.
///
/// A child that exited on its own in the meantime is reaped normally.
pub async fn kill(child: &mut Child) -> io::Result<ExitStatus> {
    match child.start_kill() {
        Err(err) if err.kind() != io::ErrorKind::InvalidInput => return Err(err),
        _ => {}
    }
    child.wait().await
}
