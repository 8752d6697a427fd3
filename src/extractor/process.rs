use super::ExtractError;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

const READ_CHUNK: usize = 8 * 1024;

/// Everything a finished child left behind
#[derive(Debug)]
pub struct CapturedOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Run `command` to completion, killing it once `timeout` elapses or once
/// stdout and stderr together grow past `max_output` bytes.
///
/// The child never outlives this call: it is reaped on success and killed
/// then reaped on every failure path. Nothing cancels a run on purpose; if
/// the future is dropped anyway (the HTTP connection went away), the child
/// is killed through `kill_on_drop` and a debug line is logged.
pub async fn run_bounded(
    mut command: Command,
    timeout: Duration,
    max_output: usize,
) -> Result<CapturedOutput, ExtractError> {
    let program = command
        .as_std()
        .get_program()
        .to_string_lossy()
        .into_owned();

    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command.spawn().map_err(|source| ExtractError::Spawn {
        program: program.clone(),
        source,
    })?;
    debug!(%program, pid = ?child.id(), "Child spawned");
    let abandoned = AbandonGuard::new(&program, child.id());

    let outcome =
        tokio::time::timeout(timeout, wait_capped(&mut child, &program, max_output)).await;
    abandoned.disarm();
    match outcome {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(error)) => {
            reap(&mut child, &program).await;
            Err(error)
        }
        Err(_elapsed) => {
            reap(&mut child, &program).await;
            Err(ExtractError::Timeout { program, timeout })
        }
    }
}

async fn wait_capped(
    child: &mut Child,
    program: &str,
    max_output: usize,
) -> Result<CapturedOutput, ExtractError> {
    let io_error = |source: std::io::Error| ExtractError::Io {
        program: program.to_string(),
        source,
    };

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| io_error(std::io::ErrorKind::BrokenPipe.into()))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| io_error(std::io::ErrorKind::BrokenPipe.into()))?;

    let mut out = Vec::new();
    let mut err = Vec::new();
    let mut out_chunk = [0u8; READ_CHUNK];
    let mut err_chunk = [0u8; READ_CHUNK];
    let mut out_open = true;
    let mut err_open = true;

    // Both pipes are drained together so a chatty stderr cannot stall stdout.
    while out_open || err_open {
        tokio::select! {
            read = stdout.read(&mut out_chunk), if out_open => {
                out_open = append(&mut out, &out_chunk, read.map_err(io_error)?);
            }
            read = stderr.read(&mut err_chunk), if err_open => {
                err_open = append(&mut err, &err_chunk, read.map_err(io_error)?);
            }
        }

        if out.len() + err.len() > max_output {
            return Err(ExtractError::OutputTooLarge {
                program: program.to_string(),
                limit: max_output,
            });
        }
    }

    let status = child.wait().await.map_err(io_error)?;
    Ok(CapturedOutput {
        status,
        stdout: out,
        stderr: err,
    })
}

/// Returns whether the stream is still open
fn append(buf: &mut Vec<u8>, chunk: &[u8], read: usize) -> bool {
    buf.extend_from_slice(&chunk[..read]);
    read > 0
}

/// Logs when a run is dropped before it settled
struct AbandonGuard<'a> {
    program: &'a str,
    pid: Option<u32>,
    armed: bool,
}

impl<'a> AbandonGuard<'a> {
    fn new(program: &'a str, pid: Option<u32>) -> Self {
        Self {
            program,
            pid,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for AbandonGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            debug!(program = self.program, pid = ?self.pid, "Run abandoned, killing child");
        }
    }
}

/// Kill and wait for the child, tolerating one that already exited
async fn reap(child: &mut Child, program: &str) {
    let pid = child.id();
    if let Err(error) = child.kill().await {
        warn!(%program, ?pid, %error, "Failed to kill child");
    } else {
        debug!(%program, ?pid, "Child killed");
    }
}
