//! Process runner: spawn one child, feed stdin, collect both streams, enforce a deadline.

use std::{
    ffi::OsStr,
    process::{ExitStatus, Stdio},
    time::Duration,
};

use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWriteExt},
    process::{Child, Command},
    time::{sleep, Instant},
};

use super::RawRunResult;

const CHUNK: usize = 8 * 1024;

/// Everything the runner observed about one process.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process never started or was killed on timeout.
    pub status: Option<ExitStatus>,
    pub timed_out: bool,
    pub spawn_failed: bool,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        self.status.map(|s| s.success()).unwrap_or(false)
    }

    pub fn into_raw(self) -> RawRunResult {
        RawRunResult { stdout: self.stdout, stderr: self.stderr }
    }
}

/// Human-readable sentinel placed in stderr when a run hits its deadline.
pub fn timeout_message(limit: Duration) -> String {
    let ms = limit.as_millis();
    if ms % 1000 == 0 {
        let secs = ms / 1000;
        let unit = if secs == 1 { "second" } else { "seconds" };
        format!("Execution timed out ({secs} {unit})")
    } else {
        format!("Execution timed out ({ms} ms)")
    }
}

/// Runs `program` and always resolves; failures end up in `stderr`.
pub async fn run<S: AsRef<OsStr>>(
    program: impl AsRef<OsStr>,
    args: &[S],
    stdin: Option<&str>,
    limit: Duration,
) -> RawRunResult {
    run_process(program, args, stdin, limit).await.into_raw()
}

/// Like [`run`] but also reports exit status and timeout.
pub async fn run_process<S: AsRef<OsStr>>(
    program: impl AsRef<OsStr>,
    args: &[S],
    stdin: Option<&str>,
    limit: Duration,
) -> ProcessOutcome {
    let program = program.as_ref();
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    log::debug!("spawning {:?} with {} arg(s)", program, args.len());
    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            log::debug!("spawn of {:?} failed: {}", program, e);
            return ProcessOutcome {
                stdout: String::new(),
                stderr: e.to_string(),
                status: None,
                timed_out: false,
                spawn_failed: true,
            };
        }
    };

    supervise(child, stdin, limit).await
}

async fn supervise(mut child: Child, stdin: Option<&str>, limit: Duration) -> ProcessOutcome {
    // Input goes in on its own task and the pipe is closed afterwards, so a
    // child that never reads cannot wedge the output loop.
    if let (Some(mut pipe), Some(text)) = (child.stdin.take(), stdin) {
        let payload = text.to_owned();
        tokio::spawn(async move {
            if let Err(e) = pipe.write_all(payload.as_bytes()).await {
                log::debug!("stdin write stopped early: {}", e);
            }
            let _ = pipe.shutdown().await;
        });
    }

    let mut stdout_pipe = child.stdout.take();
    let mut stderr_pipe = child.stderr.take();
    let mut out = Vec::new();
    let mut err = Vec::new();
    let mut out_buf = [0u8; CHUNK];
    let mut err_buf = [0u8; CHUNK];

    let deadline = sleep(limit);
    tokio::pin!(deadline);
    let started = Instant::now();
    let mut timed_out = false;

    while stdout_pipe.is_some() || stderr_pipe.is_some() {
        tokio::select! {
            n = read_some(&mut stdout_pipe, &mut out_buf), if stdout_pipe.is_some() => {
                match n {
                    Some(n) => out.extend_from_slice(&out_buf[..n]),
                    None => stdout_pipe = None,
                }
            }
            n = read_some(&mut stderr_pipe, &mut err_buf), if stderr_pipe.is_some() => {
                match n {
                    Some(n) => err.extend_from_slice(&err_buf[..n]),
                    None => stderr_pipe = None,
                }
            }
            _ = &mut deadline => {
                timed_out = true;
                break;
            }
        }
    }

    let mut status = None;
    if !timed_out {
        tokio::select! {
            res = child.wait() => match res {
                Ok(s) => status = Some(s),
                Err(e) => log::warn!("waiting on child failed: {}", e),
            },
            _ = &mut deadline => timed_out = true,
        }
    }

    if timed_out {
        log::warn!("process exceeded {:?}; killing it", limit);
        if let Err(e) = child.kill().await {
            log::warn!("failed to kill timed out process: {}", e);
        }
    } else {
        log::debug!("process finished in {:?} with {:?}", started.elapsed(), status);
    }

    let stdout = String::from_utf8_lossy(&out).into_owned();
    let mut stderr = String::from_utf8_lossy(&err).into_owned();
    if timed_out && stderr.is_empty() {
        stderr = timeout_message(limit);
    }

    ProcessOutcome { stdout, stderr, status, timed_out, spawn_failed: false }
}

/// `None` once the pipe is closed or broken.
async fn read_some<R: AsyncRead + Unpin>(pipe: &mut Option<R>, buf: &mut [u8]) -> Option<usize> {
    let reader = pipe.as_mut()?;
    match reader.read(buf).await {
        Ok(0) | Err(_) => None,
        Ok(n) => Some(n),
    }
}
