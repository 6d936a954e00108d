// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use parking_lot::Mutex;
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::runtime::{Handle, Runtime};
use tokio_util::sync::CancellationToken;

use crate::observability::messages::command::SubprocessSpawnFailed;
use crate::observability::messages::StructuredLog;
use crate::traits::{SubprocessOutcome, SubprocessRequest, SubprocessRunner};

/// Runs child processes with `tokio::process`.
///
/// [`SubprocessRunner::run`] blocks, so it is called from blocking threads
/// only (worker-pool jobs are). It drives the child on the runtime the
/// caller already belongs to, or on a small runtime of its own when there
/// is none. Captured streams are read while waiting so a chatty child
/// cannot stall on a full pipe; bytes past the capture limit are dropped.
#[derive(Debug, Default)]
pub struct ProcessRunner {
    fallback: Mutex<Option<Runtime>>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self) -> std::io::Result<Handle> {
        if let Ok(handle) = Handle::try_current() {
            return Ok(handle);
        }
        let mut fallback = self.fallback.lock();
        if let Some(runtime) = fallback.as_ref() {
            return Ok(runtime.handle().clone());
        }
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("playcore-process")
            .enable_all()
            .build()?;
        let handle = runtime.handle().clone();
        *fallback = Some(runtime);
        Ok(handle)
    }
}

impl Drop for ProcessRunner {
    fn drop(&mut self) {
        if let Some(runtime) = self.fallback.get_mut().take() {
            runtime.shutdown_background();
        }
    }
}

fn spawn(request: &SubprocessRequest) -> std::io::Result<Child> {
    let (program, args) = request
        .args
        .split_first()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command line"))?;
    let piped_if = |on: bool| if on { Stdio::piped() } else { Stdio::inherit() };
    Command::new(program)
        .args(args)
        .envs(request.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdin(if request.stdin_data.is_some() { Stdio::piped() } else { Stdio::null() })
        .stdout(piped_if(request.capture_stdout))
        .stderr(piped_if(request.capture_stderr))
        .kill_on_drop(true)
        .spawn()
}

fn init_failure(request: &SubprocessRequest, error: &std::io::Error) -> SubprocessOutcome {
    SubprocessSpawnFailed {
        program: request.args.first().map_or("", String::as_str),
        error,
    }
    .log();
    SubprocessOutcome {
        status: -1,
        error: Some("init".into()),
        ..Default::default()
    }
}

async fn feed(stdin: Option<ChildStdin>, data: Option<&str>) {
    if let (Some(mut stdin), Some(data)) = (stdin, data) {
        // The child may exit without reading everything.
        let _ = stdin.write_all(data.as_bytes()).await;
    }
}

async fn read_capped<R: AsyncRead + Unpin>(stream: Option<R>, limit: u64) -> Vec<u8> {
    let Some(mut stream) = stream else {
        return Vec::new();
    };
    let mut kept = Vec::new();
    let _ = (&mut stream).take(limit).read_to_end(&mut kept).await;
    // Keep draining so the child never blocks on a full pipe.
    let _ = tokio::io::copy(&mut stream, &mut tokio::io::sink()).await;
    kept
}

async fn wait_or_cancel(child: &mut Child, cancel: &CancellationToken) -> (std::io::Result<ExitStatus>, bool) {
    tokio::select! {
        status = child.wait() => (status, false),
        () = cancel.cancelled() => {
            // Fails only if the child already exited; wait() settles it.
            let _ = child.kill().await;
            (child.wait().await, true)
        }
    }
}

async fn run_child(request: &SubprocessRequest, cancel: &CancellationToken) -> SubprocessOutcome {
    let mut child = match spawn(request) {
        Ok(child) => child,
        Err(error) => return init_failure(request, &error),
    };

    let limit = u64::try_from(request.capture_size).unwrap_or(0);
    let stdin = child.stdin.take();
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let (_, stdout, stderr, (status, killed_by_us)) = tokio::join!(
        feed(stdin, request.stdin_data.as_deref()),
        read_capped(stdout, limit),
        read_capped(stderr, limit),
        wait_or_cancel(&mut child, cancel),
    );

    let (status, error) = match status {
        Ok(_) if killed_by_us => (-1, Some("killed".to_string())),
        Ok(status) => (exit_code(status), None),
        Err(e) => (-1, Some(e.to_string())),
    };
    SubprocessOutcome {
        status,
        killed_by_us,
        error,
        stdout,
        stderr,
    }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i64 {
    use std::os::unix::process::ExitStatusExt;
    match (status.code(), status.signal()) {
        (Some(code), _) => i64::from(code),
        (None, Some(signal)) => -i64::from(signal),
        (None, None) => -1,
    }
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i64 {
    status.code().map_or(-1, i64::from)
}

impl SubprocessRunner for ProcessRunner {
    fn run(&self, request: &SubprocessRequest, cancel: &CancellationToken) -> SubprocessOutcome {
        match self.handle() {
            Ok(handle) => handle.block_on(run_child(request, cancel)),
            Err(error) => init_failure(request, &error),
        }
    }

    fn spawn_detached(&self, args: &[String]) -> Result<(), String> {
        let (program, rest) = args.split_first().ok_or("empty command line")?;
        let handle = self.handle().map_err(|e| e.to_string())?;
        let _runtime = handle.enter();
        let mut child = Command::new(program)
            .args(rest)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| e.to_string())?;
        // Reap it so it does not linger as a zombie.
        handle.spawn(async move {
            let _ = child.wait().await;
        });
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::thread;
    use std::time::{Duration, Instant};

    fn sh(script: &str) -> SubprocessRequest {
        SubprocessRequest {
            args: vec!["sh".into(), "-c".into(), script.into()],
            capture_stdout: true,
            capture_stderr: true,
            capture_size: 1024,
            env: Vec::new(),
            stdin_data: None,
        }
    }

    #[test]
    fn test_captures_output_and_status() {
        let runner = ProcessRunner::new();
        let outcome = runner.run(&sh("echo hi; echo oops >&2; exit 3"), &CancellationToken::new());
        assert_eq!(outcome.stdout, b"hi\n");
        assert_eq!(outcome.stderr, b"oops\n");
        assert_eq!(outcome.status, 3);
        assert_eq!(outcome.error, None);
        assert!(!outcome.killed_by_us);
    }

    #[test]
    fn test_capture_limit_truncates() {
        let mut request = sh("echo abcdefgh");
        request.capture_size = 3;
        let outcome = ProcessRunner::new().run(&request, &CancellationToken::new());
        assert_eq!(outcome.stdout, b"abc");
        assert_eq!(outcome.status, 0);
    }

    #[test]
    fn test_env_and_stdin_reach_the_child() {
        let mut request = sh("read line; echo \"$GREETING $line\"");
        request.env.push(("GREETING".into(), "hello".into()));
        request.stdin_data = Some("world\n".into());
        let outcome = ProcessRunner::new().run(&request, &CancellationToken::new());
        assert_eq!(String::from_utf8_lossy(&outcome.stdout), "hello world\n");
    }

    #[test]
    fn test_cancel_kills_the_child() {
        let token = CancellationToken::new();
        let trigger = token.clone();
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            trigger.cancel();
        });
        let started = Instant::now();
        let outcome = ProcessRunner::new().run(&sh("exec sleep 5"), &token);
        canceller.join().unwrap();

        assert!(outcome.killed_by_us);
        assert_eq!(outcome.error.as_deref(), Some("killed"));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_missing_program_fails_to_init() {
        let request = SubprocessRequest {
            args: vec!["/definitely/not/a/program".into()],
            ..sh("")
        };
        let outcome = ProcessRunner::new().run(&request, &CancellationToken::new());
        assert_eq!(outcome.error.as_deref(), Some("init"));
        assert!(ProcessRunner::new().spawn_detached(&[]).is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_runs_on_the_callers_runtime_from_a_blocking_thread() {
        let runner = std::sync::Arc::new(ProcessRunner::new());
        let worker = std::sync::Arc::clone(&runner);
        let outcome = tokio::task::spawn_blocking(move || worker.run(&sh("echo pooled"), &CancellationToken::new()))
            .await
            .unwrap();
        assert_eq!(outcome.stdout, b"pooled\n");
        assert!(runner.fallback.lock().is_none());
    }

    #[test]
    fn test_detached_child_is_started() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("ran");
        let script = format!("touch '{}'", marker.display());
        ProcessRunner::new()
            .spawn_detached(&["sh".into(), "-c".into(), script])
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while !marker.exists() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(marker.exists());
    }
}
