use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed while running {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} did not finish within {} seconds", .timeout.as_secs())]
    Timeout { program: String, timeout: Duration },
}

#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Best text to show a user when the process failed.
    pub fn failure_detail(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        "Unknown error occurred.".to_string()
    }
}

/// Looks a program up on `PATH`, falling back to the name as given.
pub fn resolve_program(program: &str) -> PathBuf {
    which::which(program).unwrap_or_else(|_| PathBuf::from(program))
}

/// Runs `cmd` to completion, forwarding each output line to the log under
/// `label` and collecting both streams.
pub async fn run_captured(
    label: &str,
    mut cmd: Command,
    timeout: Option<Duration>,
) -> Result<ProcessOutput, ProcessError> {
    let program = cmd.as_std().get_program().to_string_lossy().to_string();

    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| ProcessError::Spawn {
        program: program.clone(),
        source,
    })?;

    let stdout_task = child
        .stdout
        .take()
        .map(|stdout| collect_lines(label.to_string(), stdout));
    let stderr_task = child
        .stderr
        .take()
        .map(|stderr| collect_lines(format!("{}-err", label), stderr));

    let status = match timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
            Ok(status) => status,
            Err(_) => {
                let _ = child.kill().await;
                return Err(ProcessError::Timeout {
                    program,
                    timeout: limit,
                });
            }
        },
        None => child.wait().await,
    }
    .map_err(|source| ProcessError::Io {
        program: program.clone(),
        source,
    })?;

    let stdout = join_lines(&program, stdout_task).await?;
    let stderr = join_lines(&program, stderr_task).await?;

    Ok(ProcessOutput {
        status,
        stdout,
        stderr,
    })
}

fn collect_lines<R>(label: String, stream: R) -> JoinHandle<std::io::Result<String>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream).lines();
        let mut collected = String::new();
        while let Some(line) = reader.next_line().await? {
            tracing::debug!("[{}] {}", label, line);
            collected.push_str(&line);
            collected.push('\n');
        }
        Ok(collected)
    })
}

async fn join_lines(
    program: &str,
    task: Option<JoinHandle<std::io::Result<String>>>,
) -> Result<String, ProcessError> {
    let Some(task) = task else {
        return Ok(String::new());
    };
    match task.await {
        Ok(result) => result.map_err(|source| ProcessError::Io {
            program: program.to_string(),
            source,
        }),
        Err(join_err) => Err(ProcessError::Io {
            program: program.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, join_err),
        }),
    }
}
