//! Subprocess runner for external CLIs (terraform, aws)
//!
//! Every call is one-shot: a bounded wait, no retries. Callers decide what a
//! failure means for them.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Result from running an external tool
#[derive(Debug, Clone, Default)]
pub struct ExternalToolResult {
    /// Whether the process ran to completion (exit code may still be non-zero)
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub return_code: Option<i32>,
    pub timed_out: bool,
    /// The executable could not be found
    pub not_installed: bool,
    pub error: Option<String>,
}

impl ExternalToolResult {
    pub fn success(stdout: String, stderr: String, return_code: i32) -> Self {
        Self {
            success: true,
            stdout,
            stderr,
            return_code: Some(return_code),
            ..Default::default()
        }
    }

    pub fn failure(error: String) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }

    pub fn not_installed(tool_name: &str) -> Self {
        Self {
            not_installed: true,
            error: Some(format!("{} not installed", tool_name)),
            ..Default::default()
        }
    }

    pub fn timeout(tool_name: &str, timeout: Duration) -> Self {
        Self {
            timed_out: true,
            error: Some(format!(
                "{} timed out after {}s",
                tool_name,
                timeout.as_secs()
            )),
            ..Default::default()
        }
    }

    /// Completed with exit code zero
    pub fn exited_ok(&self) -> bool {
        self.success && self.return_code == Some(0)
    }

    /// Parse stdout as JSON
    pub fn json_output(&self) -> Option<serde_json::Value> {
        if self.stdout.trim().is_empty() {
            return None;
        }
        serde_json::from_str(&self.stdout).ok()
    }
}

/// Run `cmd` with a bounded wait.
///
/// `env` entries are added on top of the inherited environment.
pub fn run_external_tool(
    cmd: &[String],
    tool_name: &str,
    timeout: Duration,
    cwd: Option<&Path>,
    env: Option<&HashMap<String, String>>,
) -> ExternalToolResult {
    let Some((program, args)) = cmd.split_first() else {
        return ExternalToolResult::failure("Empty command".to_string());
    };

    debug!("Running {}: {} {:?}", tool_name, program, args);

    let mut command = Command::new(program);
    command.args(args);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }
    if let Some(extra_env) = env {
        command.envs(extra_env);
    }
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let child = match command.spawn() {
        Ok(child) => child,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return ExternalToolResult::not_installed(tool_name);
        }
        Err(e) => {
            return ExternalToolResult::failure(format!("Failed to run {}: {}", tool_name, e));
        }
    };

    run_with_timeout(child, tool_name, timeout)
}

/// Minimum time allowed for draining pipes after the process has exited
const PIPE_DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Wait for `child`, killing it once `timeout` elapses.
///
/// Output pipes are drained on their own threads so a chatty process cannot
/// block on a full pipe while we poll. A grandchild that inherits the pipes
/// can hold them open after `child` exits; the drain is bounded by the same
/// deadline and the reader thread is left to finish on its own.
fn run_with_timeout(mut child: Child, tool_name: &str, timeout: Duration) -> ExternalToolResult {
    let stdout_reader = child.stdout.take().map(spawn_reader);
    let stderr_reader = child.stderr.take().map(spawn_reader);

    let start = Instant::now();
    let collect = |reader: Option<mpsc::Receiver<Vec<u8>>>, stream: &str| -> String {
        let Some(rx) = reader else {
            return String::new();
        };
        let wait = (start + timeout)
            .saturating_duration_since(Instant::now())
            .max(PIPE_DRAIN_GRACE);
        match rx.recv_timeout(wait) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(_) => {
                warn!("{} {} still open after exit, output dropped", tool_name, stream);
                String::new()
            }
        }
    };

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                let stdout = collect(stdout_reader, "stdout");
                let stderr = collect(stderr_reader, "stderr");
                return ExternalToolResult::success(stdout, stderr, status.code().unwrap_or(-1));
            }
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    warn!("{} timed out after {}s", tool_name, timeout.as_secs());
                    return ExternalToolResult::timeout(tool_name, timeout);
                }
                thread::sleep(Duration::from_millis(50));
            }
            Err(e) => {
                let _ = child.kill();
                return ExternalToolResult::failure(format!(
                    "Failed to wait for {}: {}",
                    tool_name, e
                ));
            }
        }
    }
}

fn spawn_reader(mut pipe: impl Read + Send + 'static) -> mpsc::Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        let _ = tx.send(buf);
    });
    rx
}

/// Check if a tool is installed
pub fn is_tool_installed(tool: &str) -> bool {
    Command::new(tool)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_tool_result() {
        let result = ExternalToolResult::success("output".into(), "".into(), 0);
        assert!(result.success);
        assert!(result.exited_ok());
        assert_eq!(result.stdout, "output");

        let result = ExternalToolResult::failure("error".into());
        assert!(!result.success);
        assert!(!result.exited_ok());
        assert_eq!(result.error, Some("error".into()));

        let result = ExternalToolResult::timeout("aws", Duration::from_secs(15));
        assert!(result.timed_out);
        assert_eq!(result.error.as_deref(), Some("aws timed out after 15s"));
    }

    #[test]
    fn test_json_output() {
        let result = ExternalToolResult::success(r#"{"Vpcs": []}"#.into(), "".into(), 0);
        assert!(result.json_output().is_some());

        let result = ExternalToolResult::success("   ".into(), "".into(), 0);
        assert!(result.json_output().is_none());
    }

    #[test]
    fn test_missing_binary_is_not_installed() {
        let cmd = vec!["tiercheck-definitely-missing-binary".to_string()];
        let result = run_external_tool(&cmd, "missing", Duration::from_secs(5), None, None);
        assert!(result.not_installed);
        assert!(!result.success);
    }

    #[test]
    fn test_empty_command() {
        let result = run_external_tool(&[], "nothing", Duration::from_secs(1), None, None);
        assert_eq!(result.error.as_deref(), Some("Empty command"));
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_output_and_exit_code() {
        let cmd: Vec<String> = ["sh", "-c", "echo out; echo err >&2; exit 3"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let result = run_external_tool(&cmd, "sh", Duration::from_secs(10), None, None);
        assert!(result.success);
        assert_eq!(result.return_code, Some(3));
        assert_eq!(result.stdout.trim(), "out");
        assert_eq!(result.stderr.trim(), "err");
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_process() {
        let cmd: Vec<String> = ["sh", "-c", "sleep 5"].iter().map(|s| s.to_string()).collect();
        let result = run_external_tool(&cmd, "sleep", Duration::from_millis(200), None, None);
        assert!(result.timed_out);
        assert!(!result.success);
    }

    #[cfg(unix)]
    #[test]
    fn test_inherited_pipe_does_not_block_past_timeout() {
        // The backgrounded sleep keeps stdout open after sh exits
        let cmd: Vec<String> = ["sh", "-c", "sleep 10 & echo started"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let begun = Instant::now();
        let result = run_external_tool(&cmd, "sh", Duration::from_secs(1), None, None);
        assert!(begun.elapsed() < Duration::from_secs(5));
        assert!(result.success);
        assert_eq!(result.return_code, Some(0));
    }
}
