//! Subprocess utilities shared by the clone and CK steps
//!
//! Both `git` and `java` are driven the same way:
//! 1. Spawn the program with `std::process::Command`, stdout/stderr piped
//! 2. Drain both pipes on helper threads so chatty tools never block
//! 3. Poll for exit until the wall-clock timeout, killing the child on expiry
//! 4. Return a standardized `ExternalToolResult`

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Result from running an external tool
#[derive(Debug, Clone)]
pub struct ExternalToolResult {
    /// Whether the tool ran to completion (exit status may still be non-zero)
    pub success: bool,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
    /// Process exit code
    pub return_code: Option<i32>,
    /// Whether the tool timed out
    pub timed_out: bool,
    /// Error message if failed
    pub error: Option<String>,
    /// The program could not be found on PATH
    pub not_found: bool,
}

impl ExternalToolResult {
    /// Create a completed result
    pub fn success(stdout: String, stderr: String, return_code: i32) -> Self {
        Self {
            success: true,
            stdout,
            stderr,
            return_code: Some(return_code),
            timed_out: false,
            error: None,
            not_found: false,
        }
    }

    /// Create a failed result
    pub fn failure(error: String) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: String::new(),
            return_code: None,
            timed_out: false,
            error: Some(error),
            not_found: false,
        }
    }

    /// The program is not installed
    pub fn not_found(tool_name: &str) -> Self {
        Self {
            not_found: true,
            ..Self::failure(format!("{} not found. Please install it first.", tool_name))
        }
    }

    /// Create a timeout result
    pub fn timeout(tool_name: &str, timeout: Duration) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: String::new(),
            return_code: None,
            timed_out: true,
            error: Some(format!(
                "{} timed out after {}s",
                tool_name,
                timeout.as_secs()
            )),
            not_found: false,
        }
    }

    /// Completed and exited with status 0
    pub fn exited_ok(&self) -> bool {
        self.success && self.return_code == Some(0)
    }

    /// One-line reason for a failed run, for logs and error values
    pub fn describe_failure(&self) -> String {
        if let Some(error) = &self.error {
            return error.clone();
        }
        let tail = last_line(&self.stderr);
        match (self.return_code, tail) {
            (Some(code), Some(line)) => format!("exit code {}: {}", code, line),
            (Some(code), None) => format!("exit code {}", code),
            (None, Some(line)) => line.to_string(),
            (None, None) => "unknown failure".to_string(),
        }
    }
}

fn last_line(text: &str) -> Option<&str> {
    text.lines().rev().map(str::trim).find(|l| !l.is_empty())
}

/// Run an external tool with standard error handling
///
/// # Arguments
/// * `cmd` - Command and arguments to run
/// * `tool_name` - Human-readable tool name for error messages
/// * `timeout` - Wall-clock limit (`None` = wait forever)
/// * `cwd` - Working directory for the tool
pub fn run_external_tool(
    cmd: &[String],
    tool_name: &str,
    timeout: Option<Duration>,
    cwd: Option<&Path>,
) -> ExternalToolResult {
    if cmd.is_empty() {
        return ExternalToolResult::failure("Empty command".to_string());
    }

    let program = &cmd[0];
    let args = &cmd[1..];

    debug!("Running {}: {} {:?}", tool_name, program, args);

    let mut command = Command::new(program);
    command.args(args);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }
    command.stdin(Stdio::null());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            if e.kind() == std::io::ErrorKind::NotFound {
                return ExternalToolResult::not_found(tool_name);
            }
            return ExternalToolResult::failure(format!("Failed to run {}: {}", tool_name, e));
        }
    };

    let stdout_reader = drain(child.stdout.take());
    let stderr_reader = drain(child.stderr.take());

    match wait_with_timeout(&mut child, timeout) {
        Ok(Some(code)) => {
            let stdout = join_reader(stdout_reader);
            let stderr = join_reader(stderr_reader);
            ExternalToolResult::success(stdout, stderr, code)
        }
        Ok(None) => {
            let _ = child.kill();
            let _ = child.wait();
            // Grandchildren may still hold the pipes open; leave the readers detached.
            drop(stdout_reader);
            drop(stderr_reader);
            let limit = timeout.unwrap_or_default();
            warn!("{} timed out after {}s", tool_name, limit.as_secs());
            ExternalToolResult::timeout(tool_name, limit)
        }
        Err(e) => {
            let _ = child.kill();
            ExternalToolResult::failure(format!("Failed to wait for {}: {}", tool_name, e))
        }
    }
}

/// Poll until exit. `Ok(None)` means the deadline passed first.
fn wait_with_timeout(child: &mut Child, timeout: Option<Duration>) -> std::io::Result<Option<i32>> {
    let Some(timeout) = timeout else {
        let status = child.wait()?;
        return Ok(Some(status.code().unwrap_or(-1)));
    };

    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status.code().unwrap_or(-1)));
        }
        if start.elapsed() > timeout {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut reader| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = reader.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).to_string()
        })
    })
}

fn join_reader(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

/// Check if a tool is on PATH by running it with a version flag
pub fn is_tool_installed(tool: &str, version_flag: &str) -> bool {
    Command::new(tool)
        .arg(version_flag)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
