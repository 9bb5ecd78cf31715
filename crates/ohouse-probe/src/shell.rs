//! Device shell execution.
//!
//! Radio toggles, force-stop and settings queries go through `adb shell`
//! rather than the automation server. A non-zero exit or a timeout is an
//! ordinary [`CommandOutput`]; only a command that cannot be started at all
//! is an error.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Default timeout for a single shell command
pub const DEFAULT_SHELL_TIMEOUT: Duration = Duration::from_secs(5);

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Outcome of one shell command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    /// Exit code, `None` if killed or terminated by a signal
    pub status: Option<i32>,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
    /// The command was killed at its deadline
    pub timed_out: bool,
}

impl CommandOutput {
    /// Exit 0 with the given stdout
    #[must_use]
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            ..Self::default()
        }
    }

    /// Non-zero exit with the given stderr
    #[must_use]
    pub fn failed(status: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            stderr: stderr.into(),
            ..Self::default()
        }
    }

    /// Killed at its deadline
    #[must_use]
    pub fn timeout() -> Self {
        Self {
            timed_out: true,
            ..Self::default()
        }
    }

    /// Exited 0 before its deadline
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.status, Some(0)) && !self.timed_out
    }

    /// Stdout without surrounding whitespace
    #[must_use]
    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }
}

/// Runs `shell` commands on the device under test
pub trait DeviceShell {
    /// Run `args` in the device shell, killing it after `timeout`
    fn shell(&self, args: &[&str], timeout: Duration) -> ProbeResult<CommandOutput>;
}

/// `adb -s <serial> shell ...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdbShell {
    program: String,
    serial: String,
}

impl AdbShell {
    /// Shell for the device with `serial`, using the `adb` binary at `program`
    #[must_use]
    pub fn new(program: impl Into<String>, serial: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            serial: serial.into(),
        }
    }

    /// Target device serial
    #[must_use]
    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Full adb argument vector for a shell command
    #[must_use]
    pub fn argv(&self, args: &[&str]) -> Vec<String> {
        ["-s", self.serial.as_str(), "shell"]
            .iter()
            .chain(args)
            .map(|s| (*s).to_string())
            .collect()
    }
}

impl DeviceShell for AdbShell {
    fn shell(&self, args: &[&str], timeout: Duration) -> ProbeResult<CommandOutput> {
        let argv = self.argv(args);
        tracing::debug!(program = %self.program, args = ?argv, "adb shell");
        run_with_timeout(&self.program, &argv, timeout)
    }
}

/// Run a host command, killing it if it outlives `timeout`
pub fn run_with_timeout(program: &str, args: &[String], timeout: Duration) -> ProbeResult<CommandOutput> {
    let command_line = format!("{program} {}", args.join(" "));
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ProbeError::device(&command_line, e.to_string()))?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let mut timed_out = false;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status.code();
        }
        if Instant::now() >= deadline {
            tracing::warn!(command = %command_line, ?timeout, "command timed out, killing");
            let _ = child.kill();
            let _ = child.wait();
            timed_out = true;
            break None;
        }
        std::thread::sleep(EXIT_POLL_INTERVAL);
    };

    Ok(CommandOutput {
        status,
        stdout: stdout.join().unwrap_or_default(),
        stderr: stderr.join().unwrap_or_default(),
        timed_out,
    })
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> std::thread::JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod output_tests {
        use super::*;

        #[test]
        fn test_success_requires_zero_exit() {
            assert!(CommandOutput::ok("1\n").success());
            assert!(!CommandOutput::failed(1, "boom").success());
            assert!(!CommandOutput::timeout().success());
        }

        #[test]
        fn test_stdout_trimmed() {
            assert_eq!(CommandOutput::ok(" 0\r\n").stdout_trimmed(), "0");
        }
    }

    mod adb_tests {
        use super::*;

        #[test]
        fn test_argv_prefix() {
            let adb = AdbShell::new("adb", "emulator-5554");
            assert_eq!(
                adb.argv(&["svc", "wifi", "disable"]),
                vec!["-s", "emulator-5554", "shell", "svc", "wifi", "disable"]
            );
        }

        #[test]
        fn test_missing_binary_is_device_error() {
            let adb = AdbShell::new("/nonexistent/adb-binary", "emulator-5554");
            let err = adb.shell(&["true"], Duration::from_secs(1)).unwrap_err();
            assert!(matches!(err, ProbeError::Device { .. }));
        }
    }

    #[cfg(unix)]
    mod host_command_tests {
        use super::*;

        fn sh(script: &str, timeout: Duration) -> CommandOutput {
            run_with_timeout("sh", &["-c".to_string(), script.to_string()], timeout).unwrap()
        }

        #[test]
        fn test_captures_stdout_and_status() {
            let out = sh("echo hello; echo oops >&2; exit 3", Duration::from_secs(5));
            assert_eq!(out.status, Some(3));
            assert_eq!(out.stdout_trimmed(), "hello");
            assert_eq!(out.stderr.trim(), "oops");
            assert!(!out.timed_out);
        }

        #[test]
        fn test_invalid_utf8_output_is_kept() {
            let out = sh(r"printf 'state \377 on\n'", Duration::from_secs(5));
            assert!(out.success());
            assert!(out.stdout.starts_with("state "));
            assert!(out.stdout.contains('\u{FFFD}'));
            assert!(out.stdout_trimmed().ends_with("on"));
        }

        #[test]
        fn test_timeout_kills_command() {
            let start = Instant::now();
            let out = sh("exec sleep 5", Duration::from_millis(100));
            assert!(out.timed_out);
            assert!(!out.success());
            assert!(start.elapsed() < Duration::from_secs(4));
        }
    }
}
