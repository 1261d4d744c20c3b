//! Test helpers for black-box behavioral specifications against the `umcc`
//! CLI and `umccd` daemon binaries.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::time::Duration;

/// Returns the path to a binary, checking llvm-cov target directory first.
/// Falls back to resolving relative to the test binary itself when
/// `CARGO_MANIFEST_DIR` is stale (e.g. compiled by a removed worktree into a
/// shared target directory).
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug").join(name);
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }

    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

fn umcc_binary() -> PathBuf {
    binary_path("umcc")
}

pub fn umccd_binary() -> PathBuf {
    binary_path("umccd")
}

/// Create a CLI builder for `umcc` invocations.
pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

/// Fluent builder for `umcc` invocations against an isolated state directory.
pub struct CliBuilder {
    args: Vec<String>,
    dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    fn new() -> Self {
        Self {
            args: Vec::new(),
            dir: None,
            envs: Vec::new(),
        }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn pwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.dir = Some(path.into());
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<Path>) -> Self {
        self.envs.push((key.to_string(), value.as_ref().to_string_lossy().to_string()));
        self
    }

    pub fn command(self) -> Command {
        let mut cmd = Command::new(umcc_binary());
        cmd.args(&self.args);
        if let Some(dir) = self.dir {
            cmd.current_dir(dir);
        }
        cmd.env_remove("OMNI_STATE_DIR");
        cmd.env_remove("OMNI_CONFIG");
        cmd.env_remove("OMNI_LOG_LEVEL");
        for (key, value) in self.envs {
            cmd.env(key, value);
        }
        cmd
    }

    pub fn passes(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            output.status.success(),
            "expected command to pass, got exit code {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    pub fn fails(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            !output.status.success(),
            "expected command to fail, but it passed\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    /// Run regardless of exit code, for assertions keyed on a specific code.
    pub fn run(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        RunAssert { output }
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn code(&self) -> Option<i32> {
        self.output.status.code()
    }

    pub fn code_is(self, expected: i32) -> Self {
        assert_eq!(
            self.output.status.code(),
            Some(expected),
            "stdout: {}\nstderr: {}",
            self.stdout(),
            self.stderr()
        );
        self
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(stdout.contains(expected), "stdout does not contain '{expected}'\nstdout: {stdout}");
        self
    }

    pub fn stdout_lacks(self, unexpected: &str) -> Self {
        let stdout = self.stdout();
        assert!(!stdout.contains(unexpected), "stdout should not contain '{unexpected}'\nstdout: {stdout}");
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(stderr.contains(expected), "stderr does not contain '{expected}'\nstderr: {stderr}");
        self
    }
}

// =============================================================================
// Polling
// =============================================================================

pub const SPEC_POLL_INTERVAL_MS: u64 = 20;
pub const SPEC_WAIT_MAX_MS: u64 = 5000;

pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);
    let poll_interval = Duration::from_millis(SPEC_POLL_INTERVAL_MS);

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll_interval);
    }
    false
}

// =============================================================================
// Daemon
// =============================================================================

/// An isolated `$state_dir` with an optionally running `umcc up` child,
/// cleaned up (child killed, directory removed) on drop.
pub struct Daemon {
    state_dir: tempfile::TempDir,
    child: Option<Child>,
}

impl Daemon {
    /// Creates the state directory without starting anything.
    pub fn new() -> Self {
        Self {
            state_dir: tempfile::tempdir().expect("tempdir"),
            child: None,
        }
    }

    pub fn state_path(&self) -> &Path {
        self.state_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.state_path().join("config.toml")
    }

    pub fn socket_path(&self) -> PathBuf {
        self.state_path().join("control.sock")
    }

    /// Writes `config.toml` contents.
    pub fn write_config(&self, toml: &str) {
        std::fs::write(self.config_path(), toml).expect("write config.toml");
    }

    /// A CLI builder pointed at this daemon's state directory.
    pub fn cli(&self) -> CliBuilder {
        cli().args(&["--state-dir"]).args(&[self.state_path().to_str().unwrap()])
    }

    /// Spawns `umcc up` in the background and blocks until the control
    /// socket appears (or panics after `SPEC_WAIT_MAX_MS`).
    pub fn start(&mut self) {
        let child = Command::new(umcc_binary())
            .args(["--state-dir", self.state_path().to_str().unwrap(), "up"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn umcc up");
        self.child = Some(child);

        let socket = self.socket_path();
        let ready = wait_for(SPEC_WAIT_MAX_MS, || socket.exists());
        assert!(ready, "control socket never appeared at {}", socket.display());
        // The socket file existing doesn't mean the listener has bound it
        // yet on every platform; give status a moment to stop erroring.
        wait_for(1000, || self.cli().args(&["status"]).run().code() == Some(0));
    }

    /// Sends `down`, waits for the process to exit, and returns its status.
    pub fn stop(&mut self) -> Option<std::process::ExitStatus> {
        let _ = self.cli().args(&["down"]).run();
        if let Some(mut child) = self.child.take() {
            let exited = wait_for(SPEC_WAIT_MAX_MS, || {
                matches!(child.try_wait(), Ok(Some(_)))
            });
            if !exited {
                let _ = child.kill();
            }
            return child.try_wait().ok().flatten();
        }
        None
    }
}

impl Default for Daemon {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
