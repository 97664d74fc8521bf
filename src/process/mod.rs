//! Synchronous launching of external programs.
//!
//! The calling thread blocks until the child exits; the child shares the
//! shell's standard streams.

use std::fmt;
use std::io::Write;

use crate::path::ShellState;

#[cfg(unix)]
mod posix;
pub mod signal;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use posix::PosixSpawner;
#[cfg(windows)]
pub use windows::Win32Spawner;

#[derive(Debug)]
pub enum ProcessError {
    /// The platform refused to start the program.
    Launch(String),
    /// Arguments that cannot cross the OS boundary, e.g. interior NUL bytes.
    InvalidArgument(String),
    /// The child started but could not be waited on.
    Wait(String),
    Unsupported,
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::Launch(msg) => write!(f, "{}", msg),
            ProcessError::InvalidArgument(arg) => write!(f, "Invalid argument: {:?}", arg),
            ProcessError::Wait(msg) => write!(f, "Failed to wait for process: {}", msg),
            ProcessError::Unsupported => {
                write!(f, "Process spawning is not supported on this platform")
            }
        }
    }
}

impl std::error::Error for ProcessError {}

/// A program plus its argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRequest {
    pub program: String,
    pub args: Vec<String>,
    pub verbose: bool,
}

impl SpawnRequest {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            verbose: true,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// A file named like the program in the shell directory wins over a
    /// `PATH` lookup.
    pub fn resolve_program(mut self, state: &ShellState) -> Self {
        let local = state.resolve(&self.program);
        if local.exists() && !local.is_dir() {
            log::debug!("using local executable {}", local.display());
            self.program = local.to_string_lossy().into_owned();
        }
        self
    }
}

/// How a finished child went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    pub pid: u32,
    /// `None` when the child did not exit normally (killed by a signal).
    pub code: Option<i32>,
}

impl ProcessExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// A platform backend able to run a program to completion.
pub trait ProcessSpawner {
    fn spawn(&self, request: &SpawnRequest) -> Result<ProcessExit, ProcessError>;

    fn name(&self) -> &'static str;
}

/// Backend for platforms without process support.
#[derive(Debug, Default)]
pub struct UnsupportedSpawner;

impl ProcessSpawner for UnsupportedSpawner {
    fn spawn(&self, _request: &SpawnRequest) -> Result<ProcessExit, ProcessError> {
        Err(ProcessError::Unsupported)
    }

    fn name(&self) -> &'static str {
        "unsupported"
    }
}

/// The backend for the platform this binary was built for.
pub fn default_spawner() -> Box<dyn ProcessSpawner> {
    #[cfg(unix)]
    {
        Box::new(PosixSpawner)
    }
    #[cfg(windows)]
    {
        Box::new(Win32Spawner)
    }
    #[cfg(not(any(unix, windows)))]
    {
        Box::new(UnsupportedSpawner)
    }
}

/// Renders named parameters the way a command line spells them: one-letter
/// keys as ` -k value`, longer keys as ` --key value`.
pub fn format_parameters(named: &[(String, String)]) -> String {
    let mut line = String::new();
    for (key, value) in named {
        let dashes = if key.chars().count() == 1 { "-" } else { "--" };
        line.push(' ');
        line.push_str(dashes);
        line.push_str(key);
        line.push(' ');
        line.push_str(value);
    }
    line
}

/// Splits on whitespace. Values containing spaces end up as several
/// arguments.
pub fn split_command_line(line: &str) -> Vec<String> {
    line.split_whitespace().map(String::from).collect()
}

pub(crate) fn report_launch(out: &mut dyn Write, pid: u32) {
    let _ = writeln!(out, "Process with PID {} is currently running...", pid);
    let _ = out.flush();
}

pub(crate) fn report_exit(out: &mut dyn Write, pid: u32) {
    let _ = writeln!(out, "Process {} ended execution!", pid);
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn short_and_long_parameters() {
        let named = vec![
            ("n".to_string(), "3".to_string()),
            ("count".to_string(), "7".to_string()),
        ];
        assert_eq!(format_parameters(&named), " -n 3 --count 7");
        assert_eq!(
            split_command_line(&format_parameters(&named)),
            vec!["-n", "3", "--count", "7"]
        );
    }

    #[test]
    fn values_with_spaces_split_apart() {
        let named = vec![("m".to_string(), "two words".to_string())];
        assert_eq!(
            split_command_line(&format_parameters(&named)),
            vec!["-m", "two", "words"]
        );
    }

    #[test]
    fn launch_and_exit_messages_name_the_pid() {
        let mut out = Vec::new();
        report_launch(&mut out, 42);
        report_exit(&mut out, 42);
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "Process with PID 42 is currently running...\nProcess 42 ended execution!\n"
        );
    }

    #[test]
    fn local_file_wins_over_path_lookup() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("tool"), b"").expect("write tool");
        let state = ShellState::with_directory(dir.path());

        let request = SpawnRequest::new("tool").resolve_program(&state);
        assert_eq!(
            request.program,
            dir.path().join("tool").to_string_lossy().into_owned()
        );

        let request = SpawnRequest::new("ls").resolve_program(&state);
        assert_eq!(request.program, "ls");
    }

    #[test]
    fn local_directory_does_not_shadow_program() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::create_dir(dir.path().join("git")).expect("create dir");
        let state = ShellState::with_directory(dir.path());

        let request = SpawnRequest::new("git").resolve_program(&state);
        assert_eq!(request.program, "git");
    }
}
