use std::io;
use std::os::windows::process::CommandExt;
use std::process::Command;

use super::{report_exit, report_launch, ProcessError, ProcessExit, ProcessSpawner, SpawnRequest};

/// `CreateProcess` through `std::process`. Arguments are passed as one raw
/// command-line string.
#[derive(Debug, Default)]
pub struct Win32Spawner;

impl ProcessSpawner for Win32Spawner {
    fn spawn(&self, request: &SpawnRequest) -> Result<ProcessExit, ProcessError> {
        let mut command = Command::new(&request.program);
        if !request.args.is_empty() {
            command.raw_arg(request.args.join(" "));
        }

        let mut child = command
            .spawn()
            .map_err(|e| ProcessError::Launch(e.to_string()))?;
        let pid = child.id();
        log::debug!("spawned {} as pid {}", request.program, pid);
        if request.verbose {
            report_launch(&mut io::stdout(), pid);
        }

        let status = child
            .wait()
            .map_err(|e| ProcessError::Wait(e.to_string()))?;
        if request.verbose {
            report_exit(&mut io::stdout(), pid);
        }

        Ok(ProcessExit {
            pid,
            code: status.code(),
        })
    }

    fn name(&self) -> &'static str {
        "win32"
    }
}
