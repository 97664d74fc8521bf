use std::ffi::CString;
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;
use std::ptr;

use super::{report_exit, report_launch, ProcessError, ProcessExit, ProcessSpawner, SpawnRequest};

/// `posix_spawnp` + `waitpid`. The child inherits the full environment.
#[derive(Debug, Default)]
pub struct PosixSpawner;

impl PosixSpawner {
    /// Runs `request`, writing the verbose PID messages to `out`. Nothing is
    /// written when the launch itself fails.
    pub fn spawn_reporting(
        &self,
        request: &SpawnRequest,
        out: &mut dyn Write,
    ) -> Result<ProcessExit, ProcessError> {
        let program = to_cstring(&request.program)?;

        let mut argv_owned = Vec::with_capacity(request.args.len() + 1);
        argv_owned.push(program.clone());
        for arg in &request.args {
            argv_owned.push(to_cstring(arg)?);
        }
        let envp_owned = environment();

        let argv = null_terminated(&argv_owned);
        let envp = null_terminated(&envp_owned);

        let mut pid: libc::pid_t = 0;
        // SAFETY: argv and envp are NULL-terminated arrays whose entries point
        // into CStrings that outlive this call.
        let status = unsafe {
            libc::posix_spawnp(
                &mut pid,
                program.as_ptr(),
                ptr::null(),
                ptr::null(),
                argv.as_ptr(),
                envp.as_ptr(),
            )
        };
        if status != 0 {
            return Err(ProcessError::Launch(
                io::Error::from_raw_os_error(status).to_string(),
            ));
        }

        let reported_pid = u32::try_from(pid).unwrap_or_default();
        log::debug!("spawned {} as pid {}", request.program, reported_pid);
        if request.verbose {
            report_launch(out, reported_pid);
        }

        let wait_status = wait_for(pid)?;
        if request.verbose {
            report_exit(out, reported_pid);
        }

        let code = if libc::WIFEXITED(wait_status) {
            Some(libc::WEXITSTATUS(wait_status))
        } else {
            None
        };
        Ok(ProcessExit {
            pid: reported_pid,
            code,
        })
    }
}

impl ProcessSpawner for PosixSpawner {
    fn spawn(&self, request: &SpawnRequest) -> Result<ProcessExit, ProcessError> {
        self.spawn_reporting(request, &mut io::stdout())
    }

    fn name(&self) -> &'static str {
        "posix"
    }
}

fn wait_for(pid: libc::pid_t) -> Result<libc::c_int, ProcessError> {
    let mut wait_status: libc::c_int = 0;
    loop {
        // SAFETY: pid is a child of this process and wait_status is a valid
        // out-pointer.
        let rc = unsafe { libc::waitpid(pid, &mut wait_status, 0) };
        if rc != -1 {
            return Ok(wait_status);
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(ProcessError::Wait(err.to_string()));
        }
    }
}

fn to_cstring(value: &str) -> Result<CString, ProcessError> {
    CString::new(value).map_err(|_| ProcessError::InvalidArgument(value.to_string()))
}

fn environment() -> Vec<CString> {
    std::env::vars_os()
        .filter_map(|(key, value)| {
            let mut entry = key.as_bytes().to_vec();
            entry.push(b'=');
            entry.extend_from_slice(value.as_bytes());
            CString::new(entry).ok()
        })
        .collect()
}

fn null_terminated(values: &[CString]) -> Vec<*mut libc::c_char> {
    values
        .iter()
        .map(|value| value.as_ptr() as *mut libc::c_char)
        .chain(std::iter::once(ptr::null_mut()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_fails_with_message() {
        let request = SpawnRequest::new("luash-no-such-program-4f1c").verbose(false);
        match PosixSpawner.spawn(&request) {
            Err(ProcessError::Launch(message)) => assert!(!message.is_empty()),
            other => panic!("expected launch failure, got {:?}", other),
        }
    }

    #[test]
    fn failed_launch_reports_no_pid() {
        let request = SpawnRequest::new("luash-no-such-program-4f1c").verbose(true);
        let mut out = Vec::new();

        assert!(PosixSpawner.spawn_reporting(&request, &mut out).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn verbose_run_reports_its_pid() {
        let request = SpawnRequest::new("true").verbose(true);
        let mut out = Vec::new();

        let exit = PosixSpawner
            .spawn_reporting(&request, &mut out)
            .expect("spawn true");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains(&format!("Process with PID {} is currently running...", exit.pid)));
        assert!(text.contains(&format!("Process {} ended execution!", exit.pid)));
    }

    #[test]
    fn exit_codes_come_back() {
        let ok = PosixSpawner
            .spawn(&SpawnRequest::new("true").verbose(false))
            .expect("spawn true");
        assert!(ok.success());

        let failed = PosixSpawner
            .spawn(
                &SpawnRequest::new("sh")
                    .with_args(vec!["-c".into(), "exit 3".into()])
                    .verbose(false),
            )
            .expect("spawn sh");
        assert_eq!(failed.code, Some(3));
    }

    #[test]
    fn nul_bytes_are_rejected() {
        let request = SpawnRequest::new("echo")
            .with_args(vec!["a\0b".into()])
            .verbose(false);
        assert!(matches!(
            PosixSpawner.spawn(&request),
            Err(ProcessError::InvalidArgument(_))
        ));
    }
}
