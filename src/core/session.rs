use std::cell::{Ref, RefCell};
use std::fmt::Display;
use std::path::PathBuf;

use crate::highlight::Palette;
use crate::path::{DirTarget, PathError, ShellState};
use crate::process::{ProcessError, ProcessExit, ProcessSpawner, SpawnRequest};

/// Everything a native command may touch besides the Lua state itself.
pub struct Session {
    state: RefCell<ShellState>,
    spawner: Box<dyn ProcessSpawner>,
    palette: Palette,
}

impl Session {
    pub fn new(state: ShellState, spawner: Box<dyn ProcessSpawner>, palette: Palette) -> Self {
        Self {
            state: RefCell::new(state),
            spawner,
            palette,
        }
    }

    pub fn state(&self) -> Ref<'_, ShellState> {
        self.state.borrow()
    }

    pub fn current_dir(&self) -> PathBuf {
        self.state.borrow().current_dir().to_path_buf()
    }

    pub fn resolve(&self, raw: &str) -> PathBuf {
        self.state.borrow().resolve(raw)
    }

    pub fn change_directory(&self, target: DirTarget) -> Result<PathBuf, PathError> {
        let mut state = self.state.borrow_mut();
        state.change_directory(target).map(|dir| dir.to_path_buf())
    }

    /// Runs a program to completion, preferring a file of that name in the
    /// shell directory.
    pub fn spawn(&self, request: SpawnRequest) -> Result<ProcessExit, ProcessError> {
        let request = request.resolve_program(&self.state.borrow());
        log::debug!(
            "running {} {:?} via {}",
            request.program,
            request.args,
            self.spawner.name()
        );
        self.spawner.spawn(&request)
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// `<cwd>> `
    pub fn prompt(&self) -> String {
        format!("{}> ", self.current_dir().display())
    }

    pub fn report_error(&self, message: impl Display) {
        eprintln!("{} {}", self.palette.error_tag(), message);
    }

    pub fn report_warning(&self, message: impl Display) {
        eprintln!("{} {}", self.palette.warning_tag(), message);
    }
}
