//! Shell-local working directory and path resolution.
//!
//! The shell never calls `std::env::set_current_dir`: relative paths handed
//! to native commands are resolved against [`ShellState`] instead of the OS
//! process working directory.

mod expander;
mod state;

pub use expander::PathExpander;
pub use state::{normalize, DirTarget, ShellState};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PathError {
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("cannot determine the working directory: {0}")]
    Io(#[from] std::io::Error),
}
