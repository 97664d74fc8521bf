use thiserror::Error;

use crate::path::PathError;
use crate::script::ScriptError;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Lua error: {0}")]
    Lua(#[from] mlua::Error),

    #[error("Ctrl-C error: {0}")]
    CtrlC(#[from] ctrlc::Error),

    #[error("{0}")]
    Path(#[from] PathError),

    #[error("{0}")]
    Script(#[from] ScriptError),

    #[error("cannot read file {path}: {source}")]
    Unreadable {
        path: String,
        source: std::io::Error,
    },
}
