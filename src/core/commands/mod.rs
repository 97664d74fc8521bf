//! The native command set installed into every new shell.
//!
//! Commands follow one convention: wrong or missing arguments raise a Lua
//! error, while filesystem and process failures are printed with an
//! `[Error]` tag and the command returns nothing.

use std::fmt;
use std::io;
use std::path::PathBuf;

use mlua::{MultiValue, Value};

use super::hooks::HookFn;
use super::session::Session;
use crate::path::PathError;
use crate::process::ProcessError;

mod directory;
mod filesystem;
mod general;
mod help;
mod process;

pub use directory::{list_entries, EntryInfo};
pub use filesystem::{
    copy_entry, create_directory, create_file, move_entry, remove_any, remove_directory, remove_file,
    rename_entry,
};

/// Name and callback of every built-in command, aliases included.
pub const DEFAULT_HOOKS: &[(&str, HookFn)] = &[
    ("print", general::print),
    ("read", general::read),
    ("execute", general::execute),
    ("quit", general::quit),
    ("exit", general::quit),
    ("version", general::version),
    ("cd", directory::change_directory),
    ("changeDirectory", directory::change_directory),
    ("changeDir", directory::change_directory),
    ("ls", directory::list_files),
    ("ll", directory::list_files),
    ("runSync", process::run_sync),
    ("createFile", filesystem::create_file_command),
    ("touch", filesystem::create_file_command),
    ("createDirectory", filesystem::create_directory_command),
    ("createDir", filesystem::create_directory_command),
    ("mkdir", filesystem::create_directory_command),
    ("removeFile", filesystem::remove_file_command),
    ("rf", filesystem::remove_file_command),
    ("removeDirectory", filesystem::remove_directory_command),
    ("removeDir", filesystem::remove_directory_command),
    ("rd", filesystem::remove_directory_command),
    ("rm", filesystem::remove_any_command),
    ("rename", filesystem::rename_command),
    ("move", filesystem::move_command),
    ("mv", filesystem::move_command),
    ("copy", filesystem::copy_command),
    ("cp", filesystem::copy_command),
    ("help", help::help),
];

#[derive(Debug)]
pub enum CommandError {
    BadParameters(&'static str),
    MissingArgument {
        command: &'static str,
        name: &'static str,
    },
    InvalidArgument {
        command: &'static str,
        message: String,
    },
    AlreadyExists(PathBuf),
    FileNotFound(PathBuf),
    DirectoryNotFound(PathBuf),
    IsADirectory(PathBuf),
    NotADirectory(PathBuf),
    CrossDirectoryRename(PathBuf),
    CopyIntoItself(PathBuf),
    Unreadable {
        path: String,
        source: io::Error,
    },
    ExecutionFailed {
        path: String,
        reason: String,
    },
    /// Raised by `quit`/`exit`; unwinds the running script.
    Exit(i32),
    IoError(io::Error),
    PathError(PathError),
    ProcessError(ProcessError),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::BadParameters(command) => {
                write!(f, "Bad parameters passed to {}", command)
            }
            CommandError::MissingArgument { command, name } => {
                write!(f, "{}: missing argument '{}'", command, name)
            }
            CommandError::InvalidArgument { command, message } => {
                write!(f, "{}: {}", command, message)
            }
            CommandError::AlreadyExists(path) => {
                write!(f, "File {} already exists.", path.display())
            }
            CommandError::FileNotFound(path) => {
                write!(f, "File {} doesn't exist.", path.display())
            }
            CommandError::DirectoryNotFound(path) => {
                write!(f, "Directory {} doesn't exist.", path.display())
            }
            CommandError::IsADirectory(path) => write!(
                f,
                "Entity {0} is a directory. Try removeDir('{0}') or rm('{0}') instead.",
                path.display()
            ),
            CommandError::NotADirectory(path) => write!(
                f,
                "Entity {0} is a file. Try removeFile('{0}') or rm('{0}') instead.",
                path.display()
            ),
            CommandError::CrossDirectoryRename(path) => write!(
                f,
                "Tried to move {} to a new location. Use move('from', 'to') instead.",
                path.display()
            ),
            CommandError::CopyIntoItself(path) => write!(
                f,
                "Cannot copy directory {} into itself.",
                path.display()
            ),
            CommandError::Unreadable { path, source } => {
                write!(f, "Cannot load file content of {}: {}", path, source)
            }
            CommandError::ExecutionFailed { path, reason } => {
                write!(f, "Failure to execute {}: {}", path, reason)
            }
            CommandError::Exit(code) => write!(f, "exit requested with code {}", code),
            CommandError::IoError(err) => write!(f, "{}", err),
            CommandError::PathError(err) => write!(f, "{}", err),
            CommandError::ProcessError(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Unreadable { source, .. } => Some(source),
            CommandError::IoError(err) => Some(err),
            CommandError::PathError(err) => Some(err),
            CommandError::ProcessError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for CommandError {
    fn from(err: io::Error) -> Self {
        CommandError::IoError(err)
    }
}

impl From<PathError> for CommandError {
    fn from(err: PathError) -> Self {
        CommandError::PathError(err)
    }
}

impl From<ProcessError> for CommandError {
    fn from(err: ProcessError) -> Self {
        CommandError::ProcessError(err)
    }
}

impl From<CommandError> for mlua::Error {
    fn from(err: CommandError) -> Self {
        mlua::Error::external(err)
    }
}

/// Positional access to the values a script passed to a command.
pub(crate) struct Args {
    command: &'static str,
    values: Vec<Value>,
}

impl Args {
    pub(crate) fn new(command: &'static str, values: MultiValue) -> Self {
        Self {
            command,
            values: values.into_iter().collect(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    /// `nil` counts as absent.
    pub(crate) fn get(&self, index: usize) -> Option<&Value> {
        match self.values.get(index) {
            Some(Value::Nil) | None => None,
            Some(value) => Some(value),
        }
    }

    pub(crate) fn string(&self, index: usize, name: &'static str) -> mlua::Result<String> {
        match self.get(index) {
            None => Err(CommandError::MissingArgument {
                command: self.command,
                name,
            }
            .into()),
            Some(value) => self.text(value, name),
        }
    }

    /// A string, or the string form of a number.
    pub(crate) fn text(&self, value: &Value, name: &'static str) -> mlua::Result<String> {
        match value {
            Value::String(text) => Ok(text.to_str()?.to_string()),
            Value::Integer(number) => Ok(number.to_string()),
            Value::Number(number) => Ok(number.to_string()),
            other => Err(self.invalid(format!(
                "expected a string for '{}', got {}",
                name,
                other.type_name()
            ))),
        }
    }

    /// Only an explicit `false` turns a flag off.
    pub(crate) fn flag(&self, index: usize) -> bool {
        !matches!(self.get(index), Some(Value::Boolean(false)))
    }

    pub(crate) fn invalid(&self, message: String) -> mlua::Error {
        CommandError::InvalidArgument {
            command: self.command,
            message,
        }
        .into()
    }
}

/// Prints an operational failure and swallows it.
pub(crate) fn report(session: &Session, result: Result<(), CommandError>) -> mlua::Result<MultiValue> {
    if let Err(err) = result {
        log::debug!("command failed: {:?}", err);
        session.report_error(err);
    }
    Ok(MultiValue::new())
}
