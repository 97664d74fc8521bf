//! Compile, run and report one unit of Lua source.

mod diagnostic;

pub use diagnostic::{Diagnostic, DiagnosticKind};

use std::io::{self, Write};

use mlua::{Function, Lua, MultiValue, Value};
use thiserror::Error;

use crate::core::commands::CommandError;
use crate::highlight::Palette;

/// Chunk name for lines typed at the prompt.
pub const INTERACTIVE_ORIGIN: &str = "(shell)";
/// Chunk name for `-e` sources.
pub const INLINE_ORIGIN: &str = "unnamed";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecuteOptions {
    /// Print the produced values and try the source as an expression first.
    pub print_result: bool,
    /// Print a diagnostic on failure.
    pub report_exceptions: bool,
}

impl ExecuteOptions {
    pub const BATCH: Self = Self {
        print_result: false,
        report_exceptions: true,
    };

    pub const INTERACTIVE: Self = Self {
        print_result: true,
        report_exceptions: true,
    };

    pub const QUIET: Self = Self {
        print_result: false,
        report_exceptions: false,
    };
}

/// Values produced by a successful unit.
#[derive(Debug)]
pub struct Execution {
    pub values: MultiValue,
}

impl Execution {
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(|value| matches!(value, Value::Nil))
    }
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("{0}")]
    Failed(Diagnostic),

    /// `quit`/`exit` was called; the shell should stop with this code.
    #[error("exit requested with code {0}")]
    Exit(i32),
}

/// Compiles and runs `source` under the chunk name `origin`.
pub fn execute_source(
    lua: &Lua,
    source: &str,
    origin: &str,
    options: ExecuteOptions,
    palette: &Palette,
) -> Result<Execution, ScriptError> {
    log::trace!("executing {} ({} bytes)", origin, source.len());

    let function = match compile(lua, source, origin, options.print_result) {
        Ok(function) => function,
        Err(err) => {
            return Err(failure(
                DiagnosticKind::Compile,
                &err,
                origin,
                source,
                options,
                palette,
            ))
        }
    };

    let result = function.call::<MultiValue>(());
    settle();

    match result {
        Ok(values) => {
            let execution = Execution { values };
            if options.print_result && !execution.is_empty() {
                println!("{}", display_values(lua, &execution.values));
                settle();
            }
            Ok(execution)
        }
        Err(err) => match exit_request(&err) {
            Some(code) => Err(ScriptError::Exit(code)),
            None => Err(failure(
                DiagnosticKind::Runtime,
                &err,
                origin,
                source,
                options,
                palette,
            )),
        },
    }
}

/// True when `source` is a prefix of a valid chunk, e.g. an unclosed
/// `function ... ` block.
pub fn needs_more_input(lua: &Lua, source: &str) -> bool {
    let expression = format!("return {}", source);
    if lua.load(expression.as_str()).into_function().is_ok() {
        return false;
    }
    matches!(
        lua.load(source).into_function(),
        Err(mlua::Error::SyntaxError {
            incomplete_input: true,
            ..
        })
    )
}

fn compile(lua: &Lua, source: &str, origin: &str, expression_first: bool) -> mlua::Result<Function> {
    let chunk_name = format!("={}", origin);
    if expression_first {
        let expression = format!("return {}", source);
        if let Ok(function) = lua
            .load(expression.as_str())
            .set_name(chunk_name.as_str())
            .into_function()
        {
            return Ok(function);
        }
    }
    lua.load(source).set_name(chunk_name.as_str()).into_function()
}

fn failure(
    kind: DiagnosticKind,
    error: &mlua::Error,
    origin: &str,
    source: &str,
    options: ExecuteOptions,
    palette: &Palette,
) -> ScriptError {
    let diagnostic = Diagnostic::from_lua_error(kind, error, origin, source);
    log::debug!("{:?} failure in {}: {}", kind, origin, diagnostic);
    if options.report_exceptions {
        diagnostic.report(palette);
        settle();
    }
    ScriptError::Failed(diagnostic)
}

/// Finds a `quit`/`exit` request buried in callback error wrapping.
pub fn exit_request(error: &mlua::Error) -> Option<i32> {
    match error {
        mlua::Error::CallbackError { cause, .. } => exit_request(cause),
        mlua::Error::ExternalError(inner) => match inner.downcast_ref::<CommandError>() {
            Some(CommandError::Exit(code)) => Some(*code),
            _ => None,
        },
        _ => None,
    }
}

/// Tab-separated `tostring` of every value.
pub fn display_values(lua: &Lua, values: &MultiValue) -> String {
    values
        .iter()
        .map(|value| display_value(lua, value))
        .collect::<Vec<_>>()
        .join("\t")
}

pub fn display_value(lua: &Lua, value: &Value) -> String {
    if let Value::String(text) = value {
        return text.to_string_lossy().to_string();
    }
    lua.globals()
        .get::<Function>("tostring")
        .and_then(|tostring| tostring.call::<String>(value.clone()))
        .unwrap_or_else(|_| format!("<{}>", value.type_name()))
}

/// Lua has no pending job queue; flushing the standard streams is all that
/// is left to do between units.
pub fn settle() {
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(lua: &Lua, source: &str, options: ExecuteOptions) -> Result<Execution, ScriptError> {
        execute_source(lua, source, "test", options, &Palette::plain())
    }

    #[test]
    fn expressions_yield_values() {
        let lua = Lua::new();
        let execution = run(&lua, "1 + 2", ExecuteOptions::INTERACTIVE).expect("expression");
        assert_eq!(display_values(&lua, &execution.values), "3");
    }

    #[test]
    fn statements_still_run_in_interactive_mode() {
        let lua = Lua::new();
        let execution = run(&lua, "answer = 42", ExecuteOptions::INTERACTIVE).expect("statement");
        assert!(execution.is_empty());
        let answer: i64 = lua.globals().get("answer").expect("global");
        assert_eq!(answer, 42);
    }

    #[test]
    fn compile_errors_are_diagnosed() {
        let lua = Lua::new();
        let error = run(&lua, "x = 1\ny = = 2", ExecuteOptions::QUIET).expect_err("syntax error");
        let ScriptError::Failed(diagnostic) = error else {
            panic!("expected a diagnostic");
        };
        assert_eq!(diagnostic.kind, DiagnosticKind::Compile);
        assert_eq!(diagnostic.line, Some(2));
        assert_eq!(diagnostic.source_line.as_deref(), Some("y = = 2"));
    }

    #[test]
    fn runtime_errors_are_diagnosed() {
        let lua = Lua::new();
        let error =
            run(&lua, "local t = nil\nreturn t.field", ExecuteOptions::QUIET).expect_err("index nil");
        let ScriptError::Failed(diagnostic) = error else {
            panic!("expected a diagnostic");
        };
        assert_eq!(diagnostic.kind, DiagnosticKind::Runtime);
        assert_eq!(diagnostic.line, Some(2));
    }

    #[test]
    fn incomplete_blocks_ask_for_more() {
        let lua = Lua::new();
        assert!(needs_more_input(&lua, "function f()\n"));
        assert!(!needs_more_input(&lua, "function f() end\n"));
        assert!(!needs_more_input(&lua, "1 +* 2"));
    }

    #[test]
    fn exit_requests_survive_callback_wrapping() {
        let lua = Lua::new();
        let quit = lua
            .create_function(|_, ()| -> mlua::Result<()> {
                Err(mlua::Error::external(CommandError::Exit(7)))
            })
            .expect("function");
        lua.globals().set("quit", quit).expect("set quit");

        let error = run(&lua, "quit()", ExecuteOptions::QUIET).expect_err("exit");
        assert!(matches!(error, ScriptError::Exit(7)));
    }
}
