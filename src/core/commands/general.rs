use std::fs;
use std::io::{self, Write};

use mlua::{IntoLuaMulti, Lua, MultiValue, Value};

use super::{Args, CommandError};
use crate::core::session::Session;
use crate::script::{self, ExecuteOptions, ScriptError};

/// Writes every argument, `;`-separated, then a newline.
pub fn print(lua: &Lua, _session: &Session, args: MultiValue) -> mlua::Result<MultiValue> {
    let line = args
        .iter()
        .map(|value| script::display_value(lua, value))
        .collect::<Vec<_>>()
        .join(";");

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", line).map_err(mlua::Error::external)?;
    Ok(MultiValue::new())
}

/// Whole file content as a (byte-exact) Lua string.
pub fn read(lua: &Lua, session: &Session, args: MultiValue) -> mlua::Result<MultiValue> {
    let args = Args::new("read", args);
    if args.len() != 1 {
        return Err(CommandError::BadParameters("read").into());
    }
    let raw = args.string(0, "filename")?;
    let path = session.resolve(&raw);

    let content = fs::read(&path).map_err(|source| CommandError::Unreadable {
        path: raw.clone(),
        source,
    })?;
    lua.create_string(content)?.into_lua_multi(lua)
}

/// Runs each named script file in order. Stops at the first failure.
pub fn execute(lua: &Lua, session: &Session, args: MultiValue) -> mlua::Result<MultiValue> {
    let args = Args::new("execute", args);
    if args.get(0).is_none() {
        return Err(CommandError::MissingArgument {
            command: "execute",
            name: "filename",
        }
        .into());
    }

    for index in 0..args.len() {
        let raw = args.string(index, "filename")?;
        let path = session.resolve(&raw);
        let source = fs::read_to_string(&path).map_err(|source| CommandError::Unreadable {
            path: raw.clone(),
            source,
        })?;

        log::debug!("executing {}", path.display());
        match script::execute_source(lua, &source, &raw, ExecuteOptions::QUIET, session.palette()) {
            Ok(_) => {}
            Err(ScriptError::Exit(code)) => return Err(CommandError::Exit(code).into()),
            Err(ScriptError::Failed(diagnostic)) => {
                return Err(CommandError::ExecutionFailed {
                    path: raw,
                    reason: diagnostic.to_string(),
                }
                .into())
            }
        }
    }
    Ok(MultiValue::new())
}

/// `quit(code = 0)`. Unwinds the running script; the shell exits with `code`.
pub fn quit(_lua: &Lua, _session: &Session, args: MultiValue) -> mlua::Result<MultiValue> {
    let args = Args::new("quit", args);
    let code = match args.get(0) {
        None => 0,
        Some(Value::Integer(code)) => i32::try_from(*code).unwrap_or(1),
        Some(Value::Number(code)) => *code as i32,
        Some(value @ Value::String(_)) => exit_code(&args.text(value, "code")?),
        Some(_) => 0,
    };
    script::settle();
    Err(CommandError::Exit(code).into())
}

/// Numeric strings count; anything else exits with 0.
fn exit_code(text: &str) -> i32 {
    let text = text.trim();
    text.parse::<i32>()
        .ok()
        .or_else(|| text.parse::<f64>().ok().map(|code| code as i32))
        .unwrap_or(0)
}

/// Engine version string, e.g. `Lua 5.4`.
pub fn version(lua: &Lua, _session: &Session, _args: MultiValue) -> mlua::Result<MultiValue> {
    let version: String = lua.globals().get("_VERSION")?;
    version.into_lua_multi(lua)
}
