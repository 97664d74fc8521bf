use mlua::{IntoLuaMulti, Lua, MultiValue, Table, Value};

use super::Args;
use crate::core::session::Session;
use crate::process::{format_parameters, split_command_line, SpawnRequest};

/// `runSync(program, [params], [verbose = true])`. Returns the exit code,
/// or nothing when the program could not be started.
pub fn run_sync(lua: &Lua, session: &Session, args: MultiValue) -> mlua::Result<MultiValue> {
    let args = Args::new("runSync", args);
    let program = match args.get(0) {
        Some(value @ (Value::String(_) | Value::Integer(_) | Value::Number(_))) => {
            args.text(value, "program")?
        }
        _ => {
            session.report_error("No executable filename or path passed!");
            return Ok(MultiValue::new());
        }
    };

    let arguments = match args.get(1) {
        Some(Value::Table(params)) => parameters(&args, params)?,
        Some(other) => vec![args.text(other, "params")?],
        None => Vec::new(),
    };
    let request = SpawnRequest::new(program)
        .with_args(arguments)
        .verbose(args.flag(2));

    match session.spawn(request) {
        Ok(exit) => exit.code.into_lua_multi(lua),
        Err(err) => {
            session.report_error(err);
            Ok(MultiValue::new())
        }
    }
}

/// Sequence entries become positional arguments, keyed entries become
/// `-k value` / `--key value` pairs sorted by key.
fn parameters(args: &Args, params: &Table) -> mlua::Result<Vec<String>> {
    let mut positional = Vec::new();
    let mut named = Vec::new();
    for pair in params.pairs::<Value, Value>() {
        let (key, value) = pair?;
        let value = args.text(&value, "params")?;
        match key {
            Value::Integer(index) => positional.push((index, value)),
            other => named.push((args.text(&other, "params")?, value)),
        }
    }
    positional.sort_by_key(|(index, _)| *index);
    named.sort();

    let mut arguments: Vec<String> = positional.into_iter().map(|(_, value)| value).collect();
    arguments.extend(split_command_line(&format_parameters(&named)));
    Ok(arguments)
}
