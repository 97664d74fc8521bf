use std::fs;
use std::path::Path;

use mlua::{IntoLuaMulti, Lua, MultiValue, Value};

use super::{report, Args, CommandError};
use crate::core::session::Session;
use crate::path::DirTarget;

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub filename: String,
    pub is_directory: bool,
}

/// Entries of `dir` in the order the platform yields them.
pub fn list_entries(dir: &Path) -> Result<Vec<EntryInfo>, CommandError> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let is_directory = entry.file_type().map(|ty| ty.is_dir()).unwrap_or(false);
        entries.push(EntryInfo {
            filename: entry.file_name().to_string_lossy().into_owned(),
            is_directory,
        });
    }
    Ok(entries)
}

/// `cd()` prints the directory, `cd(n)` walks up `|n|` levels and
/// `cd(path)` switches to `path`.
pub fn change_directory(_lua: &Lua, session: &Session, args: MultiValue) -> mlua::Result<MultiValue> {
    let args = Args::new("cd", args);
    let target = match args.get(0) {
        None => {
            println!("{}", session.palette().prompt(&session.current_dir().display().to_string()));
            return Ok(MultiValue::new());
        }
        Some(Value::Integer(steps)) => DirTarget::Up(steps.unsigned_abs()),
        Some(Value::Number(steps)) if steps.is_finite() && steps.fract() == 0.0 => {
            DirTarget::Up(steps.abs() as u64)
        }
        Some(Value::Number(steps)) => {
            return Err(args.invalid(format!("cannot walk up {} directories", steps)))
        }
        Some(value) => DirTarget::Path(args.text(value, "path")?),
    };

    let result = session
        .change_directory(target)
        .map(|_| ())
        .map_err(CommandError::from);
    report(session, result)
}

/// `ls()` prints, `ls(false)` returns `{ filename, isDirectory }` records.
pub fn list_files(lua: &Lua, session: &Session, args: MultiValue) -> mlua::Result<MultiValue> {
    let print_to_std = Args::new("ls", args).flag(0);

    let entries = match list_entries(&session.current_dir()) {
        Ok(entries) => entries,
        Err(err) => return report(session, Err(err)),
    };

    if print_to_std {
        for entry in &entries {
            if entry.is_directory {
                println!("{}", session.palette().directory(&entry.filename));
            } else {
                println!("{}", entry.filename);
            }
        }
        return Ok(MultiValue::new());
    }

    let listing = lua.create_table()?;
    for (index, entry) in entries.iter().enumerate() {
        let record = lua.create_table()?;
        record.set("filename", entry.filename.as_str())?;
        record.set("isDirectory", entry.is_directory)?;
        listing.set(index + 1, record)?;
    }
    Value::Table(listing).into_lua_multi(lua)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn listing_marks_directories() {
        let dir = TempDir::new().expect("temp dir");
        fs::create_dir(dir.path().join("sub")).expect("mkdir");
        fs::write(dir.path().join("file.txt"), b"x").expect("write");

        let mut entries = list_entries(dir.path()).expect("list");
        entries.sort_by(|a, b| a.filename.cmp(&b.filename));
        assert_eq!(
            entries,
            vec![
                EntryInfo {
                    filename: "file.txt".into(),
                    is_directory: false
                },
                EntryInfo {
                    filename: "sub".into(),
                    is_directory: true
                },
            ]
        );
    }
}
