use mlua::{Lua, MultiValue};

use crate::core::session::Session;

const FILE_SYSTEM: &[(&str, &str)] = &[
    (
        "cd(path)/changeDirectory(path)/changeDir(path)",
        "Changes the working directory. A number n walks up n parent directories; no argument prints it.",
    ),
    (
        "ls(printToStd = true)/ll(printToStd = true)",
        "Prints the working directory content. ls(false) returns a table of { filename, isDirectory }.",
    ),
    ("createFile(filename)/touch(filename)", "Creates a new, empty file."),
    (
        "createDirectory(dirname)/createDir(dirname)/mkdir(dirname)",
        "Creates a new directory.",
    ),
    ("removeFile(filename)/rf(filename)", "Removes a file."),
    (
        "removeDirectory(dirname)/removeDir(dirname)/rd(dirname)",
        "Recursively removes a directory and its contents.",
    ),
    ("rm(entity)", "Removes a file, or recursively a directory and its contents."),
    ("rename(from, to)", "Renames a file or directory inside its directory."),
    ("move(from, to)/mv(from, to)", "Moves a file or directory to a new location."),
    ("copy(from, to)/cp(from, to)", "Copies a file or directory to a new location."),
];

const EXECUTION: &[(&str, &str)] = &[
    ("execute(filename, ...)", "Reads, compiles and runs Lua script files."),
    (
        "runSync(program, params, verbose = true)",
        "Runs a program and waits for it. 'params' is an optional table of arguments; returns the exit code.",
    ),
];

const GENERAL: &[(&str, &str)] = &[
    ("print(...)", "Prints its arguments separated by ';'."),
    ("read(filename)", "Returns the content of a file as a string."),
    ("quit(code = 0)/exit(code = 0)", "Terminates the shell."),
    ("version()", "Returns the Lua version string."),
    ("help()", "Shows this listing."),
];

pub fn help(_lua: &Lua, session: &Session, _args: MultiValue) -> mlua::Result<MultiValue> {
    let palette = session.palette();
    println!("~Available functions~");
    for (title, entries) in [
        ("File System:", FILE_SYSTEM),
        ("Execution:", EXECUTION),
        ("General Functions:", GENERAL),
    ] {
        println!("{}", palette.heading(title));
        for (signature, description) in entries {
            println!("{} - {}", palette.command(signature), description);
        }
        println!();
    }
    Ok(MultiValue::new())
}
