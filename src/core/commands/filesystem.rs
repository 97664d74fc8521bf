use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use mlua::{Lua, MultiValue};

use super::{report, Args, CommandError};
use crate::core::session::Session;
use crate::path::normalize;

/// Creates an empty file. Never truncates an existing one.
pub fn create_file(path: &Path) -> Result<(), CommandError> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(_) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            Err(CommandError::AlreadyExists(path.to_path_buf()))
        }
        Err(err) => Err(err.into()),
    }
}

/// One level only; an existing directory is left as is.
pub fn create_directory(path: &Path) -> Result<(), CommandError> {
    match fs::create_dir(path) {
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        other => other.map_err(CommandError::from),
    }
}

pub fn remove_file(path: &Path) -> Result<(), CommandError> {
    if !path.exists() {
        return Err(CommandError::FileNotFound(path.to_path_buf()));
    }
    if path.is_dir() {
        return Err(CommandError::IsADirectory(path.to_path_buf()));
    }
    fs::remove_file(path)?;
    Ok(())
}

/// Recursive.
pub fn remove_directory(path: &Path) -> Result<(), CommandError> {
    if !path.exists() {
        return Err(CommandError::DirectoryNotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(CommandError::NotADirectory(path.to_path_buf()));
    }
    fs::remove_dir_all(path)?;
    Ok(())
}

/// Files, symlinks and whole directory trees alike.
pub fn remove_any(path: &Path) -> Result<(), CommandError> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Renames within one directory; anything else is a move and is refused.
pub fn rename_entry(from: &Path, to: &Path) -> Result<(), CommandError> {
    if normalize(from).parent() != normalize(to).parent() {
        return Err(CommandError::CrossDirectoryRename(from.to_path_buf()));
    }
    fs::rename(from, to)?;
    Ok(())
}

pub fn move_entry(from: &Path, to: &Path) -> Result<(), CommandError> {
    fs::rename(from, to)?;
    Ok(())
}

/// Files are copied byte for byte (an existing destination file is
/// overwritten), directories recursively.
pub fn copy_entry(from: &Path, to: &Path) -> Result<(), CommandError> {
    if from.is_dir() {
        if normalize(to).starts_with(normalize(from)) {
            return Err(CommandError::CopyIntoItself(from.to_path_buf()));
        }
        copy_dir_recursive(from, to)?;
    } else {
        fs::copy(from, to)?;
    }
    Ok(())
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    if !dst.exists() {
        fs::create_dir_all(dst)?;
    }

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let ty = entry.file_type()?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if ty.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

fn one_path(command: &'static str, session: &Session, args: MultiValue) -> mlua::Result<PathBuf> {
    let raw = Args::new(command, args).string(0, "path")?;
    Ok(session.resolve(&raw))
}

fn two_paths(
    command: &'static str,
    session: &Session,
    args: MultiValue,
) -> mlua::Result<(PathBuf, PathBuf)> {
    let args = Args::new(command, args);
    let from = args.string(0, "from")?;
    let to = args.string(1, "to")?;
    Ok((session.resolve(&from), session.resolve(&to)))
}

pub fn create_file_command(_lua: &Lua, session: &Session, args: MultiValue) -> mlua::Result<MultiValue> {
    let path = one_path("createFile", session, args)?;
    report(session, create_file(&path))
}

pub fn create_directory_command(
    _lua: &Lua,
    session: &Session,
    args: MultiValue,
) -> mlua::Result<MultiValue> {
    let path = one_path("createDirectory", session, args)?;
    report(session, create_directory(&path))
}

pub fn remove_file_command(_lua: &Lua, session: &Session, args: MultiValue) -> mlua::Result<MultiValue> {
    let path = one_path("removeFile", session, args)?;
    report(session, remove_file(&path))
}

pub fn remove_directory_command(
    _lua: &Lua,
    session: &Session,
    args: MultiValue,
) -> mlua::Result<MultiValue> {
    let path = one_path("removeDirectory", session, args)?;
    report(session, remove_directory(&path))
}

pub fn remove_any_command(_lua: &Lua, session: &Session, args: MultiValue) -> mlua::Result<MultiValue> {
    let path = one_path("rm", session, args)?;
    report(session, remove_any(&path))
}

pub fn rename_command(_lua: &Lua, session: &Session, args: MultiValue) -> mlua::Result<MultiValue> {
    let (from, to) = two_paths("rename", session, args)?;
    report(session, rename_entry(&from, &to))
}

pub fn move_command(_lua: &Lua, session: &Session, args: MultiValue) -> mlua::Result<MultiValue> {
    let (from, to) = two_paths("move", session, args)?;
    report(session, move_entry(&from, &to))
}

pub fn copy_command(_lua: &Lua, session: &Session, args: MultiValue) -> mlua::Result<MultiValue> {
    let (from, to) = two_paths("copy", session, args)?;
    report(session, copy_entry(&from, &to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn create_file_never_overwrites() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("notes.txt");

        create_file(&path).expect("first create");
        fs::write(&path, b"keep me").expect("write");

        assert!(matches!(create_file(&path), Err(CommandError::AlreadyExists(_))));
        assert_eq!(fs::read(&path).expect("read"), b"keep me");
    }

    #[test]
    fn remove_file_refuses_directories() {
        let dir = TempDir::new().expect("temp dir");
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).expect("mkdir");

        assert!(matches!(remove_file(&sub), Err(CommandError::IsADirectory(_))));
        assert!(sub.is_dir());

        remove_any(&sub).expect("rm");
        assert!(!sub.exists());
    }

    #[test]
    fn remove_directory_refuses_files_and_recurses() {
        let dir = TempDir::new().expect("temp dir");
        let file = dir.path().join("plain.txt");
        fs::write(&file, b"x").expect("write");
        assert!(matches!(remove_directory(&file), Err(CommandError::NotADirectory(_))));

        let tree = dir.path().join("tree");
        fs::create_dir_all(tree.join("a").join("b")).expect("mkdir -p");
        fs::write(tree.join("a").join("b").join("leaf"), b"x").expect("write leaf");
        remove_directory(&tree).expect("rd");
        assert!(!tree.exists());

        assert!(matches!(
            remove_directory(&tree),
            Err(CommandError::DirectoryNotFound(_))
        ));
    }

    #[test]
    fn rename_stays_in_one_directory() {
        let dir = TempDir::new().expect("temp dir");
        let from = dir.path().join("a.txt");
        fs::write(&from, b"x").expect("write");
        fs::create_dir(dir.path().join("sub")).expect("mkdir");

        let elsewhere = dir.path().join("sub").join("a.txt");
        assert!(matches!(
            rename_entry(&from, &elsewhere),
            Err(CommandError::CrossDirectoryRename(_))
        ));
        assert!(from.exists());

        let renamed = dir.path().join("b.txt");
        rename_entry(&from, &renamed).expect("rename");
        assert!(renamed.exists() && !from.exists());

        move_entry(&renamed, &elsewhere).expect("move");
        assert!(elsewhere.exists());
    }

    #[test]
    fn rename_folds_parent_segments() {
        let dir = TempDir::new().expect("temp dir");
        let from = dir.path().join("a.txt");
        fs::write(&from, b"x").expect("write");
        fs::create_dir(dir.path().join("sub")).expect("mkdir");

        let to = dir.path().join("sub").join("..").join("b.txt");
        rename_entry(&from, &to).expect("rename through ..");
        assert!(!from.exists());
        assert!(dir.path().join("b.txt").exists());
    }

    #[test]
    fn copy_handles_files_and_trees() {
        let dir = TempDir::new().expect("temp dir");
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("nested")).expect("mkdir");
        fs::write(src.join("nested").join("data.bin"), [0u8, 159, 146, 150]).expect("write");

        let dst = dir.path().join("dst");
        copy_entry(&src, &dst).expect("copy tree");
        assert_eq!(
            fs::read(dst.join("nested").join("data.bin")).expect("read copy"),
            vec![0u8, 159, 146, 150]
        );

        let single = dir.path().join("single.bin");
        copy_entry(&dst.join("nested").join("data.bin"), &single).expect("copy file");
        assert_eq!(fs::read(&single).expect("read single").len(), 4);
    }

    #[test]
    fn copy_refuses_own_subtree() {
        let dir = TempDir::new().expect("temp dir");
        let src = dir.path().join("d");
        fs::create_dir(&src).expect("mkdir");
        fs::write(src.join("file.txt"), b"x").expect("write");

        assert!(matches!(
            copy_entry(&src, &src.join("backup")),
            Err(CommandError::CopyIntoItself(_))
        ));
        assert!(matches!(
            copy_entry(&src, &src.join("..").join("d")),
            Err(CommandError::CopyIntoItself(_))
        ));
        assert!(!src.join("backup").exists());

        copy_entry(&src, &dir.path().join("d-copy")).expect("sibling copy");
        assert!(dir.path().join("d-copy").join("file.txt").is_file());
    }

    #[test]
    fn mkdir_is_single_level() {
        let dir = TempDir::new().expect("temp dir");
        assert!(create_directory(&dir.path().join("a").join("b")).is_err());

        create_directory(&dir.path().join("a")).expect("mkdir a");
        create_directory(&dir.path().join("a")).expect("mkdir a again");
    }
}
