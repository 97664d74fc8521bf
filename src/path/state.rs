use super::{PathError, PathExpander};
use std::env;
use std::path::{Component, Path, PathBuf};

/// Where `cd` should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirTarget {
    /// Walk up this many parent directories; stops at the root.
    Up(u64),
    /// A raw path, relative to the current directory unless absolute.
    Path(String),
}

/// The shell's private notion of its working directory.
#[derive(Debug, Clone)]
pub struct ShellState {
    current_dir: PathBuf,
    expander: PathExpander,
}

impl ShellState {
    /// Starts from the OS working directory of the process.
    pub fn new() -> Result<Self, PathError> {
        Ok(Self::with_directory(env::current_dir()?))
    }

    pub fn with_directory(dir: impl Into<PathBuf>) -> Self {
        Self {
            current_dir: dir.into(),
            expander: PathExpander::new(),
        }
    }

    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    /// Turns a user-supplied path into one anchored at the shell directory.
    ///
    /// Absolute input comes back unchanged. No existence checks happen here.
    pub fn resolve(&self, raw: &str) -> PathBuf {
        if Path::new(raw).is_absolute() {
            return PathBuf::from(raw);
        }

        if self.expander.is_home_path(raw) {
            if let Ok(expanded) = self.expander.expand(raw) {
                if expanded.is_absolute() {
                    return expanded;
                }
            }
        }

        self.current_dir.join(native_separators(raw))
    }

    /// Moves the shell directory. On failure the state is left untouched.
    pub fn change_directory(&mut self, target: DirTarget) -> Result<&Path, PathError> {
        match target {
            DirTarget::Up(steps) => {
                for _ in 0..steps {
                    if !self.current_dir.pop() {
                        break;
                    }
                }
            }
            DirTarget::Path(raw) => {
                let candidate = normalize(&self.resolve(&raw));
                if !candidate.is_dir() {
                    return Err(PathError::NotADirectory(candidate));
                }
                log::debug!("changing directory to {}", candidate.display());
                self.current_dir = candidate;
            }
        }
        Ok(&self.current_dir)
    }
}

fn native_separators(raw: &str) -> String {
    if cfg!(windows) {
        raw.replace('/', "\\")
    } else {
        raw.to_string()
    }
}

/// Folds `.` and `..` components without touching the filesystem.
///
/// `..` at the root stays at the root.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn root() -> PathBuf {
        PathBuf::from(std::path::MAIN_SEPARATOR_STR)
    }

    #[cfg(unix)]
    #[test]
    fn absolute_paths_resolve_to_themselves() {
        let state = ShellState::with_directory(root().join("work"));
        let absolute = root().join("etc").join("hosts");
        let raw = absolute.to_string_lossy().into_owned();
        assert_eq!(state.resolve(&raw), absolute);
    }

    #[test]
    fn relative_paths_join_the_shell_directory() {
        let state = ShellState::with_directory(root().join("work"));
        assert_eq!(
            state.resolve("notes.txt"),
            root().join("work").join("notes.txt")
        );
    }

    #[test]
    fn normalize_folds_dots() {
        let base = root().join("a").join("b");
        assert_eq!(normalize(&base.join("..").join(".").join("c")), root().join("a").join("c"));
        assert_eq!(normalize(&root().join("..").join("..")), root());
    }

    #[test]
    fn missing_directory_leaves_state_unchanged() {
        let dir = TempDir::new().expect("temp dir");
        let mut state = ShellState::with_directory(dir.path());

        let result = state.change_directory(DirTarget::Path("does-not-exist".into()));
        assert!(matches!(result, Err(PathError::NotADirectory(_))));
        assert_eq!(state.current_dir(), dir.path());
    }

    #[test]
    fn files_are_not_directories() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("plain.txt"), b"x").expect("write file");
        let mut state = ShellState::with_directory(dir.path());

        assert!(state
            .change_directory(DirTarget::Path("plain.txt".into()))
            .is_err());
        assert_eq!(state.current_dir(), dir.path());
    }

    #[test]
    fn change_into_subdirectory_and_back() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::create_dir(dir.path().join("sub")).expect("create sub");
        let mut state = ShellState::with_directory(dir.path());

        state
            .change_directory(DirTarget::Path("sub".into()))
            .expect("cd sub");
        assert_eq!(state.current_dir(), dir.path().join("sub"));

        state
            .change_directory(DirTarget::Path("..".into()))
            .expect("cd ..");
        assert_eq!(state.current_dir(), dir.path());
    }

    #[test]
    fn walking_up_stops_at_root() {
        let mut state = ShellState::with_directory(root().join("a").join("b"));
        state.change_directory(DirTarget::Up(1)).expect("up one");
        assert_eq!(state.current_dir(), root().join("a"));

        state.change_directory(DirTarget::Up(10)).expect("up many");
        assert_eq!(state.current_dir(), root());

        state.change_directory(DirTarget::Up(1)).expect("up at root");
        assert_eq!(state.current_dir(), root());
    }
}
