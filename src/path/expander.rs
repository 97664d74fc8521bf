use super::PathError;
use std::path::{Path, PathBuf};

/// Expands a leading `~` into the user's home directory.
#[derive(Debug, Clone, Default)]
pub struct PathExpander;

impl PathExpander {
    pub fn new() -> Self {
        Self
    }

    pub fn expand(&self, path: &str) -> Result<PathBuf, PathError> {
        if self.is_home_path(path) {
            self.expand_tilde(path)
        } else {
            Ok(Path::new(path).to_path_buf())
        }
    }

    fn expand_tilde(&self, path: &str) -> Result<PathBuf, PathError> {
        if path.len() == 1 {
            return self.home_dir();
        }

        let without_tilde = &path[1..];
        match without_tilde.strip_prefix(['/', '\\']) {
            Some(stripped) => {
                let mut home_path = self.home_dir()?;
                for part in stripped.split(['/', '\\']) {
                    if !part.is_empty() {
                        home_path.push(part);
                    }
                }
                Ok(home_path)
            }
            // "~user/..." is left alone
            None => Ok(Path::new(path).to_path_buf()),
        }
    }

    pub fn is_home_path(&self, path: &str) -> bool {
        path.starts_with('~')
    }

    pub fn home_dir(&self) -> Result<PathBuf, PathError> {
        dirs::home_dir().ok_or(PathError::HomeDirNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_are_untouched() {
        let expander = PathExpander::new();
        let expanded = expander.expand("some/dir").expect("plain path");
        assert_eq!(expanded, PathBuf::from("some/dir"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let expander = PathExpander::new();
        let Ok(home) = expander.home_dir() else {
            return;
        };
        assert_eq!(expander.expand("~").expect("home"), home);
        assert_eq!(
            expander.expand("~/projects/luash").expect("home subdir"),
            home.join("projects").join("luash")
        );
    }

    #[test]
    fn other_users_are_not_expanded() {
        let expander = PathExpander::new();
        assert_eq!(
            expander.expand("~root/x").expect("left alone"),
            PathBuf::from("~root/x")
        );
    }
}
