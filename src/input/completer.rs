use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use rustyline::{
    completion::{Completer, Pair},
    highlight::{CmdKind, Highlighter},
    hint::Hinter,
    validate::Validator,
    Context, Helper,
};

use crate::highlight::Palette;

/// Line-editor helper: completes command names, and file names inside
/// string literals, relative to the shell directory.
#[derive(Clone)]
pub struct ShellHelper {
    commands: BTreeSet<String>,
    current_dir: PathBuf,
    palette: Palette,
}

impl ShellHelper {
    pub fn new(commands: impl IntoIterator<Item = String>, current_dir: PathBuf, palette: Palette) -> Self {
        Self {
            commands: commands.into_iter().collect(),
            current_dir,
            palette,
        }
    }

    pub fn set_commands(&mut self, commands: impl IntoIterator<Item = String>) {
        self.commands = commands.into_iter().collect();
    }

    pub fn set_current_dir(&mut self, dir: PathBuf) {
        self.current_dir = dir;
    }

    pub fn complete_command(&self, prefix: &str) -> Vec<Pair> {
        self.commands
            .iter()
            .filter(|name| name.starts_with(prefix))
            .map(|name| Pair {
                display: name.clone(),
                replacement: name.clone(),
            })
            .collect()
    }

    /// `incomplete` is the text typed so far inside a string literal.
    pub fn complete_path(&self, incomplete: &str) -> Vec<Pair> {
        let (typed_dir, prefix) = match incomplete.rfind(['/', '\\']) {
            Some(index) => (&incomplete[..=index], &incomplete[index + 1..]),
            None => ("", incomplete),
        };
        let search_dir = if Path::new(typed_dir).is_absolute() {
            PathBuf::from(typed_dir)
        } else {
            self.current_dir.join(typed_dir)
        };

        let mut matches = Vec::new();
        if let Ok(entries) = fs::read_dir(&search_dir) {
            for entry in entries.filter_map(Result::ok) {
                let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                    continue;
                };
                if !name.starts_with(prefix) {
                    continue;
                }
                let is_dir = entry.file_type().map(|ty| ty.is_dir()).unwrap_or(false);
                let display = if is_dir { format!("{}/", name) } else { name.clone() };
                matches.push(Pair {
                    replacement: format!("{}{}", typed_dir, display),
                    display,
                });
            }
        }
        matches.sort_by(|a, b| a.display.cmp(&b.display));
        matches
    }
}

/// Start of the open string literal the cursor sits in, if any.
fn open_string_start(line: &str) -> Option<usize> {
    let mut open: Option<(usize, char)> = None;
    for (index, ch) in line.char_indices() {
        match open {
            Some((_, quote)) if ch == quote => open = None,
            None if ch == '"' || ch == '\'' => open = Some((index, ch)),
            _ => {}
        }
    }
    open.map(|(index, _)| index + 1)
}

fn identifier_start(line: &str) -> usize {
    line.char_indices()
        .rev()
        .find(|(_, ch)| !(ch.is_alphanumeric() || *ch == '_'))
        .map(|(index, ch)| index + ch.len_utf8())
        .unwrap_or(0)
}

impl Helper for ShellHelper {}

impl Highlighter for ShellHelper {
    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(&'s self, prompt: &'p str, _default: bool) -> Cow<'b, str> {
        Cow::Owned(self.palette.prompt(prompt))
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        false
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Validator for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line_up_to_cursor = &line[..pos];

        if let Some(start) = open_string_start(line_up_to_cursor) {
            return Ok((start, self.complete_path(&line_up_to_cursor[start..])));
        }

        let start = identifier_start(line_up_to_cursor);
        Ok((start, self.complete_command(&line_up_to_cursor[start..])))
    }
}
