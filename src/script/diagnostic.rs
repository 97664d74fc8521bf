use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::highlight::Palette;

/// `origin:line: message` as Lua prefixes its error strings.
static MESSAGE_LOCATION: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)^(?P<origin>[^\n]*?):(?P<line>\d+): (?P<message>.*)$").ok());

/// First Lua frame of a traceback, skipping `[C]` frames.
static TRACEBACK_FRAME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(?P<origin>[^\s\[][^\n]*?):(?P<line>\d+): in ").ok());

const TRACEBACK_MARKER: &str = "stack traceback:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Compile,
    Runtime,
}

/// A compile or runtime failure in a form the shell can print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// Chunk name the error points into, when it could be recovered.
    pub origin: Option<String>,
    /// 1-based.
    pub line: Option<usize>,
    pub source_line: Option<String>,
    /// Character columns `[start, end)` to underline in `source_line`.
    pub span: Option<(usize, usize)>,
    pub stack_trace: Option<String>,
}

impl Diagnostic {
    /// Builds a diagnostic from an engine error raised while compiling or
    /// running `source`, which was loaded under the chunk name `origin`.
    pub fn from_lua_error(
        kind: DiagnosticKind,
        error: &mlua::Error,
        origin: &str,
        source: &str,
    ) -> Self {
        let (raw_message, stack_trace) = flatten(error);

        let mut diagnostic = Diagnostic {
            kind,
            message: raw_message.clone(),
            origin: None,
            line: None,
            source_line: None,
            span: None,
            stack_trace,
        };

        let located = MESSAGE_LOCATION
            .as_ref()
            .and_then(|re| re.captures(&raw_message))
            .and_then(|caps| {
                let line = caps["line"].parse::<usize>().ok()?;
                diagnostic.message = caps["message"].to_string();
                Some((caps["origin"].to_string(), line))
            })
            .or_else(|| {
                let trace = diagnostic.stack_trace.as_deref()?;
                let caps = TRACEBACK_FRAME.as_ref()?.captures(trace)?;
                let line = caps["line"].parse::<usize>().ok()?;
                Some((caps["origin"].to_string(), line))
            });

        if let Some((location_origin, line)) = located {
            if location_origin == origin {
                diagnostic.source_line = source
                    .lines()
                    .nth(line.saturating_sub(1))
                    .map(|text| text.trim_end_matches('\r').to_string());
                diagnostic.span = diagnostic.source_line.as_deref().and_then(non_blank_span);
            }
            diagnostic.origin = Some(location_origin);
            diagnostic.line = Some(line);
        }

        diagnostic
    }

    /// The report printed to the error stream, one entry per line.
    pub fn render(&self, palette: &Palette) -> Vec<String> {
        let mut lines = vec![format!("{} {}", palette.error_tag(), self)];
        if let Some(source_line) = &self.source_line {
            lines.push(source_line.clone());
            if let Some((start, end)) = self.span {
                lines.push(format!("{}{}", " ".repeat(start), "^".repeat(end - start)));
            }
        }
        if let Some(trace) = &self.stack_trace {
            lines.push(trace.clone());
        }
        lines
    }

    pub fn report(&self, palette: &Palette) {
        for line in self.render(palette) {
            eprintln!("{}", line);
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.origin, self.line) {
            (Some(origin), Some(line)) => write!(f, "{}:{} - {}", origin, line, self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

/// Message and traceback, with Rust-side wrapping peeled off.
fn flatten(error: &mlua::Error) -> (String, Option<String>) {
    match error {
        mlua::Error::SyntaxError { message, .. } => (message.clone(), None),
        mlua::Error::RuntimeError(message) => split_traceback(message),
        mlua::Error::CallbackError { traceback, cause } => {
            let (message, _) = flatten(cause);
            (message, Some(traceback.clone()))
        }
        mlua::Error::ExternalError(inner) => (inner.to_string(), None),
        other => split_traceback(&other.to_string()),
    }
}

fn split_traceback(message: &str) -> (String, Option<String>) {
    match message.find(TRACEBACK_MARKER) {
        Some(index) => (
            message[..index].trim_end().to_string(),
            Some(message[index..].to_string()),
        ),
        None => (message.to_string(), None),
    }
}

fn non_blank_span(line: &str) -> Option<(usize, usize)> {
    let start = line.chars().take_while(|c| c.is_whitespace()).count();
    let end = line.trim_end().chars().count();
    (end > start).then_some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_location() {
        let source = "local a = 1\n  local b = = 2\n";
        let error = mlua::Error::SyntaxError {
            message: "script.lua:2: unexpected symbol near '='".to_string(),
            incomplete_input: false,
        };
        let diagnostic =
            Diagnostic::from_lua_error(DiagnosticKind::Compile, &error, "script.lua", source);

        assert_eq!(diagnostic.line, Some(2));
        assert_eq!(diagnostic.message, "unexpected symbol near '='");
        assert_eq!(diagnostic.source_line.as_deref(), Some("  local b = = 2"));
        assert_eq!(diagnostic.span, Some((2, 15)));
        assert_eq!(
            diagnostic.to_string(),
            "script.lua:2 - unexpected symbol near '='"
        );
    }

    #[test]
    fn runtime_traceback_is_split_out() {
        let error = mlua::Error::RuntimeError(
            "main.lua:1: boom\nstack traceback:\n\t[C]: in function 'error'".to_string(),
        );
        let diagnostic =
            Diagnostic::from_lua_error(DiagnosticKind::Runtime, &error, "main.lua", "error('boom')");

        assert_eq!(diagnostic.message, "boom");
        assert_eq!(diagnostic.line, Some(1));
        assert!(diagnostic
            .stack_trace
            .as_deref()
            .is_some_and(|trace| trace.starts_with("stack traceback:")));
    }

    #[test]
    fn callback_location_comes_from_traceback() {
        let cause = mlua::Error::RuntimeError("Bad parameters passed to read".to_string());
        let error = mlua::Error::CallbackError {
            traceback: "stack traceback:\n\t[C]: in function 'read'\n\tmain.lua:3: in main chunk"
                .to_string(),
            cause: std::sync::Arc::new(cause),
        };
        let source = "x = 1\ny = 2\nread()\n";
        let diagnostic =
            Diagnostic::from_lua_error(DiagnosticKind::Runtime, &error, "main.lua", source);

        assert_eq!(diagnostic.message, "Bad parameters passed to read");
        assert_eq!(diagnostic.line, Some(3));
        assert_eq!(diagnostic.source_line.as_deref(), Some("read()"));
    }

    #[test]
    fn other_chunks_get_no_source_line() {
        let error = mlua::Error::RuntimeError("lib.lua:7: oops".to_string());
        let diagnostic =
            Diagnostic::from_lua_error(DiagnosticKind::Runtime, &error, "main.lua", "require()");

        assert_eq!(diagnostic.origin.as_deref(), Some("lib.lua"));
        assert_eq!(diagnostic.line, Some(7));
        assert_eq!(diagnostic.source_line, None);
    }

    #[test]
    fn render_underlines_the_statement() {
        let diagnostic = Diagnostic {
            kind: DiagnosticKind::Compile,
            message: "unexpected symbol".to_string(),
            origin: Some("(shell)".to_string()),
            line: Some(1),
            source_line: Some("  x = = 1".to_string()),
            span: Some((2, 9)),
            stack_trace: None,
        };
        assert_eq!(
            diagnostic.render(&Palette::plain()),
            vec![
                "[Error] (shell):1 - unexpected symbol".to_string(),
                "  x = = 1".to_string(),
                "  ^^^^^^^".to_string(),
            ]
        );
    }
}
