use rustyline::{error::ReadlineError, history::FileHistory, Editor};

use super::Shell;
use crate::{
    error::ShellError,
    input::ShellHelper,
    process::signal,
    script::{self, ExecuteOptions, ScriptError, INTERACTIVE_ORIGIN},
};

const CONTINUATION_PROMPT: &str = ">> ";

/// The read-eval-print loop. Returns `Some(code)` when a script asked the
/// shell to exit, `None` on end of input.
pub(super) fn run(shell: &Shell) -> Result<Option<i32>, ShellError> {
    signal::install_interrupt_handler()?;

    let session = shell.session();
    let mut editor = Editor::<ShellHelper, FileHistory>::new()?;
    editor.set_helper(Some(ShellHelper::new(
        shell.registry().names(),
        session.current_dir(),
        *session.palette(),
    )));

    println!("{}", shell.banner());

    let mut buffer = String::new();
    loop {
        let prompt = if buffer.is_empty() {
            session.prompt()
        } else {
            CONTINUATION_PROMPT.to_string()
        };
        if let Some(helper) = editor.helper_mut() {
            helper.set_current_dir(session.current_dir());
            helper.set_commands(shell.registry().names());
        }

        match editor.readline(&prompt) {
            Ok(line) => {
                if buffer.is_empty() && line.trim().is_empty() {
                    continue;
                }
                buffer.push_str(&line);
                buffer.push('\n');

                if script::needs_more_input(shell.lua(), &buffer) {
                    continue;
                }

                if let Err(e) = editor.add_history_entry(buffer.trim_end()) {
                    log::warn!("couldn't add to history: {}", e);
                }

                let result = shell.execute(&buffer, INTERACTIVE_ORIGIN, ExecuteOptions::INTERACTIVE);
                buffer.clear();
                script::settle();

                match result {
                    Ok(_) | Err(ScriptError::Failed(_)) => {}
                    Err(ScriptError::Exit(code)) => return Ok(Some(code)),
                }
            }
            Err(ReadlineError::Interrupted) => {
                buffer.clear();
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(None)
}
