use std::io::{self, BufRead, IsTerminal, Write};

use cmdkit_core::{LineReader, Reporter};
use colored::Colorize;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

/// Console backed by the process terminal.
///
/// Plain reads go through a rustyline editor with history; masked reads
/// switch the terminal to raw mode and echo nothing. When stdin is not a
/// terminal, masked reads fall back to reading a plain line.
pub struct TerminalConsole {
    editor: DefaultEditor,
}

impl TerminalConsole {
    pub fn new() -> io::Result<Self> {
        let editor = DefaultEditor::new().map_err(into_io)?;
        Ok(Self { editor })
    }
}

impl LineReader for TerminalConsole {
    fn read_line(&mut self, prompt: &str, masked: bool) -> io::Result<Option<String>> {
        if masked {
            return read_masked(prompt);
        }
        match self.editor.readline(prompt) {
            Ok(line) => {
                remember(&mut self.editor, &line);
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
            Err(e) => Err(into_io(e)),
        }
    }
}

impl Reporter for TerminalConsole {
    fn report(&mut self, message: &str) {
        eprintln!("{}", format_error(message));
    }

    fn write_line(&mut self, text: &str) {
        println!("{text}");
    }
}

/// `✖ message`, in red.
pub fn format_error(message: &str) -> String {
    format!("{} {}", "✖".red().bold(), message.red())
}

/// Adds non-blank lines to the editor history.
fn remember(editor: &mut DefaultEditor, line: &str) {
    if line.trim().is_empty() {
        return;
    }
    if let Err(e) = editor.add_history_entry(line) {
        debug!(error = %e, "Failed to record history entry");
    }
}

fn into_io(e: ReadlineError) -> io::Error {
    match e {
        ReadlineError::Io(e) => e,
        other => io::Error::other(other.to_string()),
    }
}

fn read_masked(prompt: &str) -> io::Result<Option<String>> {
    let mut stdout = io::stdout();
    write!(stdout, "{prompt}")?;
    stdout.flush()?;

    if !io::stdin().is_terminal() {
        debug!("stdin is not a terminal, reading masked input as plain line");
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        return Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()));
    }

    terminal::enable_raw_mode()?;
    let result = read_hidden();
    terminal::disable_raw_mode()?;
    writeln!(stdout)?;
    result
}

/// Collects key presses until Enter; Ctrl-C, Ctrl-D and Esc abort.
fn read_hidden() -> io::Result<Option<String>> {
    let mut line = String::new();
    loop {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) = event::read()?
        else {
            continue;
        };
        if kind == KeyEventKind::Release {
            continue;
        }
        match code {
            KeyCode::Enter => return Ok(Some(line)),
            KeyCode::Esc => return Ok(None),
            KeyCode::Char('c' | 'd') if modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(None);
            }
            KeyCode::Backspace => {
                line.pop();
            }
            KeyCode::Char(c) => line.push(c),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_plain() {
        colored::control::set_override(false);
        assert_eq!(format_error("unknown command: hey"), "✖ unknown command: hey");
    }

    #[test]
    fn test_remember_skips_blank_lines() {
        use rustyline::history::History;

        let mut editor = DefaultEditor::new().unwrap();
        remember(&mut editor, "   ");
        assert_eq!(editor.history().len(), 0);
        remember(&mut editor, "hello say");
        assert_eq!(editor.history().len(), 1);
    }

    #[test]
    fn test_readline_errors_map_to_io() {
        let err = into_io(ReadlineError::Io(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "pipe",
        )));
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
