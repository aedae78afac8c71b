//! The narrow terminal interface used for prompting and reporting.
//!
//! The core never touches stdin or stdout directly. Prompts are read
//! through a [`LineReader`] and errors surfaced through a [`Reporter`];
//! `cmdkit-terminal` provides the real-terminal implementation and
//! [`ScriptedConsole`] an in-memory one.

use std::collections::VecDeque;
use std::io;

use tracing::{debug, warn};

use crate::error::InputError;
use crate::option::Opt;
use crate::value::{RawValue, Value};

/// Reads one line of user input.
pub trait LineReader {
    /// Shows `prompt` and reads a line, without echo when `masked`.
    ///
    /// Returns `Ok(None)` at end of input.
    fn read_line(&mut self, prompt: &str, masked: bool) -> io::Result<Option<String>>;
}

/// Writes messages for the user.
pub trait Reporter {
    /// Surfaces an error without aborting the current operation.
    fn report(&mut self, message: &str);

    /// Writes a plain line of output.
    fn write_line(&mut self, text: &str);
}

/// A [`LineReader`] that is also a [`Reporter`].
pub trait Console: LineReader + Reporter {}

impl<T: LineReader + Reporter + ?Sized> Console for T {}

/// Asks for `option` until the answer validates.
///
/// Empty answers resolve to the default when there is one and repeat the
/// question otherwise. Rejected answers are reported and asked again. End
/// of input resolves to the default, or fails with
/// [`InputError::MissingOption`].
pub fn ask(console: &mut dyn Console, action: &str, option: &Opt) -> Result<Value, InputError> {
    let masked = option.get_prompt().is_some_and(|p| p.masked);
    let default = option.default_value();
    let question = question(option, masked);
    let presented = option.display_name();

    loop {
        let Some(line) = console.read_line(&question, masked)? else {
            debug!(option = option.name(), "End of input while prompting");
            return default.cloned().ok_or_else(|| InputError::MissingOption {
                action: action.to_string(),
                option: presented.clone(),
            });
        };
        let answer = line.trim_end_matches(['\r', '\n']);
        if answer.trim().is_empty() {
            match default {
                Some(value) => return Ok(value.clone()),
                None => continue,
            }
        }
        match option
            .value_type()
            .validate(&presented, &RawValue::Text(answer.to_string()))
        {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!(option = option.name(), error = %e, "Rejected prompt answer");
                console.report(&e.to_string());
            }
        }
    }
}

/// Prompt text annotated with the default.
fn question(option: &Opt, masked: bool) -> String {
    let text = option.prompt_text();
    match (option.default_value(), option.value_type().is_bool()) {
        (Some(Value::Bool(true)), _) => format!("{text} [Y/n]: "),
        (Some(Value::Bool(false)), _) => format!("{text} [y/N]: "),
        (None, true) => format!("{text} [y/n]: "),
        (Some(value), _) if !masked => format!("{text} ({value}): "),
        _ => format!("{text}: "),
    }
}

/// In-memory [`Console`] fed from a list of answers.
///
/// Records every prompt, reported error and output line, which makes it
/// the console of choice in tests and in non-interactive embedding.
///
/// # Examples
///
/// ```
/// use cmdkit_core::{LineReader, Reporter, ScriptedConsole};
///
/// let mut console = ScriptedConsole::new(["Harry"]);
/// assert_eq!(console.read_line("name: ", false)?, Some("Harry".to_string()));
/// assert_eq!(console.read_line("name: ", false)?, None);
/// console.report("oops");
/// assert_eq!(console.prompts(), ["name: ", "name: "]);
/// assert_eq!(console.errors(), ["oops"]);
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    prompts: Vec<String>,
    masked: Vec<bool>,
    errors: Vec<String>,
    output: Vec<String>,
}

impl ScriptedConsole {
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Prompts shown so far.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Whether each prompt was masked.
    pub fn masked(&self) -> &[bool] {
        &self.masked
    }

    /// Errors reported so far.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Lines written so far.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Unconsumed answers.
    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }
}

impl LineReader for ScriptedConsole {
    fn read_line(&mut self, prompt: &str, masked: bool) -> io::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        self.masked.push(masked);
        Ok(self.inputs.pop_front())
    }
}

impl Reporter for ScriptedConsole {
    fn report(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn write_line(&mut self, text: &str) {
        self.output.push(text.to_string());
    }
}
