//! Options: named, typed inputs of an action.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::types::{BoolType, NumberType, PathType, StringType, Type};
use crate::value::Value;

/// Positions in the anonymous argument list an option claims when it is
/// not passed explicitly.
///
/// `to == None` means the range is unbounded.
///
/// # Examples
///
/// ```
/// use cmdkit_core::Offsets;
///
/// let first_two = Offsets::range(0, 1)?;
/// let rest = Offsets::unbounded(2);
/// assert!(!first_two.overlaps(&rest));
/// assert!(Offsets::single(1).overlaps(&first_two));
/// assert_eq!(rest.to_string(), "[2, inf]");
/// # Ok::<(), cmdkit_core::SchemaError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offsets {
    pub at: usize,
    pub to: Option<usize>,
}

impl Offsets {
    pub fn single(at: usize) -> Self {
        Self { at, to: Some(at) }
    }

    /// Inclusive range `[at, to]`.
    pub fn range(at: usize, to: usize) -> Result<Self, SchemaError> {
        if to < at {
            return Err(SchemaError::InvalidOffsets { at, to });
        }
        Ok(Self { at, to: Some(to) })
    }

    /// Unbounded range starting at `at`.
    pub fn unbounded(at: usize) -> Self {
        Self { at, to: None }
    }

    pub fn is_single(&self) -> bool {
        self.to == Some(self.at)
    }

    /// Last claimed position, `usize::MAX` when unbounded.
    pub fn end(&self) -> usize {
        self.to.unwrap_or(usize::MAX)
    }

    /// `[a, b]` and `[c, d]` conflict unless `a > d` or `b < c`.
    pub fn overlaps(&self, other: &Offsets) -> bool {
        !(self.at > other.end() || self.end() < other.at)
    }
}

impl fmt::Display for Offsets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to {
            Some(to) => write!(f, "[{}, {}]", self.at, to),
            None => write!(f, "[{}, inf]", self.at),
        }
    }
}

/// Interactive prompt policy for a missing required option.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prompt {
    pub message: Option<String>,
    /// Read the answer without echo.
    pub masked: bool,
}

/// A named, typed option of an [`Action`](crate::Action).
///
/// The option name doubles as its first long alias (`--name`); a
/// one-character name becomes the short flag (`-n`) instead. Further
/// aliases and a flag can be added with [`alias`](Opt::alias) and
/// [`flag`](Opt::flag).
///
/// Options are configured by value and then moved into their action with
/// [`Action::with_option`](crate::Action::with_option), which checks them
/// against the options already registered. Only shared references are
/// handed out afterwards, so a registered option can no longer change.
///
/// # Examples
///
/// ```
/// use cmdkit_core::{NumberType, Opt};
///
/// let age = Opt::new("age")?
///     .flag('a')?
///     .with_type(NumberType::new().integer().min(0.0)?)
///     .with_default(18)
///     .description("Age in years");
///
/// assert_eq!(age.display_name(), "--age");
/// assert_eq!(age.flag_char(), Some('a'));
/// assert_eq!(age.default_value().map(ToString::to_string).as_deref(), Some("18"));
/// # Ok::<(), cmdkit_core::SchemaError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Opt {
    name: String,
    flag: Option<char>,
    aliases: Vec<String>,
    description: Option<String>,
    value_type: Type,
    required: bool,
    default: Option<Value>,
    prompt: Option<Prompt>,
    offsets: Option<Offsets>,
}

impl Opt {
    /// Creates a string option named `name` (`[A-Za-z0-9][A-Za-z0-9_-]*`).
    pub fn new(name: &str) -> Result<Self, SchemaError> {
        if !is_identifier(name, 1) {
            return Err(SchemaError::InvalidOptionName(name.to_string()));
        }
        let mut chars = name.chars();
        let (flag, aliases) = match (chars.next(), chars.next()) {
            (Some(c), None) => (Some(c), Vec::new()),
            _ => (None, vec![name.to_string()]),
        };
        Ok(Self {
            name: name.to_string(),
            flag,
            aliases,
            description: None,
            value_type: Type::default(),
            required: false,
            default: None,
            prompt: None,
            offsets: None,
        })
    }

    /// Sets the short flag, replacing any previous one.
    ///
    /// An option has at most one flag, so on a one-character name this
    /// replaces the implicit `-name` flag; such an option then only answers
    /// to the new flag and to a bare `--name`.
    pub fn flag(mut self, flag: char) -> Result<Self, SchemaError> {
        if !flag.is_ascii_alphanumeric() {
            return Err(SchemaError::InvalidFlag(flag));
        }
        self.flag = Some(flag);
        Ok(self)
    }

    /// Adds a long alias (`[A-Za-z0-9][A-Za-z0-9_-]+`).
    pub fn alias(mut self, alias: &str) -> Result<Self, SchemaError> {
        if !is_identifier(alias, 2) {
            return Err(SchemaError::InvalidAlias(alias.to_string()));
        }
        if !self.aliases.iter().any(|a| a == alias) {
            self.aliases.push(alias.to_string());
        }
        Ok(self)
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Option-level default, used instead of the type's default.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Asks for the value interactively when it is required but missing.
    pub fn prompt(mut self) -> Self {
        self.prompt.get_or_insert_with(Prompt::default);
        self
    }

    /// Like [`prompt`](Opt::prompt) with a custom question.
    pub fn prompt_with(mut self, message: &str) -> Result<Self, SchemaError> {
        if message.trim().is_empty() {
            return Err(SchemaError::InvalidPrompt(self.name));
        }
        self.prompt.get_or_insert_with(Prompt::default).message = Some(message.to_string());
        Ok(self)
    }

    /// Prompts without echoing the answer.
    pub fn password(mut self) -> Self {
        self.prompt.get_or_insert_with(Prompt::default).masked = true;
        self
    }

    /// Binds the anonymous argument at position `at`.
    pub fn offset(mut self, at: usize) -> Self {
        self.offsets = Some(Offsets::single(at));
        self
    }

    /// Binds anonymous arguments `at..=to` as a list.
    pub fn offsets(mut self, at: usize, to: usize) -> Result<Self, SchemaError> {
        self.offsets = Some(Offsets::range(at, to)?);
        Ok(self)
    }

    /// Binds every anonymous argument from position `at` on as a list.
    pub fn offsets_from(mut self, at: usize) -> Self {
        self.offsets = Some(Offsets::unbounded(at));
        self
    }

    pub fn string(self) -> Self {
        self.with_type(StringType::new())
    }

    pub fn number(self) -> Self {
        self.with_type(NumberType::new())
    }

    pub fn boolean(self) -> Self {
        self.with_type(BoolType::new())
    }

    pub fn path(self) -> Self {
        self.with_type(PathType::new())
    }

    pub fn with_type(mut self, value_type: impl Into<Type>) -> Self {
        self.value_type = value_type.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flag_char(&self) -> Option<char> {
        self.flag
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn get_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn value_type(&self) -> &Type {
        &self.value_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn get_prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn get_offsets(&self) -> Option<Offsets> {
        self.offsets
    }

    /// Option default if set, else the type default.
    pub fn default_value(&self) -> Option<&Value> {
        self.default
            .as_ref()
            .or_else(|| self.value_type.default_value())
    }

    /// How the option is shown to users: `--alias`, else `-f`.
    pub fn display_name(&self) -> String {
        match (self.aliases.first(), self.flag) {
            (Some(alias), _) => format!("--{alias}"),
            (None, Some(flag)) => format!("-{flag}"),
            (None, None) => self.name.clone(),
        }
    }

    /// The question asked when prompting.
    pub fn prompt_text(&self) -> String {
        self.prompt
            .as_ref()
            .and_then(|p| p.message.clone())
            .unwrap_or_else(|| format!("Please provide {}", self.display_name()))
    }
}

/// `[A-Za-z0-9][A-Za-z0-9_-]*` with at least `min_len` characters.
pub(crate) fn is_identifier(s: &str, min_len: usize) -> bool {
    is_name(s, min_len, &['_', '-'])
}

/// First character alphanumeric, the rest alphanumeric or one of `extra`.
pub(crate) fn is_name(s: &str, min_len: usize, extra: &[char]) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_alphanumeric()
        && s.chars().count() >= min_len
        && chars.all(|c| c.is_ascii_alphanumeric() || extra.contains(&c))
}
