//! Error types for schema construction, argument parsing and dispatch.
//!
//! Two categories are kept apart:
//!
//! - [`SchemaError`] is raised while commands, actions, options and types are
//!   being declared. It signals a mistake by the author of the command-line
//!   application and should abort startup.
//! - [`InputError`] is raised while a token list is parsed and validated. It
//!   is triggered by whoever typed the arguments and is recoverable: the
//!   dispatcher reports it and carries on (interactive mode) or exits.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::option::Offsets;

/// Error raised by a handler after a successful parse.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Configuration errors raised while a schema is being built.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Command name does not match `[A-Za-z0-9][A-Za-z0-9_-]+`.
    #[error("\"{0}\" is not a valid command name")]
    InvalidCommandName(String),
    /// Action name does not match `[A-Za-z0-9][A-Za-z0-9_:-]+`.
    #[error("\"{0}\" is not a valid action name")]
    InvalidActionName(String),
    /// Option name does not match `[A-Za-z0-9][A-Za-z0-9_-]*`.
    #[error("\"{0}\" is not a valid option name")]
    InvalidOptionName(String),
    /// Flag is not a single ASCII alphanumeric character.
    #[error("'{0}' is not a valid flag")]
    InvalidFlag(char),
    /// Alias does not match `[A-Za-z0-9][A-Za-z0-9_-]+`.
    #[error("\"{0}\" is not a valid alias")]
    InvalidAlias(String),
    /// Two commands in the same application share a name.
    #[error("command \"{0}\" is already defined")]
    DuplicateCommand(String),
    /// Two actions in the same command share a name.
    #[error("action \"{action}\" is already defined in command \"{command}\"")]
    DuplicateAction { command: String, action: String },
    /// Two options in the same action share a name.
    #[error("option \"{option}\" is already defined in action \"{action}\"")]
    DuplicateOption { action: String, option: String },
    /// A flag is already claimed by another option of the action.
    #[error("flag \"-{flag}\" is already defined for option \"{owner}\" in action \"{action}\"")]
    DuplicateFlag {
        action: String,
        flag: char,
        owner: String,
    },
    /// An alias is already claimed by another option of the action.
    #[error("alias \"--{alias}\" is already defined for option \"{owner}\" in action \"{action}\"")]
    DuplicateAlias {
        action: String,
        alias: String,
        owner: String,
    },
    /// Offset range intersects the range locked by another option.
    #[error(
        "offsets {offsets} of option \"{option}\" overlap offsets {locked} of option \"{owner}\" in action \"{action}\""
    )]
    OverlappingOffsets {
        action: String,
        option: String,
        offsets: Offsets,
        owner: String,
        locked: Offsets,
    },
    /// Offset range end lies before its start.
    #[error("from={at} to={to} is not a valid offset range")]
    InvalidOffsets { at: usize, to: usize },
    /// A length or count limit is below one.
    #[error("\"{0}\" is not a valid limit (must be >= 1)")]
    InvalidLimit(usize),
    /// A numeric bound is not finite.
    #[error("\"{0}\" is not a valid number")]
    InvalidNumber(f64),
    /// Minimum is greater than maximum.
    #[error("min={min} and max={max} is not a valid condition")]
    InvalidBounds { min: String, max: String },
    /// Regular expression failed to compile.
    #[error("invalid regular expression \"{pattern}\": {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    /// Declared default does not match the option's type.
    #[error("default value {value} does not fit option \"{option}\" of type {kind}")]
    InvalidDefault {
        option: String,
        value: String,
        kind: &'static str,
    },
    /// Prompt message is blank.
    #[error("the prompt message for option \"{0}\" cannot be empty")]
    InvalidPrompt(String),
    /// Schema file I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Schema file JSON failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Schema file YAML failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Schema file extension is neither JSON nor YAML.
    #[error("unsupported schema file format: {0}")]
    UnsupportedFormat(String),
}

/// Why a value was rejected by its type.
///
/// Used as the key of per-type custom error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorReason {
    RequireString,
    LengthBelowMin,
    LengthAboveMax,
    PatternMismatch,
    ValidatorRejected,
    RequireNumber,
    RequireInteger,
    NumberBelowMin,
    NumberAboveMax,
    RequireBool,
    InvalidPath,
    RequireFile,
    RequireDir,
    RequireWritable,
    PathCountBelowMin,
    PathCountAboveMax,
}

impl ErrorReason {
    /// Built-in message template.
    ///
    /// Templates may use the `{option}`, `{value}`, `{min}`, `{max}` and
    /// `{count}` placeholders.
    pub fn default_template(self) -> &'static str {
        match self {
            Self::RequireString => "option \"{option}\" requires a string as value.",
            Self::LengthBelowMin => "\"{value}\" is shorter than min={min} for option \"{option}\".",
            Self::LengthAboveMax => "\"{value}\" is longer than max={max} for option \"{option}\".",
            Self::PatternMismatch => {
                "\"{value}\" fails on regular expression for option \"{option}\"."
            }
            Self::ValidatorRejected => "\"{value}\" is not a valid value for option \"{option}\".",
            Self::RequireNumber => "option \"{option}\" requires a number as value.",
            Self::RequireInteger => "\"{value}\" is not a valid integer for option \"{option}\".",
            Self::NumberBelowMin => "\"{value}\" fails on min={min} for option \"{option}\".",
            Self::NumberAboveMax => "\"{value}\" fails on max={max} for option \"{option}\".",
            Self::RequireBool => "option \"{option}\" requires a boolean.",
            Self::InvalidPath => "option \"{option}\" requires a valid path.",
            Self::RequireFile => "option \"{option}\" requires a file.",
            Self::RequireDir => "option \"{option}\" requires a directory.",
            Self::RequireWritable => "option \"{option}\" requires a writable path.",
            Self::PathCountBelowMin => {
                "option \"{option}\" requires minimum {min} path(s) (found={count})."
            }
            Self::PathCountAboveMax => {
                "option \"{option}\" requires maximum {max} path(s) (found={count})."
            }
        }
    }
}

/// User-input errors raised while parsing and validating arguments.
#[derive(Debug, Error)]
pub enum InputError {
    /// `argv[1]` names no registered command.
    #[error("unknown command: {0}")]
    UnrecognizedCommand(String),
    /// `argv[2]` names no action of the command.
    #[error("{command}: unknown action \"{action}\"")]
    UnrecognizedAction { command: String, action: String },
    /// A flag or alias resolves to no option of the action.
    #[error("unrecognized option \"{option}\" for action \"{action}\"")]
    UnrecognizedOption { action: String, option: String },
    /// Malformed option token, e.g. `-ab=value`, `--a=value` or `-`.
    #[error("invalid option: \"{0}\"")]
    InvalidOption(String),
    /// Required option has no value, no prompt answer and no default.
    #[error("\"{action}\" requires option: {option}")]
    MissingOption { action: String, option: String },
    /// A value failed its type's coercion or constraints.
    #[error("{message}")]
    InvalidValue {
        reason: ErrorReason,
        message: String,
    },
    /// Neither the action, its command nor the application has a handler.
    #[error("{command}: no handler for action \"{action}\"")]
    NoHandler { command: String, action: String },
    /// Reading an answer from the line reader failed.
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

impl InputError {
    /// Returns the type rejection reason, if this is a value error.
    pub fn reason(&self) -> Option<ErrorReason> {
        match self {
            Self::InvalidValue { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

/// Errors returned by [`App::execute`](crate::App::execute).
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Bad arguments; report and continue.
    #[error(transparent)]
    Input(#[from] InputError),
    /// The handler itself failed.
    #[error("{0}")]
    Handler(HandlerError),
}

impl DispatchError {
    /// Returns `true` for user-input errors.
    pub fn is_input(&self) -> bool {
        matches!(self, Self::Input(_))
    }
}
