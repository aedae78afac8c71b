//! Value types: coercion and constraint checking for option values.
//!
//! Every option owns exactly one [`Type`]. A type turns the [`RawValue`] the
//! tokenizer bound into a typed [`Value`], or rejects it with an
//! [`InputError::InvalidValue`] naming the option as the user typed it.
//!
//! Constraints are configured through fallible builders before the owning
//! option is added to its action; misconfiguration (inverted bounds, bad
//! regular expressions) is a [`SchemaError`](crate::SchemaError).
//!
//! # Examples
//!
//! ```
//! use cmdkit_core::{NumberType, RawValue, Type, Value};
//!
//! let age: Type = NumberType::new().min(0.0)?.max(150.0)?.integer().into();
//! assert_eq!(age.validate("--age", &RawValue::from("25"))?, Value::Number(25.0));
//! assert!(age.validate("--age", &RawValue::from("2.5")).is_err());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod boolean;
mod number;
mod path;
mod string;

use std::collections::HashMap;

pub use boolean::BoolType;
pub use number::NumberType;
pub use path::{PathKind, PathType};
pub use string::StringType;

use crate::error::{ErrorReason, InputError};
use crate::value::{RawValue, Value};

/// The type of an option value.
#[derive(Debug, Clone)]
pub enum Type {
    String(StringType),
    Number(NumberType),
    Bool(BoolType),
    Path(PathType),
}

impl Type {
    /// Validates `raw`, presenting the option as `option` in error messages.
    pub fn validate(&self, option: &str, raw: &RawValue) -> Result<Value, InputError> {
        match self {
            Self::String(t) => t.validate(option, raw),
            Self::Number(t) => t.validate(option, raw),
            Self::Bool(t) => t.validate(option, raw),
            Self::Path(t) => t.validate(option, raw),
        }
    }

    /// Type-level default value.
    pub fn default_value(&self) -> Option<&Value> {
        match self {
            Self::String(t) => t.default_value(),
            Self::Number(t) => t.default_value(),
            Self::Bool(t) => t.default_value(),
            Self::Path(t) => t.default_value(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Bool(_) => "bool",
            Self::Path(_) => "path",
        }
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(_))
    }
}

impl Default for Type {
    fn default() -> Self {
        Self::String(StringType::new())
    }
}

impl From<StringType> for Type {
    fn from(value: StringType) -> Self {
        Self::String(value)
    }
}

impl From<NumberType> for Type {
    fn from(value: NumberType) -> Self {
        Self::Number(value)
    }
}

impl From<BoolType> for Type {
    fn from(value: BoolType) -> Self {
        Self::Bool(value)
    }
}

impl From<PathType> for Type {
    fn from(value: PathType) -> Self {
        Self::Path(value)
    }
}

/// Per-type overrides of the built-in error message templates.
#[derive(Debug, Clone, Default)]
pub(crate) struct Messages {
    overrides: HashMap<ErrorReason, String>,
}

impl Messages {
    /// Blank messages are ignored.
    pub(crate) fn set(&mut self, reason: ErrorReason, message: impl Into<String>) {
        let message = message.into();
        if !message.trim().is_empty() {
            self.overrides.insert(reason, message);
        }
    }

    pub(crate) fn error(&self, reason: ErrorReason, params: &[(&str, String)]) -> InputError {
        let template = self
            .overrides
            .get(&reason)
            .map(String::as_str)
            .unwrap_or_else(|| reason.default_template());
        InputError::InvalidValue {
            reason,
            message: render(template, params),
        }
    }
}

fn render(template: &str, params: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (key, value) in params {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

/// Validates every item of a range binding with `check`.
fn validate_items(
    items: &[String],
    mut check: impl FnMut(&str) -> Result<Value, InputError>,
) -> Result<Value, InputError> {
    items
        .iter()
        .map(|item| check(item))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::List)
}
