use super::{Messages, validate_items};
use crate::error::{ErrorReason, InputError};
use crate::value::{RawValue, Value};

const STRICT: &[(&str, bool)] = &[("true", true), ("false", false), ("1", true), ("0", false)];
const EXTENDED: &[(&str, bool)] = &[("yes", true), ("no", false), ("y", true), ("n", false)];

/// Boolean values.
///
/// The default, extended mode accepts `true/false/1/0/yes/no/y/n`; strict
/// mode only `true/false/1/0`. Matching is case-insensitive and a bare flag
/// (`--force`, `-f`) is `true`.
///
/// # Examples
///
/// ```
/// use cmdkit_core::{BoolType, RawValue, Value};
///
/// let t = BoolType::new();
/// assert_eq!(t.validate("-y", &RawValue::from("Y")).unwrap(), Value::Bool(true));
/// assert_eq!(t.validate("-y", &RawValue::Flag).unwrap(), Value::Bool(true));
/// assert!(BoolType::new().strict().validate("-y", &RawValue::from("yes")).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct BoolType {
    strict: bool,
    default: Option<Value>,
    messages: Messages,
}

impl BoolType {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict accepted text to `true/false/1/0`.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Accept `yes/no/y/n` as well (the default).
    pub fn extended(mut self) -> Self {
        self.strict = false;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn with_default(mut self, value: bool) -> Self {
        self.default = Some(Value::Bool(value));
        self
    }

    /// Overrides the message template used for `reason`.
    pub fn message(mut self, reason: ErrorReason, message: impl Into<String>) -> Self {
        self.messages.set(reason, message);
        self
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn validate(&self, option: &str, raw: &RawValue) -> Result<Value, InputError> {
        match raw {
            RawValue::Flag => Ok(Value::Bool(true)),
            RawValue::Text(text) => self.check(option, text),
            RawValue::List(items) => validate_items(items, |item| self.check(option, item)),
        }
    }

    fn check(&self, option: &str, text: &str) -> Result<Value, InputError> {
        let lowered = text.trim().to_ascii_lowercase();
        let extended: &[(&str, bool)] = if self.strict { &[] } else { EXTENDED };

        STRICT
            .iter()
            .chain(extended)
            .find(|(word, _)| *word == lowered)
            .map(|&(_, value)| Value::Bool(value))
            .ok_or_else(|| {
                self.messages.error(
                    ErrorReason::RequireBool,
                    &[("option", option.to_string()), ("value", text.to_string())],
                )
            })
    }
}
