use std::fmt;
use std::sync::Arc;

use regex::Regex;

use super::{Messages, validate_items};
use crate::error::{ErrorReason, InputError, SchemaError};
use crate::value::{RawValue, Value};

type Validator = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// String values with optional length, pattern and callback constraints.
///
/// Length is counted in Unicode scalar values (`char`s), not bytes.
///
/// # Examples
///
/// ```
/// use cmdkit_core::{RawValue, StringType};
///
/// let login = StringType::new().min(3)?.max(16)?.pattern("^[a-z]+$")?;
/// assert!(login.validate("--login", &RawValue::from("alice")).is_ok());
/// assert!(login.validate("--login", &RawValue::from("al")).is_err());
/// assert!(login.validate("--login", &RawValue::from("Alice")).is_err());
/// # Ok::<(), cmdkit_core::SchemaError>(())
/// ```
#[derive(Clone, Default)]
pub struct StringType {
    min: Option<usize>,
    max: Option<usize>,
    pattern: Option<Regex>,
    validator: Option<Validator>,
    default: Option<Value>,
    messages: Messages,
}

impl StringType {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum length (inclusive, at least 1).
    pub fn min(mut self, value: usize) -> Result<Self, SchemaError> {
        if value < 1 {
            return Err(SchemaError::InvalidLimit(value));
        }
        if let Some(max) = self.max.filter(|&max| value > max) {
            return Err(SchemaError::InvalidBounds {
                min: value.to_string(),
                max: max.to_string(),
            });
        }
        self.min = Some(value);
        Ok(self)
    }

    /// Maximum length (inclusive, at least 1).
    pub fn max(mut self, value: usize) -> Result<Self, SchemaError> {
        if value < 1 {
            return Err(SchemaError::InvalidLimit(value));
        }
        if let Some(min) = self.min.filter(|&min| value < min) {
            return Err(SchemaError::InvalidBounds {
                min: min.to_string(),
                max: value.to_string(),
            });
        }
        self.max = Some(value);
        Ok(self)
    }

    /// Regular expression the value must match (unanchored unless the pattern says otherwise).
    pub fn pattern(mut self, pattern: &str) -> Result<Self, SchemaError> {
        let regex = Regex::new(pattern).map_err(|source| SchemaError::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        })?;
        self.pattern = Some(regex);
        Ok(self)
    }

    /// Extra check run last; returning `false` rejects the value.
    pub fn validator(mut self, check: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.validator = Some(Arc::new(check));
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(Value::String(value.into()));
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
            RawValue::Text(text) => self.check(option, text),
            RawValue::List(items) => validate_items(items, |item| self.check(option, item)),
            RawValue::Flag => Err(self
                .messages
                .error(ErrorReason::RequireString, &[("option", option.to_string())])),
        }
    }

    fn check(&self, option: &str, value: &str) -> Result<Value, InputError> {
        let len = value.chars().count();
        let params = |bound: Option<(&'static str, usize)>| {
            let mut params = vec![("option", option.to_string()), ("value", value.to_string())];
            if let Some((key, n)) = bound {
                params.push((key, n.to_string()));
            }
            params
        };

        if let Some(min) = self.min.filter(|&min| len < min) {
            return Err(self
                .messages
                .error(ErrorReason::LengthBelowMin, &params(Some(("min", min)))));
        }
        if let Some(max) = self.max.filter(|&max| len > max) {
            return Err(self
                .messages
                .error(ErrorReason::LengthAboveMax, &params(Some(("max", max)))));
        }
        if self.pattern.as_ref().is_some_and(|regex| !regex.is_match(value)) {
            return Err(self.messages.error(ErrorReason::PatternMismatch, &params(None)));
        }
        if self.validator.as_ref().is_some_and(|check| !check(value)) {
            return Err(self.messages.error(ErrorReason::ValidatorRejected, &params(None)));
        }

        Ok(Value::String(value.to_string()))
    }
}

impl fmt::Debug for StringType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringType")
            .field("min", &self.min)
            .field("max", &self.max)
            .field("pattern", &self.pattern.as_ref().map(Regex::as_str))
            .field("validator", &self.validator.is_some())
            .field("default", &self.default)
            .finish()
    }
}
