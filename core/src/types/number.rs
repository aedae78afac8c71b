use super::{Messages, validate_items};
use crate::error::{ErrorReason, InputError, SchemaError};
use crate::value::{RawValue, Value};

/// Numeric values with optional inclusive bounds and an integer constraint.
///
/// Raw text is trimmed and parsed as `f64`; non-finite results (`inf`,
/// `NaN`) are rejected. The integer constraint requires a zero fractional
/// part of the parsed value.
#[derive(Debug, Clone, Default)]
pub struct NumberType {
    min: Option<f64>,
    max: Option<f64>,
    integer: bool,
    default: Option<Value>,
    messages: Messages,
}

impl NumberType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min(mut self, value: f64) -> Result<Self, SchemaError> {
        if !value.is_finite() {
            return Err(SchemaError::InvalidNumber(value));
        }
        if let Some(max) = self.max.filter(|&max| value > max) {
            return Err(SchemaError::InvalidBounds {
                min: Value::Number(value).to_string(),
                max: Value::Number(max).to_string(),
            });
        }
        self.min = Some(value);
        Ok(self)
    }

    pub fn max(mut self, value: f64) -> Result<Self, SchemaError> {
        if !value.is_finite() {
            return Err(SchemaError::InvalidNumber(value));
        }
        if let Some(min) = self.min.filter(|&min| value < min) {
            return Err(SchemaError::InvalidBounds {
                min: Value::Number(min).to_string(),
                max: Value::Number(value).to_string(),
            });
        }
        self.max = Some(value);
        Ok(self)
    }

    /// Accept whole numbers only.
    pub fn integer(mut self) -> Self {
        self.integer = true;
        self
    }

    pub fn with_default(mut self, value: f64) -> Self {
        self.default = Some(Value::Number(value));
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
                .error(ErrorReason::RequireNumber, &[("option", option.to_string())])),
        }
    }

    fn check(&self, option: &str, text: &str) -> Result<Value, InputError> {
        let params = |bound: Option<(&'static str, f64)>| {
            let mut params = vec![("option", option.to_string()), ("value", text.to_string())];
            if let Some((key, n)) = bound {
                params.push((key, Value::Number(n).to_string()));
            }
            params
        };

        let number = match text.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => n,
            _ => return Err(self.messages.error(ErrorReason::RequireNumber, &params(None))),
        };

        if self.integer && number.fract() != 0.0 {
            return Err(self.messages.error(ErrorReason::RequireInteger, &params(None)));
        }
        if let Some(min) = self.min.filter(|&min| number < min) {
            return Err(self
                .messages
                .error(ErrorReason::NumberBelowMin, &params(Some(("min", min)))));
        }
        if let Some(max) = self.max.filter(|&max| number > max) {
            return Err(self
                .messages
                .error(ErrorReason::NumberAboveMax, &params(Some(("max", max)))));
        }

        Ok(Value::Number(number))
    }
}
