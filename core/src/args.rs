//! The result of a successful parse.

use std::collections::HashMap;
use std::path::Path;

use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};

use crate::action::Action;
use crate::value::Value;

/// Validated option values plus the leftover anonymous arguments.
///
/// Values are keyed by canonical option name but can be read through any
/// name, long alias or flag of the owning action. Options without a value
/// and without a default are absent.
///
/// # Examples
///
/// ```
/// use cmdkit_core::{Action, Opt, parse};
///
/// let say = Action::new("say")?
///     .with_option(Opt::new("name")?.flag('n')?.with_default("John Doe"))?;
///
/// let args = parse(&say, &["-n=Harry", "extra"])?;
/// assert_eq!(args.get_str("name"), Some("Harry"));
/// assert_eq!(args.get_str("n"), Some("Harry"));
/// assert_eq!(args.anonymous(), ["extra"]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Args<'a> {
    action: &'a Action,
    named: HashMap<String, Value>,
    anonymous: Vec<String>,
}

impl<'a> Args<'a> {
    pub(crate) fn new(
        action: &'a Action,
        named: HashMap<String, Value>,
        anonymous: Vec<String>,
    ) -> Self {
        Self {
            action,
            named,
            anonymous,
        }
    }

    /// The action these arguments were parsed for.
    pub fn action(&self) -> &'a Action {
        self.action
    }

    /// Value of the option known as `key` (name, alias or flag).
    pub fn get(&self, key: &str) -> Option<&Value> {
        let option = self.action.find_option(key)?;
        self.named.get(option.name())
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn get_path(&self, key: &str) -> Option<&Path> {
        self.get(key).and_then(Value::as_path)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// `(name, value)` pairs in option registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.action
            .options()
            .iter()
            .filter_map(|opt| self.named.get(opt.name()).map(|v| (opt.name(), v)))
    }

    pub fn named(&self) -> &HashMap<String, Value> {
        &self.named
    }

    /// Anonymous arguments left after offset binding.
    pub fn anonymous(&self) -> &[String] {
        &self.anonymous
    }

    pub fn anonymous_at(&self, index: usize) -> Option<&str> {
        self.anonymous.get(index).map(String::as_str)
    }
}

impl PartialEq for Args<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.action, other.action)
            && self.named == other.named
            && self.anonymous == other.anonymous
    }
}

struct Named<'r, 'a>(&'r Args<'a>);

impl Serialize for Named<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.named.len()))?;
        for (name, value) in self.0.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for Args<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Args", 3)?;
        state.serialize_field("action", self.action.name())?;
        state.serialize_field("named", &Named(self))?;
        state.serialize_field("anonymous", &self.anonymous)?;
        state.end()
    }
}
