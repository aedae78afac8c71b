//! Actions: named operations owning a set of options.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::args::Args;
use crate::error::{HandlerError, InputError, SchemaError};
use crate::option::{Opt, is_name};

/// Execution handler invoked with the action and its parsed arguments.
pub type Handler = Arc<dyn Fn(&Action, &Args<'_>) -> Result<(), HandlerError> + Send + Sync>;

/// A named operation of a [`Command`](crate::Command).
///
/// Options keep their registration order, which is also the order in which
/// offsets are bound and values are resolved. Lookups by name, long alias
/// and short flag go through tables filled at registration time.
///
/// # Examples
///
/// ```
/// use cmdkit_core::{Action, Opt};
///
/// let say = Action::new("say")?
///     .description("Say hello")
///     .with_option(Opt::new("name")?.flag('n')?.with_default("John Doe"))?
///     .with_option(Opt::new("age")?.number().with_default(18))?;
///
/// assert_eq!(say.options().len(), 2);
/// assert_eq!(say.find_flag('n').map(|o| o.name()), Some("name"));
/// assert!(say.clone().with_option(Opt::new("x")?.flag('n')?).is_err());
/// # Ok::<(), cmdkit_core::SchemaError>(())
/// ```
#[derive(Clone)]
pub struct Action {
    name: String,
    description: Option<String>,
    options: Vec<Opt>,
    by_name: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
    by_flag: HashMap<char, usize>,
    handler: Option<Handler>,
}

impl Action {
    /// Creates an action named `name` (`[A-Za-z0-9][A-Za-z0-9_:-]+`).
    pub fn new(name: &str) -> Result<Self, SchemaError> {
        if !is_name(name, 2, &['_', ':', '-']) {
            return Err(SchemaError::InvalidActionName(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            description: None,
            options: Vec::new(),
            by_name: HashMap::new(),
            by_alias: HashMap::new(),
            by_flag: HashMap::new(),
            handler: None,
        })
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Registers `option`, see [`add_option`](Action::add_option).
    pub fn with_option(mut self, option: Opt) -> Result<Self, SchemaError> {
        self.add_option(option)?;
        Ok(self)
    }

    /// Registers `option` after checking that its name, flag and aliases
    /// are unused and that its offsets overlap no registered offsets.
    pub fn add_option(&mut self, option: Opt) -> Result<(), SchemaError> {
        if self.by_name.contains_key(option.name()) {
            return Err(SchemaError::DuplicateOption {
                action: self.name.clone(),
                option: option.name().to_string(),
            });
        }
        if let Some(flag) = option.flag_char() {
            if let Some(&owner) = self.by_flag.get(&flag) {
                return Err(SchemaError::DuplicateFlag {
                    action: self.name.clone(),
                    flag,
                    owner: self.options[owner].name().to_string(),
                });
            }
        }
        for alias in option.aliases() {
            if let Some(&owner) = self.by_alias.get(alias) {
                return Err(SchemaError::DuplicateAlias {
                    action: self.name.clone(),
                    alias: alias.clone(),
                    owner: self.options[owner].name().to_string(),
                });
            }
        }
        if let Some(offsets) = option.get_offsets() {
            let locked = self.options.iter().find_map(|other| {
                other
                    .get_offsets()
                    .filter(|theirs| theirs.overlaps(&offsets))
                    .map(|theirs| (other.name(), theirs))
            });
            if let Some((owner, locked)) = locked {
                return Err(SchemaError::OverlappingOffsets {
                    action: self.name.clone(),
                    option: option.name().to_string(),
                    offsets,
                    owner: owner.to_string(),
                    locked,
                });
            }
        }

        let index = self.options.len();
        self.by_name.insert(option.name().to_string(), index);
        if let Some(flag) = option.flag_char() {
            self.by_flag.insert(flag, index);
        }
        for alias in option.aliases() {
            self.by_alias.insert(alias.clone(), index);
        }
        debug!(action = %self.name, option = option.name(), "Registered option");
        self.options.push(option);
        Ok(())
    }

    /// Sets the execution handler.
    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Action, &Args<'_>) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Options in registration order.
    pub fn options(&self) -> &[Opt] {
        &self.options
    }

    pub fn get_handler(&self) -> Option<&Handler> {
        self.handler.as_ref()
    }

    pub(crate) fn index_of(&self, key: &str) -> Option<usize> {
        self.by_name
            .get(key)
            .or_else(|| self.by_alias.get(key))
            .copied()
            .or_else(|| {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => self.by_flag.get(&c).copied(),
                    _ => None,
                }
            })
    }

    /// Looks an option up by name, long alias or flag.
    pub fn find_option(&self, key: &str) -> Option<&Opt> {
        self.index_of(key).map(|i| &self.options[i])
    }

    /// Like [`find_option`](Action::find_option), failing with an input error.
    pub fn get_option(&self, key: &str) -> Result<&Opt, InputError> {
        self.find_option(key)
            .ok_or_else(|| InputError::UnrecognizedOption {
                action: self.name.clone(),
                option: key.to_string(),
            })
    }

    pub fn find_flag(&self, flag: char) -> Option<&Opt> {
        self.by_flag.get(&flag).map(|&i| &self.options[i])
    }

    /// Resolves a `--long` form: alias first, then name.
    pub fn find_long(&self, key: &str) -> Option<&Opt> {
        self.by_alias
            .get(key)
            .or_else(|| self.by_name.get(key))
            .map(|&i| &self.options[i])
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("options", &self.options)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action() -> Action {
        Action::new("say")
            .unwrap()
            .with_option(Opt::new("name").unwrap().flag('n').unwrap())
            .unwrap()
            .with_option(Opt::new("files").unwrap().offsets(0, 1).unwrap())
            .unwrap()
    }

    #[test]
    fn test_action_name_pattern() {
        assert!(Action::new("db:migrate").is_ok());
        assert!(Action::new("say-hi").is_ok());
        for bad in ["s", ":a", "a b", ""] {
            assert!(
                matches!(Action::new(bad), Err(SchemaError::InvalidActionName(_))),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_lookup_by_name_alias_and_flag() {
        let a = action()
            .with_option(Opt::new("verbose").unwrap().alias("loud").unwrap())
            .unwrap();
        assert_eq!(a.find_option("name").unwrap().name(), "name");
        assert_eq!(a.find_option("n").unwrap().name(), "name");
        assert_eq!(a.find_option("loud").unwrap().name(), "verbose");
        assert_eq!(a.find_long("loud").unwrap().name(), "verbose");
        assert!(a.find_long("n").is_none());
        assert!(matches!(
            a.get_option("nope"),
            Err(InputError::UnrecognizedOption { .. })
        ));
    }

    #[test]
    fn test_duplicate_name() {
        let err = action().with_option(Opt::new("name").unwrap()).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateOption { .. }));
    }

    #[test]
    fn test_duplicate_flag() {
        let err = action()
            .with_option(Opt::new("number").unwrap().flag('n').unwrap())
            .unwrap_err();
        assert!(
            matches!(err, SchemaError::DuplicateFlag { flag: 'n', ref owner, .. } if owner == "name")
        );
    }

    #[test]
    fn test_duplicate_alias() {
        let err = action()
            .with_option(Opt::new("title").unwrap().alias("name").unwrap())
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateAlias { .. }));
    }

    #[test]
    fn test_flag_and_alias_namespaces_are_separate() {
        let a = Action::new("run")
            .unwrap()
            .with_option(Opt::new("x").unwrap())
            .unwrap()
            .with_option(Opt::new("xx").unwrap().flag('y').unwrap())
            .unwrap();
        assert_eq!(a.find_flag('x').unwrap().name(), "x");
        assert_eq!(a.find_long("xx").unwrap().name(), "xx");
    }

    #[test]
    fn test_overlapping_offsets() {
        let err = action()
            .with_option(Opt::new("target").unwrap().offset(1))
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::OverlappingOffsets { ref owner, .. } if owner == "files"
        ));
        assert!(
            action()
                .with_option(Opt::new("target").unwrap().offset(2))
                .is_ok()
        );
    }

    #[test]
    fn test_failed_registration_leaves_action_untouched() {
        let mut a = action();
        assert!(a.add_option(Opt::new("name").unwrap()).is_err());
        assert_eq!(a.options().len(), 2);
        assert!(a.find_option("files").is_some());
    }
}
