//! Commands: named groups of actions.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::action::{Action, Handler};
use crate::args::Args;
use crate::error::{HandlerError, InputError, SchemaError};
use crate::option::is_identifier;

/// A named group of [`Action`]s, e.g. `db` with `migrate` and `seed`.
///
/// Actions without their own handler fall back to the command handler.
///
/// # Examples
///
/// ```
/// use cmdkit_core::{Action, Command};
///
/// let db = Command::new("db")?
///     .description("Database tasks")
///     .with_action(Action::new("migrate")?)?
///     .with_action(Action::new("seed")?)?
///     .handler(|action, _args| {
///         println!("running {}", action.name());
///         Ok(())
///     });
///
/// assert!(db.find_action("seed").is_some());
/// assert!(db.get_action("drop").is_err());
/// # Ok::<(), cmdkit_core::SchemaError>(())
/// ```
#[derive(Clone)]
pub struct Command {
    name: String,
    description: Option<String>,
    actions: Vec<Action>,
    index: HashMap<String, usize>,
    handler: Option<Handler>,
}

impl Command {
    /// Creates a command named `name` (`[A-Za-z0-9][A-Za-z0-9_-]+`).
    pub fn new(name: &str) -> Result<Self, SchemaError> {
        if !is_identifier(name, 2) {
            return Err(SchemaError::InvalidCommandName(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            description: None,
            actions: Vec::new(),
            index: HashMap::new(),
            handler: None,
        })
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn with_action(mut self, action: Action) -> Result<Self, SchemaError> {
        self.add_action(action)?;
        Ok(self)
    }

    pub fn add_action(&mut self, action: Action) -> Result<(), SchemaError> {
        if self.index.contains_key(action.name()) {
            return Err(SchemaError::DuplicateAction {
                command: self.name.clone(),
                action: action.name().to_string(),
            });
        }
        self.index.insert(action.name().to_string(), self.actions.len());
        self.actions.push(action);
        Ok(())
    }

    /// Sets the fallback handler for actions without one.
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

    /// Actions in registration order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn find_action(&self, name: &str) -> Option<&Action> {
        self.index.get(name).map(|&i| &self.actions[i])
    }

    pub fn get_action(&self, name: &str) -> Result<&Action, InputError> {
        self.find_action(name)
            .ok_or_else(|| InputError::UnrecognizedAction {
                command: self.name.clone(),
                action: name.to_string(),
            })
    }

    pub fn get_handler(&self) -> Option<&Handler> {
        self.handler.as_ref()
    }

    /// The action's own handler, else the command handler.
    pub fn handler_for<'a>(&'a self, action: &'a Action) -> Option<&'a Handler> {
        action.get_handler().or(self.handler.as_ref())
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("actions", &self.actions)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}
