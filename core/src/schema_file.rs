//! Declarative schema files.
//!
//! A schema file declares an application's command tree in YAML or JSON,
//! chosen by file extension. [`SchemaFile::build`] runs every declaration
//! through the regular builders, so file-declared schemas are checked
//! exactly like hand-built ones.
//!
//! # Example YAML
//!
//! ```yaml
//! title: demo
//! interactive: true
//! commands:
//!   - name: hello
//!     description: Greetings
//!     actions:
//!       - name: say
//!         options:
//!           - name: name
//!             flag: n
//!             default: John Doe
//!           - name: age
//!             type: { kind: number, integer: true, min: 0 }
//!             default: 18
//!           - name: files
//!             type: { kind: path, entry: file, multiple: true, glob: true }
//!             offsets: { at: 0, unbounded: true }
//! ```

use std::collections::HashMap;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::action::Action;
use crate::app::App;
use crate::command::Command;
use crate::error::{ErrorReason, SchemaError};
use crate::option::Opt;
use crate::types::{BoolType, NumberType, PathKind, PathType, StringType, Type};
use crate::value::Value;

/// Top-level schema file.
///
/// # Examples
///
/// ```
/// use cmdkit_core::SchemaFile;
///
/// let file = SchemaFile::from_yaml_str(r#"
/// title: demo
/// commands:
///   - name: hello
///     actions:
///       - name: say
///         options:
///           - { name: name, default: John Doe }
/// "#)?;
/// let app = file.build()?;
/// assert_eq!(app.commands()[0].actions()[0].options()[0].name(), "name");
/// # Ok::<(), cmdkit_core::SchemaError>(())
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaFile {
    /// Application title, used as program name and shell prompt.
    pub title: String,
    /// Start the shell when run without arguments.
    #[serde(default)]
    pub interactive: bool,
    #[serde(default)]
    pub commands: Vec<CommandDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub actions: Vec<ActionDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub options: Vec<OptionDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<char>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub value_type: TypeDecl,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<PromptDecl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offsets: Option<OffsetsDecl>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptDecl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Read the answer without echo.
    #[serde(default)]
    pub password: bool,
}

/// `{ at }` is a single position, `{ at, to }` a range and
/// `{ at, unbounded: true }` everything from `at` on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OffsetsDecl {
    pub at: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<usize>,
    #[serde(default)]
    pub unbounded: bool,
}

/// Type declaration, tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDecl {
    String {
        #[serde(default)]
        min: Option<usize>,
        #[serde(default)]
        max: Option<usize>,
        #[serde(default)]
        pattern: Option<String>,
        #[serde(default)]
        default: Option<String>,
        #[serde(default)]
        messages: HashMap<ErrorReason, String>,
    },
    Number {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
        #[serde(default)]
        integer: bool,
        #[serde(default)]
        default: Option<f64>,
        #[serde(default)]
        messages: HashMap<ErrorReason, String>,
    },
    Bool {
        #[serde(default)]
        strict: bool,
        #[serde(default)]
        default: Option<bool>,
        #[serde(default)]
        messages: HashMap<ErrorReason, String>,
    },
    Path {
        #[serde(default)]
        min: Option<usize>,
        #[serde(default)]
        max: Option<usize>,
        #[serde(default)]
        multiple: bool,
        #[serde(default)]
        glob: bool,
        /// `file`, `dir` or `any`.
        #[serde(default)]
        entry: PathKind,
        #[serde(default)]
        writable: bool,
        #[serde(default)]
        pattern: Option<String>,
        #[serde(default)]
        default: Option<PathBuf>,
        #[serde(default)]
        messages: HashMap<ErrorReason, String>,
    },
}

impl Default for TypeDecl {
    fn default() -> Self {
        Self::String {
            min: None,
            max: None,
            pattern: None,
            default: None,
            messages: HashMap::new(),
        }
    }
}

impl SchemaFile {
    /// Loads a schema from a `.json`, `.yaml` or `.yml` file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](SchemaError::Io) if the file cannot be read,
    /// [`Json`](SchemaError::Json) / [`Yaml`](SchemaError::Yaml) if parsing
    /// fails, or [`UnsupportedFormat`](SchemaError::UnsupportedFormat) for
    /// other extensions.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let format = Format::of(path)?;
        let reader = BufReader::new(std::fs::File::open(path)?);
        let file = match format {
            Format::Json => serde_json::from_reader(reader)?,
            Format::Yaml => serde_yaml::from_reader(reader)?,
        };
        debug!(path = %path.display(), "Loaded schema file");
        Ok(file)
    }

    /// Saves the schema, in the format given by the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SchemaError> {
        let path = path.as_ref();
        let format = Format::of(path)?;
        let writer = BufWriter::new(std::fs::File::create(path)?);
        match format {
            Format::Json => serde_json::to_writer_pretty(writer, self)?,
            Format::Yaml => serde_yaml::to_writer(writer, self)?,
        }
        Ok(())
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, SchemaError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Builds the application, without handlers.
    pub fn build(&self) -> Result<App, SchemaError> {
        let mut app = App::new(&self.title).interactive(self.interactive);
        for decl in &self.commands {
            app.add_command(decl.build()?)?;
        }
        Ok(app)
    }
}

impl CommandDecl {
    pub fn build(&self) -> Result<Command, SchemaError> {
        let mut command = Command::new(&self.name)?;
        if let Some(text) = &self.description {
            command = command.description(text.as_str());
        }
        for decl in &self.actions {
            command.add_action(decl.build()?)?;
        }
        Ok(command)
    }
}

impl ActionDecl {
    pub fn build(&self) -> Result<Action, SchemaError> {
        let mut action = Action::new(&self.name)?;
        if let Some(text) = &self.description {
            action = action.description(text.as_str());
        }
        for decl in &self.options {
            action.add_option(decl.build()?)?;
        }
        Ok(action)
    }
}

impl OptionDecl {
    pub fn build(&self) -> Result<Opt, SchemaError> {
        let mut opt = Opt::new(&self.name)?.with_type(self.value_type.build()?);
        if let Some(flag) = self.flag {
            opt = opt.flag(flag)?;
        }
        for alias in &self.aliases {
            opt = opt.alias(alias)?;
        }
        if let Some(text) = &self.description {
            opt = opt.description(text.as_str());
        }
        if self.required {
            opt = opt.required();
        }
        if let Some(value) = &self.default {
            opt = opt.with_default(self.coerce_default(value)?);
        }
        if let Some(prompt) = &self.prompt {
            opt = match &prompt.message {
                Some(message) => opt.prompt_with(message)?,
                None => opt.prompt(),
            };
            if prompt.password {
                opt = opt.password();
            }
        }
        if let Some(offsets) = &self.offsets {
            opt = match (offsets.to, offsets.unbounded) {
                (_, true) => opt.offsets_from(offsets.at),
                (Some(to), false) => opt.offsets(offsets.at, to)?,
                (None, false) => opt.offset(offsets.at),
            };
        }
        Ok(opt)
    }

    /// Checks the declared default against the type; strings become paths
    /// for path options. Lists are checked item by item.
    fn coerce_default(&self, value: &Value) -> Result<Value, SchemaError> {
        if let Value::List(items) = value {
            return items
                .iter()
                .map(|item| self.coerce_item(item, value))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List);
        }
        self.coerce_item(value, value)
    }

    /// Coerces one default item; `declared` is what the error reports.
    fn coerce_item(&self, value: &Value, declared: &Value) -> Result<Value, SchemaError> {
        let kind = self.value_type.name();
        match (&self.value_type, value) {
            (TypeDecl::String { .. }, Value::String(_))
            | (TypeDecl::Number { .. }, Value::Number(_))
            | (TypeDecl::Bool { .. }, Value::Bool(_))
            | (TypeDecl::Path { .. }, Value::Path(_)) => Ok(value.clone()),
            (TypeDecl::Path { .. }, Value::String(s)) => Ok(Value::Path(PathBuf::from(s))),
            _ => Err(SchemaError::InvalidDefault {
                option: self.name.clone(),
                value: declared.to_string(),
                kind,
            }),
        }
    }
}

impl TypeDecl {
    pub fn name(&self) -> &'static str {
        match self {
            Self::String { .. } => "string",
            Self::Number { .. } => "number",
            Self::Bool { .. } => "bool",
            Self::Path { .. } => "path",
        }
    }

    pub fn build(&self) -> Result<Type, SchemaError> {
        let built: Type = match self {
            Self::String {
                min,
                max,
                pattern,
                default,
                messages,
            } => {
                let mut t = StringType::new();
                if let Some(min) = *min {
                    t = t.min(min)?;
                }
                if let Some(max) = *max {
                    t = t.max(max)?;
                }
                if let Some(pattern) = pattern {
                    t = t.pattern(pattern)?;
                }
                if let Some(default) = default {
                    t = t.with_default(default.as_str());
                }
                for (reason, text) in messages {
                    t = t.message(*reason, text.as_str());
                }
                t.into()
            }
            Self::Number {
                min,
                max,
                integer,
                default,
                messages,
            } => {
                let mut t = NumberType::new();
                if let Some(min) = *min {
                    t = t.min(min)?;
                }
                if let Some(max) = *max {
                    t = t.max(max)?;
                }
                if *integer {
                    t = t.integer();
                }
                if let Some(default) = *default {
                    t = t.with_default(default);
                }
                for (reason, text) in messages {
                    t = t.message(*reason, text.as_str());
                }
                t.into()
            }
            Self::Bool {
                strict,
                default,
                messages,
            } => {
                let mut t = BoolType::new();
                if *strict {
                    t = t.strict();
                }
                if let Some(default) = *default {
                    t = t.with_default(default);
                }
                for (reason, text) in messages {
                    t = t.message(*reason, text.as_str());
                }
                t.into()
            }
            Self::Path {
                min,
                max,
                multiple,
                glob,
                entry,
                writable,
                pattern,
                default,
                messages,
            } => {
                let mut t = PathType::new().kind(*entry);
                if let Some(min) = *min {
                    t = t.min(min)?;
                }
                if let Some(max) = *max {
                    t = t.max(max)?;
                }
                if *multiple {
                    t = t.multiple();
                }
                if *glob {
                    t = t.glob();
                }
                if *writable {
                    t = t.writable();
                }
                if let Some(pattern) = pattern {
                    t = t.pattern(pattern)?;
                }
                if let Some(default) = default {
                    t = t.with_default(default.clone());
                }
                for (reason, text) in messages {
                    t = t.message(*reason, text.as_str());
                }
                t.into()
            }
        };
        Ok(built)
    }
}

enum Format {
    Json,
    Yaml,
}

impl Format {
    fn of(path: &Path) -> Result<Self, SchemaError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(SchemaError::UnsupportedFormat(path.display().to_string())),
        }
    }
}
