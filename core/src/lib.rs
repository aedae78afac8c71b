//! Command/action/option schemas and the argument parser built on them.
//!
//! An application is a tree of [`Command`]s, each holding named
//! [`Action`]s, each holding typed options ([`Opt`]). Schemas are built once
//! through fallible builders that reject conflicting declarations with a
//! [`SchemaError`]; token lists are then parsed against an action into an
//! [`Args`] bundle, or rejected with an [`InputError`].
//!
//! - [`Type`]: value coercion and constraints: [`StringType`],
//!   [`NumberType`], [`BoolType`] and [`PathType`].
//! - [`Parser`] / [`parse`]: tokenizer, positional offset binding and the
//!   validate / prompt / default resolution pipeline.
//! - [`App`]: dispatches `argv` to a command action, renders help and runs
//!   the interactive shell.
//! - [`Console`]: the line reader and reporter used for prompts and
//!   messages; [`ScriptedConsole`] is an in-memory implementation.
//! - [`SchemaFile`]: declarative YAML/JSON schemas.
//!
//! # Example
//!
//! ```
//! use cmdkit_core::*;
//!
//! let say = Action::new("say")?
//!     .with_option(Opt::new("name")?.flag('n')?.with_default("John Doe"))?
//!     .with_option(Opt::new("age")?.with_type(NumberType::new().integer()).with_default(18))?;
//!
//! let args = parse(&say, &["--age=25", "--", "-literal"])?;
//! assert_eq!(args.get_str("name"), Some("John Doe"));
//! assert_eq!(args.get_number("age"), Some(25.0));
//! assert_eq!(args.anonymous(), ["-literal"]);
//!
//! let err = parse(&say, &["--age=2.5"]).unwrap_err();
//! assert_eq!(err.to_string(), "\"2.5\" is not a valid integer for option \"--age\".");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod action;
mod app;
mod args;
mod argv;
mod command;
mod console;
mod error;
mod help;
mod option;
mod parser;
mod schema_file;
mod types;
mod value;

pub use action::{Action, Handler};
pub use app::App;
pub use args::Args;
pub use argv::split_command_line;
pub use command::Command;
pub use console::{Console, LineReader, Reporter, ScriptedConsole, ask};
pub use error::{DispatchError, ErrorReason, HandlerError, InputError, SchemaError};
pub use help::{action_help, app_help, command_help};
pub use option::{Offsets, Opt, Prompt};
pub use parser::{Parser, parse};
pub use schema_file::{ActionDecl, CommandDecl, OffsetsDecl, OptionDecl, PromptDecl, SchemaFile, TypeDecl};
pub use types::{BoolType, NumberType, PathKind, PathType, StringType, Type};
pub use value::{RawValue, Value};
