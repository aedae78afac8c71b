//! Tokenizer, offset binding and the value resolution pipeline.
//!
//! # Grammar
//!
//! | Token          | Meaning                                         |
//! |----------------|-------------------------------------------------|
//! | `--`           | every following token is anonymous              |
//! | `--name`       | option `name` set as a bare flag (`true`)       |
//! | `--name=value` | option `name` = `value` (name at least 2 chars) |
//! | `-f`           | flag `f` set as a bare flag                     |
//! | `-f=value`     | flag `f` = `value` (exactly one char before `=`)|
//! | `-fgh`         | flags `f`, `g` and `h`, each bare               |
//! | anything else  | anonymous argument                              |
//!
//! Anonymous arguments are then offered to the options declaring offsets
//! (in registration order) that were not passed explicitly. Finally every
//! option is resolved: validate the bound value, else prompt (required
//! options with a prompt, when a console is attached), else default, else
//! fail if required.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::action::Action;
use crate::args::Args;
use crate::console::{self, Console};
use crate::error::InputError;
use crate::option::Offsets;
use crate::value::RawValue;

/// A raw value together with the form the user typed (`--name`, `-n`).
#[derive(Debug)]
struct Bound {
    presented: String,
    raw: RawValue,
}

/// Tokenizer output, before offsets are bound.
#[derive(Debug, Default)]
struct Scan {
    bound: HashMap<usize, Bound>,
    anonymous: Vec<String>,
}

/// Parses token lists against an [`Action`].
///
/// Without a console, required options configured to prompt fall back to
/// their default.
///
/// # Examples
///
/// ```
/// use cmdkit_core::{Action, Opt, Parser, ScriptedConsole, Value};
///
/// let login = Action::new("login")?
///     .with_option(Opt::new("user")?.offset(0))?
///     .with_option(Opt::new("password")?.required().password())?;
///
/// let mut console = ScriptedConsole::new(["hunter2"]);
/// let args = Parser::with_console(&mut console).parse(&login, &["alice"])?;
/// assert_eq!(args.get_str("user"), Some("alice"));
/// assert_eq!(args.get_str("password"), Some("hunter2"));
/// assert!(args.anonymous().is_empty());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Default)]
pub struct Parser<'c> {
    console: Option<&'c mut dyn Console>,
}

impl<'c> Parser<'c> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prompts for missing required options through `console`.
    pub fn with_console(console: &'c mut dyn Console) -> Self {
        Self {
            console: Some(console),
        }
    }

    /// Parses `tokens` (everything after `command action`) for `action`.
    pub fn parse<'a, S: AsRef<str>>(
        &mut self,
        action: &'a Action,
        tokens: &[S],
    ) -> Result<Args<'a>, InputError> {
        let Scan {
            mut bound,
            anonymous,
        } = scan(action, tokens)?;
        let anonymous = bind_offsets(action, &mut bound, anonymous);

        let mut named = HashMap::new();
        for (index, option) in action.options().iter().enumerate() {
            let value = if let Some(Bound { presented, raw }) = bound.remove(&index) {
                Some(option.value_type().validate(&presented, &raw)?)
            } else if option.is_required() {
                let prompt = option.get_prompt().is_some();
                match self.console.as_deref_mut().filter(|_| prompt) {
                    Some(console) => Some(console::ask(console, action.name(), option)?),
                    None => Some(option.default_value().cloned().ok_or_else(|| {
                        InputError::MissingOption {
                            action: action.name().to_string(),
                            option: option.display_name(),
                        }
                    })?),
                }
            } else {
                option.default_value().cloned()
            };
            if let Some(value) = value {
                trace!(option = option.name(), %value, "Resolved option");
                named.insert(option.name().to_string(), value);
            }
        }

        debug!(
            action = action.name(),
            named = named.len(),
            anonymous = anonymous.len(),
            "Parsed arguments"
        );
        Ok(Args::new(action, named, anonymous))
    }
}

/// Parses `tokens` for `action` without a console.
pub fn parse<'a, S: AsRef<str>>(action: &'a Action, tokens: &[S]) -> Result<Args<'a>, InputError> {
    Parser::new().parse(action, tokens)
}

fn scan<S: AsRef<str>>(action: &Action, tokens: &[S]) -> Result<Scan, InputError> {
    let mut scan = Scan::default();
    let mut latched = false;

    for token in tokens.iter().map(AsRef::as_ref) {
        if latched {
            scan.anonymous.push(token.to_string());
        } else if token == "--" {
            latched = true;
        } else if let Some(long) = token.strip_prefix("--") {
            scan_long(action, &mut scan, token, long)?;
        } else if let Some(short) = token.strip_prefix('-') {
            scan_short(action, &mut scan, token, short)?;
        } else {
            scan.anonymous.push(token.to_string());
        }
    }
    Ok(scan)
}

fn scan_long(action: &Action, scan: &mut Scan, token: &str, long: &str) -> Result<(), InputError> {
    let (key, raw) = match long.split_once('=') {
        Some((key, _)) if key.chars().count() < 2 => {
            return Err(InputError::InvalidOption(format!("--{key}")));
        }
        Some((key, value)) => (key, RawValue::Text(value.to_string())),
        None => (long, RawValue::Flag),
    };
    let index = action
        .find_long(key)
        .and_then(|opt| action.index_of(opt.name()))
        .ok_or_else(|| unrecognized(action, format!("--{key}")))?;
    trace!(token, option = %action.options()[index].name(), "Long option");
    scan.bound.insert(
        index,
        Bound {
            presented: format!("--{key}"),
            raw,
        },
    );
    Ok(())
}

fn scan_short(
    action: &Action,
    scan: &mut Scan,
    token: &str,
    short: &str,
) -> Result<(), InputError> {
    if short.is_empty() {
        return Err(InputError::InvalidOption(token.to_string()));
    }
    if let Some((key, value)) = short.split_once('=') {
        let mut chars = key.chars();
        let (Some(flag), None) = (chars.next(), chars.next()) else {
            return Err(InputError::InvalidOption(token.to_string()));
        };
        let index = flag_index(action, flag)?;
        scan.bound.insert(
            index,
            Bound {
                presented: format!("-{flag}"),
                raw: RawValue::Text(value.to_string()),
            },
        );
        return Ok(());
    }
    for flag in short.chars() {
        let index = flag_index(action, flag)?;
        trace!(token, flag = %flag, "Short flag");
        scan.bound.insert(
            index,
            Bound {
                presented: format!("-{flag}"),
                raw: RawValue::Flag,
            },
        );
    }
    Ok(())
}

fn flag_index(action: &Action, flag: char) -> Result<usize, InputError> {
    action
        .find_flag(flag)
        .and_then(|opt| action.index_of(opt.name()))
        .ok_or_else(|| unrecognized(action, format!("-{flag}")))
}

fn unrecognized(action: &Action, option: String) -> InputError {
    InputError::UnrecognizedOption {
        action: action.name().to_string(),
        option,
    }
}

/// Binds anonymous arguments to offset options not passed explicitly.
///
/// Offsets index the anonymous list as scanned; consumed entries are
/// removed and the rest returned in order.
fn bind_offsets(
    action: &Action,
    bound: &mut HashMap<usize, Bound>,
    anonymous: Vec<String>,
) -> Vec<String> {
    let mut slots: Vec<Option<String>> = anonymous.into_iter().map(Some).collect();

    for (index, option) in action.options().iter().enumerate() {
        let Some(offsets) = option.get_offsets() else {
            continue;
        };
        if bound.contains_key(&index) {
            continue;
        }
        let Some(raw) = take_slots(&mut slots, offsets) else {
            continue;
        };
        debug!(option = option.name(), %offsets, "Bound anonymous arguments");
        bound.insert(
            index,
            Bound {
                presented: option.name().to_string(),
                raw,
            },
        );
    }

    slots.into_iter().flatten().collect()
}

fn take_slots(slots: &mut [Option<String>], offsets: Offsets) -> Option<RawValue> {
    if offsets.is_single() {
        return slots.get_mut(offsets.at)?.take().map(RawValue::Text);
    }
    let end = offsets.end().min(slots.len().saturating_sub(1));
    let items: Vec<String> = slots
        .get_mut(offsets.at..=end)?
        .iter_mut()
        .map_while(Option::take)
        .collect();
    (!items.is_empty()).then_some(RawValue::List(items))
}
