//! Plain-text help rendering.

use std::fmt::Write as _;

use crate::action::Action;
use crate::command::Command;
use crate::option::Opt;

const WIDTH: usize = 80;
const MAX_LABEL: usize = 32;

/// Overview of every command and its actions.
pub fn app_help(title: &str, commands: &[Command]) -> String {
    let mut out = format!("Usage: {title} <command> <action> [options] [--] [args...]\n");
    if commands.is_empty() {
        return out;
    }
    out.push_str("\nCommands:\n");
    let rows: Vec<(String, String)> = commands
        .iter()
        .flat_map(|cmd| {
            let head = (
                cmd.name().to_string(),
                cmd.get_description().unwrap_or_default().to_string(),
            );
            let actions = cmd.actions().iter().map(|action| {
                (
                    format!("  {}", action.name()),
                    action.get_description().unwrap_or_default().to_string(),
                )
            });
            std::iter::once(head).chain(actions)
        })
        .collect();
    push_rows(&mut out, &rows);
    out
}

/// The actions of one command.
pub fn command_help(title: &str, command: &Command) -> String {
    let mut out = format!("Usage: {title} {} <action> [options]\n", command.name());
    push_description(&mut out, command.get_description());
    if command.actions().is_empty() {
        return out;
    }
    out.push_str("\nActions:\n");
    let rows: Vec<(String, String)> = command
        .actions()
        .iter()
        .map(|action| {
            (
                action.name().to_string(),
                action.get_description().unwrap_or_default().to_string(),
            )
        })
        .collect();
    push_rows(&mut out, &rows);
    out
}

/// Usage and options of one action.
pub fn action_help(title: &str, command: &Command, action: &Action) -> String {
    let mut out = format!(
        "Usage: {title} {} {} [options] [--] [args...]\n",
        command.name(),
        action.name()
    );
    push_description(&mut out, action.get_description());
    if action.options().is_empty() {
        return out;
    }
    out.push_str("\nOptions:\n");
    let rows: Vec<(String, String)> = action
        .options()
        .iter()
        .map(|opt| (option_label(opt), option_details(opt)))
        .collect();
    push_rows(&mut out, &rows);
    out
}

/// `-n, --name, --alias <type>`
fn option_label(opt: &Opt) -> String {
    let mut names: Vec<String> = opt.flag_char().map(|f| format!("-{f}")).into_iter().collect();
    names.extend(opt.aliases().iter().map(|a| format!("--{a}")));
    let mut label = names.join(", ");
    if !opt.value_type().is_bool() {
        let _ = write!(label, " <{}>", opt.value_type().name());
    }
    label
}

fn option_details(opt: &Opt) -> String {
    let mut details = opt.get_description().unwrap_or_default().to_string();
    let mut notes = Vec::new();
    if let Some(default) = opt.default_value() {
        notes.push(format!("default: {default}"));
    }
    if let Some(offsets) = opt.get_offsets() {
        notes.push(format!("position: {offsets}"));
    }
    if opt.is_required() {
        notes.push("required".to_string());
    }
    if !notes.is_empty() {
        if !details.is_empty() {
            details.push(' ');
        }
        let _ = write!(details, "({})", notes.join(", "));
    }
    details
}

fn push_description(out: &mut String, description: Option<&str>) {
    if let Some(text) = description.filter(|d| !d.trim().is_empty()) {
        out.push('\n');
        for line in wrap(text, WIDTH) {
            out.push_str(&line);
            out.push('\n');
        }
    }
}

/// Two aligned columns, the right one wrapped to [`WIDTH`].
fn push_rows(out: &mut String, rows: &[(String, String)]) {
    let label_width = rows
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0)
        .min(MAX_LABEL);
    let indent = 2 + label_width + 2;

    for (label, text) in rows {
        let lines = wrap(text, WIDTH.saturating_sub(indent).max(20));
        let mut lines = lines.into_iter();
        let first = lines.next().unwrap_or_default();
        if label.chars().count() > label_width {
            let _ = writeln!(out, "  {label}");
            if !first.is_empty() {
                let _ = writeln!(out, "{:indent$}{first}", "");
            }
        } else if first.is_empty() {
            let _ = writeln!(out, "  {label}");
        } else {
            let _ = writeln!(out, "  {label:<label_width$}  {first}");
        }
        for line in lines {
            let _ = writeln!(out, "{:indent$}{line}", "");
        }
    }
}

/// Greedy word wrap; words longer than `width` get a line of their own.
pub(crate) fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let needed = if line.is_empty() {
            word.chars().count()
        } else {
            line.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
