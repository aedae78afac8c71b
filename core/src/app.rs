//! The dispatcher: routes `argv` to a command action and runs its handler.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::action::{Action, Handler};
use crate::args::Args;
use crate::argv::split_command_line;
use crate::command::Command;
use crate::console::Console;
use crate::error::{DispatchError, HandlerError, InputError, SchemaError};
use crate::help;
use crate::parser::Parser;

/// A command-line application: a set of commands plus dispatch rules.
///
/// `argv[0]` is the program name, `argv[1]` the command, `argv[2]` the
/// action and the rest is parsed against the action's options.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
///
/// use cmdkit_core::{Action, App, Command, Opt, ScriptedConsole};
///
/// let greetings = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&greetings);
///
/// let app = App::new("demo").with_command(
///     Command::new("hello")?.with_action(
///         Action::new("say")?
///             .with_option(Opt::new("name")?.with_default("John Doe"))?
///             .handler(move |_, args| {
///                 let name = args.get_str("name").unwrap_or_default();
///                 sink.lock().unwrap().push(format!("Hello, {name}!"));
///                 Ok(())
///             }),
///     )?,
/// )?;
///
/// let mut console = ScriptedConsole::default();
/// app.execute(&["demo", "hello", "say"], &mut console)?;
/// app.execute_line("hello say --name=Harry", &mut console)?;
/// assert_eq!(*greetings.lock().unwrap(), ["Hello, John Doe!", "Hello, Harry!"]);
///
/// let err = app.execute(&["demo", "hey"], &mut console).unwrap_err();
/// assert_eq!(err.to_string(), "unknown command: hey");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone)]
pub struct App {
    title: String,
    interactive: bool,
    commands: Vec<Command>,
    index: HashMap<String, usize>,
    handler: Option<Handler>,
}

impl App {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            interactive: false,
            commands: Vec::new(),
            index: HashMap::new(),
            handler: None,
        }
    }

    /// Enter interactive mode when started without arguments.
    pub fn interactive(mut self, enabled: bool) -> Self {
        self.interactive = enabled;
        self
    }

    pub fn with_command(mut self, command: Command) -> Result<Self, SchemaError> {
        self.add_command(command)?;
        Ok(self)
    }

    pub fn add_command(&mut self, command: Command) -> Result<(), SchemaError> {
        if self.index.contains_key(command.name()) {
            return Err(SchemaError::DuplicateCommand(command.name().to_string()));
        }
        self.index.insert(command.name().to_string(), self.commands.len());
        self.commands.push(command);
        Ok(())
    }

    /// Handler for actions whose command has none either.
    pub fn with_default_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Action, &Args<'_>) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn find_command(&self, name: &str) -> Option<&Command> {
        self.index.get(name).map(|&i| &self.commands[i])
    }

    pub fn get_command(&self, name: &str) -> Result<&Command, InputError> {
        self.find_command(name)
            .ok_or_else(|| InputError::UnrecognizedCommand(name.to_string()))
    }

    /// Overview help of all commands.
    pub fn help(&self) -> String {
        help::app_help(&self.title, &self.commands)
    }

    /// Dispatches `argv`, returning input and handler errors.
    pub fn execute<S: AsRef<str>>(
        &self,
        argv: &[S],
        console: &mut dyn Console,
    ) -> Result<(), DispatchError> {
        let argv: Vec<&str> = argv.iter().map(AsRef::as_ref).collect();
        if argv.len() < 2 {
            if self.interactive {
                return self.shell(console);
            }
            console.write_line(&self.help());
            return Ok(());
        }

        if let Some(at) = argv.iter().skip(1).take(3).position(|t| is_help(t)) {
            return self.show_help(&argv[1..1 + at], console);
        }

        let command = self.get_command(argv[1])?;
        let Some(&action_name) = argv.get(2) else {
            console.write_line(&help::command_help(&self.title, command));
            return Ok(());
        };
        let action = command.get_action(action_name)?;
        let handler = command
            .handler_for(action)
            .or(self.handler.as_ref())
            .ok_or_else(|| InputError::NoHandler {
                command: command.name().to_string(),
                action: action.name().to_string(),
            })?;

        let args = Parser::with_console(console).parse(action, &argv[3..])?;
        debug!(command = command.name(), action = action.name(), "Dispatching");
        handler(action, &args).map_err(DispatchError::Handler)
    }

    /// Splits `line` like a shell would and dispatches it.
    pub fn execute_line(&self, line: &str, console: &mut dyn Console) -> Result<(), DispatchError> {
        let mut argv = vec![self.title.clone()];
        argv.extend(split_command_line(line));
        self.execute(&argv, console)
    }

    /// Like [`execute`](App::execute), but input errors are reported to
    /// the console instead of returned.
    pub fn run<S: AsRef<str>>(&self, argv: &[S], console: &mut dyn Console) -> Result<(), HandlerError> {
        match self.execute(argv, console) {
            Ok(()) => Ok(()),
            Err(DispatchError::Input(e)) => {
                console.report(&e.to_string());
                Ok(())
            }
            Err(DispatchError::Handler(e)) => Err(e),
        }
    }

    /// Reads and executes lines until `quit`, `exit` or end of input.
    pub fn shell(&self, console: &mut dyn Console) -> Result<(), DispatchError> {
        let prompt = format!("{}> ", self.title);
        info!(title = %self.title, "Entering interactive mode");
        while let Some(line) = console.read_line(&prompt, false).map_err(InputError::from)? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if matches!(line, "quit" | "exit") {
                break;
            }
            if let Err(e) = self.execute_line(line, console) {
                warn!(error = %e, "Command failed");
                console.report(&e.to_string());
            }
        }
        debug!("Leaving interactive mode");
        Ok(())
    }

    /// Help scoped by the tokens before the help flag.
    fn show_help(&self, path: &[&str], console: &mut dyn Console) -> Result<(), DispatchError> {
        let text = match *path {
            [] => self.help(),
            [command] => help::command_help(&self.title, self.get_command(command)?),
            [command, action, ..] => {
                let command = self.get_command(command)?;
                help::action_help(&self.title, command, command.get_action(action)?)
            }
        };
        console.write_line(&text);
        Ok(())
    }
}

fn is_help(token: &str) -> bool {
    matches!(token, "--help" | "-?")
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("title", &self.title)
            .field("interactive", &self.interactive)
            .field("commands", &self.commands)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::console::ScriptedConsole;
    use crate::option::Opt;

    type Log = Arc<Mutex<Vec<String>>>;

    fn app(log: &Log) -> App {
        let sink = Arc::clone(log);
        let say = Action::new("say")
            .unwrap()
            .with_option(Opt::new("name").unwrap().flag('n').unwrap().with_default("John Doe"))
            .unwrap()
            .with_option(Opt::new("age").unwrap().number().with_default(18))
            .unwrap();
        let shout = Action::new("shout").unwrap();
        let fallback = Arc::clone(log);
        App::new("demo")
            .with_command(
                Command::new("hello")
                    .unwrap()
                    .with_action(say.handler(move |_, args| {
                        sink.lock().unwrap().push(format!(
                            "{} {}",
                            args.get("name").unwrap(),
                            args.get("age").unwrap()
                        ));
                        Ok(())
                    }))
                    .unwrap()
                    .with_action(shout)
                    .unwrap()
                    .handler(move |action, _| {
                        fallback.lock().unwrap().push(format!("fallback {}", action.name()));
                        Ok(())
                    }),
            )
            .unwrap()
            .with_command(
                Command::new("bare")
                    .unwrap()
                    .with_action(Action::new("noop").unwrap())
                    .unwrap(),
            )
            .unwrap()
    }

    fn log() -> Log {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[test]
    fn test_dispatch_with_defaults_and_values() {
        let log = log();
        let app = app(&log);
        let mut console = ScriptedConsole::default();
        app.execute(&["demo", "hello", "say"], &mut console).unwrap();
        app.execute(&["demo", "hello", "say", "--name=Harry", "--age=25"], &mut console)
            .unwrap();
        assert_eq!(*log.lock().unwrap(), ["John Doe 18", "Harry 25"]);
    }

    #[test]
    fn test_command_fallback_handler() {
        let log = log();
        let app = app(&log);
        let mut console = ScriptedConsole::default();
        app.execute(&["demo", "hello", "shout"], &mut console).unwrap();
        assert_eq!(*log.lock().unwrap(), ["fallback shout"]);
    }

    #[test]
    fn test_no_handler_is_input_error() {
        let app = app(&log());
        let err = app
            .execute(&["demo", "bare", "noop"], &mut ScriptedConsole::default())
            .unwrap_err();
        assert!(err.is_input());
        assert!(matches!(
            err,
            DispatchError::Input(InputError::NoHandler { .. })
        ));
    }

    #[test]
    fn test_default_handler() {
        let log = log();
        let sink = Arc::clone(&log);
        let app = app(&log).with_default_handler(move |action, _| {
            sink.lock().unwrap().push(format!("default {}", action.name()));
            Ok(())
        });
        app.execute(&["demo", "bare", "noop"], &mut ScriptedConsole::default())
            .unwrap();
        assert_eq!(*log.lock().unwrap(), ["default noop"]);
    }

    #[test]
    fn test_unknown_command_and_action() {
        let app = app(&log());
        let mut console = ScriptedConsole::default();
        let err = app.execute(&["demo", "hey"], &mut console).unwrap_err();
        assert_eq!(err.to_string(), "unknown command: hey");
        let err = app.execute(&["demo", "hello", "talk"], &mut console).unwrap_err();
        assert_eq!(err.to_string(), "hello: unknown action \"talk\"");
    }

    #[test]
    fn test_duplicate_command() {
        let err = app(&log())
            .with_command(Command::new("hello").unwrap())
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateCommand(ref name) if name == "hello"));
    }

    #[test]
    fn test_command_without_action_lists_actions() {
        let app = app(&log());
        let mut console = ScriptedConsole::default();
        app.execute(&["demo", "hello"], &mut console).unwrap();
        let out = console.output().join("\n");
        assert!(out.contains("Actions:"));
        assert!(out.contains("say"));
        assert!(out.contains("shout"));
    }

    #[test]
    fn test_scoped_help() {
        let log = log();
        let app = app(&log);
        let mut console = ScriptedConsole::default();
        app.execute(&["demo", "--help"], &mut console).unwrap();
        app.execute(&["demo", "hello", "-?"], &mut console).unwrap();
        app.execute(&["demo", "hello", "say", "--help"], &mut console)
            .unwrap();
        let out = console.output();
        assert_eq!(out.len(), 3);
        assert!(out[0].contains("Commands:"));
        assert!(out[1].contains("Actions:"));
        assert!(out[2].contains("-n, --name <string>"));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_no_arguments_prints_help_when_not_interactive() {
        let app = app(&log());
        let mut console = ScriptedConsole::new(["hello say"]);
        app.execute(&["demo"], &mut console).unwrap();
        assert!(console.prompts().is_empty());
        assert!(console.output()[0].starts_with("Usage: demo"));
    }

    #[test]
    fn test_interactive_loop() {
        let log = log();
        let app = app(&log).interactive(true);
        let mut console = ScriptedConsole::new([
            "hello say --name=\"Harry Potter\"",
            "",
            "nope",
            "hello say --age=x",
            "exit",
            "hello say",
        ]);
        app.execute(&["demo"], &mut console).unwrap();
        assert_eq!(*log.lock().unwrap(), ["Harry Potter 18"]);
        assert_eq!(console.errors().len(), 2);
        assert_eq!(console.errors()[0], "unknown command: nope");
        assert_eq!(console.remaining(), 1);
        assert!(console.prompts().iter().all(|p| p == "demo> "));
    }

    #[test]
    fn test_interactive_loop_ends_at_eof() {
        let app = app(&log()).interactive(true);
        let mut console = ScriptedConsole::new(["hello say"]);
        app.execute(&["demo"], &mut console).unwrap();
        assert_eq!(console.prompts().len(), 2);
    }

    #[test]
    fn test_run_reports_input_errors() {
        let app = app(&log());
        let mut console = ScriptedConsole::default();
        app.run(&["demo", "hello", "say", "--age=old"], &mut console)
            .unwrap();
        assert_eq!(
            console.errors(),
            ["option \"--age\" requires a number as value."]
        );
    }

    #[test]
    fn test_handler_error_propagates() {
        let app = App::new("demo")
            .with_command(
                Command::new("fail")
                    .unwrap()
                    .with_action(Action::new("now").unwrap().handler(|_, _| Err("boom".into())))
                    .unwrap(),
            )
            .unwrap();
        let err = app
            .execute(&["demo", "fail", "now"], &mut ScriptedConsole::default())
            .unwrap_err();
        assert!(!err.is_input());
        assert_eq!(err.to_string(), "boom");
    }
}
