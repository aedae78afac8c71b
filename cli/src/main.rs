use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use cmdkit_core::{App, DispatchError, HandlerError, SchemaError, SchemaFile};
use cmdkit_terminal::{TerminalConsole, render_args_table};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Output format for parsed arguments.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
    Table,
}

#[derive(Debug, Parser)]
#[command(name = "cmdkit")]
#[command(about = "Parse and dispatch argument lists against declarative command schemas")]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Only log warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse an argument list against a schema and print the result.
    Run(RunArgs),
    /// Start an interactive shell for a schema.
    Shell(ShellArgs),
    /// Build a schema and report its size.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Schema file (.yaml, .yml or .json).
    #[arg(long)]
    schema: PathBuf,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
    /// Arguments to dispatch: <command> <action> [options] [-- args...].
    #[arg(last = true)]
    argv: Vec<String>,
}

#[derive(Debug, Args)]
struct ShellArgs {
    /// Schema file (.yaml, .yml or .json).
    #[arg(long)]
    schema: PathBuf,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Schema file (.yaml, .yml or .json).
    #[arg(long)]
    schema: PathBuf,
}

/// A failed run: message and process exit code.
#[derive(Debug)]
struct Failure {
    code: i32,
    message: String,
}

impl Failure {
    /// Bad arguments for the dispatched application.
    fn input(message: impl fmt::Display) -> Self {
        Self {
            code: 2,
            message: message.to_string(),
        }
    }
}

impl From<SchemaError> for Failure {
    fn from(err: SchemaError) -> Self {
        Self {
            code: 1,
            message: err.to_string(),
        }
    }
}

impl From<io::Error> for Failure {
    fn from(err: io::Error) -> Self {
        Self {
            code: 1,
            message: err.to_string(),
        }
    }
}

impl From<DispatchError> for Failure {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Input(e) => Self::input(e),
            DispatchError::Handler(e) => Self {
                code: 1,
                message: e.to_string(),
            },
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Command::Run(args) => run_dispatch(args),
        Command::Shell(args) => run_shell(args),
        Command::Check(args) => run_check(args),
    };

    if let Err(failure) = result {
        eprintln!("error: {}", failure.message);
        std::process::exit(failure.code);
    }
}

/// `RUST_LOG` wins; otherwise `-q` → warn, `-v` → debug, else info.
fn init_logging(verbose: bool, quiet: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if quiet {
        EnvFilter::new("warn")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Builds the schema's application with every action printing its
/// arguments in `format`.
fn load_app(schema: &Path, format: OutputFormat) -> Result<App, Failure> {
    let file = SchemaFile::load(schema)?;
    let app = file.build()?.with_default_handler(move |_, args| {
        println!("{}", render(args, format)?);
        Ok(())
    });
    debug!(schema = %schema.display(), commands = app.commands().len(), "Built application");
    Ok(app)
}

fn render(args: &cmdkit_core::Args<'_>, format: OutputFormat) -> Result<String, HandlerError> {
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(args)?,
        OutputFormat::Yaml => serde_yaml::to_string(args)?,
        OutputFormat::Table => render_args_table(args),
    };
    Ok(text.trim_end().to_string())
}

fn run_dispatch(args: RunArgs) -> Result<(), Failure> {
    let app = load_app(&args.schema, args.format)?;
    let mut argv = Vec::with_capacity(args.argv.len() + 1);
    argv.push(app.title().to_string());
    argv.extend(args.argv);

    let mut console = TerminalConsole::new()?;
    app.execute(&argv, &mut console)?;
    Ok(())
}

fn run_shell(args: ShellArgs) -> Result<(), Failure> {
    let app = load_app(&args.schema, args.format)?;
    let mut console = TerminalConsole::new()?;
    app.shell(&mut console)?;
    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), Failure> {
    let app = SchemaFile::load(&args.schema)?.build()?;
    let commands = app.commands();
    let actions: usize = commands.iter().map(|c| c.actions().len()).sum();
    let options: usize = commands
        .iter()
        .flat_map(|c| c.actions())
        .map(|a| a.options().len())
        .sum();
    println!(
        "{} command(s), {} action(s), {} option(s)",
        commands.len(),
        actions,
        options
    );
    Ok(())
}
