//! Top-level CLI definition and dispatch.

use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use serde_json::{Value, json};
use thiserror::Error;

use hardsecnet::cli::menu::Menu;
use hardsecnet::cli::output::{
    EventPrinter, entry_line, write_sequence_report, write_single_start,
};
use hardsecnet::cli::theme::Palette;
use hardsecnet::core::config::Config;
use hardsecnet::core::errors::HsnError;
use hardsecnet::core::paths::resolve_absolute_path;
use hardsecnet::logger::activity::ActivityLog;
use hardsecnet::runner::sequence::Sequencer;
use hardsecnet::runner::{CommandRunner, ScriptRunner};
use hardsecnet::scanner::discovery::discover;
use hardsecnet::scanner::walker::list_categories;

/// HardSecNet: audit and hardening script launcher.
#[derive(Debug, Parser)]
#[command(
    name = "hardsecnet",
    author,
    version,
    about = "HardSecNet - System Hardening | Audit | Before/After Reports",
    long_about = None
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Directory whose subfolders are the categories (default: current directory).
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Subcommand to execute. Without one the interactive menu starts.
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Interactive category and script menu.
    Menu,
    /// List the categories under the root.
    Categories,
    /// List the pairings and single scripts found under a directory.
    List(ListArgs),
    /// Run audit, harden, audit for one harden script and archive the reports.
    Sequence(SequenceArgs),
    /// Run a single script once.
    Exec(ExecArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args)]
struct ListArgs {
    /// Directory to scan (default: the root).
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct SequenceArgs {
    /// Harden script with an `Audit.ps1` beside it.
    #[arg(value_name = "HARDEN")]
    harden: PathBuf,
}

#[derive(Debug, Clone, Args)]
struct ExecArgs {
    /// Script to run.
    #[arg(value_name = "SCRIPT")]
    script: PathBuf,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completion script for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input or nothing to act on.
    #[error("{0}")]
    User(String),
    /// Script or filesystem failure.
    #[error("{0}")]
    Runtime(String),
    /// Internal bug or invariant violation.
    #[error("{0}")]
    Internal(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Internal(_) | Self::Json(_) => 3,
        }
    }
}

impl From<HsnError> for CliError {
    fn from(err: HsnError) -> Self {
        let message = err.to_string();
        match err {
            HsnError::InvalidConfig { .. }
            | HsnError::MissingConfig { .. }
            | HsnError::ConfigParse { .. }
            | HsnError::MissingSibling { .. }
            | HsnError::NoScriptsFound { .. }
            | HsnError::NoCategoriesFound { .. } => Self::User(message),
            HsnError::ProcessFailure { .. } | HsnError::Spawn { .. } | HsnError::Io { .. } => {
                Self::Runtime(message)
            }
            HsnError::Serialization { .. } => Self::Internal(message),
        }
    }
}

/// Everything a command needs once flags, env and the config file are merged.
struct Session {
    root: PathBuf,
    mode: OutputMode,
    palette: Palette,
    runner: CommandRunner,
    log: ActivityLog,
}

impl Session {
    fn open(cli: &Cli) -> Result<Self, CliError> {
        let config = Config::load(cli.config.as_deref())?;
        let root = cli
            .root
            .as_deref()
            .map_or_else(|| config.root_dir(), resolve_absolute_path);
        let mode = output_mode(cli);
        let color = config.launcher.color
            && !cli.no_color
            && mode == OutputMode::Human
            && io::stdout().is_terminal();
        Ok(Self {
            root,
            mode,
            palette: Palette::new(color),
            runner: CommandRunner::from_config(&config.runner),
            log: ActivityLog::from_config(&config.logging),
        })
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if let Some(Command::Completions(args)) = &cli.command {
        let mut command = Cli::command();
        let binary_name = command.get_name().to_string();
        generate(args.shell, &mut command, binary_name, &mut io::stdout());
        return Ok(());
    }

    let mut session = Session::open(cli)?;
    let result = match &cli.command {
        None | Some(Command::Menu) => run_menu(&mut session),
        Some(Command::Categories) => run_categories(&session),
        Some(Command::List(args)) => run_list(&mut session, args),
        Some(Command::Sequence(args)) => run_sequence(&mut session, args),
        Some(Command::Exec(args)) => run_exec(&mut session, args),
        Some(Command::Completions(_)) => Ok(()),
    };
    session.log.flush();
    result
}

fn run_menu(session: &mut Session) -> Result<(), CliError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    Menu::new(
        stdin.lock(),
        stdout.lock(),
        session.palette,
        &session.runner,
        &mut session.log,
        &session.root,
    )
    .run()?;
    Ok(())
}

fn run_categories(session: &Session) -> Result<(), CliError> {
    let categories = list_categories(&session.root)?;
    if categories.is_empty() {
        return Err(HsnError::NoCategoriesFound {
            root: session.root.clone(),
        }
        .into());
    }

    match session.mode {
        OutputMode::Json => write_json_line(&json!({
            "command": "categories",
            "root": session.root,
            "categories": categories,
        })),
        OutputMode::Human => {
            let mut stdout = io::stdout().lock();
            for (i, category) in categories.iter().enumerate() {
                writeln!(stdout, "{}. {}", i + 1, category.name)?;
            }
            Ok(())
        }
    }
}

fn run_list(session: &mut Session, args: &ListArgs) -> Result<(), CliError> {
    let dir = args
        .dir
        .as_deref()
        .map_or_else(|| session.root.clone(), resolve_absolute_path);
    if !dir.is_dir() {
        return Err(CliError::User(format!(
            "not a directory: {}",
            dir.display()
        )));
    }

    let discovery = discover(&dir)?;
    session.log.discovery(&discovery);
    if discovery.is_empty() {
        return Err(HsnError::NoScriptsFound { root: dir }.into());
    }

    let entries = discovery.entries();
    match session.mode {
        OutputMode::Json => write_json_line(&json!({
            "command": "list",
            "root": dir,
            "pairings": discovery.pairings.len(),
            "singles": discovery.singles.len(),
            "total": discovery.len(),
            "entries": entries,
        })),
        OutputMode::Human => {
            let mut stdout = io::stdout().lock();
            for (i, entry) in entries.iter().enumerate() {
                writeln!(stdout, "{}", entry_line(i + 1, entry))?;
            }
            Ok(())
        }
    }
}

fn run_sequence(session: &mut Session, args: &SequenceArgs) -> Result<(), CliError> {
    let harden = existing_script(&args.harden)?;
    let mode = session.mode;
    let palette = session.palette;
    let log = &mut session.log;
    let mut printer = EventPrinter::new(io::stdout(), palette);

    let outcome = Sequencer::new(&session.runner).run_for(&harden, |event| {
        log.sequence_event(&event);
        if mode == OutputMode::Human {
            printer.print(&event);
        }
    });
    let printed = printer.finish();

    let report = match outcome {
        Ok(report) => report,
        Err(err) => {
            session.log.sequence_failed(&harden, &err);
            return Err(err.into());
        }
    };
    session.log.sequence_complete(&report);
    printed?;

    match mode {
        OutputMode::Json => {
            let mut payload = serde_json::to_value(&report)?;
            if let Some(obj) = payload.as_object_mut() {
                obj.insert("command".to_string(), json!("sequence"));
            }
            write_json_line(&payload)
        }
        OutputMode::Human => {
            write_sequence_report(&mut io::stdout().lock(), palette, &report)?;
            Ok(())
        }
    }
}

fn run_exec(session: &mut Session, args: &ExecArgs) -> Result<(), CliError> {
    let script = existing_script(&args.script)?;
    if session.mode == OutputMode::Human {
        let mut stdout = io::stdout().lock();
        write_single_start(&mut stdout, session.palette, &script)?;
        stdout.flush()?;
    }

    if let Err(err) = session.runner.run_script(&script) {
        session.log.single_run(&script, Err(&err));
        return Err(err.into());
    }
    session.log.single_run(&script, Ok(()));

    match session.mode {
        OutputMode::Json => write_json_line(&json!({
            "command": "exec",
            "script": script,
            "ok": true,
        })),
        OutputMode::Human => {
            writeln!(io::stdout(), "{}", session.palette.ok("[✔] Done."))?;
            Ok(())
        }
    }
}

fn existing_script(path: &Path) -> Result<PathBuf, CliError> {
    let resolved = resolve_absolute_path(path);
    if resolved.is_file() {
        Ok(resolved)
    } else {
        Err(CliError::User(format!(
            "script not found: {}",
            resolved.display()
        )))
    }
}

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("HSN_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref(), io::stdout().is_terminal())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>, stdout_is_tty: bool) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    let fallback = if stdout_is_tty {
        OutputMode::Human
    } else {
        OutputMode::Json
    };

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        Some("human") => OutputMode::Human,
        Some("auto") | None => fallback,
        Some(_) => fallback,
    }
}
