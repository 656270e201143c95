#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use std::env;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use twig_core::clock::SystemClock;
use twig_core::config::resolve_config;
use twig_core::{ErrorCode, Store};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "twig: projects and nested tasks in one JSON file",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress log output below errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format.
    #[arg(long, value_enum, global = true)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Store file to use instead of the configured one.
    #[arg(long, global = true, value_name = "PATH")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags, environment, and the user config.
    fn output_mode(&self, configured: Option<&str>) -> OutputMode {
        output::resolve_output_mode(self.format, self.json, configured)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Projects",
        about = "Manage projects",
        long_about = "Create, rename, delete, and list projects.",
        after_help = "EXAMPLES:\n    # Create a project\n    tw project add Home\n\n    # List projects with progress\n    tw project list"
    )]
    Project {
        #[command(subcommand)]
        command: cmd::project::ProjectCommand,
    },

    #[command(
        next_help_heading = "Tasks",
        about = "Manage tasks inside a project",
        long_about = "Add, rename, annotate, complete, reopen, delete, and show tasks.",
        after_help = "EXAMPLES:\n    # Add a root task\n    tw task add Home \"Buy milk\"\n\n    # Add a subtask\n    tw task add Home \"2% milk\" --parent root.1\n\n    # Complete it\n    tw task done Home root.1.1"
    )]
    Task {
        #[command(subcommand)]
        command: cmd::task::TaskCommand,
    },

    #[command(
        next_help_heading = "Read",
        about = "Show a project's task tree",
        long_about = "Show every task of a project in order, indented by depth, with overall progress.",
        after_help = "EXAMPLES:\n    # Show the tree\n    tw tree Home\n\n    # Emit machine-readable output\n    tw tree Home --json"
    )]
    Tree(cmd::tree::TreeArgs),

    #[command(
        next_help_heading = "Read",
        about = "Check the store for inconsistent entries",
        long_about = "Report task keys that do not follow the ID scheme and tasks whose completion fields disagree. Exits non-zero when issues are found.",
        after_help = "EXAMPLES:\n    # Check the configured store\n    tw check\n\n    # Check another file\n    tw check --store backup.json"
    )]
    Check,

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completions",
        long_about = "Generate shell completion scripts for bash, zsh, fish, elvish, or PowerShell.",
        after_help = "EXAMPLES:\n    # Bash\n    tw completions bash > ~/.local/share/bash-completion/completions/tw"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_env("TWIG_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if quiet {
            "error"
        } else if verbose || env::var("DEBUG").is_ok() {
            "twig=debug,info"
        } else {
            "twig=info,warn"
        })
    });

    let format = env::var("TWIG_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    if let Commands::Completions(ref args) = cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let project_root = env::current_dir()?;
    let config = match resolve_config(&project_root, cli.store.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            let code = ErrorCode::ConfigParseError;
            render_error(
                cli.output_mode(None),
                &CliError::with_details(
                    format!("{e:#}"),
                    code.hint().unwrap_or_default(),
                    code.code(),
                ),
            )?;
            return Err(e);
        }
    };
    let output = cli.output_mode(config.output.as_deref());
    debug!(store = %config.store_path.display(), ?output, "opening store");

    let mut store = Store::open_with(config.store_path, config.write_policy, SystemClock)
        .map_err(|e| cmd::fail(output, e))?;

    let command_result = match &cli.command {
        Commands::Project { command } => cmd::project::run_project(command, &mut store, output),
        Commands::Task { command } => cmd::task::run_task(command, &mut store, output),
        Commands::Tree(args) => cmd::tree::run_tree(args, &store, output),
        Commands::Check => cmd::check::run_check(&store, output),
        Commands::Completions(_) => Ok(()),
    };

    // Deferred writes land here. Immediate ones are already on disk.
    if command_result.is_ok() && store.is_dirty() {
        store.commit().map_err(|e| cmd::fail(output, e))?;
    }

    command_result
}
