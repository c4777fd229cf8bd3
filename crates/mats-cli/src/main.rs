#![forbid(unsafe_code)]

mod cmd;
mod output;
mod tui;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "mats: wrestling mat-side scoreboard",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output (shorthand for `--format json`).
    #[arg(long, global = true)]
    json: bool,

    /// Output format. Defaults to pretty on a terminal and text when piped.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Directory holding config.toml and the saved board.
    #[arg(long, global = true, value_name = "DIR")]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Create the state directory",
        long_about = "Write a default config.toml and a fresh board into the state directory.",
        after_help = "EXAMPLES:\n    # Initialize ./.mats for this gym\n    mats --state-dir .mats init\n\n    # Start over with defaults\n    mats init --force"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Board",
        about = "Show the current board",
        long_about = "Print mat, bout, period, both competitors, the clock and the latest log entries.",
        after_help = "EXAMPLES:\n    # Show the board\n    mats show\n\n    # Emit machine-readable output\n    mats show --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Board",
        about = "Apply one or more actions",
        long_about = "Parse every action token first, then apply them in order within one session.\n\nTokens: mat-inc mat-dec bout-inc bout-dec bout-inc-10 bout-dec-100 period-next period-prev\n        left-inc left-dec right-inc right-dec quick=T3 quick=LABEL:POINTS outcome=F\n        timer-start timer-stop timer-toggle timer-reset timer-set=M:SS\n        reset-scores clear-log toggle-side active=left|right name-left=NAME name-right=NAME undo",
        after_help = "EXAMPLES:\n    # Takedown for the active side\n    mats apply quick=T3\n\n    # Switch sides, score an escape, then take it back\n    mats apply toggle-side quick=E1 undo\n\n    # Set a two minute period and start the clock\n    mats apply timer-set=2:00 timer-start"
    )]
    Apply(cmd::apply::ApplyArgs),

    #[command(
        next_help_heading = "Board",
        about = "Drive the countdown clock",
        after_help = "EXAMPLES:\n    # Run the clock in the foreground until it expires\n    mats timer run --set 2:00 --start"
    )]
    Timer {
        #[command(subcommand)]
        command: cmd::timer::TimerCommand,
    },

    #[command(
        next_help_heading = "Log",
        about = "List log entries",
        long_about = "List bout log entries, newest first.",
        after_help = "EXAMPLES:\n    # Last ten entries\n    mats log --limit 10\n\n    # Emit machine-readable output\n    mats log --json"
    )]
    Log(cmd::log::LogArgs),

    #[command(
        next_help_heading = "Log",
        about = "Export the log as CSV or JSON",
        after_help = "EXAMPLES:\n    # Write wrestling-log.csv in the current directory\n    mats export\n\n    # JSON to stdout\n    mats export json --output -"
    )]
    Export(cmd::export::ExportArgs),

    #[command(
        next_help_heading = "Board",
        about = "Open the live full-screen board",
        after_help = "EXAMPLES:\n    # Score from the keyboard\n    mats live"
    )]
    Live,

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    # Bash\n    mats completions bash > ~/.local/share/bash-completion/completions/mats"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(live: bool) {
    let filter = EnvFilter::try_from_env("MATS_LOG").unwrap_or_else(|_| {
        // Log lines would tear the full-screen board.
        EnvFilter::new(if live {
            "off"
        } else if env::var("DEBUG").is_ok() {
            "mats=debug,info"
        } else {
            "mats=info,warn"
        })
    });

    let format = env::var("MATS_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    // Logs go to stderr so stdout stays parseable.
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

fn run(cli: Cli, output: OutputMode) -> anyhow::Result<()> {
    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let state_dir = mats_core::config::resolve_state_dir(cli.state_dir.as_deref())?;
    if let Commands::Init(args) = &cli.command {
        return cmd::init::run_init(args, &state_dir, output);
    }

    let ctx = cmd::Context::load(state_dir, output)?;
    match cli.command {
        Commands::Show(args) => cmd::show::run_show(&args, &ctx),
        Commands::Apply(args) => cmd::apply::run_apply(&args, &ctx),
        Commands::Timer { command } => cmd::timer::run_timer(&command, &ctx),
        Commands::Log(args) => cmd::log::run_log(&args, &ctx),
        Commands::Export(args) => cmd::export::run_export(&args, &ctx),
        Commands::Live => tui::run_live(&ctx),
        Commands::Init(_) | Commands::Completions(_) => Ok(()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(matches!(cli.command, Commands::Live));

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();
    match run(cli, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            let _ = render_error(output, &CliError::from(&err));
            ExitCode::FAILURE
        }
    }
}
