// tripsheet CLI - merge travel-expense workbooks into one normalized CSV

mod exit_codes;
mod inspect;
mod merge;
mod profile;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_ERROR, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};
use merge::MergeArgs;
use profile::ProfileCommands;

#[derive(Parser)]
#[command(name = "tripsheet")]
#[command(about = "Normalize and merge travel-expense workbooks into one CSV")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// More log output (-v info, -vv debug). TRIPSHEET_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress progress and summary lines on stderr
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge every matching workbook in a directory into one CSV
    #[command(after_help = "\
Examples:
  tripsheet merge
  tripsheet merge ./2024-03 -o march.csv
  tripsheet merge ./inbox --owner 飞鹤 --pattern '*.xls*'
  tripsheet merge ./inbox --json > summary.json")]
    Merge {
        /// Directory holding the exported workbooks
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Output CSV path
        #[arg(long, short = 'o', default_value = "merged_output.csv")]
        output: PathBuf,

        /// Only files whose name contains this text (default: profile owner_marker)
        #[arg(long)]
        owner: Option<String>,

        /// Glob matched against file names inside DIR
        #[arg(long, default_value = "*.xlsx")]
        pattern: String,

        /// Profile TOML file
        #[arg(long, env = "TRIPSHEET_PROFILE")]
        profile: Option<PathBuf>,

        /// Write the CSV without a UTF-8 byte order mark
        #[arg(long)]
        no_bom: bool,

        /// Print a JSON merge summary to stdout
        #[arg(long)]
        json: bool,
    },

    /// Show how the profile reads one workbook: headers, columns, row counts
    #[command(after_help = "\
Examples:
  tripsheet inspect 飞鹤-2024-03.xlsx
  tripsheet inspect 飞鹤-储发-2024-03.xlsx --json")]
    Inspect {
        /// Workbook to inspect
        file: PathBuf,

        /// Profile TOML file
        #[arg(long, env = "TRIPSHEET_PROFILE")]
        profile: Option<PathBuf>,

        /// Output JSON instead of a human-readable report
        #[arg(long)]
        json: bool,
    },

    /// Show or validate reconciliation profiles
    #[command(subcommand)]
    Profile(ProfileCommands),
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  tripsheet-reconcile ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  tripsheet-reconcile ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn log_level(verbose: u8) -> log::LevelFilter {
    match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    }
}

/// Called once, before any command runs.
fn init_logging(verbose: u8) {
    env_logger::Builder::new()
        .filter_level(log_level(verbose))
        .parse_env("TRIPSHEET_LOG")
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None => {
            eprintln!("Usage: tripsheet <command> [options]");
            eprintln!("       tripsheet --help for more information");
            Ok(())
        }
        Some(Commands::Merge { dir, output, owner, pattern, profile, no_bom, json }) => {
            merge::cmd_merge(MergeArgs {
                dir,
                output,
                owner,
                pattern,
                profile,
                no_bom,
                json,
                quiet: cli.quiet,
            })
        }
        Some(Commands::Inspect { file, profile, json }) => inspect::cmd_inspect(file, profile, json),
        Some(Commands::Profile(cmd)) => profile::cmd_profile(cmd),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
