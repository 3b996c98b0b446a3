use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use repolens::cli::OutputFormat;
use repolens::cli::commands::{context::ContextArgs, rank::RankArgs};

/// Parse output format from string
fn parse_output_format(s: &str) -> Result<OutputFormat, String> {
    s.parse()
}

/// Parse config display format from string
fn parse_config_format(s: &str) -> Result<String, String> {
    match s.to_lowercase().as_str() {
        "toml" | "json" => Ok(s.to_lowercase()),
        _ => Err(format!("Invalid format '{}'. Valid values: toml, json", s)),
    }
}

#[derive(Parser)]
#[command(name = "repolens")]
#[command(
    version,
    about = "Importance-ranked, token-budgeted repository context"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank repository files by importance
    Rank {
        /// Repository root
        #[arg(default_value = ".")]
        path: PathBuf,

        #[arg(long, short, help = "Show only the top N files")]
        limit: Option<usize>,

        #[arg(long, help = "Heuristic scores only, skip AST boosting")]
        no_ast: bool,

        #[arg(long, short, help = "Extra ignore glob (repeatable)")]
        ignore: Vec<String>,

        #[arg(long, short, default_value = "text", value_parser = parse_output_format)]
        format: OutputFormat,
    },

    /// Assemble token-budgeted context for a repository
    Context {
        /// Repository root
        #[arg(default_value = ".")]
        path: PathBuf,

        #[arg(long, short, help = "Number of files to include")]
        top: Option<usize>,

        #[arg(long, help = "Per-file character cap")]
        max_chars: Option<usize>,

        #[arg(long, short, default_value = "text", value_parser = parse_output_format)]
        format: OutputFormat,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show effective configuration
    Show {
        /// Repository whose .repolens.toml is merged
        #[arg(long, short, default_value = ".")]
        path: PathBuf,

        #[arg(long, short, default_value = "toml", value_parser = parse_config_format)]
        format: String,
    },
    /// Show configuration file paths
    Path {
        #[arg(long, short, default_value = ".")]
        path: PathBuf,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mrepolens encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Rank {
            path,
            limit,
            no_ast,
            ignore,
            format,
        } => {
            repolens::cli::commands::rank::run(RankArgs {
                path,
                limit,
                no_ast,
                ignore,
                format,
            })?;
        }
        Commands::Context {
            path,
            top,
            max_chars,
            format,
        } => {
            repolens::cli::commands::context::run(ContextArgs {
                path,
                top,
                max_chars,
                format,
            })?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { path, format } => {
                repolens::cli::commands::config::show(&path, &format)?;
            }
            ConfigAction::Path { path } => {
                repolens::cli::commands::config::path(&path)?;
            }
        },
    }

    Ok(())
}
