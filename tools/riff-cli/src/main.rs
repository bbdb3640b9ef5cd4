//! nether-riff - RIFF container inspector
//!
//! Commands:
//! - `nether-riff show` - Print the chunk tree of a file
//! - `nether-riff check` - Validate the structure of one or more files

mod check;
mod show;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nether-riff")]
#[command(about = "Inspect RIFF container files")]
#[command(version)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the chunk tree of a RIFF file
    Show(show::ShowArgs),

    /// Parse each file and report whether it is well formed
    Check(check::CheckArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose, rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Show(args) => show::execute(args),
        Commands::Check(args) => check::execute(args),
    }
}

/// `RUST_LOG` when it is set and valid, otherwise `warn` (`debug` with `--verbose`)
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let default_level = if verbose { "debug" } else { "warn" };
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_log_filter_defaults() {
        assert_eq!(log_filter(false, None).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(log_filter(true, None).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(log_filter(true, Some("")).max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_log_filter_prefers_rust_log() {
        let filter = log_filter(false, Some("nether_riff=trace"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));

        let filter = log_filter(true, Some("error"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::ERROR));
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["nether-riff", "check", "a.wav", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Check(_)));

        let cli = Cli::try_parse_from(["nether-riff", "-v", "show", "--file", "a.wav"]).unwrap();
        assert!(cli.verbose);

        let cli =
            Cli::try_parse_from(["nether-riff", "show", "--file", "a.wav", "--format", "json"]).unwrap();
        assert!(!cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Show(show::ShowArgs {
                format: show::Format::Json,
                ..
            })
        ));
    }

    #[test]
    fn test_check_requires_paths() {
        assert!(Cli::try_parse_from(["nether-riff", "check"]).is_err());
    }
}
