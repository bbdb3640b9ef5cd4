//! Check command - validate RIFF files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use nether_riff::parse_riff;

/// Arguments for the check command
#[derive(Args)]
pub struct CheckArgs {
    /// Files to check
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

/// Execute the check command
pub fn execute(args: CheckArgs) -> Result<()> {
    let mut failed = 0;
    for path in &args.paths {
        match check_file(path) {
            Ok(chunks) => println!("{}: OK ({} chunks)", path.display(), chunks),
            Err(err) => {
                println!("{}: {:#}", path.display(), err);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} files failed", failed, args.paths.len());
    }
    Ok(())
}

/// Parse a single file, returning the number of chunks it contains
pub fn check_file(path: &Path) -> Result<usize> {
    tracing::debug!("checking {}", path.display());
    let data = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file = parse_riff(path.display().to_string(), &data)?;
    Ok(file.len())
}
