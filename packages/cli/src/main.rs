mod commands;
mod config;
mod files;
mod writer;

use clap::Parser;
use colored::Colorize;
use commands::{generate, GenerateArgs};
use tracing_subscriber::EnvFilter;

/// Generate TypeScript declaration files for Svelte components
#[derive(Parser, Debug)]
#[command(name = "svelte2dts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    generate: GenerateArgs,

    /// Log overlay and driver activity (`-V` prints the version)
    #[arg(long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| generate(cli.generate, &cwd));

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_has_no_short_flag() {
        let cli = Cli::try_parse_from(["svelte2dts", "--verbose", "src"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.generate.src_dirs, vec![std::path::PathBuf::from("src")]);

        assert!(Cli::try_parse_from(["svelte2dts", "-v", "src"]).is_err());
    }

    #[test]
    fn test_short_version_flag() {
        let err = Cli::try_parse_from(["svelte2dts", "-V"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
