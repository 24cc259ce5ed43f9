use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod core;
mod parsing;
mod restraints;
mod utils;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("xplor_nef=debug,info")
    } else {
        EnvFilter::new("xplor_nef=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Dihedrals(args) => {
            cli::dihedrals::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Distances(args) => {
            cli::distances::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Psf(args) => {
            cli::psf::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
