use clap::Parser;
use tracing_subscriber::EnvFilter;

mod assembly;
mod cli;
mod core;
mod output;
mod parsing;
mod taxonomy;
mod utils;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("eggnog2gbk=debug,info")
    } else {
        EnvFilter::new("eggnog2gbk=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Genbank(args) => {
            cli::genbank::run(args, cli.verbose)?;
        }
        cli::Commands::GenbankMultiple(args) => {
            cli::multiple::run(args, cli.verbose)?;
        }
    }

    Ok(())
}
