//! `cepstrack`: formant tracks, mean formants and cutoff tuning from the command line.

mod cli;
mod output;
mod pipeline;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = cli::Cli::parse();
    let config = pipeline::load_config(&cli)?;
    pipeline::run(&cli, config)
}
