mod commands;
mod logging;

use clap::Parser;
use commands::Commands;

/// corpusmill-cli
#[derive(clap::Parser, Debug)]
pub struct Args {
    /// Subcommand to run.
    #[clap(subcommand)]
    pub command: Commands,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    args.command.run()
}
