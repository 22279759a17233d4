mod cache;
mod stat;

pub use cache::CacheArgs;
pub use stat::StatArgs;

/// Subcommands.
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Print per-field statistics for a JSONL file.
    Stat(StatArgs),

    /// Inspect or clear the checkpoint cache.
    Cache(CacheArgs),
}

impl Commands {
    pub fn run(&self) -> anyhow::Result<()> {
        match self {
            Commands::Stat(args) => args.run(),
            Commands::Cache(args) => args.run(),
        }
    }
}
