use std::fs;

use corpusmill::disk_cache::{CorpusmillDiskCache, CorpusmillDiskCacheOptions};

use crate::logging::LogArgs;

/// Cache inspection actions.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CacheAction {
    /// Print the resolved cache directory.
    Dir,

    /// List cached checkpoint files.
    List,

    /// Delete all cached checkpoint files.
    Clear,
}

/// Args for the cache command.
#[derive(clap::Args, Debug)]
pub struct CacheArgs {
    /// Action to take.
    #[arg(value_enum)]
    action: CacheAction,

    /// Cache directory override.
    #[arg(long, default_value = None)]
    cache_dir: Option<String>,

    #[clap(flatten)]
    pub logging: LogArgs,
}

impl CacheArgs {
    fn build_cache(&self) -> anyhow::Result<CorpusmillDiskCache> {
        let cache_dir = match &self.cache_dir {
            Some(dir) => Some(shellexpand::full(dir)?.to_string()),
            None => None,
        };
        CorpusmillDiskCache::new(
            CorpusmillDiskCacheOptions::default().with_cache_dir(cache_dir.as_ref()),
        )
    }

    pub fn run(&self) -> anyhow::Result<()> {
        self.logging.setup_logging()?;

        let cache = self.build_cache()?;
        let cache_dir = cache.cache_dir();

        match self.action {
            CacheAction::Dir => {
                println!("{}", cache_dir.display());
            }
            CacheAction::List => {
                if !cache_dir.is_dir() {
                    log::info!("cache directory {} does not exist", cache_dir.display());
                    return Ok(());
                }
                for entry in fs::read_dir(cache_dir)? {
                    let entry = entry?;
                    let path = entry.path();
                    if path.extension().is_some_and(|ext| ext == "json") {
                        let size = entry.metadata()?.len();
                        println!("{}\t{size}", path.display());
                    }
                }
            }
            CacheAction::Clear => {
                if !cache_dir.is_dir() {
                    log::info!("cache directory {} does not exist", cache_dir.display());
                    return Ok(());
                }
                let mut removed = 0;
                for entry in fs::read_dir(cache_dir)? {
                    let path = entry?.path();
                    if path.extension().is_some_and(|ext| ext == "json") {
                        fs::remove_file(&path)?;
                        removed += 1;
                    }
                }
                log::info!("removed {removed} checkpoint files");
            }
        }

        Ok(())
    }
}
