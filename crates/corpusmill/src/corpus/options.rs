//! # Corpus Construction Options

use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;

/// How a corpus selects its sample from the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleMode {
    /// Take the first `max_instance` qualifying records; may stop early.
    #[default]
    Prefix,

    /// Uniform random subset via one full pass.
    ///
    /// Eager corpora use the standard online reservoir algorithm. Lazy
    /// corpora instead draw `max_instance` records with replacement after
    /// a full read; the two are not distributionally equivalent.
    Reservoir,
}

impl SampleMode {
    /// Stable lowercase name, used in cache fingerprints.
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleMode::Prefix => "prefix",
            SampleMode::Reservoir => "reservoir",
        }
    }
}

/// Options shared by all corpus variants.
#[derive(Debug, Clone, Default)]
pub struct CorpusOptions {
    /// Sample size bound; `None` is unbounded.
    pub max_instance: Option<usize>,

    /// The sampling mode.
    pub mode: SampleMode,

    /// Whether to check/write the checkpoint cache.
    ///
    /// Ignored (forced off, with a warning) by lazy corpora.
    pub use_cache: Option<bool>,

    /// Explicit cache directory; `None` resolves via
    /// [`CorpusmillDiskCache`](corpusmill_disk_cache::CorpusmillDiskCache).
    pub cache_dir: Option<PathBuf>,

    /// RNG seed for deterministic sampling; `None` seeds from the OS.
    pub seed: Option<u64>,

    /// Whether to display live sampling progress.
    pub progress: Option<bool>,
}

impl CorpusOptions {
    /// Set the sample size bound.
    pub fn with_max_instance(
        mut self,
        max_instance: Option<usize>,
    ) -> Self {
        self.max_instance = max_instance;
        self
    }

    /// Set the sampling mode.
    pub fn with_mode(
        mut self,
        mode: SampleMode,
    ) -> Self {
        self.mode = mode;
        self
    }

    /// Set whether the checkpoint cache is used.
    pub fn with_use_cache(
        mut self,
        use_cache: bool,
    ) -> Self {
        self.use_cache = Some(use_cache);
        self
    }

    /// Set an explicit cache directory.
    pub fn with_cache_dir<P: AsRef<Path>>(
        mut self,
        cache_dir: Option<P>,
    ) -> Self {
        self.cache_dir = cache_dir.map(|p| p.as_ref().to_path_buf());
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(
        mut self,
        seed: Option<u64>,
    ) -> Self {
        self.seed = seed;
        self
    }

    /// Set whether live progress is displayed.
    pub fn with_progress(
        mut self,
        progress: bool,
    ) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Whether the checkpoint cache is used (default: `true`).
    pub fn use_cache(&self) -> bool {
        self.use_cache.unwrap_or(true)
    }

    /// Whether live progress is displayed (default: `true`).
    pub fn progress(&self) -> bool {
        self.progress.unwrap_or(true)
    }

    /// Build the sampling RNG.
    pub(crate) fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
