//! # corpusmill-disk-cache
#![warn(missing_docs)]

use crate::path_resolver::PathResolver;

pub mod disk_cache;
pub mod jsonl;
pub mod path_resolver;

pub use disk_cache::{CorpusmillDiskCache, CorpusmillDiskCacheOptions};

/// Environment variable key to override the default cache directory.
pub const CORPUSMILL_CACHE_DIR: &str = "CORPUSMILL_CACHE_DIR";

/// Default [`PathResolver`] for corpusmill.
pub const CORPUSMILL_CACHE_CONFIG: PathResolver = PathResolver {
    qualifier: "io.crates.corpusmill",
    organization: "",
    application: "corpusmill",
    cache_env_vars: &[CORPUSMILL_CACHE_DIR],
};
