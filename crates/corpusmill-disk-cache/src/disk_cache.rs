//! # Corpusmill Disk Cache

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::CORPUSMILL_CACHE_CONFIG;

/// Options for [`CorpusmillDiskCache`].
#[derive(Clone, Default, Debug)]
pub struct CorpusmillDiskCacheOptions {
    /// Optional path to the cache directory.
    pub cache_dir: Option<PathBuf>,
}

impl CorpusmillDiskCacheOptions {
    /// Set the cache directory.
    pub fn with_cache_dir<P: AsRef<Path>>(
        mut self,
        cache_dir: Option<P>,
    ) -> Self {
        self.cache_dir = cache_dir.map(|p| p.as_ref().to_path_buf());
        self
    }
}

/// Disk cache for sampled corpus checkpoints.
///
/// Checkpoints are content-addressed: callers derive a hex fingerprint from
/// their configuration and source data, and the cache maps that fingerprint
/// to a stable file path under the resolved cache directory. Files are
/// written once and never updated in place; a changed fingerprint produces
/// a new file.
///
/// Uses [`PathResolver`](`crate::path_resolver::PathResolver`) for resolving
/// a cache path appropriate for a user/system combo, and any environment
/// overrides.
#[derive(Debug, Clone)]
pub struct CorpusmillDiskCache {
    /// Cache directory.
    cache_dir: PathBuf,
}

impl Default for CorpusmillDiskCache {
    fn default() -> Self {
        Self::new(CorpusmillDiskCacheOptions::default()).unwrap()
    }
}

impl CorpusmillDiskCache {
    /// Construct a new [`CorpusmillDiskCache`].
    pub fn new(options: CorpusmillDiskCacheOptions) -> anyhow::Result<Self> {
        let cache_dir = CORPUSMILL_CACHE_CONFIG
            .resolve_cache_dir(options.cache_dir)
            .context("failed to resolve cache directory")?;

        Ok(Self { cache_dir })
    }

    /// Get the cache directory.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Get the cache path for the given key.
    ///
    /// * Does not check that the path exists.
    /// * Does not initialize the containing directories.
    ///
    /// # Arguments
    /// * `context` - prefix dirs, inserted between `self.cache_dir` and `file`.
    /// * `file` - the final file name.
    pub fn cache_path<C, F>(
        &self,
        context: &[C],
        file: F,
    ) -> PathBuf
    where
        C: AsRef<Path>,
        F: AsRef<Path>,
    {
        let mut path = self.cache_dir.clone();
        path.extend(context.iter().map(AsRef::as_ref));
        path.push(file.as_ref());
        path
    }

    /// Get the checkpoint path for a hex fingerprint.
    ///
    /// The path is `<cache_dir>/<fingerprint>.json`; existence is not checked.
    pub fn checkpoint_path(
        &self,
        fingerprint: &str,
    ) -> PathBuf {
        self.cache_dir.join(format!("{fingerprint}.json"))
    }

    /// Check whether a checkpoint exists for a hex fingerprint.
    pub fn has_checkpoint(
        &self,
        fingerprint: &str,
    ) -> bool {
        self.checkpoint_path(fingerprint).exists()
    }

    /// Create the cache directory, and any missing parents.
    pub fn ensure_cache_dir(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.cache_dir)
            .with_context(|| format!("failed to create {}", self.cache_dir.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use crate::disk_cache::{CorpusmillDiskCache, CorpusmillDiskCacheOptions};

    #[test]
    fn test_checkpoint_path() {
        let tmp = TempDir::new("corpusmill-cache").unwrap();
        let cache = CorpusmillDiskCache::new(
            CorpusmillDiskCacheOptions::default().with_cache_dir(Some(tmp.path())),
        )
        .unwrap();

        let path = cache.checkpoint_path("deadbeef");
        assert_eq!(path, tmp.path().join("deadbeef.json"));
        assert!(!cache.has_checkpoint("deadbeef"));

        cache.ensure_cache_dir().unwrap();
        std::fs::write(&path, "{}\n").unwrap();
        assert!(cache.has_checkpoint("deadbeef"));
    }

    #[test]
    fn test_cache_path() {
        let tmp = TempDir::new("corpusmill-cache").unwrap();
        let cache = CorpusmillDiskCache::new(
            CorpusmillDiskCacheOptions::default().with_cache_dir(Some(tmp.path())),
        )
        .unwrap();

        let path = cache.cache_path(&["prefix"], "file.json");
        assert_eq!(path, tmp.path().join("prefix").join("file.json"));

        let path = cache.cache_path(&["a", "b"], "file.json");
        assert_eq!(path, tmp.path().join("a").join("b").join("file.json"));

        let path = cache.cache_path(&[] as &[&str], "file.json");
        assert_eq!(path, tmp.path().join("file.json"));
    }
}
