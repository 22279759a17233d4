//! # App Path Resolver
//!
//! Static library defaults for cache directory resolution.

use directories_next::ProjectDirs;
use std::env;
use std::path::{Path, PathBuf};

/// Static configuration for application path resolution.
pub struct PathResolver {
    /// The qualifier for [`ProjectDirs`].
    pub qualifier: &'static str,

    /// The organization for [`ProjectDirs`].
    pub organization: &'static str,

    /// The application for [`ProjectDirs`].
    pub application: &'static str,

    /// The resolution order for cache directory environment variables.
    pub cache_env_vars: &'static [&'static str],
}

impl PathResolver {
    /// Get the [`ProjectDirs`] for this config.
    pub fn project_dirs(&self) -> Option<ProjectDirs> {
        ProjectDirs::from(self.organization, self.application, self.qualifier)
    }

    /// Resolve the cache directory for this config.
    ///
    /// Resolution Order:
    /// 1. `path`, if present.
    /// 2. ``env[$VAR]`` for each `self.cache_env_vars`; in order.
    /// 3. `self.project_dirs().cache_dir()`, if present.
    /// 4. `None`
    pub fn resolve_cache_dir<P: AsRef<Path>>(
        &self,
        path: Option<P>,
    ) -> Option<PathBuf> {
        if let Some(path) = path.as_ref() {
            return Some(path.as_ref().to_path_buf());
        }

        for env_var in self.cache_env_vars {
            if let Ok(path) = env::var(env_var) {
                return Some(PathBuf::from(path));
            }
        }

        if let Some(pds) = self.project_dirs() {
            return Some(pds.cache_dir().to_path_buf());
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use std::env;
    use std::path::PathBuf;

    use crate::{CORPUSMILL_CACHE_CONFIG, CORPUSMILL_CACHE_DIR};

    #[test]
    #[serial]
    fn test_resolve_cache_dir() {
        let orig = env::var(CORPUSMILL_CACHE_DIR);

        let user_dir = PathBuf::from("/tmp/corpusmill/cache");
        let env_dir = PathBuf::from("/tmp/corpusmill/env_cache");

        unsafe {
            env::remove_var(CORPUSMILL_CACHE_DIR);
        }

        assert_eq!(
            CORPUSMILL_CACHE_CONFIG.resolve_cache_dir(Some(&user_dir)),
            Some(user_dir.clone()),
        );

        let pds = CORPUSMILL_CACHE_CONFIG
            .project_dirs()
            .expect("failed to get project dirs");
        assert_eq!(
            CORPUSMILL_CACHE_CONFIG.resolve_cache_dir(None::<PathBuf>),
            Some(pds.cache_dir().to_path_buf()),
        );

        unsafe {
            env::set_var(CORPUSMILL_CACHE_DIR, env_dir.to_str().unwrap());
        }

        assert_eq!(
            CORPUSMILL_CACHE_CONFIG.resolve_cache_dir(Some(&user_dir)),
            Some(user_dir),
        );
        assert_eq!(
            CORPUSMILL_CACHE_CONFIG.resolve_cache_dir(None::<PathBuf>),
            Some(env_dir),
        );

        match orig {
            Ok(original) => unsafe { env::set_var(CORPUSMILL_CACHE_DIR, original) },
            Err(_) => unsafe { env::remove_var(CORPUSMILL_CACHE_DIR) },
        }
    }
}
