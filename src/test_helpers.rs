//! Shared test utilities for the dirdex test suite.
//!
//! Builds throwaway source trees and run configurations so scan, cleanup,
//! and render tests stay short:
//!
//! ```rust
//! let tmp = build_tree(&[
//!     ("a.txt", "hello"),
//!     ("photos/dawn.jpg", "fake image"),
//! ]);
//! let config = test_config(tmp.path());
//! ```

use crate::cache::HashCache;
use crate::config::{Config, SiteConfig};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Create a temp directory populated from `(relative path, contents)`
/// pairs. Parent directories are created as needed; list a file inside a
/// directory to create the directory.
pub fn build_tree(entries: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (path, contents) in entries {
        let full = tmp.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full, contents).unwrap();
    }
    tmp
}

/// Default run configuration rooted at `source`, artifacts written back
/// into the source tree.
pub fn test_config(source: &Path) -> Config {
    Config::from_site(source.to_path_buf(), None, SiteConfig::default(), false).unwrap()
}

/// Like [`test_config`] but with `--force` semantics, for tests that build
/// the same tree twice.
pub fn test_config_forced(source: &Path) -> Config {
    Config::from_site(source.to_path_buf(), None, SiteConfig::default(), true).unwrap()
}

/// A hash cache in its own temp directory. Keep the returned guard alive
/// for as long as the cache is used.
pub fn test_cache() -> (TempDir, HashCache) {
    let tmp = TempDir::new().unwrap();
    let cache = HashCache::new(tmp.path().join("hashes"));
    (tmp, cache)
}
