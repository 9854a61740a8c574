//! Content hashing with a persistent on-disk cache.
//!
//! Hashing file contents is the expensive part of indexing a large tree, and
//! most files don't change between runs. This module computes MD5 digests
//! behind a cache keyed by *file identity* — stem, byte size, and
//! modification time — rather than by path, so a moved tree reuses its
//! cached digests and a touched or rewritten file naturally misses.
//!
//! ## Cache layout
//!
//! The cache key is itself an MD5 of the composite `"<stem>-<size>-<mtime>"`
//! string. Entries are sharded by the first two hex characters of the key to
//! bound directory fan-out:
//!
//! ```text
//! ~/.cache/dirdex/hashes/
//! ├── 3f/
//! │   └── 3fa1b2...        # file containing the content digest
//! └── c0/
//!     └── c04d5e...
//! ```
//!
//! A hit reads the stored digest without touching the source file at all.
//! A miss reads the file, digests it, and stores the result via a temp file
//! and rename, so concurrent rayon workers never observe a partial entry.
//!
//! There is no expiry: a changed size or mtime produces a different key, and
//! the stale entry is simply never addressed again.
//!
//! The cache is an explicit per-run object — construct one with
//! [`HashCache::for_user`] (or [`HashCache::new`] in tests) and pass it by
//! reference into the scan.

use md5::{Digest, Md5};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Persistent digest cache, safe to share across worker threads.
#[derive(Debug)]
pub struct HashCache {
    root: PathBuf,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl HashCache {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Cache rooted in the user cache directory, e.g. `~/.cache/dirdex/hashes`.
    pub fn for_user(app_name: &str) -> Self {
        let base = dirs::cache_dir().unwrap_or_else(std::env::temp_dir);
        Self::new(base.join(app_name).join("hashes"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Digest of a file's contents, served from the cache when the file's
    /// identity (stem, size, mtime) is unchanged.
    ///
    /// Any stat or read failure propagates; no fallback digest is produced.
    pub fn hash_file(&self, path: &Path) -> io::Result<String> {
        let meta = fs::metadata(path)?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mtime = meta.modified().map(system_time_secs).unwrap_or(0);
        let key = cache_key(&stem, meta.len(), mtime);
        let bucket = self.root.join(&key[..2]).join(&key);

        if let Ok(cached) = fs::read_to_string(&bucket) {
            let cached = cached.trim().to_string();
            if !cached.is_empty() {
                self.hits.fetch_add(1, Ordering::Relaxed);
                log::debug!("hash cache hit for {}", path.display());
                return Ok(cached);
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let digest = hash_bytes(&fs::read(path)?);
        log::debug!("hash cache store for {}: {}", path.display(), digest);
        if let Some(dir) = bucket.parent() {
            fs::create_dir_all(dir)?;
        }
        write_atomic(&bucket, digest.as_bytes())?;
        Ok(digest)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Cache-bucket identifier for a file identity.
pub fn cache_key(stem: &str, size: u64, mtime: u64) -> String {
    hash_str(&format!("{stem}-{size}-{mtime}"))
}

/// MD5 of a byte slice as a lowercase hex string.
pub fn hash_bytes(data: &[u8]) -> String {
    format!("{:x}", Md5::digest(data))
}

/// MD5 of a string's UTF-8 bytes as a lowercase hex string.
pub fn hash_str(data: &str) -> String {
    hash_bytes(data.as_bytes())
}

/// Write via a temp file in the same directory plus a rename, so readers
/// never observe a partially written file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}

/// Whole seconds since the Unix epoch; pre-epoch times collapse to 0.
pub fn system_time_secs(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Hit/miss summary of one run.
#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn total(&self) -> u64 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} hashed ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} hashed", self.misses)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cache_in(tmp: &TempDir) -> HashCache {
        HashCache::new(tmp.path().join("hashes"))
    }

    #[test]
    fn hash_bytes_is_lowercase_hex_md5() {
        // Well-known md5 of the empty input.
        assert_eq!(hash_bytes(b""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(hash_str("").len(), 32);
    }

    #[test]
    fn hash_file_deterministic() {
        let tmp = TempDir::new().unwrap();
        let cache = cache_in(&tmp);
        let path = tmp.path().join("data.bin");
        fs::write(&path, b"hello world").unwrap();

        let h1 = cache.hash_file(&path).unwrap();
        let h2 = cache.hash_file(&path).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 32);
        assert_eq!(h1, h1.to_lowercase());
    }

    #[test]
    fn second_lookup_is_a_cache_hit() {
        let tmp = TempDir::new().unwrap();
        let cache = cache_in(&tmp);
        let path = tmp.path().join("data.bin");
        fs::write(&path, b"contents").unwrap();

        cache.hash_file(&path).unwrap();
        cache.hash_file(&path).unwrap();

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn cached_digest_served_without_reading_contents() {
        // Seed the bucket for the file's identity with a sentinel digest;
        // if the lookup path works, the sentinel comes back instead of a
        // freshly computed hash of the real contents.
        let tmp = TempDir::new().unwrap();
        let cache = cache_in(&tmp);
        let path = tmp.path().join("photo.jpg");
        fs::write(&path, b"real image bytes").unwrap();

        let meta = fs::metadata(&path).unwrap();
        let mtime = system_time_secs(meta.modified().unwrap());
        let key = cache_key("photo", meta.len(), mtime);
        let bucket = cache.root().join(&key[..2]).join(&key);
        fs::create_dir_all(bucket.parent().unwrap()).unwrap();
        fs::write(&bucket, "feedfacefeedfacefeedfacefeedface").unwrap();

        let digest = cache.hash_file(&path).unwrap();
        assert_eq!(digest, "feedfacefeedfacefeedfacefeedface");
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn changed_size_recomputes() {
        let tmp = TempDir::new().unwrap();
        let cache = cache_in(&tmp);
        let path = tmp.path().join("data.bin");

        fs::write(&path, b"version one").unwrap();
        let h1 = cache.hash_file(&path).unwrap();

        // Different length guarantees a different identity even if the
        // mtime granularity swallows the rewrite.
        fs::write(&path, b"version two, longer").unwrap();
        let h2 = cache.hash_file(&path).unwrap();

        assert_ne!(h1, h2);
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn cache_key_varies_with_identity() {
        let base = cache_key("name", 10, 100);
        assert_ne!(base, cache_key("name", 11, 100));
        assert_ne!(base, cache_key("name", 10, 101));
        assert_ne!(base, cache_key("other", 10, 100));
        assert_eq!(base, cache_key("name", 10, 100));
    }

    #[test]
    fn buckets_are_sharded_by_key_prefix() {
        let tmp = TempDir::new().unwrap();
        let cache = cache_in(&tmp);
        let path = tmp.path().join("data.bin");
        fs::write(&path, b"shard me").unwrap();
        cache.hash_file(&path).unwrap();

        let meta = fs::metadata(&path).unwrap();
        let key = cache_key("data", meta.len(), system_time_secs(meta.modified().unwrap()));
        assert!(cache.root().join(&key[..2]).join(&key).is_file());
    }

    #[test]
    fn missing_file_propagates_error() {
        let tmp = TempDir::new().unwrap();
        let cache = cache_in(&tmp);
        assert!(cache.hash_file(&tmp.path().join("gone.bin")).is_err());
    }

    #[test]
    fn write_atomic_leaves_no_temp_file() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("out.txt");
        write_atomic(&target, b"payload").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "payload");
        let names: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["out.txt"]);
    }

    #[test]
    fn stats_display() {
        let stats = CacheStats { hits: 5, misses: 2 };
        assert_eq!(format!("{stats}"), "5 cached, 2 hashed (7 total)");
        let cold = CacheStats { hits: 0, misses: 3 };
        assert_eq!(format!("{cold}"), "3 hashed");
    }
}
