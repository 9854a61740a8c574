//! Directory traversal and metadata aggregation.
//!
//! The heart of the generator: a depth-first, post-order walk of the source
//! tree. Each directory is fully aggregated — children described, sizes
//! summed bottom-up, listings sorted, content fingerprint computed — before
//! its artifacts are written, so a directory's metadata always reflects a
//! complete subtree.
//!
//! ## Traversal rules
//!
//! Per direct child of a directory:
//!
//! - Names starting with `.` or `__` are skipped (hidden/internal
//!   convention; this also keeps the metadata and hash side-cars out).
//! - At the source root only, the configured assets directory is skipped so
//!   the tool never indexes its own generated assets.
//! - The three side-car names (metadata file, hash manifest, index page)
//!   are skipped wherever they appear, so previous runs are not re-indexed.
//! - Subdirectories recurse first; the child's aggregated size is carried
//!   on the directory's own [`FileRecord`].
//! - Sibling files are described and hashed in parallel via rayon. The
//!   final listings are sorted by name after all children complete, so the
//!   order never depends on worker scheduling.
//!
//! ## Artifacts
//!
//! With writing enabled, each directory gets its metadata side-car (written
//! atomically — temp file plus rename, never half-written), its rendered
//! index page (refused when it already exists, unless `--force`), and, when
//! the directory has files, a hash manifest of `<hash>  <name>` lines.
//!
//! ## Errors
//!
//! Every failure carries the path that caused it. An error in a subtree
//! aborts that subtree's aggregation and propagates; artifacts already
//! written for completed sibling directories stay valid. Re-running is
//! idempotent: hashing is cache-accelerated and side-cars are regenerated
//! whole, never patched.

use crate::cache::{self, HashCache};
use crate::classify::{self, FileCategory};
use crate::config::Config;
use crate::render::{self, RunStamp};
use crate::types::{
    DirThumbnail, DirectoryMeta, FileRecord, ThumbnailKeys, media_dominant, timestamp_from_unix,
};
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Source path not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("File exists: {0} (pass --force to overwrite)")]
    Exists(PathBuf),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn io_at(path: &Path, source: io::Error) -> ScanError {
    ScanError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// One directory visited during the walk, for the run summary.
#[derive(Debug)]
pub struct DirSummary {
    pub path: String,
    pub depth: usize,
    pub dir_count: usize,
    pub file_count: usize,
    pub size: u64,
}

/// The traversal engine. Owns nothing heavier than references to the run
/// configuration and the hash cache; construct one per run.
pub struct Indexer<'a> {
    config: &'a Config,
    cache: &'a HashCache,
    stamp: RunStamp,
    write: bool,
    summaries: Vec<DirSummary>,
}

impl<'a> Indexer<'a> {
    /// With `write` disabled the walk still classifies, hashes, and
    /// aggregates, but leaves the filesystem untouched (the `check`
    /// command).
    pub fn new(config: &'a Config, cache: &'a HashCache, write: bool) -> Self {
        Self {
            config,
            cache,
            stamp: RunStamp::now(),
            write,
            summaries: Vec::new(),
        }
    }

    /// Walk the source tree and return the root metadata record.
    pub fn run(&mut self) -> Result<DirectoryMeta, ScanError> {
        if !self.config.source.is_dir() {
            return Err(ScanError::NotFound(self.config.source.clone()));
        }
        let source = self.config.source.clone();
        self.index_dir(&source, 0)
    }

    /// Directories visited so far, in visit (pre-)order.
    pub fn summaries(&self) -> &[DirSummary] {
        &self.summaries
    }

    fn index_dir(&mut self, dir: &Path, depth: usize) -> Result<DirectoryMeta, ScanError> {
        let rel = self.relative_name(dir);
        log::info!("Processing {rel} (depth={depth})");

        // Reserve the summary slot now so the list reads in visit order,
        // parents before children; counts are filled in below.
        let slot = self.summaries.len();
        self.summaries.push(DirSummary {
            path: rel.clone(),
            depth,
            dir_count: 0,
            file_count: 0,
            size: 0,
        });

        let (subdir_paths, file_paths) = self.collect_entries(dir, depth)?;

        let mut directories = Vec::with_capacity(subdir_paths.len());
        let mut child_prints = Vec::with_capacity(subdir_paths.len());
        for sub in &subdir_paths {
            let child = self.index_dir(sub, depth + 1)?;
            let mut record = describe(sub, self.cache)?;
            record.size = child.size;
            child_prints.push((record.name.clone(), child.fingerprint));
            directories.push(record);
        }

        let cache = self.cache;
        let mut files: Vec<FileRecord> = file_paths
            .par_iter()
            .map(|path| describe(path, cache))
            .collect::<Result<_, _>>()?;

        directories.sort_by(|a, b| a.name.cmp(&b.name));
        child_prints.sort_by(|a, b| a.0.cmp(&b.0));
        files.sort_by(|a, b| a.name.cmp(&b.name));

        let size = files.iter().map(|f| f.size).sum::<u64>()
            + directories.iter().map(|d| d.size).sum::<u64>();
        let media = media_dominant(&files);
        let fingerprint = fingerprint(&child_prints, &files);
        let thumbnail = media.then(|| DirThumbnail {
            dir: self.config.thumbs_dir.clone(),
            sm: files.first().map(|f| f.thumbnail.sm.clone()),
            md: files.first().map(|f| f.thumbnail.md.clone()),
            lg: files.first().map(|f| f.thumbnail.lg.clone()),
        });

        let meta = DirectoryMeta {
            path: rel,
            depth,
            thumbnail,
            media,
            directories,
            files,
            size,
            fingerprint,
        };

        let summary = &mut self.summaries[slot];
        summary.dir_count = meta.directories.len();
        summary.file_count = meta.files.len();
        summary.size = meta.size;

        if self.write {
            self.write_artifacts(dir, &meta)?;
        }
        Ok(meta)
    }

    /// Direct children of `dir` split into subdirectories and files, with
    /// the skip rules applied, each list sorted by path.
    fn collect_entries(
        &self,
        dir: &Path,
        depth: usize,
    ) -> Result<(Vec<PathBuf>, Vec<PathBuf>), ScanError> {
        let mut subdirs = Vec::new();
        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| io_at(dir, e))? {
            let entry = entry.map_err(|e| io_at(dir, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') || name.starts_with("__") {
                log::debug!("Skipping hidden entry: {name}");
                continue;
            }
            if depth == 0 && name == self.config.assets_dir {
                log::debug!("Skipping assets directory: {name}");
                continue;
            }
            if self.config.is_sidecar(&name) {
                continue;
            }
            let path = entry.path();
            // Follows symlinks, like the rest of the walk; a broken link
            // fails later in describe() with the path attached.
            if path.is_dir() {
                subdirs.push(path);
            } else {
                files.push(path);
            }
        }
        subdirs.sort();
        files.sort();
        Ok((subdirs, files))
    }

    fn write_artifacts(&self, dir: &Path, meta: &DirectoryMeta) -> Result<(), ScanError> {
        let out_dir = if meta.path == "." {
            self.config.output.clone()
        } else {
            self.config.output.join(&meta.path)
        };
        fs::create_dir_all(&out_dir).map_err(|e| io_at(&out_dir, e))?;

        let meta_path = out_dir.join(&self.config.meta_file);
        log::info!("Writing metadata file {}", meta_path.display());
        let json = serde_json::to_string_pretty(meta)?;
        cache::write_atomic(&meta_path, json.as_bytes()).map_err(|e| io_at(&meta_path, e))?;

        let index_path = out_dir.join(&self.config.index_file);
        if index_path.exists() && !self.config.force {
            return Err(ScanError::Exists(index_path));
        }
        log::info!("Writing index file {}", index_path.display());
        let page = render::index_page(meta, dir, self.config, &self.stamp);
        fs::write(&index_path, page).map_err(|e| io_at(&index_path, e))?;

        if !meta.files.is_empty() {
            let hash_path = out_dir.join(&self.config.hash_file);
            log::info!("Writing hash manifest {}", hash_path.display());
            let mut manifest = String::new();
            for file in &meta.files {
                if let Some(hash) = &file.hash {
                    manifest.push_str(hash);
                    manifest.push_str("  ");
                    manifest.push_str(&file.name);
                    manifest.push('\n');
                }
            }
            fs::write(&hash_path, manifest).map_err(|e| io_at(&hash_path, e))?;
        }
        Ok(())
    }

    fn relative_name(&self, dir: &Path) -> String {
        let rel = dir.strip_prefix(&self.config.source).unwrap_or(dir);
        if rel.as_os_str().is_empty() {
            ".".to_string()
        } else {
            rel.to_string_lossy().into_owned()
        }
    }
}

/// Build the metadata record for a single filesystem entry.
///
/// Stats the entry (following symlinks), classifies it, and for files
/// computes the content hash through the cache. Directory records come back
/// with size 0; the aggregator fills in the subtree size.
pub fn describe(path: &Path, cache: &HashCache) -> Result<FileRecord, ScanError> {
    let meta = fs::metadata(path).map_err(|e| io_at(path, e))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let created = timestamp_from_unix(meta.created().map(cache::system_time_secs).unwrap_or(0));
    let modified = timestamp_from_unix(meta.modified().map(cache::system_time_secs).unwrap_or(0));

    if meta.is_dir() {
        return Ok(FileRecord {
            name,
            is_file: false,
            size: 0,
            hash: None,
            ext: None,
            category: FileCategory::Directory,
            mime: None,
            created,
            modified,
            thumbnail: ThumbnailKeys::derive(FileCategory::Directory, &stem),
        });
    }

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let mime = mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_lowercase())
        .unwrap_or_default();
    let category = classify::classify(&name, &ext, &mime);
    log::debug!("File: {} ({category})", path.display());
    let hash = cache.hash_file(path).map_err(|e| io_at(path, e))?;

    Ok(FileRecord {
        name,
        is_file: true,
        size: meta.len(),
        hash: Some(hash),
        ext: Some(ext),
        category,
        mime: Some(mime),
        created,
        modified,
        thumbnail: ThumbnailKeys::derive(category, &stem),
    })
}

/// Content-state digest of a directory, through the same digest function as
/// content hashing. Input: per subdirectory in sorted order, its name and
/// its own fingerprint; then file content hashes in sorted order. Including
/// the child fingerprints makes a change anywhere in a subtree visible in
/// every ancestor's fingerprint.
fn fingerprint(subdirs: &[(String, String)], files: &[FileRecord]) -> String {
    let mut joined = String::new();
    for (name, print) in subdirs {
        joined.push_str(name);
        joined.push_str(print);
    }
    for file in files {
        if let Some(hash) = &file.hash {
            joined.push_str(hash);
        }
    }
    cache::hash_str(&joined)
}
