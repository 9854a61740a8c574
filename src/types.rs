//! Metadata records serialized into the per-directory side-car files.
//!
//! [`FileRecord`] describes one filesystem entry; [`DirectoryMeta`] is the
//! aggregated record for one directory. Both serialize to the exact nested
//! key-value shape consumed by the rendered pages and any external tooling
//! reading the `.meta` files, so field order and omission rules here are
//! part of the output format:
//!
//! ```json
//! {
//!   "path": "photos/2024",
//!   "depth": 2,
//!   "thumbnail": { "dir": ".thumbs", "sm": "image.png", "md": "dawn.md.jpg", "lg": "dawn.lg.jpg" },
//!   "media": true,
//!   "directories": [ ... ],
//!   "files": [
//!     {
//!       "name": "dawn.jpg", "file": true, "size": 48213,
//!       "hash": "3fa1...", "ext": "jpg", "type": "image", "mime": "image/jpeg",
//!       "created": "2024-05-01T09:00:00", "modified": "2024-05-01T09:00:00",
//!       "thumbnail": { "sm": "image.png", "md": "dawn.md.jpg", "lg": "dawn.lg.jpg" }
//!     }
//!   ],
//!   "size": 48213
//! }
//! ```
//!
//! Records are built fresh from the live filesystem on every run and never
//! mutated after construction, except for the directory sizes the scan
//! fills in bottom-up.

use crate::classify::FileCategory;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Serialize, Serializer};

/// Serialize a timestamp as `YYYY-MM-DDTHH:MM:SS` — UTC, second precision,
/// no offset suffix.
fn timestamp<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&value.format("%Y-%m-%dT%H:%M:%S"))
}

/// Timestamp from whole seconds since the Unix epoch.
pub fn timestamp_from_unix(secs: u64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs as i64, 0).single().unwrap_or_default()
}

/// Thumbnail names derived for an entry. Only the rendering stage resolves
/// these against actual image files; the scan just derives the names.
#[derive(Debug, Clone, Serialize)]
pub struct ThumbnailKeys {
    /// Generic icon per category, e.g. `image.png`.
    pub sm: String,
    pub md: String,
    pub lg: String,
}

impl ThumbnailKeys {
    /// Derive the three names from the entry's category and filename stem.
    /// Spaces in the stem become underscores.
    pub fn derive(category: FileCategory, stem: &str) -> Self {
        let base = stem.replace(' ', "_");
        Self {
            sm: format!("{category}.png"),
            md: format!("{base}.md.jpg"),
            lg: format!("{base}.lg.jpg"),
        }
    }
}

/// One filesystem entry, file or directory.
///
/// For directories, `hash`/`ext`/`mime` are null and `size` is the
/// aggregated subtree size filled in by the scan (not the stat size).
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    pub name: String,
    /// True for anything that is not a directory.
    #[serde(rename = "file")]
    pub is_file: bool,
    pub size: u64,
    /// Lowercase hex content digest; files only.
    pub hash: Option<String>,
    /// Lowercase extension without the dot; empty when the name has none.
    pub ext: Option<String>,
    #[serde(rename = "type")]
    pub category: FileCategory,
    /// Best-effort MIME guess from the name; empty when unknown.
    pub mime: Option<String>,
    /// Creation time, truncated to whole seconds. Filesystems without a
    /// creation field report the Unix epoch here.
    #[serde(serialize_with = "timestamp")]
    pub created: DateTime<Utc>,
    #[serde(serialize_with = "timestamp")]
    pub modified: DateTime<Utc>,
    pub thumbnail: ThumbnailKeys,
}

impl FileRecord {
    pub fn is_dir(&self) -> bool {
        !self.is_file
    }
}

/// Thumbnail block of a media-dominant directory: the thumbnails directory
/// name plus the key names taken from the first file in sorted order.
#[derive(Debug, Clone, Serialize)]
pub struct DirThumbnail {
    pub dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lg: Option<String>,
}

/// Aggregated metadata for one directory.
#[derive(Debug, Serialize)]
pub struct DirectoryMeta {
    /// Path relative to the source root; `.` for the root itself.
    pub path: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<DirThumbnail>,
    pub media: bool,
    /// Immediate subdirectories, sorted by name, each carrying its
    /// aggregated subtree size.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub directories: Vec<FileRecord>,
    /// Immediate files, sorted by name.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileRecord>,
    /// Sum of file sizes plus subdirectory aggregate sizes.
    pub size: u64,
    /// Content-state digest over sorted child names and hashes. Used for
    /// change detection and the page identity; never serialized.
    #[serde(skip)]
    pub fingerprint: String,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl DirectoryMeta {
    /// Cache-busting display identifier exposed to the renderer:
    /// `<hash8>-d<dirs>f<files>-<rounded size>`, e.g. `a1b2c3d4-d3f12-5mb`.
    pub fn page_identity(&self) -> String {
        format!(
            "{}-d{}f{}-{}",
            &self.fingerprint[..8],
            self.directories.len(),
            self.files.len(),
            size_format(self.size, true).to_lowercase()
        )
    }
}

/// More than 80% of the files are image/audio/video, by integer-truncating
/// percentage: exactly 80% is not dominant. False for an empty list.
pub fn media_dominant(files: &[FileRecord]) -> bool {
    let total = files.len() as u64;
    if total == 0 {
        return false;
    }
    let media = files.iter().filter(|f| f.category.is_media()).count() as u64;
    media * 100 / total > 80
}

/// Human-readable size. Two decimals for display (`4.21MB`); with `round`,
/// the ceiling integer form used in page identities (`5MB`). Sizes up to a
/// mebibyte render in KB.
pub fn size_format(size: u64, round: bool) -> String {
    const KIB: u64 = 1024;
    let value = size as f64;
    let (scaled, unit) = if size > KIB * KIB * KIB {
        (value / (KIB * KIB * KIB) as f64, "GB")
    } else if size > KIB * KIB {
        (value / (KIB * KIB) as f64, "MB")
    } else {
        (value / KIB as f64, "KB")
    };
    if round {
        format!("{}{}", scaled.ceil() as u64, unit)
    } else {
        format!("{scaled:.2}{unit}")
    }
}
