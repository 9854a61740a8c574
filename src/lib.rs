//! # dirdex
//!
//! A minimal static site generator for browsable HTML file indexes. Point
//! it at a directory and every subdirectory gains three artifacts: an
//! `index.html` listing its entries, a `.meta` JSON side-car describing
//! them, and a `.md5` manifest of content hashes. Drop the tree on any file
//! server and it browses like a classic directory listing, with stable
//! metadata other tools can consume.
//!
//! # Architecture: One Post-Order Walk
//!
//! Everything hangs off a single depth-first traversal of the source tree:
//!
//! ```text
//! for each directory, children first:
//!   classify + hash every file        (classify, cache)
//!   wrap each subdirectory's result   (scan)
//!   sort, sum sizes, fingerprint      (scan, types)
//!   write .meta / index.html / .md5   (scan, render)
//! ```
//!
//! Post-order matters: a directory's aggregated size and its content
//! fingerprint are only known once every descendant has been processed, so
//! each recursive call returns an owned, finalized [`types::DirectoryMeta`]
//! and the parent combines its children's results. There is no shared
//! mutable accumulator across stack frames.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | The traversal engine — skip rules, descriptor building, bottom-up aggregation, artifact writing |
//! | [`classify`] | Maps name/extension/MIME to one semantic [`classify::FileCategory`] |
//! | [`cache`] | MD5 content hashing behind a persistent, identity-keyed disk cache |
//! | [`types`] | `FileRecord`/`DirectoryMeta` and their serialized side-car shape |
//! | [`render`] | Maud templates producing the self-contained index pages |
//! | [`config`] | `.dirdex.toml` loading, display flags, side-car names |
//! | [`cleanup`] | Sweep deleting previously generated artifacts |
//! | [`output`] | CLI summary formatting (pure format functions + print wrappers) |
//!
//! # Design Decisions
//!
//! ## Identity-Keyed Hash Cache
//!
//! Content digests are cached on disk keyed by `(stem, size, mtime)` rather
//! than by path. Unchanged files are never re-read across runs — re-running
//! after an interrupted build only hashes what is actually new — and a
//! moved or renamed tree keeps its cache warm. Stale entries need no
//! expiry: a changed file has a changed key.
//!
//! ## Maud Over Template Engines
//!
//! Index pages are generated with [Maud](https://maud.lambda.xyz/):
//! malformed HTML is a compile error, interpolation is escaped by default,
//! and there is no theme directory to ship or get out of sync. The CSS is
//! inlined into every page, so the generated site works with zero asset
//! requests.
//!
//! ## Side-Cars Live Next to the Content
//!
//! By default the output root *is* the source root. The artifacts are
//! either dot-named (skipped by the hidden-entry rule) or explicitly
//! skipped by name during traversal, so a second run never indexes the
//! first run's output. `cleanup` reverses a build, refusing to delete any
//! `index.html` it didn't generate.

pub mod cache;
pub mod classify;
pub mod cleanup;
pub mod config;
pub mod output;
pub mod render;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
