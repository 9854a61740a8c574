//! HTML index page rendering.
//!
//! Turns a finalized [`DirectoryMeta`] into one self-contained `index.html`
//! per directory using [maud](https://maud.lambda.xyz/) — compile-time
//! checked templates, auto-escaped interpolation, no template files to ship.
//! The stylesheet is embedded at compile time and inlined into every page,
//! so the generated site needs no asset requests to display.
//!
//! [`index_page`] is a pure function of the metadata, the directory path
//! (only consulted to resolve shortcut-file targets), the configuration,
//! and the per-run [`RunStamp`]. All file writing stays with the caller.
//!
//! The footer's `Generated on ...` line doubles as the marker the cleanup
//! sweep uses to tell generated index pages from hand-written ones.

use crate::classify::FileCategory;
use crate::config::{Config, ConfigFlag};
use crate::types::{DirectoryMeta, FileRecord, size_format};
use chrono::{DateTime, Utc};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::Path;

const CSS: &str = include_str!("../static/style.css");
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Wall-clock identity of one generator run, stamped into every footer.
/// Constructed once per run and passed down; pages from the same run carry
/// the same stamp.
#[derive(Debug, Clone)]
pub struct RunStamp(DateTime<Utc>);

impl RunStamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// ISO-8601 to second precision, e.g. `2026-08-07T12:30:05`.
    pub fn iso(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

/// Render the index page for one directory.
pub fn index_page(meta: &DirectoryMeta, dir: &Path, config: &Config, stamp: &RunStamp) -> String {
    let title = if meta.path == "." {
        config.name.clone()
    } else {
        format!("{}: {}", config.name, meta.path)
    };

    let markup = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body data-page-id=(meta.page_identity()) {
                @if !config.has_flag(ConfigFlag::HideTitle) {
                    header {
                        h1 { (config.display_name) }
                        @if meta.path != "." {
                            p.path { (meta.path) }
                        }
                    }
                }
                main {
                    table.listing {
                        thead {
                            tr {
                                th { "Name" }
                                th { "Size" }
                                th { "Type" }
                                th { "Modified" }
                            }
                        }
                        tbody {
                            @if meta.depth > 0 {
                                tr.parent {
                                    td { a href=".." { ".." } }
                                    td { "-" }
                                    td { "go back" }
                                    td { "-" }
                                }
                            }
                            @for record in &meta.directories {
                                (entry_row(record, dir))
                            }
                            @for record in &meta.files {
                                (entry_row(record, dir))
                            }
                        }
                    }
                    p.totals {
                        (meta.directories.len()) " directories, "
                        (meta.files.len()) " files, "
                        (size_format(meta.size, false))
                    }
                }
                @if !config.has_flag(ConfigFlag::HideGeneratedBy) {
                    footer {
                        p { "Generated on " (stamp.iso()) " by " (config.name) " v" (VERSION) }
                    }
                }
            }
        }
    };
    markup.into_string()
}

fn entry_row(record: &FileRecord, dir: &Path) -> Markup {
    let row_class = if record.is_file { "file" } else { "dir" };
    html! {
        tr class=(row_class) {
            td {
                a href=(entry_href(record, dir)) {
                    (record.name)
                    @if record.is_dir() { "/" }
                }
            }
            td { (size_format(record.size, false)) }
            td { (record.category) }
            td { (record.modified.format("%Y-%m-%d %H:%M:%S")) }
        }
    }
}

/// Link target for an entry. Shortcut files resolve to the URL they carry;
/// everything else links to itself, relative to the page.
fn entry_href(record: &FileRecord, dir: &Path) -> String {
    if record.category == FileCategory::Link
        && let Some(url) = read_url_file(&dir.join(&record.name))
    {
        return url;
    }
    if record.is_file {
        format!("./{}", record.name)
    } else {
        format!("./{}/", record.name)
    }
}

/// Extract the target URL from a `.url`/`.link` shortcut file.
///
/// Scans for a line whose head reads `url=` (case-insensitive, spaces
/// ignored, only the first 20 characters are considered) and returns the
/// value after the first `=`. Files over 1 MiB are not parsed. Purely
/// local; the URL is never fetched.
pub fn read_url_file(path: &Path) -> Option<String> {
    let meta = fs::metadata(path).ok()?;
    if meta.len() > 1024 * 1024 {
        log::debug!("Shortcut file too large to parse: {}", path.display());
        return None;
    }
    let content = fs::read_to_string(path).ok()?;
    for line in content.lines() {
        let head: String = line.chars().take(20).collect();
        if head.to_lowercase().replace(' ', "").starts_with("url=")
            && let Some(pos) = line.find('=')
        {
            let url = line[pos + 1..].trim();
            if !url.is_empty() {
                return Some(url.to_string());
            }
        }
    }
    None
}
