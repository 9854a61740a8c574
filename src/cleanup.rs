//! Deletion of previously generated artifacts.
//!
//! The inverse of a build: sweep the output tree and remove everything this
//! tool writes — per-directory metadata side-cars, hash manifests, index
//! pages, thumbnail directories, and the root assets directory. Collection
//! and deletion are separate steps so the CLI can show the full list and
//! ask for confirmation in between.
//!
//! Index pages get one safeguard: a file named like the index artifact is
//! only deleted when its content carries the `Generated on ...` footer the
//! renderer writes, so a hand-written `index.html` survives the sweep.

use crate::config::Config;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Artifact paths collected for deletion.
#[derive(Debug, Default)]
pub struct Targets {
    pub directories: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
}

impl Targets {
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty() && self.files.is_empty()
    }
}

/// Collect generated artifacts under the output root: every directory named
/// like the thumbnails directory, every file named like one of the three
/// side-cars, and the root-level assets directory.
pub fn collect(config: &Config) -> Targets {
    let root = &config.output;
    let mut targets = Targets::default();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(Result::ok)
    {
        let name = entry.file_name().to_string_lossy();
        if entry.file_type().is_dir() {
            if name == config.thumbs_dir {
                targets.directories.push(entry.into_path());
            }
        } else if config.is_sidecar(&name) {
            targets.files.push(entry.into_path());
        }
    }
    let assets = root.join(&config.assets_dir);
    if assets.is_dir() {
        targets.directories.push(assets);
    }
    targets
}

/// Outcome of one sweep.
#[derive(Debug, Default)]
pub struct Report {
    pub deleted_dirs: usize,
    pub deleted_files: usize,
    /// Index-named files left alone because they lack the generated footer.
    pub skipped: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, io::Error)>,
}

/// Delete the collected artifacts. A failing path is recorded and the sweep
/// continues; nothing is retried.
pub fn run(targets: &Targets, config: &Config) -> Report {
    let mut report = Report::default();
    for dir in &targets.directories {
        if !dir.exists() {
            continue;
        }
        match fs::remove_dir_all(dir) {
            Ok(()) => {
                log::info!("Deleted directory {}", dir.display());
                report.deleted_dirs += 1;
            }
            Err(source) => report.failures.push((dir.clone(), source)),
        }
    }
    for file in &targets.files {
        if !file.exists() {
            continue;
        }
        let is_index = file
            .file_name()
            .map(|n| n.to_string_lossy() == config.index_file.as_str())
            .unwrap_or(false);
        if is_index && !is_generated_index(file) {
            log::info!("Keeping {} (not generated by this tool)", file.display());
            report.skipped.push(file.clone());
            continue;
        }
        match fs::remove_file(file) {
            Ok(()) => {
                log::info!("Deleted file {}", file.display());
                report.deleted_files += 1;
            }
            Err(source) => report.failures.push((file.clone(), source)),
        }
    }
    report
}

/// A generated index page carries the renderer's `Generated on ...` footer.
fn is_generated_index(path: &Path) -> bool {
    match fs::read_to_string(path) {
        Ok(content) => content.to_lowercase().contains("generated on"),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::Indexer;
    use crate::test_helpers::{build_tree, test_cache, test_config};

    fn built_tree() -> tempfile::TempDir {
        let tmp = build_tree(&[
            ("a.txt", "hello"),
            ("sub/b.jpg", "image"),
            ("sub/.thumbs/b.md.jpg", "thumb"),
        ]);
        let config = test_config(tmp.path());
        let (_guard, cache) = test_cache();
        Indexer::new(&config, &cache, true).run().unwrap();
        tmp
    }

    #[test]
    fn collect_finds_all_artifact_kinds() {
        let tmp = built_tree();
        fs::create_dir_all(tmp.path().join("assets")).unwrap();
        let config = test_config(tmp.path());
        let targets = collect(&config);

        let file_names: Vec<String> = targets
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        // Root and sub each have .meta + index.html; both have files so
        // both carry .md5 manifests.
        assert_eq!(file_names.iter().filter(|n| *n == ".meta").count(), 2);
        assert_eq!(file_names.iter().filter(|n| *n == ".md5").count(), 2);
        assert_eq!(file_names.iter().filter(|n| *n == "index.html").count(), 2);

        let dir_names: Vec<String> = targets
            .directories
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert!(dir_names.contains(&".thumbs".to_string()));
        assert!(dir_names.contains(&"assets".to_string()));
    }

    #[test]
    fn collect_empty_for_untouched_tree() {
        let tmp = build_tree(&[("plain.txt", "nothing generated")]);
        let config = test_config(tmp.path());
        assert!(collect(&config).is_empty());
    }

    #[test]
    fn run_deletes_generated_artifacts() {
        let tmp = built_tree();
        let config = test_config(tmp.path());
        let targets = collect(&config);
        let report = run(&targets, &config);

        assert!(report.failures.is_empty());
        assert!(report.skipped.is_empty());
        assert_eq!(report.deleted_dirs, 1);
        assert_eq!(report.deleted_files, 6);

        assert!(!tmp.path().join(".meta").exists());
        assert!(!tmp.path().join("index.html").exists());
        assert!(!tmp.path().join("sub/.thumbs").exists());
        // Content untouched.
        assert!(tmp.path().join("a.txt").exists());
        assert!(tmp.path().join("sub/b.jpg").exists());
    }

    #[test]
    fn hand_written_index_survives() {
        let tmp = build_tree(&[("docs/index.html", "<html>my own page</html>")]);
        let config = test_config(tmp.path());
        let targets = collect(&config);
        let report = run(&targets, &config);

        assert_eq!(report.deleted_files, 0);
        assert_eq!(report.skipped.len(), 1);
        assert!(tmp.path().join("docs/index.html").exists());
    }

    #[test]
    fn generated_footer_marks_index_for_deletion() {
        let tmp = build_tree(&[(
            "docs/index.html",
            "<footer>Generated on 2026-01-01T00:00:00 by dirdex v0.3.1</footer>",
        )]);
        let config = test_config(tmp.path());
        let report = run(&collect(&config), &config);

        assert_eq!(report.deleted_files, 1);
        assert!(!tmp.path().join("docs/index.html").exists());
    }
}
