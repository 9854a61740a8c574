//! Run configuration and display flags.
//!
//! Configuration comes from two layers. An optional `.dirdex.toml` at the
//! source root provides site-level values; CLI arguments override it. The
//! file is dot-named on purpose: the traversal's hidden-entry rule keeps it
//! out of the generated index.
//!
//! ```toml
//! # All keys are optional - defaults shown below
//! name = "dirdex"              # Site name (page titles, footer)
//! display_name = "dirdex"      # Heading shown on every page
//! meta_file = ".meta"          # Per-directory metadata side-car
//! hash_file = ".md5"           # Per-directory hash manifest
//! index_file = "index.html"    # Generated index page
//! thumbs_dir = ".thumbs"       # Thumbnail directory name
//! assets_dir = "assets"        # Skipped at the source root, removed by cleanup
//! flags = []                   # e.g. ["hide-title", "hide-generated-by"]
//! ```
//!
//! Config files are sparse — set just the keys you want. Unknown keys are
//! rejected to catch typos early, and an unrecognized flag value is a
//! startup error, before any traversal begins.

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the optional config file at the source root.
pub const CONFIG_FILE: &str = ".dirdex.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Unknown flag '{value}' (expected one of: {allowed})")]
    UnknownFlag { value: String, allowed: String },
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Display flags recognized by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFlag {
    /// Reserved: include hidden entries in listings. Accepted so existing
    /// invocations keep working, but the traversal does not consult it yet.
    ShowHidden,
    /// Suppress the `Generated on ...` footer line.
    HideGeneratedBy,
    /// Suppress the page heading block.
    HideTitle,
}

impl ConfigFlag {
    pub const ALL: [ConfigFlag; 3] = [
        ConfigFlag::ShowHidden,
        ConfigFlag::HideGeneratedBy,
        ConfigFlag::HideTitle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigFlag::ShowHidden => "show-hidden",
            ConfigFlag::HideGeneratedBy => "hide-generated-by",
            ConfigFlag::HideTitle => "hide-title",
        }
    }

    /// Parse a flag value; unknown values are a validation error listing
    /// the accepted spellings.
    pub fn parse(value: &str) -> Result<ConfigFlag, ConfigError> {
        let normalized = value.trim().to_lowercase();
        ConfigFlag::ALL
            .iter()
            .copied()
            .find(|flag| flag.as_str() == normalized)
            .ok_or_else(|| ConfigError::UnknownFlag {
                value: value.trim().to_string(),
                allowed: ConfigFlag::ALL.map(ConfigFlag::as_str).join(", "),
            })
    }
}

impl fmt::Display for ConfigFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values loadable from `.dirdex.toml`. Sparse; unknown keys rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub name: String,
    pub display_name: String,
    pub meta_file: String,
    pub hash_file: String,
    pub index_file: String,
    pub thumbs_dir: String,
    pub assets_dir: String,
    pub flags: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "dirdex".to_string(),
            display_name: "dirdex".to_string(),
            meta_file: ".meta".to_string(),
            hash_file: ".md5".to_string(),
            index_file: "index.html".to_string(),
            thumbs_dir: ".thumbs".to_string(),
            assets_dir: "assets".to_string(),
            flags: Vec::new(),
        }
    }
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub source: PathBuf,
    /// Artifact destination root; defaults to the source itself, so the
    /// side-cars land next to the content they describe.
    pub output: PathBuf,
    pub name: String,
    pub display_name: String,
    pub meta_file: String,
    pub hash_file: String,
    pub index_file: String,
    pub thumbs_dir: String,
    pub assets_dir: String,
    /// Overwrite existing index files instead of refusing.
    pub force: bool,
    pub flags: Vec<ConfigFlag>,
}

impl Config {
    /// Resolve site values and CLI-level settings into a run configuration,
    /// validating flag spellings and side-car names up front.
    pub fn from_site(
        source: PathBuf,
        output: Option<PathBuf>,
        site: SiteConfig,
        force: bool,
    ) -> Result<Self, ConfigError> {
        let mut flags = Vec::new();
        for value in &site.flags {
            let flag = ConfigFlag::parse(value)?;
            if !flags.contains(&flag) {
                flags.push(flag);
            }
        }
        for (key, value) in [
            ("meta_file", &site.meta_file),
            ("hash_file", &site.hash_file),
            ("index_file", &site.index_file),
            ("thumbs_dir", &site.thumbs_dir),
            ("assets_dir", &site.assets_dir),
        ] {
            if value.is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        let output = output.unwrap_or_else(|| source.clone());
        Ok(Self {
            source,
            output,
            name: site.name,
            display_name: site.display_name,
            meta_file: site.meta_file,
            hash_file: site.hash_file,
            index_file: site.index_file,
            thumbs_dir: site.thumbs_dir,
            assets_dir: site.assets_dir,
            force,
            flags,
        })
    }

    pub fn has_flag(&self, flag: ConfigFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// Whether a name is one of the side-car files this tool writes itself.
    pub fn is_sidecar(&self, name: &str) -> bool {
        name == self.meta_file || name == self.hash_file || name == self.index_file
    }
}

/// Load the site config from `<root>/.dirdex.toml`, or defaults when the
/// file does not exist.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(SiteConfig::default());
    }
    let content = fs::read_to_string(&path)?;
    let site: SiteConfig = toml::from_str(&content)?;
    log::debug!("Loaded config from {}", path.display());
    Ok(site)
}

/// A documented stock config file, printed by `dirdex gen-config`.
pub fn stock_config_toml() -> String {
    r#"# dirdex site configuration.
# Place this file as `.dirdex.toml` in the directory you index.
# All keys are optional - the values below are the defaults.

# Site name, used in page titles and the generated-on footer.
name = "dirdex"

# Heading shown at the top of every index page.
display_name = "dirdex"

# Per-directory artifact names. The metadata side-car and hash manifest are
# dot-named so they stay out of the generated listing.
meta_file = ".meta"
hash_file = ".md5"
index_file = "index.html"

# Thumbnail directory name referenced by media-dominant directories.
thumbs_dir = ".thumbs"

# Directory skipped at the source root (and removed by cleanup).
assets_dir = "assets"

# Display flags: "show-hidden", "hide-generated-by", "hide-title".
flags = []
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn resolve(site: SiteConfig) -> Result<Config, ConfigError> {
        Config::from_site(PathBuf::from("/tmp/src"), None, site, false)
    }

    // =========================================================================
    // Flags
    // =========================================================================

    #[test]
    fn parse_known_flags() {
        assert_eq!(ConfigFlag::parse("show-hidden").unwrap(), ConfigFlag::ShowHidden);
        assert_eq!(
            ConfigFlag::parse("hide-generated-by").unwrap(),
            ConfigFlag::HideGeneratedBy
        );
        assert_eq!(ConfigFlag::parse("hide-title").unwrap(), ConfigFlag::HideTitle);
    }

    #[test]
    fn parse_is_case_and_whitespace_tolerant() {
        assert_eq!(ConfigFlag::parse(" Hide-Title ").unwrap(), ConfigFlag::HideTitle);
    }

    #[test]
    fn parse_unknown_flag_lists_allowed_values() {
        let err = ConfigFlag::parse("no-such-flag").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("no-such-flag"));
        assert!(message.contains("show-hidden"));
        assert!(message.contains("hide-title"));
    }

    #[test]
    fn duplicate_flags_collapse() {
        let site = SiteConfig {
            flags: vec!["hide-title".into(), "hide-title".into()],
            ..SiteConfig::default()
        };
        let config = resolve(site).unwrap();
        assert_eq!(config.flags, vec![ConfigFlag::HideTitle]);
    }

    #[test]
    fn unknown_flag_fails_resolution() {
        let site = SiteConfig {
            flags: vec!["bogus".into()],
            ..SiteConfig::default()
        };
        assert!(matches!(
            resolve(site),
            Err(ConfigError::UnknownFlag { .. })
        ));
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    #[test]
    fn output_defaults_to_source() {
        let config = resolve(SiteConfig::default()).unwrap();
        assert_eq!(config.output, config.source);
    }

    #[test]
    fn explicit_output_is_kept() {
        let config = Config::from_site(
            PathBuf::from("/tmp/src"),
            Some(PathBuf::from("/tmp/out")),
            SiteConfig::default(),
            false,
        )
        .unwrap();
        assert_eq!(config.output, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn empty_sidecar_name_is_rejected() {
        let site = SiteConfig {
            meta_file: String::new(),
            ..SiteConfig::default()
        };
        assert!(matches!(resolve(site), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn sidecar_check_covers_all_three_names() {
        let config = resolve(SiteConfig::default()).unwrap();
        assert!(config.is_sidecar(".meta"));
        assert!(config.is_sidecar(".md5"));
        assert!(config.is_sidecar("index.html"));
        assert!(!config.is_sidecar("notes.txt"));
    }

    // =========================================================================
    // File loading
    // =========================================================================

    #[test]
    fn load_missing_file_returns_defaults() {
        let tmp = TempDir::new().unwrap();
        let site = load_config(tmp.path()).unwrap();
        assert_eq!(site.name, "dirdex");
        assert_eq!(site.meta_file, ".meta");
    }

    #[test]
    fn load_sparse_file_overrides_only_given_keys() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "name = \"archive\"\nflags = [\"hide-title\"]\n",
        )
        .unwrap();
        let site = load_config(tmp.path()).unwrap();
        assert_eq!(site.name, "archive");
        assert_eq!(site.flags, vec!["hide-title"]);
        assert_eq!(site.hash_file, ".md5");
    }

    #[test]
    fn load_rejects_unknown_keys() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "nmae = \"typo\"\n").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn stock_config_parses_back_to_defaults() {
        let site: SiteConfig = toml::from_str(&stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(site.name, defaults.name);
        assert_eq!(site.meta_file, defaults.meta_file);
        assert_eq!(site.index_file, defaults.index_file);
        assert!(site.flags.is_empty());
    }
}
