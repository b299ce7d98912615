//! Project configuration.
//!
//! An optional `folio.toml` at the project root overrides the stock defaults.
//! The file is sparse: set only the keys you want to change.
//!
//! ```toml
//! data_dir = "data"          # <collection>.json files
//! partials_dir = "partials"  # *.html partials, each exposed as a token
//! pages_dir = "src"          # page sources with {{TOKEN}} placeholders
//! output_dir = "."           # where assembled pages are written
//! pages = ["index.html", "reading.html", "offline.html"]
//! required_tokens = ["NAV", "FOOTER"]
//!
//! [reading]
//! infer_tags = true              # guess topics from titles when tags are absent
//! cover_width = 300              # 1x cover width; also the `-300` name suffix
//! heavy_variant_bytes = 350000   # skip 2x covers larger than this
//!
//! [certifications]
//! icon_size = 30                 # rendered icon width and height in px
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::sanitize::sanitize_asset_path;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE: &str = "folio.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `folio.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory holding one JSON file per content collection.
    pub data_dir: String,
    /// Directory of `*.html` partials.
    pub partials_dir: String,
    /// Directory of page sources.
    pub pages_dir: String,
    /// Directory assembled pages are written to.
    pub output_dir: String,
    /// Page file names, relative to `pages_dir` and `output_dir`.
    pub pages: Vec<String>,
    /// Tokens every page source must contain.
    pub required_tokens: Vec<String>,
    pub reading: ReadingConfig,
    pub certifications: CertificationsConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            partials_dir: "partials".to_string(),
            pages_dir: "src".to_string(),
            output_dir: ".".to_string(),
            pages: vec![
                "index.html".to_string(),
                "reading.html".to_string(),
                "offline.html".to_string(),
            ],
            required_tokens: vec!["NAV".to_string(), "FOOTER".to_string()],
            reading: ReadingConfig::default(),
            certifications: CertificationsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReadingConfig {
    /// Infer topic tags from titles for entries without tags.
    pub infer_tags: bool,
    /// Width of the 1x cover, and the `-<width>` suffix its file name carries.
    pub cover_width: u32,
    /// 2x cover variants above this size are left out of `srcset`.
    pub heavy_variant_bytes: u64,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            infer_tags: true,
            cover_width: 300,
            heavy_variant_bytes: 350_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CertificationsConfig {
    /// Icon width and height in pixels.
    pub icon_size: u32,
}

impl Default for CertificationsConfig {
    fn default() -> Self {
        Self { icon_size: 30 }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, dir) in [
            ("data_dir", &self.data_dir),
            ("partials_dir", &self.partials_dir),
            ("pages_dir", &self.pages_dir),
            ("output_dir", &self.output_dir),
        ] {
            if dir != "." {
                sanitize_asset_path(dir, key)
                    .map_err(|e| ConfigError::Validation(e.to_string()))?;
            }
        }
        if self.pages.is_empty() {
            return Err(ConfigError::Validation("pages must not be empty".into()));
        }
        for page in &self.pages {
            if page.contains('/') || !page.ends_with(".html") {
                return Err(ConfigError::Validation(format!(
                    "pages: `{page}` must be a plain .html file name"
                )));
            }
            sanitize_asset_path(page, "pages").map_err(|e| ConfigError::Validation(e.to_string()))?;
        }
        if let Some(token) = self
            .required_tokens
            .iter()
            .find(|t| !is_token_name(t))
        {
            return Err(ConfigError::Validation(format!(
                "required_tokens: `{token}` is not an UPPER_SNAKE token name"
            )));
        }
        if self.reading.cover_width == 0 || self.certifications.icon_size == 0 {
            return Err(ConfigError::Validation(
                "reading.cover_width and certifications.icon_size must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

fn is_token_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Stock defaults as a TOML table, the base layer user overrides merge onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key by key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load the project config from `root/folio.toml`, falling back to defaults.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let path = root.join(CONFIG_FILE);
    let merged = if path.exists() {
        let content = fs::read_to_string(&path)?;
        let overlay: toml::Value = toml::from_str(&content)?;
        log::debug!("loaded {CONFIG_FILE}");
        merge_toml(stock_defaults_value(), overlay)
    } else {
        stock_defaults_value()
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// A fully commented stock `folio.toml`, printed by `folio gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# folio configuration
# ===================
# All settings are optional. Values shown are the defaults.
# Unknown keys cause an error.

# Directory holding featured.json, skills.json, experience.json,
# certifications.json and reading.json.
data_dir = "data"

# Every *.html file here becomes a token named after its upper-cased stem:
# nav.html -> {{NAV}}, site-footer.html -> {{SITE_FOOTER}}.
partials_dir = "partials"

# Page sources containing {{TOKEN}} placeholders.
pages_dir = "src"

# Where assembled pages are written.
output_dir = "."

# Pages to assemble, by file name.
pages = ["index.html", "reading.html", "offline.html"]

# Tokens that every page source must contain.
required_tokens = ["NAV", "FOOTER"]

# ---------------------------------------------------------------------------
# Reading list
# ---------------------------------------------------------------------------
[reading]
# Guess topic tags from the title when an entry has none.
infer_tags = true

# Width of the 1x cover in px. Covers named `<name>-300.jpg` look for a
# 2x sibling `<name>.jpg` and WebP variants of both.
cover_width = 300

# 2x variants larger than this many bytes are not offered in srcset.
heavy_variant_bytes = 350000

# ---------------------------------------------------------------------------
# Certifications
# ---------------------------------------------------------------------------
[certifications]
# Rendered icon width and height in px.
icon_size = 30
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_site_layout() {
        let config = SiteConfig::default();
        assert_eq!(config.data_dir, "data");
        assert_eq!(config.partials_dir, "partials");
        assert_eq!(config.pages, vec!["index.html", "reading.html", "offline.html"]);
        assert_eq!(config.required_tokens, vec!["NAV", "FOOTER"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(load_config(tmp.path()).unwrap(), SiteConfig::default());
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"
pages = ["index.html"]

[reading]
infer_tags = false
"#,
        )
        .unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.pages, vec!["index.html"]);
        assert!(!config.reading.infer_tags);
        assert_eq!(config.reading.cover_width, 300);
        assert_eq!(config.data_dir, "data");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[reading]\ncover_widht = 200\n").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn traversing_directories_are_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "output_dir = \"../public\"\n").unwrap();
        let err = load_config(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("path traversal"), "{err}");
    }

    #[test]
    fn nested_page_names_are_rejected() {
        let config = SiteConfig {
            pages: vec!["blog/index.html".into()],
            ..SiteConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn lowercase_required_token_is_rejected() {
        let config = SiteConfig {
            required_tokens: vec!["nav".into()],
            ..SiteConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("UPPER_SNAKE"));
    }

    #[test]
    fn merge_overlays_nested_tables() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, SiteConfig::default());
    }
}
