//! Optional image assets: existence probing and variant selection.
//!
//! Covers are referenced as their 1x JPEG (`book/2025/title-300.jpg`). The
//! other variants are derived by naming convention:
//!
//! ```text
//! book/2025/title-300.jpg    1x JPEG (referenced)
//! book/2025/title.jpg        2x JPEG
//! book/2025/title-300.webp   1x WebP
//! book/2025/title.webp       2x WebP
//! ```
//!
//! A variant is only used if it exists. 2x variants above the configured
//! byte limit are left out of `srcset`. Nothing here is required for a
//! correct page: a missing base image becomes a text placeholder.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Answers "does this project-relative asset exist, and how big is it".
pub trait AssetProbe {
    /// Size in bytes, or `None` if the asset does not exist.
    fn size(&self, relative: &str) -> Option<u64>;

    fn exists(&self, relative: &str) -> bool {
        self.size(relative).is_some()
    }
}

/// Probes files under a project root.
#[derive(Debug, Clone)]
pub struct FsProbe {
    root: PathBuf,
}

impl FsProbe {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }
}

impl AssetProbe for FsProbe {
    fn size(&self, relative: &str) -> Option<u64> {
        std::fs::metadata(self.root.join(relative))
            .ok()
            .filter(|m| m.is_file())
            .map(|m| m.len())
    }
}

/// A fixed set of assets, keyed by relative path.
#[derive(Debug, Clone, Default)]
pub struct MemoryProbe {
    files: BTreeMap<String, u64>,
}

impl MemoryProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, relative: &str, size: u64) -> Self {
        self.files.insert(relative.to_string(), size);
        self
    }
}

impl AssetProbe for MemoryProbe {
    fn size(&self, relative: &str) -> Option<u64> {
        self.files.get(relative).copied()
    }
}

/// Candidate file names for one cover, before any existence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverVariants {
    pub base: String,
    pub retina: Option<String>,
    pub webp: Option<String>,
    pub webp_retina: Option<String>,
}

/// Derive the variant names for a cover path.
///
/// Only JPEG covers have variants. The 2x name drops a trailing `-<width>`
/// from the stem, so it only exists when the base carries that suffix.
pub fn cover_variants(cover: &str, cover_width: u32) -> CoverVariants {
    let Some((stem, ext)) = split_jpeg(cover) else {
        return CoverVariants {
            base: cover.to_string(),
            retina: None,
            webp: None,
            webp_retina: None,
        };
    };
    let retina_stem = stem.strip_suffix(&format!("-{cover_width}"));
    CoverVariants {
        base: cover.to_string(),
        retina: retina_stem.map(|s| format!("{s}{ext}")),
        webp: Some(format!("{stem}.webp")),
        webp_retina: retina_stem.map(|s| format!("{s}.webp")),
    }
}

/// Replace a `.jpg`/`.jpeg` extension (any case) with `.webp`.
pub fn to_webp_path(path: &str) -> Option<String> {
    split_jpeg(path).map(|(stem, _)| format!("{stem}.webp"))
}

fn split_jpeg(path: &str) -> Option<(&str, &str)> {
    let dot = path.rfind('.')?;
    let (stem, ext) = path.split_at(dot);
    let lower = ext.to_ascii_lowercase();
    (lower == ".jpg" || lower == ".jpeg").then_some((stem, ext))
}

/// Variants that actually exist on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cover {
    Missing {
        expected: String,
    },
    Present {
        src: String,
        srcset: String,
        webp_srcset: Option<String>,
    },
}

/// Resolve which variants of `cover` to reference.
pub fn resolve_cover(
    cover: &str,
    probe: &dyn AssetProbe,
    cover_width: u32,
    heavy_variant_bytes: u64,
) -> Cover {
    if !probe.exists(cover) {
        return Cover::Missing {
            expected: cover.to_string(),
        };
    }
    let variants = cover_variants(cover, cover_width);
    let light = |path: &Option<String>| -> Option<String> {
        let path = path.as_ref()?;
        let size = probe.size(path)?;
        if size > heavy_variant_bytes {
            log::debug!("skipping heavy 2x variant {path} ({size} bytes)");
            None
        } else {
            Some(path.clone())
        }
    };

    let srcset = density_srcset(&variants.base, light(&variants.retina).as_deref());
    let webp_srcset = variants
        .webp
        .as_ref()
        .filter(|w| probe.exists(w))
        .map(|w| density_srcset(w, light(&variants.webp_retina).as_deref()));

    Cover::Present {
        src: variants.base,
        srcset,
        webp_srcset,
    }
}

fn density_srcset(base: &str, retina: Option<&str>) -> String {
    match retina {
        Some(retina) => format!("{base} 1x, {retina} 2x"),
        None => format!("{base} 1x"),
    }
}
