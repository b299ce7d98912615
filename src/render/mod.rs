//! Section renderers.
//!
//! Each renderer turns one validated collection into a self-contained HTML
//! fragment. Renderers are plain functions: data in, markup out. The only
//! outside input is an [`AssetProbe`], asked whether optional images exist.
//!
//! Rules shared by every renderer:
//!
//! - All text goes through [`Text`], which escapes `& < > " '`.
//! - Link and asset fields are re-checked with the permissive sanitizers
//!   ([`href_or_fallback`], [`crate::sanitize::asset_or_empty`]) before they are escaped into an
//!   attribute, even though validation already normalized them.
//! - External links open in a new tab with `rel="noopener noreferrer"`.
//!
//! | Token | Renderer |
//! |-------|----------|
//! | `FEATURED_PROJECTS` | [`render_featured`] |
//! | `SKILLS` | [`render_skills`] |
//! | `EXPERIENCE` | [`render_experience`] |
//! | `CERTIFICATIONS` | [`render_certifications`] |
//! | `READING_FILTERS` | [`render_reading_filters`] |
//! | `READING_GRID` | [`render_reading_grid`] |

mod home;
mod reading;

pub use home::{render_certifications, render_experience, render_featured, render_skills};
pub use reading::{entry_tags, infer_tags, render_reading_filters, render_reading_grid};

use crate::assets::AssetProbe;
use crate::config::SiteConfig;
use crate::escape::Text;
use crate::sanitize::href_or_fallback;
use crate::schema::Content;
use maud::{Markup, html};
use std::collections::BTreeMap;

pub const FEATURED_PROJECTS: &str = "FEATURED_PROJECTS";
pub const SKILLS: &str = "SKILLS";
pub const EXPERIENCE: &str = "EXPERIENCE";
pub const CERTIFICATIONS: &str = "CERTIFICATIONS";
pub const READING_FILTERS: &str = "READING_FILTERS";
pub const READING_GRID: &str = "READING_GRID";

/// Rendering knobs taken from the `[reading]` and `[certifications]` config tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub infer_tags: bool,
    pub cover_width: u32,
    pub heavy_variant_bytes: u64,
    pub icon_size: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&SiteConfig::default())
    }
}

impl From<&SiteConfig> for RenderOptions {
    fn from(config: &SiteConfig) -> Self {
        Self {
            infer_tags: config.reading.infer_tags,
            cover_width: config.reading.cover_width,
            heavy_variant_bytes: config.reading.heavy_variant_bytes,
            icon_size: config.certifications.icon_size,
        }
    }
}

/// One rendered section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub html: String,
    /// Optional assets the data referenced but the probe could not find.
    pub missing_assets: Vec<String>,
}

impl Fragment {
    fn new(markup: Markup, missing_assets: Vec<String>) -> Self {
        Self {
            html: markup.into_string(),
            missing_assets,
        }
    }
}

/// Every section fragment, keyed by token name.
#[derive(Debug, Clone, Default)]
pub struct Sections {
    pub tokens: BTreeMap<String, String>,
    pub missing_assets: Vec<String>,
}

/// Render every section of `content`.
pub fn render_sections(
    content: &Content,
    probe: &dyn AssetProbe,
    options: &RenderOptions,
) -> Sections {
    let fragments = [
        (FEATURED_PROJECTS, render_featured(&content.featured)),
        (SKILLS, render_skills(&content.skills)),
        (EXPERIENCE, render_experience(&content.experience)),
        (
            CERTIFICATIONS,
            render_certifications(&content.certifications, probe, options),
        ),
        (
            READING_FILTERS,
            render_reading_filters(&content.reading, options),
        ),
        (
            READING_GRID,
            render_reading_grid(&content.reading, probe, options),
        ),
    ];

    let mut sections = Sections::default();
    for (token, fragment) in fragments {
        log::debug!("rendered {token} ({} bytes)", fragment.html.len());
        sections.missing_assets.extend(fragment.missing_assets);
        sections.tokens.insert(token.to_string(), fragment.html);
    }
    sections
}

/// An anchor for a sanitized href. `https` targets open in a new tab.
fn link(href: &str, field: &str, class: Option<&str>, label: Markup) -> Markup {
    let href = href_or_fallback(href, field);
    let external = href.starts_with("https://");
    html! {
        @if external {
            a class=[class] href=(Text(&href)) target="_blank" rel="noopener noreferrer" { (label) }
        } @else {
            a class=[class] href=(Text(&href)) { (label) }
        }
    }
}
