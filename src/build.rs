//! Build orchestration: load, validate, render, assemble, write.
//!
//! ```text
//! data/*.json ──► validate ──► render sections ──┐
//! partials/*.html ──► assemble(sections) ────────┼──► assemble pages ──► write
//! src/<page>.html ──► required-token check ──────┘
//! ```
//!
//! Every stage runs to completion in memory before anything is written. Any
//! failure aborts the build with nothing on disk changed. Pages are then
//! written to `.<name>.tmp` siblings and renamed into place once all of them
//! were written. A failed rename puts back the pages already replaced.
//!
//! Identical inputs always produce byte-identical pages: nothing rendered
//! depends on the clock, the environment or map iteration order.

use crate::assemble::{TokenMap, assemble, require_tokens};
use crate::assets::{AssetProbe, FsProbe};
use crate::config::{SiteConfig, load_config};
use crate::error::BuildError;
use crate::render::{RenderOptions, render_sections};
use crate::schema::Collection;
use crate::validate::validate_content;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Everything one build invocation needs, resolved once up front.
pub struct BuildContext {
    pub root: PathBuf,
    pub config: SiteConfig,
    probe: Box<dyn AssetProbe>,
}

impl BuildContext {
    /// Load `folio.toml` from `root` and probe assets under the output directory.
    pub fn load(root: &Path) -> Result<Self, BuildError> {
        let config = load_config(root)?;
        Ok(Self::new(root, config))
    }

    pub fn new(root: &Path, config: SiteConfig) -> Self {
        let probe = FsProbe::new(&root.join(&config.output_dir));
        Self {
            root: root.to_path_buf(),
            config,
            probe: Box::new(probe),
        }
    }

    /// Replace the asset probe.
    pub fn with_probe(mut self, probe: impl AssetProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    /// `dir/name` as shown in messages, relative to the project root.
    fn display_path(dir: &str, name: &str) -> String {
        if dir == "." {
            name.to_string()
        } else {
            format!("{dir}/{name}")
        }
    }
}

/// One assembled page, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub name: String,
    pub html: String,
}

/// Every page of the site plus the optional assets it could not find.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSite {
    pub pages: Vec<RenderedPage>,
    pub missing_assets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReport {
    pub name: String,
    pub bytes: usize,
    /// First 12 hex digits of the page's SHA-256.
    pub digest: String,
}

/// What `build` wrote, or what `check` would write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub pages: Vec<PageReport>,
    pub missing_assets: Vec<String>,
    /// False for `check`.
    pub written: bool,
}

impl BuildReport {
    fn new(site: &RenderedSite, written: bool) -> Self {
        Self {
            pages: site
                .pages
                .iter()
                .map(|p| PageReport {
                    name: p.name.clone(),
                    bytes: p.html.len(),
                    digest: short_digest(&p.html),
                })
                .collect(),
            missing_assets: site.missing_assets.clone(),
            written,
        }
    }
}

fn short_digest(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let mut hex = format!("{:x}", digest);
    hex.truncate(12);
    hex
}

/// Read every collection file into one `{collection: [...]}` object.
pub fn load_content(ctx: &BuildContext) -> Result<Value, BuildError> {
    let data_dir = ctx.root.join(&ctx.config.data_dir);
    let mut root = Map::new();
    for collection in Collection::ALL {
        let file_name = collection.file_name();
        let display = BuildContext::display_path(&ctx.config.data_dir, &file_name);
        let path = data_dir.join(&file_name);
        if !path.is_file() {
            return Err(BuildError::MissingDataFile(display));
        }
        let text = fs::read_to_string(&path)?;
        let value: Value = serde_json::from_str(&text).map_err(|source| BuildError::InvalidJson {
            file: display.clone(),
            source,
        })?;
        log::debug!("read {display}");
        root.insert(collection.name().to_string(), value);
    }
    Ok(Value::Object(root))
}

/// Token name for a partial file: `site-footer.html` → `SITE_FOOTER`.
///
/// `None` if the stem does not make an `UPPER_SNAKE` name.
pub fn partial_token(file_name: &str) -> Option<String> {
    let stem = file_name.strip_suffix(".html")?;
    let name: String = stem
        .chars()
        .map(|c| if c == '-' { '_' } else { c.to_ascii_uppercase() })
        .collect();
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');
    valid.then_some(name)
}

/// Load every `*.html` partial and assemble it against the section tokens.
///
/// A partial whose name collides with a section token is skipped.
pub fn load_partials(ctx: &BuildContext, sections: &TokenMap) -> Result<TokenMap, BuildError> {
    let dir = ctx.root.join(&ctx.config.partials_dir);
    let mut partials = TokenMap::new();
    if !dir.is_dir() {
        log::debug!("no partials directory at {}", ctx.config.partials_dir);
        return Ok(partials);
    }

    let entries = WalkDir::new(&dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file());

    for entry in entries {
        let file_name = entry.file_name().to_string_lossy();
        let Some(token) = partial_token(&file_name) else {
            if file_name.ends_with(".html") {
                log::warn!("skipping partial {file_name}: name does not map to a token");
            }
            continue;
        };
        if sections.contains_key(&token) {
            log::warn!("skipping partial {file_name}: {{{{{token}}}}} is a section token");
            continue;
        }
        let display = BuildContext::display_path(&ctx.config.partials_dir, &file_name);
        let source = fs::read_to_string(entry.path())?;
        let html = assemble(&source, sections, &display)?;
        log::debug!("loaded partial {display} as {{{{{token}}}}}");
        partials.insert(token, html);
    }
    Ok(partials)
}

/// Run every stage in memory and return the assembled pages.
pub fn render_site(ctx: &BuildContext) -> Result<RenderedSite, BuildError> {
    log::info!("loading content from {}", ctx.config.data_dir);
    let data = load_content(ctx)?;

    log::info!("validating content");
    let content = validate_content(&data)?;

    log::info!("rendering sections");
    let options = RenderOptions::from(&ctx.config);
    let sections = render_sections(&content, ctx.probe.as_ref(), &options);

    let partials = load_partials(ctx, &sections.tokens)?;
    let mut tokens = sections.tokens;
    tokens.extend(partials);

    log::info!("assembling {} page(s)", ctx.config.pages.len());
    let pages_dir = ctx.root.join(&ctx.config.pages_dir);
    let mut pages = Vec::with_capacity(ctx.config.pages.len());
    for name in &ctx.config.pages {
        let display = BuildContext::display_path(&ctx.config.pages_dir, name);
        let path = pages_dir.join(name);
        if !path.is_file() {
            return Err(BuildError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("page source not found: {display}"),
            )));
        }
        let source = fs::read_to_string(&path)?;
        require_tokens(&source, &ctx.config.required_tokens, &display)?;
        let html = assemble(&source, &tokens, &display)?;
        pages.push(RenderedPage {
            name: name.clone(),
            html,
        });
    }

    Ok(RenderedSite {
        pages,
        missing_assets: sections.missing_assets,
    })
}

/// Validate and assemble everything without writing.
pub fn check(ctx: &BuildContext) -> Result<BuildReport, BuildError> {
    let site = render_site(ctx)?;
    Ok(BuildReport::new(&site, false))
}

/// Build the site and write every page to the output directory.
pub fn build(ctx: &BuildContext) -> Result<BuildReport, BuildError> {
    let site = render_site(ctx)?;
    let out_dir = ctx.root.join(&ctx.config.output_dir);
    write_pages(&out_dir, &site.pages)?;
    log::info!("wrote {} page(s) to {}", site.pages.len(), ctx.config.output_dir);
    Ok(BuildReport::new(&site, true))
}

/// Write all pages or none.
///
/// Every page goes to a `.<name>.tmp` sibling first. Only when all temp files
/// are written is each existing page moved aside to `.<name>.bak` and the temp
/// file renamed into place. If a rename fails, every page already committed
/// goes back to its previous state (a page that was new is removed) and the
/// remaining temp files are deleted.
pub fn write_pages(out_dir: &Path, pages: &[RenderedPage]) -> io::Result<()> {
    fs::create_dir_all(out_dir)?;
    let mut staged: Vec<StagedPage> = pages
        .iter()
        .map(|p| StagedPage::new(out_dir, &p.name))
        .collect();

    for (page, stage) in pages.iter().zip(&staged) {
        if let Err(err) = fs::write(&stage.tmp, &page.html) {
            staged.iter().for_each(|s| remove_quietly(&s.tmp));
            return Err(err);
        }
    }

    for i in 0..staged.len() {
        if let Err(err) = staged[i].commit() {
            staged[..i].iter().rev().for_each(StagedPage::roll_back);
            staged[i..].iter().for_each(|s| remove_quietly(&s.tmp));
            return Err(err);
        }
    }

    for stage in &staged {
        if stage.had_previous {
            remove_quietly(&stage.backup);
        }
        log::debug!("wrote {}", stage.dest.display());
    }
    Ok(())
}

struct StagedPage {
    tmp: PathBuf,
    backup: PathBuf,
    dest: PathBuf,
    had_previous: bool,
}

impl StagedPage {
    fn new(out_dir: &Path, name: &str) -> Self {
        Self {
            tmp: out_dir.join(format!(".{name}.tmp")),
            backup: out_dir.join(format!(".{name}.bak")),
            dest: out_dir.join(name),
            had_previous: false,
        }
    }

    /// Move the current page aside, then the temp file into place.
    fn commit(&mut self) -> io::Result<()> {
        if self.dest.exists() {
            fs::rename(&self.dest, &self.backup)?;
            self.had_previous = true;
        }
        if let Err(err) = fs::rename(&self.tmp, &self.dest) {
            if self.had_previous {
                restore(&self.backup, &self.dest);
            }
            return Err(err);
        }
        Ok(())
    }

    /// Undo a successful `commit`.
    fn roll_back(&self) {
        if self.had_previous {
            restore(&self.backup, &self.dest);
        } else {
            remove_quietly(&self.dest);
        }
    }
}

fn restore(backup: &Path, dest: &Path) {
    if let Err(err) = fs::rename(backup, dest) {
        log::error!(
            "could not restore {} from {}: {err}",
            dest.display(),
            backup.display()
        );
    }
}

fn remove_quietly(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => log::warn!("could not remove {}: {err}", path.display()),
    }
}
