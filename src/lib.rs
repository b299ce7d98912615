//! # Folio
//!
//! A static site generator for a personal portfolio. Content lives in plain
//! JSON files (projects, skills, experience, certifications, a reading list);
//! page sources are HTML with `{{TOKEN}}` placeholders. A build validates all
//! content, renders each section to an HTML fragment and substitutes the
//! fragments into the pages.
//!
//! # Pipeline
//!
//! ```text
//! 1. Load       data/*.json          →  serde_json::Value
//! 2. Validate   Value                →  schema::Content   (fail-fast, fail-closed)
//! 3. Render     Content              →  section fragments
//! 4. Assemble   src/*.html + tokens  →  pages
//! 5. Write      pages                →  output dir        (all or nothing)
//! ```
//!
//! Nothing is written until every stage has succeeded. The first invalid
//! field anywhere fails the whole build with its exact path
//! (`reading[3].year`), and the existing output stays untouched.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`sanitize`] | URL and asset-path sanitizers sharing one safe-relative-path primitive |
//! | [`schema`] | Typed content records |
//! | [`validate`] | Per-collection validators over JSON values |
//! | [`escape`] | HTML escaping as a maud `Render` wrapper |
//! | [`render`] | One renderer per page section, built with Maud |
//! | [`assets`] | Optional image probing and cover variant selection |
//! | [`assemble`] | Single-pass `{{TOKEN}}` substitution |
//! | [`build`] | Orchestration: load, validate, render, assemble, write |
//! | [`config`] | `folio.toml` loading over stock defaults |
//! | [`error`] | Top-level [`error::BuildError`] |
//! | [`output`] | CLI report formatting |
//!
//! # Untrusted Content
//!
//! Data files are treated as untrusted. Links must be `https` or
//! site-relative, asset paths must be relative with no traversal, and every
//! string is HTML-escaped. Links and assets are checked twice: strictly during
//! validation, and again permissively while rendering, where a bad value
//! degrades to `#` or an empty path instead of failing. Page sources and
//! partials are trusted markup.

pub mod assemble;
pub mod assets;
pub mod build;
pub mod config;
pub mod error;
pub mod escape;
pub mod output;
pub mod render;
pub mod sanitize;
pub mod schema;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_helpers;
