//! Shared test utilities for the folio test suite.
//!
//! Provides a fixture site copied into a temp directory, the canonical valid
//! content payload (raw JSON and validated), and small record builders.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let report = build(&BuildContext::load(tmp.path()).unwrap()).unwrap();
//!
//! let mut data = valid_content_json();
//! data["reading"][0]["year"] = json!(1500);
//! assert!(validate_content(&data).is_err());
//! ```

use serde_json::{Value, json};
use std::path::Path;
use tempfile::TempDir;

use crate::schema::{Content, ReadingEntry};
use crate::validate::validate_content;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Content payloads
// =========================================================================

/// One valid entry per collection, as it would be read from `data/*.json`.
pub fn valid_content_json() -> Value {
    json!({
        "featured": [{
            "id": "project-alpha",
            "title": "Project Alpha",
            "timeframe": "2024",
            "problem": "Legacy onboarding flow was slow and error prone.",
            "impact": "Cut onboarding time in half.",
            "tech": ["Rust", "PostgreSQL"],
            "links": [{ "label": "Source", "url": "https://github.com/example/repo" }]
        }],
        "skills": [{ "category": "Languages", "items": ["JavaScript"] }],
        "experience": [{
            "org": "Example Org",
            "role": "Senior Engineer",
            "dates": "2020 - Present",
            "impact_bullets": ["Delivered secure platform updates."],
            "tech": ["Rust"]
        }],
        "certifications": [{
            "title": "Secure Systems",
            "issuer": "Example",
            "issued": "2024",
            "link": "https://credentials.example.com/secure-systems",
            "icon": "images/example-30.jpg",
            "icon_alt": "Example logo"
        }],
        "reading": [{
            "year": 2025,
            "title": "Secure Design",
            "author": "A. Author",
            "isbn": "978-1-234567-89-7",
            "link": "https://books.example.com/secure-design",
            "cover": "book/2025/secure-design-300.jpg",
            "tags": ["Security"]
        }]
    })
}

/// [`valid_content_json`], validated.
pub fn valid_content() -> Content {
    validate_content(&valid_content_json()).unwrap()
}

/// A bare reading entry: no author, link, cover or tags.
pub fn reading_entry(year: u16, title: &str) -> ReadingEntry {
    ReadingEntry {
        year,
        title: title.to_string(),
        author: None,
        isbn: "978-0-000000-00-0".to_string(),
        link: None,
        cover: None,
        tags: Vec::new(),
    }
}
