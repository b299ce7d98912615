//! End-to-end builds of the fixture site through the library API.

mod common;

use common::{edit, fixture_site};
use folio::build::{BuildContext, build, check};
use folio::error::BuildError;
use folio::validate::ValidationError;
use std::fs;
use std::path::Path;

const PAGES: [&str; 3] = ["index.html", "reading.html", "offline.html"];

fn build_at(root: &Path) -> Result<folio::build::BuildReport, BuildError> {
    build(&BuildContext::load(root)?)
}

fn read_page(root: &Path, name: &str) -> String {
    fs::read_to_string(root.join(name)).unwrap()
}

/// Every attribute value of `attr` in `html`, in document order.
fn attr_values<'a>(html: &'a str, attr: &str) -> Vec<&'a str> {
    let needle = format!(" {attr}=\"");
    html.match_indices(&needle)
        .map(|(i, _)| {
            let rest = &html[i + needle.len()..];
            &rest[..rest.find('"').unwrap()]
        })
        .collect()
}

/// The opening tag text of every `<a ...>` element.
fn anchor_tags(html: &str) -> Vec<&str> {
    html.match_indices("<a ")
        .map(|(i, _)| {
            let rest = &html[i..];
            &rest[..rest.find('>').unwrap()]
        })
        .collect()
}

#[test]
fn built_pages_are_safe() {
    let tmp = fixture_site();
    build_at(tmp.path()).unwrap();

    for name in PAGES {
        let html = read_page(tmp.path(), name);
        assert!(!html.contains("{{"), "{name} has an unresolved token");

        for attr in ["href", "src", "srcset"] {
            for value in attr_values(&html, attr) {
                let lower = value.trim_start().to_ascii_lowercase();
                for scheme in ["javascript:", "data:", "vbscript:"] {
                    assert!(!lower.starts_with(scheme), "{name}: {attr}=\"{value}\"");
                }
            }
        }

        for tag in anchor_tags(&html) {
            if tag.contains(r#"target="_blank""#) {
                let rel = attr_values(tag, "rel");
                assert_eq!(rel.len(), 1, "{name}: {tag}");
                assert!(rel[0].split(' ').any(|r| r == "noopener"), "{tag}");
                assert!(rel[0].split(' ').any(|r| r == "noreferrer"), "{tag}");
            }
        }
    }
}

#[test]
fn content_markup_is_escaped() {
    let tmp = fixture_site();
    edit(
        tmp.path(),
        "data/skills.json",
        "\"SQL\"",
        "\"<script>alert('x')</script>\"",
    );
    build_at(tmp.path()).unwrap();

    let index = read_page(tmp.path(), "index.html");
    assert!(!index.contains("<script>"));
    assert!(index.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
    assert!(index.contains("Threat Model Kit &lt;beta&gt;"));
    assert!(index.contains("O&#39;Brien &amp; Partners"));
}

#[test]
fn reading_page_follows_filter_contract() {
    let tmp = fixture_site();
    build_at(tmp.path()).unwrap();
    let html = read_page(tmp.path(), "reading.html");

    assert_eq!(html.matches(r#"class="card book-card""#).count(), 3);
    assert_eq!(attr_values(&html, "data-search").len(), 3);
    assert_eq!(
        attr_values(&html, "data-tags"),
        vec!["security,design", "engineering", "systems"]
    );
    assert!(html.contains(r#"data-title="the effective engineer""#));
    assert!(html.contains(r#"data-author="e. writer""#));
    assert!(html.contains(r#"data-isbn="978-0-000000-02-8""#));

    let groups = attr_values(&html, "data-filter-group");
    assert!(groups.iter().all(|g| *g == "year" || *g == "tag"));
    let values = attr_values(&html, "data-filter-value");
    assert_eq!(
        values,
        vec!["all", "2024", "2023", "all", "design", "engineering", "security", "systems"]
    );

    // Share controls in the page source pass through untouched.
    assert!(html.contains("data-reading-share-status aria-live=\"polite\""));
}

#[test]
fn reading_grid_is_grouped_newest_first() {
    let tmp = fixture_site();
    build_at(tmp.path()).unwrap();
    let html = read_page(tmp.path(), "reading.html");

    let y2024 = html.find(r#"<h2 class="year-heading" id="year-2024">"#).unwrap();
    let y2023 = html.find(r#"<h2 class="year-heading" id="year-2023">"#).unwrap();
    assert!(y2024 < y2023);
    let first = html.find("Secure Design").unwrap();
    let second = html.find("The Effective Engineer").unwrap();
    assert!(first < second && second < y2023);
}

#[test]
fn present_and_missing_covers() {
    let tmp = fixture_site();
    let report = build_at(tmp.path()).unwrap();
    let html = read_page(tmp.path(), "reading.html");

    assert!(html.contains(r#"src="book/2024/secure-design-300.jpg""#));
    assert!(html.contains(r#"srcset="book/2024/secure-design-300.jpg 1x""#));
    assert!(html.contains("No cover available for Thinking in Systems"));
    assert_eq!(
        report.missing_assets,
        vec!["book/2023/thinking-in-systems-300.jpg".to_string()]
    );
}

#[test]
fn builds_are_byte_identical() {
    let tmp = fixture_site();
    let first_report = build_at(tmp.path()).unwrap();
    let first: Vec<String> = PAGES.iter().map(|p| read_page(tmp.path(), p)).collect();

    let second_report = build_at(tmp.path()).unwrap();
    let second: Vec<String> = PAGES.iter().map(|p| read_page(tmp.path(), p)).collect();

    assert_eq!(first, second);
    assert_eq!(first_report, second_report);
}

#[test]
fn check_matches_build_without_writing() {
    let tmp = fixture_site();
    let checked = check(&BuildContext::load(tmp.path()).unwrap()).unwrap();
    for name in PAGES {
        assert!(!tmp.path().join(name).exists());
    }
    let built = build_at(tmp.path()).unwrap();
    assert_eq!(checked.pages, built.pages);
}

#[test]
fn invalid_content_leaves_previous_output_untouched() {
    let tmp = fixture_site();
    build_at(tmp.path()).unwrap();
    let before: Vec<String> = PAGES.iter().map(|p| read_page(tmp.path(), p)).collect();

    edit(tmp.path(), "data/reading.json", "\"year\": 2023", "\"year\": 1500");
    let err = build_at(tmp.path()).unwrap_err();
    let BuildError::Validation(ValidationError::FieldConstraint { path, .. }) = &err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(path, "reading[2].year");
    assert!(err.to_string().contains("year in range 1900..2100"));

    let after: Vec<String> = PAGES.iter().map(|p| read_page(tmp.path(), p)).collect();
    assert_eq!(before, after);
    for name in PAGES {
        assert!(!tmp.path().join(format!(".{name}.tmp")).exists());
    }
}

#[test]
fn unsafe_link_fails_before_anything_is_written() {
    let tmp = fixture_site();
    edit(
        tmp.path(),
        "data/certifications.json",
        "https://nimbus.example.com/verify/abc",
        "javascript:alert(document.cookie)",
    );
    let err = build_at(tmp.path()).unwrap_err();
    let BuildError::Validation(ValidationError::UnsafeUrl(inner)) = &err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(inner.field, "certifications[1].link");
    assert!(err.to_string().contains("only https URLs are allowed"));
    for name in PAGES {
        assert!(!tmp.path().join(name).exists());
    }
}

#[test]
fn traversing_cover_fails() {
    let tmp = fixture_site();
    edit(
        tmp.path(),
        "data/reading.json",
        "book/2023/thinking-in-systems-300.jpg",
        "book/%2e%2e/%2e%2e/etc/passwd",
    );
    let err = build_at(tmp.path()).unwrap_err();
    assert!(
        matches!(&err, BuildError::Validation(ValidationError::PathTraversal(_))),
        "{err}"
    );
    assert!(err.to_string().contains("reading[2].cover"));
}

#[test]
fn extra_key_fails_with_its_name() {
    let tmp = fixture_site();
    edit(
        tmp.path(),
        "data/skills.json",
        "\"category\": \"Security\"",
        "\"category\": \"Security\", \"unexpected\": \"value\"",
    );
    let err = build_at(tmp.path()).unwrap_err();
    assert!(err.to_string().contains("skills[1]: unexpected key(s): unexpected"), "{err}");
}

#[test]
fn missing_data_file_fails() {
    let tmp = fixture_site();
    fs::remove_file(tmp.path().join("data/experience.json")).unwrap();
    let err = build_at(tmp.path()).unwrap_err();
    assert_eq!(err.to_string(), "missing data file: data/experience.json");
    assert!(!tmp.path().join("index.html").exists());
}

#[test]
fn unknown_page_token_fails() {
    let tmp = fixture_site();
    edit(tmp.path(), "src/offline.html", "<main>", "<main>{{RETRY_BUTTON}}");
    let err = build_at(tmp.path()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "unresolved template token {{RETRY_BUTTON}} in src/offline.html"
    );
    // index.html assembled fine, but nothing is written when any page fails.
    assert!(!tmp.path().join("index.html").exists());
}

#[test]
fn config_can_move_output() {
    let tmp = fixture_site();
    fs::write(
        tmp.path().join("folio.toml"),
        "output_dir = \"public\"\npages = [\"index.html\", \"offline.html\"]\n",
    )
    .unwrap();
    let report = build_at(tmp.path()).unwrap();
    assert_eq!(report.pages.len(), 2);
    assert!(tmp.path().join("public/index.html").exists());
    assert!(!tmp.path().join("public/reading.html").exists());
    assert!(!tmp.path().join("index.html").exists());
}
