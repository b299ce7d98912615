//! Reading list: the year-grouped book grid and its filter controls.
//!
//! The client filter script keys off these attributes, so their names and
//! encodings must not change:
//!
//! | Element | Attribute | Value |
//! |---------|-----------|-------|
//! | book card | `data-year` | four-digit year |
//! | book card | `data-tags` | lowercase tags joined with `,` |
//! | book card | `data-title`, `data-author`, `data-isbn` | lowercased field, empty if absent |
//! | book card | `data-search` | lowercased `title author isbn` |
//! | filter button | `data-filter-group` | `year` or `tag` |
//! | filter button | `data-filter-value` | `all`, a year, or a tag |

use super::{Fragment, RenderOptions, link};
use crate::assets::{AssetProbe, Cover, resolve_cover};
use crate::escape::Text;
use crate::sanitize::asset_or_empty;
use crate::schema::ReadingEntry;
use maud::{Markup, html};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

/// Keyword patterns used when an entry has no explicit tags, in output order.
static TAG_RULES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        (
            "security",
            r"\b(security|secure|hack\w*|crypt\w*|privacy|threat\w*|cyber\w*)\b",
        ),
        (
            "engineering",
            r"\b(code|coding|programm\w*|software|engineer\w*|rust|python|javascript|devops|systems?|architecture)\b",
        ),
        ("leadership", r"\b(lead\w*|manag\w*|teams?|culture)\b"),
        ("productivity", r"\b(habits?|focus|productiv\w*|deep work)\b"),
        ("psychology", r"\b(mind\w*|think\w*|psycholog\w*|brain|decisions?)\b"),
        (
            "business",
            r"\b(business|startups?|money|invest\w*|econom\w*|market\w*|strategy)\b",
        ),
        ("data", r"\b(data|ai|machine learning|statistic\w*|algorithms?)\b"),
        ("design", r"\b(design\w*|ux)\b"),
        ("history", r"\b(histor\w*|wars?|empire)\b"),
    ]
    .into_iter()
    .map(|(tag, pattern)| {
        let re = Regex::new(&format!("(?i){pattern}")).expect("tag rule pattern");
        (tag, re)
    })
    .collect()
});

const FALLBACK_TAG: &str = "general";

/// Tags guessed from a title. Never empty.
pub fn infer_tags(title: &str) -> Vec<String> {
    let tags: Vec<String> = TAG_RULES
        .iter()
        .filter(|(_, re)| re.is_match(title))
        .map(|(tag, _)| tag.to_string())
        .collect();
    if tags.is_empty() {
        vec![FALLBACK_TAG.to_string()]
    } else {
        tags
    }
}

/// The normalized tag list for an entry: explicit tags if any, otherwise
/// inferred ones (when enabled). Lowercase, trimmed, deduplicated, and free of
/// commas so the list survives being joined into `data-tags`.
pub fn entry_tags(entry: &ReadingEntry, infer: bool) -> Vec<String> {
    let raw = if !entry.tags.is_empty() {
        entry.tags.clone()
    } else if infer {
        infer_tags(&entry.title)
    } else {
        Vec::new()
    };

    let mut seen = BTreeSet::new();
    raw.iter()
        .map(|t| normalize(&t.replace(',', " ")))
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Entries grouped by year, newest first; file order is kept within a year.
fn by_year(entries: &[ReadingEntry]) -> Vec<(u16, Vec<(usize, &ReadingEntry)>)> {
    let mut groups: BTreeMap<u16, Vec<(usize, &ReadingEntry)>> = BTreeMap::new();
    for (i, entry) in entries.iter().enumerate() {
        groups.entry(entry.year).or_default().push((i, entry));
    }
    groups.into_iter().rev().collect()
}

pub fn render_reading_grid(
    entries: &[ReadingEntry],
    probe: &dyn AssetProbe,
    options: &RenderOptions,
) -> Fragment {
    let mut missing = Vec::new();
    let markup = html! {
        @for (year, group) in by_year(entries) {
            section.reading-year data-year=(year) aria-labelledby={ "year-" (year) } {
                h2.year-heading id={ "year-" (year) } { (year) }
                div.book-grid {
                    @for (i, entry) in group {
                        (book_card(entry, i, probe, options, &mut missing))
                    }
                }
            }
        }
    };
    Fragment::new(markup, missing)
}

fn book_card(
    entry: &ReadingEntry,
    index: usize,
    probe: &dyn AssetProbe,
    options: &RenderOptions,
    missing: &mut Vec<String>,
) -> Markup {
    let tags = entry_tags(entry, options.infer_tags);
    let title = normalize(&entry.title);
    let author = entry.author.as_deref().map(normalize).unwrap_or_default();
    let isbn = normalize(&entry.isbn);
    let search = [title.as_str(), author.as_str(), isbn.as_str()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    let link_field = format!("reading[{index}].link");

    html! {
        article.card.book-card
            data-year=(entry.year)
            data-tags=(Text(&tags.join(",")))
            data-title=(Text(&title))
            data-author=(Text(&author))
            data-isbn=(Text(&isbn))
            data-search=(Text(&search)) {
            @if let Some(href) = &entry.link {
                (link(href, &link_field, Some("book-cover-link"), cover(entry, index, probe, options, missing)))
            } @else {
                (cover(entry, index, probe, options, missing))
            }
            div.card-body {
                h3.card-title {
                    @if let Some(href) = &entry.link {
                        (link(href, &link_field, None, html! { (Text(&entry.title)) }))
                    } @else {
                        (Text(&entry.title))
                    }
                }
                @if let Some(author) = &entry.author {
                    p.book-author { "by " (Text(author)) }
                }
                p.book-isbn { "ISBN " (Text(&entry.isbn)) }
                @if !tags.is_empty() {
                    ul.tag-list {
                        @for tag in &tags {
                            li.badge { (Text(tag)) }
                        }
                    }
                }
            }
        }
    }
}

fn cover(
    entry: &ReadingEntry,
    index: usize,
    probe: &dyn AssetProbe,
    options: &RenderOptions,
    missing: &mut Vec<String>,
) -> Markup {
    let path = entry
        .cover
        .as_deref()
        .map(|raw| asset_or_empty(raw, &format!("reading[{index}].cover")))
        .filter(|p| !p.is_empty());
    let Some(path) = path else {
        return cover_placeholder(&entry.title);
    };

    match resolve_cover(&path, probe, options.cover_width, options.heavy_variant_bytes) {
        Cover::Missing { expected } => {
            log::warn!("cover not found: {expected}");
            missing.push(expected);
            cover_placeholder(&entry.title)
        }
        Cover::Present {
            src,
            srcset,
            webp_srcset,
        } => html! {
            picture.book-cover {
                @if let Some(webp) = &webp_srcset {
                    source type="image/webp" srcset=(Text(webp));
                }
                img src=(Text(&src))
                    srcset=(Text(&srcset))
                    alt={ "Cover of " (Text(&entry.title)) }
                    width=(options.cover_width)
                    loading="lazy"
                    decoding="async";
            }
        },
    }
}

fn cover_placeholder(title: &str) -> Markup {
    html! {
        div.book-cover-placeholder role="img" aria-label={ "No cover available for " (Text(title)) } {
            span { (Text(title)) }
        }
    }
}

pub fn render_reading_filters(entries: &[ReadingEntry], options: &RenderOptions) -> Fragment {
    let years: BTreeSet<u16> = entries.iter().map(|e| e.year).collect();
    let tags: BTreeSet<String> = entries
        .iter()
        .flat_map(|e| entry_tags(e, options.infer_tags))
        .collect();

    let markup = html! {
        div.reading-filters {
            div.filter-group role="group" aria-label="Filter by year" {
                (filter_button("year", "all", "All years", true))
                @for year in years.iter().rev() {
                    (filter_button("year", &year.to_string(), &year.to_string(), false))
                }
            }
            @if !tags.is_empty() {
                div.filter-group role="group" aria-label="Filter by topic" {
                    (filter_button("tag", "all", "All topics", true))
                    @for tag in &tags {
                        (filter_button("tag", tag, tag, false))
                    }
                }
            }
        }
    };
    Fragment::new(markup, Vec::new())
}

fn filter_button(group: &str, value: &str, label: &str, active: bool) -> Markup {
    html! {
        button.filter-chip.active[active]
            type="button"
            data-filter-group=(group)
            data-filter-value=(Text(value))
            aria-pressed=(if active { "true" } else { "false" }) {
            (Text(label))
        }
    }
}
