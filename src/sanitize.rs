//! Allow-list sanitizers for the two kinds of untrusted strings the content
//! model carries: link targets (`href`) and asset references (`src`).
//!
//! Both sanitizers are total: any input either comes back normalized or is
//! rejected with exactly one [`SanitizeReason`]. Nothing unsafe is passed
//! through silently.
//!
//! ## Href policy
//!
//! ```text
//! https://host/path?q      → canonical URL (only the https scheme is accepted)
//! #section-id              → as-is, if it matches #[A-Za-z0-9:_-]+
//! docs/resume.pdf          → relative path, checked segment by segment
//! /reading.html?year=2025  → root-relative path + original suffix
//! //evil.example           → rejected (protocol-relative)
//! ```
//!
//! ## Asset policy
//!
//! Asset paths are strictly relative to the project root: no scheme, no
//! leading `/`, no query or fragment.
//!
//! Both policies share [`RelativePath`], which percent-decodes each segment,
//! re-splits the decoded text on `/` and `\`, and rejects `..`, `.` and empty
//! segments. Encoded traversal (`%2e%2e`, `..%2f..`) is therefore caught the
//! same way as the literal form.
//!
//! The strict functions are used while validating content. The permissive
//! wrappers [`href_or_fallback`] and [`asset_or_empty`] are used by
//! renderers, which re-check already validated values and degrade to a safe
//! value with a warning instead of aborting.

use percent_encoding::percent_decode_str;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

static SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("scheme pattern"));

static FRAGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[A-Za-z0-9:_\-]+$").expect("fragment pattern"));

/// Why a value was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanitizeReason {
    /// A scheme other than `https`.
    UnsafeScheme(String),
    /// `user:pass@` in an absolute URL.
    CredentialsInUrl,
    /// Starts with `//`.
    ProtocolRelative,
    /// A `#...` value outside the fragment allow-list.
    InvalidFragment,
    /// A `..` segment, literal or percent-encoded.
    PathTraversal,
    /// A `.` segment.
    DotSegment,
    /// `a//b`, a trailing `/` on an asset, or an empty value.
    EmptySegment,
    /// Percent-encoding that does not decode to UTF-8.
    BadEncoding,
    /// Asset path with a scheme or a leading `/`.
    NotRelative,
    /// Asset path with `?` or `#`.
    QueryOrHashNotAllowed,
    /// An https value the URL parser rejects.
    MalformedUrl(String),
    /// Whitespace or backslashes, or a control character (raw or percent-encoded).
    InvalidCharacter,
}

impl SanitizeReason {
    /// True for reasons that describe an attempt to leave the asset root.
    pub fn is_traversal(&self) -> bool {
        matches!(
            self,
            Self::PathTraversal
                | Self::DotSegment
                | Self::EmptySegment
                | Self::BadEncoding
                | Self::NotRelative
                | Self::QueryOrHashNotAllowed
        )
    }
}

impl fmt::Display for SanitizeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsafeScheme(scheme) => {
                write!(f, "only https URLs are allowed (got scheme `{scheme}`)")
            }
            Self::CredentialsInUrl => f.write_str("credentials are not allowed in URLs"),
            Self::ProtocolRelative => f.write_str("protocol-relative URLs are not allowed"),
            Self::InvalidFragment => f.write_str("fragment must match #[A-Za-z0-9:_-]+"),
            Self::PathTraversal => f.write_str("path traversal is not allowed"),
            Self::DotSegment => f.write_str("dot segments are not allowed"),
            Self::EmptySegment => f.write_str("empty path segments are not allowed"),
            Self::BadEncoding => f.write_str("invalid percent-encoding"),
            Self::NotRelative => f.write_str("must be relative (no scheme, no leading /)"),
            Self::QueryOrHashNotAllowed => {
                f.write_str("query strings and fragments are not allowed")
            }
            Self::MalformedUrl(detail) => write!(f, "malformed URL: {detail}"),
            Self::InvalidCharacter => {
                f.write_str("whitespace, control characters and backslashes are not allowed")
            }
        }
    }
}

/// A rejected value together with the field path it came from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {reason}")]
pub struct SanitizeError {
    pub field: String,
    pub reason: SanitizeReason,
}

impl SanitizeError {
    fn new(field: &str, reason: SanitizeReason) -> Self {
        Self {
            field: field.to_string(),
            reason,
        }
    }
}

/// A relative path whose every segment is a plain name.
///
/// Construction is the only check: once a `RelativePath` exists it holds no
/// `..`, `.` or empty segment in either raw or decoded form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativePath(String);

impl RelativePath {
    pub fn parse(raw: &str) -> Result<Self, SanitizeReason> {
        if raw.is_empty() {
            return Err(SanitizeReason::EmptySegment);
        }
        let mut segments = Vec::new();
        for segment in raw.split('/') {
            check_segment(segment)?;
            segments.push(segment);
        }
        Ok(Self(segments.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn check_segment(segment: &str) -> Result<(), SanitizeReason> {
    if segment.is_empty() {
        return Err(SanitizeReason::EmptySegment);
    }
    let decoded = percent_decode(segment)?;
    // A decoded segment may carry its own separators (`..%2f..`).
    for part in decoded.split(['/', '\\']) {
        match part {
            ".." => return Err(SanitizeReason::PathTraversal),
            "." => return Err(SanitizeReason::DotSegment),
            "" => return Err(SanitizeReason::EmptySegment),
            _ => {}
        }
    }
    if decoded.chars().any(char::is_control) {
        return Err(SanitizeReason::InvalidCharacter);
    }
    Ok(())
}

fn percent_decode(input: &str) -> Result<String, SanitizeReason> {
    // percent_decode_str passes `%zz` and a trailing `%2` through untouched.
    let bytes = input.as_bytes();
    let well_formed = bytes.iter().enumerate().all(|(i, &b)| {
        b != b'%'
            || bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit))
    });
    if !well_formed {
        return Err(SanitizeReason::BadEncoding);
    }
    percent_decode_str(input)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| SanitizeReason::BadEncoding)
}

/// Any `..` segment in the path part of `raw`, split on both separators and
/// ignoring stray whitespace, so traversal is reported ahead of a bad character.
fn has_traversal_segment(raw: &str) -> bool {
    let path = &raw[..raw.find(['?', '#']).unwrap_or(raw.len())];
    path.split(['/', '\\']).any(|segment| {
        let decoded = percent_decode_str(segment).decode_utf8_lossy();
        decoded
            .split(['/', '\\'])
            .any(|part| part.trim_matches(|c: char| c.is_whitespace() || c.is_control()) == "..")
    })
}

fn has_forbidden_chars(raw: &str) -> bool {
    raw.chars()
        .any(|c| c.is_whitespace() || c.is_control() || c == '\\')
}

fn has_scheme(raw: &str) -> bool {
    SCHEME.is_match(raw)
}

/// Validate and normalize a link target.
pub fn sanitize_href(raw: &str, field: &str) -> Result<String, SanitizeError> {
    href(raw).map_err(|reason| SanitizeError::new(field, reason))
}

fn href(raw: &str) -> Result<String, SanitizeReason> {
    if !has_scheme(raw) && has_traversal_segment(raw) {
        return Err(SanitizeReason::PathTraversal);
    }
    if has_forbidden_chars(raw) {
        return Err(SanitizeReason::InvalidCharacter);
    }

    if has_scheme(raw) {
        let parsed =
            url::Url::parse(raw).map_err(|e| SanitizeReason::MalformedUrl(e.to_string()))?;
        if parsed.scheme() != "https" {
            return Err(SanitizeReason::UnsafeScheme(parsed.scheme().to_string()));
        }
        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(SanitizeReason::CredentialsInUrl);
        }
        return Ok(parsed.into());
    }

    if raw.starts_with("//") {
        return Err(SanitizeReason::ProtocolRelative);
    }

    if raw.starts_with('#') {
        return if FRAGMENT.is_match(raw) {
            Ok(raw.to_string())
        } else {
            Err(SanitizeReason::InvalidFragment)
        };
    }

    let split_at = raw.find(['?', '#']).unwrap_or(raw.len());
    let (path, suffix) = raw.split_at(split_at);

    let (leading, rest) = match path.strip_prefix('/') {
        Some(rest) => ("/", rest),
        None => ("", path),
    };
    // Directory links (`/`, `about/`) keep their trailing slash.
    let (body, trailing) = match rest.strip_suffix('/') {
        Some(body) => (body, "/"),
        None => (rest, ""),
    };

    if body.is_empty() {
        return if leading == "/" {
            Ok(format!("/{suffix}"))
        } else {
            Err(SanitizeReason::EmptySegment)
        };
    }

    let normalized = RelativePath::parse(body)?;
    Ok(format!("{leading}{normalized}{trailing}{suffix}"))
}

/// Validate and normalize a project-relative asset reference.
pub fn sanitize_asset_path(raw: &str, field: &str) -> Result<String, SanitizeError> {
    asset(raw).map_err(|reason| SanitizeError::new(field, reason))
}

fn asset(raw: &str) -> Result<String, SanitizeReason> {
    if has_scheme(raw) || raw.starts_with('/') {
        return Err(SanitizeReason::NotRelative);
    }
    if has_traversal_segment(raw) {
        return Err(SanitizeReason::PathTraversal);
    }
    if has_forbidden_chars(raw) {
        return Err(SanitizeReason::InvalidCharacter);
    }
    if raw.contains(['?', '#']) {
        return Err(SanitizeReason::QueryOrHashNotAllowed);
    }
    RelativePath::parse(raw).map(RelativePath::into_string)
}

/// Render-time form of [`sanitize_href`]: falls back to `#` with a warning.
pub fn href_or_fallback(raw: &str, field: &str) -> String {
    sanitize_href(raw, field).unwrap_or_else(|err| {
        log::warn!("{err}; rendering `#` instead");
        "#".to_string()
    })
}

/// Render-time form of [`sanitize_asset_path`]: falls back to an empty string
/// with a warning. Callers treat an empty result as "no asset".
pub fn asset_or_empty(raw: &str, field: &str) -> String {
    sanitize_asset_path(raw, field).unwrap_or_else(|err| {
        log::warn!("{err}; dropping asset reference");
        String::new()
    })
}
