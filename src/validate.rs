//! Schema validation for the content collections.
//!
//! Each collection is checked in the same order: array shape and length,
//! then per item the object shape (allow-listed keys only), then each field's
//! type, length or range, and finally the sanitizers for link and asset
//! fields. The first violation anywhere is returned and nothing else is
//! checked; there is no partial acceptance.
//!
//! Field paths accumulate as `collection[index].field[subindex]`, for example
//! `featured[0].links[1].url`, so every error points at exactly one value.
//!
//! Validation reads `serde_json::Value`s and never modifies them. What comes
//! back is a set of typed records holding the sanitizers' normalized output.

use crate::sanitize::{SanitizeError, sanitize_asset_path, sanitize_href};
use crate::schema::{
    Certification, Collection, Content, ExperienceEntry, FeaturedProject, ProjectLink,
    ReadingEntry, SkillGroup,
};
use serde_json::{Map, Value};
use thiserror::Error;

pub const MIN_YEAR: u16 = 1900;
pub const MAX_YEAR: u16 = 2100;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Wrong JSON type, array bounds, missing or unexpected keys.
    #[error("{path}: {detail}")]
    SchemaShape { path: String, detail: String },
    /// Length and range violations, including `invalid year`.
    #[error("{path}: {detail}")]
    FieldConstraint { path: String, detail: String },
    #[error("unsafe URL at {0}")]
    UnsafeUrl(SanitizeError),
    #[error("path traversal at {0}")]
    PathTraversal(SanitizeError),
}

impl ValidationError {
    /// The field path the error points at.
    pub fn path(&self) -> &str {
        match self {
            Self::SchemaShape { path, .. } | Self::FieldConstraint { path, .. } => path,
            Self::UnsafeUrl(err) | Self::PathTraversal(err) => &err.field,
        }
    }

    fn shape(path: &str, detail: impl Into<String>) -> Self {
        Self::SchemaShape {
            path: path.to_string(),
            detail: detail.into(),
        }
    }

    fn constraint(path: &str, detail: impl Into<String>) -> Self {
        Self::FieldConstraint {
            path: path.to_string(),
            detail: detail.into(),
        }
    }
}

impl From<SanitizeError> for ValidationError {
    fn from(err: SanitizeError) -> Self {
        if err.reason.is_traversal() {
            Self::PathTraversal(err)
        } else {
            Self::UnsafeUrl(err)
        }
    }
}

type Result<T> = std::result::Result<T, ValidationError>;

/// Validate every collection of a `{featured, skills, experience,
/// certifications, reading}` object.
pub fn validate_content(data: &Value) -> Result<Content> {
    let root = data
        .as_object()
        .ok_or_else(|| ValidationError::shape("content", "expected an object of collections"))?;
    let names: Vec<&str> = Collection::ALL.iter().map(|c| c.name()).collect();
    check_keys(root, &names, "content")?;

    let collection = |c: Collection| -> Result<&Value> {
        root.get(c.name())
            .ok_or_else(|| ValidationError::shape(c.name(), "missing collection"))
    };

    Ok(Content {
        featured: validate_featured(collection(Collection::Featured)?)?,
        skills: validate_skills(collection(Collection::Skills)?)?,
        experience: validate_experience(collection(Collection::Experience)?)?,
        certifications: validate_certifications(collection(Collection::Certifications)?)?,
        reading: validate_reading(collection(Collection::Reading)?)?,
    })
}

pub fn validate_featured(value: &Value) -> Result<Vec<FeaturedProject>> {
    each_item(value, Collection::Featured, |item| {
        let obj = item.object(&[
            "id",
            "title",
            "timeframe",
            "problem",
            "impact",
            "tech",
            "links",
        ])?;
        Ok(FeaturedProject {
            id: obj.string("id", 80)?,
            title: obj.string("title", 200)?,
            timeframe: obj.string("timeframe", 120)?,
            problem: obj.string("problem", 900)?,
            impact: obj.string("impact", 900)?,
            tech: obj.string_list("tech", 0, 20, 80)?,
            links: project_links(&obj)?,
        })
    })
}

fn project_links(obj: &Object<'_>) -> Result<Vec<ProjectLink>> {
    let path = obj.path("links");
    obj.array("links", 0, 12)?
        .iter()
        .enumerate()
        .map(|(i, link)| {
            let link = Item::new(link, format!("{path}[{i}]")).object(&["label", "url"])?;
            Ok(ProjectLink {
                label: link.string("label", 80)?,
                url: link.href("url")?,
            })
        })
        .collect()
}

pub fn validate_skills(value: &Value) -> Result<Vec<SkillGroup>> {
    each_item(value, Collection::Skills, |item| {
        let obj = item.object(&["category", "items"])?;
        Ok(SkillGroup {
            category: obj.string("category", 80)?,
            items: obj.string_list("items", 1, 40, 80)?,
        })
    })
}

pub fn validate_experience(value: &Value) -> Result<Vec<ExperienceEntry>> {
    each_item(value, Collection::Experience, |item| {
        let obj = item.object(&["org", "role", "dates", "impact_bullets", "tech"])?;
        Ok(ExperienceEntry {
            org: obj.string("org", 120)?,
            role: obj.string("role", 160)?,
            dates: obj.string("dates", 80)?,
            impact_bullets: obj.string_list("impact_bullets", 1, 20, 500)?,
            tech: obj.string_list("tech", 0, 30, 80)?,
        })
    })
}

pub fn validate_certifications(value: &Value) -> Result<Vec<Certification>> {
    each_item(value, Collection::Certifications, |item| {
        let obj = item.object(&[
            "title",
            "issuer",
            "issued",
            "credential_id",
            "link",
            "icon",
            "icon_alt",
        ])?;
        Ok(Certification {
            title: obj.string("title", 220)?,
            issuer: obj.string("issuer", 220)?,
            issued: obj.string("issued", 120)?,
            credential_id: obj.optional_string("credential_id", 120)?,
            link: obj.href("link")?,
            icon: obj.optional_asset("icon")?,
            icon_alt: obj.optional_string("icon_alt", 120)?,
        })
    })
}

pub fn validate_reading(value: &Value) -> Result<Vec<ReadingEntry>> {
    each_item(value, Collection::Reading, |item| {
        let obj = item.object(&[
            "year", "title", "author", "isbn", "link", "cover", "tags",
        ])?;
        Ok(ReadingEntry {
            year: obj.year("year")?,
            title: obj.string("title", 240)?,
            author: obj.optional_string("author", 160)?,
            isbn: obj.string("isbn", 80)?,
            link: obj.optional_href("link")?,
            cover: obj.optional_asset("cover")?,
            tags: match obj.get("tags") {
                Some(_) => obj.string_list("tags", 0, 20, 40)?,
                None => Vec::new(),
            },
        })
    })
}

/// Check the top-level array, then run `f` on each element in order.
fn each_item<T>(
    value: &Value,
    collection: Collection,
    mut f: impl FnMut(Item<'_>) -> Result<T>,
) -> Result<Vec<T>> {
    let name = collection.name();
    let (min, max) = collection.bounds();
    let items = expect_array(value, name, min, max)?;
    items
        .iter()
        .enumerate()
        .map(|(i, v)| f(Item::new(v, format!("{name}[{i}]"))))
        .collect()
}

fn expect_array<'a>(value: &'a Value, path: &str, min: usize, max: usize) -> Result<&'a [Value]> {
    let items = value
        .as_array()
        .ok_or_else(|| ValidationError::shape(path, format!("expected an array, found {}", kind(value))))?;
    if items.len() < min || items.len() > max {
        return Err(ValidationError::shape(
            path,
            format!("expected {min}..{max} items, found {}", items.len()),
        ));
    }
    Ok(items)
}

fn check_keys(obj: &Map<String, Value>, allowed: &[&str], path: &str) -> Result<()> {
    let unexpected: Vec<&str> = obj
        .keys()
        .map(String::as_str)
        .filter(|k| !allowed.contains(k))
        .collect();
    if unexpected.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::shape(
            path,
            format!("unexpected key(s): {}", unexpected.join(", ")),
        ))
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A value plus the path it was reached by.
struct Item<'a> {
    value: &'a Value,
    path: String,
}

impl<'a> Item<'a> {
    fn new(value: &'a Value, path: String) -> Self {
        Self { value, path }
    }

    fn object(&self, allowed: &[&str]) -> Result<Object<'a>> {
        let map = self.value.as_object().ok_or_else(|| {
            ValidationError::shape(
                &self.path,
                format!("expected an object, found {}", kind(self.value)),
            )
        })?;
        check_keys(map, allowed, &self.path)?;
        Ok(Object {
            map,
            path: self.path.clone(),
        })
    }
}

/// An object whose keys already passed the allow-list.
struct Object<'a> {
    map: &'a Map<String, Value>,
    path: String,
}

impl<'a> Object<'a> {
    fn path(&self, key: &str) -> String {
        format!("{}.{key}", self.path)
    }

    /// A present, non-null value. Null counts as absent.
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn require(&self, key: &str) -> Result<&'a Value> {
        self.get(key)
            .ok_or_else(|| ValidationError::shape(&self.path(key), "missing required key"))
    }

    fn string(&self, key: &str, max: usize) -> Result<String> {
        let value = self.require(key)?;
        bounded_string(value, &self.path(key), max)
    }

    fn optional_string(&self, key: &str, max: usize) -> Result<Option<String>> {
        self.get(key)
            .map(|v| bounded_string(v, &self.path(key), max))
            .transpose()
    }

    fn array(&self, key: &str, min: usize, max: usize) -> Result<&'a [Value]> {
        expect_array(self.require(key)?, &self.path(key), min, max)
    }

    fn string_list(&self, key: &str, min: usize, max: usize, item_max: usize) -> Result<Vec<String>> {
        let path = self.path(key);
        self.array(key, min, max)?
            .iter()
            .enumerate()
            .map(|(i, v)| bounded_string(v, &format!("{path}[{i}]"), item_max))
            .collect()
    }

    fn href(&self, key: &str) -> Result<String> {
        let raw = self.string(key, 2048)?;
        Ok(sanitize_href(&raw, &self.path(key))?)
    }

    fn optional_href(&self, key: &str) -> Result<Option<String>> {
        match self.optional_string(key, 2048)? {
            Some(raw) => Ok(Some(sanitize_href(&raw, &self.path(key))?)),
            None => Ok(None),
        }
    }

    fn optional_asset(&self, key: &str) -> Result<Option<String>> {
        match self.optional_string(key, 512)? {
            Some(raw) => Ok(Some(sanitize_asset_path(&raw, &self.path(key))?)),
            None => Ok(None),
        }
    }

    /// Accepts `2025` or `"2025"`; anything else is an invalid year.
    fn year(&self, key: &str) -> Result<u16> {
        let path = self.path(key);
        let value = self.require(key)?;
        let invalid = || {
            ValidationError::constraint(
                &path,
                format!(
                    "invalid year {value}: expected a whole-number year in range {MIN_YEAR}..{MAX_YEAR}"
                ),
            )
        };
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .ok_or_else(invalid)?;

        if !number.is_finite()
            || number.fract() != 0.0
            || number < f64::from(MIN_YEAR)
            || number > f64::from(MAX_YEAR)
        {
            return Err(invalid());
        }
        Ok(number as u16)
    }
}

fn bounded_string(value: &Value, path: &str, max: usize) -> Result<String> {
    let s = value.as_str().ok_or_else(|| {
        ValidationError::shape(path, format!("expected a string, found {}", kind(value)))
    })?;
    if s.trim().is_empty() {
        return Err(ValidationError::constraint(path, "must not be empty"));
    }
    let len = s.chars().count();
    if len > max {
        return Err(ValidationError::constraint(
            path,
            format!("must be at most {max} characters, found {len}"),
        ));
    }
    Ok(s.to_string())
}
