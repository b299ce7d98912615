//! Validated content records.
//!
//! Records are only ever built by [`crate::validate`]. Every link and asset
//! field already holds the sanitizer's normalized output, never the raw value
//! from the data file.

/// One card in the featured-projects section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeaturedProject {
    pub id: String,
    pub title: String,
    pub timeframe: String,
    pub problem: String,
    pub impact: String,
    pub tech: Vec<String>,
    pub links: Vec<ProjectLink>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLink {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillGroup {
    pub category: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperienceEntry {
    pub org: String,
    pub role: String,
    pub dates: String,
    pub impact_bullets: Vec<String>,
    pub tech: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certification {
    pub title: String,
    pub issuer: String,
    pub issued: String,
    pub credential_id: Option<String>,
    pub link: String,
    pub icon: Option<String>,
    pub icon_alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingEntry {
    pub year: u16,
    pub title: String,
    pub author: Option<String>,
    pub isbn: String,
    pub link: Option<String>,
    pub cover: Option<String>,
    /// Explicit tags as written in the data file; inference happens at render time.
    pub tags: Vec<String>,
}

/// Every collection, validated together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub featured: Vec<FeaturedProject>,
    pub skills: Vec<SkillGroup>,
    pub experience: Vec<ExperienceEntry>,
    pub certifications: Vec<Certification>,
    pub reading: Vec<ReadingEntry>,
}

/// The content collections, in load order.
///
/// `name` is both the data file stem (`data/<name>.json`) and the root of
/// every field path reported for that collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Featured,
    Skills,
    Experience,
    Certifications,
    Reading,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Featured,
        Collection::Skills,
        Collection::Experience,
        Collection::Certifications,
        Collection::Reading,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Collection::Featured => "featured",
            Collection::Skills => "skills",
            Collection::Experience => "experience",
            Collection::Certifications => "certifications",
            Collection::Reading => "reading",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.json", self.name())
    }

    /// Inclusive item-count bounds for the top-level array.
    pub fn bounds(self) -> (usize, usize) {
        match self {
            Collection::Featured => (1, 50),
            Collection::Skills => (1, 50),
            Collection::Experience => (1, 100),
            Collection::Certifications => (1, 200),
            Collection::Reading => (1, 2000),
        }
    }
}
