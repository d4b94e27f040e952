use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Facet tags attached to a case study. Missing facets read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSet {
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub pillars: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseStudyDocument {
    pub slug: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default = "default_date")]
    pub date: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub tags: TagSet,
}

impl CaseStudyDocument {
    /// `date` as a calendar day; `None` for placeholders like `No Date`.
    pub fn published_on(&self) -> Option<NaiveDate> {
        let trimmed = self.date.trim();
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return Some(date);
        }
        DateTime::parse_from_rfc3339(trimmed)
            .ok()
            .map(|dt| dt.date_naive())
    }
}

fn default_title() -> String {
    "No Title".to_string()
}

fn default_author() -> String {
    "No Author".to_string()
}

fn default_date() -> String {
    "No Date".to_string()
}

/// A case study plus its markdown body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseStudyArticle {
    #[serde(flatten)]
    pub document: CaseStudyDocument,
    #[serde(default)]
    pub content: String,
}

/// Sorted, deduplicated tag values across a collection, per facet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableTags {
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub pillars: Vec<String>,
}

impl AvailableTags {
    pub fn collect<'a, I>(studies: I) -> Self
    where
        I: IntoIterator<Item = &'a CaseStudyDocument>,
    {
        let mut countries = BTreeSet::new();
        let mut industries = BTreeSet::new();
        let mut pillars = BTreeSet::new();
        for study in studies {
            countries.extend(study.tags.countries.iter().cloned());
            industries.extend(study.tags.industries.iter().cloned());
            pillars.extend(study.tags.pillars.iter().cloned());
        }

        Self {
            countries: countries.into_iter().collect(),
            industries: industries.into_iter().collect(),
            pillars: pillars.into_iter().collect(),
        }
    }
}
