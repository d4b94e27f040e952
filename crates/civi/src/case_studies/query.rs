use serde::{Deserialize, Serialize};

use super::domain::CaseStudyDocument;

pub const PAGE_SIZE: usize = 9;

/// Facet predicates. Every non-empty facet must match (AND); within a
/// facet any one listed value is enough (OR).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyFilters {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub pillars: Vec<String>,
}

impl StudyFilters {
    /// Lower-cased, whitespace-split search terms.
    pub fn keywords(&self) -> Vec<String> {
        self.search
            .split_whitespace()
            .map(str::to_lowercase)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty()
            && self.countries.is_empty()
            && self.industries.is_empty()
            && self.pillars.is_empty()
    }

    pub fn matches(&self, study: &CaseStudyDocument) -> bool {
        let title = study.title.to_lowercase();
        self.keywords()
            .iter()
            .all(|keyword| title.contains(keyword.as_str()))
            && facet_matches(&self.countries, &study.tags.countries)
            && facet_matches(&self.industries, &study.tags.industries)
            && facet_matches(&self.pillars, &study.tags.pillars)
    }
}

fn facet_matches(wanted: &[String], tags: &[String]) -> bool {
    wanted.is_empty() || wanted.iter().any(|value| tags.contains(value))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudyPage {
    pub paginated_studies: Vec<CaseStudyDocument>,
    pub total_pages: usize,
    pub total_matches: usize,
    pub page: usize,
}

/// Filters then slices one 1-based page. Pages outside `1..=total_pages`
/// come back empty rather than clamped.
pub fn query_studies(studies: &[CaseStudyDocument], filters: &StudyFilters, page: usize) -> StudyPage {
    let matching: Vec<&CaseStudyDocument> = studies
        .iter()
        .filter(|study| filters.matches(study))
        .collect();

    let total_matches = matching.len();
    let paginated_studies = match page.checked_sub(1) {
        Some(index) => matching
            .into_iter()
            .skip(index.saturating_mul(PAGE_SIZE))
            .take(PAGE_SIZE)
            .cloned()
            .collect(),
        None => Vec::new(),
    };

    StudyPage {
        paginated_studies,
        total_pages: total_matches.div_ceil(PAGE_SIZE),
        total_matches,
        page,
    }
}
