//! Tagged case-study collection: index building, facet filtering, and
//! fixed-size pagination.

pub mod domain;
pub mod index;
pub mod query;
pub mod router;

pub use domain::{AvailableTags, CaseStudyArticle, CaseStudyDocument, TagSet};
pub use index::{CaseStudyError, CaseStudyIndex};
pub use query::{query_studies, StudyFilters, StudyPage, PAGE_SIZE};
pub use router::case_study_router;
