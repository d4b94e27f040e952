use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use super::domain::{AvailableTags, CaseStudyArticle, CaseStudyDocument};
use super::query::{query_studies, StudyFilters, StudyPage};

pub const CASE_STUDIES_DIR: &str = "case-studies";
pub const INDEX_FILE: &str = "index.json";
pub const ARTICLES_DIR: &str = "articles";

#[derive(Debug, thiserror::Error)]
pub enum CaseStudyError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid JSON in {document}: {source}")]
    Json {
        document: String,
        source: serde_json::Error,
    },
    #[error("case study slug '{0}' appears more than once")]
    DuplicateSlug(String),
}

#[derive(Debug, Deserialize)]
struct IndexDocument {
    #[serde(default)]
    studies: Vec<CaseStudyDocument>,
    #[serde(default)]
    available_tags: Option<AvailableTags>,
}

/// Immutable case-study collection: newest first, with tag facets derived
/// from the studies themselves.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CaseStudyIndex {
    studies: Vec<CaseStudyDocument>,
    available_tags: AvailableTags,
    #[serde(skip)]
    articles: BTreeMap<String, CaseStudyArticle>,
}

impl CaseStudyIndex {
    /// Orders by date descending, slug ascending on ties. Undated studies
    /// sort after every dated one.
    pub fn from_documents(mut studies: Vec<CaseStudyDocument>) -> Result<Self, CaseStudyError> {
        {
            let mut seen = HashSet::new();
            for study in &studies {
                if !seen.insert(study.slug.as_str()) {
                    return Err(CaseStudyError::DuplicateSlug(study.slug.clone()));
                }
            }
        }

        studies.sort_by(|a, b| {
            let by_date = match (a.published_on(), b.published_on()) {
                (Some(left), Some(right)) => right.cmp(&left),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            by_date.then_with(|| a.slug.cmp(&b.slug))
        });
        let available_tags = AvailableTags::collect(&studies);

        Ok(Self {
            studies,
            available_tags,
            articles: BTreeMap::new(),
        })
    }

    /// Reads an `index.json` payload. Supplied tag lists are rebuilt from
    /// the studies rather than trusted.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CaseStudyError> {
        let document: IndexDocument =
            serde_json::from_reader(reader).map_err(|source| CaseStudyError::Json {
                document: INDEX_FILE.to_string(),
                source,
            })?;

        let index = Self::from_documents(document.studies)?;
        if let Some(supplied) = document.available_tags {
            if supplied != index.available_tags {
                debug!("supplied available_tags differ from the studies; using derived tags");
            }
        }
        Ok(index)
    }

    /// Loads `case-studies/index.json` and `case-studies/articles/*.json`
    /// under `root`. Missing files leave the collection empty.
    pub fn from_dir<P: AsRef<Path>>(root: P) -> Result<Self, CaseStudyError> {
        let dir = root.as_ref().join(CASE_STUDIES_DIR);
        let index_path = dir.join(INDEX_FILE);
        if !index_path.is_file() {
            warn!(path = %index_path.display(), "case-study index missing; serving none");
            return Ok(Self::default());
        }

        let file = fs::File::open(&index_path).map_err(|source| CaseStudyError::Io {
            path: index_path.display().to_string(),
            source,
        })?;
        let index = Self::from_reader(file)?;
        let articles = read_articles(&dir.join(ARTICLES_DIR))?;
        let index = index.with_articles(articles);

        info!(
            studies = index.len(),
            articles = index.articles.len(),
            "case studies loaded"
        );
        Ok(index)
    }

    /// Attaches article bodies by slug. Articles with no index entry are
    /// kept but never listed.
    pub fn with_articles(mut self, articles: Vec<CaseStudyArticle>) -> Self {
        for article in articles {
            if self.find(&article.document.slug).is_none() {
                warn!(slug = %article.document.slug, "article has no index entry");
            }
            self.articles
                .insert(article.document.slug.clone(), article);
        }
        self
    }

    pub fn studies(&self) -> &[CaseStudyDocument] {
        &self.studies
    }

    pub fn available_tags(&self) -> &AvailableTags {
        &self.available_tags
    }

    pub fn find(&self, slug: &str) -> Option<&CaseStudyDocument> {
        self.studies.iter().find(|study| study.slug == slug)
    }

    pub fn article(&self, slug: &str) -> Option<&CaseStudyArticle> {
        self.articles.get(slug)
    }

    pub fn query(&self, filters: &StudyFilters, page: usize) -> StudyPage {
        query_studies(&self.studies, filters, page)
    }

    pub fn len(&self) -> usize {
        self.studies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.studies.is_empty()
    }
}

fn read_articles(dir: &Path) -> Result<Vec<CaseStudyArticle>, CaseStudyError> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "article directory missing");
        return Ok(Vec::new());
    }

    let io_error = |source| CaseStudyError::Io {
        path: dir.display().to_string(),
        source,
    };
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut articles = Vec::with_capacity(paths.len());
    for path in paths {
        let file = fs::File::open(&path).map_err(|source| CaseStudyError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let article: CaseStudyArticle =
            serde_json::from_reader(file).map_err(|source| CaseStudyError::Json {
                document: path.display().to_string(),
                source,
            })?;
        articles.push(article);
    }
    Ok(articles)
}
