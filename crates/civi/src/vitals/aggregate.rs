//! Weighted pillar aggregation, unweighted scope roll-up, and the
//! confidence-derived error margin.

use super::domain::{Indicator, IndustryRecord, Pillar, PillarScore, PillarScores};
use std::collections::BTreeMap;

/// Share of the score used as the margin when confidence is zero.
const MARGIN_AT_ZERO_CONFIDENCE: f64 = 0.1;

/// Weighted mean of the measured indicators. Unmeasured indicators are left
/// out entirely. Confidence is carried through untouched, but only alongside
/// a score.
pub fn aggregate_pillar<'a, I>(pillar: Pillar, indicators: I, confidence: Option<f64>) -> PillarScore
where
    I: IntoIterator<Item = &'a Indicator>,
{
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    let mut measured = 0usize;

    for indicator in indicators {
        debug_assert_eq!(indicator.pillar, pillar, "indicator filed under another pillar");
        debug_assert!(indicator.weight > 0.0, "indicator weight must be positive");
        if let Some(value) = indicator.value {
            weighted_sum += value * indicator.weight;
            total_weight += indicator.weight;
            measured += 1;
        }
    }

    if measured == 0 {
        return PillarScore::empty(pillar);
    }

    PillarScore {
        pillar,
        score: Some(weighted_sum / total_weight),
        confidence,
    }
}

/// With a pillar selected, that pillar's score as-is; otherwise the plain
/// mean over pillars that have a score.
pub fn scope_score(scores: &PillarScores, pillar: Option<Pillar>) -> Option<f64> {
    if let Some(pillar) = pillar {
        return scores.get(pillar).score;
    }

    let present: Vec<f64> = scores.iter().filter_map(|entry| entry.score).collect();
    if present.is_empty() {
        return None;
    }
    Some(present.iter().sum::<f64>() / present.len() as f64)
}

/// `(1 - confidence) * score * 0.1`; absent when either input is.
pub fn error_margin(confidence: Option<f64>, score: Option<f64>) -> Option<f64> {
    match (confidence, score) {
        (Some(confidence), Some(score)) => {
            Some((1.0 - confidence) * score * MARGIN_AT_ZERO_CONFIDENCE)
        }
        _ => None,
    }
}

/// The pillar score picked out by an (industry?, pillar?) selector.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScopedScore {
    pub score: Option<f64>,
    /// Present only when the selector names a single pillar.
    pub pillar: Option<PillarScore>,
}

impl ScopedScore {
    const ABSENT: Self = Self {
        score: None,
        pillar: None,
    };

    pub fn error_margin(&self) -> Option<f64> {
        self.pillar.and_then(|pillar| pillar.error_margin())
    }
}

/// Anything carrying overall pillar scores plus per-industry records:
/// current country documents and single historical years alike.
pub trait ScopedScores {
    fn overall(&self) -> &PillarScores;
    fn industries(&self) -> &BTreeMap<String, IndustryRecord>;

    /// Resolves a selector against this scope. Unknown pillars or industries
    /// come back as an absent score rather than an error.
    fn select(&self, industry: Option<&str>, pillar: Option<&str>) -> ScopedScore {
        let pillar = match pillar {
            Some(raw) => match Pillar::parse(raw) {
                Some(parsed) => Some(parsed),
                None => return ScopedScore::ABSENT,
            },
            None => None,
        };

        match industry {
            Some(key) => {
                let Some(record) = self.industries().get(key) else {
                    return ScopedScore::ABSENT;
                };
                match pillar {
                    Some(pillar) => {
                        let selected = record.pillar_score(pillar);
                        ScopedScore {
                            score: selected.score,
                            pillar: Some(selected),
                        }
                    }
                    None => ScopedScore {
                        score: scope_score(&record.pillar_scores(), None),
                        pillar: None,
                    },
                }
            }
            None => match pillar {
                Some(pillar) => {
                    let selected = *self.overall().get(pillar);
                    ScopedScore {
                        score: selected.score,
                        pillar: Some(selected),
                    }
                }
                None => ScopedScore {
                    score: scope_score(self.overall(), None),
                    pillar: None,
                },
            },
        }
    }
}

impl ScopedScores for super::domain::CountryRecord {
    fn overall(&self) -> &PillarScores {
        &self.scores
    }

    fn industries(&self) -> &BTreeMap<String, IndustryRecord> {
        &self.industries
    }
}

impl ScopedScores for super::domain::HistoricalRecord {
    fn overall(&self) -> &PillarScores {
        &self.scores
    }

    fn industries(&self) -> &BTreeMap<String, IndustryRecord> {
        &self.industries
    }
}
