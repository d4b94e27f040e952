use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::warn;

use super::domain::{is_known_industry, Indicator, IndustryRecord, Pillar, PillarScores};
use super::import::MetricDefinition;
use super::normalize::{Directionality, NormalizedObservation};

/// country -> industry -> indicators
pub type IndicatorSet = BTreeMap<String, BTreeMap<String, Vec<Indicator>>>;

/// Metric definitions keyed by id. Later duplicates replace earlier ones.
#[derive(Debug, Clone, Default)]
pub struct MetricCatalog {
    metrics: BTreeMap<String, MetricDefinition>,
}

impl MetricCatalog {
    pub fn new(definitions: Vec<MetricDefinition>) -> Self {
        let mut metrics = BTreeMap::new();
        for definition in definitions {
            if !is_known_industry(&definition.industry) {
                warn!(
                    metric = %definition.metric_id,
                    industry = %definition.industry,
                    "catalog metric targets an unlisted industry"
                );
            }
            if let Some(previous) = metrics.insert(definition.metric_id.clone(), definition) {
                warn!(metric = %previous.metric_id, "catalog lists metric twice; keeping the later row");
            }
        }
        Self { metrics }
    }

    pub fn get(&self, metric_id: &str) -> Option<&MetricDefinition> {
        self.metrics.get(metric_id)
    }

    /// Unknown metrics default to `POS`.
    pub fn directionality(&self, metric_id: &str) -> Directionality {
        self.get(metric_id)
            .map(|definition| definition.directionality)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricDefinition> {
        self.metrics.values()
    }
}

/// Joins normalized observations with the catalog for one year. Every
/// country seen in `normalized` gets an indicator per usable catalog metric;
/// metrics without an observation that year stay unmeasured.
pub fn assemble_indicators(
    catalog: &MetricCatalog,
    normalized: &[NormalizedObservation],
    year: i32,
) -> IndicatorSet {
    let mut observed: HashMap<(&str, &str), f64> = HashMap::new();
    let mut countries = BTreeSet::new();
    let mut uncatalogued = BTreeSet::new();

    for observation in normalized {
        countries.insert(observation.country_code.as_str());
        if catalog.get(&observation.metric_id).is_none() {
            uncatalogued.insert(observation.metric_id.as_str());
            continue;
        }
        if observation.year == year {
            observed.insert(
                (
                    observation.country_code.as_str(),
                    observation.metric_id.as_str(),
                ),
                observation.normalized_value,
            );
        }
    }

    for metric_id in &uncatalogued {
        warn!(metric = metric_id, "observed metric missing from catalog; skipped");
    }

    let usable: Vec<(&MetricDefinition, Pillar)> = catalog
        .iter()
        .filter_map(|definition| match Pillar::parse(&definition.pillar) {
            Some(pillar) => Some((definition, pillar)),
            None => {
                warn!(
                    metric = %definition.metric_id,
                    pillar = %definition.pillar,
                    "catalog metric has unknown pillar; skipped"
                );
                None
            }
        })
        .collect();

    let mut set = IndicatorSet::new();
    for country in countries {
        let industries = set.entry(country.to_string()).or_default();
        for (definition, pillar) in &usable {
            let value = observed
                .get(&(country, definition.metric_id.as_str()))
                .copied();
            industries
                .entry(definition.industry.clone())
                .or_default()
                .push(Indicator {
                    key: definition.metric_id.clone(),
                    description: definition.name.clone(),
                    pillar: *pillar,
                    value,
                    weight: definition.weight,
                    source: definition.source.clone(),
                    year: Some(year),
                });
        }
    }

    set
}

/// Pillar scores recomputed from an assembled set. No upstream confidence
/// exists at this stage, so every score carries none.
pub fn score_indicator_set(set: &IndicatorSet) -> BTreeMap<String, BTreeMap<String, PillarScores>> {
    set.iter()
        .map(|(country, industries)| {
            let scored = industries
                .iter()
                .map(|(industry, indicators)| {
                    let record = IndustryRecord {
                        key: industry.clone(),
                        indicators: indicators.clone(),
                        scores: PillarScores::empty(),
                    };
                    (industry.clone(), record.pillar_scores())
                })
                .collect();
            (country.clone(), scored)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vitals::normalize::MIN_MAX_METHOD;

    fn definition(metric_id: &str, pillar: &str, weight: f64) -> MetricDefinition {
        MetricDefinition {
            metric_id: metric_id.to_string(),
            name: metric_id.replace('_', " "),
            description: String::new(),
            industry: "energy".to_string(),
            pillar: pillar.to_string(),
            weight,
            directionality: Directionality::Positive,
            source: "EIA".to_string(),
            units: String::new(),
        }
    }

    fn normalized(country: &str, year: i32, metric_id: &str, value: f64) -> NormalizedObservation {
        NormalizedObservation {
            country_code: country.to_string(),
            year,
            metric_id: metric_id.to_string(),
            normalized_value: value,
            method: MIN_MAX_METHOD,
            window: "2019-2020".to_string(),
        }
    }

    #[test]
    fn missing_observations_become_unmeasured_indicators() {
        let catalog = MetricCatalog::new(vec![
            definition("grid_uptime", "resilience", 2.0),
            definition("reserve_margin", "resilience", 1.0),
        ]);
        let observations = vec![
            normalized("USA", 2020, "grid_uptime", 80.0),
            normalized("USA", 2019, "reserve_margin", 10.0),
        ];

        let set = assemble_indicators(&catalog, &observations, 2020);

        let energy = &set["USA"]["energy"];
        assert_eq!(energy.len(), 2);
        let reserve = energy
            .iter()
            .find(|indicator| indicator.key == "reserve_margin")
            .expect("reserve margin present");
        assert_eq!(reserve.value, None);
        assert_eq!(reserve.year, Some(2020));
    }

    #[test]
    fn unknown_pillars_and_uncatalogued_metrics_are_dropped() {
        let catalog = MetricCatalog::new(vec![
            definition("grid_uptime", "resilience", 1.0),
            definition("vibes", "morale", 1.0),
        ]);
        let observations = vec![
            normalized("USA", 2020, "grid_uptime", 80.0),
            normalized("USA", 2020, "mystery_metric", 50.0),
        ];

        let set = assemble_indicators(&catalog, &observations, 2020);

        let keys: Vec<&str> = set["USA"]["energy"]
            .iter()
            .map(|indicator| indicator.key.as_str())
            .collect();
        assert_eq!(keys, vec!["grid_uptime"]);
    }

    #[test]
    fn assembled_sets_score_by_weighted_mean() {
        let catalog = MetricCatalog::new(vec![
            definition("grid_uptime", "resilience", 2.0),
            definition("reserve_margin", "resilience", 1.0),
        ]);
        let observations = vec![
            normalized("USA", 2020, "grid_uptime", 80.0),
            normalized("USA", 2020, "reserve_margin", 60.0),
        ];

        let scores = score_indicator_set(&assemble_indicators(&catalog, &observations, 2020));

        let resilience = scores["USA"]["energy"].get(Pillar::Resilience);
        let score = resilience.score.expect("resilience scored");
        assert!((score - 73.333_333).abs() < 1e-4);
        assert_eq!(resilience.confidence, None);
        assert_eq!(scores["USA"]["energy"].get(Pillar::Autonomy).score, None);
    }
}
