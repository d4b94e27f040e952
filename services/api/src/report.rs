use crate::infra::parse_year;
use civi::case_studies::{CaseStudyIndex, StudyFilters};
use civi::config::AppConfig;
use civi::error::AppError;
use civi::vitals::{
    assemble_indicators, build_chart, normalize_observations, parse_catalog_path,
    parse_observations_path, score_indicator_set, CountryProfileView, MetricCatalog, Pillar,
    Selection, SnapshotLoader, Timeframe,
};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct CountryArgs {
    /// ISO 3166-1 alpha-3 country code
    pub(crate) alpha3: String,
    /// Score from the historical record for this year instead of the current snapshot
    #[arg(long, value_parser = parse_year)]
    pub(crate) year: Option<i32>,
}

#[derive(Args, Debug)]
pub(crate) struct SeriesArgs {
    /// ISO 3166-1 alpha-3 country code
    #[arg(long)]
    pub(crate) country: String,
    /// Industry key (e.g. energy, food_agriculture); omit for the overall score
    #[arg(long)]
    pub(crate) industry: Option<String>,
    /// Pillar name; omit for the mean across pillars
    #[arg(long)]
    pub(crate) pillar: Option<String>,
    /// First year to include (defaults to CIVI_START_YEAR)
    #[arg(long, value_parser = parse_year)]
    pub(crate) start: Option<i32>,
    /// Last year to include (defaults to CIVI_END_YEAR)
    #[arg(long, value_parser = parse_year)]
    pub(crate) end: Option<i32>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct StudiesArgs {
    /// Keywords that must all appear in the title
    #[arg(long, default_value = "")]
    pub(crate) search: String,
    /// Country tag; repeat for any-of matching
    #[arg(long = "country")]
    pub(crate) countries: Vec<String>,
    /// Industry tag; repeat for any-of matching
    #[arg(long = "industry")]
    pub(crate) industries: Vec<String>,
    /// Pillar tag; repeat for any-of matching
    #[arg(long = "pillar")]
    pub(crate) pillars: Vec<String>,
    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    pub(crate) page: usize,
}

#[derive(Args, Debug)]
pub(crate) struct NormalizeArgs {
    /// Raw metric CSV (country_code,year,metric_id,metric_value,source)
    #[arg(long)]
    pub(crate) raw: PathBuf,
    /// Metric catalog CSV
    #[arg(long)]
    pub(crate) catalog: PathBuf,
    /// Year to assemble indicators for
    #[arg(long, value_parser = parse_year)]
    pub(crate) year: i32,
}

pub(crate) fn run_country_report(config: &AppConfig, args: CountryArgs) -> Result<(), AppError> {
    let store = SnapshotLoader::from_dir(&config.data.root)?;
    match store.country(&args.alpha3) {
        Some(record) => {
            let profile = match args.year {
                None => CountryProfileView::from(record),
                Some(year) => CountryProfileView::for_year(
                    record,
                    year,
                    store.record_for_year(&record.alpha3, year),
                ),
            };
            render_country_profile(&profile);
        }
        None => println!(
            "No snapshot for {} under {}",
            args.alpha3.to_ascii_uppercase(),
            config.data.root.display()
        ),
    }
    Ok(())
}

pub(crate) fn run_series_report(config: &AppConfig, args: SeriesArgs) -> Result<(), AppError> {
    let defaults = config.analysis.default_timeframe;
    let timeframe = Timeframe::new(
        args.start.unwrap_or(defaults.start_year),
        args.end.unwrap_or(defaults.end_year),
    );
    if !timeframe.is_valid() {
        println!(
            "Start year {} is after end year {}",
            timeframe.start_year, timeframe.end_year
        );
        return Ok(());
    }

    let store = SnapshotLoader::from_dir(&config.data.root)?;
    let mut selection = Selection::new(args.country);
    selection.industry = args.industry;
    selection.pillar = args.pillar;

    let chart = build_chart(&store, std::slice::from_ref(&selection), timeframe);
    let Some(dataset) = chart.datasets.first() else {
        println!(
            "No history loaded for {}",
            selection.country.to_ascii_uppercase()
        );
        return Ok(());
    };

    println!("{}", dataset.label);
    println!(
        "Years {}-{}",
        timeframe.start_year, timeframe.end_year
    );
    if dataset.data.is_empty() {
        println!("  no recorded years in range");
    }
    for point in &dataset.data {
        match (point.y, point.error) {
            (Some(score), Some(error)) => println!("  {}: {:.1} ± {:.1}", point.x, score, error),
            (Some(score), None) => println!("  {}: {:.1}", point.x, score),
            (None, _) => println!("  {}: no data", point.x),
        }
    }
    Ok(())
}

pub(crate) fn run_studies_report(config: &AppConfig, args: StudiesArgs) -> Result<(), AppError> {
    let index = CaseStudyIndex::from_dir(&config.data.root)?;
    let filters = StudyFilters {
        search: args.search,
        countries: args.countries,
        industries: args.industries,
        pillars: args.pillars,
    };

    let page = index.query(&filters, args.page);
    println!(
        "Case studies: {} match, page {} of {}",
        page.total_matches, page.page, page.total_pages
    );
    for study in &page.paginated_studies {
        println!("  {}  {}  ({})", study.date, study.title, study.slug);
        let tags: Vec<&str> = study
            .tags
            .countries
            .iter()
            .chain(&study.tags.industries)
            .chain(&study.tags.pillars)
            .map(String::as_str)
            .collect();
        if !tags.is_empty() {
            println!("    tags: {}", tags.join(", "));
        }
    }
    Ok(())
}

pub(crate) fn run_normalize(args: NormalizeArgs) -> Result<(), AppError> {
    let observations = parse_observations_path(&args.raw)?;
    let catalog = MetricCatalog::new(parse_catalog_path(&args.catalog)?);
    let run = normalize_observations(&observations, |metric| catalog.directionality(metric));

    println!("Normalized {} observations", run.observations.len());
    for entry in &run.log {
        println!(
            "  {} [{}] {}-{} min {:.3} max {:.3}",
            entry.metric_id,
            entry.method,
            entry.window_start_year,
            entry.window_end_year,
            entry.min,
            entry.max
        );
    }
    if !run.skipped_metrics.is_empty() {
        println!("Skipped: {}", run.skipped_metrics.join(", "));
    }

    let scores = score_indicator_set(&assemble_indicators(&catalog, &run.observations, args.year));
    println!("\nPillar scores for {}", args.year);
    for (country, industries) in &scores {
        println!("{country}");
        for (industry, pillars) in industries {
            let rendered: Vec<String> = Pillar::ordered()
                .into_iter()
                .map(|pillar| match pillars.get(pillar).score {
                    Some(score) => format!("{} {:.1}", pillar.label(), score),
                    None => format!("{} -", pillar.label()),
                })
                .collect();
            println!("  {industry}: {}", rendered.join(" | "));
        }
    }
    Ok(())
}

fn render_country_profile(profile: &CountryProfileView) {
    println!("{} ({}) - {}", profile.name, profile.alpha3, profile.region);
    if let Some(year) = profile.year {
        println!("As of {year}");
    }
    println!("Overall: {}", format_score(profile.score));
    for pillar in &profile.pillars {
        match pillar.error {
            Some(error) => println!(
                "  {}: {} ± {:.1}",
                pillar.pillar_label,
                format_score(pillar.score),
                error
            ),
            None => println!("  {}: {}", pillar.pillar_label, format_score(pillar.score)),
        }
    }

    println!("\nIndustries");
    for industry in &profile.industries {
        println!(
            "  {}: {} ({} of {} indicators measured)",
            industry.label,
            format_score(industry.score),
            industry.measured_count,
            industry.indicator_count
        );
    }
    if !profile.missing_industries.is_empty() {
        println!("Missing industries: {}", profile.missing_industries.join(", "));
    }
}

fn format_score(score: Option<f64>) -> String {
    match score {
        Some(score) => format!("{score:.1}"),
        None => "no data".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::load_data;

    #[test]
    fn format_score_marks_missing_data() {
        assert_eq!(format_score(Some(73.333)), "73.3");
        assert_eq!(format_score(None), "no data");
    }

    #[test]
    fn loading_missing_data_dir_is_empty_not_fatal() {
        let data = load_data(std::path::Path::new("/definitely/not/a/civi/data/dir"))
            .expect("missing data tolerated");
        assert!(data.store.is_empty());
        assert!(data.case_studies.is_empty());
    }
}
