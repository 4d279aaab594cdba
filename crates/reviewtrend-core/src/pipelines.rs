// crates/reviewtrend-core/src/pipelines.rs

use polars::prelude::DataFrame;
use reviewtrend_parser::parse_review_table;
use tracing::{info, info_span};

use crate::{
    config::{PipelineConfig, ResolvedConfig},
    dates_of_interest::DateOfInterest,
    dual_band_filter::{self, DualBandOutput},
    error::Result,
    imputation,
    resampler,
    statistics::{self, StatisticResult},
    timestamp_disambiguator,
    types::{cleaned_to_dataframe, CleanedRecord, TimeGrid},
    validation,
};

/// Everything a run hands to the reporting side.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Imputed records with disambiguated timestamps.
    pub cleaned: Vec<CleanedRecord>,
    pub resampled: TimeGrid,
    pub filtered: DualBandOutput,
    pub statistics: Vec<StatisticResult>,
    /// Dates of interest inside the run window.
    pub annotations: Vec<DateOfInterest>,
}

impl PipelineOutput {
    pub fn cleaned_frame(&self) -> Result<DataFrame> {
        Ok(cleaned_to_dataframe(&self.cleaned)?)
    }

    pub fn resampled_frame(&self) -> Result<DataFrame> {
        Ok(self.resampled.to_dataframe()?)
    }

    pub fn short_frame(&self) -> Result<DataFrame> {
        Ok(self.filtered.short.to_dataframe()?)
    }

    pub fn long_frame(&self) -> Result<DataFrame> {
        Ok(self.filtered.long.to_dataframe()?)
    }
}

/// Parses delimited review text, then runs the pipeline on it.
pub fn run_text(content: &str, config: &PipelineConfig) -> Result<PipelineOutput> {
    let table = parse_review_table(content)?;
    run(&table, config)
}

pub fn run(table: &DataFrame, config: &PipelineConfig) -> Result<PipelineOutput> {
    let resolved = config.resolve()?;
    run_resolved(table, &resolved)
}

pub fn run_resolved(table: &DataFrame, config: &ResolvedConfig) -> Result<PipelineOutput> {
    let span = info_span!(
        "review_pipeline",
        start = %config.window.start,
        end = %config.window.end,
        step_seconds = config.step.seconds()
    );
    let _guard = span.enter();

    let records = validation::load_records(table, &config.window)?;
    let imputed = imputation::impute(&records);
    let statistics =
        statistics::evaluate_statistics(&imputed, &config.statistics, &config.sub_periods)?;

    let cleaned = timestamp_disambiguator::disambiguate(&imputed, config.step)?;
    let resampled = resampler::resample(&cleaned, config.step)?;
    let filtered = dual_band_filter::apply_dual_band(&resampled, &config.filter)?;

    let annotations = config
        .catalog
        .within(config.window.start, config.window.end);

    info!(
        records = cleaned.len(),
        grid_points = resampled.len(),
        statistics = statistics.len(),
        annotations = annotations.len(),
        "Review pipeline finished"
    );

    Ok(PipelineOutput {
        cleaned,
        resampled,
        filtered,
        statistics,
        annotations,
    })
}
