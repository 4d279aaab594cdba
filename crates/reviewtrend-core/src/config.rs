use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dates_of_interest::{
    DateBound, DateCatalog, DateOfInterest, SubPeriod, SubPeriodEntry,
};
use crate::dual_band_filter::FilterConfig;
use crate::statistics::{canonical_statistics, StatisticDefinition};
use crate::types::GridStep;
use crate::validation::DateWindow;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse pipeline configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid pipeline configuration: {0}")]
    Invalid(String),
    #[error("unknown date of interest '{0}'")]
    UnknownDateOfInterest(String),
}

fn default_grid_step_minutes() -> i64 {
    60
}

/// Everything a run needs besides the review table.
///
/// ```toml
/// start = "2020-01-01"
/// end = "New CEO"
/// grid_step_minutes = 60
///
/// [filter]
/// short_period = 24
/// long_period = 168
///
/// [[dates_of_interest]]
/// label = "New CEO"
/// date = "2021-06-01"
/// color = "#d62728"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub start: DateBound,
    pub end: DateBound,
    #[serde(default = "default_grid_step_minutes")]
    pub grid_step_minutes: i64,
    pub filter: FilterConfig,
    #[serde(default)]
    pub dates_of_interest: Vec<DateOfInterest>,
    #[serde(default)]
    pub sub_periods: Vec<SubPeriodEntry>,
    #[serde(default = "canonical_statistics")]
    pub statistics: Vec<StatisticDefinition>,
}

/// Configuration with every bound resolved to a date.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub window: DateWindow,
    pub step: GridStep,
    pub filter: FilterConfig,
    pub catalog: DateCatalog,
    pub sub_periods: Vec<SubPeriod>,
    pub statistics: Vec<StatisticDefinition>,
}

impl PipelineConfig {
    pub fn new(
        start: impl Into<DateBound>,
        end: impl Into<DateBound>,
        filter: FilterConfig,
    ) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            grid_step_minutes: default_grid_step_minutes(),
            filter,
            dates_of_interest: Vec::new(),
            sub_periods: Vec::new(),
            statistics: canonical_statistics(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.resolve().map(|_| ())
    }

    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        let step = GridStep::from_minutes(self.grid_step_minutes).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "grid_step_minutes must be between 1 and {}, got {}",
                GridStep::MINUTES_PER_DAY,
                self.grid_step_minutes
            ))
        })?;

        self.filter
            .validate()
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;

        ensure_unique(
            "date of interest",
            self.dates_of_interest.iter().map(|doi| doi.label.as_str()),
        )?;
        ensure_unique(
            "sub-period",
            self.sub_periods.iter().map(|period| period.name.as_str()),
        )?;

        let catalog = DateCatalog::new(self.dates_of_interest.clone());
        let start = catalog.resolve(&self.start)?;
        let end = catalog.resolve(&self.end)?;
        let window =
            DateWindow::new(start, end).map_err(|err| ConfigError::Invalid(err.to_string()))?;

        let sub_periods = self
            .sub_periods
            .iter()
            .map(|entry| entry.resolve(&catalog))
            .collect::<Result<Vec<_>, _>>()?;

        for statistic in &self.statistics {
            if let Some(name) = &statistic.sub_period {
                if !sub_periods.iter().any(|period| &period.name == name) {
                    return Err(ConfigError::Invalid(format!(
                        "statistic '{}' refers to unknown sub-period '{}'",
                        statistic.label, name
                    )));
                }
            }
        }

        Ok(ResolvedConfig {
            window,
            step,
            filter: self.filter,
            catalog,
            sub_periods,
            statistics: self.statistics.clone(),
        })
    }
}

fn ensure_unique<'a>(
    kind: &str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ConfigError::Invalid(format!("duplicate {kind} '{name}'")));
        }
    }
    Ok(())
}
