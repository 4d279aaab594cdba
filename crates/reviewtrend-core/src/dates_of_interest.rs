use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// A labelled calendar date used for window bounds and chart annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOfInterest {
    pub label: String,
    pub date: NaiveDate,
    pub color: String,
}

/// Either a literal date or the label of a date of interest.
///
/// In TOML both are quoted strings: `"2021-03-01"` or `"New CEO"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateBound {
    Date(NaiveDate),
    Label(String),
}

impl From<NaiveDate> for DateBound {
    fn from(date: NaiveDate) -> Self {
        DateBound::Date(date)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateCatalog {
    entries: Vec<DateOfInterest>,
}

impl DateCatalog {
    pub fn new(entries: Vec<DateOfInterest>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[DateOfInterest] {
        &self.entries
    }

    pub fn find(&self, label: &str) -> Option<&DateOfInterest> {
        self.entries.iter().find(|entry| entry.label == label)
    }

    pub fn resolve(&self, bound: &DateBound) -> Result<NaiveDate, ConfigError> {
        match bound {
            DateBound::Date(date) => Ok(*date),
            DateBound::Label(label) => self
                .find(label)
                .map(|entry| entry.date)
                .ok_or_else(|| ConfigError::UnknownDateOfInterest(label.clone())),
        }
    }

    /// Entries dated inside `[start, end]`, in date order.
    pub fn within(&self, start: NaiveDate, end: NaiveDate) -> Vec<DateOfInterest> {
        let mut hits: Vec<DateOfInterest> = self
            .entries
            .iter()
            .filter(|entry| entry.date >= start && entry.date <= end)
            .cloned()
            .collect();
        hits.sort_by_key(|entry| entry.date);
        hits
    }
}

/// Sub-period as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubPeriodEntry {
    pub name: String,
    pub start: DateBound,
    pub end: DateBound,
}

impl SubPeriodEntry {
    pub fn resolve(&self, catalog: &DateCatalog) -> Result<SubPeriod, ConfigError> {
        let start = catalog.resolve(&self.start)?;
        let end = catalog.resolve(&self.end)?;
        if start >= end {
            return Err(ConfigError::Invalid(format!(
                "sub-period '{}' starts on {} but ends on {}",
                self.name, start, end
            )));
        }
        Ok(SubPeriod {
            name: self.name.clone(),
            start,
            end,
        })
    }
}

/// Named half-open window `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubPeriod {
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SubPeriod {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}
