use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::dates_of_interest::SubPeriod;
use crate::types::{CleanedRecord, Field};

pub const GOOD_THRESHOLD: f64 = 2.0 / 3.0;
pub const OK_THRESHOLD: f64 = 1.0 / 3.0;

const VALUE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Error)]
pub enum StatisticsError {
    #[error("statistic '{label}' refers to unknown sub-period '{name}'")]
    UnknownSubPeriod { label: String, name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Good,
    Ok,
    Bad,
}

/// Whether a high fraction is desirable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    HighIsGood,
    HighIsBad,
}

impl Polarity {
    pub fn classify(&self, fraction: f64) -> Rating {
        let band = if fraction >= GOOD_THRESHOLD {
            Rating::Good
        } else if fraction >= OK_THRESHOLD {
            Rating::Ok
        } else {
            Rating::Bad
        };
        match (self, band) {
            (Polarity::HighIsBad, Rating::Good) => Rating::Bad,
            (Polarity::HighIsBad, Rating::Bad) => Rating::Good,
            (_, band) => band,
        }
    }
}

/// Boolean condition over a cleaned record. A condition on a field the
/// record does not carry is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    IsTrue { field: Field },
    IsFalse { field: Field },
    Equals { field: Field, value: f64 },
    AtLeast { field: Field, value: f64 },
    AtMost { field: Field, value: f64 },
    All { of: Vec<Predicate> },
    Any { of: Vec<Predicate> },
    Not { of: Box<Predicate> },
}

impl Predicate {
    pub fn evaluate(&self, record: &CleanedRecord) -> bool {
        match self {
            Predicate::IsTrue { field } => matches_value(record, *field, 1.0),
            Predicate::IsFalse { field } => matches_value(record, *field, 0.0),
            Predicate::Equals { field, value } => matches_value(record, *field, *value),
            Predicate::AtLeast { field, value } => record
                .value(*field)
                .is_some_and(|observed| observed >= *value),
            Predicate::AtMost { field, value } => record
                .value(*field)
                .is_some_and(|observed| observed <= *value),
            Predicate::All { of } => of.iter().all(|inner| inner.evaluate(record)),
            Predicate::Any { of } => of.iter().any(|inner| inner.evaluate(record)),
            Predicate::Not { of } => !of.evaluate(record),
        }
    }
}

fn matches_value(record: &CleanedRecord, field: Field, expected: f64) -> bool {
    record
        .value(field)
        .is_some_and(|observed| (observed - expected).abs() < VALUE_TOLERANCE)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticDefinition {
    pub label: String,
    pub polarity: Polarity,
    pub predicate: Predicate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_period: Option<String>,
}

impl StatisticDefinition {
    pub fn new(label: impl Into<String>, polarity: Polarity, predicate: Predicate) -> Self {
        Self {
            label: label.into(),
            polarity,
            predicate,
            sub_period: None,
        }
    }

    /// Restricts the statistic to the named sub-period.
    pub fn within(mut self, sub_period: impl Into<String>) -> Self {
        self.sub_period = Some(sub_period.into());
        self
    }
}

/// Share of eligible records satisfying a predicate. `Undefined` when no
/// record was eligible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Fraction {
    Undefined,
    Defined {
        value: f64,
        eligible: usize,
        rating: Rating,
    },
}

impl Fraction {
    fn compute(hits: impl Iterator<Item = bool>, polarity: Polarity) -> Self {
        let (eligible, satisfied) = hits.fold((0usize, 0usize), |(total, yes), hit| {
            (total + 1, yes + usize::from(hit))
        });
        if eligible == 0 {
            return Fraction::Undefined;
        }
        let value = satisfied as f64 / eligible as f64;
        Fraction::Defined {
            value,
            eligible,
            rating: polarity.classify(value),
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Fraction::Defined { value, .. } => Some(*value),
            Fraction::Undefined => None,
        }
    }

    pub fn rating(&self) -> Option<Rating> {
        match self {
            Fraction::Defined { rating, .. } => Some(*rating),
            Fraction::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Fraction::Undefined)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupFractions {
    pub overall: Fraction,
    pub technical: Fraction,
    pub non_technical: Fraction,
    pub employed: Fraction,
    pub ex_employee: Fraction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticResult {
    pub label: String,
    pub polarity: Polarity,
    pub sub_period: Option<String>,
    pub sample_count: usize,
    pub fractions: GroupFractions,
}

static CANONICAL_STATISTICS: Lazy<Vec<StatisticDefinition>> = Lazy::new(|| {
    use Polarity::{HighIsBad, HighIsGood};
    vec![
        StatisticDefinition::new(
            "Recommend",
            HighIsGood,
            Predicate::IsTrue {
                field: Field::Recommends,
            },
        ),
        StatisticDefinition::new(
            "Positive outlook",
            HighIsGood,
            Predicate::Equals {
                field: Field::Outlook,
                value: 1.0,
            },
        ),
        StatisticDefinition::new(
            "Negative outlook",
            HighIsBad,
            Predicate::Equals {
                field: Field::Outlook,
                value: -1.0,
            },
        ),
        StatisticDefinition::new(
            "Approve of CEO",
            HighIsGood,
            Predicate::Equals {
                field: Field::CeoOpinion,
                value: 1.0,
            },
        ),
        StatisticDefinition::new(
            "Disapprove of CEO",
            HighIsBad,
            Predicate::Equals {
                field: Field::CeoOpinion,
                value: -1.0,
            },
        ),
        StatisticDefinition::new(
            "4+ stars",
            HighIsGood,
            Predicate::AtLeast {
                field: Field::Stars,
                value: 4.0,
            },
        ),
        StatisticDefinition::new(
            "1-2 stars",
            HighIsBad,
            Predicate::AtMost {
                field: Field::Stars,
                value: 2.0,
            },
        ),
    ]
});

/// Built-in statistic list used when a configuration names none.
pub fn canonical_statistics() -> Vec<StatisticDefinition> {
    CANONICAL_STATISTICS.clone()
}

fn group_fraction(
    scored: &[(&CleanedRecord, bool)],
    polarity: Polarity,
    member: impl Fn(&CleanedRecord) -> bool,
) -> Fraction {
    let hits = scored
        .iter()
        .filter(|(record, _)| member(record))
        .map(|(_, hit)| *hit);
    Fraction::compute(hits, polarity)
}

/// Evaluates each definition over `records`, in definition order.
///
/// Grouped fractions only count records whose grouping attribute is known;
/// a record with `technical` missing is in neither the technical nor the
/// non-technical group.
pub fn evaluate_statistics(
    records: &[CleanedRecord],
    definitions: &[StatisticDefinition],
    sub_periods: &[SubPeriod],
) -> Result<Vec<StatisticResult>, StatisticsError> {
    let mut results = Vec::with_capacity(definitions.len());

    for definition in definitions {
        let window = match &definition.sub_period {
            Some(name) => Some(
                sub_periods
                    .iter()
                    .find(|period| &period.name == name)
                    .ok_or_else(|| StatisticsError::UnknownSubPeriod {
                        label: definition.label.clone(),
                        name: name.clone(),
                    })?,
            ),
            None => None,
        };

        let scored: Vec<(&CleanedRecord, bool)> = records
            .iter()
            .filter(|record| window.map_or(true, |period| period.contains(record.date())))
            .map(|record| (record, definition.predicate.evaluate(record)))
            .collect();

        let polarity = definition.polarity;
        let fractions = GroupFractions {
            overall: group_fraction(&scored, polarity, |_| true),
            technical: group_fraction(&scored, polarity, |record| record.technical == Some(true)),
            non_technical: group_fraction(&scored, polarity, |record| {
                record.technical == Some(false)
            }),
            employed: group_fraction(&scored, polarity, |record| record.employed == Some(true)),
            ex_employee: group_fraction(&scored, polarity, |record| {
                record.employed == Some(false)
            }),
        };

        debug!(
            label = %definition.label,
            sub_period = ?definition.sub_period,
            samples = scored.len(),
            overall = ?fractions.overall.value(),
            "Evaluated statistic"
        );

        results.push(StatisticResult {
            label: definition.label.clone(),
            polarity,
            sub_period: definition.sub_period.clone(),
            sample_count: scored.len(),
            fractions,
        });
    }

    info!(
        records = records.len(),
        statistics = results.len(),
        "Computed review statistics"
    );

    Ok(results)
}
