use once_cell::sync::Lazy;
use tracing::debug;

use crate::types::{flag_value, CleanedRecord, ReviewRecord};

/// Optional fields the imputer is allowed to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImputedField {
    Recommends,
    Outlook,
    CeoOpinion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarsCondition {
    AtLeast(u8),
    AtMost(u8),
}

impl StarsCondition {
    pub fn holds(&self, stars: u8) -> bool {
        match self {
            StarsCondition::AtLeast(bound) => stars >= *bound,
            StarsCondition::AtMost(bound) => stars <= *bound,
        }
    }
}

/// Fills `field` with `value` when the field is missing and the record's
/// star rating satisfies `condition`. For `Recommends`, a positive value
/// means `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImputationRule {
    pub field: ImputedField,
    pub condition: StarsCondition,
    pub value: i8,
}

impl ImputationRule {
    /// Returns whether the rule filled a value.
    pub fn apply(&self, record: &mut ReviewRecord) -> bool {
        if !self.condition.holds(record.stars) {
            return false;
        }
        match self.field {
            ImputedField::Recommends if record.recommends.is_none() => {
                record.recommends = Some(self.value > 0);
                true
            }
            ImputedField::Outlook if record.outlook.is_none() => {
                record.outlook = Some(self.value);
                true
            }
            ImputedField::CeoOpinion if record.ceo_opinion.is_none() => {
                record.ceo_opinion = Some(self.value);
                true
            }
            _ => false,
        }
    }
}

/// Constants used for whatever the rules leave missing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeutralFill {
    pub recommends: f64,
    pub outlook: i8,
    pub ceo_opinion: i8,
}

impl Default for NeutralFill {
    fn default() -> Self {
        Self {
            recommends: 0.5,
            outlook: 0,
            ceo_opinion: 0,
        }
    }
}

static INFERENCE_RULES: Lazy<Vec<ImputationRule>> = Lazy::new(|| {
    vec![
        ImputationRule {
            field: ImputedField::Recommends,
            condition: StarsCondition::AtLeast(4),
            value: 1,
        },
        ImputationRule {
            field: ImputedField::Outlook,
            condition: StarsCondition::AtLeast(4),
            value: 1,
        },
        ImputationRule {
            field: ImputedField::Outlook,
            condition: StarsCondition::AtMost(2),
            value: -1,
        },
    ]
});

/// Inference rules in evaluation order.
pub fn inference_rules() -> &'static [ImputationRule] {
    INFERENCE_RULES.as_slice()
}

pub fn impute(records: &[ReviewRecord]) -> Vec<CleanedRecord> {
    impute_with(records, inference_rules(), NeutralFill::default())
}

pub fn impute_with(
    records: &[ReviewRecord],
    rules: &[ImputationRule],
    neutral: NeutralFill,
) -> Vec<CleanedRecord> {
    let mut rule_hits = vec![0usize; rules.len()];
    let mut neutral_fills = 0usize;
    let mut cleaned = Vec::with_capacity(records.len());

    for record in records {
        let mut working = record.clone();
        for (hits, rule) in rule_hits.iter_mut().zip(rules) {
            if rule.apply(&mut working) {
                *hits += 1;
            }
        }

        neutral_fills += [
            working.recommends.is_none(),
            working.outlook.is_none(),
            working.ceo_opinion.is_none(),
        ]
        .iter()
        .filter(|missing| **missing)
        .count();

        cleaned.push(CleanedRecord {
            source_row: working.source_row,
            timestamp: working.timestamp,
            stars: working.stars,
            employed: working.employed,
            technical: working.technical,
            recommends: working.recommends.map(flag_value).unwrap_or(neutral.recommends),
            outlook: working.outlook.unwrap_or(neutral.outlook),
            ceo_opinion: working.ceo_opinion.unwrap_or(neutral.ceo_opinion),
            years_employed: working.years_employed,
        });
    }

    for (rule, hits) in rules.iter().zip(&rule_hits) {
        debug!(
            field = ?rule.field,
            condition = ?rule.condition,
            value = rule.value,
            hits = *hits,
            "Applied imputation rule"
        );
    }
    debug!(neutral_fills, records = cleaned.len(), "Filled remaining fields with neutral constants");

    cleaned
}
