use chrono::NaiveTime;
use tracing::info;

use crate::error::CapacityError;
use crate::types::{CleanedRecord, GridStep};

/// Spreads reviews sharing a calendar date over distinct instants of that day.
///
/// A date holding `n > 1` reviews gets the instants `date + k * step` for
/// `k = 0..n`, in the order the reviews arrived. Dates with a single review
/// keep their timestamp.
pub fn disambiguate(
    records: &[CleanedRecord],
    step: GridStep,
) -> Result<Vec<CleanedRecord>, CapacityError> {
    let capacity = step.per_day();

    let mut ordered = records.to_vec();
    ordered.sort_by_key(|record| record.date());

    let mut output = Vec::with_capacity(ordered.len());
    let mut spread_groups = 0usize;

    for group in ordered.chunk_by(|a, b| a.date() == b.date()) {
        let date = group[0].date();
        if group.len() > capacity {
            return Err(CapacityError {
                date,
                group_size: group.len(),
                capacity,
            });
        }

        if group.len() == 1 {
            output.push(group[0].clone());
            continue;
        }

        spread_groups += 1;
        let midnight = date.and_time(NaiveTime::MIN);
        for (slot, record) in group.iter().enumerate() {
            let mut record = record.clone();
            record.timestamp = step.nth_after(midnight, slot);
            output.push(record);
        }
    }

    debug_assert!(output.windows(2).all(|pair| pair[0].timestamp < pair[1].timestamp));

    info!(
        records = output.len(),
        spread_groups,
        capacity,
        "Disambiguated same-day timestamps"
    );

    Ok(output)
}
