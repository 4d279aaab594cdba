use tracing::{info, warn};

use crate::error::InsufficientDataError;
use crate::types::{ChannelSeries, CleanedRecord, Field, GridStep, TimeGrid};

/// Resamples every channel of a disambiguated series onto the integer grid
/// spanning its first to last timestamp.
pub fn resample(
    series: &[CleanedRecord],
    step: GridStep,
) -> Result<TimeGrid, InsufficientDataError> {
    resample_fields(series, step, &Field::ALL)
}

/// Like [`resample`] for a chosen set of channels.
///
/// Each channel interpolates over the records where it is present. A channel
/// with no observations at all is left out of the grid.
pub fn resample_fields(
    series: &[CleanedRecord],
    step: GridStep,
    fields: &[Field],
) -> Result<TimeGrid, InsufficientDataError> {
    let first = series.first().ok_or(InsufficientDataError {
        stage: "resample",
        available: 0,
        minimum: 1,
    })?;
    let origin = first.timestamp;

    let offsets: Vec<f64> = series
        .iter()
        .map(|record| step.units_between(origin, record.timestamp))
        .collect();
    let last_offset = offsets.last().copied().unwrap_or(0.0).max(0.0);
    let target_len = last_offset.floor() as usize + 1;

    let index = (0..target_len).map(|n| step.nth_after(origin, n)).collect();
    let targets: Vec<f64> = (0..target_len).map(|n| n as f64).collect();

    let mut channels = Vec::with_capacity(fields.len());
    for field in fields {
        let (xs, ys): (Vec<f64>, Vec<f64>) = series
            .iter()
            .zip(&offsets)
            .filter_map(|(record, offset)| record.value(*field).map(|value| (*offset, value)))
            .unzip();

        if xs.is_empty() {
            warn!(field = %field, "Channel has no observations; leaving it out of the grid");
            continue;
        }

        channels.push(ChannelSeries {
            field: *field,
            values: interpolate(&xs, &ys, &targets),
        });
    }

    info!(
        source_points = series.len(),
        grid_points = target_len,
        channels = channels.len(),
        "Resampled cleaned series"
    );

    Ok(TimeGrid {
        step,
        index,
        channels,
    })
}

/// Piecewise-linear interpolation of `(xs, ys)` at ascending `targets`.
///
/// `xs` must be non-decreasing and non-empty. Targets outside the observed
/// range take the nearest endpoint value.
pub fn interpolate(xs: &[f64], ys: &[f64], targets: &[f64]) -> Vec<f64> {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return vec![f64::NAN; targets.len()];
    }

    let first = (xs[0], ys[0]);
    let last = (xs[n - 1], ys[n - 1]);
    let mut lower = 0usize;

    targets
        .iter()
        .map(|&t| {
            if t <= first.0 {
                return first.1;
            }
            if t >= last.0 {
                return last.1;
            }
            while lower + 1 < n && xs[lower + 1] <= t {
                lower += 1;
            }
            // xs[lower] <= t < xs[lower + 1]
            let (x0, y0) = (xs[lower], ys[lower]);
            let (x1, y1) = (xs[lower + 1], ys[lower + 1]);
            y0 + (y1 - y0) * (t - x0) / (x1 - x0)
        })
        .collect()
}
