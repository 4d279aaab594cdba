mod common;

use anyhow::Result;
use chrono::Duration;
use common::{cleaned, evenly_spaced, midnight};
use polars::prelude::*;
use reviewtrend_core::resampler::{interpolate, resample};
use reviewtrend_core::types::{Field, GridStep};

#[test]
fn uniform_series_is_returned_at_its_nodes() -> Result<()> {
    let origin = midnight(2021, 3, 1);
    let stars: [u8; 6] = [3, 5, 1, 4, 2, 2];
    let records = evenly_spaced(origin, 60, &stars);

    let grid = resample(&records, GridStep::hourly())?;

    assert_eq!(grid.len(), stars.len());
    assert_eq!(grid.index[0], origin);
    assert_eq!(grid.index[5], origin + Duration::hours(5));
    let expected: Vec<f64> = stars.iter().map(|s| f64::from(*s)).collect();
    assert_eq!(grid.channel(Field::Stars), Some(expected.as_slice()));
    assert_eq!(grid.channel(Field::Recommends), Some(&[0.5; 6][..]));
    Ok(())
}

#[test]
fn gaps_are_filled_linearly() -> Result<()> {
    let origin = midnight(2021, 3, 1);
    let records = vec![
        cleaned(origin, 1),
        cleaned(origin + Duration::hours(4), 5),
    ];

    let grid = resample(&records, GridStep::hourly())?;

    assert_eq!(
        grid.channel(Field::Stars),
        Some(&[1.0, 2.0, 3.0, 4.0, 5.0][..])
    );
    Ok(())
}

#[test]
fn grid_stops_at_the_last_whole_step() -> Result<()> {
    let origin = midnight(2021, 3, 1);
    let records = vec![
        cleaned(origin, 2),
        cleaned(origin + Duration::minutes(90), 5),
    ];

    let grid = resample(&records, GridStep::hourly())?;
    let stars = grid.channel(Field::Stars).unwrap();

    assert_eq!(grid.len(), 2);
    assert!((stars[1] - 4.0).abs() < 1e-12);
    Ok(())
}

#[test]
fn sparse_channels_use_only_observed_points() -> Result<()> {
    let origin = midnight(2021, 3, 1);
    let mut records = evenly_spaced(origin, 60, &[3, 3, 3, 3, 3]);
    records[1].employed = Some(true);
    records[3].employed = Some(false);

    let grid = resample(&records, GridStep::hourly())?;

    assert_eq!(
        grid.channel(Field::Employed),
        Some(&[1.0, 1.0, 0.5, 0.0, 0.0][..])
    );
    assert!(grid.channel(Field::Technical).is_none());
    assert!(grid.channel(Field::YearsEmployed).is_none());
    assert_eq!(grid.channels.len(), Field::ALL.len() - 2);
    Ok(())
}

#[test]
fn empty_series_is_insufficient() {
    let err = resample(&[], GridStep::hourly()).unwrap_err();
    assert_eq!(err.available, 0);
    assert_eq!(err.minimum, 1);
}

#[test]
fn interpolation_clamps_outside_the_observed_range() {
    let values = interpolate(&[1.0, 3.0], &[10.0, 30.0], &[0.0, 1.0, 2.0, 3.0, 4.0]);
    assert_eq!(values, vec![10.0, 10.0, 20.0, 30.0, 30.0]);
}

#[test]
fn grid_exports_a_timestamp_column_and_one_column_per_channel() -> Result<()> {
    let origin = midnight(2021, 3, 1);
    let records = evenly_spaced(origin, 60, &[1, 2, 3]);
    let grid = resample(&records, GridStep::hourly())?;

    let frame = grid.to_dataframe()?;

    assert_eq!(frame.height(), 3);
    assert_eq!(frame.width(), grid.channels.len() + 1);
    assert_eq!(
        frame.column("timestamp")?.dtype(),
        &DataType::Datetime(TimeUnit::Microseconds, None)
    );
    let stars: Vec<Option<f64>> = frame
        .column("stars")?
        .as_materialized_series()
        .f64()?
        .into_iter()
        .collect();
    assert_eq!(stars, vec![Some(1.0), Some(2.0), Some(3.0)]);
    Ok(())
}
