mod common;

use anyhow::Result;
use chrono::Duration;
use common::{date, midnight, review_table, RawRow};
use reviewtrend_core::dates_of_interest::DateOfInterest;
use reviewtrend_core::dual_band_filter::FilterConfig;
use reviewtrend_core::error::{PipelineError, ValidationError};
use reviewtrend_core::imputation::impute;
use reviewtrend_core::statistics::{
    evaluate_statistics, Polarity, Predicate, Rating, StatisticDefinition,
};
use reviewtrend_core::timestamp_disambiguator::disambiguate;
use reviewtrend_core::types::{Field, GridStep};
use reviewtrend_core::validation::{load_records, DateWindow};
use reviewtrend_core::{run, run_text, PipelineConfig};

const REVIEWS: &str = "\
Date,Stars,Employed,Technical,Recommends,Outlook,CEO Opinion,Years
2021-03-04,4,yes,yes,,positive,approve,2
2021-03-04,2,no,no,no,,disapprove,
2021-03-03,5,yes,no,yes,,,1
2021-03-02,3,,,,,no opinion,
2021-03-02,1,no,yes,,negative,disapprove,6
2021-03-02,4,yes,yes,yes,positive,,3
2021-03-01,5,yes,yes,,,,
2021-03-01,2,no,no,no,negative,,
";

fn config() -> PipelineConfig {
    let mut config = PipelineConfig::new(
        date(2021, 3, 1),
        date(2021, 3, 4),
        FilterConfig::new(6.0, 24.0),
    );
    config.dates_of_interest = vec![
        DateOfInterest {
            label: "Reorg".to_string(),
            date: date(2021, 3, 2),
            color: "#ff7f0e".to_string(),
        },
        DateOfInterest {
            label: "Founding".to_string(),
            date: date(2015, 1, 1),
            color: "#7f7f7f".to_string(),
        },
    ];
    config
}

#[test]
fn two_same_day_reviews_flow_through_to_an_ok_statistic() -> Result<()> {
    let mut enthusiast = RawRow::new("2021-03-01", 5);
    enthusiast.technical = Some(true);
    enthusiast.employed = Some(true);
    let mut detractor = RawRow::new("2021-03-01", 1);
    detractor.technical = Some(false);
    detractor.employed = Some(false);
    detractor.recommends = Some(false);

    let table = review_table(&[enthusiast, detractor])?;
    let window = DateWindow::new(date(2021, 1, 1), date(2021, 12, 31))?;

    let cleaned = impute(&load_records(&table, &window)?);
    assert_eq!(cleaned[0].recommends, 1.0);

    let series = disambiguate(&cleaned, GridStep::hourly())?;
    assert_eq!(series[0].timestamp, midnight(2021, 3, 1));
    assert_eq!(series[1].timestamp, midnight(2021, 3, 1) + Duration::hours(1));

    let recommend = StatisticDefinition::new(
        "Recommend",
        Polarity::HighIsGood,
        Predicate::IsTrue {
            field: Field::Recommends,
        },
    );
    let results = evaluate_statistics(&cleaned, &[recommend], &[])?;
    assert_eq!(results[0].fractions.overall.value(), Some(0.5));
    assert_eq!(results[0].fractions.overall.rating(), Some(Rating::Ok));
    Ok(())
}

#[test]
fn full_run_produces_aligned_outputs() -> Result<()> {
    let output = run_text(REVIEWS, &config())?;

    assert_eq!(output.cleaned.len(), 8);
    assert!(output
        .cleaned
        .windows(2)
        .all(|pair| pair[0].timestamp < pair[1].timestamp));
    assert_eq!(output.cleaned[0].timestamp, midnight(2021, 3, 1));
    assert_eq!(output.cleaned[0].stars, 5);

    let last = midnight(2021, 3, 4) + Duration::hours(1);
    assert_eq!(output.resampled.index.last(), Some(&last));
    assert_eq!(output.resampled.len(), 3 * 24 + 2);
    for band in [&output.filtered.short, &output.filtered.long] {
        assert_eq!(band.index, output.resampled.index);
        assert_eq!(band.fields(), output.resampled.fields());
    }

    assert_eq!(output.statistics.len(), 7);
    assert_eq!(output.statistics[0].label, "Recommend");
    assert_eq!(output.statistics[0].sample_count, 8);

    let labels: Vec<&str> = output.annotations.iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, vec!["Reorg"]);

    assert_eq!(output.cleaned_frame()?.height(), 8);
    assert_eq!(output.short_frame()?.height(), output.resampled.len());
    assert_eq!(output.long_frame()?.height(), output.resampled.len());
    assert_eq!(
        output.resampled_frame()?.width(),
        output.resampled.channels.len() + 1
    );
    Ok(())
}

#[test]
fn missing_stars_stop_the_run() -> Result<()> {
    let mut missing = RawRow::new("2021-03-01", 3);
    missing.stars = None;
    let table = review_table(&[RawRow::new("2021-03-02", 4), missing])?;

    let err = run(&table, &config()).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Validation(ValidationError::MissingStars { row: 1 })
    ));
    Ok(())
}

#[test]
fn a_single_day_is_too_short_to_filter() -> Result<()> {
    let table = review_table(&[
        RawRow::new("2021-03-01", 4),
        RawRow::new("2021-03-01", 3),
        RawRow::new("2021-03-01", 2),
    ])?;

    let err = run(&table, &config()).unwrap_err();
    match err {
        PipelineError::InsufficientData(inner) => {
            assert_eq!(inner.stage, "dual-band filter");
            assert_eq!(inner.available, 3);
            assert_eq!(inner.minimum, 10);
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[test]
fn an_empty_window_is_insufficient_data() -> Result<()> {
    let table = review_table(&[RawRow::new("2019-06-01", 4)])?;

    let err = run(&table, &config()).unwrap_err();
    match err {
        PipelineError::InsufficientData(inner) => assert_eq!(inner.available, 0),
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}
