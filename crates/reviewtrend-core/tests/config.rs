mod common;

use anyhow::Result;
use common::date;
use reviewtrend_core::config::{ConfigError, PipelineConfig};
use reviewtrend_core::dates_of_interest::{DateBound, DateCatalog, DateOfInterest};
use reviewtrend_core::dual_band_filter::FilterConfig;
use reviewtrend_core::statistics::{canonical_statistics, Polarity, Predicate};
use reviewtrend_core::types::{Field, GridStep};

const FULL_CONFIG: &str = r##"
start = "2020-01-01"
end = "Layoffs"
grid_step_minutes = 30

[filter]
short_period = 24
long_period = 168.5

[[dates_of_interest]]
label = "New CEO"
date = "2020-06-01"
color = "#1f77b4"

[[dates_of_interest]]
label = "Layoffs"
date = "2021-02-15"
color = "#d62728"

[[sub_periods]]
name = "new ceo tenure"
start = "New CEO"
end = "2021-01-01"

[[statistics]]
label = "Approve of new CEO"
polarity = "high_is_good"
sub_period = "new ceo tenure"
predicate = { op = "equals", field = "ceo_opinion", value = 1 }

[[statistics]]
label = "Unhappy technical staff"
polarity = "high_is_bad"

[statistics.predicate]
op = "all"
of = [
    { op = "is_true", field = "technical" },
    { op = "at_most", field = "stars", value = 2 },
]
"##;

#[test]
fn full_configuration_resolves() -> Result<()> {
    let config = PipelineConfig::from_toml_str(FULL_CONFIG)?;
    let resolved = config.resolve()?;

    assert_eq!(resolved.window.start, date(2020, 1, 1));
    assert_eq!(resolved.window.end, date(2021, 2, 15));
    assert_eq!(resolved.step, GridStep::from_minutes(30).unwrap());
    assert_eq!(resolved.filter.order, 2);
    assert_eq!(resolved.filter.long_period, 168.5);

    assert_eq!(resolved.sub_periods.len(), 1);
    assert_eq!(resolved.sub_periods[0].start, date(2020, 6, 1));
    assert_eq!(resolved.sub_periods[0].end, date(2021, 1, 1));

    assert_eq!(resolved.statistics.len(), 2);
    assert_eq!(
        resolved.statistics[0].predicate,
        Predicate::Equals {
            field: Field::CeoOpinion,
            value: 1.0
        }
    );
    assert_eq!(resolved.statistics[1].polarity, Polarity::HighIsBad);
    assert!(matches!(
        resolved.statistics[1].predicate,
        Predicate::All { ref of } if of.len() == 2
    ));
    Ok(())
}

#[test]
fn omitted_sections_take_defaults() -> Result<()> {
    let config = PipelineConfig::from_toml_str(
        r#"
start = "2020-01-01"
end = "2020-12-31"

[filter]
short_period = 12
long_period = 72
"#,
    )?;

    assert_eq!(config.grid_step_minutes, 60);
    assert_eq!(config.filter.order, 2);
    assert_eq!(config.statistics, canonical_statistics());
    assert!(config.dates_of_interest.is_empty());
    Ok(())
}

#[test]
fn unknown_date_label_is_rejected() {
    let err = PipelineConfig::from_toml_str(
        r#"
start = "Founding"
end = "2020-12-31"

[filter]
short_period = 12
long_period = 72
"#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::UnknownDateOfInterest(label) if label == "Founding"));
}

fn base_config() -> PipelineConfig {
    PipelineConfig::new(
        date(2020, 1, 1),
        date(2020, 12, 31),
        FilterConfig::new(12.0, 72.0),
    )
}

#[test]
fn invalid_values_are_rejected() {
    let mut config = base_config();
    config.grid_step_minutes = 7 * 60 * 24;
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

    let mut config = base_config();
    config.filter = FilterConfig::new(0.5, 72.0);
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

    config.filter = FilterConfig::new(12.0, 72.0);
    config.end = DateBound::Date(date(2019, 1, 1));
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

    let mut config = base_config();
    config.statistics[0].sub_period = Some("missing".to_string());
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = PipelineConfig::from_toml_str("start = ").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
}

#[test]
fn catalog_lists_dates_inside_a_window_in_order() {
    let catalog = DateCatalog::new(vec![
        DateOfInterest {
            label: "Layoffs".to_string(),
            date: date(2021, 2, 15),
            color: "#d62728".to_string(),
        },
        DateOfInterest {
            label: "New CEO".to_string(),
            date: date(2020, 6, 1),
            color: "#1f77b4".to_string(),
        },
        DateOfInterest {
            label: "IPO".to_string(),
            date: date(2022, 9, 1),
            color: "#2ca02c".to_string(),
        },
    ]);

    let labels: Vec<String> = catalog
        .within(date(2020, 6, 1), date(2021, 2, 15))
        .into_iter()
        .map(|doi| doi.label)
        .collect();

    assert_eq!(labels, vec!["New CEO", "Layoffs"]);
    assert_eq!(catalog.find("IPO").map(|doi| doi.date), Some(date(2022, 9, 1)));
    assert!(catalog.find("ipo").is_none());
}
