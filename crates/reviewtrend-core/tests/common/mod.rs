#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::*;
use reviewtrend_core::types::{CleanedRecord, ReviewRecord};

pub struct RawRow {
    pub date: &'static str,
    pub stars: Option<i64>,
    pub employed: Option<bool>,
    pub technical: Option<bool>,
    pub recommends: Option<bool>,
    pub outlook: Option<i64>,
    pub ceo_opinion: Option<i64>,
    pub years: Option<i64>,
}

impl RawRow {
    pub fn new(date: &'static str, stars: i64) -> Self {
        Self {
            date,
            stars: Some(stars),
            employed: None,
            technical: None,
            recommends: None,
            outlook: None,
            ceo_opinion: None,
            years: None,
        }
    }
}

/// Raw table with a string `date` column, as an upstream loader might hand over.
pub fn review_table(rows: &[RawRow]) -> PolarsResult<DataFrame> {
    df!(
        "date" => rows.iter().map(|r| r.date).collect::<Vec<_>>(),
        "stars" => rows.iter().map(|r| r.stars).collect::<Vec<_>>(),
        "employed" => rows.iter().map(|r| r.employed).collect::<Vec<_>>(),
        "technical" => rows.iter().map(|r| r.technical).collect::<Vec<_>>(),
        "recommends" => rows.iter().map(|r| r.recommends).collect::<Vec<_>>(),
        "outlook" => rows.iter().map(|r| r.outlook).collect::<Vec<_>>(),
        "ceo_opinion" => rows.iter().map(|r| r.ceo_opinion).collect::<Vec<_>>(),
        "years" => rows.iter().map(|r| r.years).collect::<Vec<_>>()
    )
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
    date(year, month, day).and_time(NaiveTime::MIN)
}

pub fn review(timestamp: NaiveDateTime, stars: u8) -> ReviewRecord {
    ReviewRecord {
        source_row: 0,
        timestamp,
        stars,
        employed: None,
        technical: None,
        recommends: None,
        outlook: None,
        ceo_opinion: None,
        years_employed: None,
    }
}

pub fn cleaned(timestamp: NaiveDateTime, stars: u8) -> CleanedRecord {
    CleanedRecord {
        source_row: 0,
        timestamp,
        stars,
        employed: None,
        technical: None,
        recommends: 0.5,
        outlook: 0,
        ceo_opinion: 0,
        years_employed: None,
    }
}

/// Records one `step_minutes` apart starting at `origin`, with the given stars.
pub fn evenly_spaced(origin: NaiveDateTime, step_minutes: i64, stars: &[u8]) -> Vec<CleanedRecord> {
    stars
        .iter()
        .enumerate()
        .map(|(idx, stars)| {
            let mut record = cleaned(origin + Duration::minutes(step_minutes * idx as i64), *stars);
            record.source_row = idx;
            record
        })
        .collect()
}
