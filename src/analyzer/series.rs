use crate::date_key::DateKey;
use crate::db::table::Table;
use crate::records::cleaning::{CleaningMap, CleaningStatus};
use crate::records::day_log::DayLog;
use anyhow::{Context, Result};
use chrono::{Datelike, Months, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Steps,
    StudyMinutes,
    Weight,
}

impl Metric {
    fn read(self, log: &DayLog) -> f64 {
        match self {
            Metric::Steps => log.steps_value(),
            Metric::StudyMinutes => log.study_minutes_value(),
            Metric::Weight => log.weight_value(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub key: DateKey,
    pub label: String,
    pub value: f64,
}

/// One point per logged day, in table order. Callers must not assume chronological order.
pub fn metric_series(logs: &Table<DayLog>, metric: Metric) -> Vec<ChartPoint> {
    logs.iter()
        .map(|(key, log)| ChartPoint {
            key: key.clone(),
            label: key.short_label(),
            value: metric.read(log),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayMark {
    pub key: DateKey,
    pub day: u32,
    pub wake_label: Option<String>,
    pub cleaning: CleaningStatus,
}

pub fn day_mark(date: NaiveDate, logs: &Table<DayLog>, cleaning: &Table<CleaningMap>) -> DayMark {
    let key = DateKey::of(date);

    DayMark {
        day: date.day(),
        wake_label: logs.get_day(&key).wake_label(),
        cleaning: cleaning.get_day(&key).status(),
        key,
    }
}

pub fn month_marks(
    year: i32,
    month: u32,
    logs: &Table<DayLog>,
    cleaning: &Table<CleaningMap>,
) -> Result<Vec<DayMark>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .with_context(|| format!("Invalid month: {year}-{month:02}"))?;
    let next_month = first
        .checked_add_months(Months::new(1))
        .with_context(|| format!("Month out of range: {year}-{month:02}"))?;

    Ok(first
        .iter_days()
        .take_while(|date| *date < next_month)
        .map(|date| day_mark(date, logs, cleaning))
        .collect())
}
