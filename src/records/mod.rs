pub mod cleaning;
pub mod day_log;
pub mod todo;

use crate::db::table::TableName;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub trait DayRecord: Clone + Default + Serialize + DeserializeOwned {
    const TABLE: TableName;

    type Patch;

    fn apply(&mut self, patch: Self::Patch);
}

pub fn parse_amount(raw: Option<&str>) -> f64 {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or_default()
}
