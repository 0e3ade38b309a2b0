use crate::db::table::TableName;
use crate::records::{DayRecord, parse_amount};
use serde::{Deserialize, Serialize};

// An absent field means "not recorded yet", never zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DayLog {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wake_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study_minutes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl DayLog {
    pub fn steps_value(&self) -> f64 {
        parse_amount(self.steps.as_deref())
    }

    pub fn study_minutes_value(&self) -> f64 {
        parse_amount(self.study_minutes.as_deref())
    }

    pub fn weight_value(&self) -> f64 {
        parse_amount(self.weight.as_deref())
    }

    pub fn memo_text(&self) -> &str {
        self.memo.as_deref().unwrap_or_default()
    }

    pub fn has_memo(&self) -> bool {
        !self.memo_text().is_empty()
    }

    pub fn wake_label(&self) -> Option<String> {
        self.wake_time
            .as_deref()
            .filter(|value| !value.is_empty())
            .map(|value| value.chars().take(5).collect())
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl DayRecord for DayLog {
    const TABLE: TableName = TableName::DayLogs;

    type Patch = DayLog;

    fn apply(&mut self, patch: DayLog) {
        let DayLog {
            wake_time,
            sleep_time,
            steps,
            study_minutes,
            weight,
            memo,
        } = patch;

        merge_field(&mut self.wake_time, wake_time);
        merge_field(&mut self.sleep_time, sleep_time);
        merge_field(&mut self.steps, steps);
        merge_field(&mut self.study_minutes, study_minutes);
        merge_field(&mut self.weight, weight);
        merge_field(&mut self.memo, memo);
    }
}

fn merge_field(current: &mut Option<String>, incoming: Option<String>) {
    if incoming.is_some() {
        *current = incoming;
    }
}
