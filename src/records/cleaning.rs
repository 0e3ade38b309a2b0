use crate::db::table::TableName;
use crate::records::DayRecord;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Room {
    Veranda,
    #[serde(rename = "room")]
    LivingRoom,
    Closet,
    Bath,
    Toilet,
    Washbasin,
    Kitchen,
    Entrance,
}

impl Room {
    pub const ALL: [Room; 8] = [
        Room::Veranda,
        Room::LivingRoom,
        Room::Closet,
        Room::Bath,
        Room::Toilet,
        Room::Washbasin,
        Room::Kitchen,
        Room::Entrance,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Room::Veranda => "veranda",
            Room::LivingRoom => "room",
            Room::Closet => "closet",
            Room::Bath => "bath",
            Room::Toilet => "toilet",
            Room::Washbasin => "washbasin",
            Room::Kitchen => "kitchen",
            Room::Entrance => "entrance",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Room::Veranda => "Veranda",
            Room::LivingRoom => "Living room",
            Room::Closet => "Closet",
            Room::Bath => "Bath",
            Room::Toilet => "Toilet",
            Room::Washbasin => "Washbasin",
            Room::Kitchen => "Kitchen",
            Room::Entrance => "Entrance",
        }
    }
}

impl FromStr for Room {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        let normalized = raw.trim().to_lowercase();
        Room::ALL
            .into_iter()
            .find(|room| room.id() == normalized)
            .ok_or_else(|| {
                let known = Room::ALL.map(Room::id).join(", ");
                anyhow!("Unknown room: {raw}. Known rooms: {known}")
            })
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleaningStatus {
    Full,
    Partial,
    Unmarked,
}

impl CleaningStatus {
    pub fn symbol(self) -> &'static str {
        match self {
            CleaningStatus::Full => "○",
            CleaningStatus::Partial => "△",
            CleaningStatus::Unmarked => "",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CleaningMap(BTreeMap<Room, bool>);

impl CleaningMap {
    pub fn is_cleaned(&self, room: Room) -> bool {
        self.0.get(&room).copied().unwrap_or(false)
    }

    pub fn toggled(&self, room: Room) -> bool {
        !self.is_cleaned(room)
    }

    pub fn recorded_count(&self) -> usize {
        self.0.len()
    }

    pub fn cleaned_count(&self) -> usize {
        self.0.values().filter(|cleaned| **cleaned).count()
    }

    pub fn status(&self) -> CleaningStatus {
        if self.0.is_empty() {
            CleaningStatus::Unmarked
        } else if Room::ALL.iter().all(|room| self.is_cleaned(*room)) {
            CleaningStatus::Full
        } else {
            CleaningStatus::Partial
        }
    }
}

impl FromIterator<(Room, bool)> for CleaningMap {
    fn from_iter<T: IntoIterator<Item = (Room, bool)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl DayRecord for CleaningMap {
    const TABLE: TableName = TableName::DayCleaning;

    type Patch = CleaningMap;

    fn apply(&mut self, patch: CleaningMap) {
        self.0.extend(patch.0);
    }
}
