use crate::date_key::DateKey;
use crate::records::DayRecord;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableName {
    DayLogs,
    DayTodos,
    DayCleaning,
}

impl TableName {
    pub const ALL: [TableName; 3] = [
        TableName::DayLogs,
        TableName::DayTodos,
        TableName::DayCleaning,
    ];

    pub fn storage_name(self) -> &'static str {
        match self {
            TableName::DayLogs => "lifeLogs",
            TableName::DayTodos => "todos",
            TableName::DayCleaning => "cleaningLogs",
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table<R> {
    days: Vec<(DateKey, R)>,
    index: HashMap<DateKey, usize>,
}

impl<R> Default for Table<R> {
    fn default() -> Self {
        Self {
            days: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<R> Table<R> {
    fn position(&self, key: &DateKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    fn push(&mut self, key: DateKey, record: R) -> usize {
        let position = self.days.len();
        self.index.insert(key.clone(), position);
        self.days.push((key, record));
        position
    }

    fn upsert(&mut self, key: DateKey, record: R) {
        match self.position(&key) {
            Some(position) => self.days[position].1 = record,
            None => {
                self.push(key, record);
            }
        }
    }
}

impl<R: Serialize> Serialize for Table<R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.days.iter().map(|(key, record)| (key, record)))
    }
}

impl<'de, R: Deserialize<'de>> Deserialize<'de> for Table<R> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TableVisitor(PhantomData))
    }
}

struct TableVisitor<R>(PhantomData<R>);

impl<'de, R: Deserialize<'de>> Visitor<'de> for TableVisitor<R> {
    type Value = Table<R>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of date keys to day records")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut table = Table::default();
        while let Some((key, record)) = access.next_entry::<DateKey, R>()? {
            table.upsert(key, record);
        }
        Ok(table)
    }
}

impl<R: DayRecord> Table<R> {
    /// Stored record, or a fresh default that is not written back.
    pub fn get_day(&self, key: &DateKey) -> R {
        self.position(key)
            .map(|position| self.days[position].1.clone())
            .unwrap_or_default()
    }

    pub fn set_day(&self, key: &DateKey, patch: R::Patch) -> Self {
        let mut next = self.clone();
        let position = match next.position(key) {
            Some(position) => position,
            None => next.push(key.clone(), R::default()),
        };
        next.days[position].1.apply(patch);
        next
    }

    pub fn without_day(&self, key: &DateKey) -> Self {
        let mut next = self.clone();
        if let Some(removed) = next.index.remove(key) {
            next.days.remove(removed);
            next.index
                .values_mut()
                .filter(|position| **position > removed)
                .for_each(|position| *position -= 1);
        }
        next
    }

    pub fn contains(&self, key: &DateKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DateKey, &R)> {
        self.days.iter().map(|(key, record)| (key, record))
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
