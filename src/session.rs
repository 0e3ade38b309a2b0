use crate::analyzer::progress::{Goals, Progress};
use crate::analyzer::series::{self, ChartPoint, DayMark, Metric};
use crate::config::Config;
use crate::date_key::DateKey;
use crate::db::RecordStore;
use crate::db::table::Table;
use crate::photos::PhotoStore;
use crate::records::cleaning::{CleaningMap, CleaningStatus, Room};
use crate::records::day_log::DayLog;
use crate::records::todo::{TodoId, TodoItem, TodoList};
use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Editing,
    Committed,
}

impl EditMode {
    fn for_content(present: bool) -> Self {
        if present {
            EditMode::Committed
        } else {
            EditMode::Editing
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoSave {
    Stored,
    NotSaved,
    Skipped,
}

#[derive(Debug, Clone)]
pub struct DayView {
    pub key: DateKey,
    pub log: DayLog,
    pub todos: TodoList,
    pub cleaning: CleaningMap,
    pub cleaning_status: CleaningStatus,
    pub photo: Option<Vec<u8>>,
    pub memo_mode: EditMode,
    pub photo_mode: EditMode,
    pub progress: Progress,
}

pub struct Session {
    records: RecordStore,
    photos: PhotoStore,
    goals: Goals,
    logs: Table<DayLog>,
    todos: Table<TodoList>,
    cleaning: Table<CleaningMap>,
    selected: DateKey,
    photo: Option<Vec<u8>>,
    memo_mode: EditMode,
    photo_mode: EditMode,
}

impl Session {
    pub fn new(records: RecordStore, photos: PhotoStore, goals: Goals) -> Self {
        let logs = records.load::<DayLog>();
        let todos = records.load::<TodoList>();
        let cleaning = records.load::<CleaningMap>();
        let selected = DateKey::today();
        let memo_mode = EditMode::for_content(logs.get_day(&selected).has_memo());

        debug!(
            logs = logs.len(),
            todos = todos.len(),
            cleaning = cleaning.len(),
            "tables loaded"
        );

        Self {
            records,
            photos,
            goals,
            logs,
            todos,
            cleaning,
            selected,
            photo: None,
            memo_mode,
            photo_mode: EditMode::Editing,
        }
    }

    pub async fn open(config: &Config, date: NaiveDate) -> Result<Self> {
        let records = RecordStore::open(&config.records_path, config.storage_quota_bytes)
            .or_else(|error| {
                warn!(
                    error = %error,
                    "records storage unavailable. changes will not outlive this session"
                );
                RecordStore::open_in_memory(config.storage_quota_bytes)
            })?;
        let photos = PhotoStore::open(&config.photos_path);

        let mut session = Self::new(records, photos, config.goals());
        session.select_date(date).await;
        Ok(session)
    }

    pub fn selected(&self) -> &DateKey {
        &self.selected
    }

    pub fn goals(&self) -> &Goals {
        &self.goals
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub fn photos(&self) -> &PhotoStore {
        &self.photos
    }

    pub fn todo_table(&self) -> &Table<TodoList> {
        &self.todos
    }

    /// Switches the selected day. The photo reads as absent until the store answers.
    pub async fn select_date(&mut self, date: NaiveDate) {
        self.selected = DateKey::of(date);
        self.photo = None;
        self.memo_mode = EditMode::for_content(self.current_log().has_memo());
        self.photo_mode = EditMode::Editing;

        let photo = self.photos.get(&self.selected).await.unwrap_or_else(|error| {
            warn!(error = %error, key = %self.selected, "failed to load photo");
            None
        });
        self.photo_mode = EditMode::for_content(photo.is_some());
        self.photo = photo;
    }

    pub fn day_view(&self) -> DayView {
        let log = self.current_log();
        let todos = self.current_todos();
        let cleaning = self.cleaning.get_day(&self.selected);

        DayView {
            key: self.selected.clone(),
            progress: Progress::compute(&log, &todos, &self.goals),
            cleaning_status: cleaning.status(),
            log,
            todos,
            cleaning,
            photo: self.photo.clone(),
            memo_mode: self.memo_mode,
            photo_mode: self.photo_mode,
        }
    }

    /// Merges `patch` into the selected day's log. On a persistence error the
    /// change is still visible in this session.
    pub fn update_log_fields(&mut self, patch: DayLog) -> Result<()> {
        self.logs = self.logs.set_day(&self.selected, patch);
        self.records
            .save(&self.logs)
            .context("Failed to save day log. The change is kept for this session only")
    }

    pub fn save_memo(&mut self, memo: &str) -> Result<()> {
        let saved = self.update_log_fields(DayLog {
            memo: Some(memo.to_string()),
            ..DayLog::default()
        });
        self.memo_mode = EditMode::Committed;
        saved
    }

    pub fn edit_memo(&mut self) {
        self.memo_mode = EditMode::Editing;
    }

    pub fn add_todo(&mut self, text: &str) -> Result<Option<TodoId>> {
        let mut list = self.current_todos();
        let Some(item) = TodoItem::new(list.next_id(Utc::now().timestamp_millis()), text) else {
            return Ok(None);
        };

        let id = item.id;
        list.push(item);
        self.store_todos(list)?;
        Ok(Some(id))
    }

    pub fn toggle_todo(&mut self, id: TodoId) -> Result<bool> {
        let mut list = self.current_todos();
        if !list.toggle(id) {
            return Ok(false);
        }

        self.store_todos(list)?;
        Ok(true)
    }

    pub fn delete_todo(&mut self, id: TodoId) -> Result<bool> {
        let mut list = self.current_todos();
        if !list.remove(id) {
            return Ok(false);
        }

        self.store_todos(list)?;
        Ok(true)
    }

    pub fn toggle_cleaning_room(&mut self, room: Room) -> Result<bool> {
        let cleaned = self.cleaning.get_day(&self.selected).toggled(room);
        let patch = CleaningMap::from_iter([(room, cleaned)]);

        self.cleaning = self.cleaning.set_day(&self.selected, patch);
        self.records
            .save(&self.cleaning)
            .context("Failed to save cleaning state. The change is kept for this session only")?;
        Ok(cleaned)
    }

    pub fn reset_cleaning_for_day(&mut self) -> Result<()> {
        self.cleaning = self.cleaning.without_day(&self.selected);
        self.records
            .save(&self.cleaning)
            .context("Failed to save cleaning reset. The change is kept for this session only")
    }

    /// `None` (no file chosen) and empty uploads are ignored.
    pub async fn set_photo(&mut self, upload: Option<Vec<u8>>) -> PhotoSave {
        let Some(photo) = upload.filter(|bytes| !bytes.is_empty()) else {
            debug!(key = %self.selected, "no photo selected");
            return PhotoSave::Skipped;
        };

        self.photo = Some(photo.clone());
        self.photo_mode = EditMode::Committed;

        match self.photos.put(&self.selected, photo).await {
            Ok(()) => PhotoSave::Stored,
            Err(error) => {
                warn!(error = %error, key = %self.selected, "failed to save photo");
                PhotoSave::NotSaved
            }
        }
    }

    pub async fn delete_photo(&mut self) -> bool {
        self.photo = None;
        self.photo_mode = EditMode::Editing;

        self.photos
            .delete(&self.selected)
            .await
            .map_err(|error| {
                warn!(error = %error, key = %self.selected, "failed to delete photo");
                error
            })
            .is_ok()
    }

    pub fn edit_photo(&mut self) {
        self.photo_mode = EditMode::Editing;
    }

    pub fn chart_series(&self) -> Vec<ChartPoint> {
        self.metric_series(Metric::Steps)
    }

    pub fn metric_series(&self, metric: Metric) -> Vec<ChartPoint> {
        series::metric_series(&self.logs, metric)
    }

    pub fn month_marks(&self, year: i32, month: u32) -> Result<Vec<DayMark>> {
        series::month_marks(year, month, &self.logs, &self.cleaning)
    }

    fn current_log(&self) -> DayLog {
        self.logs.get_day(&self.selected)
    }

    fn current_todos(&self) -> TodoList {
        self.todos.get_day(&self.selected)
    }

    fn store_todos(&mut self, list: TodoList) -> Result<()> {
        self.todos = self.todos.set_day(&self.selected, list);
        self.records
            .save(&self.todos)
            .context("Failed to save to-dos. The change is kept for this session only")
    }
}

#[cfg(test)]
mod tests {
    use super::{EditMode, PhotoSave, Session};
    use crate::analyzer::progress::Goals;
    use crate::date_key::DateKey;
    use crate::db::RecordStore;
    use crate::photos::PhotoStore;
    use crate::records::cleaning::{CleaningStatus, Room};
    use crate::records::day_log::DayLog;
    use chrono::NaiveDate;
    use std::fs;

    const QUOTA: usize = 1024 * 1024;

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    fn session_with_quota(quota: usize) -> Session {
        Session::new(
            RecordStore::open_in_memory(quota).unwrap(),
            PhotoStore::in_memory(),
            Goals::default(),
        )
    }

    async fn session_on(raw: &str) -> Session {
        let mut session = session_with_quota(QUOTA);
        session.select_date(date(raw)).await;
        session
    }

    #[tokio::test]
    async fn logging_steps_updates_progress_and_chart() {
        let mut session = session_on("2024-01-15").await;

        session
            .update_log_fields(DayLog {
                steps: Some("12000".to_string()),
                ..DayLog::default()
            })
            .unwrap();

        let view = session.day_view();
        assert_eq!(view.log.steps.as_deref(), Some("12000"));
        assert_eq!(view.progress.steps, 100.0);

        let stored = session.records().load::<DayLog>();
        let key: DateKey = "2024-01-15".parse().unwrap();
        assert_eq!(
            stored.get_day(&key),
            DayLog {
                steps: Some("12000".to_string()),
                ..DayLog::default()
            }
        );

        let series = session.chart_series();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].key, key);
        assert_eq!(series[0].value, 12000.0);
    }

    #[tokio::test]
    async fn todo_add_and_toggle() {
        let mut session = session_on("2024-01-15").await;

        let id = session.add_todo("buy milk").unwrap().unwrap();
        assert!(session.toggle_todo(id).unwrap());

        let view = session.day_view();
        assert_eq!(view.todos.len(), 1);
        assert!(view.todos.items()[0].done);
        assert_eq!(view.progress.todos, 20.0);
    }

    #[tokio::test]
    async fn todo_blank_text_and_unknown_ids_are_no_ops() {
        let mut session = session_on("2024-01-15").await;

        assert_eq!(session.add_todo("   ").unwrap(), None);
        assert!(!session.toggle_todo(42).unwrap());
        assert!(!session.delete_todo(42).unwrap());
        assert!(session.todo_table().is_empty());
    }

    #[tokio::test]
    async fn rapid_todo_adds_get_distinct_ids() {
        let mut session = session_on("2024-01-15").await;

        let first = session.add_todo("one").unwrap().unwrap();
        let second = session.add_todo("two").unwrap().unwrap();
        assert_ne!(first, second);

        assert!(session.delete_todo(first).unwrap());
        let view = session.day_view();
        assert_eq!(view.todos.len(), 1);
        assert_eq!(view.todos.items()[0].text, "two");
    }

    #[tokio::test]
    async fn todos_are_per_day() {
        let mut session = session_on("2024-01-15").await;
        session.add_todo("laundry").unwrap();

        session.select_date(date("2024-01-16")).await;
        assert!(session.day_view().todos.is_empty());

        session.select_date(date("2024-01-15")).await;
        assert_eq!(session.day_view().todos.len(), 1);
    }

    #[tokio::test]
    async fn cleaning_toggle_and_reset() {
        let mut session = session_on("2024-01-15").await;

        assert!(session.toggle_cleaning_room(Room::Kitchen).unwrap());
        assert_eq!(session.day_view().cleaning_status, CleaningStatus::Partial);

        for room in Room::ALL.into_iter().filter(|room| *room != Room::Kitchen) {
            session.toggle_cleaning_room(room).unwrap();
        }
        assert_eq!(session.day_view().cleaning_status, CleaningStatus::Full);

        assert!(!session.toggle_cleaning_room(Room::Bath).unwrap());
        assert_eq!(session.day_view().cleaning_status, CleaningStatus::Partial);

        session.reset_cleaning_for_day().unwrap();
        assert_eq!(session.day_view().cleaning_status, CleaningStatus::Unmarked);
        assert!(session.records().load::<crate::records::cleaning::CleaningMap>().is_empty());
    }

    #[tokio::test]
    async fn deleting_a_photo_that_was_never_set() {
        let mut session = session_on("2024-01-15").await;

        assert!(session.delete_photo().await);
        assert_eq!(session.day_view().photo, None);
        assert_eq!(session.photos().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn photo_modes_follow_content() {
        let mut session = session_on("2024-01-15").await;
        assert_eq!(session.day_view().photo_mode, EditMode::Editing);

        assert_eq!(session.set_photo(None).await, PhotoSave::Skipped);
        assert_eq!(session.set_photo(Some(Vec::new())).await, PhotoSave::Skipped);
        assert_eq!(session.day_view().photo_mode, EditMode::Editing);

        assert_eq!(session.set_photo(Some(vec![0xff, 0xd8])).await, PhotoSave::Stored);
        assert_eq!(session.day_view().photo_mode, EditMode::Committed);

        session.select_date(date("2024-01-16")).await;
        assert_eq!(session.day_view().photo, None);
        assert_eq!(session.day_view().photo_mode, EditMode::Editing);

        session.select_date(date("2024-01-15")).await;
        let view = session.day_view();
        assert_eq!(view.photo, Some(vec![0xff, 0xd8]));
        assert_eq!(view.photo_mode, EditMode::Committed);

        session.edit_photo();
        assert_eq!(session.day_view().photo_mode, EditMode::Editing);

        assert!(session.delete_photo().await);
        session.select_date(date("2024-01-15")).await;
        assert_eq!(session.day_view().photo, None);
    }

    #[tokio::test]
    async fn photo_failure_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"file").unwrap();
        let mut session = Session::new(
            RecordStore::open_in_memory(QUOTA).unwrap(),
            PhotoStore::open(blocker.join("photos.db")),
            Goals::default(),
        );
        session.select_date(date("2024-01-15")).await;

        assert_eq!(session.set_photo(Some(vec![1])).await, PhotoSave::NotSaved);
        assert_eq!(session.day_view().photo, Some(vec![1]));
        assert!(!session.delete_photo().await);
    }

    #[tokio::test]
    async fn memo_modes_follow_content() {
        let mut session = session_on("2024-01-15").await;
        assert_eq!(session.day_view().memo_mode, EditMode::Editing);

        session.save_memo("quiet day").unwrap();
        assert_eq!(session.day_view().memo_mode, EditMode::Committed);

        session.edit_memo();
        assert_eq!(session.day_view().memo_mode, EditMode::Editing);

        session.select_date(date("2024-01-16")).await;
        assert_eq!(session.day_view().memo_mode, EditMode::Editing);

        session.select_date(date("2024-01-15")).await;
        let view = session.day_view();
        assert_eq!(view.memo_mode, EditMode::Committed);
        assert_eq!(view.log.memo_text(), "quiet day");
    }

    #[tokio::test]
    async fn failed_save_keeps_session_view() {
        let mut session = session_with_quota(64);
        session.select_date(date("2024-01-15")).await;

        let error = session.save_memo(&"long ".repeat(40)).unwrap_err();
        assert!(format!("{error:#}").contains("quota"));

        let view = session.day_view();
        assert!(view.log.memo_text().starts_with("long"));
        assert_eq!(view.memo_mode, EditMode::Committed);
        assert!(session.records().load::<DayLog>().is_empty());
    }

    #[tokio::test]
    async fn tables_are_written_independently() {
        let mut session = session_on("2024-01-15").await;
        session.add_todo("call mum").unwrap();

        assert!(session.records().load::<DayLog>().is_empty());
        assert!(session.records().load::<crate::records::cleaning::CleaningMap>().is_empty());
        assert_eq!(session.records().load::<crate::records::todo::TodoList>().len(), 1);
    }

    #[tokio::test]
    async fn reopening_restores_saved_days() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = crate::config::Config::default();
        config.records_path = dir.path().join("records.db");
        config.photos_path = dir.path().join("photos.db");

        {
            let mut session = Session::open(&config, date("2024-01-15")).await.unwrap();
            session
                .update_log_fields(DayLog {
                    wake_time: Some("06:10".to_string()),
                    ..DayLog::default()
                })
                .unwrap();
            session.toggle_cleaning_room(Room::Entrance).unwrap();
            assert_eq!(session.set_photo(Some(vec![3, 1, 4])).await, PhotoSave::Stored);
        }

        let session = Session::open(&config, date("2024-01-15")).await.unwrap();
        let view = session.day_view();
        assert_eq!(view.log.wake_time.as_deref(), Some("06:10"));
        assert!(view.cleaning.is_cleaned(Room::Entrance));
        assert_eq!(view.photo, Some(vec![3, 1, 4]));

        let marks = session.month_marks(2024, 1).unwrap();
        assert_eq!(marks[14].wake_label.as_deref(), Some("06:10"));
        assert_eq!(marks[14].cleaning, CleaningStatus::Partial);
    }

    #[tokio::test]
    async fn unreachable_records_db_falls_back_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"file").unwrap();

        let mut config = crate::config::Config::default();
        config.records_path = blocker.join("records.db");
        config.photos_path = dir.path().join("photos.db");

        let mut session = Session::open(&config, date("2024-01-15")).await.unwrap();
        session
            .update_log_fields(DayLog {
                steps: Some("5".to_string()),
                ..DayLog::default()
            })
            .unwrap();

        assert_eq!(session.day_view().log.steps.as_deref(), Some("5"));
        assert_eq!(session.records().load::<DayLog>().len(), 1);
        assert!(!config.records_path.exists());
    }
}
