use crate::date_key::DateKey;
use crate::db::queries;
use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task;
use tracing::{debug, info, warn};

enum Medium {
    Unopened(Option<PathBuf>),
    Ready(Connection),
    Unavailable,
}

impl Medium {
    fn connection(&mut self) -> Option<&Connection> {
        if let Medium::Unopened(location) = self {
            let next = match open_connection(location.as_deref()) {
                Ok(conn) => {
                    info!(location = ?location, "photo storage ready");
                    Medium::Ready(conn)
                }
                Err(error) => {
                    warn!(error = %error, "photo storage unavailable. photos will not be kept");
                    Medium::Unavailable
                }
            };
            *self = next;
        }

        match &*self {
            Medium::Ready(conn) => Some(conn),
            _ => None,
        }
    }

    fn require(&mut self) -> Result<&Connection> {
        self.connection().ok_or_else(|| anyhow!("Photo storage is unavailable"))
    }
}

/// Per-day photo payloads in their own database.
///
/// The database is opened by the first operation and the outcome is kept, so
/// every operation may be called before initialization finished. If opening
/// fails the store stays unavailable: reads answer absent and writes fail.
///
/// Every operation joins one fair queue before anything else, opening
/// included, so overlapping calls complete in call order.
#[derive(Clone)]
pub struct PhotoStore {
    medium: Arc<Mutex<Medium>>,
}

impl PhotoStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::with_medium(Medium::Unopened(Some(path.into())))
    }

    pub fn in_memory() -> Self {
        Self::with_medium(Medium::Unopened(None))
    }

    fn with_medium(medium: Medium) -> Self {
        Self {
            medium: Arc::new(Mutex::new(medium)),
        }
    }

    pub async fn is_available(&self) -> bool {
        self.run(|medium| Ok(medium.connection().is_some()))
            .await
            .unwrap_or(false)
    }

    pub async fn put(&self, key: &DateKey, photo: Vec<u8>) -> Result<()> {
        let key = key.clone();

        self.run(move |medium| {
            medium
                .require()?
                .execute(
                    queries::UPSERT_PHOTO,
                    params![key.as_str(), photo, Utc::now().timestamp()],
                )
                .with_context(|| format!("Failed to store photo for {key}"))?;
            debug!(key = %key, bytes = photo.len(), "photo stored");
            Ok(())
        })
        .await
    }

    pub async fn get(&self, key: &DateKey) -> Result<Option<Vec<u8>>> {
        let key = key.clone();

        self.run(move |medium| {
            let Some(conn) = medium.connection() else {
                return Ok(None);
            };
            conn.query_row(queries::SELECT_PHOTO, params![key.as_str()], |row| {
                row.get::<_, Vec<u8>>(0)
            })
            .optional()
            .with_context(|| format!("Failed to read photo for {key}"))
        })
        .await
    }

    /// Deleting a key with no photo succeeds.
    pub async fn delete(&self, key: &DateKey) -> Result<()> {
        let key = key.clone();

        self.run(move |medium| {
            let removed = medium
                .require()?
                .execute(queries::DELETE_PHOTO, params![key.as_str()])
                .with_context(|| format!("Failed to delete photo for {key}"))?;
            debug!(key = %key, removed, "photo deleted");
            Ok(())
        })
        .await
    }

    pub async fn count(&self) -> Result<usize> {
        self.run(|medium| {
            let Some(conn) = medium.connection() else {
                return Ok(0);
            };
            let count: i64 = conn
                .query_row(queries::COUNT_PHOTOS, [], |row| row.get(0))
                .context("Failed to count photos")?;
            Ok(usize::try_from(count).unwrap_or_default())
        })
        .await
    }

    async fn run<T, F>(&self, operation: F) -> Result<T>
    where
        F: FnOnce(&mut Medium) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let mut medium = Arc::clone(&self.medium).lock_owned().await;
        task::spawn_blocking(move || operation(&mut *medium)).await?
    }
}

fn open_connection(location: Option<&Path>) -> Result<Connection> {
    let conn = match location {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create photo directory: {}", parent.display())
                })?;
            }
            Connection::open(path)
                .with_context(|| format!("Failed to open photo DB: {}", path.display()))?
        }
        None => Connection::open_in_memory().context("Failed to open in-memory photo DB")?,
    };

    queries::photo_schema_statements()
        .iter()
        .try_for_each(|statement| {
            conn.execute(statement, [])
                .context("Failed to initialize photo schema")
                .map(|_| ())
        })?;

    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::PhotoStore;
    use crate::date_key::DateKey;
    use std::fs;

    fn key(raw: &str) -> DateKey {
        raw.parse().unwrap()
    }

    #[tokio::test]
    async fn put_get_and_replace() {
        let store = PhotoStore::in_memory();
        let day = key("2024-01-15");

        assert_eq!(store.get(&day).await.unwrap(), None);

        store.put(&day, vec![1, 2, 3]).await.unwrap();
        assert_eq!(store.get(&day).await.unwrap(), Some(vec![1, 2, 3]));

        store.put(&day, vec![9]).await.unwrap();
        assert_eq!(store.get(&day).await.unwrap(), Some(vec![9]));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_removes_key_and_tolerates_absent() {
        let store = PhotoStore::in_memory();
        let day = key("2024-01-15");

        store.delete(&day).await.unwrap();
        assert_eq!(store.get(&day).await.unwrap(), None);

        store.put(&day, Vec::from(*b"jpeg")).await.unwrap();
        store.delete(&day).await.unwrap();
        assert_eq!(store.get(&day).await.unwrap(), None);
    }

    #[tokio::test]
    async fn empty_payload_is_not_absence() {
        let store = PhotoStore::in_memory();
        let day = key("2024-01-15");

        store.put(&day, Vec::new()).await.unwrap();
        assert_eq!(store.get(&day).await.unwrap(), Some(Vec::new()));
    }

    #[tokio::test]
    async fn concurrent_first_calls_share_one_medium() {
        let store = PhotoStore::in_memory();
        let first = key("2024-01-15");
        let second = key("2024-01-16");

        let (put_a, put_b) = tokio::join!(
            store.put(&first, vec![1]),
            store.put(&second, vec![2])
        );
        put_a.unwrap();
        put_b.unwrap();

        // A second in-memory database would have lost one of the writes.
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn overlapping_calls_before_open_run_in_call_order() {
        for _ in 0..50 {
            let store = PhotoStore::in_memory();
            let day = key("2024-01-15");

            let (put, delete, get) = tokio::join!(
                store.put(&day, vec![1]),
                store.delete(&day),
                store.get(&day)
            );
            put.unwrap();
            delete.unwrap();
            assert_eq!(get.unwrap(), None);
            assert_eq!(store.get(&day).await.unwrap(), None);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn overlapping_tasks_before_open_run_in_call_order() {
        for _ in 0..20 {
            let store = PhotoStore::in_memory();
            let day = key("2024-01-15");

            let (put, delete, get) = tokio::join!(
                store.put(&day, vec![1]),
                store.delete(&day),
                store.get(&day)
            );
            put.unwrap();
            delete.unwrap();
            assert_eq!(get.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn upload_then_delete_leaves_key_absent() {
        let store = PhotoStore::in_memory();
        let day = key("2024-01-15");

        store.put(&day, vec![7]).await.unwrap();
        store.delete(&day).await.unwrap();
        assert_eq!(store.get(&day).await.unwrap(), None);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn survives_reopen_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photos.db");
        let day = key("2024-01-15");

        PhotoStore::open(&path).put(&day, vec![4, 2]).await.unwrap();

        let reopened = PhotoStore::open(&path);
        assert_eq!(reopened.get(&day).await.unwrap(), Some(vec![4, 2]));
    }

    #[tokio::test]
    async fn unavailable_medium_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"file").unwrap();
        let store = PhotoStore::open(blocker.join("photos.db"));
        let day = key("2024-01-15");

        assert!(!store.is_available().await);
        assert_eq!(store.get(&day).await.unwrap(), None);
        assert!(store.put(&day, vec![1]).await.is_err());
        assert!(store.delete(&day).await.is_err());
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
