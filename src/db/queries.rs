pub const CREATE_RECORD_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS record_tables (
  name       TEXT PRIMARY KEY,
  payload    TEXT NOT NULL,
  updated_at INTEGER NOT NULL
);
"#;

pub const CREATE_PHOTOS: &str = r#"
CREATE TABLE IF NOT EXISTS photos (
  key        TEXT PRIMARY KEY,
  data       BLOB NOT NULL,
  updated_at INTEGER NOT NULL
);
"#;

pub const SELECT_TABLE_PAYLOAD: &str = "SELECT payload FROM record_tables WHERE name = ?1";

pub const UPSERT_TABLE_PAYLOAD: &str = "INSERT INTO record_tables (name, payload, updated_at)
     VALUES (?1, ?2, ?3)
     ON CONFLICT(name)
     DO UPDATE SET payload=excluded.payload, updated_at=excluded.updated_at";

pub const SUM_OTHER_PAYLOAD_BYTES: &str =
    "SELECT COALESCE(SUM(LENGTH(CAST(payload AS BLOB))), 0) FROM record_tables WHERE name != ?1";

pub const SUM_PAYLOAD_BYTES: &str =
    "SELECT COALESCE(SUM(LENGTH(CAST(payload AS BLOB))), 0) FROM record_tables";

pub const SELECT_PHOTO: &str = "SELECT data FROM photos WHERE key = ?1";

pub const UPSERT_PHOTO: &str = "INSERT INTO photos (key, data, updated_at)
     VALUES (?1, ?2, ?3)
     ON CONFLICT(key)
     DO UPDATE SET data=excluded.data, updated_at=excluded.updated_at";

pub const DELETE_PHOTO: &str = "DELETE FROM photos WHERE key = ?1";

pub const COUNT_PHOTOS: &str = "SELECT COUNT(*) FROM photos";

pub fn record_schema_statements() -> Vec<&'static str> {
    vec![CREATE_RECORD_TABLES]
}

pub fn photo_schema_statements() -> Vec<&'static str> {
    vec![CREATE_PHOTOS]
}
