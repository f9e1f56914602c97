use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection};

use crate::locale::Locale;
use crate::record::TranslationRecord;
use crate::store::TranslationStore;

/// SQLite-backed translation store.
///
/// Each stored attribute is one row keyed by `(owner_id, locale, attribute)`,
/// so records with arbitrary attribute names fit without schema changes.
/// Cloning shares the underlying connection.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the store at `database_path` and ensure the schema.
    pub fn new(database_path: &str) -> Result<Self> {
        let conn = Connection::open(database_path)
            .context(format!("Failed to open database at {}", database_path))?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open a store backed by an in-memory database.
    ///
    /// Data lives as long as this store (and its clones); useful for tests
    /// and scratch work.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS translations (
                owner_id INTEGER NOT NULL,
                locale TEXT NOT NULL,
                attribute TEXT NOT NULL,
                value TEXT,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (owner_id, locale, attribute)
            )",
            [],
        )
        .context("Failed to create translations table")?;
        Ok(())
    }

    /// Number of stored attribute rows for one owner.
    pub fn row_count(&self, owner_id: i64) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count = conn
            .query_row(
                "SELECT COUNT(*) FROM translations WHERE owner_id = ?1",
                params![owner_id],
                |row| row.get(0),
            )
            .context("Failed to count translation rows")?;
        Ok(count)
    }

    /// Number of stored attribute rows across all owners.
    pub fn total_row_count(&self) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count = conn
            .query_row("SELECT COUNT(*) FROM translations", [], |row| row.get(0))
            .context("Failed to count translation rows")?;
        Ok(count)
    }
}

impl TranslationStore for SqliteStore {
    fn load_record(&self, owner_id: i64, locale: &Locale) -> Result<Option<TranslationRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT attribute, value FROM translations
                 WHERE owner_id = ?1 AND locale = ?2",
            )
            .context("Failed to prepare translation query")?;

        let rows = stmt
            .query_map(params![owner_id, locale.as_str()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
            })
            .context("Failed to query translation rows")?;

        let mut values = HashMap::new();
        for row in rows {
            let (attribute, value) = row.context("Failed to read translation row")?;
            values.insert(attribute, value);
        }

        if values.is_empty() {
            return Ok(None);
        }
        Ok(Some(TranslationRecord::with_values(locale.clone(), values)))
    }

    fn load_records(
        &self,
        owner_id: i64,
        locales: &[Locale],
    ) -> Result<HashMap<Locale, TranslationRecord>> {
        if locales.is_empty() {
            return Ok(HashMap::new());
        }

        let conn = self.conn.lock().unwrap();
        let placeholders = (0..locales.len())
            .map(|i| format!("?{}", i + 2))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT locale, attribute, value FROM translations
             WHERE owner_id = ?1 AND locale IN ({})",
            placeholders
        );
        let mut stmt = conn
            .prepare(&sql)
            .context("Failed to prepare bulk translation query")?;

        let mut sql_params: Vec<&dyn rusqlite::ToSql> = vec![&owner_id];
        let tags: Vec<&str> = locales.iter().map(Locale::as_str).collect();
        for tag in &tags {
            sql_params.push(tag);
        }

        let rows = stmt
            .query_map(&sql_params[..], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            })
            .context("Failed to query translation rows")?;

        let mut grouped: HashMap<Locale, HashMap<String, Option<String>>> = HashMap::new();
        for row in rows {
            let (locale, attribute, value) = row.context("Failed to read translation row")?;
            grouped
                .entry(Locale::from(locale))
                .or_default()
                .insert(attribute, value);
        }

        Ok(grouped
            .into_iter()
            .map(|(locale, values)| {
                let record = TranslationRecord::with_values(locale.clone(), values);
                (locale, record)
            })
            .collect())
    }

    fn save_record(&self, owner_id: i64, record: &TranslationRecord) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .context("Failed to begin translation save")?;
        let now = Utc::now().to_rfc3339();

        for (attribute, value) in record.values() {
            tx.execute(
                "INSERT INTO translations (owner_id, locale, attribute, value, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (owner_id, locale, attribute)
                 DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![owner_id, record.locale().as_str(), attribute, value, now],
            )
            .context("Failed to save translation attribute")?;
        }

        tx.commit().context("Failed to commit translation save")?;
        Ok(())
    }

    fn delete_records(&self, owner_id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM translations WHERE owner_id = ?1",
            params![owner_id],
        )
        .context("Failed to delete translation records")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ==================== Helper Functions ====================

    /// Create a temporary on-disk store for testing
    fn create_test_store() -> (SqliteStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test_translations.db");
        let store = SqliteStore::new(db_path.to_str().unwrap()).expect("Failed to create store");
        (store, temp_dir)
    }

    fn record(locale: &str, values: &[(&str, Option<&str>)]) -> TranslationRecord {
        let mut record = TranslationRecord::new(locale);
        for (name, value) in values {
            record.set(name, *value);
        }
        record
    }

    // ==================== Store Initialization Tests ====================

    #[test]
    fn test_store_creation() {
        let (store, _temp_dir) = create_test_store();
        assert_eq!(store.total_row_count().expect("Should count"), 0);
    }

    #[test]
    fn test_invalid_database_path() {
        let result = SqliteStore::new("/non/existent/path/db.db");
        assert!(result.is_err());
    }

    #[test]
    fn test_store_reopening() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let path_str = db_path.to_str().unwrap();

        // Create store and save a record
        {
            let store = SqliteStore::new(path_str).expect("Failed to create store");
            store
                .save_record(1, &record("en", &[("title", Some("Example"))]))
                .expect("Should save");
        }

        // Reopen store
        {
            let store = SqliteStore::new(path_str).expect("Failed to reopen store");
            let loaded = store
                .load_record(1, &Locale::from("en"))
                .expect("Should load")
                .expect("Record should persist");
            assert_eq!(loaded.value("title"), Some("Example"));
        }
    }

    // ==================== Round-Trip Tests ====================

    #[test]
    fn test_load_missing_record() {
        let store = SqliteStore::in_memory().expect("Should open");
        let loaded = store
            .load_record(1, &Locale::from("en"))
            .expect("Should load");
        assert!(loaded.is_none());
    }

    #[test]
    fn test_save_and_load_with_explicit_null() {
        let store = SqliteStore::in_memory().expect("Should open");
        store
            .save_record(
                1,
                &record("de", &[("title", Some("Beispiel")), ("subtitle", None)]),
            )
            .expect("Should save");

        let loaded = store
            .load_record(1, &Locale::from("de"))
            .expect("Should load")
            .expect("Record should exist");
        assert_eq!(loaded.value("title"), Some("Beispiel"));
        assert!(loaded.contains("subtitle"));
        assert_eq!(loaded.value("subtitle"), None);
    }

    #[test]
    fn test_save_upserts_attributes() {
        let store = SqliteStore::in_memory().expect("Should open");
        store
            .save_record(1, &record("en", &[("title", Some("January"))]))
            .expect("Should save");
        store
            .save_record(
                1,
                &record("en", &[("description", Some("First month of the Year."))]),
            )
            .expect("Should save");
        store
            .save_record(1, &record("en", &[("title", Some("February"))]))
            .expect("Should save");

        let loaded = store
            .load_record(1, &Locale::from("en"))
            .expect("Should load")
            .expect("Record should exist");
        assert_eq!(loaded.value("title"), Some("February"));
        assert_eq!(
            loaded.value("description"),
            Some("First month of the Year.")
        );
        assert_eq!(store.row_count(1).expect("Should count"), 2);
    }

    #[test]
    fn test_bulk_load() {
        let store = SqliteStore::in_memory().expect("Should open");
        store
            .save_record(1, &record("en", &[("title", Some("Example"))]))
            .expect("Should save");
        store
            .save_record(1, &record("de", &[("title", Some("Beispiel"))]))
            .expect("Should save");
        store
            .save_record(2, &record("en", &[("title", Some("Other owner"))]))
            .expect("Should save");

        let locales = [Locale::from("en"), Locale::from("de"), Locale::from("fr")];
        let loaded = store.load_records(1, &locales).expect("Should load");
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[&Locale::from("en")].value("title"), Some("Example"));
        assert_eq!(loaded[&Locale::from("de")].value("title"), Some("Beispiel"));
    }

    #[test]
    fn test_bulk_load_empty_locale_set() {
        let store = SqliteStore::in_memory().expect("Should open");
        let loaded = store.load_records(1, &[]).expect("Should load");
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_delete_records_cascades() {
        let store = SqliteStore::in_memory().expect("Should open");
        store
            .save_record(1, &record("en", &[("title", Some("Example"))]))
            .expect("Should save");
        store
            .save_record(1, &record("de", &[("title", Some("Beispiel"))]))
            .expect("Should save");
        store
            .save_record(2, &record("en", &[("title", Some("Keep me"))]))
            .expect("Should save");

        store.delete_records(1).expect("Should delete");

        assert_eq!(store.row_count(1).expect("Should count"), 0);
        assert_eq!(store.row_count(2).expect("Should count"), 1);
    }
}
