//! Storage contract for translation records, plus an in-memory
//! implementation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;

use crate::locale::Locale;
use crate::record::TranslationRecord;

/// Storage collaborator that persists translation records.
///
/// Records are keyed by `(owner_id, locale)`; implementations must keep at
/// most one record per locale per owner. Failures propagate to the caller
/// unchanged; the resolver neither retries nor suppresses them.
pub trait TranslationStore {
    /// Load the record for one locale.
    ///
    /// # Returns
    /// * `Ok(Some(record))` when the owner has a record stored for `locale`
    /// * `Ok(None)` when it has none
    fn load_record(&self, owner_id: i64, locale: &Locale) -> Result<Option<TranslationRecord>>;

    /// Bulk form of [`load_record`](Self::load_record).
    ///
    /// Locales with no stored record are simply absent from the returned
    /// map. The default implementation loads one record at a time;
    /// implementations backed by a database should override it with a
    /// single query.
    fn load_records(
        &self,
        owner_id: i64,
        locales: &[Locale],
    ) -> Result<HashMap<Locale, TranslationRecord>> {
        let mut records = HashMap::new();
        for locale in locales {
            if let Some(record) = self.load_record(owner_id, locale)? {
                records.insert(locale.clone(), record);
            }
        }
        Ok(records)
    }

    /// Insert or update the record for `record.locale()`.
    ///
    /// Attributes present in `record` overwrite stored ones; attributes the
    /// record never touched stay as they are.
    fn save_record(&self, owner_id: i64, record: &TranslationRecord) -> Result<()>;

    /// Remove every record belonging to `owner_id` (cascade on owner
    /// deletion).
    fn delete_records(&self, owner_id: i64) -> Result<()>;
}

/// In-memory translation store.
///
/// Cloning yields a handle onto the same data, mirroring how database-backed
/// stores share a connection. Useful for tests and for owners that never
/// outlive the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rows: Arc<Mutex<HashMap<i64, HashMap<Locale, HashMap<String, Option<String>>>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records for one owner.
    pub fn record_count(&self, owner_id: i64) -> usize {
        let rows = self.rows.lock().unwrap();
        rows.get(&owner_id).map_or(0, HashMap::len)
    }
}

impl TranslationStore for MemoryStore {
    fn load_record(&self, owner_id: i64, locale: &Locale) -> Result<Option<TranslationRecord>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .get(&owner_id)
            .and_then(|records| records.get(locale))
            .map(|values| TranslationRecord::with_values(locale.clone(), values.clone())))
    }

    fn save_record(&self, owner_id: i64, record: &TranslationRecord) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        let stored = rows
            .entry(owner_id)
            .or_default()
            .entry(record.locale().clone())
            .or_default();
        for (attribute, value) in record.values() {
            stored.insert(attribute.clone(), value.clone());
        }
        Ok(())
    }

    fn delete_records(&self, owner_id: i64) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        rows.remove(&owner_id);
        Ok(())
    }
}
