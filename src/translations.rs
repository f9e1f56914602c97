//! Attribute resolution across per-locale translation records.
//!
//! [`Translations`] is the state an owning entity holds for its translated
//! attributes: the loaded records, the current locale cursor, and the
//! fallback configuration. Reads walk the fallback chain until a record
//! carries the attribute; writes go to the current locale's record.

use std::collections::{HashMap, HashSet};

use anyhow::{bail, Context, Result};
use tracing::{debug, warn};

use crate::fallback::Fallback;
use crate::locale::Locale;
use crate::record::TranslationRecord;
use crate::store::TranslationStore;

/// Translated attribute state of one owning entity.
///
/// Each owner instance gets its own `Translations`; nothing is shared and no
/// locking is needed. Records are fetched from the store lazily, the first
/// time a locale is consulted, or eagerly via
/// [`load_translations`](Self::load_translations).
///
/// A resolver created with [`new`](Self::new) is detached: it belongs to an
/// owner that has not been saved yet, keeps everything in memory, and only
/// talks to the store once [`attach`](Self::attach) has assigned the owner
/// id.
#[derive(Debug)]
pub struct Translations<S: TranslationStore> {
    store: S,
    owner_id: Option<i64>,
    locale: Locale,
    fallback: Fallback,
    records: HashMap<Locale, TranslationRecord>,
    /// Locales already looked up in the store, whether a record existed
    /// or not.
    fetched: HashSet<Locale>,
}

impl<S: TranslationStore> Translations<S> {
    /// Resolver for a not-yet-persisted owner.
    ///
    /// Reads and writes stay in memory; [`save`](Self::save) fails until
    /// [`attach`](Self::attach) is called after the owner itself is saved.
    pub fn new(store: S) -> Self {
        Self::init(store, None)
    }

    /// Resolver for an owner already persisted under `owner_id`.
    pub fn for_owner(store: S, owner_id: i64) -> Self {
        Self::init(store, Some(owner_id))
    }

    fn init(store: S, owner_id: Option<i64>) -> Self {
        Self {
            store,
            owner_id,
            locale: Locale::default(),
            fallback: Fallback::default(),
            records: HashMap::new(),
            fetched: HashSet::new(),
        }
    }

    /// Bind a detached resolver to its now-saved owner.
    pub fn attach(&mut self, owner_id: i64) {
        self.owner_id = Some(owner_id);
    }

    /// The owner id, or `None` while the owner is unsaved.
    pub fn owner_id(&self) -> Option<i64> {
        self.owner_id
    }

    // ==================== Locale cursor ====================

    /// The current locale cursor.
    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Move the cursor. A pure state change; no storage access.
    pub fn set_locale(&mut self, locale: impl Into<Locale>) {
        self.locale = locale.into();
    }

    // ==================== Fallback configuration ====================

    /// The raw fallback configuration.
    pub fn fallback(&self) -> &Fallback {
        &self.fallback
    }

    /// Replace the fallback configuration.
    pub fn set_fallback(&mut self, fallback: Fallback) {
        self.fallback = fallback;
    }

    /// The single resolved fallback locale for `locale`, without walking
    /// the full chain. See [`Fallback::resolve`] for the precedence rules.
    pub fn fallback_for(&self, locale: impl Into<Locale>) -> Locale {
        self.fallback.resolve(&locale.into())
    }

    // ==================== Attribute access ====================

    /// Read `name` through the fallback chain.
    ///
    /// The exact current-locale record wins whenever it has `name` set,
    /// explicit null included. Otherwise one fallback step at a time is
    /// taken until a record answers or a locale repeats, in which case the
    /// attribute resolves to `Ok(None)`. A miss is never an error; only
    /// storage failures are.
    pub fn get(&mut self, name: &str) -> Result<Option<String>> {
        let mut visited: HashSet<Locale> = HashSet::new();
        let mut locale = self.locale.clone();

        loop {
            if !visited.insert(locale.clone()) {
                // Observed behavior of the chain: a cycle resolves to null
                // rather than an error.
                warn!(
                    "Fallback chain for '{}' loops at locale '{}', resolving to null",
                    name, locale
                );
                return Ok(None);
            }

            self.ensure_fetched(&locale)?;
            if let Some(record) = self.records.get(&locale) {
                if record.contains(name) {
                    return Ok(record.value(name).map(str::to_string));
                }
            }

            let next = self.fallback.resolve(&locale);
            debug!("Attribute '{}' not in '{}', falling back to '{}'", name, locale, next);
            locale = next;
        }
    }

    /// Write `name` into the current locale's record, creating the record
    /// on first write to that locale. `None` sets an explicit null, which
    /// still answers reads.
    pub fn set<'a>(&mut self, name: &str, value: impl Into<Option<&'a str>>) -> Result<()> {
        let locale = self.locale.clone();
        self.set_in(&locale, name, value.into())
    }

    /// Write `name` for several locales at once, leaving the cursor alone.
    ///
    /// # Example
    /// ```
    /// use translatable::{MemoryStore, Translations};
    ///
    /// let mut post = Translations::for_owner(MemoryStore::new(), 1);
    /// post.set_many("title", [("en", Some("Example 1")), ("ru", Some("пример 1"))])?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn set_many<'a, I, L>(&mut self, name: &str, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (L, Option<&'a str>)>,
        L: Into<Locale>,
    {
        for (locale, value) in values {
            let locale = locale.into();
            self.set_in(&locale, name, value)?;
        }
        Ok(())
    }

    fn set_in(&mut self, locale: &Locale, name: &str, value: Option<&str>) -> Result<()> {
        // Pull in any stored record first so its other attributes stay
        // visible and a later save cannot split the record's state.
        self.ensure_fetched(locale)?;
        let record = self
            .records
            .entry(locale.clone())
            .or_insert_with(|| TranslationRecord::new(locale.clone()));
        record.set(name, value);
        Ok(())
    }

    // ==================== Loading and persistence ====================

    /// The already-loaded record for `locale`, if any. Never touches the
    /// store; combine with [`load_translations`](Self::load_translations)
    /// for eager access.
    pub fn translation(&self, locale: impl Into<Locale>) -> Option<&TranslationRecord> {
        self.records.get(&locale.into())
    }

    /// Eagerly load the records for `locales` in one storage round trip.
    ///
    /// Locales already in memory are skipped, so unsaved changes are never
    /// clobbered. A detached resolver has nothing stored and loads nothing.
    pub fn load_translations<I, L>(&mut self, locales: I) -> Result<()>
    where
        I: IntoIterator<Item = L>,
        L: Into<Locale>,
    {
        let Some(owner_id) = self.owner_id else {
            return Ok(());
        };

        let missing: Vec<Locale> = locales
            .into_iter()
            .map(Into::into)
            .filter(|locale| !self.records.contains_key(locale) && !self.fetched.contains(locale))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }

        let loaded = self
            .store
            .load_records(owner_id, &missing)
            .context("Failed to load translation records")?;
        for locale in missing {
            self.fetched.insert(locale);
        }
        for (locale, record) in loaded {
            self.records.insert(locale, record);
        }
        Ok(())
    }

    /// Persist every record with unsaved changes and mark them clean.
    ///
    /// The owner must have been saved first: a detached resolver keeps its
    /// records in memory and fails here until [`attach`](Self::attach).
    pub fn save(&mut self) -> Result<()> {
        let Some(owner_id) = self.owner_id else {
            bail!("cannot save translations before the owner itself is saved");
        };

        for record in self.records.values_mut() {
            if record.is_dirty() {
                self.store
                    .save_record(owner_id, record)
                    .with_context(|| {
                        format!(
                            "Failed to save translation record for locale {}",
                            record.locale()
                        )
                    })?;
                record.mark_clean();
            }
        }
        Ok(())
    }

    /// Drop every stored record of this owner (cascade on owner deletion)
    /// and clear the in-memory state.
    pub fn delete(&mut self) -> Result<()> {
        if let Some(owner_id) = self.owner_id {
            self.store
                .delete_records(owner_id)
                .context("Failed to delete translation records")?;
        }
        self.records.clear();
        self.fetched.clear();
        Ok(())
    }

    fn ensure_fetched(&mut self, locale: &Locale) -> Result<()> {
        if self.records.contains_key(locale) || self.fetched.contains(locale) {
            return Ok(());
        }

        if let Some(owner_id) = self.owner_id {
            let record = self
                .store
                .load_record(owner_id, locale)
                .with_context(|| {
                    format!("Failed to load translation record for locale {}", locale)
                })?;
            if let Some(record) = record {
                self.records.insert(locale.clone(), record);
            }
        }
        self.fetched.insert(locale.clone());
        Ok(())
    }
}
