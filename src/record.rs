//! Per-locale attribute bundles.

use std::collections::{HashMap, HashSet};

use crate::locale::Locale;

/// The attribute values one owner has stored in one locale.
///
/// An attribute is either absent (never set) or present, possibly with an
/// explicit null value. The distinction matters for resolution: a present
/// attribute answers a read even when its value is null, short-circuiting
/// the fallback chain.
///
/// Attribute writes mark the record dirty until the owner persists it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRecord {
    locale: Locale,
    values: HashMap<String, Option<String>>,
    /// Attribute names with unsaved changes.
    dirty: HashSet<String>,
}

impl TranslationRecord {
    /// A fresh, empty record for `locale`.
    pub fn new(locale: impl Into<Locale>) -> Self {
        Self {
            locale: locale.into(),
            values: HashMap::new(),
            dirty: HashSet::new(),
        }
    }

    /// A record rebuilt from stored values. Starts clean.
    pub fn with_values(
        locale: impl Into<Locale>,
        values: HashMap<String, Option<String>>,
    ) -> Self {
        Self {
            locale: locale.into(),
            values,
            dirty: HashSet::new(),
        }
    }

    /// The locale this record belongs to.
    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Whether `name` has been set in this record, explicit null included.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// The value of `name`, flattened: absent and explicitly null both
    /// read as `None`. Use [`contains`](Self::contains) to tell them apart.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(|value| value.as_deref())
    }

    /// Set `name` to a value or to explicit null, marking it dirty.
    pub fn set<'a>(&mut self, name: &str, value: impl Into<Option<&'a str>>) {
        self.values
            .insert(name.to_string(), value.into().map(str::to_string));
        self.dirty.insert(name.to_string());
    }

    /// Whether the record has attribute changes not yet persisted.
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty.clear();
    }

    /// All stored attribute values.
    pub fn values(&self) -> &HashMap<String, Option<String>> {
        &self.values
    }

    /// Whether the record holds no attributes at all.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Value Access Tests ====================

    #[test]
    fn test_new_record_is_empty_and_clean() {
        let record = TranslationRecord::new("en");
        assert!(record.is_empty());
        assert!(!record.is_dirty());
        assert!(!record.contains("title"));
        assert_eq!(record.value("title"), None);
    }

    #[test]
    fn test_set_and_read_value() {
        let mut record = TranslationRecord::new("de");
        record.set("title", "Beispiel");
        assert!(record.contains("title"));
        assert_eq!(record.value("title"), Some("Beispiel"));
        assert_eq!(record.locale(), &crate::Locale::from("de"));
    }

    #[test]
    fn test_explicit_null_is_present_but_reads_none() {
        let mut record = TranslationRecord::new("de");
        record.set("title", None);
        assert!(record.contains("title"));
        assert_eq!(record.value("title"), None);
    }

    #[test]
    fn test_overwrite_value() {
        let mut record = TranslationRecord::new("en");
        record.set("title", "January");
        record.set("title", "February");
        assert_eq!(record.value("title"), Some("February"));
    }

    // ==================== Dirty Tracking Tests ====================

    #[test]
    fn test_set_marks_dirty() {
        let mut record = TranslationRecord::new("en");
        record.set("title", "Example");
        assert!(record.is_dirty());
    }

    #[test]
    fn test_mark_clean_clears_dirty() {
        let mut record = TranslationRecord::new("en");
        record.set("title", "Example");
        record.mark_clean();
        assert!(!record.is_dirty());
        // Values survive the flush.
        assert_eq!(record.value("title"), Some("Example"));
    }

    #[test]
    fn test_with_values_starts_clean() {
        let mut values = HashMap::new();
        values.insert("title".to_string(), Some("Example".to_string()));
        values.insert("subtitle".to_string(), None);

        let record = TranslationRecord::with_values("en", values);
        assert!(!record.is_dirty());
        assert_eq!(record.value("title"), Some("Example"));
        assert!(record.contains("subtitle"));
        assert_eq!(record.value("subtitle"), None);
    }
}
