//! Fallback configuration: which locale answers when the requested one
//! has no value.
//!
//! A configuration is either a single target locale applied to every request
//! or an ordered per-locale mapping. Resolution is one step at a time; the
//! chain walk (with loop detection) lives in [`crate::translations`].

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::locale::Locale;

/// Fallback configuration for translated attributes.
///
/// The per-locale variant keeps its entries in insertion order: the first
/// entry's target doubles as the catch-all for language-only tags that have
/// no entry of their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback {
    /// One target locale for every request.
    Single(Locale),
    /// Ordered mapping from requested locale to fallback locale.
    PerLocale(Vec<(Locale, Locale)>),
}

impl Default for Fallback {
    /// The global default: fall back to [`crate::DEFAULT_LOCALE`].
    fn default() -> Self {
        Fallback::Single(Locale::default())
    }
}

impl Fallback {
    /// Configuration with a single target locale.
    pub fn single(target: impl Into<Locale>) -> Self {
        Fallback::Single(target.into())
    }

    /// Configuration with an ordered per-locale mapping.
    ///
    /// # Example
    /// ```
    /// use translatable::Fallback;
    ///
    /// let fallback = Fallback::per_locale([("de", "en"), ("uk", "ru")]);
    /// assert_eq!(fallback.resolve(&"uk".into()).as_str(), "ru");
    /// ```
    pub fn per_locale<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Locale>,
        V: Into<Locale>,
    {
        Fallback::PerLocale(
            entries
                .into_iter()
                .map(|(from, to)| (from.into(), to.into()))
                .collect(),
        )
    }

    /// Resolve the single fallback step for `locale`, without walking the
    /// full chain.
    ///
    /// Precedence:
    /// 1. An exact mapping entry for the full tag.
    /// 2. A region tag drops to its language-only parent.
    /// 3. An unmapped language-only tag takes the mapping's first target
    ///    (or the configured single target).
    pub fn resolve(&self, locale: &Locale) -> Locale {
        if let Fallback::PerLocale(entries) = self {
            // Small configs; linear scan keeps insertion order meaningful.
            if let Some((_, target)) = entries.iter().find(|(from, _)| from == locale) {
                return target.clone();
            }
        }

        if let Some(parent) = locale.parent() {
            return parent;
        }

        match self {
            Fallback::Single(target) => target.clone(),
            Fallback::PerLocale(entries) => entries
                .first()
                .map(|(_, target)| target.clone())
                .unwrap_or_default(),
        }
    }
}

impl Serialize for Fallback {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Fallback::Single(target) => serializer.serialize_str(target.as_str()),
            Fallback::PerLocale(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (from, to) in entries {
                    map.serialize_entry(from.as_str(), to.as_str())?;
                }
                map.end()
            }
        }
    }
}

struct FallbackVisitor;

impl<'de> Visitor<'de> for FallbackVisitor {
    type Value = Fallback;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a locale string or a map of locale to locale")
    }

    fn visit_str<E>(self, value: &str) -> Result<Fallback, E>
    where
        E: de::Error,
    {
        Locale::new(value)
            .map(Fallback::Single)
            .map_err(de::Error::custom)
    }

    fn visit_map<A>(self, mut access: A) -> Result<Fallback, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((from, to)) = access.next_entry::<Locale, Locale>()? {
            entries.push((from, to));
        }
        Ok(Fallback::PerLocale(entries))
    }
}

impl<'de> Deserialize<'de> for Fallback {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(FallbackVisitor)
    }
}
