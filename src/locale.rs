//! Locale tags and region-to-language normalization.
//!
//! A locale is a free-form language/region tag such as `"en"` or `"de-AT"`.
//! Region-specific tags normalize to their language-only parent by truncating
//! at the first `-`, which is the first step of fallback resolution.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Error, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// The locale used when no fallback configuration is set.
pub const DEFAULT_LOCALE: &str = "en-US";

/// A language/region tag (e.g. `"en"`, `"de-AT"`).
///
/// Construction via [`From`] accepts any trimmed tag; [`Locale::new`] and
/// [`FromStr`] additionally reject empty tags, which is what configuration
/// loading goes through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
    /// Create a validated locale from a tag string.
    ///
    /// # Returns
    /// * `Ok(Locale)` for any non-empty tag (surrounding whitespace trimmed)
    /// * `Err` for an empty or whitespace-only tag
    pub fn new(tag: &str) -> Result<Locale> {
        let tag = tag.trim();
        if tag.is_empty() {
            bail!("locale tag must not be empty");
        }
        Ok(Locale(tag.to_string()))
    }

    /// Get the tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Language-only parent of a region-specific tag.
    ///
    /// # Returns
    /// * `Some(parent)` when the tag has a region part (`"de-AT"` → `"de"`)
    /// * `None` for a language-only tag (`"de"`)
    pub fn parent(&self) -> Option<Locale> {
        self.0
            .split_once('-')
            .map(|(language, _)| Locale(language.to_string()))
    }

    /// The language part of the tag (`"de-AT"` → `"de"`, `"de"` → `"de"`).
    pub fn language(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }
}

impl Default for Locale {
    /// The global default locale, [`DEFAULT_LOCALE`].
    fn default() -> Self {
        Locale(DEFAULT_LOCALE.to_string())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Locale {
    fn from(tag: &str) -> Self {
        Locale(tag.trim().to_string())
    }
}

impl From<String> for Locale {
    fn from(tag: String) -> Self {
        Locale::from(tag.as_str())
    }
}

impl From<&Locale> for Locale {
    fn from(locale: &Locale) -> Self {
        locale.clone()
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self> {
        Locale::new(tag)
    }
}

impl AsRef<str> for Locale {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Locale {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Locale {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Locale {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl<'de> Deserialize<'de> for Locale {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Locale::new(&raw).map_err(serde::de::Error::custom)
    }
}
