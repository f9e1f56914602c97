//! Per-record translation storage with chained locale fallback.
//!
//! An owning entity (a post, a product, anything with an id) keeps its
//! translatable attributes in one [`TranslationRecord`] per locale. A
//! [`Translations`] resolver decides, for every attribute read, which
//! record answers: the current locale's record wins when it has the
//! attribute set, otherwise a fallback chain is walked — region tags drop
//! to their language-only parent ("de-AT" → "de"), then the configured
//! [`Fallback`] applies, with loop detection so a cyclic configuration
//! resolves to null instead of spinning. Writes always go to the current
//! locale's record, created on first use.
//!
//! # Module Structure
//!
//! - `locale`: locale tags and region-to-language normalization
//! - `fallback`: fallback configuration and single-step resolution
//! - `record`: per-locale attribute bundles with dirty tracking
//! - `store`: storage collaborator contract and an in-memory store
//! - `db`: SQLite-backed store
//! - `translations`: the resolver tying cursor, records, and fallback together
//!
//! # Example
//!
//! ```
//! use translatable::{MemoryStore, Translations};
//!
//! let mut post = Translations::for_owner(MemoryStore::new(), 1);
//! post.set_locale("en");
//! post.set("title", "Example")?;
//! post.set_locale("de");
//! post.set("title", "Beispiel")?;
//! post.save()?;
//!
//! // Region tag with no record of its own: "de-AT" reads "de".
//! post.set_locale("de-AT");
//! assert_eq!(post.get("title")?.as_deref(), Some("Beispiel"));
//!
//! // No fallback configured: "ru" reads the global default chain.
//! post.set_locale("ru");
//! assert_eq!(post.get("title")?.as_deref(), Some("Example"));
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod db;
pub mod fallback;
pub mod locale;
pub mod record;
pub mod store;
pub mod translations;

pub use db::SqliteStore;
pub use fallback::Fallback;
pub use locale::{Locale, DEFAULT_LOCALE};
pub use record::TranslationRecord;
pub use store::{MemoryStore, TranslationStore};
pub use translations::Translations;
