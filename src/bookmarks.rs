//! Bookmark list persisted under the `newsBookmarks` key.
//!
//! The list is loaded once and kept in memory, most recent first. Every
//! mutation writes the whole list back immediately. When the list grows past
//! its limit the oldest entries are evicted.

use crate::models::{Article, Bookmark};
use crate::store::{KeyValueStore, StoreError};
use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

/// Key holding the serialized bookmark list.
pub const BOOKMARKS_KEY: &str = "newsBookmarks";

/// Default cap on stored bookmarks.
pub const DEFAULT_BOOKMARK_LIMIT: usize = 100;

/// In-memory bookmark list synchronized with a [`KeyValueStore`].
#[derive(Debug)]
pub struct BookmarkStore<K> {
    store: K,
    entries: Vec<Bookmark>,
    limit: usize,
}

impl<K: KeyValueStore> BookmarkStore<K> {
    /// Load the persisted list.
    ///
    /// A stored value that does not parse is discarded with a warning and the
    /// store starts empty; read failures are returned.
    pub fn load(store: K, limit: usize) -> Result<Self, StoreError> {
        let limit = limit.max(1);
        let mut entries = match store.get(BOOKMARKS_KEY)? {
            Some(raw) => serde_json::from_str::<Vec<Bookmark>>(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Stored bookmarks are unreadable; starting with an empty list");
                Vec::new()
            }),
            None => Vec::new(),
        };
        entries.truncate(limit);
        info!(count = entries.len(), limit, "Loaded bookmarks");
        Ok(Self {
            store,
            entries,
            limit,
        })
    }

    /// An empty list over `store`, for when the persisted one cannot be read.
    /// The next mutation overwrites whatever is stored.
    pub fn empty(store: K, limit: usize) -> Self {
        Self {
            store,
            entries: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Bookmarks, most recent first.
    pub fn entries(&self) -> &[Bookmark] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_bookmarked(&self, id: &str) -> bool {
        self.entries.iter().any(|b| b.id == id)
    }

    /// Add `article` if absent, remove it if present. Returns whether it is
    /// bookmarked afterwards.
    ///
    /// # Errors
    ///
    /// If persisting fails the in-memory change is kept and the error is
    /// returned so the caller can warn the user.
    pub fn toggle(&mut self, article: &Article) -> Result<bool, StoreError> {
        self.toggle_at(article, Utc::now())
    }

    /// [`toggle`](Self::toggle) with an explicit bookmark timestamp.
    #[instrument(level = "info", skip_all, fields(url = %article.url))]
    pub fn toggle_at(
        &mut self,
        article: &Article,
        bookmarked_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let id = article.bookmark_id();
        let bookmarked = if let Some(pos) = self.entries.iter().position(|b| b.id == id) {
            self.entries.remove(pos);
            false
        } else {
            self.entries
                .insert(0, Bookmark::from_article(article, bookmarked_at));
            if self.entries.len() > self.limit {
                let evicted = self.entries.len() - self.limit;
                self.entries.truncate(self.limit);
                info!(evicted, "Evicted oldest bookmarks");
            }
            true
        };
        info!(%id, bookmarked, count = self.entries.len(), "Toggled bookmark");
        self.persist()?;
        Ok(bookmarked)
    }

    /// Remove the bookmark with `id`. Does nothing (and writes nothing) when
    /// absent.
    pub fn remove(&mut self, id: &str) -> Result<(), StoreError> {
        let before = self.entries.len();
        self.entries.retain(|b| b.id != id);
        if self.entries.len() == before {
            return Ok(());
        }
        info!(%id, count = self.entries.len(), "Removed bookmark");
        self.persist()
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let raw = serde_json::to_string(&self.entries)?;
        self.store.set(BOOKMARKS_KEY, raw).map_err(|e| {
            warn!(error = %e, "Failed to persist bookmarks");
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn article(n: usize) -> Article {
        Article {
            title: format!("Article {n}"),
            url: format!("https://news.example.com/{n}"),
            date: "2025-12-16".to_string(),
            category: "politics".to_string(),
            source: "donga".to_string(),
            ..Article::default()
        }
    }

    fn stored(store: &MemoryStore) -> Vec<Bookmark> {
        let raw = store.get(BOOKMARKS_KEY).unwrap().unwrap_or_else(|| "[]".to_string());
        serde_json::from_str(&raw).unwrap()
    }

    /// Accepts reads, fails every write.
    #[derive(Debug, Default)]
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: String) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    #[test]
    fn test_toggle_twice_restores_membership() {
        let kv = MemoryStore::new();
        let mut bookmarks = BookmarkStore::load(kv.clone(), DEFAULT_BOOKMARK_LIMIT).unwrap();
        let a = article(1);

        assert!(bookmarks.toggle(&a).unwrap());
        assert!(bookmarks.is_bookmarked(&a.bookmark_id()));
        assert_eq!(stored(&kv).len(), 1);

        assert!(!bookmarks.toggle(&a).unwrap());
        assert!(!bookmarks.is_bookmarked(&a.bookmark_id()));
        assert!(bookmarks.is_empty());
        assert!(stored(&kv).is_empty());
    }

    #[test]
    fn test_most_recent_first() {
        let kv = MemoryStore::new();
        let mut bookmarks = BookmarkStore::load(kv.clone(), DEFAULT_BOOKMARK_LIMIT).unwrap();
        let t0 = Utc::now();
        for n in 0..3 {
            bookmarks
                .toggle_at(&article(n), t0 + Duration::seconds(n as i64))
                .unwrap();
        }

        let titles: Vec<_> = bookmarks.entries().iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Article 2", "Article 1", "Article 0"]);
        assert_eq!(stored(&kv), bookmarks.entries().to_vec());
    }

    #[test]
    fn test_limit_evicts_first_inserted() {
        let kv = MemoryStore::new();
        let mut bookmarks = BookmarkStore::load(kv.clone(), DEFAULT_BOOKMARK_LIMIT).unwrap();
        for n in 0..DEFAULT_BOOKMARK_LIMIT {
            bookmarks.toggle(&article(n)).unwrap();
        }
        assert_eq!(bookmarks.len(), 100);
        assert!(bookmarks.is_bookmarked(&article(0).bookmark_id()));

        bookmarks.toggle(&article(100)).unwrap();
        assert_eq!(bookmarks.len(), 100);
        assert!(!bookmarks.is_bookmarked(&article(0).bookmark_id()));
        assert!(bookmarks.is_bookmarked(&article(1).bookmark_id()));
        assert_eq!(bookmarks.entries()[0].id, article(100).bookmark_id());

        for n in 101..250 {
            bookmarks.toggle(&article(n)).unwrap();
            assert!(bookmarks.len() <= 100);
        }
        assert_eq!(stored(&kv).len(), 100);
    }

    #[test]
    fn test_remove_present_and_absent() {
        let kv = MemoryStore::new();
        let mut bookmarks = BookmarkStore::load(kv.clone(), DEFAULT_BOOKMARK_LIMIT).unwrap();
        bookmarks.toggle(&article(1)).unwrap();
        bookmarks.toggle(&article(2)).unwrap();

        bookmarks.remove(&article(1).bookmark_id()).unwrap();
        assert_eq!(bookmarks.len(), 1);
        assert_eq!(stored(&kv).len(), 1);

        bookmarks.remove("0000000000000000").unwrap();
        assert_eq!(bookmarks.len(), 1);
    }

    #[test]
    fn test_load_restores_persisted_list() {
        let kv = MemoryStore::new();
        {
            let mut bookmarks = BookmarkStore::load(kv.clone(), DEFAULT_BOOKMARK_LIMIT).unwrap();
            bookmarks.toggle(&article(7)).unwrap();
        }
        let reloaded = BookmarkStore::load(kv, DEFAULT_BOOKMARK_LIMIT).unwrap();
        assert!(reloaded.is_bookmarked(&article(7).bookmark_id()));
    }

    #[test]
    fn test_load_discards_unreadable_list() {
        let mut kv = MemoryStore::new();
        kv.set(BOOKMARKS_KEY, "not a list".to_string()).unwrap();
        let bookmarks = BookmarkStore::load(kv, DEFAULT_BOOKMARK_LIMIT).unwrap();
        assert!(bookmarks.is_empty());
    }

    #[test]
    fn test_persist_failure_is_reported_but_state_kept() {
        let mut bookmarks = BookmarkStore::load(ReadOnlyStore, DEFAULT_BOOKMARK_LIMIT).unwrap();
        let a = article(3);

        assert!(matches!(bookmarks.toggle(&a), Err(StoreError::Io(_))));
        assert!(bookmarks.is_bookmarked(&a.bookmark_id()));
    }
}
