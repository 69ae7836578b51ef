//! Guest-scoped favorites: a locally persisted list of listing ids kept in
//! step with the listings that still exist remotely.
//!
//! Two lists are tracked. `saved` is what the store holds; `valid` is the
//! subset confirmed to exist by the last successful reconciliation. Lookups
//! and counts use `valid`. When the existence check fails, `valid` falls back
//! to the unreconciled `saved` list for the rest of the session.

use std::future::Future;
use std::sync::Mutex;

use anyhow::Result;
use tracing::{debug, info, warn};

/// Persistence for the favorite id list.
pub trait FavoriteStore {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<Vec<String>>>;
    fn save(&self, ids: &[String]) -> Result<()>;
}

/// Remote existence check: returns which of `ids` still have a listing.
pub trait ListingDirectory {
    fn existing_ids(&self, ids: &[String]) -> impl Future<Output = Result<Vec<String>>> + Send;
}

/// Process-local store, handy for tests and headless use.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ids: Mutex<Option<Vec<String>>>,
}

impl MemoryStore {
    pub fn with_ids(ids: &[&str]) -> Self {
        Self {
            ids: Mutex::new(Some(ids.iter().map(|id| id.to_string()).collect())),
        }
    }
}

impl FavoriteStore for MemoryStore {
    fn load(&self) -> Result<Option<Vec<String>>> {
        let ids = self.ids.lock().map_err(|e| anyhow::anyhow!("store lock poisoned: {}", e))?;
        Ok(ids.clone())
    }

    fn save(&self, ids: &[String]) -> Result<()> {
        let mut slot = self.ids.lock().map_err(|e| anyhow::anyhow!("store lock poisoned: {}", e))?;
        *slot = Some(ids.to_vec());
        Ok(())
    }
}

pub struct Favorites<S, D> {
    store: S,
    directory: D,
    saved: Vec<String>,
    valid: Vec<String>,
    loading: bool,
}

impl<S: FavoriteStore, D: ListingDirectory> Favorites<S, D> {
    pub fn new(store: S, directory: D) -> Self {
        Self {
            store,
            directory,
            saved: Vec::new(),
            valid: Vec::new(),
            loading: true,
        }
    }

    /// Reads the stored list and reconciles it. An unreadable store is
    /// treated as empty.
    pub async fn load(&mut self) -> &[String] {
        match self.store.load() {
            Ok(Some(ids)) => {
                self.saved = normalize(ids);
                debug!("Favorites loaded: {:?}", self.saved);
                let ids = self.saved.clone();
                self.reconcile_ids(ids).await;
            }
            Ok(None) => {
                self.saved.clear();
                self.valid.clear();
            }
            Err(e) => {
                warn!("Failed to load favorites: {}", e);
                self.saved.clear();
                self.valid.clear();
            }
        }
        self.loading = false;
        &self.valid
    }

    /// Re-runs reconciliation over the stored list, e.g. after a listing
    /// was deleted.
    pub async fn refresh(&mut self) -> &[String] {
        let ids = self.saved.clone();
        self.reconcile_ids(ids).await;
        &self.valid
    }

    /// Returns true if the id was newly added.
    pub async fn add(&mut self, listing_id: &str) -> bool {
        let id = listing_id.to_string();
        if self.saved.contains(&id) {
            return false;
        }
        let mut next = self.saved.clone();
        next.push(id);
        self.save(next).await;
        true
    }

    pub async fn remove(&mut self, listing_id: &str) -> bool {
        let next = self.saved.iter().filter(|id| *id != listing_id).cloned().collect();
        self.save(next).await;
        true
    }

    /// Returns true if the listing is now a favorite, false if it was removed.
    pub async fn toggle(&mut self, listing_id: &str) -> bool {
        if self.saved.iter().any(|id| id == listing_id) {
            self.remove(listing_id).await;
            false
        } else {
            self.add(listing_id).await;
            true
        }
    }

    pub fn is_favorite(&self, listing_id: &str) -> bool {
        self.valid.iter().any(|id| id == listing_id)
    }

    pub fn count(&self) -> usize {
        self.valid.len()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn saved(&self) -> &[String] {
        &self.saved
    }

    pub fn valid(&self) -> &[String] {
        &self.valid
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    async fn save(&mut self, ids: Vec<String>) {
        if let Err(e) = self.store.save(&ids) {
            warn!("Failed to save favorites: {}", e);
            return;
        }
        self.saved = ids.clone();
        self.reconcile_ids(ids).await;
    }

    async fn reconcile_ids(&mut self, ids: Vec<String>) {
        if ids.is_empty() {
            self.valid.clear();
            return;
        }

        let existing = match self.directory.existing_ids(&ids).await {
            Ok(existing) => existing,
            Err(e) => {
                warn!("Favorites existence check failed, keeping local list: {}", e);
                self.valid = ids;
                return;
            }
        };

        let kept: Vec<String> = ids.iter().filter(|id| existing.contains(id)).cloned().collect();

        if kept.len() < ids.len() {
            let dropped: Vec<&String> = ids.iter().filter(|id| !kept.contains(id)).collect();
            info!("Removing {} stale favorites: {:?}", dropped.len(), dropped);
            match self.store.save(&kept) {
                Ok(()) => self.saved = kept.clone(),
                Err(e) => warn!("Failed to persist reconciled favorites: {}", e),
            }
        }

        self.valid = kept;
    }
}

/// Trims and de-duplicates ids, keeping first occurrences.
fn normalize(ids: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        let id = id.trim().to_string();
        if !id.is_empty() && !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeDirectory {
        existing: Mutex<HashSet<String>>,
        failing: bool,
        calls: AtomicUsize,
    }

    impl FakeDirectory {
        fn with(ids: &[&str]) -> Self {
            Self {
                existing: Mutex::new(ids.iter().map(|s| s.to_string()).collect()),
                ..Default::default()
            }
        }

        fn failing() -> Self {
            Self {
                failing: true,
                ..Default::default()
            }
        }

        fn delete(&self, id: &str) {
            self.existing.lock().unwrap().remove(id);
        }
    }

    impl ListingDirectory for FakeDirectory {
        async fn existing_ids(&self, ids: &[String]) -> Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing {
                anyhow::bail!("backend unreachable");
            }
            let existing = self.existing.lock().unwrap();
            Ok(ids.iter().filter(|id| existing.contains(*id)).cloned().collect())
        }
    }

    fn stored(favs: &Favorites<MemoryStore, FakeDirectory>) -> Option<Vec<String>> {
        favs.store().load().unwrap()
    }

    #[tokio::test]
    async fn load_reconciles_to_intersection_and_persists() {
        let store = MemoryStore::with_ids(&["1", "2", "3", "2"]);
        let mut favs = Favorites::new(store, FakeDirectory::with(&["3", "1", "9"]));

        let valid = favs.load().await.to_vec();
        assert_eq!(valid, vec!["1", "3"]);
        assert_eq!(favs.saved(), ["1", "3"]);
        assert_eq!(stored(&favs), Some(vec!["1".to_string(), "3".to_string()]));
        assert!(!favs.is_loading());
        assert_eq!(favs.count(), 2);
    }

    #[tokio::test]
    async fn failed_check_keeps_unreconciled_list() {
        let store = MemoryStore::with_ids(&["1", "2"]);
        let mut favs = Favorites::new(store, FakeDirectory::failing());

        favs.load().await;
        assert_eq!(favs.valid(), ["1", "2"]);
        assert!(favs.is_favorite("2"));
        assert_eq!(stored(&favs), Some(vec!["1".to_string(), "2".to_string()]));
    }

    #[tokio::test]
    async fn empty_store_skips_remote_check() {
        let mut favs = Favorites::new(MemoryStore::default(), FakeDirectory::with(&["1"]));
        favs.load().await;
        assert_eq!(favs.count(), 0);
        assert_eq!(favs.directory().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn toggle_adds_then_removes() {
        let mut favs = Favorites::new(MemoryStore::default(), FakeDirectory::with(&["7"]));
        favs.load().await;

        assert!(favs.toggle("7").await);
        assert!(favs.is_favorite("7"));
        assert_eq!(stored(&favs), Some(vec!["7".to_string()]));

        assert!(!favs.toggle("7").await);
        assert!(!favs.is_favorite("7"));
        assert_eq!(stored(&favs), Some(vec![]));
    }

    #[tokio::test]
    async fn add_is_idempotent() {
        let mut favs = Favorites::new(MemoryStore::default(), FakeDirectory::with(&["7"]));
        favs.load().await;
        assert!(favs.add("7").await);
        assert!(!favs.add("7").await);
        assert_eq!(favs.saved(), ["7"]);
    }

    #[tokio::test]
    async fn adding_a_missing_listing_is_dropped_on_reconcile() {
        let mut favs = Favorites::new(MemoryStore::default(), FakeDirectory::with(&["1"]));
        favs.load().await;

        assert!(favs.add("404").await);
        assert!(!favs.is_favorite("404"));
        assert!(favs.saved().is_empty());
    }

    #[tokio::test]
    async fn refresh_drops_deleted_listings() {
        let store = MemoryStore::with_ids(&["1", "2"]);
        let mut favs = Favorites::new(store, FakeDirectory::with(&["1", "2"]));
        favs.load().await;
        assert_eq!(favs.count(), 2);

        favs.directory().delete("1");
        let valid = favs.refresh().await.to_vec();
        assert_eq!(valid, vec!["2"]);
        assert_eq!(stored(&favs), Some(vec!["2".to_string()]));
    }
}
