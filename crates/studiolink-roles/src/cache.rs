//! Metadata access and the per-entry role cache.

use std::collections::HashMap;

use studiolink_protocol::SessionId;

use crate::{RoleError, SessionMeta};

/// Reads session metadata from wherever this deployment keeps it.
///
/// `Send + Sync + 'static` because the source is shared across the
/// coordinator's tasks for the lifetime of the server.
pub trait MetadataSource: Send + Sync + 'static {
    /// Fetches the metadata record for a session.
    ///
    /// Returns `Ok(None)` for a session the store has never heard of.
    ///
    /// # Errors
    /// Returns [`RoleError::Unavailable`] when the store can't be
    /// reached or returns an unreadable record.
    fn fetch(
        &self,
        session_id: &SessionId,
    ) -> impl std::future::Future<Output = Result<Option<SessionMeta>, RoleError>> + Send;
}

/// A read-through cache of session metadata.
///
/// Metadata is fetched at most once per cache entry and kept until
/// [`invalidate`](RoleCache::invalidate) drops it. The intended usage is
/// one fetch when a user enters a session and an invalidate when the
/// session ends; role changes made while a session is populated are NOT
/// observed until the entry is invalidated. That staleness window is a
/// known property of the design, not an accident.
pub struct RoleCache<S> {
    source: S,
    entries: HashMap<SessionId, Option<SessionMeta>>,
}

impl<S: MetadataSource> RoleCache<S> {
    /// Creates an empty cache over the given source.
    pub fn new(source: S) -> Self {
        Self {
            source,
            entries: HashMap::new(),
        }
    }

    /// Returns the metadata for a session, fetching on first access.
    ///
    /// `None` means the store has no record for this session; that
    /// answer is cached too, so a session created after the first miss
    /// is not seen until invalidation.
    ///
    /// # Errors
    /// Propagates [`RoleError::Unavailable`] from the source. Fetch
    /// failures are not cached; the next call retries.
    pub async fn get(
        &mut self,
        session_id: &SessionId,
    ) -> Result<Option<&SessionMeta>, RoleError> {
        if !self.entries.contains_key(session_id) {
            let meta = self.source.fetch(session_id).await?;
            tracing::debug!(
                session_id = %session_id,
                found = meta.is_some(),
                "session metadata fetched"
            );
            self.entries.insert(session_id.clone(), meta);
        }
        // Entry guaranteed present by the insert above.
        Ok(self
            .entries
            .get(session_id)
            .and_then(|meta| meta.as_ref()))
    }

    /// Drops the cached entry for a session. The next [`get`](Self::get)
    /// fetches fresh metadata.
    pub fn invalidate(&mut self, session_id: &SessionId) {
        self.entries.remove(session_id);
    }

    /// Number of cached entries, hits and misses both.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Role, SessionSettings, SessionStatus};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use studiolink_protocol::UserId;

    fn meta(id: &str, created_by: &str) -> SessionMeta {
        SessionMeta {
            id: SessionId::from(id),
            name: format!("session {id}"),
            created_by: UserId::from(created_by),
            status: SessionStatus::Active,
            settings: SessionSettings::default(),
            roles: HashMap::new(),
        }
    }

    /// Source backed by a mutable map, counting fetches.
    #[derive(Clone, Default)]
    struct MapSource {
        records: Arc<Mutex<HashMap<SessionId, SessionMeta>>>,
        fetches: Arc<AtomicUsize>,
    }

    impl MapSource {
        fn insert(&self, m: SessionMeta) {
            self.records.lock().unwrap().insert(m.id.clone(), m);
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    impl MetadataSource for MapSource {
        async fn fetch(
            &self,
            session_id: &SessionId,
        ) -> Result<Option<SessionMeta>, RoleError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.records.lock().unwrap().get(session_id).cloned())
        }
    }

    /// Source that always fails.
    struct DownSource;

    impl MetadataSource for DownSource {
        async fn fetch(
            &self,
            _session_id: &SessionId,
        ) -> Result<Option<SessionMeta>, RoleError> {
            Err(RoleError::Unavailable("store is down".into()))
        }
    }

    #[tokio::test]
    async fn test_get_fetches_once_per_entry() {
        let source = MapSource::default();
        source.insert(meta("s1", "u1"));
        let mut cache = RoleCache::new(source.clone());

        for _ in 0..3 {
            let m = cache.get(&SessionId::from("s1")).await.unwrap();
            assert!(m.is_some());
        }
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_get_caches_negative_answers() {
        let source = MapSource::default();
        let mut cache = RoleCache::new(source.clone());

        assert!(cache.get(&SessionId::from("s1")).await.unwrap().is_none());
        assert!(cache.get(&SessionId::from("s1")).await.unwrap().is_none());
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_get_serves_stale_roles_until_invalidated() {
        // The staleness window: a role change in the store is invisible
        // while the entry is cached.
        let source = MapSource::default();
        source.insert(meta("s1", "u1"));
        let mut cache = RoleCache::new(source.clone());

        let first = cache
            .get(&SessionId::from("s1"))
            .await
            .unwrap()
            .cloned()
            .unwrap();
        assert_eq!(first.role_of(&UserId::from("u2")), None);

        // u2 is granted editor in the store...
        let mut updated = meta("s1", "u1");
        updated.roles.insert(UserId::from("u2"), Role::Editor);
        source.insert(updated);

        // ...but the cache still answers with the old record.
        let stale = cache
            .get(&SessionId::from("s1"))
            .await
            .unwrap()
            .cloned()
            .unwrap();
        assert_eq!(stale.role_of(&UserId::from("u2")), None);

        // Invalidation makes the change visible.
        cache.invalidate(&SessionId::from("s1"));
        let fresh = cache
            .get(&SessionId::from("s1"))
            .await
            .unwrap()
            .cloned()
            .unwrap();
        assert_eq!(
            fresh.role_of(&UserId::from("u2")),
            Some(Role::Editor)
        );
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_get_does_not_cache_failures() {
        let mut cache = RoleCache::new(DownSource);

        assert!(cache.get(&SessionId::from("s1")).await.is_err());
        // The failed fetch left nothing behind; the next call retries.
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_unknown_session_is_noop() {
        let mut cache = RoleCache::new(MapSource::default());
        cache.invalidate(&SessionId::from("never-seen"));
        assert!(cache.is_empty());
    }
}
