//! Client-side cache of the signed-in user's favorited property ids.
//!
//! The server is authoritative. The cache is rebuilt from it whenever a
//! session starts and updated only after a write has been confirmed.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::api::{ApiClientError, ContentApi};
use crate::auth::{AuthSession, AuthState};

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("User not authenticated")]
    NotAuthenticated,
    #[error(transparent)]
    Api(#[from] ApiClientError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Uninitialized,
    Loading,
    Ready,
    Empty,
}

/// A favorites fetch that must run for the cache to leave `Loading`.
#[derive(Debug)]
#[must_use]
pub struct PendingLoad {
    session: AuthSession,
    generation: u64,
}

struct Inner {
    auth: AuthState,
    state: CacheState,
    ids: HashSet<i32>,
    // Bumped on every auth transition; responses from an older one are dropped.
    generation: u64,
}

pub struct FavoritesSync<A> {
    api: Arc<A>,
    inner: Mutex<Inner>,
}

impl<A: ContentApi> FavoritesSync<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            inner: Mutex::new(Inner {
                auth: AuthState::Resolving,
                state: CacheState::Uninitialized,
                ids: HashSet::new(),
                generation: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies an auth transition without touching the network.
    ///
    /// Logging out empties the cache before this returns. Logging in
    /// returns the fetch to run with [`FavoritesSync::load`].
    pub fn set_auth_state(&self, auth: AuthState) -> Option<PendingLoad> {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.ids.clear();
        let pending = match &auth {
            AuthState::Resolving => {
                inner.state = CacheState::Loading;
                None
            }
            AuthState::LoggedOut => {
                inner.state = CacheState::Empty;
                None
            }
            AuthState::LoggedIn(session) => {
                inner.state = CacheState::Loading;
                Some(PendingLoad {
                    session: session.clone(),
                    generation: inner.generation,
                })
            }
        };
        inner.auth = auth;
        pending
    }

    /// Fetches the user's favorites. A failure is logged and leaves the
    /// cache empty; it is never retried.
    pub async fn load(&self, pending: PendingLoad) {
        let result = self.api.list_favorites(&pending.session).await;

        let mut inner = self.lock();
        if inner.generation != pending.generation {
            log::debug!("Discarding favorites of user {} fetched for a previous session", pending.session.user.id);
            return;
        }
        match result {
            Ok(rows) => {
                inner.ids = rows.iter().filter_map(|row| row.property.as_ref().map(|p| p.id)).collect();
                inner.state = CacheState::Ready;
                log::debug!("Loaded {} favorites for user {}", inner.ids.len(), pending.session.user.id);
            }
            Err(err) => {
                log::error!("Error fetching initial favorite ids: {}", err);
                inner.ids.clear();
                inner.state = CacheState::Empty;
            }
        }
    }

    pub async fn on_auth_change(&self, auth: AuthState) {
        if let Some(pending) = self.set_auth_state(auth) {
            self.load(pending).await;
        }
    }

    fn current_session(&self) -> Result<(AuthSession, u64), SyncError> {
        let inner = self.lock();
        inner
            .auth
            .session()
            .map(|session| (session.clone(), inner.generation))
            .ok_or(SyncError::NotAuthenticated)
    }

    /// Creates the favorite, then records it locally.
    pub async fn add_favorite(&self, property_id: i32) -> Result<(), SyncError> {
        let (session, generation) = self.current_session()?;
        self.api.create_favorite(&session, property_id).await?;
        let mut inner = self.lock();
        if inner.generation == generation {
            inner.ids.insert(property_id);
        }
        Ok(())
    }

    /// Deletes the favorite, then drops it locally. On any error the cache
    /// is left as it was.
    pub async fn remove_favorite(&self, property_id: i32) -> Result<(), SyncError> {
        let (session, generation) = self.current_session()?;
        self.api.delete_favorite(&session, property_id).await?;
        let mut inner = self.lock();
        if inner.generation == generation {
            inner.ids.remove(&property_id);
        }
        Ok(())
    }

    /// Returns whether the property is favorited after the toggle.
    pub async fn toggle_favorite(&self, property_id: i32) -> Result<bool, SyncError> {
        if self.is_favorited(property_id) {
            self.remove_favorite(property_id).await?;
            Ok(false)
        } else {
            self.add_favorite(property_id).await?;
            Ok(true)
        }
    }

    /// Membership in the cache. Ids are cleared on every auth transition,
    /// so this is false for every property while loading or logged out.
    pub fn is_favorited(&self, property_id: i32) -> bool {
        self.lock().ids.contains(&property_id)
    }

    pub fn state(&self) -> CacheState {
        self.lock().state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state(), CacheState::Uninitialized | CacheState::Loading)
    }

    /// Sorted ids, for the favorites page query.
    pub fn favorite_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self.lock().ids.iter().copied().collect();
        ids.sort_unstable();
        ids
    }
}
