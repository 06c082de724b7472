//! Session store: the one owner of the identity-provider session.
//!
//! SYSTEM CONTEXT
//! ==============
//! The store wraps a [`SessionBackend`] (the identity provider) and fans
//! session changes out to subscribers. The auth context holds the single
//! long-lived subscription; the API client reads [`SessionStore::current`]
//! at call time so a refreshed token is always the one sent.
//!
//! ERROR HANDLING
//! ==============
//! Provider failures never reach callers of `get_current_session` or
//! `sign_out`: they are logged and the store falls back to "no session".

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use async_trait::async_trait;

use super::types::Session;

/// Seconds before expiry at which a refresh is attempted.
pub const REFRESH_MARGIN_SECS: i64 = 60;
/// Lower bound on the refresh sleep.
pub const MIN_REFRESH_DELAY_SECS: i64 = 5;

/// Identity provider failures.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("identity provider unreachable: {0}")]
    Transport(String),
    #[error("identity provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("sign-in denied: {0}")]
    Denied(String),
    #[error("malformed identity provider payload: {0}")]
    Malformed(String),
    #[error("identity provider not configured")]
    NotConfigured,
    #[error("identity provider not available on server")]
    Unavailable,
}

/// External identity provider operations.
#[async_trait(?Send)]
pub trait SessionBackend: Send + Sync {
    /// Return the existing session (persisted, or completed from an OAuth
    /// redirect), if any.
    async fn restore(&self) -> Result<Option<Session>, SessionError>;

    /// Start the OAuth flow. Completion is observed through a later restore
    /// or publish, never through this call.
    async fn begin_sign_in(&self) -> Result<(), SessionError>;

    /// Exchange the refresh token for a new session.
    async fn refresh(&self, session: &Session) -> Result<Session, SessionError>;

    /// Invalidate the session remotely and drop any local copy.
    async fn revoke(&self, session: Option<&Session>) -> Result<(), SessionError>;

    /// Storage key other tabs write the session under, if the backend
    /// persists sessions.
    fn storage_key(&self) -> Option<String> {
        None
    }
}

type Handler = Arc<dyn Fn(Option<Session>) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: Vec<(u64, Handler)>,
}

/// Last known session plus the number of publishes that produced it.
#[derive(Default)]
struct Cached {
    generation: u64,
    session: Option<Session>,
}

struct StoreInner {
    backend: Box<dyn SessionBackend>,
    current: Mutex<Cached>,
    registry: Arc<Mutex<Registry>>,
}

/// Shared handle to the session store.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

/// Listener registration returned by [`SessionStore::on_session_change`].
///
/// The handler stays registered until this guard is dropped or
/// [`Subscription::unsubscribe`] is called.
#[must_use = "dropping the subscription unregisters the handler"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).handlers.retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SessionStore {
    pub fn new(backend: impl SessionBackend + 'static) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                backend: Box::new(backend),
                current: Mutex::new(Cached::default()),
                registry: Arc::new(Mutex::new(Registry::default())),
            }),
        }
    }

    /// Ask the provider for the existing session.
    ///
    /// Fails soft: provider errors are logged and reported as `None`. A
    /// restore that completes after a publish does not replace the cached
    /// session, since the published one is newer.
    pub async fn get_current_session(&self) -> Option<Session> {
        let started = lock(&self.inner.current).generation;
        match self.inner.backend.restore().await {
            Ok(session) => {
                match &session {
                    Some(s) => leptos::logging::log!("session restored for user {}", s.user.id),
                    None => leptos::logging::log!("no stored session"),
                }
                let mut cached = lock(&self.inner.current);
                if cached.generation == started {
                    cached.session = session.clone();
                } else {
                    leptos::logging::log!("restored session superseded by a provider event");
                }
                session
            }
            Err(e) => {
                leptos::logging::warn!("session restore failed: {e}");
                None
            }
        }
    }

    /// Register `handler` for every subsequent session change.
    pub fn on_session_change(&self, handler: impl Fn(Option<Session>) + Send + Sync + 'static) -> Subscription {
        let mut registry = lock(&self.inner.registry);
        registry.next_id += 1;
        let id = registry.next_id;
        registry.handlers.push((id, Arc::new(handler)));
        leptos::logging::log!("session listener {id} registered ({} active)", registry.handlers.len());
        Subscription { id, registry: Arc::downgrade(&self.inner.registry) }
    }

    /// Start the provider sign-in redirect.
    ///
    /// # Errors
    ///
    /// Returns an error only when the redirect could not be started.
    pub async fn sign_in(&self) -> Result<(), SessionError> {
        self.inner.backend.begin_sign_in().await
    }

    /// Invalidate the session and notify listeners with exactly one `None`.
    pub async fn sign_out(&self) {
        let session = self.current();
        if let Err(e) = self.inner.backend.revoke(session.as_ref()).await {
            leptos::logging::warn!("remote sign-out failed: {e}");
        }
        self.publish(None);
    }

    /// Record a provider-pushed change and deliver it to every listener in
    /// registration order.
    pub fn publish(&self, session: Option<Session>) {
        self.set_current(session.clone());
        let handlers: Vec<Handler> = lock(&self.inner.registry)
            .handlers
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in handlers {
            handler(session.clone());
        }
    }

    /// Last known session.
    pub fn current(&self) -> Option<Session> {
        lock(&self.inner.current).session.clone()
    }

    /// Bearer token of the last known session.
    pub fn access_token(&self) -> Option<String> {
        lock(&self.inner.current).session.as_ref().map(|s| s.access_token.clone())
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.inner.registry).handlers.len()
    }

    /// Refresh the current session once.
    ///
    /// A rejected refresh of a session that has already expired publishes
    /// `None`; otherwise the existing session is kept.
    ///
    /// # Errors
    ///
    /// Returns the provider error when the refresh failed.
    pub async fn refresh_current(&self, now: i64) -> Result<(), SessionError> {
        let Some(session) = self.current() else {
            return Ok(());
        };
        match self.inner.backend.refresh(&session).await {
            Ok(fresh) => {
                self.publish(Some(fresh));
                Ok(())
            }
            Err(e) => {
                if session.expires_within(now, 0) {
                    self.publish(None);
                }
                Err(e)
            }
        }
    }

    /// Apply a raw persisted value written by another tab.
    pub fn apply_storage_value(&self, raw: Option<&str>) {
        let session = raw.and_then(|text| match serde_json::from_str::<Session>(text) {
            Ok(session) => Some(session),
            Err(e) => {
                leptos::logging::warn!("ignoring unreadable stored session: {e}");
                None
            }
        });
        let unchanged = self.current().map(|s| s.access_token) == session.as_ref().map(|s| s.access_token.clone());
        if !unchanged {
            self.publish(session);
        }
    }

    pub fn storage_key(&self) -> Option<String> {
        self.inner.backend.storage_key()
    }

    fn set_current(&self, session: Option<Session>) {
        let mut cached = lock(&self.inner.current);
        cached.generation += 1;
        cached.session = session;
    }

    #[cfg(feature = "hydrate")]
    fn downgrade(&self) -> Weak<StoreInner> {
        Arc::downgrade(&self.inner)
    }
}

/// Time to wait before refreshing a session expiring at `expires_at`.
///
/// `None` when the expiry is unknown.
pub fn refresh_delay(expires_at: Option<i64>, now: i64) -> Option<Duration> {
    let expires_at = expires_at?;
    let secs = (expires_at - REFRESH_MARGIN_SECS - now).max(MIN_REFRESH_DELAY_SECS);
    Some(Duration::from_secs(secs.unsigned_abs()))
}

/// Keep the session fresh and in sync with other tabs.
///
/// The refresh loop ends once every `SessionStore` handle is dropped.
#[cfg(feature = "hydrate")]
pub fn spawn_background_sync(store: &SessionStore) {
    install_storage_listener(store);
    leptos::task::spawn_local(refresh_loop(store.downgrade()));
}

#[cfg(feature = "hydrate")]
async fn refresh_loop(store: Weak<StoreInner>) {
    const IDLE_POLL: Duration = Duration::from_secs(30);

    loop {
        let delay = {
            let Some(inner) = store.upgrade() else {
                return;
            };
            let store = SessionStore { inner };
            let now = crate::util::clock::now_unix();
            store
                .current()
                .and_then(|s| refresh_delay(s.expires_at, now))
                .unwrap_or(IDLE_POLL)
        };
        gloo_timers::future::sleep(delay).await;

        let Some(inner) = store.upgrade() else {
            return;
        };
        let store_handle = SessionStore { inner };
        let now = crate::util::clock::now_unix();
        let due = store_handle
            .current()
            .is_some_and(|s| s.expires_within(now, REFRESH_MARGIN_SECS));
        if due {
            match store_handle.refresh_current(now).await {
                Ok(()) => leptos::logging::log!("session refreshed"),
                Err(e) => leptos::logging::warn!("session refresh failed: {e}"),
            }
        }
    }
}

#[cfg(feature = "hydrate")]
fn install_storage_listener(store: &SessionStore) {
    use wasm_bindgen::JsCast;
    use wasm_bindgen::closure::Closure;

    let Some(key) = store.storage_key() else {
        return;
    };
    let Some(window) = web_sys::window() else {
        return;
    };
    let weak = store.downgrade();
    let callback = Closure::wrap(Box::new(move |event: web_sys::StorageEvent| {
        if event.key().as_deref() != Some(key.as_str()) {
            return;
        }
        if let Some(inner) = weak.upgrade() {
            SessionStore { inner }.apply_storage_value(event.new_value().as_deref());
        }
    }) as Box<dyn FnMut(web_sys::StorageEvent)>);
    if let Err(e) = window.add_event_listener_with_callback("storage", callback.as_ref().unchecked_ref()) {
        leptos::logging::warn!("storage listener not installed: {e:?}");
        return;
    }
    callback.forget();
}
