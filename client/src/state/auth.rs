//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! `AuthContext` is constructed once by the root component and handed to every
//! page. It mirrors the session store into a reactive `AuthState` that route
//! guards and user-aware components read; only the context's own lifecycle
//! writes it.
//!
//! LIFECYCLE
//! =========
//! `activate` registers the store subscription first and then awaits the
//! initial session fetch, so no provider event can be missed. Whichever of
//! the two lands first clears `loading`; an initial fetch that resolves after
//! an event is dropped because the event is newer. `teardown` releases the
//! subscription and makes any late completion a no-op.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use leptos::prelude::*;

use crate::net::session::{SessionError, SessionStore, Subscription};
use crate::net::types::{Session, User};

/// Authentication state: the mirrored session and the initial-load flag.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthState {
    pub session: Option<Session>,
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self { session: None, loading: true }
    }
}

impl AuthState {
    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Apply the initial session fetch. Ignored once loading has finished.
    ///
    /// Returns whether the result was applied.
    pub fn resolve_initial(&mut self, session: Option<Session>) -> bool {
        if !self.loading {
            return false;
        }
        self.session = session;
        self.loading = false;
        true
    }

    /// Apply a provider session-change event.
    pub fn apply_event(&mut self, session: Option<Session>) {
        self.session = session;
        self.loading = false;
    }
}

/// Storage for the mirrored [`AuthState`].
///
/// `modify` returns `false` when the cell no longer exists (its reactive owner
/// was disposed), which callers treat as a no-op.
pub trait AuthStateCell: Clone + Send + Sync + 'static {
    fn snapshot(&self) -> AuthState;
    fn modify(&self, f: impl FnOnce(&mut AuthState)) -> bool;
}

impl AuthStateCell for RwSignal<AuthState> {
    fn snapshot(&self) -> AuthState {
        self.try_get_untracked().unwrap_or_default()
    }

    fn modify(&self, f: impl FnOnce(&mut AuthState)) -> bool {
        self.try_update(f).is_some()
    }
}

impl AuthStateCell for Arc<Mutex<AuthState>> {
    fn snapshot(&self) -> AuthState {
        self.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn modify(&self, f: impl FnOnce(&mut AuthState)) -> bool {
        f(&mut self.lock().unwrap_or_else(PoisonError::into_inner));
        true
    }
}

/// The one auth context of a running client.
#[derive(Clone)]
pub struct AuthContext<C: AuthStateCell = RwSignal<AuthState>> {
    store: SessionStore,
    state: C,
    subscription: Arc<Mutex<Option<Subscription>>>,
    activated: Arc<AtomicBool>,
    active: Arc<AtomicBool>,
}

impl AuthContext {
    /// Context backed by a fresh reactive signal.
    pub fn new(store: SessionStore) -> Self {
        Self::with_cell(store, RwSignal::new(AuthState::default()))
    }

    /// Read-only view for components.
    pub fn state(&self) -> ReadSignal<AuthState> {
        self.state.read_only()
    }
}

impl<C: AuthStateCell> AuthContext<C> {
    pub fn with_cell(store: SessionStore, state: C) -> Self {
        Self {
            store,
            state,
            subscription: Arc::new(Mutex::new(None)),
            activated: Arc::new(AtomicBool::new(false)),
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn snapshot(&self) -> AuthState {
        self.state.snapshot()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Subscribe to session changes and resolve the initial session.
    ///
    /// Runs at most once per context; later calls return immediately.
    pub async fn activate(&self) {
        if self.activated.swap(true, Ordering::SeqCst) {
            return;
        }
        self.active.store(true, Ordering::SeqCst);

        let state = self.state.clone();
        let active = Arc::clone(&self.active);
        let subscription = self.store.on_session_change(move |session| {
            if active.load(Ordering::SeqCst) {
                state.modify(|s| s.apply_event(session));
            }
        });
        *self.subscription.lock().unwrap_or_else(PoisonError::into_inner) = Some(subscription);

        let session = self.store.get_current_session().await;
        if !self.is_active() {
            return;
        }
        self.state.modify(|s| {
            if !s.resolve_initial(session) {
                leptos::logging::log!("initial session superseded by a provider event");
            }
        });
    }

    /// Release the subscription; later completions are discarded.
    pub fn teardown(&self) {
        self.active.store(false, Ordering::SeqCst);
        let subscription = self.subscription.lock().unwrap_or_else(PoisonError::into_inner).take();
        drop(subscription);
    }

    /// Start Google sign-in. The new session arrives later through the
    /// subscription.
    ///
    /// # Errors
    ///
    /// Returns an error only when the redirect could not be started.
    pub async fn sign_in_with_google(&self) -> Result<(), SessionError> {
        self.store.sign_in().await
    }

    pub async fn sign_out(&self) {
        self.store.sign_out().await;
    }
}
