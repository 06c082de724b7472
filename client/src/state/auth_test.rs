use super::*;
use crate::net::session::SessionBackend;
use async_trait::async_trait;
use futures::channel::oneshot;
use futures::executor::{LocalPool, block_on};
use futures::task::LocalSpawnExt;

// =============================================================
// Helpers
// =============================================================

fn session(token: &str) -> Session {
    Session {
        access_token: token.to_owned(),
        refresh_token: None,
        expires_at: None,
        expires_in: None,
        token_type: "bearer".to_owned(),
        user: User { id: "u-1".to_owned(), email: "ana@example.com".to_owned(), user_metadata: serde_json::Value::Null },
    }
}

/// Backend whose restore resolves when the test sends on the channel.
struct GatedBackend {
    restore: Mutex<Option<oneshot::Receiver<Option<Session>>>>,
}

#[async_trait(?Send)]
impl SessionBackend for GatedBackend {
    async fn restore(&self) -> Result<Option<Session>, SessionError> {
        let receiver = self.restore.lock().expect("lock").take();
        match receiver {
            Some(rx) => Ok(rx.await.unwrap_or(None)),
            None => Ok(None),
        }
    }

    async fn begin_sign_in(&self) -> Result<(), SessionError> {
        Ok(())
    }

    async fn refresh(&self, session: &Session) -> Result<Session, SessionError> {
        Ok(session.clone())
    }

    async fn revoke(&self, _session: Option<&Session>) -> Result<(), SessionError> {
        Ok(())
    }
}

fn gated_context() -> (AuthContext<Arc<Mutex<AuthState>>>, oneshot::Sender<Option<Session>>) {
    let (tx, rx) = oneshot::channel();
    let store = SessionStore::new(GatedBackend { restore: Mutex::new(Some(rx)) });
    let ctx = AuthContext::with_cell(store, Arc::new(Mutex::new(AuthState::default())));
    (ctx, tx)
}

fn token(state: &AuthState) -> Option<&str> {
    state.session.as_ref().map(|s| s.access_token.as_str())
}

// =============================================================
// AuthState
// =============================================================

#[test]
fn default_state_is_loading_without_session() {
    let state = AuthState::default();
    assert!(state.loading);
    assert_eq!(state.session, None);
}

#[test]
fn resolve_initial_applies_only_while_loading() {
    let mut state = AuthState::default();
    assert!(state.resolve_initial(Some(session("a"))));
    assert!(!state.resolve_initial(None));
    assert_eq!(token(&state), Some("a"));
    assert!(!state.loading);
}

#[test]
fn events_never_restore_loading() {
    let mut state = AuthState::default();
    for next in [Some(session("a")), None, Some(session("b")), None] {
        state.apply_event(next);
        assert!(!state.loading);
    }
}

// =============================================================
// AuthContext lifecycle
// =============================================================

#[test]
fn initial_fetch_clears_loading() {
    let (ctx, tx) = gated_context();
    let mut pool = LocalPool::new();
    let task = ctx.clone();
    pool.spawner().spawn_local(async move { task.activate().await }).expect("spawn");

    pool.run_until_stalled();
    assert!(ctx.snapshot().loading);
    assert_eq!(ctx.store().listener_count(), 1);

    tx.send(Some(session("initial"))).expect("send");
    pool.run_until_stalled();
    let state = ctx.snapshot();
    assert!(!state.loading);
    assert_eq!(token(&state), Some("initial"));
}

#[test]
fn event_before_initial_fetch_wins() {
    let (ctx, tx) = gated_context();
    let mut pool = LocalPool::new();
    let task = ctx.clone();
    pool.spawner().spawn_local(async move { task.activate().await }).expect("spawn");
    pool.run_until_stalled();

    ctx.store().publish(Some(session("event")));
    assert!(!ctx.snapshot().loading);

    tx.send(None).expect("send");
    pool.run_until_stalled();
    assert_eq!(token(&ctx.snapshot()), Some("event"));
}

#[test]
fn late_initial_fetch_leaves_store_token_matching_state() {
    let (ctx, tx) = gated_context();
    let mut pool = LocalPool::new();
    let task = ctx.clone();
    pool.spawner().spawn_local(async move { task.activate().await }).expect("spawn");
    pool.run_until_stalled();

    ctx.store().publish(Some(session("event")));
    tx.send(None).expect("send");
    pool.run_until_stalled();

    let state = ctx.snapshot();
    assert_eq!(token(&state), Some("event"));
    assert_eq!(ctx.store().access_token().as_deref(), token(&state));
}

#[test]
fn events_after_load_keep_updating_session() {
    let (ctx, tx) = gated_context();
    tx.send(Some(session("initial"))).expect("send");
    block_on(ctx.activate());

    ctx.store().publish(Some(session("refreshed")));
    assert_eq!(token(&ctx.snapshot()), Some("refreshed"));
    ctx.store().publish(None);
    let state = ctx.snapshot();
    assert_eq!(state.session, None);
    assert!(!state.loading);
}

#[test]
fn activate_runs_once() {
    let (ctx, tx) = gated_context();
    tx.send(None).expect("send");
    block_on(ctx.activate());
    block_on(ctx.activate());
    assert_eq!(ctx.store().listener_count(), 1);
}

#[test]
fn teardown_releases_subscription_and_ignores_late_results() {
    let (ctx, tx) = gated_context();
    let mut pool = LocalPool::new();
    let task = ctx.clone();
    pool.spawner().spawn_local(async move { task.activate().await }).expect("spawn");
    pool.run_until_stalled();

    ctx.teardown();
    assert_eq!(ctx.store().listener_count(), 0);
    assert!(!ctx.is_active());

    tx.send(Some(session("late"))).expect("send");
    pool.run_until_stalled();
    ctx.store().publish(Some(session("after")));
    let state = ctx.snapshot();
    assert!(state.loading);
    assert_eq!(state.session, None);
}

#[test]
fn sign_out_results_in_logged_out_state() {
    let (ctx, tx) = gated_context();
    tx.send(Some(session("initial"))).expect("send");
    block_on(ctx.activate());
    block_on(ctx.sign_out());
    assert_eq!(ctx.snapshot().session, None);
}

#[test]
fn sign_in_returns_without_session() {
    let (ctx, tx) = gated_context();
    tx.send(None).expect("send");
    block_on(ctx.activate());
    assert_eq!(block_on(ctx.sign_in_with_google()), Ok(()));
    assert_eq!(ctx.snapshot().session, None);
}
