use super::*;
use crate::net::types::User;
use futures::executor::block_on;
use std::sync::atomic::{AtomicUsize, Ordering};

// =============================================================
// Helpers
// =============================================================

fn session(token: &str, expires_at: Option<i64>) -> Session {
    Session {
        access_token: token.to_owned(),
        refresh_token: Some(format!("{token}-refresh")),
        expires_at,
        expires_in: Some(3600),
        token_type: "bearer".to_owned(),
        user: User { id: "u-1".to_owned(), email: "ana@example.com".to_owned(), user_metadata: serde_json::Value::Null },
    }
}

#[derive(Clone, Default)]
struct StubCalls {
    restore: Arc<Mutex<Option<Result<Option<Session>, SessionError>>>>,
    refresh: Arc<Mutex<Option<Result<Session, SessionError>>>>,
    sign_in_calls: Arc<AtomicUsize>,
    revoke_calls: Arc<AtomicUsize>,
    revoke_fails: Arc<Mutex<bool>>,
}

struct StubBackend(StubCalls);

#[async_trait(?Send)]
impl SessionBackend for StubBackend {
    async fn restore(&self) -> Result<Option<Session>, SessionError> {
        lock(&self.0.restore).take().unwrap_or(Ok(None))
    }

    async fn begin_sign_in(&self) -> Result<(), SessionError> {
        self.0.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn refresh(&self, _session: &Session) -> Result<Session, SessionError> {
        lock(&self.0.refresh).take().unwrap_or(Err(SessionError::NotConfigured))
    }

    async fn revoke(&self, _session: Option<&Session>) -> Result<(), SessionError> {
        self.0.revoke_calls.fetch_add(1, Ordering::SeqCst);
        if *lock(&self.0.revoke_fails) {
            return Err(SessionError::Transport("offline".to_owned()));
        }
        Ok(())
    }

    fn storage_key(&self) -> Option<String> {
        Some("sb-test-auth-token".to_owned())
    }
}

fn stub_store() -> (SessionStore, StubCalls) {
    let calls = StubCalls::default();
    (SessionStore::new(StubBackend(calls.clone())), calls)
}

fn recorder(store: &SessionStore) -> (Subscription, Arc<Mutex<Vec<Option<String>>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let sub = store.on_session_change(move |s| lock(&sink).push(s.map(|s| s.access_token)));
    (sub, seen)
}

// =============================================================
// get_current_session
// =============================================================

#[test]
fn get_current_session_returns_restored_session() {
    let (store, calls) = stub_store();
    *lock(&calls.restore) = Some(Ok(Some(session("t1", None))));
    let restored = block_on(store.get_current_session());
    assert_eq!(restored.map(|s| s.access_token).as_deref(), Some("t1"));
    assert_eq!(store.access_token().as_deref(), Some("t1"));
}

#[test]
fn get_current_session_fails_soft() {
    let (store, calls) = stub_store();
    *lock(&calls.restore) = Some(Err(SessionError::Transport("down".to_owned())));
    assert_eq!(block_on(store.get_current_session()), None);
    assert_eq!(store.current(), None);
}

// =============================================================
// Subscriptions
// =============================================================

#[test]
fn publish_delivers_in_order() {
    let (store, _) = stub_store();
    let (_sub, seen) = recorder(&store);
    store.publish(Some(session("a", None)));
    store.publish(Some(session("b", None)));
    store.publish(None);
    assert_eq!(*lock(&seen), vec![Some("a".to_owned()), Some("b".to_owned()), None]);
}

#[test]
fn dropping_subscription_unregisters() {
    let (store, _) = stub_store();
    let (sub, seen) = recorder(&store);
    assert_eq!(store.listener_count(), 1);
    sub.unsubscribe();
    assert_eq!(store.listener_count(), 0);
    store.publish(None);
    assert!(lock(&seen).is_empty());
}

#[test]
fn handler_may_unsubscribe_itself() {
    let (store, _) = stub_store();
    let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
    let inner_slot = Arc::clone(&slot);
    let sub = store.on_session_change(move |_| {
        lock(&inner_slot).take();
    });
    *lock(&slot) = Some(sub);
    store.publish(None);
    assert_eq!(store.listener_count(), 0);
}

#[test]
fn subscription_outliving_store_is_inert() {
    let (store, _) = stub_store();
    let (sub, _) = recorder(&store);
    drop(store);
    drop(sub);
}

// =============================================================
// sign_in / sign_out
// =============================================================

#[test]
fn sign_in_starts_redirect_without_publishing() {
    let (store, calls) = stub_store();
    let (_sub, seen) = recorder(&store);
    assert_eq!(block_on(store.sign_in()), Ok(()));
    assert_eq!(calls.sign_in_calls.load(Ordering::SeqCst), 1);
    assert!(lock(&seen).is_empty());
}

#[test]
fn sign_out_publishes_exactly_one_none() {
    let (store, calls) = stub_store();
    store.publish(Some(session("t1", None)));
    let (_sub, seen) = recorder(&store);
    block_on(store.sign_out());
    assert_eq!(*lock(&seen), vec![None]);
    assert_eq!(calls.revoke_calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.current(), None);
}

#[test]
fn sign_out_publishes_even_when_revoke_fails() {
    let (store, calls) = stub_store();
    *lock(&calls.revoke_fails) = true;
    store.publish(Some(session("t1", None)));
    let (_sub, seen) = recorder(&store);
    block_on(store.sign_out());
    assert_eq!(*lock(&seen), vec![None]);
}

// =============================================================
// Refresh
// =============================================================

#[test]
fn refresh_delay_targets_margin_before_expiry() {
    assert_eq!(refresh_delay(Some(1_000), 0), Some(Duration::from_secs(940)));
    assert_eq!(refresh_delay(Some(1_000), 990), Some(Duration::from_secs(5)));
    assert_eq!(refresh_delay(None, 0), None);
}

#[test]
fn refresh_current_publishes_new_session() {
    let (store, calls) = stub_store();
    store.publish(Some(session("old", Some(1_000))));
    *lock(&calls.refresh) = Some(Ok(session("new", Some(5_000))));
    let (_sub, seen) = recorder(&store);
    assert_eq!(block_on(store.refresh_current(950)), Ok(()));
    assert_eq!(*lock(&seen), vec![Some("new".to_owned())]);
    assert_eq!(store.access_token().as_deref(), Some("new"));
}

#[test]
fn failed_refresh_of_live_session_keeps_it() {
    let (store, _) = stub_store();
    store.publish(Some(session("old", Some(1_000))));
    let (_sub, seen) = recorder(&store);
    assert!(block_on(store.refresh_current(950)).is_err());
    assert!(lock(&seen).is_empty());
    assert_eq!(store.access_token().as_deref(), Some("old"));
}

#[test]
fn failed_refresh_of_expired_session_signs_out() {
    let (store, _) = stub_store();
    store.publish(Some(session("old", Some(1_000))));
    let (_sub, seen) = recorder(&store);
    assert!(block_on(store.refresh_current(1_001)).is_err());
    assert_eq!(*lock(&seen), vec![None]);
}

#[test]
fn refresh_without_session_is_noop() {
    let (store, _) = stub_store();
    assert_eq!(block_on(store.refresh_current(0)), Ok(()));
}

// =============================================================
// Cross-tab storage
// =============================================================

#[test]
fn storage_value_publishes_other_tab_session() {
    let (store, _) = stub_store();
    let (_sub, seen) = recorder(&store);
    let raw = serde_json::to_string(&session("tab2", None)).expect("json");
    store.apply_storage_value(Some(&raw));
    store.apply_storage_value(Some(&raw));
    store.apply_storage_value(None);
    assert_eq!(*lock(&seen), vec![Some("tab2".to_owned()), None]);
    assert_eq!(store.storage_key().as_deref(), Some("sb-test-auth-token"));
}

#[test]
fn unreadable_storage_value_counts_as_sign_out() {
    let (store, _) = stub_store();
    store.publish(Some(session("t1", None)));
    let (_sub, seen) = recorder(&store);
    store.apply_storage_value(Some("{not json"));
    assert_eq!(*lock(&seen), vec![None]);
}
