use super::*;
use crate::net::http::{RequestBody, TransportError};
use futures::executor::block_on;

// =============================================================
// Helpers
// =============================================================

const NOW: i64 = 1_700_000_000;

fn fixed_clock() -> i64 {
    NOW
}

#[derive(Default)]
struct ScriptedTransport {
    responses: Mutex<Vec<Result<HttpResponse, TransportError>>>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    fn reply(self: Arc<Self>, status: u16, body: serde_json::Value) -> Arc<Self> {
        self.responses.lock().expect("lock").push(Ok(HttpResponse { status, body: body.to_string() }));
        self
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().expect("lock").clone()
    }
}

#[async_trait(?Send)]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.seen.lock().expect("lock").push(request);
        let mut responses = self.responses.lock().expect("lock");
        if responses.is_empty() {
            return Err(TransportError::Network("no scripted response".to_owned()));
        }
        responses.remove(0)
    }
}

fn config() -> ClientConfig {
    ClientConfig::from_values(None, Some("https://abcd.supabase.co/"), Some("anon-key"), Some("https://app.example/dashboard"))
}

fn backend(transport: &Arc<ScriptedTransport>, persistence: &Arc<MemoryPersistence>) -> GoTrueBackend {
    let transport: Arc<dyn Transport> = Arc::clone(transport) as Arc<dyn Transport>;
    let persistence: Arc<dyn SessionPersistence> = Arc::clone(persistence) as Arc<dyn SessionPersistence>;
    GoTrueBackend::new(&config(), transport, persistence, fixed_clock)
}

fn user_json() -> serde_json::Value {
    serde_json::json!({ "id": "u-1", "email": "ana@example.com", "user_metadata": { "full_name": "Ana" } })
}

fn stored_session(expires_at: i64) -> String {
    serde_json::json!({
        "access_token": "stored",
        "refresh_token": "r-stored",
        "expires_at": expires_at,
        "token_type": "bearer",
        "user": user_json()
    })
    .to_string()
}

// =============================================================
// Pure helpers
// =============================================================

#[test]
fn storage_key_uses_project_ref() {
    assert_eq!(storage_key("https://abcd.supabase.co"), "sb-abcd-auth-token");
    assert_eq!(storage_key("http://localhost:54321"), "sb-localhost-auth-token");
    assert_eq!(storage_key("not a url"), "sb-local-auth-token");
}

#[test]
fn parse_fragment_reads_tokens() {
    let tokens = parse_fragment("#access_token=a.b.c&refresh_token=r1&expires_in=3600&token_type=bearer")
        .expect("parse")
        .expect("tokens");
    assert_eq!(tokens.access_token, "a.b.c");
    assert_eq!(tokens.refresh_token.as_deref(), Some("r1"));
    assert_eq!(tokens.expires_in, Some(3600));
    assert_eq!(tokens.expires_at, None);
}

#[test]
fn parse_fragment_without_tokens_is_none() {
    assert_eq!(parse_fragment("#section-2"), Ok(None));
    assert_eq!(parse_fragment(""), Ok(None));
}

#[test]
fn parse_fragment_reports_provider_error() {
    let err = parse_fragment("#error=access_denied&error_description=User+cancelled").expect_err("denied");
    assert_eq!(err, SessionError::Denied("User cancelled".to_owned()));
}

#[test]
fn oauth_fragment_is_detected_by_parameter_names() {
    assert!(is_oauth_fragment("#access_token=a.b.c&expires_in=3600"));
    assert!(is_oauth_fragment("#error=access_denied"));
    assert!(is_oauth_fragment("error_description=User+cancelled"));
    assert!(!is_oauth_fragment("#error-handling"));
    assert!(!is_oauth_fragment("#section=errors&tab=2"));
    assert!(!is_oauth_fragment("#"));
}

#[test]
fn authorize_url_encodes_redirect() {
    let transport = Arc::new(ScriptedTransport::default());
    let backend = backend(&transport, &Arc::new(MemoryPersistence::default()));
    let url = backend.authorize_url(Some("https://app.example/dashboard")).expect("url");
    assert_eq!(
        url,
        "https://abcd.supabase.co/auth/v1/authorize?provider=google&redirect_to=https%3A%2F%2Fapp.example%2Fdashboard"
    );
}

#[test]
fn unconfigured_backend_refuses() {
    let backend = GoTrueBackend::new(
        &ClientConfig::default(),
        Arc::new(ScriptedTransport::default()),
        Arc::new(MemoryPersistence::default()),
        fixed_clock,
    );
    assert_eq!(backend.authorize_url(None), Err(SessionError::NotConfigured));
    assert_eq!(block_on(backend.restore_from(None)), Err(SessionError::NotConfigured));
    assert_eq!(backend.storage_key(), None);
}

// =============================================================
// Restore
// =============================================================

#[test]
fn restore_from_fragment_fetches_user_and_persists() {
    let transport = Arc::new(ScriptedTransport::default()).reply(200, user_json());
    let persistence = Arc::new(MemoryPersistence::default());
    let backend = backend(&transport, &persistence);

    let session = block_on(backend.restore_from(Some("#access_token=fresh&refresh_token=r&expires_in=3600")))
        .expect("restore")
        .expect("session");

    assert_eq!(session.access_token, "fresh");
    assert_eq!(session.expires_at, Some(NOW + 3600));
    assert_eq!(session.user.greeting_name(), "Ana");

    let requests = transport.requests();
    assert_eq!(requests[0].url, "https://abcd.supabase.co/auth/v1/user");
    assert_eq!(requests[0].header_value("apikey"), Some("anon-key"));
    assert_eq!(requests[0].header_value("Authorization"), Some("Bearer fresh"));
    assert!(persistence.load("sb-abcd-auth-token").is_some_and(|raw| raw.contains("fresh")));
}

#[test]
fn restore_returns_valid_persisted_session_without_network() {
    let transport = Arc::new(ScriptedTransport::default());
    let persistence = Arc::new(MemoryPersistence::default());
    persistence.save("sb-abcd-auth-token", &stored_session(NOW + 3600));
    let backend = backend(&transport, &persistence);

    let session = block_on(backend.restore_from(None)).expect("restore").expect("session");
    assert_eq!(session.access_token, "stored");
    assert!(transport.requests().is_empty());
}

#[test]
fn restore_refreshes_session_near_expiry() {
    let transport = Arc::new(ScriptedTransport::default()).reply(
        200,
        serde_json::json!({
            "access_token": "renewed", "refresh_token": "r2", "expires_in": 3600, "user": user_json()
        }),
    );
    let persistence = Arc::new(MemoryPersistence::default());
    persistence.save("sb-abcd-auth-token", &stored_session(NOW + 30));
    let backend = backend(&transport, &persistence);

    let session = block_on(backend.restore_from(None)).expect("restore").expect("session");
    assert_eq!(session.access_token, "renewed");
    assert_eq!(session.expires_at, Some(NOW + 3600));

    let requests = transport.requests();
    assert_eq!(requests[0].url, "https://abcd.supabase.co/auth/v1/token?grant_type=refresh_token");
    match &requests[0].body {
        RequestBody::Json(text) => assert!(text.contains("r-stored")),
        other => panic!("unexpected body: {other:?}"),
    }
}

#[test]
fn restore_drops_expired_session_when_refresh_fails() {
    let transport =
        Arc::new(ScriptedTransport::default()).reply(400, serde_json::json!({ "error_description": "Invalid Refresh Token" }));
    let persistence = Arc::new(MemoryPersistence::default());
    persistence.save("sb-abcd-auth-token", &stored_session(NOW - 10));
    let backend = backend(&transport, &persistence);

    assert_eq!(block_on(backend.restore_from(None)), Ok(None));
    assert_eq!(persistence.load("sb-abcd-auth-token"), None);
}

#[test]
fn restore_keeps_unexpired_session_when_early_refresh_fails() {
    let transport = Arc::new(ScriptedTransport::default());
    let persistence = Arc::new(MemoryPersistence::default());
    persistence.save("sb-abcd-auth-token", &stored_session(NOW + 30));
    let backend = backend(&transport, &persistence);

    let session = block_on(backend.restore_from(None)).expect("restore").expect("session");
    assert_eq!(session.access_token, "stored");
}

#[test]
fn restore_discards_unreadable_persisted_value() {
    let transport = Arc::new(ScriptedTransport::default());
    let persistence = Arc::new(MemoryPersistence::default());
    persistence.save("sb-abcd-auth-token", "garbage");
    let backend = backend(&transport, &persistence);

    assert_eq!(block_on(backend.restore_from(None)), Ok(None));
    assert_eq!(persistence.load("sb-abcd-auth-token"), None);
}

// =============================================================
// Refresh / revoke
// =============================================================

#[test]
fn refresh_reports_provider_message() {
    let transport = Arc::new(ScriptedTransport::default()).reply(401, serde_json::json!({ "msg": "expired" }));
    let backend = backend(&transport, &Arc::new(MemoryPersistence::default()));
    let session: Session = serde_json::from_str(&stored_session(NOW)).expect("session");
    let err = block_on(backend.refresh(&session)).expect_err("rejected");
    assert_eq!(err, SessionError::Rejected { status: 401, message: "expired".to_owned() });
}

#[test]
fn revoke_clears_persistence_then_logs_out() {
    let transport = Arc::new(ScriptedTransport::default()).reply(204, serde_json::Value::Null);
    let persistence = Arc::new(MemoryPersistence::default());
    persistence.save("sb-abcd-auth-token", &stored_session(NOW + 3600));
    let backend = backend(&transport, &persistence);
    let session: Session = serde_json::from_str(&stored_session(NOW + 3600)).expect("session");

    assert_eq!(block_on(backend.revoke(Some(&session))), Ok(()));
    assert_eq!(persistence.load("sb-abcd-auth-token"), None);
    let requests = transport.requests();
    assert_eq!(requests[0].url, "https://abcd.supabase.co/auth/v1/logout");
    assert_eq!(requests[0].header_value("Authorization"), Some("Bearer stored"));
}

#[test]
fn revoke_without_session_only_clears_local_copy() {
    let transport = Arc::new(ScriptedTransport::default());
    let backend = backend(&transport, &Arc::new(MemoryPersistence::default()));
    assert_eq!(block_on(backend.revoke(None)), Ok(()));
    assert!(transport.requests().is_empty());
}

#[test]
fn begin_sign_in_unavailable_natively() {
    let transport = Arc::new(ScriptedTransport::default());
    let backend = backend(&transport, &Arc::new(MemoryPersistence::default()));
    assert_eq!(block_on(backend.begin_sign_in()), Err(SessionError::Unavailable));
}
