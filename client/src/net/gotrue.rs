//! Supabase GoTrue REST backend for the session store.
//!
//! SYSTEM CONTEXT
//! ==============
//! Google OAuth runs as a full-page redirect: `begin_sign_in` navigates to the
//! provider's authorize endpoint and the provider redirects back with the
//! tokens in the URL fragment. `restore` consumes that fragment (or the
//! persisted copy), so the new session appears through the normal restore
//! path rather than as the result of the sign-in call.
//!
//! Sessions are persisted as JSON under `sb-<project-ref>-auth-token`, the key
//! other tabs of the same origin watch for cross-tab sync.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "gotrue_test.rs"]
mod gotrue_test;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde::Deserialize;

use super::http::{HttpRequest, HttpResponse, Method, Transport};
use super::session::{SessionBackend, SessionError, REFRESH_MARGIN_SECS};
use super::types::{Session, User};
use crate::config::ClientConfig;

/// Key/value persistence for the serialized session.
pub trait SessionPersistence: Send + Sync {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-process persistence used outside the browser.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    entries: Mutex<HashMap<String, String>>,
}

impl SessionPersistence for MemoryPersistence {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).remove(key);
    }
}

/// `window.localStorage` persistence.
#[cfg(feature = "hydrate")]
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStoragePersistence;

#[cfg(feature = "hydrate")]
impl LocalStoragePersistence {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

#[cfg(feature = "hydrate")]
impl SessionPersistence for LocalStoragePersistence {
    fn load(&self, key: &str) -> Option<String> {
        Self::storage().and_then(|s| s.get_item(key).ok().flatten())
    }

    fn save(&self, key: &str, value: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.set_item(key, value);
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(key);
        }
    }
}

/// Token set carried in the OAuth redirect fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FragmentTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub expires_at: Option<i64>,
    pub token_type: Option<String>,
}

/// GoTrue-backed [`SessionBackend`].
pub struct GoTrueBackend {
    project_url: String,
    anon_key: String,
    redirect_to: Option<String>,
    transport: Arc<dyn Transport>,
    persistence: Arc<dyn SessionPersistence>,
    clock: fn() -> i64,
}

impl GoTrueBackend {
    pub fn new(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        persistence: Arc<dyn SessionPersistence>,
        clock: fn() -> i64,
    ) -> Self {
        Self {
            project_url: config.supabase_url.clone(),
            anon_key: config.supabase_anon_key.clone(),
            redirect_to: config.auth_redirect.clone(),
            transport,
            persistence,
            clock,
        }
    }

    /// Backend wired to the browser: `fetch`, `localStorage`, wall clock.
    #[cfg(feature = "hydrate")]
    pub fn browser(config: &ClientConfig) -> Self {
        Self::new(
            config,
            Arc::new(super::http::BrowserTransport),
            Arc::new(LocalStoragePersistence),
            crate::util::clock::now_unix,
        )
    }

    fn configured(&self) -> Result<(), SessionError> {
        if self.project_url.is_empty() || self.anon_key.is_empty() {
            return Err(SessionError::NotConfigured);
        }
        Ok(())
    }

    fn key(&self) -> String {
        storage_key(&self.project_url)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.project_url)
    }

    fn request(&self, method: Method, path: &str) -> HttpRequest {
        HttpRequest::new(method, self.endpoint(path)).header("apikey", self.anon_key.clone())
    }

    async fn exchange(&self, request: HttpRequest) -> Result<HttpResponse, SessionError> {
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;
        if !response.is_success() {
            return Err(SessionError::Rejected { status: response.status, message: provider_message(&response.body) });
        }
        Ok(response)
    }

    async fn fetch_user(&self, access_token: &str) -> Result<User, SessionError> {
        let request = self
            .request(Method::Get, "user")
            .header("Authorization", format!("Bearer {access_token}"));
        let response = self.exchange(request).await?;
        serde_json::from_str(&response.body).map_err(|e| SessionError::Malformed(e.to_string()))
    }

    fn persist(&self, session: &Session) {
        match serde_json::to_string(session) {
            Ok(raw) => self.persistence.save(&self.key(), &raw),
            Err(e) => leptos::logging::warn!("session not persisted: {e}"),
        }
    }

    fn load_persisted(&self) -> Option<Session> {
        let raw = self.persistence.load(&self.key())?;
        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                leptos::logging::warn!("discarding unreadable stored session: {e}");
                self.persistence.remove(&self.key());
                None
            }
        }
    }

    /// Restore a session from a redirect fragment or from persistence.
    ///
    /// A persisted session close to expiry is refreshed first; one that has
    /// expired and cannot be refreshed is discarded.
    ///
    /// # Errors
    ///
    /// Fails when the fragment carries a provider error or the user lookup
    /// for fresh fragment tokens fails.
    pub async fn restore_from(&self, fragment: Option<&str>) -> Result<Option<Session>, SessionError> {
        self.configured()?;
        let now = (self.clock)();

        if let Some(tokens) = fragment.map(parse_fragment).transpose()?.flatten() {
            let user = self.fetch_user(&tokens.access_token).await?;
            let session = session_from_tokens(tokens, user, now);
            self.persist(&session);
            return Ok(Some(session));
        }

        let Some(session) = self.load_persisted() else {
            return Ok(None);
        };
        if !session.expires_within(now, REFRESH_MARGIN_SECS) {
            return Ok(Some(session));
        }
        match self.refresh(&session).await {
            Ok(fresh) => Ok(Some(fresh)),
            Err(e) if session.expires_within(now, 0) => {
                leptos::logging::warn!("stored session expired and refresh failed: {e}");
                self.persistence.remove(&self.key());
                Ok(None)
            }
            Err(e) => {
                leptos::logging::warn!("early refresh failed, keeping stored session: {e}");
                Ok(Some(session))
            }
        }
    }

    /// Absolute authorize URL for Google sign-in.
    ///
    /// # Errors
    ///
    /// Fails when the provider is not configured or its URL is invalid.
    pub fn authorize_url(&self, redirect_to: Option<&str>) -> Result<String, SessionError> {
        self.configured()?;
        let mut url =
            url::Url::parse(&self.endpoint("authorize")).map_err(|e| SessionError::Malformed(e.to_string()))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("provider", "google");
            if let Some(target) = redirect_to {
                query.append_pair("redirect_to", target);
            }
        }
        Ok(url.into())
    }

    fn redirect_target(&self) -> Option<String> {
        if let Some(target) = &self.redirect_to {
            return Some(target.clone());
        }
        #[cfg(feature = "hydrate")]
        {
            web_sys::window()
                .and_then(|w| w.location().origin().ok())
                .map(|origin| format!("{origin}{}", crate::config::DEFAULT_AUTH_REDIRECT_PATH))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            None
        }
    }
}

#[async_trait(?Send)]
impl SessionBackend for GoTrueBackend {
    async fn restore(&self) -> Result<Option<Session>, SessionError> {
        #[cfg(feature = "hydrate")]
        {
            let fragment = take_location_fragment();
            self.restore_from(fragment.as_deref()).await
        }
        #[cfg(not(feature = "hydrate"))]
        {
            self.restore_from(None).await
        }
    }

    async fn begin_sign_in(&self) -> Result<(), SessionError> {
        let target = self.authorize_url(self.redirect_target().as_deref())?;
        #[cfg(feature = "hydrate")]
        {
            let window = web_sys::window().ok_or(SessionError::Unavailable)?;
            window
                .location()
                .assign(&target)
                .map_err(|e| SessionError::Transport(format!("{e:?}")))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = target;
            Err(SessionError::Unavailable)
        }
    }

    async fn refresh(&self, session: &Session) -> Result<Session, SessionError> {
        self.configured()?;
        let refresh_token = session
            .refresh_token
            .as_deref()
            .ok_or_else(|| SessionError::Malformed("session has no refresh token".to_owned()))?;
        let request = self
            .request(Method::Post, "token?grant_type=refresh_token")
            .json(&serde_json::json!({ "refresh_token": refresh_token }));
        let response = self.exchange(request).await?;
        let mut fresh: Session =
            serde_json::from_str(&response.body).map_err(|e| SessionError::Malformed(e.to_string()))?;
        if fresh.expires_at.is_none() {
            fresh.expires_at = fresh.expires_in.map(|secs| (self.clock)() + secs);
        }
        self.persist(&fresh);
        Ok(fresh)
    }

    async fn revoke(&self, session: Option<&Session>) -> Result<(), SessionError> {
        self.persistence.remove(&self.key());
        let Some(session) = session else {
            return Ok(());
        };
        self.configured()?;
        let request = self
            .request(Method::Post, "logout")
            .header("Authorization", format!("Bearer {}", session.access_token));
        self.exchange(request).await.map(|_| ())
    }

    fn storage_key(&self) -> Option<String> {
        (!self.project_url.is_empty()).then(|| self.key())
    }
}

/// Persistence key for a project URL: `sb-<first host label>-auth-token`.
pub fn storage_key(project_url: &str) -> String {
    let reference = url::Url::parse(project_url)
        .ok()
        .and_then(|url| url.host_str().map(|host| host.split('.').next().unwrap_or(host).to_owned()))
        .unwrap_or_else(|| "local".to_owned());
    format!("sb-{reference}-auth-token")
}

/// Whether a URL fragment is OAuth redirect output (tokens or a provider
/// error), judged by its parameter names.
pub fn is_oauth_fragment(fragment: &str) -> bool {
    url::form_urlencoded::parse(fragment.trim_start_matches('#').as_bytes())
        .any(|(key, _)| matches!(key.as_ref(), "access_token" | "error" | "error_description"))
}

/// Parse the OAuth redirect fragment.
///
/// `Ok(None)` when the fragment holds no tokens.
///
/// # Errors
///
/// Returns [`SessionError::Denied`] when the provider reported an error.
pub fn parse_fragment(fragment: &str) -> Result<Option<FragmentTokens>, SessionError> {
    let fragment = fragment.trim_start_matches('#');
    let pairs: HashMap<String, String> = url::form_urlencoded::parse(fragment.as_bytes()).into_owned().collect();

    if let Some(description) = pairs.get("error_description").or_else(|| pairs.get("error")) {
        return Err(SessionError::Denied(description.clone()));
    }
    let Some(access_token) = pairs.get("access_token").filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    Ok(Some(FragmentTokens {
        access_token: access_token.clone(),
        refresh_token: pairs.get("refresh_token").cloned(),
        expires_in: pairs.get("expires_in").and_then(|v| v.parse().ok()),
        expires_at: pairs.get("expires_at").and_then(|v| v.parse().ok()),
        token_type: pairs.get("token_type").cloned(),
    }))
}

fn session_from_tokens(tokens: FragmentTokens, user: User, now: i64) -> Session {
    let expires_at = tokens.expires_at.or_else(|| tokens.expires_in.map(|secs| now + secs));
    Session {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_at,
        expires_in: tokens.expires_in,
        token_type: tokens.token_type.unwrap_or_else(|| "bearer".to_owned()),
        user,
    }
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

fn provider_message(body: &str) -> String {
    serde_json::from_str::<ProviderErrorBody>(body)
        .ok()
        .and_then(|b| b.error_description.or(b.msg).or(b.message).or(b.error))
        .unwrap_or_else(|| "identity provider error".to_owned())
}

/// Read the current URL fragment and strip it from the address bar when it
/// carries OAuth output.
#[cfg(feature = "hydrate")]
fn take_location_fragment() -> Option<String> {
    let window = web_sys::window()?;
    let hash = window.location().hash().ok().filter(|h| h.len() > 1)?;
    if !is_oauth_fragment(&hash) {
        return None;
    }
    if let Ok(history) = window.history() {
        let path = window.location().pathname().unwrap_or_default();
        let search = window.location().search().unwrap_or_default();
        let _ = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&format!("{path}{search}")));
    }
    Some(hash)
}
