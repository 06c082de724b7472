//! Build-time client configuration.
//!
//! SYSTEM CONTEXT
//! ==============
//! The WASM bundle has no process environment at runtime, so values are baked
//! in at compile time with `option_env!`, mirroring how static front-end
//! bundlers inline their env. Every value has a documented default so a bare
//! `cargo build` produces a working (logged-out) client.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

/// Backend base URL used when `FINSIGHT_BACKEND_URL` is not set at build time.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3001";

/// Default path the identity provider redirects back to after sign-in.
pub const DEFAULT_AUTH_REDIRECT_PATH: &str = "/dashboard";

/// Resolved configuration for the browser client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the analysis backend, without trailing slash.
    pub backend_url: String,
    /// Identity-provider project URL, without trailing slash. Empty when unset.
    pub supabase_url: String,
    /// Identity-provider public (anon) key. Empty when unset.
    pub supabase_anon_key: String,
    /// Explicit OAuth `redirect_to` target; `None` means `<origin>/dashboard`.
    pub auth_redirect: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_values(None, None, None, None)
    }
}

impl ClientConfig {
    /// Read the configuration baked in at compile time.
    pub fn from_build_env() -> Self {
        Self::from_values(
            option_env!("FINSIGHT_BACKEND_URL"),
            option_env!("FINSIGHT_SUPABASE_URL"),
            option_env!("FINSIGHT_SUPABASE_ANON_KEY"),
            option_env!("FINSIGHT_AUTH_REDIRECT"),
        )
    }

    /// Build a config from optional raw values, applying defaults and
    /// normalizing URLs.
    pub fn from_values(
        backend_url: Option<&str>,
        supabase_url: Option<&str>,
        supabase_anon_key: Option<&str>,
        auth_redirect: Option<&str>,
    ) -> Self {
        let backend_url = non_empty(backend_url).unwrap_or(DEFAULT_BACKEND_URL);
        Self {
            backend_url: trim_url(backend_url),
            supabase_url: non_empty(supabase_url).map(trim_url).unwrap_or_default(),
            supabase_anon_key: non_empty(supabase_anon_key).unwrap_or_default().to_owned(),
            auth_redirect: non_empty(auth_redirect).map(str::to_owned),
        }
    }

    /// Whether enough identity-provider settings exist to attempt sign-in.
    pub fn identity_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|v| !v.is_empty())
}

fn trim_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}
