use super::*;

#[test]
fn defaults_point_at_local_backend() {
    let cfg = ClientConfig::from_values(None, None, None, None);
    assert_eq!(cfg.backend_url, DEFAULT_BACKEND_URL);
    assert!(cfg.supabase_url.is_empty());
    assert!(cfg.supabase_anon_key.is_empty());
    assert_eq!(cfg.auth_redirect, None);
    assert!(!cfg.identity_configured());
}

#[test]
fn blank_values_fall_back_to_defaults() {
    let cfg = ClientConfig::from_values(Some("   "), Some(""), Some(" "), Some(""));
    assert_eq!(cfg.backend_url, DEFAULT_BACKEND_URL);
    assert!(cfg.supabase_url.is_empty());
    assert_eq!(cfg.auth_redirect, None);
}

#[test]
fn urls_lose_trailing_slashes() {
    let cfg = ClientConfig::from_values(
        Some("https://api.example.com/"),
        Some("https://abc.supabase.co//"),
        Some("anon"),
        None,
    );
    assert_eq!(cfg.backend_url, "https://api.example.com");
    assert_eq!(cfg.supabase_url, "https://abc.supabase.co");
    assert!(cfg.identity_configured());
}

#[test]
fn identity_requires_both_url_and_key() {
    let cfg = ClientConfig::from_values(None, Some("https://abc.supabase.co"), None, None);
    assert!(!cfg.identity_configured());
}

#[test]
fn redirect_override_is_kept_verbatim() {
    let cfg = ClientConfig::from_values(None, None, None, Some("https://app.example.com/dashboard"));
    assert_eq!(cfg.auth_redirect.as_deref(), Some("https://app.example.com/dashboard"));
}
