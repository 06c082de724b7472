//! Shared auth UI helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Route components apply identical redirect behavior. Both redirects replace
//! the current history entry so the back button never returns to a page the
//! gate would bounce again.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;

use crate::state::auth::AuthState;
use crate::state::gate::{self, RedirectOnce};

/// Options used for every gate redirect.
pub fn replace_options() -> NavigateOptions {
    NavigateOptions { replace: true, ..NavigateOptions::default() }
}

/// Navigate to `/login` if `state` has loaded without a session.
///
/// Returns whether a navigation was issued.
pub fn redirect_if_unauth<F>(state: &AuthState, navigate: &F) -> bool
where
    F: Fn(&str, NavigateOptions),
{
    let redirect = gate::should_redirect_unauth(state);
    if redirect {
        navigate(gate::LOGIN_PATH, replace_options());
    }
    redirect
}

/// Navigate to the dashboard if `state` holds a session and `latch` has not
/// fired yet.
///
/// Returns whether a navigation was issued.
pub fn redirect_if_authorized<F>(state: &AuthState, latch: &RedirectOnce, navigate: &F) -> bool
where
    F: Fn(&str, NavigateOptions),
{
    let redirect = gate::should_redirect_authorized(state) && latch.try_fire();
    if redirect {
        navigate(gate::DEFAULT_PROTECTED_PATH, replace_options());
    }
    redirect
}

/// Redirect to `/login` whenever auth has loaded and no session is present.
pub fn install_unauth_redirect<F>(auth: ReadSignal<AuthState>, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        auth.with(|state| redirect_if_unauth(state, &navigate));
    });
}

/// Redirect an authenticated visitor to the dashboard, at most once per
/// `latch`.
pub fn install_authorized_redirect<F>(auth: ReadSignal<AuthState>, latch: RedirectOnce, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        auth.with(|state| redirect_if_authorized(state, &latch, &navigate));
    });
}
