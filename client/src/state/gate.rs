//! Protected-route gate state machine.
//!
//! The gate is re-derived from `AuthState` on every change; it has no memory
//! of its own beyond the login view's one-shot redirect latch.

#[cfg(test)]
#[path = "gate_test.rs"]
mod gate_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::auth::AuthState;

/// Public sign-in route.
pub const LOGIN_PATH: &str = "/login";
/// Where authenticated visitors land.
pub const DEFAULT_PROTECTED_PATH: &str = "/dashboard";

/// What a guarded route should show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateState {
    /// Auth still loading: only a loading indicator.
    Pending,
    /// Session present: render the protected view.
    Authorized,
    /// No session: send the visitor to login.
    Unauthorized,
}

impl From<&AuthState> for GateState {
    fn from(state: &AuthState) -> Self {
        if state.loading {
            Self::Pending
        } else if state.session.is_some() {
            Self::Authorized
        } else {
            Self::Unauthorized
        }
    }
}

impl GateState {
    /// Placeholder text shown instead of a protected view.
    pub fn placeholder(self) -> Option<&'static str> {
        match self {
            Self::Pending => Some("Carregando..."),
            Self::Authorized => None,
            Self::Unauthorized => Some("Redirecionando para o login..."),
        }
    }
}

/// Protected routes redirect once auth has loaded and no session is present.
pub fn should_redirect_unauth(state: &AuthState) -> bool {
    GateState::from(state) == GateState::Unauthorized
}

/// The login view redirects away once a session is present.
pub fn should_redirect_authorized(state: &AuthState) -> bool {
    GateState::from(state) == GateState::Authorized
}

/// Latch allowing a single redirect per mounted view.
#[derive(Clone, Debug, Default)]
pub struct RedirectOnce {
    fired: Arc<AtomicBool>,
}

impl RedirectOnce {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time only.
    pub fn try_fire(&self) -> bool {
        !self.fired.swap(true, Ordering::SeqCst)
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}
