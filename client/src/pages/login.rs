//! Login page: Google sign-in through the identity provider.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::components::loading_spinner::LoadingSpinner;
use crate::net::session::SessionError;
use crate::state::auth::{AuthContext, AuthState};
use crate::state::gate::RedirectOnce;
use crate::util::auth::install_authorized_redirect;
use crate::util::task::spawn_browser;

pub const SIGN_IN_FAILED_MESSAGE: &str = "Erro ao fazer login. Tente novamente.";
pub const SIGN_IN_UNCONFIGURED_MESSAGE: &str = "Login com Google indisponível: provedor de identidade não configurado.";

fn sign_in_error_message(err: &SessionError) -> &'static str {
    match err {
        SessionError::NotConfigured => SIGN_IN_UNCONFIGURED_MESSAGE,
        _ => SIGN_IN_FAILED_MESSAGE,
    }
}

/// Text shown instead of the sign-in button.
fn login_status(state: &AuthState) -> Option<&'static str> {
    if state.loading {
        Some("Carregando...")
    } else if state.is_authenticated() {
        Some("Redirecionando...")
    } else {
        None
    }
}

#[component]
pub fn LoginPage(auth: AuthContext) -> impl IntoView {
    let state = auth.state();
    install_authorized_redirect(state, RedirectOnce::new(), use_navigate());

    let error = RwSignal::new(None::<&'static str>);
    let busy = RwSignal::new(false);

    let on_google = move |_: leptos::ev::MouseEvent| {
        if busy.get_untracked() {
            return;
        }
        busy.set(true);
        error.set(None);
        let auth = auth.clone();
        spawn_browser(async move {
            if let Err(err) = auth.sign_in_with_google().await {
                leptos::logging::warn!("google sign-in failed to start: {err}");
                error.set(Some(sign_in_error_message(&err)));
            }
            busy.set(false);
        });
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Financial AI"</h1>
                <p class="login-card__subtitle">"Análise financeira inteligente com IA"</p>
                <h2>"Bem-vindo"</h2>

                <Show
                    when=move || state.with(login_status).is_none()
                    fallback=move || view! { <LoadingSpinner message={state.with(login_status).unwrap_or_default()}/> }
                >
                    <button class="login-button" on:click={on_google.clone()} disabled=move || busy.get()>
                        "Entrar com Google"
                    </button>
                </Show>

                <Show when=move || error.get().is_some()>
                    <p class="banner banner--error">{move || error.get().unwrap_or_default()}</p>
                </Show>

                <div class="login-card__features">
                    <strong>"Recursos incluídos:"</strong>
                    <ul>
                        <li>"Upload de CSV e Excel"</li>
                        <li>"Análise automática com IA"</li>
                        <li>"Cálculo de impostos"</li>
                        <li>"Insights financeiros"</li>
                    </ul>
                </div>
            </div>
        </div>
    }
}
