//! Route guard wrapping every authenticated page.
//!
//! SYSTEM CONTEXT
//! ==============
//! Mounted as the parent route view. Children render through `<Outlet/>`
//! only while a session is present; otherwise a placeholder is shown and,
//! once auth has loaded, the visitor is sent to `/login`.

use leptos::prelude::*;
use leptos_router::components::Outlet;
use leptos_router::hooks::use_navigate;

use crate::components::loading_spinner::LoadingSpinner;
use crate::state::auth::AuthContext;
use crate::state::gate::GateState;
use crate::util::auth::install_unauth_redirect;

#[component]
pub fn ProtectedRoutes(auth: AuthContext) -> impl IntoView {
    let state = auth.state();
    install_unauth_redirect(state, use_navigate());

    let gate = Memo::new(move |_| state.with(|s| GateState::from(s)));

    view! {
        <Show
            when=move || gate.get() == GateState::Authorized
            fallback=move || {
                view! {
                    <div class="gate-page">
                        <LoadingSpinner message=gate.get().placeholder().unwrap_or_default()/>
                    </div>
                }
            }
        >
            <Outlet/>
        </Show>
    }
}
