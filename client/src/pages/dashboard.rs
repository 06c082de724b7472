//! Dashboard page: header, tab strip and the tax-reminder column.
//!
//! SYSTEM CONTEXT
//! ==============
//! Mounted under the protected route, so a session is present whenever this
//! renders. Signing out clears the session; the route guard then performs
//! the redirect to `/login`.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use leptos::prelude::*;

use crate::components::charts_panel::ChartsPanel;
use crate::components::history_panel::HistoryPanel;
use crate::components::insights_panel::InsightsPanel;
use crate::components::tax_reminders::TaxReminders;
use crate::components::upload_panel::UploadPanel;
use crate::net::api::ApiClient;
use crate::state::auth::{AuthContext, AuthState};
use crate::state::ui::DashboardTab;
use crate::util::task::spawn_browser;

/// `Olá, <name>!` using the display name, else the email.
fn greeting(state: &AuthState) -> String {
    match state.user().map(|user| user.greeting_name()).filter(|name| !name.is_empty()) {
        Some(name) => format!("Olá, {name}!"),
        None => "Olá!".to_owned(),
    }
}

#[component]
pub fn DashboardPage(auth: AuthContext, api: ApiClient) -> impl IntoView {
    let state = auth.state();
    let tab = RwSignal::new(DashboardTab::default());
    let signing_out = RwSignal::new(false);

    let on_sign_out = move |_: leptos::ev::MouseEvent| {
        if signing_out.get_untracked() {
            return;
        }
        signing_out.set(true);
        let auth = auth.clone();
        spawn_browser(async move {
            auth.sign_out().await;
            signing_out.set(false);
        });
    };

    let side_api = api.clone();

    view! {
        <div class="dashboard-page">
            <header class="dashboard-page__header">
                <div>
                    <h1>"Financial AI"</h1>
                    <p class="dashboard-page__greeting">{move || state.with(greeting)}</p>
                </div>
                <button class="btn btn--secondary" on:click=on_sign_out disabled=move || signing_out.get()>
                    "Sair"
                </button>
            </header>

            <nav class="dashboard-page__tabs" role="tablist">
                {DashboardTab::ALL
                    .into_iter()
                    .map(|item| {
                        view! {
                            <button
                                class="tab"
                                class:tab--active=move || tab.get() == item
                                role="tab"
                                aria-selected=move || (tab.get() == item).to_string()
                                on:click=move |_| tab.set(item)
                            >
                                {format!("{} {}", item.icon(), item.label())}
                            </button>
                        }
                    })
                    .collect::<Vec<_>>()}
            </nav>

            <div class="dashboard-page__grid">
                <main class="dashboard-page__main">
                    {move || {
                        let api = api.clone();
                        match tab.get() {
                            DashboardTab::Upload => view! { <UploadPanel api=api/> }.into_any(),
                            DashboardTab::History => view! { <HistoryPanel api=api/> }.into_any(),
                            DashboardTab::Charts => view! { <ChartsPanel api=api/> }.into_any(),
                            DashboardTab::Insights => view! { <InsightsPanel api=api/> }.into_any(),
                        }
                    }}
                </main>
                <TaxReminders api=side_api/>
            </div>
        </div>
    }
}
