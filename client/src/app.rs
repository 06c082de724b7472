//! Root application component with routing and the shared service handles.

use std::sync::Arc;

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{ParentRoute, Route, Router, Routes},
};

use crate::components::protected_routes::ProtectedRoutes;
use crate::config::ClientConfig;
use crate::net::api::ApiClient;
use crate::net::gotrue::GoTrueBackend;
use crate::net::http::BrowserTransport;
use crate::net::session::SessionStore;
use crate::pages::{dashboard::DashboardPage, login::LoginPage};
use crate::state::auth::AuthContext;

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="pt-BR">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Session store over the identity provider. The browser build persists to
/// `localStorage`; server renders keep an empty in-memory copy.
fn session_store(config: &ClientConfig) -> SessionStore {
    #[cfg(feature = "hydrate")]
    let backend = GoTrueBackend::browser(config);
    #[cfg(not(feature = "hydrate"))]
    let backend = GoTrueBackend::new(
        config,
        Arc::new(BrowserTransport),
        Arc::new(crate::net::gotrue::MemoryPersistence::default()),
        crate::util::clock::now_unix,
    );
    SessionStore::new(backend)
}

/// Root application component.
///
/// Builds the one `AuthContext` and `ApiClient` of the app and hands them to
/// every route explicitly.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let config = ClientConfig::from_build_env();
    if !config.identity_configured() {
        leptos::logging::warn!("identity provider not configured; sign-in disabled");
    }

    let store = session_store(&config);
    let auth = AuthContext::new(store.clone());
    let api = ApiClient::new(&config.backend_url, Arc::new(BrowserTransport), Arc::new(store));

    #[cfg(feature = "hydrate")]
    {
        crate::net::session::spawn_background_sync(auth.store());
        let activating = auth.clone();
        leptos::task::spawn_local(async move { activating.activate().await });
    }
    let teardown = auth.clone();
    on_cleanup(move || teardown.teardown());

    let login = {
        let auth = auth.clone();
        move || view! { <LoginPage auth=auth.clone()/> }
    };
    let fallback = login.clone();
    let guard = {
        let auth = auth.clone();
        move || view! { <ProtectedRoutes auth=auth.clone()/> }
    };
    let dashboard = move || view! { <DashboardPage auth=auth.clone() api=api.clone()/> };
    let dashboard_root = dashboard.clone();

    view! {
        <Stylesheet id="leptos" href="/pkg/finsight.css"/>
        <Title text="Financial AI"/>

        <Router>
            <Routes fallback=fallback>
                <Route path=StaticSegment("login") view=login/>
                <ParentRoute path=StaticSegment("") view=guard>
                    <Route path=StaticSegment("") view=dashboard_root/>
                    <Route path=StaticSegment("dashboard") view=dashboard/>
                </ParentRoute>
            </Routes>
        </Router>
    }
}
