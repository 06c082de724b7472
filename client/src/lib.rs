//! # client
//!
//! Leptos + WASM frontend for the financial-analysis dashboard.
//!
//! This crate contains the identity session store, the auth context and
//! route gate, the REST client for the analysis backend, and the pages and
//! components of the dashboard. Browser-only IO is compiled under the
//! `hydrate` feature; everything else builds natively for tests and SSR.

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// WASM entry point: hydrate the server-rendered shell.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::hydrate_body(app::App);
}
