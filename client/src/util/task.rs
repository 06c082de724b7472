//! Browser task helper.

use std::future::Future;

/// Run `task` on the browser event loop.
///
/// Server renders never issue client requests, so the future is dropped
/// unpolled there.
pub fn spawn_browser(task: impl Future<Output = ()> + 'static) {
    #[cfg(feature = "hydrate")]
    leptos::task::spawn_local(task);
    #[cfg(not(feature = "hydrate"))]
    drop(task);
}
