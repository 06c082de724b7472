//! Spinner shown while remote data or auth state is loading.

use leptos::prelude::*;

#[component]
pub fn LoadingSpinner(
    #[prop(optional)] small: bool,
    #[prop(optional, into)] message: Option<String>,
) -> impl IntoView {
    view! {
        <div class="loading-spinner" class:loading-spinner--small=small role="status">
            <span class="loading-spinner__wheel" aria-hidden="true"></span>
            {message.map(|text| view! { <span class="loading-spinner__message">{text}</span> })}
        </div>
    }
}
