//! Upcoming tax deadlines side column.

use leptos::prelude::*;

use crate::components::loading_spinner::LoadingSpinner;
use crate::net::api::ApiClient;
use crate::net::types::TaxDeadline;
use crate::state::reminders::{ReminderCard, ReminderSource, reminder_cards, resolve_deadlines};
use crate::state::ui::LoadState;
use crate::util::clock::now_local;
use crate::util::task::spawn_browser;

const LOAD_FAILED_MESSAGE: &str = "Erro ao carregar prazos fiscais";

type DeadlineSignal = RwSignal<LoadState<(Vec<TaxDeadline>, ReminderSource)>>;

fn load_deadlines(api: &ApiClient, target: DeadlineSignal) {
    target.set(LoadState::Loading);
    let api = api.clone();
    spawn_browser(async move {
        match api.tax_deadlines().await {
            Ok(fetched) => target.set(LoadState::Ready(resolve_deadlines(fetched, now_local()))),
            Err(err) => {
                leptos::logging::warn!("tax deadlines failed: status={:?} {}", err.status(), err.message());
                target.set(LoadState::Failed(LOAD_FAILED_MESSAGE.to_owned()));
            }
        }
    });
}

#[component]
pub fn TaxReminders(api: ApiClient) -> impl IntoView {
    let deadlines: DeadlineSignal = RwSignal::new(LoadState::Loading);
    load_deadlines(&api, deadlines);
    let retry = move |_: leptos::ev::MouseEvent| load_deadlines(&api, deadlines);

    view! {
        <aside class="card tax-reminders">
            <h2 class="card__title">"🔔 Próximos Prazos Fiscais"</h2>
            {move || {
                let state = deadlines.get();
                if state.is_loading() {
                    return view! { <LoadingSpinner small=true message="Carregando prazos fiscais..."/> }.into_any();
                }
                if let Some(message) = state.error() {
                    let retry = retry.clone();
                    return view! {
                        <div class="banner banner--error">
                            <span>{message.to_owned()}</span>
                            <button class="btn" on:click=retry>"Tentar Novamente"</button>
                        </div>
                    }
                        .into_any();
                }
                let Some((list, source)) = state.ready() else {
                    return ().into_any();
                };
                let cards = reminder_cards(list, now_local());
                if cards.is_empty() {
                    return view! { <p class="empty-state">"Nenhum prazo fiscal próximo encontrado."</p> }.into_any();
                }
                let standard = *source == ReminderSource::StandardCalendar;
                view! {
                    {standard.then(|| view! { <p class="tax-reminders__source">"Calendário fiscal padrão"</p> })}
                    <ul class="tax-reminders__list">
                        {cards.into_iter().map(|card| view! { <ReminderItem card=card/> }).collect::<Vec<_>>()}
                    </ul>
                }
                    .into_any()
            }}
        </aside>
    }
}

#[component]
fn ReminderItem(card: ReminderCard) -> impl IntoView {
    let class = format!("reminder {}", card.priority_class());
    let ReminderCard { name, description, amount, due_date, urgent, badge, kind_label, .. } = card;

    view! {
        <li class=class class:reminder--urgent=urgent>
            <div class="reminder__header">
                <strong class="reminder__name">{name}</strong>
                <span class="reminder__badge">{badge}</span>
            </div>
            <p class="reminder__description">{description}</p>
            <div class="reminder__meta">
                <span>"Vencimento: " {due_date}</span>
                <span class="reminder__kind">{kind_label}</span>
            </div>
            {amount.map(|value| view! { <div class="reminder__amount">"Valor: " {value}</div> })}
        </li>
    }
}
