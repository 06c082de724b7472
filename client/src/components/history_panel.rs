//! Analysis history tab.

use leptos::prelude::*;

use crate::components::loading_spinner::LoadingSpinner;
use crate::net::api::ApiClient;
use crate::net::types::AnalysisRecord;
use crate::state::history::{self, HistoryCard};
use crate::state::ui::LoadState;
use crate::util::clock::{local_offset, now_local};
use crate::util::pdf;
use crate::util::task::spawn_browser;

pub type HistorySignal = RwSignal<LoadState<Vec<AnalysisRecord>>>;

/// Fetch the history into `target`, showing the loading state meanwhile.
pub(crate) fn load_history(api: &ApiClient, target: HistorySignal) {
    target.set(LoadState::Loading);
    let api = api.clone();
    spawn_browser(async move {
        match api.analysis_history().await {
            Ok(records) => {
                leptos::logging::log!("history loaded: {} analyses", records.len());
                target.set(LoadState::Ready(records));
            }
            Err(err) => {
                leptos::logging::warn!("history load failed: status={:?} {}", err.status(), err.message());
                target.set(LoadState::Failed(history::LOAD_FAILED_MESSAGE.to_owned()));
            }
        }
    });
}

#[component]
pub fn HistoryPanel(api: ApiClient) -> impl IntoView {
    let records: HistorySignal = RwSignal::new(LoadState::Loading);
    load_history(&api, records);

    let reload = {
        let api = api.clone();
        move |_: leptos::ev::MouseEvent| load_history(&api, records)
    };
    let retry = reload.clone();

    let download = move |index: usize| {
        let record = records.with_untracked(|state| state.ready().and_then(|list| list.get(index).cloned()));
        if let Some(record) = record {
            if let Err(err) = pdf::export_analysis(&record, now_local()) {
                leptos::logging::warn!("pdf export failed: {err}");
            }
        }
    };

    view! {
        <section class="card history-panel">
            <header class="card__header">
                <h2 class="card__title">"Histórico de Análises"</h2>
                <button class="btn" on:click=reload disabled=move || records.with(LoadState::is_loading)>
                    "Atualizar"
                </button>
            </header>

            {move || {
                let state = records.get();
                if state.is_loading() {
                    return view! { <LoadingSpinner message="Carregando histórico..."/> }.into_any();
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
                let cards = state.ready().map(|list| history::history_cards(list, local_offset())).unwrap_or_default();
                if cards.is_empty() {
                    return view! {
                        <div class="empty-state">
                            <p>"Nenhuma análise encontrada"</p>
                            <p class="empty-state__hint">"Envie um texto ou planilha na aba Upload e Análise."</p>
                        </div>
                    }
                        .into_any();
                }
                cards
                    .into_iter()
                    .enumerate()
                    .map(|(index, card)| view! { <HistoryCardView card=card on_download=move |_: leptos::ev::MouseEvent| download(index)/> })
                    .collect::<Vec<_>>()
                    .into_any()
            }}
        </section>
    }
}

#[component]
fn HistoryCardView<F>(card: HistoryCard, on_download: F) -> impl IntoView
where
    F: Fn(leptos::ev::MouseEvent) + Send + Sync + 'static,
{
    let HistoryCard {
        key: _,
        title,
        category,
        operation_type,
        health,
        margin,
        amount,
        date,
        simples,
        regime,
        insights,
        summary,
        strategic_count,
    } = card;

    view! {
        <article class="history-card">
            <header class="history-card__header">
                <div>
                    <h3 class="history-card__title">{title}</h3>
                    <p class="history-card__meta">{category} " · " {operation_type}</p>
                </div>
                <div class="history-card__badges">
                    {health.map(|(label, tone)| view! { <span class={tone.css_class()}>{label}</span> })}
                    {margin.map(|value| view! { <span class="badge">"Margem: " {value}</span> })}
                </div>
            </header>

            <dl class="history-card__facts">
                <dt>"Valor"</dt>
                <dd class="history-card__amount">{amount}</dd>
                <dt>"Data"</dt>
                <dd>{date}</dd>
                <dt>"Simples Nacional"</dt>
                <dd>{simples}</dd>
                {regime.map(|value| view! { <dt>"Regime recomendado"</dt> <dd>{value}</dd> })}
            </dl>

            {(!insights.is_empty())
                .then(|| {
                    view! {
                        <ul class="history-card__insights">
                            {insights.into_iter().map(|line| view! { <li>"💡 " {line}</li> }).collect::<Vec<_>>()}
                        </ul>
                    }
                })}
            {summary.map(|text| view! { <p class="history-card__summary">{text}</p> })}

            <footer class="history-card__footer">
                {(strategic_count > 0)
                    .then(|| view! { <span>{format!("{strategic_count} insights estratégicos")}</span> })}
                <button class="btn btn--small" on:click=on_download>"PDF"</button>
            </footer>
        </article>
    }
}
