//! Charts tab: category and monthly totals drawn as CSS bars, plus the
//! summary PDF export.

use leptos::prelude::*;

use crate::components::history_panel::{HistorySignal, load_history};
use crate::components::loading_spinner::LoadingSpinner;
use crate::net::api::ApiClient;
use crate::state::charts::{Bar, chart_data};
use crate::state::ui::LoadState;
use crate::util::clock::{local_offset, now_local};
use crate::util::format::format_brl;
use crate::util::pdf;

#[component]
pub fn ChartsPanel(api: ApiClient) -> impl IntoView {
    let records: HistorySignal = RwSignal::new(LoadState::Loading);
    load_history(&api, records);

    let export_error = RwSignal::new(None::<String>);
    let on_export = move |_: leptos::ev::MouseEvent| {
        let result = records.with_untracked(|state| {
            state.ready().map(|list| pdf::export_summary(list, now_local()))
        });
        match result {
            Some(Err(err)) => {
                leptos::logging::warn!("pdf export failed: {err}");
                export_error.set(Some("Não foi possível gerar o PDF.".to_owned()));
            }
            _ => export_error.set(None),
        }
    };

    let retry = move |_: leptos::ev::MouseEvent| load_history(&api, records);

    view! {
        <section class="card charts-panel">
            <header class="card__header">
                <h2 class="card__title">"Gráficos Financeiros"</h2>
                <button
                    class="btn btn--primary"
                    on:click=on_export
                    disabled=move || records.with(|state| state.ready().is_none_or(Vec::is_empty))
                >
                    "Gerar Relatório PDF"
                </button>
            </header>
            <Show when=move || export_error.get().is_some()>
                <p class="banner banner--error">{move || export_error.get().unwrap_or_default()}</p>
            </Show>

            {move || {
                let state = records.get();
                if state.is_loading() {
                    return view! { <LoadingSpinner message="Carregando gráficos..."/> }.into_any();
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
                let data = state.ready().map(|list| chart_data(list, local_offset())).unwrap_or_default();
                if data.is_empty() {
                    return view! {
                        <div class="empty-state">
                            <p>"Nenhum dado para análise"</p>
                            <p class="empty-state__hint">"Faça algumas análises para ver os gráficos."</p>
                        </div>
                    }
                        .into_any();
                }
                let category_count = data.category_count();
                view! {
                    <div class="charts-panel__tiles">
                        <SummaryTile label="Total Analisado" value={format_brl(data.total_amount)}/>
                        <SummaryTile label="Operações" value={data.operations.to_string()}/>
                        <SummaryTile label="Categorias" value={category_count.to_string()}/>
                        <SummaryTile label="Impostos Estimados" value={format_brl(data.estimated_taxes)}/>
                    </div>
                    <BarChart title="📈 Distribuição por Categoria" bars={data.categories} colored=true/>
                    <BarChart title="📅 Evolução Mensal" bars={data.months} colored=false/>
                }
                    .into_any()
            }}
        </section>
    }
}

#[component]
fn SummaryTile(label: &'static str, value: String) -> impl IntoView {
    view! {
        <div class="summary-tile">
            <span class="summary-tile__label">{label}</span>
            <strong class="summary-tile__value">{value}</strong>
        </div>
    }
}

#[component]
fn BarChart(title: &'static str, bars: Vec<Bar>, colored: bool) -> impl IntoView {
    view! {
        <div class="bar-chart">
            <h3 class="bar-chart__title">{title}</h3>
            <div class="bar-chart__bars">
                {bars
                    .into_iter()
                    .map(|bar| {
                        let style = if colored {
                            format!("height: {:.0}px; background: hsl({}, 65%, 55%);", bar.height_px, bar.hue)
                        } else {
                            format!("height: {:.0}px;", bar.height_px)
                        };
                        let short = bar.short_amount();
                        view! {
                            <div class="bar-chart__column" title={format_brl(bar.amount)}>
                                <span class="bar-chart__value">{short}</span>
                                <div class="bar-chart__bar" style=style></div>
                                <span class="bar-chart__label">{bar.label}</span>
                            </div>
                        }
                    })
                    .collect::<Vec<_>>()}
            </div>
        </div>
    }
}
