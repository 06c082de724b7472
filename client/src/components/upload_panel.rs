//! Upload/analyze tab: free text or a spreadsheet sent for AI analysis.
//!
//! SYSTEM CONTEXT
//! ==============
//! Validation and the result card model live in `state::upload`; this
//! component owns the form signals and the request lifecycle.

use leptos::prelude::*;

use crate::components::loading_spinner::LoadingSpinner;
use crate::net::api::ApiClient;
use crate::net::http::UploadFile;
use crate::net::types::AnalysisRecord;
use crate::state::upload::{self, ResultView, SubmissionKind};
use crate::util::clock::now_local;
use crate::util::pdf;
use crate::util::task::spawn_browser;

#[component]
pub fn UploadPanel(api: ApiClient) -> impl IntoView {
    let text = RwSignal::new(String::new());
    let file_name = RwSignal::new(None::<String>);
    let selected = StoredValue::new_local(None::<UploadFile>);
    let busy = RwSignal::new(false);
    let error = RwSignal::new(None::<String>);
    let result = RwSignal::new(None::<ResultView>);
    let record = RwSignal::new(None::<AnalysisRecord>);
    let file_input = NodeRef::<leptos::html::Input>::new();

    let select_file = move |file: Option<UploadFile>| {
        error.set(None);
        let Some(file) = file else {
            selected.set_value(None);
            file_name.set(None);
            return;
        };
        match upload::check_file(file.extension().as_deref(), file.content_type.as_deref()) {
            Ok(()) => {
                file_name.set(Some(file.name.clone()));
                selected.set_value(Some(file));
            }
            Err(message) => {
                error.set(Some(message.to_owned()));
                selected.set_value(None);
                file_name.set(None);
                if let Some(input) = file_input.get_untracked() {
                    input.set_value("");
                }
            }
        }
    };

    let on_file_change = move |ev: leptos::ev::Event| {
        #[cfg(feature = "hydrate")]
        {
            use wasm_bindgen::JsCast;
            let file = ev
                .target()
                .and_then(|target| target.dyn_into::<web_sys::HtmlInputElement>().ok())
                .and_then(|input| input.files())
                .and_then(|files| files.get(0))
                .map(UploadFile::from_browser);
            select_file(file);
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = ev;
            select_file(None);
        }
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        let file = selected.with_value(Clone::clone);
        let text_value = text.get_untracked();
        let kind = match upload::submission_kind(file.is_some(), &text_value) {
            Ok(kind) => kind,
            Err(message) => {
                error.set(Some(message.to_owned()));
                return;
            }
        };

        busy.set(true);
        error.set(None);
        result.set(None);
        record.set(None);

        let api = api.clone();
        spawn_browser(async move {
            let outcome = match (kind, file) {
                (SubmissionKind::File, Some(file)) => api.upload_analysis_file(file).await,
                _ => api.analyze_text(text_value.trim()).await,
            };
            match outcome {
                Ok(response) => {
                    result.set(Some(ResultView::from_response(&response)));
                    record.set(response.analysis);
                    text.set(String::new());
                    selected.set_value(None);
                    file_name.set(None);
                    if let Some(input) = file_input.get_untracked() {
                        input.set_value("");
                    }
                }
                Err(err) => {
                    leptos::logging::warn!("analysis failed: status={:?} {}", err.status(), err.message());
                    error.set(Some(upload::analysis_error_message(&err)));
                }
            }
            busy.set(false);
        });
    };

    let on_download = move |_: leptos::ev::MouseEvent| {
        let Some(analysis) = record.get_untracked() else {
            return;
        };
        if let Err(err) = pdf::export_analysis(&analysis, now_local()) {
            leptos::logging::warn!("pdf export failed: {err}");
        }
    };

    view! {
        <section class="card upload-panel">
            <h2 class="card__title">"Upload e Análise"</h2>
            <p class="card__subtitle">
                "Descreva uma operação financeira ou envie uma planilha (TXT, CSV, XLS, XLSX)."
            </p>

            <form class="upload-panel__form" on:submit=on_submit>
                <label class="upload-panel__label">
                    "Arquivo"
                    <input
                        class="upload-panel__file"
                        type="file"
                        accept=upload::ACCEPT_ATTR
                        node_ref=file_input
                        disabled=move || busy.get()
                        on:change=on_file_change
                    />
                </label>
                <Show when=move || file_name.get().is_some()>
                    <p class="upload-panel__selected">
                        "Selecionado: "
                        <strong>{move || file_name.get().unwrap_or_default()}</strong>
                    </p>
                </Show>

                <label class="upload-panel__label">
                    "Ou digite o texto"
                    <textarea
                        class="upload-panel__text"
                        rows="6"
                        placeholder="Ex.: Venda de serviços de consultoria no valor de R$ 8.000,00"
                        disabled=move || busy.get()
                        prop:value=move || text.get()
                        on:input=move |ev| text.set(event_target_value(&ev))
                    ></textarea>
                </label>

                <Show when=move || error.get().is_some()>
                    <p class="banner banner--error">{move || error.get().unwrap_or_default()}</p>
                </Show>

                <button class="btn btn--primary" type="submit" disabled=move || busy.get()>
                    {move || if busy.get() { "Analisando..." } else { "Analisar" }}
                </button>
            </form>

            <Show when=move || busy.get()>
                <LoadingSpinner message="Processando análise..."/>
            </Show>

            {move || result.get().map(|card| view! { <ResultCard card=card on_download=on_download/> })}
        </section>
    }
}

#[component]
fn ResultCard<F>(card: ResultView, on_download: F) -> impl IntoView
where
    F: Fn(leptos::ev::MouseEvent) + Clone + Send + Sync + 'static,
{
    let ResultView { title, category, operation, amount, taxes, insights, summary, message } = card;

    view! {
        <article class="result-card">
            <header class="result-card__header">
                <h3>"Análise Concluída"</h3>
                <button class="btn" on:click=on_download>"Baixar PDF"</button>
            </header>
            {message.map(|text| view! { <p class="result-card__message">{text}</p> })}
            <h4 class="result-card__title">{title}</h4>
            <dl class="result-card__facts">
                <dt>"Valor"</dt>
                <dd>{amount}</dd>
                <dt>"Categoria"</dt>
                <dd>{category}</dd>
                <dt>"Operação"</dt>
                <dd>{operation}</dd>
            </dl>

            <h5>"Impostos Calculados"</h5>
            <table class="result-card__taxes">
                <tbody>
                    {taxes
                        .into_iter()
                        .map(|(label, value)| {
                            view! {
                                <tr class:result-card__total={label == "Total"}>
                                    <th>{label}</th>
                                    <td>{value}</td>
                                </tr>
                            }
                        })
                        .collect::<Vec<_>>()}
                </tbody>
            </table>

            {(!insights.is_empty())
                .then(|| {
                    view! {
                        <h5>"Observações"</h5>
                        <ul class="result-card__insights">
                            {insights.into_iter().map(|item| view! { <li>{item}</li> }).collect::<Vec<_>>()}
                        </ul>
                    }
                })}

            {summary
                .map(|text| {
                    view! {
                        <div class="result-card__summary">
                            <strong>"Resumo: "</strong>
                            {text}
                        </div>
                    }
                })}
        </article>
    }
}
