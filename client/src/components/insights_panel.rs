//! "Observações Inteligentes" tab: question/answer chat over the user's
//! analysis history.

use leptos::prelude::*;

use crate::components::loading_spinner::LoadingSpinner;
use crate::net::api::ApiClient;
use crate::state::insights::{InsightsState, MessageRole, SUGGESTED_QUESTIONS, render_answer_html};
use crate::util::task::spawn_browser;

#[component]
pub fn InsightsPanel(api: ApiClient) -> impl IntoView {
    let chat = RwSignal::new(InsightsState::default());
    let input = RwSignal::new(String::new());

    {
        let api = api.clone();
        spawn_browser(async move {
            match api.analysis_history().await {
                Ok(records) => chat.update(|state| state.history_count = Some(records.len())),
                Err(err) => leptos::logging::warn!("history count failed: {}", err.message()),
            }
        });
    }

    let ask = move |raw: String| {
        let Some(question) = chat.try_update(|state| state.begin_question(&raw)).flatten() else {
            return;
        };
        input.set(String::new());
        let api = api.clone();
        spawn_browser(async move {
            match api.ask_question(&question).await {
                Ok(answer) => chat.update(|state| state.finish_answer(answer)),
                Err(err) => {
                    leptos::logging::warn!("insight question failed: status={:?} {}", err.status(), err.message());
                    chat.update(|state| state.finish_error(err.message()));
                }
            }
        });
    };

    let on_submit = {
        let ask = ask.clone();
        move |ev: leptos::ev::SubmitEvent| {
            ev.prevent_default();
            ask(input.get_untracked());
        }
    };

    let pending = move || chat.with(|state| state.pending);

    view! {
        <section class="card insights-panel">
            <h2 class="card__title">"Observações Inteligentes"</h2>
            <p class="card__subtitle">
                "Faça perguntas sobre seus dados financeiros e receba insights baseados em IA."
                {move || {
                    chat.with(|state| state.history_count)
                        .filter(|count| *count > 0)
                        .map(|count| format!(" Analisando {count} registros do seu histórico."))
                }}
            </p>

            <div class="insights-panel__conversation">
                <Show when=move || chat.with(InsightsState::show_suggestions) && !pending()>
                    <p class="empty-state">"Faça uma pergunta para começar a conversa!"</p>
                </Show>
                {move || {
                    chat.get()
                        .messages
                        .into_iter()
                        .map(|message| {
                            let footnote = message.footnote();
                            let body = if message.role == MessageRole::Assistant {
                                view! {
                                    <div class="insight-message__markdown" inner_html={render_answer_html(&message.content)}></div>
                                }
                                    .into_any()
                            } else {
                                view! { <p class="insight-message__text">{message.content}</p> }.into_any()
                            };
                            view! {
                                <div class={format!("insight-message {}", message.role.css_modifier())}>
                                    <span class="insight-message__heading">{message.role.heading()}</span>
                                    {body}
                                    {footnote.map(|text| view! { <small class="insight-message__footnote">{text}</small> })}
                                </div>
                            }
                        })
                        .collect::<Vec<_>>()
                }}
                <Show when=pending>
                    <div class="insight-message insight-message--assistant">
                        <span class="insight-message__heading">{MessageRole::Assistant.heading()}</span>
                        <LoadingSpinner small=true/>
                    </div>
                </Show>
            </div>

            <Show when=move || chat.with(InsightsState::show_suggestions)>
                <div class="insights-panel__suggestions">
                    <p>"Perguntas sugeridas:"</p>
                    {SUGGESTED_QUESTIONS
                        .into_iter()
                        .map(|question| {
                            let ask = ask.clone();
                            view! {
                                <button class="btn btn--secondary" disabled=pending on:click=move |_| ask(question.to_owned())>
                                    {question}
                                </button>
                            }
                        })
                        .collect::<Vec<_>>()}
                </div>
            </Show>

            <form class="insights-panel__form" on:submit=on_submit>
                <input
                    class="insights-panel__input"
                    type="text"
                    placeholder="Digite sua pergunta sobre seus dados financeiros..."
                    disabled=pending
                    prop:value=move || input.get()
                    on:input=move |ev| input.set(event_target_value(&ev))
                />
                <button
                    class="btn btn--primary"
                    type="submit"
                    disabled=move || pending() || input.with(|text| text.trim().is_empty())
                >
                    "Enviar"
                </button>
            </form>

            <Show when=move || chat.with(InsightsState::insufficient_data)>
                <div class="banner banner--warning">
                    <strong>"⚠️ Dados Insuficientes"</strong>
                    <p>
                        "Para usar as Observações Inteligentes, você precisa primeiro fazer upload de alguns dados financeiros. "
                        "Vá para a aba \"Upload e Análise\" para começar."
                    </p>
                </div>
            </Show>
        </section>
    }
}
