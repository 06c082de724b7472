//! Question/answer conversation for the insights tab.

#[cfg(test)]
#[path = "insights_test.rs"]
mod insights_test;

use crate::net::api::FALLBACK_ERROR_MESSAGE;
use crate::net::types::InsightAnswer;

/// Starter questions offered while the conversation is empty.
pub const SUGGESTED_QUESTIONS: [&str; 5] = [
    "Quais são meus maiores gastos?",
    "Como posso otimizar meus impostos?",
    "Qual foi minha receita total no último mês?",
    "Quais categorias têm mais movimentação?",
    "Há alguma tendência nos meus gastos?",
];

/// Shown when a failed request carries no message.
pub const ASK_FAILED_MESSAGE: &str = "Erro ao processar sua pergunta. Tente novamente.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
    Error,
}

impl MessageRole {
    pub fn heading(self) -> &'static str {
        match self {
            Self::User => "👤 Você",
            Self::Assistant => "🤖 Assistente IA",
            Self::Error => "❌ Erro",
        }
    }

    pub fn css_modifier(self) -> &'static str {
        match self {
            Self::User => "insight-message--user",
            Self::Assistant => "insight-message--assistant",
            Self::Error => "insight-message--error",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct InsightMessage {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    /// History size the assistant answered from.
    pub history_count: Option<u64>,
}

impl InsightMessage {
    fn new(role: MessageRole, content: String, history_count: Option<u64>) -> Self {
        Self { id: uuid::Uuid::new_v4().to_string(), role, content, history_count }
    }

    /// "Baseado em N registros" footnote for assistant answers.
    pub fn footnote(&self) -> Option<String> {
        self.history_count
            .filter(|n| *n > 0)
            .map(|n| format!("Baseado em {n} registros do seu histórico"))
    }
}

/// Conversation transcript plus the in-flight flag.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InsightsState {
    pub messages: Vec<InsightMessage>,
    pub pending: bool,
    /// Number of analyses available to the assistant, once known.
    pub history_count: Option<usize>,
}

impl InsightsState {
    /// Record the user's question. Returns the trimmed question to send, or
    /// `None` when it is blank or a request is already running.
    pub fn begin_question(&mut self, raw: &str) -> Option<String> {
        let question = raw.trim();
        if question.is_empty() || self.pending {
            return None;
        }
        self.messages.push(InsightMessage::new(MessageRole::User, question.to_owned(), None));
        self.pending = true;
        Some(question.to_owned())
    }

    pub fn finish_answer(&mut self, answer: InsightAnswer) {
        self.messages.push(InsightMessage::new(MessageRole::Assistant, answer.answer, answer.history_count));
        self.pending = false;
    }

    pub fn finish_error(&mut self, message: &str) {
        let content = match message.trim() {
            "" | FALLBACK_ERROR_MESSAGE => ASK_FAILED_MESSAGE,
            _ => message,
        };
        self.messages.push(InsightMessage::new(MessageRole::Error, content.to_owned(), None));
        self.pending = false;
    }

    pub fn show_suggestions(&self) -> bool {
        self.messages.is_empty()
    }

    /// The assistant has nothing to work with yet.
    pub fn insufficient_data(&self) -> bool {
        self.history_count == Some(0)
    }
}

/// Render assistant Markdown to HTML with raw HTML dropped.
pub fn render_answer_html(markdown: &str) -> String {
    use pulldown_cmark::{Event, Options, Parser, html};

    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    let parser = Parser::new_ext(markdown, options).filter(|event| !matches!(event, Event::Html(_) | Event::InlineHtml(_)));
    let mut output = String::new();
    html::push_html(&mut output, parser);
    output
}
