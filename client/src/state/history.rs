//! Display model for the analysis history list.
//!
//! Every field of a record is optional on the wire; a card always renders,
//! with placeholders standing in for whatever is missing.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use time::UtcOffset;

use crate::net::types::AnalysisRecord;
use crate::util::format::{NOT_AVAILABLE, format_brl, format_brl_opt, format_timestamp_br, truncate};

pub const LOAD_FAILED_MESSAGE: &str = "Erro ao carregar histórico";

/// Insights shown per card.
pub const CARD_INSIGHT_LIMIT: usize = 2;
/// Character limit for each insight line.
pub const INSIGHT_CHARS: usize = 80;
/// Character limit for the monthly summary.
pub const SUMMARY_CHARS: usize = 120;

/// Financial health badge tone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HealthTone {
    Excellent,
    Good,
    Regular,
    Poor,
}

impl HealthTone {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "ótima" | "otima" | "excelente" => Self::Excellent,
            "boa" => Self::Good,
            "regular" => Self::Regular,
            _ => Self::Poor,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Excellent => "badge badge--excellent",
            Self::Good => "badge badge--good",
            Self::Regular => "badge badge--regular",
            Self::Poor => "badge badge--poor",
        }
    }
}

/// One rendered history card.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryCard {
    pub key: String,
    pub title: String,
    pub category: String,
    pub operation_type: String,
    pub health: Option<(String, HealthTone)>,
    pub margin: Option<String>,
    pub amount: String,
    pub date: String,
    pub simples: String,
    pub regime: Option<String>,
    pub insights: Vec<String>,
    pub summary: Option<String>,
    pub strategic_count: usize,
}

impl HistoryCard {
    /// Build the card for `record`, the `index`-th entry of the list.
    pub fn from_record(record: &AnalysisRecord, index: usize, offset: UtcOffset) -> Self {
        Self {
            key: record.id.clone().unwrap_or_else(|| format!("idx-{index}")),
            title: record.title.clone().unwrap_or_else(|| "Análise Financeira".to_owned()),
            category: record.category.clone().unwrap_or_else(|| "Sem categoria".to_owned()),
            operation_type: record.operation_type.clone().unwrap_or_else(|| NOT_AVAILABLE.to_owned()),
            health: record
                .financial_health()
                .map(|label| (label.to_owned(), HealthTone::from_label(label))),
            margin: record.profit_margin(),
            amount: format_brl(record.amount.unwrap_or(0.0)),
            date: format_timestamp_br(record.created_at.as_deref(), offset),
            simples: format_brl_opt(record.estimated_tax()),
            regime: record.recommended_regime().map(str::to_owned),
            insights: record
                .insights
                .iter()
                .take(CARD_INSIGHT_LIMIT)
                .map(|line| truncate(line, INSIGHT_CHARS))
                .collect(),
            summary: record
                .monthly_summary
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(|s| truncate(s, SUMMARY_CHARS)),
            strategic_count: record.strategic_insights.len(),
        }
    }
}

/// Cards for a whole history list, preserving backend order.
pub fn history_cards(records: &[AnalysisRecord], offset: UtcOffset) -> Vec<HistoryCard> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| HistoryCard::from_record(record, index, offset))
        .collect()
}
