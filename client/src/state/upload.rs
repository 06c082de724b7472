//! Upload/analyze form rules and the result card model.
//!
//! File contents are never read client-side; PDFs are recognized only to
//! tell the user to paste the text instead.

#[cfg(test)]
#[path = "upload_test.rs"]
mod upload_test;

use crate::net::api::{ApiError, FALLBACK_ERROR_MESSAGE};
use crate::net::types::{AnalysisRecord, UploadResponse, tax_line};
use crate::util::format::{NOT_AVAILABLE, format_brl, format_brl_opt};

/// `accept` attribute for the file input.
pub const ACCEPT_ATTR: &str = ".txt,.csv,.xls,.xlsx,.pdf";

pub const MISSING_INPUT_MESSAGE: &str = "Por favor, selecione um arquivo ou digite algum texto.";
pub const UNSUPPORTED_FILE_MESSAGE: &str = "Tipo de arquivo não suportado. Use TXT, CSV, XLS ou XLSX.";
pub const ANALYSIS_FAILED_MESSAGE: &str = "Erro ao processar análise. Tente novamente.";
pub const PDF_DISABLED_MESSAGE: &str =
    "A leitura de PDF está temporariamente desabilitada. Copie o texto do PDF e cole no campo abaixo.";

const ACCEPTED_EXTENSIONS: [&str; 4] = ["txt", "csv", "xls", "xlsx"];
const ACCEPTED_MIME_TYPES: [&str; 4] = [
    "text/plain",
    "text/csv",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

/// Check a selected file by extension or MIME type.
///
/// # Errors
///
/// Returns the message to show when the file cannot be submitted.
pub fn check_file(extension: Option<&str>, content_type: Option<&str>) -> Result<(), &'static str> {
    let extension = extension.map(str::to_ascii_lowercase);
    let is_pdf = extension.as_deref() == Some("pdf") || content_type == Some("application/pdf");
    if is_pdf {
        return Err(PDF_DISABLED_MESSAGE);
    }
    let ext_ok = extension.as_deref().is_some_and(|e| ACCEPTED_EXTENSIONS.contains(&e));
    let mime_ok = content_type.is_some_and(|m| ACCEPTED_MIME_TYPES.contains(&m));
    if ext_ok || mime_ok { Ok(()) } else { Err(UNSUPPORTED_FILE_MESSAGE) }
}

/// Banner text for a failed analysis request.
pub fn analysis_error_message(error: &ApiError) -> String {
    match error.message() {
        "" | FALLBACK_ERROR_MESSAGE => ANALYSIS_FAILED_MESSAGE.to_owned(),
        message => message.to_owned(),
    }
}

/// What the form will submit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmissionKind {
    File,
    Text,
}

/// A selected file takes precedence over typed text.
///
/// # Errors
///
/// Returns [`MISSING_INPUT_MESSAGE`] when neither is present.
pub fn submission_kind(has_file: bool, text: &str) -> Result<SubmissionKind, &'static str> {
    if has_file {
        Ok(SubmissionKind::File)
    } else if !text.trim().is_empty() {
        Ok(SubmissionKind::Text)
    } else {
        Err(MISSING_INPUT_MESSAGE)
    }
}

/// The "Análise Concluída" card.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultView {
    pub title: String,
    pub category: String,
    pub operation: String,
    pub amount: String,
    /// `(label, formatted value)` rows; `Total` last.
    pub taxes: Vec<(&'static str, String)>,
    pub insights: Vec<String>,
    pub summary: Option<String>,
    pub message: Option<String>,
}

const TAX_ROWS: [(&str, &str); 4] = [
    ("Simples Nacional", "simplesNacional"),
    ("IRPJ", "irpj"),
    ("CSLL", "csll"),
    ("Total", "total"),
];

impl ResultView {
    /// Prefer the AI extraction and fall back to the stored analysis.
    pub fn from_response(response: &UploadResponse) -> Self {
        let ai = response.ai_data.clone().unwrap_or_default();
        let analysis = response.analysis.clone().unwrap_or_else(AnalysisRecord::default);

        let taxes_json = if ai.impostos_calculados.is_object() { &ai.impostos_calculados } else { &analysis.taxes };
        let taxes = TAX_ROWS
            .iter()
            .map(|(label, key)| (*label, format_brl_opt(tax_line(taxes_json, key))))
            .collect();

        let insights = if ai.insights.is_empty() { analysis.insights.clone() } else { ai.insights.clone() };

        Self {
            title: analysis
                .title
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "Análise Financeira".to_owned()),
            category: first_text(ai.categoria.as_deref(), analysis.category.as_deref()),
            operation: first_text(ai.operacao.as_deref(), analysis.operation_type.as_deref()),
            amount: format_brl(ai.valor.or(analysis.amount).unwrap_or(0.0)),
            taxes,
            insights,
            summary: ai
                .resumo_mensal
                .clone()
                .or_else(|| analysis.monthly_summary.clone())
                .filter(|s| !s.trim().is_empty()),
            message: response.message.clone().filter(|m| !m.trim().is_empty()),
        }
    }
}

fn first_text(primary: Option<&str>, fallback: Option<&str>) -> String {
    primary
        .filter(|v| !v.trim().is_empty())
        .or_else(|| fallback.filter(|v| !v.trim().is_empty()))
        .unwrap_or(NOT_AVAILABLE)
        .to_owned()
}
