//! Text-only PDF reports for the analysis history.
//!
//! ARCHITECTURE
//! ============
//! `PdfDocument` collects positioned text runs per A4 page (millimetres,
//! top-left origin) and serializes them as a minimal PDF 1.4 file using the
//! built-in Helvetica font with WinAnsi encoding. Report builders are pure;
//! only `download` touches the browser.

#[cfg(test)]
#[path = "pdf_test.rs"]
mod pdf_test;

use std::fmt::Write as _;

use time::OffsetDateTime;

use crate::net::types::AnalysisRecord;
use crate::util::format::{NOT_AVAILABLE, format_brl, format_brl_opt, format_date_br, format_timestamp_br, slugify};

pub const PAGE_WIDTH_MM: f64 = 210.0;
pub const PAGE_HEIGHT_MM: f64 = 297.0;
/// First baseline on a fresh page.
pub const TOP_MARGIN_MM: f64 = 20.0;
/// A new page starts once the cursor passes this line.
pub const PAGE_BREAK_MM: f64 = 250.0;
/// Latest analyses listed in the summary report.
pub const SUMMARY_ENTRY_LIMIT: usize = 10;
pub const SUMMARY_FILE_NAME: &str = "relatorio-financeiro-resumo.pdf";

const PT_PER_MM: f64 = 72.0 / 25.4;
const WRAP_COLUMNS: usize = 90;

const HEADING: Rgb = Rgb(44, 62, 80);
const MUTED: Rgb = Rgb(128, 128, 128);
const BODY: Rgb = Rgb(0, 0, 0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Clone, Debug, PartialEq)]
struct TextRun {
    x_mm: f64,
    y_mm: f64,
    size: f64,
    color: Rgb,
    text: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PdfExportError {
    #[error("browser api failed: {0}")]
    Browser(String),
    #[error("pdf download requires a browser")]
    Unavailable,
}

/// An in-memory PDF made of text runs.
#[derive(Clone, Debug, PartialEq)]
pub struct PdfDocument {
    pages: Vec<Vec<TextRun>>,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self { pages: vec![Vec::new()] }
    }
}

impl PdfDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_page(&mut self) {
        self.pages.push(Vec::new());
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Text runs on `page`, in drawing order.
    pub fn page_text(&self, page: usize) -> Vec<&str> {
        self.pages
            .get(page)
            .map(|runs| runs.iter().map(|run| run.text.as_str()).collect())
            .unwrap_or_default()
    }

    /// Place `text` with its baseline at (`x_mm`, `y_mm`) on the current page.
    pub fn text(&mut self, x_mm: f64, y_mm: f64, size: f64, color: Rgb, text: impl Into<String>) {
        if let Some(page) = self.pages.last_mut() {
            page.push(TextRun { x_mm, y_mm, size, color, text: text.into() });
        }
    }

    /// Serialize to PDF 1.4 bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let page_count = self.pages.len();
        // 1 catalog, 2 page tree, 3 font, then (page, contents) pairs.
        let page_id = |index: usize| 4 + index * 2;

        let mut objects: Vec<Vec<u8>> = Vec::with_capacity(3 + page_count * 2);
        objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());
        let kids = (0..page_count).map(|i| format!("{} 0 R", page_id(i))).collect::<Vec<_>>().join(" ");
        objects.push(format!("<< /Type /Pages /Kids [{kids}] /Count {page_count} >>").into_bytes());
        objects.push(b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_vec());

        for (index, runs) in self.pages.iter().enumerate() {
            let page = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {w:.2} {h:.2}] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {c} 0 R >>",
                w = PAGE_WIDTH_MM * PT_PER_MM,
                h = PAGE_HEIGHT_MM * PT_PER_MM,
                c = page_id(index) + 1,
            );
            objects.push(page.into_bytes());

            let stream = content_stream(runs);
            let mut contents = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
            contents.extend_from_slice(&stream);
            contents.extend_from_slice(b"\nendstream");
            objects.push(contents);
        }

        let mut out = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (index, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n", index + 1).as_bytes());
            out.extend_from_slice(body);
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref_at = out.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            let _ = writeln!(xref, "{offset:010} 00000 n ");
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
            objects.len() + 1
        );
        out.extend_from_slice(xref.as_bytes());
        out
    }
}

fn content_stream(runs: &[TextRun]) -> Vec<u8> {
    let mut stream = Vec::new();
    for run in runs {
        let Rgb(r, g, b) = run.color;
        let header = format!(
            "BT /F1 {size:.1} Tf {r:.3} {g:.3} {b:.3} rg {x:.2} {y:.2} Td (",
            size = run.size,
            r = f64::from(r) / 255.0,
            g = f64::from(g) / 255.0,
            b = f64::from(b) / 255.0,
            x = run.x_mm * PT_PER_MM,
            y = (PAGE_HEIGHT_MM - run.y_mm) * PT_PER_MM,
        );
        stream.extend_from_slice(header.as_bytes());
        stream.extend_from_slice(&encode_literal(&run.text));
        stream.extend_from_slice(b") Tj ET\n");
    }
    stream
}

/// WinAnsi bytes for a PDF string literal, with `(`, `)` and `\` escaped.
/// Characters outside the code page become `?`.
pub fn encode_literal(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        let byte = win_ansi(ch);
        if matches!(byte, b'(' | b')' | b'\\') {
            out.push(b'\\');
        }
        out.push(byte);
    }
    out
}

fn win_ansi(ch: char) -> u8 {
    match ch {
        '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => u8::try_from(u32::from(ch)).unwrap_or(b'?'),
        '€' => 0x80,
        '…' => 0x85,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        _ => b'?',
    }
}

/// Greedy word wrap at `columns` characters.
pub fn wrap(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let needed = if line.is_empty() { word.chars().count() } else { line.chars().count() + 1 + word.chars().count() };
        if needed > columns && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Vertical layout cursor that breaks pages past [`PAGE_BREAK_MM`].
struct Cursor {
    doc: PdfDocument,
    y: f64,
}

impl Cursor {
    fn new() -> Self {
        Self { doc: PdfDocument::new(), y: TOP_MARGIN_MM }
    }

    fn ensure_room(&mut self) {
        if self.y > PAGE_BREAK_MM {
            self.doc.add_page();
            self.y = TOP_MARGIN_MM;
        }
    }

    fn line(&mut self, x: f64, size: f64, color: Rgb, text: impl Into<String>, advance: f64) {
        self.doc.text(x, self.y, size, color, text);
        self.y += advance;
    }

    fn paragraph(&mut self, x: f64, text: &str) {
        for line in wrap(text, WRAP_COLUMNS) {
            self.ensure_room();
            self.line(x, 10.0, BODY, line, 5.0);
        }
    }

    fn finish(self) -> PdfDocument {
        self.doc
    }
}

fn record_title(record: &AnalysisRecord) -> &str {
    record.title.as_deref().filter(|t| !t.trim().is_empty()).unwrap_or("Análise Financeira")
}

/// Executive summary of `records` (newest first), issued at `issued`.
pub fn summary_report(records: &[AnalysisRecord], issued: OffsetDateTime) -> PdfDocument {
    let offset = issued.offset();
    let mut cursor = Cursor::new();
    cursor.line(20.0, 20.0, HEADING, "Relatório Financeiro - Resumo Executivo", 15.0);
    cursor.line(20.0, 10.0, MUTED, format!("Emitido em: {}", format_date_br(issued, offset)), 20.0);

    cursor.line(20.0, 16.0, HEADING, "Resumo Geral", 10.0);
    let total_amount: f64 = records.iter().filter_map(|r| r.amount).sum();
    let total_taxes: f64 = records.iter().filter_map(AnalysisRecord::estimated_tax).sum();
    cursor.line(20.0, 10.0, BODY, format!("Total de Operações: {}", records.len()), 6.0);
    cursor.line(20.0, 10.0, BODY, format!("Valor Total Analisado: {}", format_brl(total_amount)), 6.0);
    cursor.line(20.0, 10.0, BODY, format!("Impostos Estimados: {}", format_brl(total_taxes)), 15.0);

    cursor.line(20.0, 14.0, HEADING, "Últimas Análises", 10.0);
    for (index, record) in records.iter().take(SUMMARY_ENTRY_LIMIT).enumerate() {
        cursor.ensure_room();
        cursor.line(25.0, 10.0, BODY, format!("{}. {}", index + 1, record_title(record)), 5.0);
        cursor.line(
            25.0,
            10.0,
            BODY,
            format!(
                "   Valor: {} | Categoria: {}",
                format_brl_opt(record.amount),
                record.category.as_deref().unwrap_or(NOT_AVAILABLE)
            ),
            5.0,
        );
        cursor.line(
            25.0,
            10.0,
            BODY,
            format!("   Data: {}", format_timestamp_br(record.created_at.as_deref(), offset)),
            8.0,
        );
    }
    cursor.finish()
}

/// Detailed report for one analysis.
pub fn analysis_report(record: &AnalysisRecord, issued: OffsetDateTime) -> PdfDocument {
    let offset = issued.offset();
    let mut cursor = Cursor::new();
    cursor.line(20.0, 18.0, HEADING, format!("Relatório Financeiro - {}", record_title(record)), 12.0);
    cursor.line(20.0, 10.0, MUTED, format!("Emitido em: {}", format_date_br(issued, offset)), 15.0);

    cursor.line(20.0, 14.0, HEADING, "Dados da Operação", 8.0);
    let rows = [
        ("Categoria", record.category.clone().unwrap_or_else(|| NOT_AVAILABLE.to_owned())),
        ("Tipo", record.operation_type.clone().unwrap_or_else(|| NOT_AVAILABLE.to_owned())),
        ("Valor", format_brl_opt(record.amount)),
        ("Data", format_timestamp_br(record.created_at.as_deref(), offset)),
        ("Saúde Financeira", record.financial_health().unwrap_or(NOT_AVAILABLE).to_owned()),
        ("Margem de Lucro", record.profit_margin().unwrap_or_else(|| NOT_AVAILABLE.to_owned())),
        ("Regime Recomendado", record.recommended_regime().unwrap_or(NOT_AVAILABLE).to_owned()),
    ];
    for (label, value) in rows {
        cursor.line(25.0, 10.0, BODY, format!("{label}: {value}"), 6.0);
    }
    cursor.y += 6.0;

    cursor.ensure_room();
    cursor.line(20.0, 14.0, HEADING, "Impostos Calculados", 8.0);
    for (label, key) in [("Simples Nacional", "simplesNacional"), ("IRPJ", "irpj"), ("CSLL", "csll"), ("Total", "total")] {
        cursor.ensure_room();
        cursor.line(25.0, 10.0, BODY, format!("{label}: {}", format_brl_opt(record.tax_value(key))), 6.0);
    }

    let sections: [(&str, &[String]); 2] =
        [("Observações", &record.insights), ("Insights Estratégicos", &record.strategic_insights)];
    for (heading, items) in sections {
        if items.is_empty() {
            continue;
        }
        cursor.y += 6.0;
        cursor.ensure_room();
        cursor.line(20.0, 14.0, HEADING, heading, 8.0);
        for item in items {
            cursor.paragraph(25.0, &format!("• {item}"));
        }
    }

    if let Some(summary) = record.monthly_summary.as_deref().filter(|s| !s.trim().is_empty()) {
        cursor.y += 6.0;
        cursor.ensure_room();
        cursor.line(20.0, 14.0, HEADING, "Resumo Mensal", 8.0);
        cursor.paragraph(25.0, summary);
    }
    cursor.finish()
}

pub fn analysis_file_name(record: &AnalysisRecord) -> String {
    format!("relatorio-financeiro-{}.pdf", slugify(record_title(record)))
}

/// Offer `bytes` to the user as a file download.
///
/// # Errors
///
/// Fails outside the browser or when a DOM call is rejected.
#[cfg(feature = "hydrate")]
pub fn download(bytes: &[u8], file_name: &str) -> Result<(), PdfExportError> {
    use wasm_bindgen::JsCast;

    let browser = |err: wasm_bindgen::JsValue| PdfExportError::Browser(format!("{err:?}"));

    let window = web_sys::window().ok_or(PdfExportError::Unavailable)?;
    let document = window.document().ok_or(PdfExportError::Unavailable)?;

    let parts = js_sys::Array::new();
    parts.push(&js_sys::Uint8Array::from(bytes));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type("application/pdf");
    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(browser)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(browser)?;

    let anchor = document
        .create_element("a")
        .map_err(browser)?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|_| PdfExportError::Browser("anchor element".to_owned()))?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();
    web_sys::Url::revoke_object_url(&url).map_err(browser)?;
    Ok(())
}

#[cfg(not(feature = "hydrate"))]
pub fn download(_bytes: &[u8], _file_name: &str) -> Result<(), PdfExportError> {
    Err(PdfExportError::Unavailable)
}

/// Build and download the summary report.
///
/// # Errors
///
/// See [`download`].
pub fn export_summary(records: &[AnalysisRecord], issued: OffsetDateTime) -> Result<(), PdfExportError> {
    let doc = summary_report(records, issued);
    leptos::logging::log!("pdf summary: {} analyses, {} pages", records.len(), doc.page_count());
    download(&doc.to_bytes(), SUMMARY_FILE_NAME)
}

/// Build and download the report for one analysis.
///
/// # Errors
///
/// See [`download`].
pub fn export_analysis(record: &AnalysisRecord, issued: OffsetDateTime) -> Result<(), PdfExportError> {
    download(&analysis_report(record, issued).to_bytes(), &analysis_file_name(record))
}
