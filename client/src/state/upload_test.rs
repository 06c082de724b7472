use super::*;

// =============================================================
// Form validation
// =============================================================

#[test]
fn accepted_files_by_extension_or_mime() {
    assert_eq!(check_file(Some("csv"), None), Ok(()));
    assert_eq!(check_file(Some("XLSX"), None), Ok(()));
    assert_eq!(check_file(None, Some("text/plain")), Ok(()));
    assert_eq!(check_file(Some("dat"), Some("application/vnd.ms-excel")), Ok(()));
}

#[test]
fn pdf_is_recognized_but_rejected() {
    assert_eq!(check_file(Some("pdf"), None), Err(PDF_DISABLED_MESSAGE));
    assert_eq!(check_file(None, Some("application/pdf")), Err(PDF_DISABLED_MESSAGE));
}

#[test]
fn other_files_are_unsupported() {
    assert_eq!(check_file(Some("png"), Some("image/png")), Err(UNSUPPORTED_FILE_MESSAGE));
    assert_eq!(check_file(None, None), Err(UNSUPPORTED_FILE_MESSAGE));
}

#[test]
fn submission_requires_text_or_file() {
    assert_eq!(submission_kind(false, "  "), Err(MISSING_INPUT_MESSAGE));
    assert_eq!(submission_kind(false, "Venda"), Ok(SubmissionKind::Text));
    assert_eq!(submission_kind(true, "Venda"), Ok(SubmissionKind::File));
}

// =============================================================
// Result card
// =============================================================

#[test]
fn ai_data_result_without_optional_fields() {
    let response: UploadResponse = serde_json::from_value(serde_json::json!({
        "message": "ok",
        "analysis": { "id": "a1" },
        "ai_data": { "valor": 8000, "categoria": "Serviços" }
    }))
    .expect("response");
    let view = ResultView::from_response(&response);
    assert_eq!(view.amount, "R$ 8.000,00");
    assert_eq!(view.category, "Serviços");
    assert_eq!(view.operation, "N/A");
    assert!(view.insights.is_empty());
    assert_eq!(view.summary, None);
    assert!(view.taxes.iter().all(|(_, value)| value == "N/A"));
    assert_eq!(view.message.as_deref(), Some("ok"));
}

#[test]
fn falls_back_to_analysis_fields() {
    let response: UploadResponse = serde_json::from_value(serde_json::json!({
        "analysis": {
            "title": "Compra de equipamentos",
            "category": "Despesas",
            "operation_type": "despesa",
            "amount": 5000,
            "taxes": { "simplesNacional": 300, "irpj": 75.5, "csll": 45, "total": 420.5 },
            "insights": ["Deduza a depreciação"],
            "monthly_summary": "Mês com investimento."
        }
    }))
    .expect("response");
    let view = ResultView::from_response(&response);
    assert_eq!(view.title, "Compra de equipamentos");
    assert_eq!(view.amount, "R$ 5.000,00");
    assert_eq!(view.operation, "despesa");
    assert_eq!(
        view.taxes,
        vec![
            ("Simples Nacional", "R$ 300,00".to_owned()),
            ("IRPJ", "R$ 75,50".to_owned()),
            ("CSLL", "R$ 45,00".to_owned()),
            ("Total", "R$ 420,50".to_owned()),
        ]
    );
    assert_eq!(view.insights, vec!["Deduza a depreciação".to_owned()]);
    assert_eq!(view.summary.as_deref(), Some("Mês com investimento."));
}

#[test]
fn ai_taxes_win_over_analysis_taxes() {
    let response: UploadResponse = serde_json::from_value(serde_json::json!({
        "analysis": { "taxes": { "total": 1 } },
        "ai_data": { "impostos_calculados": { "total": { "valor": 99 } }, "insights": ["ai"] }
    }))
    .expect("response");
    let view = ResultView::from_response(&response);
    assert_eq!(view.taxes[3], ("Total", "R$ 99,00".to_owned()));
    assert_eq!(view.insights, vec!["ai".to_owned()]);
}

#[test]
fn empty_response_renders_placeholders() {
    let view = ResultView::from_response(&UploadResponse::default());
    assert_eq!(view.title, "Análise Financeira");
    assert_eq!(view.amount, "R$ 0,00");
    assert_eq!(view.category, "N/A");
}

#[test]
fn analysis_error_prefers_backend_message() {
    let err = crate::net::api::normalize_response(&crate::net::http::HttpResponse {
        status: 400,
        body: r#"{"error":"Texto muito curto"}"#.to_owned(),
    })
    .expect_err("error");
    assert_eq!(analysis_error_message(&err), "Texto muito curto");

    let err = crate::net::api::normalize_response(&crate::net::http::HttpResponse { status: 500, body: String::new() })
        .expect_err("error");
    assert_eq!(analysis_error_message(&err), ANALYSIS_FAILED_MESSAGE);
}
