use super::*;
use time::macros::offset;

fn record(category: Option<&str>, amount: f64, created_at: Option<&str>) -> AnalysisRecord {
    AnalysisRecord {
        category: category.map(str::to_owned),
        amount: Some(amount),
        created_at: created_at.map(str::to_owned),
        ..AnalysisRecord::default()
    }
}

#[test]
fn categories_keep_first_appearance_order() {
    let records = vec![
        record(Some("Vendas"), 100.0, None),
        record(Some("Serviços"), 400.0, None),
        record(Some("Vendas"), 300.0, None),
        record(None, 50.0, None),
    ];
    let data = chart_data(&records, UtcOffset::UTC);
    let labels: Vec<&str> = data.categories.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["Vendas", "Serviços", "Sem categoria"]);
    assert_eq!(data.categories[0].amount, 400.0);
    assert_eq!(data.category_count(), 3);
}

#[test]
fn months_are_sorted_chronologically() {
    let records = vec![
        record(Some("A"), 10.0, Some("2024-11-05T10:00:00Z")),
        record(Some("A"), 20.0, Some("2023-12-31T10:00:00Z")),
        record(Some("A"), 30.0, Some("2024-02-01T10:00:00Z")),
        record(Some("A"), 5.0, Some("2024-11-20T10:00:00Z")),
        record(Some("A"), 99.0, Some("sem data")),
    ];
    let data = chart_data(&records, UtcOffset::UTC);
    let labels: Vec<&str> = data.months.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["12/2023", "2/2024", "11/2024"]);
    assert_eq!(data.months[2].amount, 15.0);
}

#[test]
fn month_bucket_uses_viewer_offset() {
    let records = vec![record(Some("A"), 10.0, Some("2024-03-01T01:00:00Z"))];
    let data = chart_data(&records, offset!(-3));
    assert_eq!(data.months[0].label, "2/2024");
}

#[test]
fn bar_heights_scale_to_max_with_floor() {
    let records = vec![
        record(Some("Grande"), 1000.0, None),
        record(Some("Media"), 500.0, None),
        record(Some("Minima"), 1.0, None),
    ];
    let data = chart_data(&records, UtcOffset::UTC);
    let heights: Vec<f64> = data.categories.iter().map(|b| b.height_px).collect();
    assert_eq!(heights, vec![200.0, 100.0, 20.0]);
    let hues: Vec<u16> = data.categories.iter().map(|b| b.hue).collect();
    assert_eq!(hues, vec![0, 60, 120]);
}

#[test]
fn zero_max_uses_minimum_height() {
    assert_eq!(bar_height(0.0, 0.0), MIN_BAR_PX);
    assert_eq!(bar_height(-5.0, 10.0), MIN_BAR_PX);
}

#[test]
fn summary_totals() {
    let mut taxed = record(Some("A"), 8000.0, None);
    taxed.taxes = serde_json::json!({ "simplesNacional": { "valor": 480.0 } });
    let records = vec![taxed, record(Some("B"), 2000.0, None), AnalysisRecord::default()];
    let data = chart_data(&records, UtcOffset::UTC);
    assert_eq!(data.total_amount, 10_000.0);
    assert_eq!(data.operations, 3);
    assert_eq!(data.estimated_taxes, 480.0);
    assert!(!data.is_empty());
}

#[test]
fn short_amount_in_thousands() {
    let bar = Bar { label: "x".to_owned(), amount: 8_400.0, height_px: 20.0, hue: 0 };
    assert_eq!(bar.short_amount(), "R$ 8k");
}

#[test]
fn empty_history_has_no_buckets() {
    let data = chart_data(&[], UtcOffset::UTC);
    assert!(data.is_empty());
    assert!(data.categories.is_empty());
    assert!(data.months.is_empty());
}
