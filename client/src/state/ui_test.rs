use super::*;

// =============================================================
// DashboardTab
// =============================================================

#[test]
fn dashboard_opens_on_upload_tab() {
    assert_eq!(DashboardTab::default(), DashboardTab::Upload);
}

#[test]
fn tabs_have_portuguese_labels_in_order() {
    let labels: Vec<&str> = DashboardTab::ALL.iter().map(|t| t.label()).collect();
    assert_eq!(labels, vec!["Upload e Análise", "Histórico", "Gráficos", "Observações Inteligentes"]);
}

// =============================================================
// LoadState
// =============================================================

#[test]
fn load_state_starts_loading() {
    let state: LoadState<Vec<u8>> = LoadState::default();
    assert!(state.is_loading());
    assert_eq!(state.error(), None);
    assert_eq!(state.ready(), None);
}

#[test]
fn load_state_accessors() {
    let failed: LoadState<u8> = LoadState::Failed("falhou".to_owned());
    assert_eq!(failed.error(), Some("falhou"));
    let ready = LoadState::Ready(3_u8);
    assert_eq!(ready.ready(), Some(&3));
    assert!(!ready.is_loading());
}
