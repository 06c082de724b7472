//! Local UI chrome state (dashboard tabs, remote-load status).
//!
//! DESIGN
//! ======
//! Keeps transient presentation concerns out of domain state so rendering
//! controls can evolve independently of backend data.

#[cfg(test)]
#[path = "ui_test.rs"]
mod ui_test;

/// Tabs of the dashboard's main column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DashboardTab {
    #[default]
    Upload,
    History,
    Charts,
    Insights,
}

impl DashboardTab {
    /// Tabs in display order.
    pub const ALL: [Self; 4] = [Self::Upload, Self::History, Self::Charts, Self::Insights];

    pub fn label(self) -> &'static str {
        match self {
            Self::Upload => "Upload e Análise",
            Self::History => "Histórico",
            Self::Charts => "Gráficos",
            Self::Insights => "Observações Inteligentes",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Upload => "📤",
            Self::History => "📋",
            Self::Charts => "📊",
            Self::Insights => "🧠",
        }
    }
}

/// Status of a view's remote data.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum LoadState<T> {
    #[default]
    Loading,
    Failed(String),
    Ready(T),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }
}
