//! Shared wire DTOs for the identity provider and the analysis backend.
//!
//! DESIGN
//! ======
//! Backend payloads are produced by an AI pipeline and drift in shape, so the
//! analysis types are all-optional and decode leniently: a wrong-typed or
//! missing field becomes `None`/empty instead of failing the whole payload.
//! Canonical names are snake_case; camelCase spellings are accepted as
//! aliases.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// IDENTITY
// =============================================================================

/// Identity-provider credential bundle.
///
/// Field names match the provider's persisted JSON so a stored session can be
/// read back verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer credential attached to backend requests.
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Expiry as seconds since the Unix epoch.
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_owned()
}

impl Session {
    /// Whether the token expires within `margin_secs` of `now`.
    ///
    /// Sessions without a known expiry are treated as still valid.
    pub fn expires_within(&self, now: i64, margin_secs: i64) -> bool {
        self.expires_at.is_some_and(|at| at - now <= margin_secs)
    }
}

/// Authenticated user derived from the session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Opaque provider identifier.
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string_or_empty")]
    pub email: String,
    /// Provider metadata (`full_name`, `name`, `avatar_url`, ...).
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

impl User {
    /// Display name from provider metadata, if any.
    pub fn display_name(&self) -> Option<&str> {
        ["full_name", "name"]
            .iter()
            .find_map(|key| self.user_metadata.get(key).and_then(serde_json::Value::as_str))
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Name used in greetings: display name, falling back to email.
    pub fn greeting_name(&self) -> &str {
        self.display_name().unwrap_or(&self.email)
    }
}

// =============================================================================
// ANALYSIS
// =============================================================================

/// A stored analysis as returned by `GET /api/analysis/history`.
///
/// Decoded by hand from the JSON object: each field takes the first of its
/// spellings that holds a usable value, so a payload carrying both
/// `amount` and `value` (or `created_at` and `createdAt`) still decodes.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AnalysisRecord {
    pub id: Option<String>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub operation_type: Option<String>,
    pub amount: Option<f64>,
    pub taxes: serde_json::Value,
    pub insights: Vec<String>,
    pub monthly_summary: Option<String>,
    pub strategic_insights: Vec<String>,
    pub financial_analysis: serde_json::Value,
    pub created_at: Option<String>,
}

impl<'de> Deserialize<'de> for AnalysisRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Self::from_value(serde_json::Value::deserialize(deserializer)?))
    }
}

type JsonMap = serde_json::Map<String, serde_json::Value>;

/// First of `keys` whose value `convert` accepts.
fn pick<T>(map: &JsonMap, keys: &[&str], convert: impl Fn(&serde_json::Value) -> Option<T>) -> Option<T> {
    keys.iter().filter_map(|key| map.get(*key)).find_map(convert)
}

fn pick_json(map: &JsonMap, keys: &[&str]) -> serde_json::Value {
    pick(map, keys, |value| (!value.is_null()).then(|| value.clone())).unwrap_or_default()
}

fn pick_strings(map: &JsonMap, keys: &[&str]) -> Vec<String> {
    pick(map, keys, |value| Some(strings_of(value)).filter(|list| !list.is_empty())).unwrap_or_default()
}

impl AnalysisRecord {
    /// Decode one history element. Never fails: non-object input yields an
    /// empty record.
    pub fn from_value(value: serde_json::Value) -> Self {
        let serde_json::Value::Object(map) = value else {
            return Self::default();
        };
        Self {
            id: pick(&map, &["id"], value_as_string),
            title: pick(&map, &["title"], value_as_string),
            category: pick(&map, &["category"], value_as_string),
            operation_type: pick(&map, &["operation_type", "operationType"], value_as_string),
            amount: pick(&map, &["amount", "value"], value_as_f64),
            taxes: pick_json(&map, &["taxes", "calculated_taxes"]),
            insights: pick_strings(&map, &["insights"]),
            monthly_summary: pick(&map, &["monthly_summary", "monthlySummary"], value_as_string),
            strategic_insights: pick_strings(&map, &["strategic_insights", "strategicInsights"]),
            financial_analysis: pick_json(&map, &["financial_analysis", "financialAnalysis"]),
            created_at: pick(&map, &["created_at", "createdAt"], value_as_string),
        }
    }

    /// Amount of a named tax line (`simplesNacional`, `irpj`, ...).
    ///
    /// Accepts both `{"irpj": 12.5}` and `{"irpj": {"valor": 12.5}}`.
    pub fn tax_value(&self, key: &str) -> Option<f64> {
        tax_line(&self.taxes, key)
    }

    /// Estimated Simples Nacional amount used for report totals.
    pub fn estimated_tax(&self) -> Option<f64> {
        self.tax_value("simplesNacional")
    }

    /// Recommended tax regime, when the backend suggested one.
    pub fn recommended_regime(&self) -> Option<&str> {
        self.taxes.get("melhorRegime").and_then(serde_json::Value::as_str)
    }

    /// Financial health label (`ótima`, `boa`, `regular`, ...).
    pub fn financial_health(&self) -> Option<&str> {
        self.financial_analysis
            .get("saudeFinanceira")
            .and_then(serde_json::Value::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Profit margin as displayed text.
    pub fn profit_margin(&self) -> Option<String> {
        match self.financial_analysis.get("margemLucro")? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Extract a tax amount stored either as a number or as `{ "valor": n }`.
pub fn tax_line(taxes: &serde_json::Value, key: &str) -> Option<f64> {
    let entry = taxes.get(key)?;
    value_as_f64(entry).or_else(|| entry.get("valor").and_then(value_as_f64))
}

/// Structured fields extracted by the AI for a single submission.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AiData {
    #[serde(default, deserialize_with = "lenient_string")]
    pub operacao: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub categoria: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub valor: Option<f64>,
    #[serde(default)]
    pub impostos_calculados: serde_json::Value,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub insights: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub resumo_mensal: Option<String>,
}

/// Response of `POST /api/analysis/upload`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_record")]
    pub analysis: Option<AnalysisRecord>,
    #[serde(default, deserialize_with = "lenient_ai_data")]
    pub ai_data: Option<AiData>,
}

/// Response of `POST /api/insights/ask`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightAnswer {
    #[serde(default, deserialize_with = "lenient_string_or_empty")]
    pub answer: String,
    #[serde(default, rename = "historyCount", alias = "history_count")]
    pub history_count: Option<u64>,
}

// =============================================================================
// REMINDERS
// =============================================================================

/// Urgency assigned by the backend to a deadline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Whether a deadline is a payment or a filing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeadlineKind {
    Payment,
    Declaration,
    #[default]
    #[serde(other)]
    Other,
}

/// One entry of `GET /api/reminders/tax-deadlines`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxDeadline {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// ISO-8601 date-time, with or without offset.
    #[serde(rename = "dueDate", alias = "due_date")]
    pub due_date: String,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, rename = "type")]
    pub kind: DeadlineKind,
}

// =============================================================================
// LENIENT DECODING
// =============================================================================

fn value_as_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn value_as_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_as_string(&serde_json::Value::deserialize(deserializer)?))
}

fn lenient_string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_as_f64(&serde_json::Value::deserialize(deserializer)?))
}

fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(strings_of(&serde_json::Value::deserialize(deserializer)?))
}

/// A list of strings, or a single non-blank string as a one-element list.
fn strings_of(value: &serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Array(items) => items.iter().filter_map(value_as_string).collect(),
        serde_json::Value::String(s) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn lenient_record<'de, D>(deserializer: D) -> Result<Option<AnalysisRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.is_object().then(|| AnalysisRecord::from_value(value)))
}

fn lenient_ai_data<'de, D>(deserializer: D) -> Result<Option<AiData>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(value).unwrap_or_default()))
}
