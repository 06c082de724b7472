//! Brazilian Portuguese display formatting: money, dates, truncation.

#[cfg(test)]
#[path = "format_test.rs"]
mod format_test;

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

/// Placeholder for absent values.
pub const NOT_AVAILABLE: &str = "N/A";

/// Format an amount as Brazilian reais: `R$ 1.234,56`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_brl(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let cents = (value.abs() * 100.0).round() as u64;
    let negative = value < 0.0 && cents > 0;
    let integer = group_thousands(cents / 100);
    let sign = if negative { "-" } else { "" };
    format!("{sign}R$ {integer},{:02}", cents % 100)
}

/// [`format_brl`], or `N/A` when absent.
pub fn format_brl_opt(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_owned(), format_brl)
}

fn group_thousands(mut n: u64) -> String {
    let mut groups = Vec::new();
    loop {
        if n < 1000 {
            groups.push(n.to_string());
            break;
        }
        groups.push(format!("{:03}", n % 1000));
        n /= 1000;
    }
    groups.reverse();
    groups.join(".")
}

/// Parse a backend timestamp.
///
/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS` (optionally with a space
/// separator or fractional seconds) and bare dates. Naive values are read in
/// `offset`.
pub fn parse_timestamp(raw: &str, offset: UtcOffset) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(parsed);
    }
    let naive = raw.get(..19).map(|head| head.replacen(' ', "T", 1));
    if let Some(naive) = naive {
        let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
        if let Ok(parsed) = PrimitiveDateTime::parse(&naive, &format) {
            return Some(parsed.assume_offset(offset));
        }
    }
    let date_format = format_description!("[year]-[month]-[day]");
    let date = Date::parse(raw.get(..10)?, &date_format).ok()?;
    Some(PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_offset(offset))
}

/// `dd/mm/aaaa` for an instant, in `offset`.
pub fn format_date_br(instant: OffsetDateTime, offset: UtcOffset) -> String {
    let local = instant.to_offset(offset);
    format!("{:02}/{:02}/{}", local.day(), u8::from(local.month()), local.year())
}

/// `dd/mm/aaaa` for a raw backend timestamp, or `N/A` when unparseable.
pub fn format_timestamp_br(raw: Option<&str>, offset: UtcOffset) -> String {
    raw.and_then(|r| parse_timestamp(r, offset))
        .map_or_else(|| NOT_AVAILABLE.to_owned(), |instant| format_date_br(instant, offset))
}

/// Truncate to `max` characters, appending `...` when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let head: String = text.chars().take(max).collect();
    format!("{}...", head.trim_end())
}

/// Lowercase ASCII slug for file names: `Venda Serviços` → `venda-servicos`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::new();
    for c in text.chars().map(fold_accent).flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-').to_owned();
    if slug.is_empty() { "analise".to_owned() } else { slug }
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        other => other,
    }
}
