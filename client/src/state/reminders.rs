//! Tax-deadline reminders: countdowns, urgency and the built-in federal
//! calendar shown when the backend has nothing to report.

#[cfg(test)]
#[path = "reminders_test.rs"]
mod reminders_test;

use time::{Month, OffsetDateTime, UtcOffset};

use crate::net::types::{DeadlineKind, Priority, TaxDeadline};
use crate::util::format::{NOT_AVAILABLE, format_date_br, parse_timestamp};

/// Deadlines this close (in days) are flagged urgent.
pub const URGENT_WITHIN_DAYS: i64 = 3;
/// Built-in deadlines overdue by more than this many days are hidden.
pub const OVERDUE_GRACE_DAYS: i64 = 7;

const SECS_PER_DAY: i64 = 86_400;

/// Where the displayed deadlines came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReminderSource {
    Backend,
    StandardCalendar,
}

/// One rendered reminder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReminderCard {
    pub name: String,
    pub description: String,
    pub amount: Option<String>,
    pub due_date: String,
    pub days_until_due: Option<i64>,
    pub urgent: bool,
    pub badge: String,
    pub priority: Priority,
    pub kind_label: &'static str,
}

/// Whole days until `due`, rounded up.
pub fn days_until(due: OffsetDateTime, now: OffsetDateTime) -> i64 {
    let secs = (due - now).whole_seconds();
    let days = secs.div_euclid(SECS_PER_DAY);
    if secs.rem_euclid(SECS_PER_DAY) > 0 { days + 1 } else { days }
}

/// Countdown badge: `VENCIDO`, `1 dia`, `N dias`.
pub fn due_badge(days: i64) -> String {
    match days {
        d if d <= 0 => "VENCIDO".to_owned(),
        1 => "1 dia".to_owned(),
        d => format!("{d} dias"),
    }
}

pub fn is_urgent(days: i64) -> bool {
    days <= URGENT_WITHIN_DAYS
}

pub fn priority_class(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "reminder--high",
        Priority::Medium => "reminder--medium",
        Priority::Low => "reminder--low",
        Priority::Unknown => "reminder--none",
    }
}

pub fn kind_label(kind: DeadlineKind) -> &'static str {
    match kind {
        DeadlineKind::Payment => "Pagamento",
        DeadlineKind::Declaration | DeadlineKind::Other => "Declaração",
    }
}

impl ReminderCard {
    pub fn from_deadline(deadline: &TaxDeadline, now: OffsetDateTime, offset: UtcOffset) -> Self {
        let due = parse_timestamp(&deadline.due_date, offset);
        let days = due.map(|due| days_until(due, now));
        Self {
            name: deadline.name.clone(),
            description: deadline.description.clone(),
            amount: deadline.amount.clone().filter(|a| !a.trim().is_empty()),
            due_date: due.map_or_else(|| NOT_AVAILABLE.to_owned(), |due| format_date_br(due, offset)),
            days_until_due: days,
            urgent: days.is_some_and(is_urgent),
            badge: days.map_or_else(|| NOT_AVAILABLE.to_owned(), due_badge),
            priority: deadline.priority,
            kind_label: kind_label(deadline.kind),
        }
    }

    pub fn priority_class(&self) -> &'static str {
        priority_class(self.priority)
    }
}

/// Federal calendar for the month of `now`: DAS, DCTF, EFD Contribuições and
/// the yearly DIRF. Entries overdue by more than a week are dropped.
pub fn standard_deadlines(now: OffsetDateTime) -> Vec<TaxDeadline> {
    let year = now.year();
    let month = u8::from(now.month());
    let monthly = |day: u8| format!("{year}-{month:02}-{day:02}T23:59:59");

    let entries = vec![
        TaxDeadline {
            name: "DAS (Simples Nacional)".to_owned(),
            description: "Pagamento mensal do Simples Nacional".to_owned(),
            due_date: monthly(20),
            amount: Some("Variável conforme faturamento".to_owned()),
            priority: Priority::High,
            kind: DeadlineKind::Payment,
        },
        TaxDeadline {
            name: "DIRF".to_owned(),
            description: "Declaração do Imposto de Renda Retido na Fonte".to_owned(),
            due_date: format!("{year}-{:02}-28T23:59:59", u8::from(Month::February)),
            amount: Some("Não se aplica".to_owned()),
            priority: Priority::High,
            kind: DeadlineKind::Declaration,
        },
        TaxDeadline {
            name: "DCTF".to_owned(),
            description: "Declaração de Débitos Tributários Federais".to_owned(),
            due_date: monthly(15),
            amount: Some("Não se aplica".to_owned()),
            priority: Priority::Medium,
            kind: DeadlineKind::Declaration,
        },
        TaxDeadline {
            name: "EFD Contribuições".to_owned(),
            description: "Escrituração Fiscal Digital de Contribuições".to_owned(),
            due_date: monthly(15),
            amount: Some("Não se aplica".to_owned()),
            priority: Priority::Medium,
            kind: DeadlineKind::Declaration,
        },
    ];

    entries
        .into_iter()
        .filter(|deadline| {
            parse_timestamp(&deadline.due_date, now.offset())
                .is_some_and(|due| (due - now).whole_seconds() >= -OVERDUE_GRACE_DAYS * SECS_PER_DAY)
        })
        .collect()
}

/// Backend deadlines, or the standard calendar when the backend list is empty.
pub fn resolve_deadlines(fetched: Vec<TaxDeadline>, now: OffsetDateTime) -> (Vec<TaxDeadline>, ReminderSource) {
    if fetched.is_empty() {
        (standard_deadlines(now), ReminderSource::StandardCalendar)
    } else {
        (fetched, ReminderSource::Backend)
    }
}

/// Cards for display, in the given order.
pub fn reminder_cards(deadlines: &[TaxDeadline], now: OffsetDateTime) -> Vec<ReminderCard> {
    deadlines
        .iter()
        .map(|deadline| ReminderCard::from_deadline(deadline, now, now.offset()))
        .collect()
}
