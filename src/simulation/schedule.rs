//! Per-month payment selection and event ordering

use chrono::NaiveDate;

use crate::loan::{ExtraPayment, LoanEvent, LoanEventKind};
use super::calendar::{month_end, same_month};

/// Payments applied in one simulated month
///
/// Any extra payment in a month replaces the default payment for that month.
#[derive(Debug, Clone, PartialEq)]
pub enum MonthPayments {
    /// Extra payments dated in this month, sorted by date
    UseExplicitPayments(Vec<ExtraPayment>),
    /// No extra payments: one default payment on the last day of the month
    UseDefaultPayment { amount: f64, date: NaiveDate },
}

impl MonthPayments {
    /// Select the payments for the month containing `month`
    ///
    /// `extra_payments` may be in any order.
    pub fn for_month(month: NaiveDate, default_amount: f64, extra_payments: &[ExtraPayment]) -> Self {
        let mut explicit: Vec<ExtraPayment> = extra_payments
            .iter()
            .filter(|p| same_month(p.date, month))
            .copied()
            .collect();

        if explicit.is_empty() {
            MonthPayments::UseDefaultPayment {
                amount: default_amount,
                date: month_end(month),
            }
        } else {
            explicit.sort_by_key(|p| p.date);
            MonthPayments::UseExplicitPayments(explicit)
        }
    }

    /// Whether the default payment was used this month
    pub fn is_default(&self) -> bool {
        matches!(self, MonthPayments::UseDefaultPayment { .. })
    }

    /// Sum of payment amounts scheduled this month
    pub fn total(&self) -> f64 {
        match self {
            MonthPayments::UseExplicitPayments(payments) => payments.iter().map(|p| p.amount).sum(),
            MonthPayments::UseDefaultPayment { amount, .. } => *amount,
        }
    }

    /// Payments as ledger events, in date order
    pub fn into_events(self) -> Vec<LoanEvent> {
        match self {
            MonthPayments::UseExplicitPayments(payments) => {
                payments.into_iter().map(LoanEvent::from).collect()
            }
            MonthPayments::UseDefaultPayment { amount, date } => vec![LoanEvent {
                date,
                kind: LoanEventKind::Payment { amount },
            }],
        }
    }
}

/// Everything that happens in the month containing `month`, in processing order
///
/// Rate changes and disbursements from `other_events` dated in the month are
/// merged ahead of same-day payments.
pub fn month_events(month: NaiveDate, payments: MonthPayments, other_events: &[LoanEvent]) -> Vec<LoanEvent> {
    let mut events: Vec<LoanEvent> = other_events
        .iter()
        .filter(|e| !e.is_payment() && same_month(e.date, month))
        .copied()
        .collect();
    events.extend(payments.into_events());
    events.sort_by_key(|e| e.date);
    events
}
