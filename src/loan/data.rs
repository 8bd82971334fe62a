//! Loan data structures: terms, extra payments and dated loan events

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Terms of a loan for a single simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanParameters {
    /// Amount borrowed
    pub principal: f64,

    /// Annual interest rate in percent (10.0 = 10%)
    pub annual_rate_percent: f64,

    /// Recurring payment applied on the last day of any month without extra payments
    pub default_monthly_payment: f64,

    /// Loan start date (UTC calendar date)
    pub start_date: NaiveDate,
}

impl LoanParameters {
    pub fn new(
        principal: f64,
        annual_rate_percent: f64,
        default_monthly_payment: f64,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            principal,
            annual_rate_percent,
            default_monthly_payment,
            start_date,
        }
    }

    /// Build parameters from a UTC timestamp, dropping the time of day
    pub fn with_start_datetime(
        principal: f64,
        annual_rate_percent: f64,
        default_monthly_payment: f64,
        start: DateTime<Utc>,
    ) -> Self {
        Self::new(principal, annual_rate_percent, default_monthly_payment, start.date_naive())
    }

    /// Interest accrued per day on `balance` at `annual_rate_percent`
    /// Simple day count: rate / 365 / 100
    pub fn daily_interest(balance: f64, annual_rate_percent: f64) -> f64 {
        balance * annual_rate_percent / 365.0 / 100.0
    }
}

/// An ad-hoc payment on a specific date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtraPayment {
    pub date: NaiveDate,
    pub amount: f64,
}

impl ExtraPayment {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self { date, amount }
    }
}

/// A change of the annual rate effective from `date`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateChange {
    pub date: NaiveDate,
    pub annual_rate_percent: f64,
}

/// Additional principal drawn on `date`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Disbursement {
    pub date: NaiveDate,
    pub amount: f64,
}

/// What happens on a loan event date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LoanEventKind {
    /// Payment reducing the balance
    Payment { amount: f64 },
    /// New annual rate in percent
    RateChange { annual_rate_percent: f64 },
    /// Principal added to the balance
    Disbursement { amount: f64 },
}

/// A dated entry of the loan's event ledger
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanEvent {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub kind: LoanEventKind,
}

impl LoanEvent {
    pub fn is_payment(&self) -> bool {
        matches!(self.kind, LoanEventKind::Payment { .. })
    }
}

impl From<ExtraPayment> for LoanEvent {
    fn from(payment: ExtraPayment) -> Self {
        LoanEvent {
            date: payment.date,
            kind: LoanEventKind::Payment { amount: payment.amount },
        }
    }
}

impl From<RateChange> for LoanEvent {
    fn from(change: RateChange) -> Self {
        LoanEvent {
            date: change.date,
            kind: LoanEventKind::RateChange {
                annual_rate_percent: change.annual_rate_percent,
            },
        }
    }
}

impl From<Disbursement> for LoanEvent {
    fn from(disbursement: Disbursement) -> Self {
        LoanEvent {
            date: disbursement.date,
            kind: LoanEventKind::Disbursement { amount: disbursement.amount },
        }
    }
}

/// All caller-supplied dated inputs of a loan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanEvents {
    #[serde(default)]
    pub extra_payments: Vec<ExtraPayment>,
    #[serde(default)]
    pub rate_changes: Vec<RateChange>,
    #[serde(default)]
    pub disbursements: Vec<Disbursement>,
}

impl LoanEvents {
    /// Events consisting only of extra payments
    pub fn from_payments(extra_payments: &[ExtraPayment]) -> Self {
        Self {
            extra_payments: extra_payments.to_vec(),
            ..Default::default()
        }
    }

    /// Split a flat event list back into its typed parts
    pub fn from_ledger(events: &[LoanEvent]) -> Self {
        let mut out = Self::default();
        for event in events {
            match event.kind {
                LoanEventKind::Payment { amount } => {
                    out.extra_payments.push(ExtraPayment::new(event.date, amount))
                }
                LoanEventKind::RateChange { annual_rate_percent } => {
                    out.rate_changes.push(RateChange { date: event.date, annual_rate_percent })
                }
                LoanEventKind::Disbursement { amount } => {
                    out.disbursements.push(Disbursement { date: event.date, amount })
                }
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.extra_payments.is_empty() && self.rate_changes.is_empty() && self.disbursements.is_empty()
    }

    /// Combined event list sorted by date
    ///
    /// The sort is stable; on the same date rate changes come first, then
    /// disbursements, then payments (each in input order).
    pub fn ledger(&self) -> Vec<LoanEvent> {
        let mut events: Vec<LoanEvent> = self
            .rate_changes
            .iter()
            .map(|&c| LoanEvent::from(c))
            .chain(self.disbursements.iter().map(|&d| LoanEvent::from(d)))
            .chain(self.extra_payments.iter().map(|&p| LoanEvent::from(p)))
            .collect();
        events.sort_by_key(|e| e.date);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_start_datetime_is_normalized() {
        let start = date(2024, 3, 15).and_hms_opt(23, 59, 59).unwrap().and_utc();
        let params = LoanParameters::with_start_datetime(1000.0, 5.0, 100.0, start);
        assert_eq!(params.start_date, date(2024, 3, 15));
    }

    #[test]
    fn test_daily_interest() {
        assert_relative_eq!(LoanParameters::daily_interest(36500.0, 10.0), 10.0);
        assert_eq!(LoanParameters::daily_interest(36500.0, 0.0), 0.0);
    }

    #[test]
    fn test_ledger_sorted_with_same_day_order() {
        let events = LoanEvents {
            extra_payments: vec![ExtraPayment::new(date(2024, 5, 1), 500.0), ExtraPayment::new(date(2024, 2, 10), 100.0)],
            rate_changes: vec![RateChange { date: date(2024, 5, 1), annual_rate_percent: 7.5 }],
            disbursements: vec![Disbursement { date: date(2024, 5, 1), amount: 2000.0 }],
        };

        let ledger = events.ledger();
        assert_eq!(ledger.len(), 4);
        assert_eq!(ledger[0].date, date(2024, 2, 10));
        assert!(matches!(ledger[1].kind, LoanEventKind::RateChange { .. }));
        assert!(matches!(ledger[2].kind, LoanEventKind::Disbursement { .. }));
        assert!(ledger[3].is_payment());
    }

    #[test]
    fn test_from_ledger_splits_kinds() {
        let events = LoanEvents {
            extra_payments: vec![ExtraPayment::new(date(2024, 1, 5), 100.0)],
            rate_changes: vec![RateChange { date: date(2024, 2, 1), annual_rate_percent: 4.0 }],
            disbursements: vec![],
        };
        assert_eq!(LoanEvents::from_ledger(&events.ledger()), events);
    }

    #[test]
    fn test_event_json_shape() {
        let event = LoanEvent::from(ExtraPayment::new(date(2024, 1, 31), 250.0));
        let json = serde_json::to_value(event).unwrap();
        assert_eq!(json["type"], "Payment");
        assert_eq!(json["date"], "2024-01-31");
        assert_eq!(json["amount"], 250.0);
    }
}
