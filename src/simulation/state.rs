//! Running balance state for a single simulation

use chrono::NaiveDate;

use crate::loan::{LoanEventKind, LoanParameters};
use super::calendar;

/// Amounts moved by one month's events
#[derive(Debug, Clone, Copy, Default)]
pub struct MonthFlows {
    pub interest: f64,
    pub paid: f64,
    pub disbursed: f64,
}

/// State of the loan at a point in the simulation
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Current simulated month (1-indexed, 0 before the first month)
    pub month: u32,

    /// A date inside the current month (the start date in month 1)
    pub current_date: NaiveDate,

    /// Outstanding balance
    pub balance: f64,

    /// Annual rate in percent currently in force
    pub annual_rate_percent: f64,

    /// Balance at the end of the previous month (principal before month 1)
    pub previous_month_end_balance: f64,

    /// Consecutive month ends that failed to decrease the balance
    pub non_decreasing_streak: u32,

    /// Balance at the start of the current month
    pub opening_balance: f64,
}

impl SimulationState {
    /// Initialize state at the loan start date
    pub fn from_params(params: &LoanParameters, opening_rate_percent: f64) -> Self {
        Self {
            month: 0,
            current_date: params.start_date,
            balance: params.principal,
            annual_rate_percent: opening_rate_percent,
            previous_month_end_balance: params.principal,
            non_decreasing_streak: 0,
            opening_balance: params.principal,
        }
    }

    /// Enter the next month
    pub fn begin_month(&mut self) {
        self.month += 1;
        self.opening_balance = self.balance;
    }

    /// First day of the current month, where the accrual clock starts
    pub fn month_start(&self) -> NaiveDate {
        calendar::month_start(self.current_date)
    }

    /// Last day of the current month, where the sample is taken
    pub fn month_end(&self) -> NaiveDate {
        calendar::month_end(self.current_date)
    }

    /// Interest per day on the current balance
    pub fn daily_interest(&self) -> f64 {
        LoanParameters::daily_interest(self.balance, self.annual_rate_percent)
    }

    /// Accrue `days` of interest into the balance, then apply the event
    pub fn apply_event(&mut self, days: i64, kind: LoanEventKind, flows: &mut MonthFlows) {
        let accrued = self.daily_interest() * days as f64;
        self.balance += accrued;
        flows.interest += accrued;

        match kind {
            LoanEventKind::Payment { amount } => {
                let before = self.balance;
                self.balance -= amount;
                if self.balance < 0.0 {
                    self.balance = 0.0;
                }
                flows.paid += before - self.balance;
            }
            LoanEventKind::RateChange { annual_rate_percent } => {
                self.annual_rate_percent = annual_rate_percent;
            }
            LoanEventKind::Disbursement { amount } => {
                self.balance += amount;
                flows.disbursed += amount;
            }
        }
    }

    /// Close the month and update the non-convergence streak
    ///
    /// Returns true once the month-end balance has failed to decrease for
    /// `streak_limit` consecutive months. A limit of 0 never stops.
    pub fn close_month(&mut self, streak_limit: u32) -> bool {
        if self.balance >= self.previous_month_end_balance {
            self.non_decreasing_streak += 1;
        } else {
            self.non_decreasing_streak = 0;
        }
        self.previous_month_end_balance = self.balance;
        streak_limit > 0 && self.non_decreasing_streak >= streak_limit
    }

    /// Move to the first day of the next month
    ///
    /// Returns false if the calendar cannot advance further.
    pub fn advance_month(&mut self) -> bool {
        match calendar::next_month_start(self.current_date) {
            Some(next) => {
                self.current_date = next;
                true
            }
            None => false,
        }
    }

    pub fn is_paid_off(&self) -> bool {
        self.balance <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params() -> LoanParameters {
        LoanParameters::new(36500.0, 10.0, 1000.0, NaiveDate::from_ymd_opt(2024, 1, 20).unwrap())
    }

    #[test]
    fn test_payment_accrues_then_clamps() {
        let mut state = SimulationState::from_params(&params(), 10.0);
        let mut flows = MonthFlows::default();

        state.apply_event(3, LoanEventKind::Payment { amount: 500.0 }, &mut flows);
        assert_relative_eq!(state.balance, 36500.0 + 30.0 - 500.0);
        assert_relative_eq!(flows.interest, 30.0);
        assert_relative_eq!(flows.paid, 500.0);

        state.apply_event(0, LoanEventKind::Payment { amount: 1_000_000.0 }, &mut flows);
        assert_eq!(state.balance, 0.0);
        assert!(state.is_paid_off());
        assert_relative_eq!(flows.paid, 36530.0);
    }

    #[test]
    fn test_rate_change_and_disbursement() {
        let mut state = SimulationState::from_params(&params(), 10.0);
        let mut flows = MonthFlows::default();

        state.apply_event(0, LoanEventKind::RateChange { annual_rate_percent: 20.0 }, &mut flows);
        assert_relative_eq!(state.daily_interest(), 20.0);

        state.apply_event(0, LoanEventKind::Disbursement { amount: 3650.0 }, &mut flows);
        assert_relative_eq!(state.balance, 40150.0);
        assert_relative_eq!(flows.disbursed, 3650.0);
    }

    #[test]
    fn test_streak_counts_and_resets() {
        let mut state = SimulationState::from_params(&params(), 10.0);

        state.balance = 36600.0;
        assert!(!state.close_month(3));
        state.balance = 36600.0;
        assert!(!state.close_month(3));
        state.balance = 36000.0;
        assert!(!state.close_month(3));
        assert_eq!(state.non_decreasing_streak, 0);

        for _ in 0..2 {
            assert!(!state.close_month(3));
        }
        assert!(state.close_month(3));
    }

    #[test]
    fn test_zero_streak_limit_never_stops() {
        let mut state = SimulationState::from_params(&params(), 10.0);

        state.balance = 30_000.0;
        assert!(!state.close_month(0));
        for _ in 0..5 {
            state.balance += 100.0;
            assert!(!state.close_month(0));
        }
        assert_eq!(state.non_decreasing_streak, 5);
    }

    #[test]
    fn test_advance_month_goes_to_first_day() {
        let mut state = SimulationState::from_params(&params(), 10.0);
        assert!(state.advance_month());
        assert_eq!(state.current_date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(state.month_end(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }
}
