//! Core month-by-month loan balance simulation

use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::error::{LoanError, LoanResult};
use crate::loan::{ExtraPayment, LoanEvent, LoanEvents, LoanParameters};
use super::calendar;
use super::samples::{BalanceSample, MonthRecord, SimulationResult, StopReason};
use super::schedule::{month_events, MonthPayments};
use super::state::{MonthFlows, SimulationState};

/// Default maximum horizon in years
pub const DEFAULT_MAX_DURATION_YEARS: u32 = 20;

/// Default number of consecutive non-decreasing month ends before giving up
pub const DEFAULT_NON_CONVERGENCE_STREAK: u32 = 3;

/// Handling of extra payments dated outside the simulated months
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutOfRangePolicy {
    /// Drop them silently
    #[default]
    Ignore,
    /// Report them from `check_extra_payments`
    Reject,
}

/// Configuration for a simulation run
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Maximum horizon in years (12 months each)
    pub max_duration_years: u32,

    /// Consecutive month ends with balance >= the previous month end that
    /// mark the loan as irrepayable (0 disables the check)
    pub non_convergence_streak: u32,

    /// Extra payments outside the simulated months
    pub out_of_range: OutOfRangePolicy,

    /// Whether to collect per-month records
    pub detailed_output: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_duration_years: DEFAULT_MAX_DURATION_YEARS,
            non_convergence_streak: DEFAULT_NON_CONVERGENCE_STREAK,
            out_of_range: OutOfRangePolicy::Ignore,
            detailed_output: false,
        }
    }
}

impl SimulationConfig {
    /// Maximum number of simulated months
    pub fn max_months(&self) -> u32 {
        self.max_duration_years.saturating_mul(12)
    }

    /// Upper bound on the number of samples (initial sample + one per month)
    pub fn max_samples(&self) -> usize {
        (self.max_months() as usize).saturating_add(1)
    }
}

/// Simulate with the default configuration and return the balance samples
pub fn simulate(params: &LoanParameters, extra_payments: &[ExtraPayment]) -> Vec<BalanceSample> {
    AmortizationSimulator::default()
        .simulate(params, extra_payments)
        .samples
}

/// Main simulation engine
#[derive(Debug, Clone, Default)]
pub struct AmortizationSimulator {
    config: SimulationConfig,
}

impl AmortizationSimulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// First and last day of the calendar months the simulation can cover
    pub fn simulation_window(&self, params: &LoanParameters) -> (NaiveDate, NaiveDate) {
        let start = calendar::month_start(params.start_date);
        let months = self.config.max_months().saturating_sub(1);
        let end = calendar::month_end_after(params.start_date, months)
            .unwrap_or(NaiveDate::MAX);
        (start, end)
    }

    /// Check extra payment dates against the simulation window
    ///
    /// Only fails under `OutOfRangePolicy::Reject`.
    pub fn check_extra_payments(&self, params: &LoanParameters, extra_payments: &[ExtraPayment]) -> LoanResult<()> {
        if self.config.out_of_range == OutOfRangePolicy::Ignore {
            return Ok(());
        }

        let (start, end) = self.simulation_window(params);
        match extra_payments.iter().find(|p| p.date < start || p.date > end) {
            Some(payment) => Err(LoanError::ExtraPaymentOutOfRange {
                date: payment.date,
                start,
                end,
            }),
            None => Ok(()),
        }
    }

    /// Run the simulation for a loan with extra payments only
    pub fn simulate(&self, params: &LoanParameters, extra_payments: &[ExtraPayment]) -> SimulationResult {
        self.simulate_with_events(params, &LoanEvents::from_payments(extra_payments))
    }

    /// Run the simulation with extra payments, rate changes and disbursements
    pub fn simulate_with_events(&self, params: &LoanParameters, events: &LoanEvents) -> SimulationResult {
        let (window_start, window_end) = self.simulation_window(params);

        let mut extra_payments: Vec<ExtraPayment> = events
            .extra_payments
            .iter()
            .filter(|p| p.date >= window_start && p.date <= window_end)
            .copied()
            .collect();
        if extra_payments.len() < events.extra_payments.len() {
            debug!(
                "Dropping {} extra payment(s) outside {} .. {}",
                events.extra_payments.len() - extra_payments.len(),
                window_start,
                window_end
            );
        }
        extra_payments.sort_by_key(|p| p.date);

        // Rate changes before the first month set the opening rate
        let mut opening_rate = params.annual_rate_percent;
        let mut rate_changes = events.rate_changes.clone();
        rate_changes.sort_by_key(|c| c.date);
        for change in rate_changes.iter().filter(|c| c.date < window_start) {
            opening_rate = change.annual_rate_percent;
        }

        let disbursements: Vec<LoanEvent> = events
            .disbursements
            .iter()
            .filter(|d| d.date >= window_start && d.date <= window_end)
            .map(|&d| LoanEvent::from(d))
            .collect();
        if disbursements.len() < events.disbursements.len() {
            debug!(
                "Dropping {} disbursement(s) outside {} .. {}",
                events.disbursements.len() - disbursements.len(),
                window_start,
                window_end
            );
        }

        let other_events: Vec<LoanEvent> = rate_changes
            .iter()
            .filter(|c| c.date >= window_start)
            .map(|&c| LoanEvent::from(c))
            .chain(disbursements)
            .collect();

        let mut state = SimulationState::from_params(params, opening_rate);
        let mut result = SimulationResult::new(BalanceSample {
            date: params.start_date,
            balance: params.principal,
        });
        if state.is_paid_off() {
            result.stop_reason = StopReason::PaidOff;
        }

        while state.month < self.config.max_months() && !state.is_paid_off() {
            state.begin_month();

            let payments = MonthPayments::for_month(
                state.current_date,
                params.default_monthly_payment,
                &extra_payments,
            );
            let default_payment_used = payments.is_default();
            let this_month = month_events(state.current_date, payments, &other_events);

            let mut flows = MonthFlows::default();
            let mut last_date = state.month_start();
            for event in &this_month {
                let days = calendar::days_between(last_date, event.date);
                state.apply_event(days, event.kind, &mut flows);
                last_date = event.date;
            }

            let month_end = state.month_end();
            result.add_sample(BalanceSample {
                date: month_end,
                balance: state.balance,
            });
            result.total_interest += flows.interest;
            result.total_paid += flows.paid;
            result.total_disbursed += flows.disbursed;

            debug!(
                "Month {:>3} ({}): interest={:.2} paid={:.2} balance={:.2}",
                state.month, month_end, flows.interest, flows.paid, state.balance
            );

            if self.config.detailed_output {
                result.months.push(MonthRecord {
                    month: state.month,
                    month_start: state.month_start(),
                    month_end,
                    opening_balance: state.opening_balance,
                    interest: flows.interest,
                    paid: flows.paid,
                    disbursed: flows.disbursed,
                    default_payment_used,
                    annual_rate_percent: state.annual_rate_percent,
                    closing_balance: state.balance,
                });
            }

            if state.close_month(self.config.non_convergence_streak) {
                warn!(
                    "Loan appears irrepayable: balance has not decreased for {} months (balance {:.2} at {})",
                    state.non_decreasing_streak, state.balance, month_end
                );
                result.stop_reason = StopReason::NonConvergent;
                break;
            }

            if state.is_paid_off() {
                result.stop_reason = StopReason::PaidOff;
                break;
            }

            if !state.advance_month() {
                break;
            }
        }

        info!(
            "Simulated {} month(s): {:?}, final balance {:.2}",
            result.months_simulated(),
            result.stop_reason,
            result.final_balance()
        );

        result
    }
}
