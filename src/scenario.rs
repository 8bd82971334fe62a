//! Scenario runner for batch simulations
//!
//! Holds one simulation config and re-runs the simulator over many loan
//! variants, in parallel where the variants are independent.

use rayon::prelude::*;

use crate::loan::{LoanEvents, LoanParameters};
use crate::simulation::{AmortizationSimulator, SimulationConfig, SimulationResult, SimulationSummary, StopReason};

/// Largest number of payments a single sweep will simulate
pub const MAX_SWEEP_PAYMENTS: usize = 10_000;

/// Pre-configured runner for batch simulations
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
///
/// // Compare a range of monthly payments
/// let sweep = runner.payment_sweep(&params, &events, &[1000.0, 1500.0, 2000.0]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    simulator: AmortizationSimulator,
}

impl ScenarioRunner {
    /// Create runner with the default simulation config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create runner with a specific config
    pub fn with_config(config: SimulationConfig) -> Self {
        Self {
            simulator: AmortizationSimulator::new(config),
        }
    }

    /// Run a single simulation
    pub fn run(&self, params: &LoanParameters, events: &LoanEvents) -> SimulationResult {
        self.simulator.simulate_with_events(params, events)
    }

    /// Run many independent loans in parallel, results in input order
    pub fn run_batch(&self, loans: &[(LoanParameters, LoanEvents)]) -> Vec<SimulationResult> {
        loans
            .par_iter()
            .map(|(params, events)| self.simulator.simulate_with_events(params, events))
            .collect()
    }

    /// Simulate the same loan with each monthly payment in `payments`
    pub fn payment_sweep(
        &self,
        params: &LoanParameters,
        events: &LoanEvents,
        payments: &[f64],
    ) -> Vec<(f64, SimulationSummary)> {
        payments
            .par_iter()
            .map(|&payment| {
                let variant = LoanParameters {
                    default_monthly_payment: payment,
                    ..params.clone()
                };
                (payment, self.simulator.simulate_with_events(&variant, events).summary())
            })
            .collect()
    }

    /// Smallest payment in `payments` that pays the loan off within the horizon
    pub fn minimum_converging_payment(
        &self,
        params: &LoanParameters,
        events: &LoanEvents,
        payments: &[f64],
    ) -> Option<f64> {
        self.payment_sweep(params, events, payments)
            .into_iter()
            .filter(|(_, summary)| summary.stop_reason == StopReason::PaidOff)
            .map(|(payment, _)| payment)
            .min_by(|a, b| a.total_cmp(b))
    }

    pub fn simulator(&self) -> &AmortizationSimulator {
        &self.simulator
    }
}

/// Number of payments `payment_range` would produce, without allocating
///
/// Zero when `step` is not positive, `to < from`, or an input is not finite.
/// Saturates at `usize::MAX` for absurdly wide ranges.
pub fn payment_count(from: f64, to: f64, step: f64) -> usize {
    if !(from.is_finite() && to.is_finite() && step.is_finite()) || step <= 0.0 || to < from {
        return 0;
    }
    (((to - from) / step + 1e-9).floor() as usize).saturating_add(1)
}

/// Evenly spaced payments from `from` to `to` inclusive
///
/// Empty when `step` is not positive or `to < from`. Callers taking
/// user input should check `payment_count` against `MAX_SWEEP_PAYMENTS` first.
pub fn payment_range(from: f64, to: f64, step: f64) -> Vec<f64> {
    let count = payment_count(from, to, step);
    (0..count).map(|i| from + step * i as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn test_params() -> LoanParameters {
        LoanParameters::new(100_000.0, 10.0, 10_000.0, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
    }

    #[test]
    fn test_payment_sweep_orders_payoff() {
        let runner = ScenarioRunner::new();
        let sweep = runner.payment_sweep(&test_params(), &LoanEvents::default(), &[2_000.0, 5_000.0, 10_000.0]);

        assert_eq!(sweep.len(), 3);
        assert_eq!(sweep[0].0, 2_000.0);

        // Higher payment pays off sooner with less interest
        assert!(sweep.iter().all(|(_, s)| s.stop_reason == StopReason::PaidOff));
        assert!(sweep[2].1.months_simulated < sweep[0].1.months_simulated);
        assert!(sweep[2].1.total_interest < sweep[0].1.total_interest);
    }

    #[test]
    fn test_minimum_converging_payment() {
        let runner = ScenarioRunner::new();
        // Monthly interest on 100k at 10% is roughly 850
        let payments = payment_range(500.0, 1_500.0, 250.0);
        let minimum = runner.minimum_converging_payment(&test_params(), &LoanEvents::default(), &payments);
        assert_eq!(minimum, Some(1_000.0));
    }

    #[test]
    fn test_run_batch_matches_single_runs() {
        let runner = ScenarioRunner::new();
        let loans = vec![
            (test_params(), LoanEvents::default()),
            (LoanParameters { principal: 50_000.0, ..test_params() }, LoanEvents::default()),
        ];

        let results = runner.run_batch(&loans);
        assert_eq!(results.len(), 2);
        assert_eq!(results[1], runner.run(&loans[1].0, &loans[1].1));
        assert!(results[1].months_simulated() < results[0].months_simulated());
    }

    #[test]
    fn test_payment_range() {
        assert_eq!(payment_range(100.0, 300.0, 100.0), vec![100.0, 200.0, 300.0]);
        assert_eq!(payment_range(100.0, 250.0, 100.0), vec![100.0, 200.0]);
        assert!(payment_range(100.0, 50.0, 10.0).is_empty());
        assert!(payment_range(100.0, 200.0, 0.0).is_empty());
    }

    #[test]
    fn test_payment_count_of_huge_range() {
        assert_eq!(payment_count(100.0, 300.0, 100.0), 3);
        assert!(payment_count(0.0, 1e18, 1.0) > MAX_SWEEP_PAYMENTS);
        assert_eq!(payment_count(0.0, f64::MAX, f64::MIN_POSITIVE), usize::MAX);
        assert_eq!(payment_count(0.0, f64::INFINITY, 1.0), 0);
        assert_eq!(payment_count(f64::NAN, 10.0, 1.0), 0);
    }
}
