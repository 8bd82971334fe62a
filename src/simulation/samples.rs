//! Simulation output structures

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Remaining balance on a date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceSample {
    pub date: NaiveDate,
    pub balance: f64,
}

/// Detailed accounting for one simulated month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthRecord {
    /// Simulated month (1-indexed)
    pub month: u32,
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,

    /// Balance carried in from the previous month end
    pub opening_balance: f64,

    /// Interest added to the balance during the month
    pub interest: f64,

    /// Payments actually taken off the balance (capped by the balance at payoff)
    pub paid: f64,

    /// Principal drawn during the month
    pub disbursed: f64,

    /// True when no extra payments fell in the month
    pub default_payment_used: bool,

    /// Annual rate in percent in force at month end
    pub annual_rate_percent: f64,

    pub closing_balance: f64,
}

/// Why the simulation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// Balance reached zero
    PaidOff,
    /// Month-end balance failed to decrease for too many consecutive months
    NonConvergent,
    /// Maximum horizon simulated with a balance still outstanding
    HorizonReached,
}

/// Complete simulation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Initial sample followed by one sample per month end
    pub samples: Vec<BalanceSample>,

    /// Per-month detail, empty unless detailed output was requested
    pub months: Vec<MonthRecord>,

    pub stop_reason: StopReason,

    pub total_interest: f64,
    pub total_paid: f64,
    pub total_disbursed: f64,
}

impl SimulationResult {
    pub fn new(start: BalanceSample) -> Self {
        Self {
            samples: vec![start],
            months: Vec::new(),
            stop_reason: StopReason::HorizonReached,
            total_interest: 0.0,
            total_paid: 0.0,
            total_disbursed: 0.0,
        }
    }

    /// Add a month-end sample
    pub fn add_sample(&mut self, sample: BalanceSample) {
        self.samples.push(sample);
    }

    /// Number of months simulated
    pub fn months_simulated(&self) -> u32 {
        self.samples.len().saturating_sub(1) as u32
    }

    pub fn final_balance(&self) -> f64 {
        self.samples.last().map(|s| s.balance).unwrap_or(0.0)
    }

    /// Month-end date on which the balance reached zero
    pub fn payoff_date(&self) -> Option<NaiveDate> {
        match self.stop_reason {
            StopReason::PaidOff => self.samples.last().map(|s| s.date),
            _ => None,
        }
    }

    /// Get summary statistics
    pub fn summary(&self) -> SimulationSummary {
        SimulationSummary {
            months_simulated: self.months_simulated(),
            stop_reason: self.stop_reason,
            total_paid: self.total_paid,
            total_interest: self.total_interest,
            total_disbursed: self.total_disbursed,
            final_balance: self.final_balance(),
            payoff_date: self.payoff_date(),
        }
    }
}

/// Summary statistics for a simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub months_simulated: u32,
    pub stop_reason: StopReason,
    pub total_paid: f64,
    pub total_interest: f64,
    pub total_disbursed: f64,
    pub final_balance: f64,
    pub payoff_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_of_unpaid_result() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut result = SimulationResult::new(BalanceSample { date: start, balance: 100.0 });
        result.add_sample(BalanceSample { date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(), balance: 60.0 });

        let summary = result.summary();
        assert_eq!(summary.months_simulated, 1);
        assert_eq!(summary.final_balance, 60.0);
        assert_eq!(summary.stop_reason, StopReason::HorizonReached);
        assert_eq!(summary.payoff_date, None);
    }
}
