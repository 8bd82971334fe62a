//! Amortization System - month-by-month loan balance simulation
//!
//! This library provides:
//! - Day-count interest accrual with chronological payment application
//! - Extra payments that replace the recurring payment in their month
//! - Rate changes and disbursements merged into the monthly event walk
//! - Payoff and non-convergence detection over a bounded horizon
//! - Batch simulations and monthly payment sweeps

pub mod error;
pub mod loan;
pub mod simulation;
pub mod scenario;

// Re-export commonly used types
pub use error::{LoanError, LoanResult};
pub use loan::{ExtraPayment, LoanEvent, LoanEvents, LoanParameters};
pub use simulation::{simulate, AmortizationSimulator, BalanceSample, SimulationConfig, SimulationResult};
pub use scenario::ScenarioRunner;
