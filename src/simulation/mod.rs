//! Loan balance simulation

pub mod calendar;
mod engine;
mod samples;
mod schedule;
mod state;

pub use engine::{
    simulate, AmortizationSimulator, OutOfRangePolicy, SimulationConfig,
    DEFAULT_MAX_DURATION_YEARS, DEFAULT_NON_CONVERGENCE_STREAK,
};
pub use samples::{BalanceSample, MonthRecord, SimulationResult, SimulationSummary, StopReason};
pub use schedule::{month_events, MonthPayments};
pub use state::{MonthFlows, SimulationState};
