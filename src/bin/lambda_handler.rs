//! AWS Lambda handler for loan balance simulations
//!
//! Accepts loan terms, extra payments and optional events as JSON and returns
//! the balance samples with a summary. Invalid inputs produce a response with
//! `error` set rather than a failed invocation.

use amortization_system::{
    loan::{Disbursement, ExtraPayment, RateChange},
    simulation::{
        OutOfRangePolicy, SimulationConfig, SimulationSummary, StopReason,
        DEFAULT_MAX_DURATION_YEARS, DEFAULT_NON_CONVERGENCE_STREAK,
    },
    AmortizationSimulator, BalanceSample, LoanEvents, LoanParameters,
};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::info;
use serde::{Deserialize, Serialize};

/// Input for one simulation
#[derive(Debug, Deserialize)]
pub struct SimulationRequest {
    pub loan: LoanParameters,

    #[serde(default)]
    pub extra_payments: Vec<ExtraPayment>,

    #[serde(default)]
    pub rate_changes: Vec<RateChange>,

    #[serde(default)]
    pub disbursements: Vec<Disbursement>,

    /// Maximum horizon in years (default: 20)
    #[serde(default = "default_max_years")]
    pub max_duration_years: u32,

    /// Consecutive non-decreasing months before stopping (default: 3, 0 disables)
    #[serde(default = "default_streak")]
    pub non_convergence_streak: u32,

    /// Reject extra payments outside the simulated months
    #[serde(default)]
    pub reject_out_of_range: bool,
}

fn default_max_years() -> u32 { DEFAULT_MAX_DURATION_YEARS }
fn default_streak() -> u32 { DEFAULT_NON_CONVERGENCE_STREAK }

/// Output from the simulation
#[derive(Debug, Serialize)]
pub struct SimulationResponse {
    pub samples: Vec<BalanceSample>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SimulationSummary>,
    pub execution_time_us: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SimulationResponse {
    fn failed(message: String, start: std::time::Instant) -> Self {
        Self {
            samples: Vec::new(),
            stop_reason: None,
            summary: None,
            execution_time_us: start.elapsed().as_micros() as u64,
            error: Some(message),
        }
    }
}

/// Lambda handler function
async fn handler(event: LambdaEvent<SimulationRequest>) -> Result<SimulationResponse, Error> {
    let start = std::time::Instant::now();
    let request = event.payload;

    let config = SimulationConfig {
        max_duration_years: request.max_duration_years,
        non_convergence_streak: request.non_convergence_streak,
        out_of_range: if request.reject_out_of_range {
            OutOfRangePolicy::Reject
        } else {
            OutOfRangePolicy::Ignore
        },
        detailed_output: false,
    };
    let simulator = AmortizationSimulator::new(config);

    if let Err(e) = simulator.check_extra_payments(&request.loan, &request.extra_payments) {
        return Ok(SimulationResponse::failed(e.to_string(), start));
    }

    let events = LoanEvents {
        extra_payments: request.extra_payments,
        rate_changes: request.rate_changes,
        disbursements: request.disbursements,
    };
    let result = simulator.simulate_with_events(&request.loan, &events);
    let summary = result.summary();

    info!(
        "Simulated {} month(s) for principal {:.2}: {:?}",
        summary.months_simulated, request.loan.principal, summary.stop_reason
    );

    Ok(SimulationResponse {
        stop_reason: Some(result.stop_reason),
        summary: Some(summary),
        samples: result.samples,
        execution_time_us: start.elapsed().as_micros() as u64,
        error: None,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
