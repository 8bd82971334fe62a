//! Amortization System CLI
//!
//! Command-line interface for loan balance simulations and payment sweeps

use amortization_system::{
    loan::{load_extra_payments, load_loan_events, load_loan_parameters, write_samples_csv},
    scenario::{payment_count, payment_range, MAX_SWEEP_PAYMENTS},
    simulation::OutOfRangePolicy,
    AmortizationSimulator, LoanEvents, LoanParameters, ScenarioRunner, SimulationConfig,
};
use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "amortization", version, about = "Loan balance simulation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate one loan and print its balance over time
    Simulate {
        #[command(flatten)]
        loan: LoanArgs,

        /// Write samples to this CSV file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print the full result as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Compare payoff across a range of monthly payments
    Sweep {
        #[command(flatten)]
        loan: LoanArgs,

        /// Smallest monthly payment
        #[arg(long)]
        from: f64,

        /// Largest monthly payment
        #[arg(long)]
        to: f64,

        /// Payment increment
        #[arg(long, default_value_t = 100.0)]
        step: f64,
    },
}

#[derive(Args, Debug)]
struct LoanArgs {
    /// JSON file with principal, annual_rate_percent, default_monthly_payment, start_date
    #[arg(long)]
    loan: Option<PathBuf>,

    /// Principal amount
    #[arg(long, default_value_t = 100_000.0)]
    principal: f64,

    /// Annual interest rate in percent
    #[arg(long, default_value_t = 10.0)]
    rate: f64,

    /// Recurring monthly payment
    #[arg(long, default_value_t = 10_000.0)]
    payment: f64,

    /// Start date (YYYY-MM-DD, defaults to today UTC)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// CSV of extra payments (Date,Amount)
    #[arg(long)]
    extra_payments: Option<PathBuf>,

    /// CSV of loan events (Type,Date,Value)
    #[arg(long)]
    events: Option<PathBuf>,

    /// Maximum horizon in years
    #[arg(long, default_value_t = 20)]
    years: u32,

    /// Consecutive non-decreasing months before the loan is declared irrepayable (0 disables)
    #[arg(long, default_value_t = 3)]
    streak: u32,

    /// Fail on extra payments outside the simulated months instead of ignoring them
    #[arg(long)]
    reject_out_of_range: bool,
}

impl LoanArgs {
    fn parameters(&self) -> Result<LoanParameters> {
        match &self.loan {
            Some(path) => load_loan_parameters(path)
                .with_context(|| format!("Failed to load loan from {}", path.display())),
            None => Ok(LoanParameters::new(
                self.principal,
                self.rate,
                self.payment,
                self.start.unwrap_or_else(|| Utc::now().date_naive()),
            )),
        }
    }

    fn events(&self) -> Result<LoanEvents> {
        let mut events = match &self.events {
            Some(path) => LoanEvents::from_ledger(
                &load_loan_events(path)
                    .with_context(|| format!("Failed to load events from {}", path.display()))?,
            ),
            None => LoanEvents::default(),
        };
        if let Some(path) = &self.extra_payments {
            let payments = load_extra_payments(path)
                .with_context(|| format!("Failed to load extra payments from {}", path.display()))?;
            events.extra_payments.extend(payments);
        }
        Ok(events)
    }

    fn config(&self, detailed_output: bool) -> SimulationConfig {
        SimulationConfig {
            max_duration_years: self.years,
            non_convergence_streak: self.streak,
            out_of_range: if self.reject_out_of_range {
                OutOfRangePolicy::Reject
            } else {
                OutOfRangePolicy::Ignore
            },
            detailed_output,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Simulate { loan, output, json } => run_simulate(&loan, output, json),
        Command::Sweep { loan, from, to, step } => run_sweep(&loan, from, to, step),
    }
}

fn run_simulate(args: &LoanArgs, output: Option<PathBuf>, json: bool) -> Result<()> {
    let params = args.parameters()?;
    let events = args.events()?;
    let simulator = AmortizationSimulator::new(args.config(true));
    simulator.check_extra_payments(&params, &events.extra_payments)?;

    let result = simulator.simulate_with_events(&params, &events);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Principal: {:.2}  Rate: {:.3}%  Payment: {:.2}  Start: {}",
            params.principal, params.annual_rate_percent, params.default_monthly_payment, params.start_date);
        println!();
        println!("{:>5} {:>12} {:>14} {:>12} {:>12} {:>14}",
            "Month", "Date", "Opening", "Interest", "Paid", "Balance");
        println!("{}", "-".repeat(74));
        for row in &result.months {
            println!("{:>5} {:>12} {:>14.2} {:>12.2} {:>12.2} {:>14.2}{}",
                row.month,
                row.month_end,
                row.opening_balance,
                row.interest,
                row.paid,
                row.closing_balance,
                if row.default_payment_used { "" } else { "  *" },
            );
        }

        let summary = result.summary();
        println!("\nSummary:");
        println!("  Months: {}", summary.months_simulated);
        println!("  Outcome: {:?}", summary.stop_reason);
        println!("  Total Paid: {:.2}", summary.total_paid);
        println!("  Total Interest: {:.2}", summary.total_interest);
        if summary.total_disbursed > 0.0 {
            println!("  Total Disbursed: {:.2}", summary.total_disbursed);
        }
        println!("  Final Balance: {:.2}", summary.final_balance);
        if let Some(date) = summary.payoff_date {
            println!("  Paid Off: {}", date);
        }
    }

    if let Some(path) = output {
        let file = File::create(&path)
            .with_context(|| format!("Unable to create {}", path.display()))?;
        write_samples_csv(BufWriter::new(file), &result.samples)?;
        eprintln!("Samples written to: {}", path.display());
    }

    Ok(())
}

fn run_sweep(args: &LoanArgs, from: f64, to: f64, step: f64) -> Result<()> {
    let count = payment_count(from, to, step);
    if count == 0 {
        bail!("Empty payment range: --from {} --to {} --step {}", from, to, step);
    }
    if count > MAX_SWEEP_PAYMENTS {
        bail!(
            "Payment range has {} payments, more than the limit of {}; use a larger --step",
            count, MAX_SWEEP_PAYMENTS
        );
    }
    let payments = payment_range(from, to, step);

    let params = args.parameters()?;
    let events = args.events()?;
    let runner = ScenarioRunner::with_config(args.config(false));
    runner.simulator().check_extra_payments(&params, &events.extra_payments)?;

    println!("{:>12} {:>8} {:>16} {:>14} {:>14} {:>12}",
        "Payment", "Months", "Outcome", "Interest", "Balance", "Paid Off");
    println!("{}", "-".repeat(82));
    for (payment, summary) in runner.payment_sweep(&params, &events, &payments) {
        println!("{:>12.2} {:>8} {:>16} {:>14.2} {:>14.2} {:>12}",
            payment,
            summary.months_simulated,
            format!("{:?}", summary.stop_reason),
            summary.total_interest,
            summary.final_balance,
            summary.payoff_date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
        );
    }

    if let Some(minimum) = runner.minimum_converging_payment(&params, &events, &payments) {
        println!("\nSmallest payment that pays off: {:.2}", minimum);
    }

    Ok(())
}
