//! Loan terms, dated loan events and input loading

mod data;
pub mod loader;

pub use data::{
    Disbursement, ExtraPayment, LoanEvent, LoanEventKind, LoanEvents, LoanParameters, RateChange,
};
pub use loader::{
    load_extra_payments, load_extra_payments_from_reader, load_loan_events,
    load_loan_events_from_reader, load_loan_parameters, write_samples_csv,
};
