//! Load loan inputs from CSV/JSON and write balance samples to CSV

use chrono::NaiveDate;
use csv::Reader;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use crate::error::{LoanError, LoanResult};
use crate::simulation::BalanceSample;
use super::{ExtraPayment, LoanEvent, LoanEventKind, LoanParameters};

/// Raw CSV row of an extra payments file (Date,Amount)
#[derive(Debug, serde::Deserialize)]
struct PaymentRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Amount")]
    amount: f64,
}

/// Raw CSV row of a loan events file (Type,Date,Value)
#[derive(Debug, serde::Deserialize)]
struct EventRow {
    #[serde(rename = "Type")]
    event_type: String,
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Value")]
    value: f64,
}

impl EventRow {
    fn to_event(self) -> LoanResult<LoanEvent> {
        let kind = match self.event_type.as_str() {
            "Payment" => LoanEventKind::Payment { amount: self.value },
            "RateChange" => LoanEventKind::RateChange { annual_rate_percent: self.value },
            "Disbursement" => LoanEventKind::Disbursement { amount: self.value },
            other => return Err(LoanError::UnknownEventType(other.to_string())),
        };
        Ok(LoanEvent { date: self.date, kind })
    }
}

/// Load extra payments from a CSV file
pub fn load_extra_payments<P: AsRef<Path>>(path: P) -> LoanResult<Vec<ExtraPayment>> {
    load_extra_payments_from_reader(File::open(path)?)
}

/// Load extra payments from any reader
pub fn load_extra_payments_from_reader<R: Read>(reader: R) -> LoanResult<Vec<ExtraPayment>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut payments = Vec::new();

    for result in csv_reader.deserialize() {
        let row: PaymentRow = result?;
        payments.push(ExtraPayment::new(row.date, row.amount));
    }

    Ok(payments)
}

/// Load a mixed event ledger (payments, rate changes, disbursements) from a CSV file
pub fn load_loan_events<P: AsRef<Path>>(path: P) -> LoanResult<Vec<LoanEvent>> {
    load_loan_events_from_reader(File::open(path)?)
}

/// Load a mixed event ledger from any reader
pub fn load_loan_events_from_reader<R: Read>(reader: R) -> LoanResult<Vec<LoanEvent>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut events = Vec::new();

    for result in csv_reader.deserialize() {
        let row: EventRow = result?;
        events.push(row.to_event()?);
    }

    Ok(events)
}

/// Load loan terms from a JSON file
pub fn load_loan_parameters<P: AsRef<Path>>(path: P) -> LoanResult<LoanParameters> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Write samples as CSV (Date,Balance)
pub fn write_samples_csv<W: Write>(writer: W, samples: &[BalanceSample]) -> LoanResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["Date", "Balance"])?;
    for sample in samples {
        csv_writer.write_record([sample.date.to_string(), format!("{:.2}", sample.balance)])?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::LoanEvents;

    #[test]
    fn test_load_extra_payments() {
        let data = "Date,Amount\n2024-03-15,5000\n2024-01-10,250.5\n";
        let payments = load_extra_payments_from_reader(data.as_bytes()).unwrap();

        assert_eq!(payments.len(), 2);
        assert_eq!(payments[0].date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(payments[1].amount, 250.5);
    }

    #[test]
    fn test_load_extra_payments_bad_date() {
        let data = "Date,Amount\n15/03/2024,5000\n";
        assert!(matches!(load_extra_payments_from_reader(data.as_bytes()), Err(LoanError::Csv(_))));
    }

    #[test]
    fn test_load_loan_events() {
        let data = "Type,Date,Value\nRateChange,2024-06-01,8.5\nDisbursement,2024-02-01,10000\nPayment,2024-02-20,1500\n";
        let events = load_loan_events_from_reader(data.as_bytes()).unwrap();

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].kind, LoanEventKind::RateChange { annual_rate_percent: 8.5 });

        let typed = LoanEvents::from_ledger(&events);
        assert_eq!(typed.extra_payments.len(), 1);
        assert_eq!(typed.rate_changes.len(), 1);
        assert_eq!(typed.disbursements[0].amount, 10000.0);
    }

    #[test]
    fn test_unknown_event_type() {
        let data = "Type,Date,Value\nRefund,2024-06-01,10\n";
        match load_loan_events_from_reader(data.as_bytes()) {
            Err(LoanError::UnknownEventType(t)) => assert_eq!(t, "Refund"),
            other => panic!("expected UnknownEventType, got {:?}", other),
        }
    }

    #[test]
    fn test_loan_parameters_json() {
        let json = r#"{"principal":100000,"annual_rate_percent":10,"default_monthly_payment":10000,"start_date":"2024-01-15"}"#;
        let params: LoanParameters = serde_json::from_str(json).unwrap();
        assert_eq!(params.start_date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(params.default_monthly_payment, 10000.0);
    }

    #[test]
    fn test_write_samples_csv() {
        let samples = vec![
            BalanceSample { date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), balance: 1000.0 },
            BalanceSample { date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(), balance: 512.3456 },
        ];
        let mut out = Vec::new();
        write_samples_csv(&mut out, &samples).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "Date,Balance\n2024-01-01,1000.00\n2024-01-31,512.35\n");
    }
}
