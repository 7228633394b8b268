use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;

use crate::application::{BalanceSheet, IncomeStatement};
use crate::domain::Report;

/// Full report snapshot for JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub report: Report,
}

/// Exporter for converting a report to various formats
pub struct Exporter<'a> {
    report: &'a Report,
}

impl<'a> Exporter<'a> {
    pub fn new(report: &'a Report) -> Self {
        Self { report }
    }

    /// Export every ledger line to CSV, grouped by account
    pub async fn export_report_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let names: HashMap<&str, &str> = self
            .report
            .accounts()
            .iter()
            .map(|a| (a.id.as_str(), a.name.as_str()))
            .collect();
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "account_id",
            "account_name",
            "date",
            "entry_id",
            "description",
            "debit",
            "credit",
            "invoice_id",
        ])?;

        let mut count = 0;
        for (account_id, line) in self.report.all_ledger_lines() {
            csv_writer.write_record([
                account_id.to_string(),
                names.get(account_id).copied().unwrap_or_default().to_string(),
                line.date.to_string(),
                line.journal_entry_id.clone(),
                line.description.clone(),
                line.debit_amount().map(|a| a.to_string()).unwrap_or_default(),
                line.credit_amount().map(|a| a.to_string()).unwrap_or_default(),
                line.invoice
                    .as_ref()
                    .map(|invoice| invoice.id.clone())
                    .unwrap_or_default(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    pub async fn export_balance_sheet_json<W: Write>(&self, writer: W) -> Result<BalanceSheet> {
        let balance_sheet = BalanceSheet::from_report(self.report);
        write_json(writer, &balance_sheet)?;
        Ok(balance_sheet)
    }

    pub async fn export_income_statement_json<W: Write>(&self, writer: W) -> Result<IncomeStatement> {
        let statement = IncomeStatement::from_report(self.report);
        write_json(writer, &statement)?;
        Ok(statement)
    }

    /// Export the whole report, ledger lines included, as a JSON snapshot
    pub async fn export_full_json<W: Write>(&self, writer: W) -> Result<ReportSnapshot> {
        let snapshot = ReportSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            report: self.report.clone(),
        };
        write_json(writer, &snapshot)?;
        Ok(snapshot)
    }
}

fn write_json<W: Write, T: Serialize>(mut writer: W, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Account, AccountType, Amount, Bookkeeping, JournalEntry, JournalEntryDetail,
    };
    use chrono::NaiveDate;

    fn sample_report() -> Report {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bookkeeping = Bookkeeping::new("2024", start);
        let accounts = vec![
            Account::new("1000", "Cash", AccountType::Asset),
            Account::new("3000", "Capital", AccountType::Equity),
        ];
        let entry = JournalEntry::new("1", start, "Start capital");
        let details = vec![
            JournalEntryDetail::debit("1000", Amount::from_cents(100_000)),
            JournalEntryDetail::credit("3000", Amount::from_cents(100_000)),
        ];
        Report::build(&bookkeeping, start, accounts, vec![(entry, details)], &HashMap::new())
    }

    #[tokio::test]
    async fn test_report_csv_has_one_row_per_line() {
        let report = sample_report();
        let mut out = Vec::new();

        let count = Exporter::new(&report).export_report_csv(&mut out).await.unwrap();

        assert_eq!(count, 2);
        let text = String::from_utf8(out).unwrap();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(
            rows[0],
            "account_id,account_name,date,entry_id,description,debit,credit,invoice_id"
        );
        assert_eq!(rows[1], "1000,Cash,2024-01-01,1,Start capital,1000.00,,");
        assert_eq!(rows[2], "3000,Capital,2024-01-01,1,Start capital,,1000.00,");
    }

    #[tokio::test]
    async fn test_balance_sheet_json() {
        let report = sample_report();
        let mut out = Vec::new();

        let sheet = Exporter::new(&report)
            .export_balance_sheet_json(&mut out)
            .await
            .unwrap();

        assert!(sheet.is_balanced());
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["total_assets"], 100_000);
        assert_eq!(value["currency"], "EUR");
    }
}
