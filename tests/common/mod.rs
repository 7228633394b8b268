// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use gogoaccount::application::{Document, Services};
use gogoaccount::domain::{
    Account, AccountType, Amount, Bookkeeping, JournalEntry, JournalEntryDetail, Party,
};
use tempfile::TempDir;

/// Helper to create a fresh document in a temporary directory. The period
/// starts on 2024-01-01.
pub async fn test_document() -> Result<(Document, Services, TempDir)> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("bookkeeping.db");
    let bookkeeping = Bookkeeping::new("2024", parse_date("2024-01-01"));
    let document = Document::create(&path, &bookkeeping).await?;
    Ok((document, Services::new(), temp_dir))
}

/// Helper to parse a date string into a NaiveDate
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

pub fn eur(amount: &str) -> Amount {
    amount.parse().unwrap()
}

/// Test fixture: Standard chart of accounts
pub struct StandardAccounts;

impl StandardAccounts {
    pub const CASH: &'static str = "1000";
    pub const BANK: &'static str = "1010";
    pub const DEBTORS: &'static str = "1300";
    pub const CREDITORS: &'static str = "1600";
    pub const EQUITY: &'static str = "3000";
    pub const CONTRIBUTIONS: &'static str = "8000";
    pub const RENT: &'static str = "4000";

    pub async fn create(document: &Document, services: &Services) -> Result<()> {
        let accounts = [
            (Self::CASH, "Cash", AccountType::Asset),
            (Self::BANK, "Bank", AccountType::Asset),
            (Self::DEBTORS, "Debtors", AccountType::Debtor),
            (Self::CREDITORS, "Creditors", AccountType::Creditor),
            (Self::EQUITY, "Equity", AccountType::Equity),
            (Self::CONTRIBUTIONS, "Contributions", AccountType::Revenue),
            (Self::RENT, "Rent", AccountType::Expense),
        ];
        for (id, name, account_type) in accounts {
            services
                .configuration
                .create_account(document, Account::new(id, name, account_type))
                .await?;
        }
        Ok(())
    }

    /// Book the starting capital: cash against equity
    pub async fn fund(document: &Document, services: &Services, amount: &str, date: &str) -> Result<()> {
        services
            .ledger
            .add_journal_entry(
                document,
                JournalEntry::new("start", parse_date(date), "Starting capital"),
                vec![
                    JournalEntryDetail::debit(Self::CASH, eur(amount)),
                    JournalEntryDetail::credit(Self::EQUITY, eur(amount)),
                ],
                true,
            )
            .await?;
        Ok(())
    }
}

/// Test fixture: two members and one supplier
pub async fn create_parties(document: &Document, services: &Services) -> Result<()> {
    let parties = [
        Party::new("p1", "Alice Jansen").with_type("member"),
        Party::new("p2", "Bob de Vries").with_type("member"),
        Party::new("s1", "Hall Rental Ltd").with_type("supplier"),
    ];
    for party in parties {
        services.parties.create_party(document, party).await?;
    }
    Ok(())
}
