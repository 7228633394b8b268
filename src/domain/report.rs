use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Account, AccountType, Amount, Bookkeeping, Invoice, JournalEntry, JournalEntryDetail, Side};

/// One detail line of a journal entry as it appears in an account's ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerLine {
    pub date: NaiveDate,
    pub journal_entry_id: String,
    pub description: String,
    pub side: Side,
    pub amount: Amount,
    pub invoice: Option<Invoice>,
}

impl LedgerLine {
    pub fn debit_amount(&self) -> Option<Amount> {
        (self.side == Side::Debit).then_some(self.amount)
    }

    pub fn credit_amount(&self) -> Option<Amount> {
        (self.side == Side::Credit).then_some(self.amount)
    }

    fn signed_amount(&self) -> Amount {
        match self.side {
            Side::Debit => self.amount,
            Side::Credit => -self.amount,
        }
    }
}

/// Immutable snapshot of the ledger up to and including `end_date`, with the
/// ledger lines grouped per account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    end_date: NaiveDate,
    start_of_period: NaiveDate,
    currency: String,
    accounts: Vec<Account>,
    lines: BTreeMap<String, Vec<LedgerLine>>,
}

impl Report {
    /// Distribute the detail lines of every entry dated on or before `end_date`
    /// over the accounts they book on. Lines within an account are ordered by
    /// entry date, then entry id, then position within the entry.
    pub fn build(
        bookkeeping: &Bookkeeping,
        end_date: NaiveDate,
        mut accounts: Vec<Account>,
        entries: Vec<(JournalEntry, Vec<JournalEntryDetail>)>,
        invoices: &HashMap<String, Invoice>,
    ) -> Self {
        accounts.sort_by(|a, b| a.id.cmp(&b.id));

        let mut entries: Vec<_> = entries
            .into_iter()
            .filter(|(entry, _)| entry.date <= end_date)
            .collect();
        entries.sort_by(|(a, _), (b, _)| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

        let mut lines: BTreeMap<String, Vec<LedgerLine>> = accounts
            .iter()
            .map(|account| (account.id.clone(), Vec::new()))
            .collect();

        for (entry, details) in entries {
            for detail in details {
                let invoice = detail
                    .invoice_id
                    .as_ref()
                    .and_then(|id| invoices.get(id))
                    .cloned();
                lines.entry(detail.account_id).or_default().push(LedgerLine {
                    date: entry.date,
                    journal_entry_id: entry.id.clone(),
                    description: entry.description.clone(),
                    side: detail.side,
                    amount: detail.amount,
                    invoice,
                });
            }
        }

        Self {
            end_date,
            start_of_period: bookkeeping.start_of_period,
            currency: bookkeeping.currency.clone(),
            accounts,
            lines,
        }
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn start_of_period(&self) -> NaiveDate {
        self.start_of_period
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// All configured accounts, sorted by id, including those without lines.
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn accounts_of_type(&self, account_type: AccountType) -> impl Iterator<Item = &Account> {
        self.accounts
            .iter()
            .filter(move |a| a.account_type == account_type)
    }

    pub fn ledger_lines(&self, account_id: &str) -> &[LedgerLine] {
        self.lines.get(account_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every ledger line in the report, grouped by account id.
    pub fn all_ledger_lines(&self) -> impl Iterator<Item = (&str, &LedgerLine)> {
        self.lines
            .iter()
            .flat_map(|(id, lines)| lines.iter().map(move |line| (id.as_str(), line)))
    }

    pub fn debit_total(&self, account_id: &str) -> Amount {
        self.ledger_lines(account_id)
            .iter()
            .filter_map(LedgerLine::debit_amount)
            .sum()
    }

    pub fn credit_total(&self, account_id: &str) -> Amount {
        self.ledger_lines(account_id)
            .iter()
            .filter_map(LedgerLine::credit_amount)
            .sum()
    }

    /// Balance following the normal side of the account type: debits minus
    /// credits for asset, expense and debtor accounts, credits minus debits
    /// for the others.
    pub fn balance(&self, account: &Account) -> Amount {
        let debit_minus_credit = self.debit_total(&account.id) - self.credit_total(&account.id);
        match account.account_type.normal_side() {
            Side::Debit => debit_minus_credit,
            Side::Credit => -debit_minus_credit,
        }
    }

    /// Normal-side balance counting only lines dated within the period.
    pub fn period_balance(&self, account: &Account) -> Amount {
        let debit_minus_credit: Amount = self
            .ledger_lines(&account.id)
            .iter()
            .filter(|line| line.date >= self.start_of_period)
            .map(LedgerLine::signed_amount)
            .sum();
        match account.account_type.normal_side() {
            Side::Debit => debit_minus_credit,
            Side::Credit => -debit_minus_credit,
        }
    }

    pub fn total_of_type(&self, account_type: AccountType) -> Amount {
        self.accounts_of_type(account_type)
            .map(|a| self.balance(a))
            .sum()
    }

    /// Sum of debits minus credits over every line in the report. Zero for a
    /// ledger made of balanced journal entries.
    pub fn grand_total(&self) -> Amount {
        self.lines.values().flatten().map(LedgerLine::signed_amount).sum()
    }

    pub fn total_revenues(&self) -> Amount {
        self.accounts_of_type(AccountType::Revenue)
            .map(|a| self.period_balance(a))
            .sum()
    }

    pub fn total_expenses(&self) -> Amount {
        self.accounts_of_type(AccountType::Expense)
            .map(|a| self.period_balance(a))
            .sum()
    }

    /// Revenues minus expenses within the period; positive is a profit.
    pub fn result_of_operations(&self) -> Amount {
        self.total_revenues() - self.total_expenses()
    }

    /// Accounts that appear on the assets side of the balance sheet.
    pub fn assets_side(&self) -> impl Iterator<Item = &Account> {
        self.accounts
            .iter()
            .filter(|a| a.account_type.is_balance_sheet() && a.account_type.is_assets_side())
    }

    /// Accounts that appear on the liabilities side of the balance sheet.
    pub fn liabilities_side(&self) -> impl Iterator<Item = &Account> {
        self.accounts
            .iter()
            .filter(|a| a.account_type.is_balance_sheet() && !a.account_type.is_assets_side())
    }

    pub fn total_assets(&self) -> Amount {
        self.assets_side().map(|a| self.balance(a)).sum()
    }

    pub fn total_liabilities(&self) -> Amount {
        self.liabilities_side().map(|a| self.balance(a)).sum()
    }
}
