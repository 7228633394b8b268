use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::domain::{
    AccountType, Amount, JournalEntry, JournalEntryDetail, PartySearchCriteria, Report,
    remaining_amount,
};
use crate::storage::{DocumentSeed, Posting};

use super::{
    BalanceSheet, ConfigurationService, Document, IncomeStatement, InvoiceService, LedgerService,
    PartyService, ServiceError,
};

/// Id of the entry that opens a period created by closing the previous one.
pub const OPENING_ENTRY_ID: &str = "opening-balance";

/// Reports over the whole ledger and closing of a bookkeeping period.
#[derive(Debug, Clone, Default)]
pub struct BookkeepingService {
    configuration: ConfigurationService,
    ledger: LedgerService,
    invoices: InvoiceService,
    parties: PartyService,
}

impl BookkeepingService {
    pub fn new(
        configuration: ConfigurationService,
        ledger: LedgerService,
        invoices: InvoiceService,
        parties: PartyService,
    ) -> Self {
        Self {
            configuration,
            ledger,
            invoices,
            parties,
        }
    }

    /// Snapshot of the ledger up to and including `date`.
    pub async fn create_report(&self, document: &Document, date: NaiveDate) -> Result<Report, ServiceError> {
        debug!(%date, "creating report");
        let bookkeeping = self.configuration.get_bookkeeping(document).await?;
        let accounts = self.configuration.find_all_accounts(document).await?;
        let entries = document
            .repo()
            .list_journal_entries_with_details(Some(date))
            .await?;
        let invoices: HashMap<_, _> = document
            .repo()
            .list_invoices()
            .await?
            .into_iter()
            .map(|invoice| (invoice.id.clone(), invoice))
            .collect();

        Ok(Report::build(&bookkeeping, date, accounts, entries, &invoices))
    }

    pub async fn balance_sheet(&self, document: &Document, date: NaiveDate) -> Result<BalanceSheet, ServiceError> {
        let report = self.create_report(document, date).await?;
        Ok(BalanceSheet::from_report(&report))
    }

    pub async fn income_statement(
        &self,
        document: &Document,
        date: NaiveDate,
    ) -> Result<IncomeStatement, ServiceError> {
        let report = self.create_report(document, date).await?;
        Ok(IncomeStatement::from_report(&report))
    }

    /// Close the period of `document` on `closing_date` and start the next one
    /// in a new document at `new_path`.
    ///
    /// The new document carries over settings, accounts, parties and the
    /// invoices still open on the closing date, re-based to what remained to be
    /// paid on that date. It opens with one journal entry restoring every
    /// balance sheet account, with the result of the closed period booked on
    /// `equity_account_id`. Entries dated after the closing date move to the
    /// new document unchanged, together with every invoice they create or pay.
    ///
    /// The old document is only marked closed once the new one is complete; on
    /// any failure before that it is left untouched. If marking it closed
    /// fails, the new document is deleted again so the close can be retried.
    pub async fn close_bookkeeping(
        &self,
        document: &Document,
        new_path: impl AsRef<Path>,
        description: &str,
        closing_date: NaiveDate,
        equity_account_id: &str,
    ) -> Result<Document, ServiceError> {
        let bookkeeping = document.ensure_open().await?;
        let equity_account = self
            .configuration
            .get_account(document, equity_account_id)
            .await?;
        if equity_account.account_type != AccountType::Equity {
            return Err(ServiceError::validation(format!(
                "Account {} is of type {}; closing requires an equity account",
                equity_account.id, equity_account.account_type
            )));
        }
        if closing_date < bookkeeping.start_of_period {
            return Err(ServiceError::validation(format!(
                "Closing date {} is before the start of period {}",
                closing_date, bookkeeping.start_of_period
            )));
        }

        let report = self.create_report(document, closing_date).await?;
        let result = report.result_of_operations();

        let mut details = Vec::new();
        for account in report.accounts() {
            if !account.account_type.is_balance_sheet() {
                continue;
            }
            let mut debit_minus_credit =
                report.debit_total(&account.id) - report.credit_total(&account.id);
            if account.id == equity_account.id {
                debit_minus_credit -= result;
            }
            if !debit_minus_credit.is_zero() {
                details.push(opening_detail(&account.id, debit_minus_credit));
            }
        }
        let opening_entry = if details.is_empty() {
            None
        } else {
            let entry = JournalEntry::new(OPENING_ENTRY_ID, closing_date, "Opening balance");
            self.ledger
                .check_entry(document, &bookkeeping, &entry, &details, true, None)
                .await?;
            Some(Posting {
                entry,
                details,
                invoice: None,
            })
        };

        let later_entries: Vec<Posting> = document
            .repo()
            .list_journal_entries_with_details(None)
            .await?
            .into_iter()
            .filter(|(entry, _)| entry.date > closing_date)
            .map(|(entry, details)| Posting {
                entry,
                details,
                invoice: None,
            })
            .collect();
        if opening_entry.is_some() && later_entries.iter().any(|p| p.entry.id == OPENING_ENTRY_ID) {
            return Err(ServiceError::duplicate("Journal entry", OPENING_ENTRY_ID));
        }
        let used_later: HashSet<&str> = later_entries
            .iter()
            .flat_map(|posting| {
                posting
                    .details
                    .iter()
                    .filter_map(|detail| detail.invoice_id.as_deref())
                    .chain(posting.entry.id_of_created_invoice.as_deref())
            })
            .collect();

        let mut invoices = Vec::new();
        for invoice in document.repo().list_invoices().await? {
            let payments = self.invoices.find_payments(document, &invoice).await?;
            let remaining = remaining_amount(&invoice, &payments, closing_date);
            if remaining.is_zero() && !used_later.contains(invoice.id.as_str()) {
                continue;
            }
            let lines = self.invoices.find_invoice_lines(document, &invoice).await?;
            let mut carried = invoice;
            carried.amount_to_be_paid = remaining;
            invoices.push((carried, lines));
        }

        let seed = DocumentSeed {
            bookkeeping: bookkeeping.next_period(description, closing_date),
            accounts: report.accounts().to_vec(),
            parties: self
                .parties
                .find_parties(document, &PartySearchCriteria::default())
                .await?,
            invoices,
            opening_entry,
            entries: later_entries,
        };

        let new_document = Document::create_from_seed(new_path, &seed).await?;
        if let Err(err) = document.repo().mark_closed().await {
            let path = new_document.path().to_path_buf();
            if let Err(cleanup) = new_document.discard().await {
                warn!(path = %path.display(), error = %cleanup, "failed to remove new document after failed close");
            }
            return Err(err.into());
        }
        info!(
            closed = %bookkeeping.description,
            opened = %description,
            %closing_date,
            %result,
            carried_invoices = seed.invoices.len(),
            carried_entries = seed.entries.len(),
            path = %new_document.path().display(),
            "closed bookkeeping"
        );
        Ok(new_document)
    }
}

fn opening_detail(account_id: &str, debit_minus_credit: Amount) -> JournalEntryDetail {
    if debit_minus_credit.is_negative() {
        JournalEntryDetail::credit(account_id, debit_minus_credit.abs())
    } else {
        JournalEntryDetail::debit(account_id, debit_minus_credit)
    }
}
