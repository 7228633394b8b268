use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::domain::{
    Bookkeeping, Invoice, InvoiceLine, JournalEntry, JournalEntryDetail, validate_journal_entry,
};
use crate::storage::Posting;

use super::invoice::check_new_invoice;
use super::{ConfigurationService, Document, ServiceError};

/// Records and queries journal entries.
#[derive(Debug, Clone, Default)]
pub struct LedgerService {
    configuration: ConfigurationService,
}

impl LedgerService {
    pub fn new(configuration: ConfigurationService) -> Self {
        Self { configuration }
    }

    /// Store a journal entry with its detail lines. With `validate_balance`
    /// the debits must equal the credits.
    pub async fn add_journal_entry(
        &self,
        document: &Document,
        entry: JournalEntry,
        details: Vec<JournalEntryDetail>,
        validate_balance: bool,
    ) -> Result<JournalEntry, ServiceError> {
        let bookkeeping = document.ensure_open().await?;
        if document.repo().get_journal_entry(&entry.id).await?.is_some() {
            return Err(ServiceError::duplicate("Journal entry", entry.id));
        }
        self.check_entry(document, &bookkeeping, &entry, &details, validate_balance, None)
            .await?;

        let posting = Posting {
            entry,
            details,
            invoice: None,
        };
        document.repo().save_posting(&posting).await?;
        info!(id = %posting.entry.id, date = %posting.entry.date, "added journal entry");
        Ok(posting.entry)
    }

    /// Store a journal entry together with the invoice it issues. Both are
    /// written or neither is.
    pub async fn add_journal_entry_creating_invoice(
        &self,
        document: &Document,
        entry: JournalEntry,
        details: Vec<JournalEntryDetail>,
        invoice: Invoice,
        lines: Vec<InvoiceLine>,
    ) -> Result<JournalEntry, ServiceError> {
        let bookkeeping = document.ensure_open().await?;
        if document.repo().get_journal_entry(&entry.id).await?.is_some() {
            return Err(ServiceError::duplicate("Journal entry", entry.id));
        }
        check_new_invoice(document, &invoice).await?;
        self.check_entry(document, &bookkeeping, &entry, &details, true, Some(&invoice.id))
            .await?;

        let posting = Posting {
            entry: entry.with_created_invoice(invoice.id.clone()),
            details,
            invoice: Some((invoice, lines)),
        };
        document.repo().save_posting(&posting).await?;
        info!(
            id = %posting.entry.id,
            invoice = ?posting.entry.id_of_created_invoice,
            "added journal entry creating invoice"
        );
        Ok(posting.entry)
    }

    /// Replace id, date, description and details of an existing entry,
    /// identified by its unique id. The invoice it created stays linked.
    pub async fn update_journal_entry(
        &self,
        document: &Document,
        entry: JournalEntry,
        details: Vec<JournalEntryDetail>,
    ) -> Result<JournalEntry, ServiceError> {
        let bookkeeping = document.ensure_open().await?;
        let existing = self.find_journal_entries(document).await?;
        let original = existing
            .iter()
            .find(|e| e.unique_id == entry.unique_id)
            .ok_or_else(|| ServiceError::not_found("Journal entry", entry.id.clone()))?;
        if existing
            .iter()
            .any(|e| e.id == entry.id && e.unique_id != entry.unique_id)
        {
            return Err(ServiceError::duplicate("Journal entry", entry.id));
        }
        self.check_entry(document, &bookkeeping, &entry, &details, true, None)
            .await?;

        let entry = JournalEntry {
            id_of_created_invoice: original.id_of_created_invoice.clone(),
            ..entry
        };
        document.repo().update_journal_entry(&entry, &details).await?;
        info!(id = %entry.id, "updated journal entry");
        Ok(entry)
    }

    /// Remove an entry and the invoice it created. Refused when that invoice
    /// has already received payments.
    pub async fn remove_journal_entry(&self, document: &Document, id: &str) -> Result<(), ServiceError> {
        document.ensure_open().await?;
        let entry = self.get_journal_entry(document, id).await?;
        if let Some(invoice_id) = &entry.id_of_created_invoice {
            if document.repo().has_payments(invoice_id).await? {
                return Err(ServiceError::validation(format!(
                    "Journal entry {} created invoice {} which has payments",
                    entry.id, invoice_id
                )));
            }
        }

        document.repo().delete_journal_entry(&entry).await?;
        info!(id, "removed journal entry");
        Ok(())
    }

    pub async fn get_journal_entry(&self, document: &Document, id: &str) -> Result<JournalEntry, ServiceError> {
        document
            .repo()
            .get_journal_entry(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Journal entry", id))
    }

    /// All journal entries, ordered by date then id.
    pub async fn find_journal_entries(&self, document: &Document) -> Result<Vec<JournalEntry>, ServiceError> {
        debug!("listing journal entries");
        Ok(document.repo().list_journal_entries(None).await?)
    }

    /// Detail lines of an entry in their original order.
    pub async fn find_journal_entry_details(
        &self,
        document: &Document,
        entry: &JournalEntry,
    ) -> Result<Vec<JournalEntryDetail>, ServiceError> {
        Ok(document
            .repo()
            .list_journal_entry_details(entry.unique_id)
            .await?)
    }

    pub async fn is_account_used(&self, document: &Document, account_id: &str) -> Result<bool, ServiceError> {
        self.configuration.is_account_used(document, account_id).await
    }

    /// Rules every stored entry satisfies: structural validity, a date inside
    /// the period and references to existing accounts and invoices.
    /// `created_invoice` names the invoice written together with the entry;
    /// details may reference it before it is stored.
    pub(crate) async fn check_entry(
        &self,
        document: &Document,
        bookkeeping: &Bookkeeping,
        entry: &JournalEntry,
        details: &[JournalEntryDetail],
        validate_balance: bool,
        created_invoice: Option<&str>,
    ) -> Result<(), ServiceError> {
        validate_journal_entry(entry, details, validate_balance)?;

        if entry.date < bookkeeping.start_of_period {
            return Err(ServiceError::validation(format!(
                "Journal entry {} is dated {} which is before the start of period {}",
                entry.id, entry.date, bookkeeping.start_of_period
            )));
        }

        let account_ids: BTreeSet<String> = self
            .configuration
            .find_all_accounts(document)
            .await?
            .into_iter()
            .map(|a| a.id)
            .collect();
        for detail in details {
            if !account_ids.contains(&detail.account_id) {
                return Err(ServiceError::not_found("Account", detail.account_id.clone()));
            }
            if let Some(invoice_id) = &detail.invoice_id {
                if created_invoice == Some(invoice_id.as_str()) {
                    continue;
                }
                if document.repo().get_invoice(invoice_id).await?.is_none() {
                    return Err(ServiceError::not_found("Invoice", invoice_id.clone()));
                }
            }
        }
        Ok(())
    }
}
