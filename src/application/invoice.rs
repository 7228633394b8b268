use std::collections::{BTreeSet, HashMap};

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::domain::{
    AccountType, Amount, Invoice, InvoiceLine, InvoiceSearchCriteria, JournalEntry,
    JournalEntryDetail, Party, Payment, Side, first_free_invoice_id, remaining_amount,
};
use crate::storage::Posting;

use super::{ConfigurationService, Document, LedgerService, PartyService, ServiceError};

/// One line of the invoice template used when billing several parties at once.
#[derive(Debug, Clone)]
pub struct InvoiceTemplateLine {
    /// `{name}` is replaced by the party's name
    pub description: String,
    pub amount: Option<Amount>,
    /// Revenue (sales) or expense (purchase) account the amount is booked on
    pub account_id: Option<String>,
}

impl InvoiceTemplateLine {
    pub fn new(description: impl Into<String>, amount: Amount, account_id: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            amount: Some(amount),
            account_id: Some(account_id.into()),
        }
    }

    pub fn text(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            amount: None,
            account_id: None,
        }
    }
}

/// Bill every listed party with the same template.
#[derive(Debug, Clone)]
pub struct InvoiceBatchRequest {
    /// A debtor account issues sales invoices, a creditor account purchase invoices
    pub debtor_or_creditor_account_id: String,
    pub issue_date: NaiveDate,
    /// Fed into the bookkeeping's invoice id format
    pub date_label: String,
    /// Journal and invoice description; `{name}` is replaced by the party's name
    pub description: String,
    pub lines: Vec<InvoiceTemplateLine>,
    pub party_ids: Vec<String>,
}

/// Invoices and the payments made against them.
#[derive(Debug, Clone, Default)]
pub struct InvoiceService {
    configuration: ConfigurationService,
    ledger: LedgerService,
    parties: PartyService,
}

impl InvoiceService {
    pub fn new(
        configuration: ConfigurationService,
        ledger: LedgerService,
        parties: PartyService,
    ) -> Self {
        Self {
            configuration,
            ledger,
            parties,
        }
    }

    /// Store an invoice that is not issued through a journal entry.
    pub async fn create_invoice(
        &self,
        document: &Document,
        invoice: Invoice,
        lines: Vec<InvoiceLine>,
    ) -> Result<Invoice, ServiceError> {
        document.ensure_open().await?;
        check_new_invoice(document, &invoice).await?;

        document.repo().save_invoice(&invoice, &lines).await?;
        info!(id = %invoice.id, amount = %invoice.amount_to_be_paid, "created invoice");
        Ok(invoice)
    }

    /// Replace the invoice header and its lines.
    pub async fn update_invoice(
        &self,
        document: &Document,
        invoice: Invoice,
        lines: Vec<InvoiceLine>,
    ) -> Result<Invoice, ServiceError> {
        document.ensure_open().await?;
        self.get_invoice(document, &invoice.id).await?;
        self.parties
            .get_party(document, &invoice.concerning_party_id)
            .await?;
        self.parties.get_party(document, &invoice.paying_party_id).await?;

        document.repo().update_invoice(&invoice, &lines).await?;
        info!(id = %invoice.id, "updated invoice");
        Ok(invoice)
    }

    pub async fn get_invoice(&self, document: &Document, id: &str) -> Result<Invoice, ServiceError> {
        document
            .repo()
            .get_invoice(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Invoice", id))
    }

    /// Invoices matching the criteria, sorted by id.
    pub async fn find_invoices(
        &self,
        document: &Document,
        criteria: &InvoiceSearchCriteria,
    ) -> Result<Vec<Invoice>, ServiceError> {
        debug!(?criteria, "searching invoices");
        let as_of = criteria.as_of.unwrap_or_else(|| Local::now().date_naive());
        let invoices = document.repo().list_invoices().await?;
        let party_names: HashMap<String, String> = document
            .repo()
            .list_parties()
            .await?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();
        let payments = document.repo().list_all_payments().await?;

        Ok(invoices
            .into_iter()
            .filter(|invoice| criteria.matches_id(&invoice.id))
            .filter(|invoice| {
                let names: Vec<&str> = [&invoice.concerning_party_id, &invoice.paying_party_id]
                    .into_iter()
                    .filter_map(|id| party_names.get(id).map(String::as_str))
                    .collect();
                criteria.matches_name(&names)
            })
            .filter(|invoice| {
                criteria.include_paid || {
                    let paid = payments.get(&invoice.id).map(Vec::as_slice).unwrap_or(&[]);
                    !remaining_amount(invoice, paid, as_of).is_zero()
                }
            })
            .collect())
    }

    /// The printed lines of an invoice in order.
    pub async fn find_invoice_lines(
        &self,
        document: &Document,
        invoice: &Invoice,
    ) -> Result<Vec<InvoiceLine>, ServiceError> {
        Ok(document.repo().list_invoice_lines(&invoice.id).await?)
    }

    /// Descriptions of the invoice lines, index aligned with `find_amounts`.
    pub async fn find_descriptions(
        &self,
        document: &Document,
        invoice: &Invoice,
    ) -> Result<Vec<String>, ServiceError> {
        let lines = self.find_invoice_lines(document, invoice).await?;
        Ok(lines.into_iter().map(|l| l.description).collect())
    }

    /// Amounts of the invoice lines; `None` marks a text-only line.
    pub async fn find_amounts(
        &self,
        document: &Document,
        invoice: &Invoice,
    ) -> Result<Vec<Option<Amount>>, ServiceError> {
        let lines = self.find_invoice_lines(document, invoice).await?;
        Ok(lines.into_iter().map(|l| l.amount).collect())
    }

    pub async fn find_payments(
        &self,
        document: &Document,
        invoice: &Invoice,
    ) -> Result<Vec<Payment>, ServiceError> {
        Ok(document.repo().list_payments(&invoice.id).await?)
    }

    pub async fn has_payments(&self, document: &Document, invoice_id: &str) -> Result<bool, ServiceError> {
        Ok(document.repo().has_payments(invoice_id).await?)
    }

    /// Amount to be paid minus the payments dated on or before `as_of`.
    pub async fn get_remaining_amount_to_be_paid(
        &self,
        document: &Document,
        invoice_id: &str,
        as_of: NaiveDate,
    ) -> Result<Amount, ServiceError> {
        let invoice = self.get_invoice(document, invoice_id).await?;
        let payments = self.find_payments(document, &invoice).await?;
        Ok(remaining_amount(&invoice, &payments, as_of))
    }

    pub async fn is_paid(
        &self,
        document: &Document,
        invoice_id: &str,
        as_of: NaiveDate,
    ) -> Result<bool, ServiceError> {
        Ok(self
            .get_remaining_amount_to_be_paid(document, invoice_id, as_of)
            .await?
            .is_zero())
    }

    /// Propose an unused invoice id. The id is reserved for this document so
    /// the next suggestion differs even before either id is stored.
    pub async fn suggest_new_invoice_id(
        &self,
        document: &Document,
        date_label: &str,
    ) -> Result<String, ServiceError> {
        let bookkeeping = self.configuration.get_bookkeeping(document).await?;
        let taken = self.taken_ids(document).await?;
        let id = first_free_invoice_id(&bookkeeping.invoice_id_format, date_label, &taken);
        document.reserve_invoice_id(&id);
        debug!(%id, "suggested invoice id");
        Ok(id)
    }

    /// Issue an invoice plus the journal entry recording it for every party in
    /// the request. Every party is validated first; the batch is then written
    /// in a single transaction, so a failure leaves no invoice behind.
    pub async fn create_invoice_and_journal_for_parties(
        &self,
        document: &Document,
        request: &InvoiceBatchRequest,
    ) -> Result<Vec<Invoice>, ServiceError> {
        let bookkeeping = document.ensure_open().await?;

        let account = self
            .configuration
            .get_account(document, &request.debtor_or_creditor_account_id)
            .await?;
        let side_of_party = match account.account_type {
            AccountType::Debtor => Side::Debit,
            AccountType::Creditor => Side::Credit,
            other => {
                return Err(ServiceError::validation(format!(
                    "Account {} is of type {}; a debtor or creditor account is required",
                    account.id, other
                )));
            }
        };
        for line in &request.lines {
            match (&line.amount, &line.account_id) {
                (Some(_), None) => {
                    return Err(ServiceError::validation(format!(
                        "Invoice line '{}' has an amount but no account",
                        line.description
                    )));
                }
                (_, Some(account_id)) => {
                    self.configuration.get_account(document, account_id).await?;
                }
                (None, None) => {}
            }
        }

        let mut taken = self.taken_ids(document).await?;
        taken.extend(
            self.ledger
                .find_journal_entries(document)
                .await?
                .into_iter()
                .map(|e| e.id),
        );

        let mut postings = Vec::with_capacity(request.party_ids.len());
        for party_id in &request.party_ids {
            let party = self.parties.get_party(document, party_id).await?;
            let id = first_free_invoice_id(&bookkeeping.invoice_id_format, &request.date_label, &taken);
            taken.insert(id.clone());

            let posting = build_posting(request, &party, &id, side_of_party);
            self.ledger
                .check_entry(
                    document,
                    &bookkeeping,
                    &posting.entry,
                    &posting.details,
                    true,
                    posting.entry.id_of_created_invoice.as_deref(),
                )
                .await
                .map_err(|err| match err {
                    ServiceError::Validation(message) => {
                        ServiceError::validation(format!("Party {}: {}", party.id, message))
                    }
                    other => other,
                })?;
            postings.push(posting);
        }

        document.repo().save_postings(&postings).await?;
        info!(
            count = postings.len(),
            account = %account.id,
            "created invoices and journal entries for parties"
        );
        Ok(postings
            .into_iter()
            .filter_map(|p| p.invoice.map(|(invoice, _)| invoice))
            .collect())
    }

    async fn taken_ids(&self, document: &Document) -> Result<BTreeSet<String>, ServiceError> {
        let mut taken: BTreeSet<String> = document.repo().list_invoice_ids().await?.into_iter().collect();
        taken.extend(document.reserved_invoice_ids());
        Ok(taken)
    }
}

/// Invoice and journal entry for one party. A sales invoice debits the debtor
/// account and credits the line accounts; a purchase invoice is the mirror image.
fn build_posting(
    request: &InvoiceBatchRequest,
    party: &Party,
    invoice_id: &str,
    side_of_party: Side,
) -> Posting {
    let personalize = |text: &str| text.replace("{name}", &party.name);
    let description = personalize(&request.description);

    let mut details = Vec::new();
    let mut total = Amount::ZERO;
    for line in &request.lines {
        if let (Some(amount), Some(account_id)) = (line.amount, &line.account_id) {
            total += amount;
            let side = if amount.is_negative() {
                side_of_party
            } else {
                side_of_party.opposite()
            };
            details.push(detail(account_id, side, amount.abs()));
        }
    }
    let party_side = if total.is_negative() {
        side_of_party.opposite()
    } else {
        side_of_party
    };
    details.insert(
        0,
        detail(&request.debtor_or_creditor_account_id, party_side, total.abs()),
    );

    let amount_to_be_paid = match side_of_party {
        Side::Debit => total,
        Side::Credit => -total,
    };
    let invoice = Invoice::new(invoice_id, &party.id, amount_to_be_paid, request.issue_date)
        .with_description(description.clone());
    let lines = request
        .lines
        .iter()
        .map(|line| InvoiceLine {
            description: personalize(&line.description),
            amount: line.amount,
        })
        .collect();

    Posting {
        entry: JournalEntry::new(invoice_id, request.issue_date, description)
            .with_created_invoice(invoice_id),
        details,
        invoice: Some((invoice, lines)),
    }
}

fn detail(account_id: &str, side: Side, amount: Amount) -> JournalEntryDetail {
    match side {
        Side::Debit => JournalEntryDetail::debit(account_id, amount),
        Side::Credit => JournalEntryDetail::credit(account_id, amount),
    }
}

/// Checks for an invoice about to be stored: a fresh id and existing parties.
pub(crate) async fn check_new_invoice(document: &Document, invoice: &Invoice) -> Result<(), ServiceError> {
    if invoice.id.trim().is_empty() {
        return Err(ServiceError::validation("Invoice id must not be empty"));
    }
    if document.repo().get_invoice(&invoice.id).await?.is_some() {
        return Err(ServiceError::duplicate("Invoice", invoice.id.clone()));
    }
    for party_id in [&invoice.concerning_party_id, &invoice.paying_party_id] {
        if document.repo().get_party(party_id).await?.is_none() {
            return Err(ServiceError::not_found("Party", party_id.clone()));
        }
    }
    Ok(())
}
