use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Amount;

/// Default layout of suggested invoice ids: date label, dash, 4 digit sequence.
pub const DEFAULT_INVOICE_ID_FORMAT: &str = "{date}-####";

/// A billing record against a party.
///
/// `amount_to_be_paid` is positive when the party owes the organization
/// (sales invoice) and negative when the organization owes the party
/// (purchase invoice).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    /// Party the invoice is about (e.g. the member whose fee it is)
    pub concerning_party_id: String,
    /// Party expected to pay (e.g. a parent paying for the member)
    pub paying_party_id: String,
    pub amount_to_be_paid: Amount,
    pub issue_date: NaiveDate,
    pub description: Option<String>,
}

impl Invoice {
    pub fn new(
        id: impl Into<String>,
        party_id: impl Into<String>,
        amount_to_be_paid: Amount,
        issue_date: NaiveDate,
    ) -> Self {
        let party_id = party_id.into();
        Self {
            id: id.into(),
            concerning_party_id: party_id.clone(),
            paying_party_id: party_id,
            amount_to_be_paid,
            issue_date,
            description: None,
        }
    }

    pub fn with_paying_party(mut self, party_id: impl Into<String>) -> Self {
        self.paying_party_id = party_id.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// One printed line of an invoice. Lines without an amount are pure text,
/// e.g. headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub description: String,
    pub amount: Option<Amount>,
}

impl InvoiceLine {
    pub fn new(description: impl Into<String>, amount: Amount) -> Self {
        Self {
            description: description.into(),
            amount: Some(amount),
        }
    }

    pub fn text(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            amount: None,
        }
    }
}

/// A payment applied to an invoice, derived from a journal entry detail that
/// references the invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub invoice_id: String,
    pub journal_entry_id: String,
    pub date: NaiveDate,
    pub description: String,
    /// Reduces the amount to be paid when it has the same sign
    pub amount: Amount,
}

/// Amount still owed on `as_of`: amount to be paid minus every payment dated on
/// or before that day. Overpayment yields a value of the opposite sign.
pub fn remaining_amount(invoice: &Invoice, payments: &[Payment], as_of: NaiveDate) -> Amount {
    invoice.amount_to_be_paid
        - payments
            .iter()
            .filter(|p| p.date <= as_of)
            .map(|p| p.amount)
            .sum::<Amount>()
}

/// Expand an invoice id format: `{date}` becomes the date label and a run of
/// `#` characters becomes the sequence number, zero padded to the run length.
/// A format without `#` gets the sequence appended.
pub fn format_invoice_id(format: &str, date_label: &str, sequence: u32) -> String {
    let with_date = format.replace("{date}", date_label);
    match with_date.find('#') {
        Some(start) => {
            let width = with_date[start..].chars().take_while(|c| *c == '#').count();
            format!(
                "{}{:0width$}{}",
                &with_date[..start],
                sequence,
                &with_date[start + width..],
                width = width
            )
        }
        None => format!("{}{}", with_date, sequence),
    }
}

/// First id produced by `format` for `date_label` that is not in `taken`.
pub fn first_free_invoice_id(format: &str, date_label: &str, taken: &BTreeSet<String>) -> String {
    (1..=u32::MAX)
        .map(|sequence| format_invoice_id(format, date_label, sequence))
        .find(|id| !taken.contains(id))
        .unwrap_or_else(|| format!("{}-{}", date_label, taken.len() + 1))
}

/// Criteria for invoice searches. Text matches are case-insensitive substrings.
#[derive(Debug, Clone, Default)]
pub struct InvoiceSearchCriteria {
    pub id: Option<String>,
    /// Matched against the name of the concerning and of the paying party
    pub name: Option<String>,
    pub include_paid: bool,
    /// Day on which "paid" is evaluated; today when absent
    pub as_of: Option<NaiveDate>,
}

impl InvoiceSearchCriteria {
    pub fn matches_id(&self, invoice_id: &str) -> bool {
        contains_ignore_case(invoice_id, self.id.as_deref())
    }

    pub fn matches_name(&self, party_names: &[&str]) -> bool {
        match self.name.as_deref() {
            None => true,
            Some(_) => party_names
                .iter()
                .any(|name| contains_ignore_case(name, self.name.as_deref())),
        }
    }
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
    }
}
