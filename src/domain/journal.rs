use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::Amount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Debit,
    Credit,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Debit => "debit",
            Side::Credit => "credit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "debit" | "dr" => Some(Side::Debit),
            "credit" | "cr" => Some(Side::Credit),
            _ => None,
        }
    }

    pub fn opposite(&self) -> Side {
        match self {
            Side::Debit => Side::Credit,
            Side::Credit => Side::Debit,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One double-entry transaction. The detail lines are kept separately so that
/// listings of entries stay cheap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Internal identity, stable across edits of the user-facing id
    pub unique_id: Uuid,
    /// User assigned id, unique within a bookkeeping
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    /// Set when recording this entry also issued an invoice
    pub id_of_created_invoice: Option<String>,
}

impl JournalEntry {
    pub fn new(id: impl Into<String>, date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            unique_id: Uuid::new_v4(),
            id: id.into(),
            date,
            description: description.into(),
            id_of_created_invoice: None,
        }
    }

    pub fn with_created_invoice(mut self, invoice_id: impl Into<String>) -> Self {
        self.id_of_created_invoice = Some(invoice_id.into());
        self
    }

    pub fn creates_invoice(&self) -> bool {
        self.id_of_created_invoice.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntryDetail {
    /// Always a non-negative magnitude; the side carries the sign
    pub amount: Amount,
    pub account_id: String,
    pub side: Side,
    /// Links a payment line to the invoice it settles
    pub invoice_id: Option<String>,
}

impl JournalEntryDetail {
    pub fn debit(account_id: impl Into<String>, amount: Amount) -> Self {
        Self {
            amount,
            account_id: account_id.into(),
            side: Side::Debit,
            invoice_id: None,
        }
    }

    pub fn credit(account_id: impl Into<String>, amount: Amount) -> Self {
        Self {
            amount,
            account_id: account_id.into(),
            side: Side::Credit,
            invoice_id: None,
        }
    }

    pub fn with_invoice(mut self, invoice_id: impl Into<String>) -> Self {
        self.invoice_id = Some(invoice_id.into());
        self
    }

    pub fn is_debit(&self) -> bool {
        self.side == Side::Debit
    }

    /// Debit minus credit contribution of this line.
    pub fn signed_amount(&self) -> Amount {
        match self.side {
            Side::Debit => self.amount,
            Side::Credit => -self.amount,
        }
    }

    /// Contribution of this line to the invoice it references: crediting the
    /// debtor/creditor account reduces what is owed, debiting it increases it.
    pub fn payment_amount(&self) -> Amount {
        -self.signed_amount()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JournalValidationError {
    #[error("Journal entry must have at least one detail line")]
    NoDetails,

    #[error("Journal entry id must not be empty")]
    EmptyId,

    #[error("Amount of a detail line must not be negative (account {account_id}: {amount})")]
    NegativeAmount { account_id: String, amount: Amount },

    #[error("Journal entry is unbalanced: debits ({debits}) != credits ({credits})")]
    Unbalanced { debits: Amount, credits: Amount },
}

/// Total debit and credit amounts of a set of detail lines.
pub fn totals(details: &[JournalEntryDetail]) -> (Amount, Amount) {
    details
        .iter()
        .fold((Amount::ZERO, Amount::ZERO), |(debits, credits), d| match d.side {
            Side::Debit => (debits + d.amount, credits),
            Side::Credit => (debits, credits + d.amount),
        })
}

/// Validate a journal entry before it is stored. When `validate_balance` is
/// false an unbalanced entry is accepted, all other rules still apply.
pub fn validate_journal_entry(
    entry: &JournalEntry,
    details: &[JournalEntryDetail],
    validate_balance: bool,
) -> Result<(), JournalValidationError> {
    if entry.id.trim().is_empty() {
        return Err(JournalValidationError::EmptyId);
    }
    if details.is_empty() {
        return Err(JournalValidationError::NoDetails);
    }
    if let Some(d) = details.iter().find(|d| d.amount.is_negative()) {
        return Err(JournalValidationError::NegativeAmount {
            account_id: d.account_id.clone(),
            amount: d.amount,
        });
    }

    let (debits, credits) = totals(details);
    if validate_balance && debits != credits {
        return Err(JournalValidationError::Unbalanced { debits, credits });
    }
    Ok(())
}
