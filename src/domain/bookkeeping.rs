use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::DEFAULT_INVOICE_ID_FORMAT;

/// Settings of one bookkeeping period. Each document holds exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookkeeping {
    pub description: String,
    pub start_of_period: NaiveDate,
    /// ISO 4217 code used when formatting amounts
    pub currency: String,
    pub invoice_id_format: String,
    pub organization_name: Option<String>,
    pub organization_address: Option<String>,
    pub organization_zip_code: Option<String>,
    pub organization_city: Option<String>,
    pub iban: Option<String>,
    pub bic: Option<String>,
    /// Contract number for automatic collection of invoices
    pub automatic_collection_contract_number: Option<String>,
    /// Set once the period has been closed; a closed bookkeeping is read only
    pub closed: bool,
}

impl Bookkeeping {
    pub fn new(description: impl Into<String>, start_of_period: NaiveDate) -> Self {
        Self {
            description: description.into(),
            start_of_period,
            currency: "EUR".into(),
            invoice_id_format: DEFAULT_INVOICE_ID_FORMAT.into(),
            organization_name: None,
            organization_address: None,
            organization_zip_code: None,
            organization_city: None,
            iban: None,
            bic: None,
            automatic_collection_contract_number: None,
            closed: false,
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_organization(mut self, name: impl Into<String>) -> Self {
        self.organization_name = Some(name.into());
        self
    }

    /// Settings for the period following this one.
    pub fn next_period(&self, description: impl Into<String>, start_of_period: NaiveDate) -> Self {
        Self {
            description: description.into(),
            start_of_period,
            closed: false,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_period_keeps_settings() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut current = Bookkeeping::new("2024", start)
            .with_currency("USD")
            .with_organization("Tennis club");
        current.closed = true;

        let next = current.next_period("2025", NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());

        assert_eq!(next.description, "2025");
        assert_eq!(next.currency, "USD");
        assert_eq!(next.organization_name.as_deref(), Some("Tennis club"));
        assert!(!next.closed);
    }
}
