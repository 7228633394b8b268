use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::invoice::contains_ignore_case;

/// A debtor or creditor of the organization: member, customer, supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub zip_code: Option<String>,
    pub city: Option<String>,
    pub birth_date: Option<NaiveDate>,
    /// Free form tag, e.g. "member" or "supplier"
    pub party_type: Option<String>,
    pub remarks: Option<String>,
}

impl Party {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: None,
            zip_code: None,
            city: None,
            birth_date: None,
            party_type: None,
            remarks: None,
        }
    }

    pub fn with_address(
        mut self,
        address: impl Into<String>,
        zip_code: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        self.address = Some(address.into());
        self.zip_code = Some(zip_code.into());
        self.city = Some(city.into());
        self
    }

    pub fn with_birth_date(mut self, birth_date: NaiveDate) -> Self {
        self.birth_date = Some(birth_date);
        self
    }

    pub fn with_type(mut self, party_type: impl Into<String>) -> Self {
        self.party_type = Some(party_type.into());
        self
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct PartySearchCriteria {
    /// Case-insensitive substring of the id or the name
    pub text: Option<String>,
    pub party_type: Option<String>,
}

impl PartySearchCriteria {
    pub fn matches(&self, party: &Party) -> bool {
        let text_matches = contains_ignore_case(&party.id, self.text.as_deref())
            || contains_ignore_case(&party.name, self.text.as_deref());
        let type_matches = match &self.party_type {
            None => true,
            Some(wanted) => party
                .party_type
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case(wanted)),
        };
        text_matches && type_matches
    }
}
