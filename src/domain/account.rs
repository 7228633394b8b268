use serde::{Deserialize, Serialize};

use super::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Bank accounts, cash, inventory - things the organization owns
    Asset,
    /// Loans and other debts of the organization
    Liability,
    /// Capital, retained earnings
    Equity,
    Revenue,
    Expense,
    /// Parties that owe the organization money (sales invoices)
    Debtor,
    /// Parties the organization owes money (purchase invoices)
    Creditor,
}

impl AccountType {
    pub const ALL: [AccountType; 7] = [
        AccountType::Asset,
        AccountType::Liability,
        AccountType::Equity,
        AccountType::Revenue,
        AccountType::Expense,
        AccountType::Debtor,
        AccountType::Creditor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Asset => "asset",
            AccountType::Liability => "liability",
            AccountType::Equity => "equity",
            AccountType::Revenue => "revenue",
            AccountType::Expense => "expense",
            AccountType::Debtor => "debtor",
            AccountType::Creditor => "creditor",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asset" => Some(AccountType::Asset),
            "liability" => Some(AccountType::Liability),
            "equity" => Some(AccountType::Equity),
            "revenue" => Some(AccountType::Revenue),
            "expense" => Some(AccountType::Expense),
            "debtor" => Some(AccountType::Debtor),
            "creditor" => Some(AccountType::Creditor),
            _ => None,
        }
    }

    /// The side on which the balance of this account type normally grows.
    pub fn normal_side(&self) -> Side {
        match self {
            AccountType::Asset | AccountType::Expense | AccountType::Debtor => Side::Debit,
            AccountType::Liability
            | AccountType::Equity
            | AccountType::Revenue
            | AccountType::Creditor => Side::Credit,
        }
    }

    /// Accounts shown on the balance sheet; the others make up the income statement.
    pub fn is_balance_sheet(&self) -> bool {
        !matches!(self, AccountType::Revenue | AccountType::Expense)
    }

    /// Balance sheet accounts shown on the assets side.
    pub fn is_assets_side(&self) -> bool {
        matches!(self, AccountType::Asset | AccountType::Debtor)
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An account in the chart of accounts. The id is chosen by the user and never
/// changes once the account exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub account_type: AccountType,
}

impl Account {
    pub fn new(id: impl Into<String>, name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            account_type,
        }
    }

    /// "1000 Cash"
    pub fn label(&self) -> String {
        format!("{} {}", self.id, self.name)
    }
}
