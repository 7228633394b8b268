use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Account, AccountType, Amount, Report};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBalance {
    pub account: Account,
    pub balance: Amount,
}

/// Balances of all balance sheet accounts on a date. The assets side equals
/// the liabilities side plus the result of operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub as_of: NaiveDate,
    pub currency: String,
    pub assets: Vec<AccountBalance>,
    pub liabilities: Vec<AccountBalance>,
    pub total_assets: Amount,
    pub total_liabilities: Amount,
    /// Profit when positive, loss when negative
    pub result_of_operations: Amount,
}

impl BalanceSheet {
    pub fn from_report(report: &Report) -> Self {
        let balances = |accounts: Vec<&Account>| -> Vec<AccountBalance> {
            accounts
                .into_iter()
                .map(|account| AccountBalance {
                    account: account.clone(),
                    balance: report.balance(account),
                })
                .collect()
        };

        Self {
            as_of: report.end_date(),
            currency: report.currency().to_string(),
            assets: balances(report.assets_side().collect()),
            liabilities: balances(report.liabilities_side().collect()),
            total_assets: report.total_assets(),
            total_liabilities: report.total_liabilities(),
            result_of_operations: report.result_of_operations(),
        }
    }

    pub fn is_balanced(&self) -> bool {
        self.total_assets == self.total_liabilities + self.result_of_operations
    }
}

/// Revenues and expenses booked between the start of the period and `to_date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub currency: String,
    pub revenues: Vec<AccountBalance>,
    pub expenses: Vec<AccountBalance>,
    pub total_revenues: Amount,
    pub total_expenses: Amount,
    pub result_of_operations: Amount,
}

impl IncomeStatement {
    pub fn from_report(report: &Report) -> Self {
        let balances = |account_type: AccountType| -> Vec<AccountBalance> {
            report
                .accounts_of_type(account_type)
                .map(|account| AccountBalance {
                    account: account.clone(),
                    balance: report.period_balance(account),
                })
                .collect()
        };

        Self {
            from_date: report.start_of_period(),
            to_date: report.end_date(),
            currency: report.currency().to_string(),
            revenues: balances(AccountType::Revenue),
            expenses: balances(AccountType::Expense),
            total_revenues: report.total_revenues(),
            total_expenses: report.total_expenses(),
            result_of_operations: report.result_of_operations(),
        }
    }
}
