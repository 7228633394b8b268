use tracing::{debug, info};

use crate::domain::{Account, AccountType, Bookkeeping};

use super::{Document, ServiceError};

/// Chart of accounts and bookkeeping settings.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationService;

impl ConfigurationService {
    pub fn new() -> Self {
        Self
    }

    /// All accounts, sorted by id.
    pub async fn find_all_accounts(&self, document: &Document) -> Result<Vec<Account>, ServiceError> {
        debug!("listing accounts");
        Ok(document.repo().list_accounts().await?)
    }

    pub async fn find_accounts_of_type(
        &self,
        document: &Document,
        account_type: AccountType,
    ) -> Result<Vec<Account>, ServiceError> {
        let accounts = self.find_all_accounts(document).await?;
        Ok(accounts
            .into_iter()
            .filter(|a| a.account_type == account_type)
            .collect())
    }

    pub async fn get_account(&self, document: &Document, id: &str) -> Result<Account, ServiceError> {
        document
            .repo()
            .get_account(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Account", id))
    }

    pub async fn create_account(
        &self,
        document: &Document,
        account: Account,
    ) -> Result<Account, ServiceError> {
        document.ensure_open().await?;
        if account.id.trim().is_empty() {
            return Err(ServiceError::validation("Account id must not be empty"));
        }
        if account.name.trim().is_empty() {
            return Err(ServiceError::validation("Account name must not be empty"));
        }
        if document.repo().get_account(&account.id).await?.is_some() {
            return Err(ServiceError::duplicate("Account", account.id));
        }

        document.repo().save_account(&account).await?;
        info!(id = %account.id, account_type = %account.account_type, "created account");
        Ok(account)
    }

    /// Update name and type of an account. The type is fixed once journal
    /// entries book on the account.
    pub async fn update_account(
        &self,
        document: &Document,
        account: Account,
    ) -> Result<Account, ServiceError> {
        document.ensure_open().await?;
        let existing = self.get_account(document, &account.id).await?;
        if account.name.trim().is_empty() {
            return Err(ServiceError::validation("Account name must not be empty"));
        }
        if existing.account_type != account.account_type
            && document.repo().is_account_used(&account.id).await?
        {
            return Err(ServiceError::validation(format!(
                "Account {} is used in journal entries; its type cannot change",
                account.id
            )));
        }

        document.repo().update_account(&account).await?;
        info!(id = %account.id, "updated account");
        Ok(account)
    }

    pub async fn delete_account(&self, document: &Document, id: &str) -> Result<(), ServiceError> {
        document.ensure_open().await?;
        self.get_account(document, id).await?;
        if self.is_account_used(document, id).await? {
            return Err(ServiceError::validation(format!(
                "Account {} is used in journal entries and cannot be deleted",
                id
            )));
        }

        document.repo().delete_account(id).await?;
        info!(id, "deleted account");
        Ok(())
    }

    pub async fn is_account_used(&self, document: &Document, id: &str) -> Result<bool, ServiceError> {
        Ok(document.repo().is_account_used(id).await?)
    }

    pub async fn get_bookkeeping(&self, document: &Document) -> Result<Bookkeeping, ServiceError> {
        Ok(document.repo().get_bookkeeping().await?)
    }

    /// Replace the bookkeeping settings. The closed flag cannot be changed here.
    pub async fn update_bookkeeping(
        &self,
        document: &Document,
        bookkeeping: Bookkeeping,
    ) -> Result<Bookkeeping, ServiceError> {
        let current = document.ensure_open().await?;
        if bookkeeping.currency.trim().is_empty() {
            return Err(ServiceError::validation("Currency must not be empty"));
        }
        if bookkeeping.start_of_period != current.start_of_period {
            let earliest = document.repo().list_journal_entries(None).await?;
            if let Some(entry) = earliest
                .iter()
                .find(|e| e.date < bookkeeping.start_of_period)
            {
                return Err(ServiceError::validation(format!(
                    "Journal entry {} is dated {} which is before the new start of period",
                    entry.id, entry.date
                )));
            }
        }

        let bookkeeping = Bookkeeping {
            closed: false,
            ..bookkeeping
        };
        document.repo().save_bookkeeping(&bookkeeping).await?;
        info!(description = %bookkeeping.description, "updated bookkeeping");
        Ok(bookkeeping)
    }
}
