use tracing::{debug, info};

use crate::domain::{Party, PartySearchCriteria};

use super::{Document, ServiceError};

/// Debtors and creditors. Parties are referenced by invoices, never owned by them.
#[derive(Debug, Clone, Default)]
pub struct PartyService;

impl PartyService {
    pub fn new() -> Self {
        Self
    }

    pub async fn create_party(&self, document: &Document, party: Party) -> Result<Party, ServiceError> {
        document.ensure_open().await?;
        validate_party(&party)?;
        if document.repo().get_party(&party.id).await?.is_some() {
            return Err(ServiceError::duplicate("Party", party.id));
        }

        document.repo().save_party(&party).await?;
        info!(id = %party.id, "created party");
        Ok(party)
    }

    pub async fn update_party(&self, document: &Document, party: Party) -> Result<Party, ServiceError> {
        document.ensure_open().await?;
        self.get_party(document, &party.id).await?;
        validate_party(&party)?;

        document.repo().update_party(&party).await?;
        info!(id = %party.id, "updated party");
        Ok(party)
    }

    pub async fn delete_party(&self, document: &Document, id: &str) -> Result<(), ServiceError> {
        document.ensure_open().await?;
        self.get_party(document, id).await?;
        if document.repo().is_party_referenced(id).await? {
            return Err(ServiceError::validation(format!(
                "Party {} is referenced by invoices and cannot be deleted",
                id
            )));
        }

        document.repo().delete_party(id).await?;
        info!(id, "deleted party");
        Ok(())
    }

    pub async fn get_party(&self, document: &Document, id: &str) -> Result<Party, ServiceError> {
        document
            .repo()
            .get_party(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Party", id))
    }

    /// Parties matching the criteria, sorted by id.
    pub async fn find_parties(
        &self,
        document: &Document,
        criteria: &PartySearchCriteria,
    ) -> Result<Vec<Party>, ServiceError> {
        debug!(?criteria, "searching parties");
        let parties = document.repo().list_parties().await?;
        Ok(parties.into_iter().filter(|p| criteria.matches(p)).collect())
    }

    pub async fn find_party_types(&self, document: &Document) -> Result<Vec<String>, ServiceError> {
        Ok(document.repo().list_party_types().await?)
    }
}

fn validate_party(party: &Party) -> Result<(), ServiceError> {
    if party.id.trim().is_empty() {
        return Err(ServiceError::validation("Party id must not be empty"));
    }
    if party.name.trim().is_empty() {
        return Err(ServiceError::validation("Party name must not be empty"));
    }
    Ok(())
}
