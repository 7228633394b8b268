// Application layer: services over an open bookkeeping document.
// Every operation takes the document by reference and returns ServiceError.

mod bookkeeping;
mod configuration;
mod document;
mod error;
mod invoice;
mod ledger;
mod party;
mod reporting;

pub use bookkeeping::*;
pub use configuration::*;
pub use document::*;
pub use error::*;
pub use invoice::{InvoiceBatchRequest, InvoiceService, InvoiceTemplateLine};
pub use ledger::*;
pub use party::*;
pub use reporting::*;

/// The services of one session, wired together.
#[derive(Debug, Clone)]
pub struct Services {
    pub configuration: ConfigurationService,
    pub parties: PartyService,
    pub ledger: LedgerService,
    pub invoices: InvoiceService,
    pub bookkeeping: BookkeepingService,
}

impl Services {
    pub fn new() -> Self {
        let configuration = ConfigurationService::new();
        let parties = PartyService::new();
        let ledger = LedgerService::new(configuration.clone());
        let invoices = InvoiceService::new(configuration.clone(), ledger.clone(), parties.clone());
        let bookkeeping = BookkeepingService::new(
            configuration.clone(),
            ledger.clone(),
            invoices.clone(),
            parties.clone(),
        );

        Self {
            configuration,
            parties,
            ledger,
            invoices,
            bookkeeping,
        }
    }
}

impl Default for Services {
    fn default() -> Self {
        Self::new()
    }
}
