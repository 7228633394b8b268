mod common;

use anyhow::Result;
use common::{StandardAccounts, eur, parse_date, test_document};
use gogoaccount::application::ServiceError;
use gogoaccount::domain::{JournalEntry, JournalEntryDetail};

#[tokio::test]
async fn test_add_balanced_journal_entry() -> Result<()> {
    let (document, services, _temp) = test_document().await?;
    StandardAccounts::create(&document, &services).await?;

    services
        .ledger
        .add_journal_entry(
            &document,
            JournalEntry::new("1", parse_date("2024-02-01"), "Rent February"),
            vec![
                JournalEntryDetail::debit(StandardAccounts::RENT, eur("450.00")),
                JournalEntryDetail::credit(StandardAccounts::BANK, eur("450.00")),
            ],
            true,
        )
        .await?;

    let entries = services.ledger.find_journal_entries(&document).await?;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].description, "Rent February");

    let details = services
        .ledger
        .find_journal_entry_details(&document, &entries[0])
        .await?;
    assert_eq!(details.len(), 2);
    assert_eq!(details[0].account_id, StandardAccounts::RENT);
    assert!(details[0].is_debit());
    assert_eq!(details[1].account_id, StandardAccounts::BANK);
    assert!(!details[1].is_debit());

    Ok(())
}

#[tokio::test]
async fn test_unbalanced_entry_is_rejected() -> Result<()> {
    let (document, services, _temp) = test_document().await?;
    StandardAccounts::create(&document, &services).await?;

    let result = services
        .ledger
        .add_journal_entry(
            &document,
            JournalEntry::new("1", parse_date("2024-02-01"), "Typo"),
            vec![
                JournalEntryDetail::debit(StandardAccounts::RENT, eur("450.00")),
                JournalEntryDetail::credit(StandardAccounts::BANK, eur("405.00")),
            ],
            true,
        )
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(services.ledger.find_journal_entries(&document).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_unbalanced_entry_allowed_without_balance_check() -> Result<()> {
    let (document, services, _temp) = test_document().await?;
    StandardAccounts::create(&document, &services).await?;

    services
        .ledger
        .add_journal_entry(
            &document,
            JournalEntry::new("1", parse_date("2024-02-01"), "Half of a transfer"),
            vec![JournalEntryDetail::debit(StandardAccounts::CASH, eur("10"))],
            false,
        )
        .await?;

    assert_eq!(services.ledger.find_journal_entries(&document).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_entry_without_details_is_rejected() -> Result<()> {
    let (document, services, _temp) = test_document().await?;
    StandardAccounts::create(&document, &services).await?;

    let err = services
        .ledger
        .add_journal_entry(
            &document,
            JournalEntry::new("1", parse_date("2024-02-01"), "Empty"),
            vec![],
            false,
        )
        .await
        .unwrap_err();
    assert!(err.is_validation());

    Ok(())
}

#[tokio::test]
async fn test_duplicate_entry_id_is_rejected() -> Result<()> {
    let (document, services, _temp) = test_document().await?;
    StandardAccounts::create(&document, &services).await?;
    StandardAccounts::fund(&document, &services, "100", "2024-01-01").await?;

    let err = services
        .ledger
        .add_journal_entry(
            &document,
            JournalEntry::new("start", parse_date("2024-01-02"), "Again"),
            vec![
                JournalEntryDetail::debit(StandardAccounts::CASH, eur("1")),
                JournalEntryDetail::credit(StandardAccounts::EQUITY, eur("1")),
            ],
            true,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateId { .. }));

    Ok(())
}

#[tokio::test]
async fn test_entry_before_start_of_period_is_rejected() -> Result<()> {
    let (document, services, _temp) = test_document().await?;
    StandardAccounts::create(&document, &services).await?;

    let err = StandardAccounts::fund(&document, &services, "100", "2023-12-31")
        .await
        .unwrap_err();
    let err = err.downcast::<ServiceError>()?;
    assert!(matches!(err, ServiceError::Validation(_)));

    Ok(())
}

#[tokio::test]
async fn test_entry_on_unknown_account_is_rejected() -> Result<()> {
    let (document, services, _temp) = test_document().await?;
    StandardAccounts::create(&document, &services).await?;

    let err = services
        .ledger
        .add_journal_entry(
            &document,
            JournalEntry::new("1", parse_date("2024-02-01"), "Unknown"),
            vec![
                JournalEntryDetail::debit("9999", eur("5")),
                JournalEntryDetail::credit(StandardAccounts::CASH, eur("5")),
            ],
            true,
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    Ok(())
}

#[tokio::test]
async fn test_update_journal_entry_replaces_details() -> Result<()> {
    let (document, services, _temp) = test_document().await?;
    StandardAccounts::create(&document, &services).await?;
    StandardAccounts::fund(&document, &services, "100", "2024-01-01").await?;

    let original = services.ledger.get_journal_entry(&document, "start").await?;
    let changed = JournalEntry {
        description: "Corrected capital".to_string(),
        ..original.clone()
    };
    services
        .ledger
        .update_journal_entry(
            &document,
            changed,
            vec![
                JournalEntryDetail::debit(StandardAccounts::BANK, eur("250")),
                JournalEntryDetail::credit(StandardAccounts::EQUITY, eur("250")),
            ],
        )
        .await?;

    let updated = services.ledger.get_journal_entry(&document, "start").await?;
    assert_eq!(updated.unique_id, original.unique_id);
    assert_eq!(updated.description, "Corrected capital");
    let details = services
        .ledger
        .find_journal_entry_details(&document, &updated)
        .await?;
    assert_eq!(details.len(), 2);
    assert_eq!(details[0].account_id, StandardAccounts::BANK);
    assert_eq!(details[0].amount, eur("250"));

    Ok(())
}

#[tokio::test]
async fn test_remove_journal_entry() -> Result<()> {
    let (document, services, _temp) = test_document().await?;
    StandardAccounts::create(&document, &services).await?;
    StandardAccounts::fund(&document, &services, "100", "2024-01-01").await?;

    services.ledger.remove_journal_entry(&document, "start").await?;

    assert!(services.ledger.find_journal_entries(&document).await?.is_empty());
    assert!(
        !services
            .ledger
            .is_account_used(&document, StandardAccounts::CASH)
            .await?
    );
    let err = services
        .ledger
        .remove_journal_entry(&document, "start")
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    Ok(())
}

#[tokio::test]
async fn test_entries_are_ordered_by_date_then_id() -> Result<()> {
    let (document, services, _temp) = test_document().await?;
    StandardAccounts::create(&document, &services).await?;

    for (id, date) in [("b", "2024-03-01"), ("c", "2024-02-01"), ("a", "2024-03-01")] {
        services
            .ledger
            .add_journal_entry(
                &document,
                JournalEntry::new(id, parse_date(date), "Cash deposit"),
                vec![
                    JournalEntryDetail::debit(StandardAccounts::BANK, eur("1")),
                    JournalEntryDetail::credit(StandardAccounts::CASH, eur("1")),
                ],
                true,
            )
            .await?;
    }

    let ids: Vec<String> = services
        .ledger
        .find_journal_entries(&document)
        .await?
        .into_iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(ids, vec!["c", "a", "b"]);

    Ok(())
}
