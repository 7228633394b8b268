mod common;

use anyhow::Result;
use common::{StandardAccounts, create_parties, eur, parse_date, test_document};
use gogoaccount::application::ServiceError;
use gogoaccount::domain::{Invoice, Party, PartySearchCriteria};

#[tokio::test]
async fn test_create_and_find_parties() -> Result<()> {
    let (document, services, _temp) = test_document().await?;
    create_parties(&document, &services).await?;

    let all = services
        .parties
        .find_parties(&document, &PartySearchCriteria::default())
        .await?;
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].id, "p1");

    let members = services
        .parties
        .find_parties(
            &document,
            &PartySearchCriteria {
                party_type: Some("member".to_string()),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(members.len(), 2);

    let bob = services
        .parties
        .find_parties(
            &document,
            &PartySearchCriteria {
                text: Some("VRIES".to_string()),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(bob.len(), 1);
    assert_eq!(bob[0].id, "p2");

    let types = services.parties.find_party_types(&document).await?;
    assert_eq!(types, vec!["member".to_string(), "supplier".to_string()]);

    Ok(())
}

#[tokio::test]
async fn test_update_party_keeps_all_fields() -> Result<()> {
    let (document, services, _temp) = test_document().await?;
    create_parties(&document, &services).await?;

    let updated = Party::new("p1", "Alice Jansen")
        .with_address("Dorpsstraat 1", "1234 AB", "Utrecht")
        .with_birth_date(parse_date("1990-05-17"))
        .with_type("member")
        .with_remarks("Board member");
    services.parties.update_party(&document, updated.clone()).await?;

    let stored = services.parties.get_party(&document, "p1").await?;
    assert_eq!(stored, updated);

    Ok(())
}

#[tokio::test]
async fn test_duplicate_and_empty_parties_are_rejected() -> Result<()> {
    let (document, services, _temp) = test_document().await?;
    create_parties(&document, &services).await?;

    let err = services
        .parties
        .create_party(&document, Party::new("p1", "Someone else"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateId { .. }));

    let err = services
        .parties
        .create_party(&document, Party::new("p9", "  "))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    Ok(())
}

#[tokio::test]
async fn test_party_with_invoices_cannot_be_deleted() -> Result<()> {
    let (document, services, _temp) = test_document().await?;
    StandardAccounts::create(&document, &services).await?;
    create_parties(&document, &services).await?;
    services
        .invoices
        .create_invoice(
            &document,
            Invoice::new("X-1", "p1", eur("12.00"), parse_date("2024-03-01")).with_paying_party("p2"),
            vec![],
        )
        .await?;

    for id in ["p1", "p2"] {
        let err = services.parties.delete_party(&document, id).await.unwrap_err();
        assert!(err.is_validation());
    }

    services.parties.delete_party(&document, "s1").await?;
    let err = services.parties.get_party(&document, "s1").await.unwrap_err();
    assert!(err.is_not_found());

    Ok(())
}
