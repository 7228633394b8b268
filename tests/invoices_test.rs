mod common;

use anyhow::Result;
use common::{StandardAccounts, create_parties, eur, parse_date, test_document};
use gogoaccount::application::{
    Document, InvoiceBatchRequest, InvoiceTemplateLine, ServiceError, Services,
};
use gogoaccount::domain::{
    Invoice, InvoiceLine, InvoiceSearchCriteria, JournalEntry, JournalEntryDetail,
};

fn membership_request(party_ids: &[&str]) -> InvoiceBatchRequest {
    InvoiceBatchRequest {
        debtor_or_creditor_account_id: StandardAccounts::DEBTORS.to_string(),
        issue_date: parse_date("2024-02-01"),
        date_label: "2024".to_string(),
        description: "Membership fee {name}".to_string(),
        lines: vec![
            InvoiceTemplateLine::text("Membership 2024"),
            InvoiceTemplateLine::new("Fee for {name}", eur("25.00"), StandardAccounts::CONTRIBUTIONS),
        ],
        party_ids: party_ids.iter().map(|id| id.to_string()).collect(),
    }
}

async fn setup() -> Result<(Document, Services, tempfile::TempDir)> {
    let (document, services, temp) = test_document().await?;
    StandardAccounts::create(&document, &services).await?;
    create_parties(&document, &services).await?;
    Ok((document, services, temp))
}

async fn pay(document: &Document, services: &Services, id: &str, invoice_id: &str, amount: &str, date: &str) -> Result<()> {
    services
        .ledger
        .add_journal_entry(
            document,
            JournalEntry::new(id, parse_date(date), "Payment received"),
            vec![
                JournalEntryDetail::debit(StandardAccounts::BANK, eur(amount)),
                JournalEntryDetail::credit(StandardAccounts::DEBTORS, eur(amount)).with_invoice(invoice_id),
            ],
            true,
        )
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_bill_parties_creates_invoices_and_entries() -> Result<()> {
    let (document, services, _temp) = setup().await?;

    let invoices = services
        .invoices
        .create_invoice_and_journal_for_parties(&document, &membership_request(&["p1", "p2"]))
        .await?;

    assert_eq!(invoices.len(), 2);
    assert_eq!(invoices[0].id, "2024-0001");
    assert_eq!(invoices[1].id, "2024-0002");
    assert_eq!(invoices[0].amount_to_be_paid, eur("25.00"));
    assert_eq!(invoices[0].description.as_deref(), Some("Membership fee Alice Jansen"));

    let lines = services.invoices.find_invoice_lines(&document, &invoices[0]).await?;
    assert_eq!(
        lines,
        vec![
            InvoiceLine::text("Membership 2024"),
            InvoiceLine::new("Fee for Alice Jansen", eur("25.00")),
        ]
    );
    let descriptions = services.invoices.find_descriptions(&document, &invoices[0]).await?;
    let amounts = services.invoices.find_amounts(&document, &invoices[0]).await?;
    assert_eq!(descriptions.len(), amounts.len());
    assert_eq!(amounts, vec![None, Some(eur("25.00"))]);

    let entry = services.ledger.get_journal_entry(&document, "2024-0001").await?;
    assert_eq!(entry.id_of_created_invoice.as_deref(), Some("2024-0001"));
    let details = services.ledger.find_journal_entry_details(&document, &entry).await?;
    assert_eq!(details.len(), 2);
    assert_eq!(details[0].account_id, StandardAccounts::DEBTORS);
    assert!(details[0].is_debit());
    assert_eq!(details[1].account_id, StandardAccounts::CONTRIBUTIONS);
    assert!(!details[1].is_debit());

    Ok(())
}

#[tokio::test]
async fn test_remaining_amount_equals_amount_at_issue() -> Result<()> {
    let (document, services, _temp) = setup().await?;
    services
        .invoices
        .create_invoice_and_journal_for_parties(&document, &membership_request(&["p1"]))
        .await?;

    let remaining = services
        .invoices
        .get_remaining_amount_to_be_paid(&document, "2024-0001", parse_date("2024-02-01"))
        .await?;
    assert_eq!(remaining, eur("25.00"));
    assert!(!services.invoices.is_paid(&document, "2024-0001", parse_date("2024-02-01")).await?);

    Ok(())
}

#[tokio::test]
async fn test_full_payment_stays_paid() -> Result<()> {
    let (document, services, _temp) = setup().await?;
    services
        .invoices
        .create_invoice_and_journal_for_parties(&document, &membership_request(&["p1"]))
        .await?;

    pay(&document, &services, "b1", "2024-0001", "10.00", "2024-03-01").await?;
    pay(&document, &services, "b2", "2024-0001", "15.00", "2024-03-15").await?;

    let invoices = &services.invoices;
    assert_eq!(
        invoices
            .get_remaining_amount_to_be_paid(&document, "2024-0001", parse_date("2024-03-01"))
            .await?,
        eur("15.00")
    );
    assert!(!invoices.is_paid(&document, "2024-0001", parse_date("2024-03-14")).await?);
    for date in ["2024-03-15", "2024-06-30", "2024-12-31", "2030-01-01"] {
        assert!(invoices.is_paid(&document, "2024-0001", parse_date(date)).await?);
    }

    let invoice = invoices.get_invoice(&document, "2024-0001").await?;
    let payments = invoices.find_payments(&document, &invoice).await?;
    assert_eq!(payments.len(), 2);
    assert_eq!(payments[0].journal_entry_id, "b1");
    assert_eq!(payments[0].amount, eur("10.00"));
    assert!(invoices.has_payments(&document, "2024-0001").await?);

    Ok(())
}

#[tokio::test]
async fn test_find_invoices_hides_paid_ones() -> Result<()> {
    let (document, services, _temp) = setup().await?;
    services
        .invoices
        .create_invoice_and_journal_for_parties(&document, &membership_request(&["p1", "p2"]))
        .await?;
    pay(&document, &services, "b1", "2024-0001", "25.00", "2024-03-01").await?;

    let open = services
        .invoices
        .find_invoices(
            &document,
            &InvoiceSearchCriteria {
                as_of: Some(parse_date("2024-12-31")),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].id, "2024-0002");

    let all = services
        .invoices
        .find_invoices(
            &document,
            &InvoiceSearchCriteria {
                include_paid: true,
                as_of: Some(parse_date("2024-12-31")),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(all.len(), 2);

    let by_name = services
        .invoices
        .find_invoices(
            &document,
            &InvoiceSearchCriteria {
                name: Some("alice".to_string()),
                include_paid: true,
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].concerning_party_id, "p1");

    Ok(())
}

#[tokio::test]
async fn test_suggested_ids_do_not_collide() -> Result<()> {
    let (document, services, _temp) = setup().await?;
    services
        .invoices
        .create_invoice_and_journal_for_parties(&document, &membership_request(&["p1"]))
        .await?;

    let first = services.invoices.suggest_new_invoice_id(&document, "2024").await?;
    let second = services.invoices.suggest_new_invoice_id(&document, "2024").await?;
    assert_ne!(first, "2024-0001");
    assert_ne!(second, "2024-0001");
    assert_ne!(first, second);

    for id in [&first, &second] {
        services
            .invoices
            .create_invoice(
                &document,
                Invoice::new(id.as_str(), "p2", eur("5.00"), parse_date("2024-04-01")),
                vec![InvoiceLine::new("Late fee", eur("5.00"))],
            )
            .await?;
    }

    let third = services.invoices.suggest_new_invoice_id(&document, "2024").await?;
    assert!(![String::from("2024-0001"), first, second].contains(&third));

    Ok(())
}

#[tokio::test]
async fn test_purchase_invoice_is_negative_and_gets_paid() -> Result<()> {
    let (document, services, _temp) = setup().await?;
    let request = InvoiceBatchRequest {
        debtor_or_creditor_account_id: StandardAccounts::CREDITORS.to_string(),
        issue_date: parse_date("2024-05-01"),
        date_label: "P2024".to_string(),
        description: "Hall rental".to_string(),
        lines: vec![InvoiceTemplateLine::new("Rent May", eur("300.00"), StandardAccounts::RENT)],
        party_ids: vec!["s1".to_string()],
    };

    let invoices = services
        .invoices
        .create_invoice_and_journal_for_parties(&document, &request)
        .await?;
    assert_eq!(invoices[0].amount_to_be_paid, -eur("300.00"));

    services
        .ledger
        .add_journal_entry(
            &document,
            JournalEntry::new("b7", parse_date("2024-05-10"), "Rent paid"),
            vec![
                JournalEntryDetail::debit(StandardAccounts::CREDITORS, eur("300.00")).with_invoice(invoices[0].id.clone()),
                JournalEntryDetail::credit(StandardAccounts::BANK, eur("300.00")),
            ],
            true,
        )
        .await?;

    assert!(
        services
            .invoices
            .is_paid(&document, &invoices[0].id, parse_date("2024-05-10"))
            .await?
    );

    Ok(())
}

#[tokio::test]
async fn test_billing_fails_as_a_whole_for_unknown_party() -> Result<()> {
    let (document, services, _temp) = setup().await?;

    let err = services
        .invoices
        .create_invoice_and_journal_for_parties(&document, &membership_request(&["p1", "nobody"]))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let all = services
        .invoices
        .find_invoices(
            &document,
            &InvoiceSearchCriteria {
                include_paid: true,
                ..Default::default()
            },
        )
        .await?;
    assert!(all.is_empty());
    assert!(services.ledger.find_journal_entries(&document).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_billing_requires_debtor_or_creditor_account() -> Result<()> {
    let (document, services, _temp) = setup().await?;
    let mut request = membership_request(&["p1"]);
    request.debtor_or_creditor_account_id = StandardAccounts::CASH.to_string();

    let err = services
        .invoices
        .create_invoice_and_journal_for_parties(&document, &request)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    Ok(())
}

#[tokio::test]
async fn test_entry_creating_invoice_with_payments_cannot_be_removed() -> Result<()> {
    let (document, services, _temp) = setup().await?;
    services
        .ledger
        .add_journal_entry_creating_invoice(
            &document,
            JournalEntry::new("s-1", parse_date("2024-02-10"), "Donation pledge"),
            vec![
                JournalEntryDetail::debit(StandardAccounts::DEBTORS, eur("50.00")),
                JournalEntryDetail::credit(StandardAccounts::CONTRIBUTIONS, eur("50.00")),
            ],
            Invoice::new("D-1", "p2", eur("50.00"), parse_date("2024-02-10")),
            vec![InvoiceLine::new("Donation", eur("50.00"))],
        )
        .await?;
    pay(&document, &services, "b1", "D-1", "20.00", "2024-02-20").await?;

    let err = services
        .ledger
        .remove_journal_entry(&document, "s-1")
        .await
        .unwrap_err();
    assert!(err.is_validation());

    services.ledger.remove_journal_entry(&document, "b1").await?;
    services.ledger.remove_journal_entry(&document, "s-1").await?;
    let err = services.invoices.get_invoice(&document, "D-1").await.unwrap_err();
    assert!(err.is_not_found());

    Ok(())
}

#[tokio::test]
async fn test_failed_entry_creating_invoice_leaves_no_invoice() -> Result<()> {
    let (document, services, _temp) = setup().await?;
    let before = services.ledger.find_journal_entries(&document).await?;

    let unbalanced = services
        .ledger
        .add_journal_entry_creating_invoice(
            &document,
            JournalEntry::new("s-1", parse_date("2024-02-10"), "Donation pledge"),
            vec![
                JournalEntryDetail::debit(StandardAccounts::DEBTORS, eur("50.00")),
                JournalEntryDetail::credit(StandardAccounts::CONTRIBUTIONS, eur("40.00")),
            ],
            Invoice::new("D-1", "p2", eur("50.00"), parse_date("2024-02-10")),
            vec![InvoiceLine::new("Donation", eur("50.00"))],
        )
        .await
        .unwrap_err();
    assert!(unbalanced.is_validation());

    let unknown_account = services
        .ledger
        .add_journal_entry_creating_invoice(
            &document,
            JournalEntry::new("s-1", parse_date("2024-02-10"), "Donation pledge"),
            vec![
                JournalEntryDetail::debit("9999", eur("50.00")),
                JournalEntryDetail::credit(StandardAccounts::CONTRIBUTIONS, eur("50.00")),
            ],
            Invoice::new("D-1", "p2", eur("50.00"), parse_date("2024-02-10")),
            vec![InvoiceLine::new("Donation", eur("50.00"))],
        )
        .await
        .unwrap_err();
    assert!(unknown_account.is_not_found());

    let err = services.invoices.get_invoice(&document, "D-1").await.unwrap_err();
    assert!(err.is_not_found());
    let after = services.ledger.find_journal_entries(&document).await?;
    assert_eq!(after, before);

    Ok(())
}

#[tokio::test]
async fn test_entry_creating_invoice_may_reference_it() -> Result<()> {
    let (document, services, _temp) = setup().await?;
    services
        .ledger
        .add_journal_entry_creating_invoice(
            &document,
            JournalEntry::new("s-1", parse_date("2024-02-10"), "Donation pledge"),
            vec![
                JournalEntryDetail::debit(StandardAccounts::DEBTORS, eur("50.00")).with_invoice("D-1"),
                JournalEntryDetail::credit(StandardAccounts::CONTRIBUTIONS, eur("50.00")),
            ],
            Invoice::new("D-1", "p2", eur("50.00"), parse_date("2024-02-10")),
            vec![InvoiceLine::new("Donation", eur("50.00"))],
        )
        .await?;

    let entry = services.ledger.get_journal_entry(&document, "s-1").await?;
    let details = services.ledger.find_journal_entry_details(&document, &entry).await?;
    assert_eq!(details[0].invoice_id.as_deref(), Some("D-1"));

    let invoice = services.invoices.get_invoice(&document, "D-1").await?;
    assert!(services.invoices.find_payments(&document, &invoice).await?.is_empty());
    let remaining = services
        .invoices
        .get_remaining_amount_to_be_paid(&document, "D-1", parse_date("2024-12-31"))
        .await?;
    assert_eq!(remaining, eur("50.00"));

    pay(&document, &services, "b1", "D-1", "20.00", "2024-02-20").await?;
    let remaining = services
        .invoices
        .get_remaining_amount_to_be_paid(&document, "D-1", parse_date("2024-12-31"))
        .await?;
    assert_eq!(remaining, eur("30.00"));

    services.ledger.remove_journal_entry(&document, "b1").await?;
    services.ledger.remove_journal_entry(&document, "s-1").await?;

    Ok(())
}
