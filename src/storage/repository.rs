use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::domain::{
    Account, AccountType, Amount, Bookkeeping, Invoice, InvoiceLine, JournalEntry,
    JournalEntryDetail, Party, Payment, Side,
};

use super::{DATE_FORMAT, MIGRATION_001_INITIAL};

/// A journal entry together with its detail lines and, optionally, the invoice
/// it issues. Written as one unit.
#[derive(Debug, Clone)]
pub struct Posting {
    pub entry: JournalEntry,
    pub details: Vec<JournalEntryDetail>,
    pub invoice: Option<(Invoice, Vec<InvoiceLine>)>,
}

/// Everything needed to populate a freshly created document.
#[derive(Debug, Clone)]
pub struct DocumentSeed {
    pub bookkeeping: Bookkeeping,
    pub accounts: Vec<Account>,
    pub parties: Vec<Party>,
    pub invoices: Vec<(Invoice, Vec<InvoiceLine>)>,
    pub opening_entry: Option<Posting>,
    /// Entries booked after the opening entry, in ledger order.
    pub entries: Vec<Posting>,
}

const JOURNAL_ENTRY_COLUMNS: &str = "unique_id, id, date, description, id_of_created_invoice";
const PARTY_COLUMNS: &str = "id, name, address, zip_code, city, birth_date, party_type, remarks";
const INVOICE_COLUMNS: &str =
    "id, concerning_party_id, paying_party_id, amount_to_be_paid, issue_date, description";

/// Repository for persisting and querying one bookkeeping document.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Close all connections; the database file can be moved afterwards.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    // ========================
    // Bookkeeping
    // ========================

    pub async fn save_bookkeeping(&self, bookkeeping: &Bookkeeping) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        write_bookkeeping(&mut conn, bookkeeping).await
    }

    pub async fn get_bookkeeping(&self) -> Result<Bookkeeping> {
        let row = sqlx::query(
            r#"
            SELECT description, start_of_period, currency, invoice_id_format, organization_name,
                   organization_address, organization_zip_code, organization_city, iban, bic,
                   automatic_collection_contract_number, closed
            FROM bookkeeping
            WHERE singleton = 1
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to fetch bookkeeping")?;

        let start_of_period: String = row.get("start_of_period");
        Ok(Bookkeeping {
            description: row.get("description"),
            start_of_period: parse_date(&start_of_period)?,
            currency: row.get("currency"),
            invoice_id_format: row.get("invoice_id_format"),
            organization_name: row.get("organization_name"),
            organization_address: row.get("organization_address"),
            organization_zip_code: row.get("organization_zip_code"),
            organization_city: row.get("organization_city"),
            iban: row.get("iban"),
            bic: row.get("bic"),
            automatic_collection_contract_number: row.get("automatic_collection_contract_number"),
            closed: row.get::<i64, _>("closed") != 0,
        })
    }

    pub async fn mark_closed(&self) -> Result<()> {
        sqlx::query("UPDATE bookkeeping SET closed = 1 WHERE singleton = 1")
            .execute(&self.pool)
            .await
            .context("Failed to mark bookkeeping as closed")?;
        Ok(())
    }

    // ========================
    // Accounts
    // ========================

    pub async fn save_account(&self, account: &Account) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        insert_account(&mut conn, account).await
    }

    pub async fn update_account(&self, account: &Account) -> Result<()> {
        sqlx::query("UPDATE accounts SET name = ?, account_type = ? WHERE id = ?")
            .bind(&account.name)
            .bind(account.account_type.as_str())
            .bind(&account.id)
            .execute(&self.pool)
            .await
            .context("Failed to update account")?;
        Ok(())
    }

    pub async fn delete_account(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete account")?;
        Ok(())
    }

    pub async fn get_account(&self, id: &str) -> Result<Option<Account>> {
        let row = sqlx::query("SELECT id, name, account_type FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch account")?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    /// List all accounts, ordered by id.
    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        let rows = sqlx::query("SELECT id, name, account_type FROM accounts ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list accounts")?;

        rows.iter().map(Self::row_to_account).collect()
    }

    /// True if any journal entry detail books on the account.
    pub async fn is_account_used(&self, id: &str) -> Result<bool> {
        let row = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM journal_entry_details WHERE account_id = ?) as used",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to check account usage")?;

        Ok(row.get::<i64, _>("used") != 0)
    }

    fn row_to_account(row: &sqlx::sqlite::SqliteRow) -> Result<Account> {
        let account_type_str: String = row.get("account_type");
        Ok(Account {
            id: row.get("id"),
            name: row.get("name"),
            account_type: AccountType::from_str(&account_type_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid account type: {}", account_type_str))?,
        })
    }

    // ========================
    // Parties
    // ========================

    pub async fn save_party(&self, party: &Party) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        insert_party(&mut conn, party).await
    }

    pub async fn update_party(&self, party: &Party) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE parties
            SET name = ?, address = ?, zip_code = ?, city = ?, birth_date = ?, party_type = ?, remarks = ?
            WHERE id = ?
            "#,
        )
        .bind(&party.name)
        .bind(&party.address)
        .bind(&party.zip_code)
        .bind(&party.city)
        .bind(party.birth_date.map(format_date))
        .bind(&party.party_type)
        .bind(&party.remarks)
        .bind(&party.id)
        .execute(&self.pool)
        .await
        .context("Failed to update party")?;
        Ok(())
    }

    pub async fn delete_party(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM parties WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete party")?;
        Ok(())
    }

    pub async fn get_party(&self, id: &str) -> Result<Option<Party>> {
        let row = sqlx::query(&format!("SELECT {} FROM parties WHERE id = ?", PARTY_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch party")?;

        row.as_ref().map(Self::row_to_party).transpose()
    }

    pub async fn list_parties(&self) -> Result<Vec<Party>> {
        let rows = sqlx::query(&format!("SELECT {} FROM parties ORDER BY id", PARTY_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .context("Failed to list parties")?;

        rows.iter().map(Self::row_to_party).collect()
    }

    /// Distinct party types in use, sorted.
    pub async fn list_party_types(&self) -> Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT DISTINCT party_type FROM parties WHERE party_type IS NOT NULL ORDER BY party_type",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list party types")?;

        Ok(rows.iter().map(|row| row.get("party_type")).collect())
    }

    /// True if an invoice is about or paid by the party.
    pub async fn is_party_referenced(&self, id: &str) -> Result<bool> {
        let row = sqlx::query(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM invoices WHERE concerning_party_id = ? OR paying_party_id = ?
            ) as used
            "#,
        )
        .bind(id)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to check party usage")?;

        Ok(row.get::<i64, _>("used") != 0)
    }

    fn row_to_party(row: &sqlx::sqlite::SqliteRow) -> Result<Party> {
        let birth_date: Option<String> = row.get("birth_date");
        Ok(Party {
            id: row.get("id"),
            name: row.get("name"),
            address: row.get("address"),
            zip_code: row.get("zip_code"),
            city: row.get("city"),
            birth_date: birth_date.as_deref().map(parse_date).transpose()?,
            party_type: row.get("party_type"),
            remarks: row.get("remarks"),
        })
    }

    // ========================
    // Invoices
    // ========================

    pub async fn save_invoice(&self, invoice: &Invoice, lines: &[InvoiceLine]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        insert_invoice(&mut tx, invoice, lines).await?;
        tx.commit().await.context("Failed to commit invoice")?;
        Ok(())
    }

    /// Replace the invoice header and all of its lines.
    pub async fn update_invoice(&self, invoice: &Invoice, lines: &[InvoiceLine]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE invoices
            SET concerning_party_id = ?, paying_party_id = ?, amount_to_be_paid = ?, issue_date = ?, description = ?
            WHERE id = ?
            "#,
        )
        .bind(&invoice.concerning_party_id)
        .bind(&invoice.paying_party_id)
        .bind(invoice.amount_to_be_paid.cents())
        .bind(format_date(invoice.issue_date))
        .bind(&invoice.description)
        .bind(&invoice.id)
        .execute(&mut *tx)
        .await
        .context("Failed to update invoice")?;

        sqlx::query("DELETE FROM invoice_lines WHERE invoice_id = ?")
            .bind(&invoice.id)
            .execute(&mut *tx)
            .await
            .context("Failed to remove invoice lines")?;
        insert_invoice_lines(&mut tx, &invoice.id, lines).await?;

        tx.commit().await.context("Failed to commit invoice update")?;
        Ok(())
    }

    pub async fn get_invoice(&self, id: &str) -> Result<Option<Invoice>> {
        let row = sqlx::query(&format!("SELECT {} FROM invoices WHERE id = ?", INVOICE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch invoice")?;

        row.as_ref().map(Self::row_to_invoice).transpose()
    }

    /// List all invoices, ordered by id.
    pub async fn list_invoices(&self) -> Result<Vec<Invoice>> {
        let rows = sqlx::query(&format!("SELECT {} FROM invoices ORDER BY id", INVOICE_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .context("Failed to list invoices")?;

        rows.iter().map(Self::row_to_invoice).collect()
    }

    pub async fn list_invoice_ids(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT id FROM invoices")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list invoice ids")?;

        Ok(rows.iter().map(|row| row.get("id")).collect())
    }

    /// Lines of an invoice in their printed order.
    pub async fn list_invoice_lines(&self, invoice_id: &str) -> Result<Vec<InvoiceLine>> {
        let rows = sqlx::query(
            "SELECT description, amount FROM invoice_lines WHERE invoice_id = ? ORDER BY position",
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list invoice lines")?;

        Ok(rows
            .iter()
            .map(|row| InvoiceLine {
                description: row.get("description"),
                amount: row.get::<Option<i64>, _>("amount").map(Amount::from_cents),
            })
            .collect())
    }

    /// Payments applied to one invoice, ordered by date. Details of the entry
    /// that created the invoice are not payments.
    pub async fn list_payments(&self, invoice_id: &str) -> Result<Vec<Payment>> {
        let rows = sqlx::query(
            r#"
            SELECT d.invoice_id, d.account_id, e.id as entry_id, e.date, e.description, d.side, d.amount
            FROM journal_entry_details d
            JOIN journal_entries e ON e.unique_id = d.journal_entry_unique_id
            WHERE d.invoice_id = ?
              AND (e.id_of_created_invoice IS NULL OR e.id_of_created_invoice <> d.invoice_id)
            ORDER BY e.date, e.id, d.position
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list payments")?;

        rows.iter().map(Self::row_to_payment).collect()
    }

    /// Payments of every invoice, grouped by invoice id.
    pub async fn list_all_payments(&self) -> Result<HashMap<String, Vec<Payment>>> {
        let rows = sqlx::query(
            r#"
            SELECT d.invoice_id, d.account_id, e.id as entry_id, e.date, e.description, d.side, d.amount
            FROM journal_entry_details d
            JOIN journal_entries e ON e.unique_id = d.journal_entry_unique_id
            WHERE d.invoice_id IS NOT NULL
              AND (e.id_of_created_invoice IS NULL OR e.id_of_created_invoice <> d.invoice_id)
            ORDER BY e.date, e.id, d.position
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list payments")?;

        let mut payments: HashMap<String, Vec<Payment>> = HashMap::new();
        for row in &rows {
            let payment = Self::row_to_payment(row)?;
            payments
                .entry(payment.invoice_id.clone())
                .or_default()
                .push(payment);
        }
        Ok(payments)
    }

    fn row_to_invoice(row: &sqlx::sqlite::SqliteRow) -> Result<Invoice> {
        let issue_date: String = row.get("issue_date");
        Ok(Invoice {
            id: row.get("id"),
            concerning_party_id: row.get("concerning_party_id"),
            paying_party_id: row.get("paying_party_id"),
            amount_to_be_paid: Amount::from_cents(row.get("amount_to_be_paid")),
            issue_date: parse_date(&issue_date)?,
            description: row.get("description"),
        })
    }

    fn row_to_payment(row: &sqlx::sqlite::SqliteRow) -> Result<Payment> {
        let date: String = row.get("date");
        let detail = Self::row_to_detail(row)?;
        Ok(Payment {
            invoice_id: row.get("invoice_id"),
            journal_entry_id: row.get("entry_id"),
            date: parse_date(&date)?,
            description: row.get("description"),
            amount: detail.payment_amount(),
        })
    }

    // ========================
    // Journal entries
    // ========================

    /// Store a journal entry, its details and the invoice it creates in one
    /// transaction.
    pub async fn save_posting(&self, posting: &Posting) -> Result<()> {
        self.save_postings(std::slice::from_ref(posting)).await
    }

    /// Store several postings; either all of them are written or none.
    pub async fn save_postings(&self, postings: &[Posting]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for posting in postings {
            insert_posting(&mut tx, posting).await?;
        }
        tx.commit().await.context("Failed to commit journal entries")?;
        Ok(())
    }

    /// Replace id, date, description and detail lines of an existing entry.
    pub async fn update_journal_entry(
        &self,
        entry: &JournalEntry,
        details: &[JournalEntryDetail],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE journal_entries SET id = ?, date = ?, description = ? WHERE unique_id = ?")
            .bind(&entry.id)
            .bind(format_date(entry.date))
            .bind(&entry.description)
            .bind(entry.unique_id.to_string())
            .execute(&mut *tx)
            .await
            .context("Failed to update journal entry")?;

        sqlx::query("DELETE FROM journal_entry_details WHERE journal_entry_unique_id = ?")
            .bind(entry.unique_id.to_string())
            .execute(&mut *tx)
            .await
            .context("Failed to remove journal entry details")?;
        insert_details(&mut tx, entry.unique_id, details).await?;

        tx.commit().await.context("Failed to commit journal entry update")?;
        Ok(())
    }

    /// Remove an entry, its details and the invoice it created.
    pub async fn delete_journal_entry(&self, entry: &JournalEntry) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM journal_entries WHERE unique_id = ?")
            .bind(entry.unique_id.to_string())
            .execute(&mut *tx)
            .await
            .context("Failed to delete journal entry")?;

        if let Some(invoice_id) = &entry.id_of_created_invoice {
            sqlx::query("DELETE FROM invoices WHERE id = ?")
                .bind(invoice_id)
                .execute(&mut *tx)
                .await
                .context("Failed to delete invoice created by journal entry")?;
        }

        tx.commit().await.context("Failed to commit journal entry removal")?;
        Ok(())
    }

    pub async fn get_journal_entry(&self, id: &str) -> Result<Option<JournalEntry>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM journal_entries WHERE id = ?",
            JOURNAL_ENTRY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch journal entry")?;

        row.as_ref().map(Self::row_to_journal_entry).transpose()
    }

    /// List journal entries ordered by date then id, optionally up to a date.
    pub async fn list_journal_entries(&self, until: Option<NaiveDate>) -> Result<Vec<JournalEntry>> {
        let until_str = until.map(format_date);
        let mut query = format!("SELECT {} FROM journal_entries", JOURNAL_ENTRY_COLUMNS);
        if until.is_some() {
            query.push_str(" WHERE date <= ?");
        }
        query.push_str(" ORDER BY date, id");

        let mut sql_query = sqlx::query(&query);
        if let Some(ref until_str) = until_str {
            sql_query = sql_query.bind(until_str);
        }

        let rows = sql_query
            .fetch_all(&self.pool)
            .await
            .context("Failed to list journal entries")?;

        rows.iter().map(Self::row_to_journal_entry).collect()
    }

    pub async fn list_journal_entry_details(
        &self,
        unique_id: Uuid,
    ) -> Result<Vec<JournalEntryDetail>> {
        let rows = sqlx::query(
            r#"
            SELECT account_id, side, amount, invoice_id
            FROM journal_entry_details
            WHERE journal_entry_unique_id = ?
            ORDER BY position
            "#,
        )
        .bind(unique_id.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list journal entry details")?;

        rows.iter().map(Self::row_to_detail).collect()
    }

    /// Journal entries with their details, ordered like `list_journal_entries`.
    pub async fn list_journal_entries_with_details(
        &self,
        until: Option<NaiveDate>,
    ) -> Result<Vec<(JournalEntry, Vec<JournalEntryDetail>)>> {
        let entries = self.list_journal_entries(until).await?;

        let rows = sqlx::query(
            r#"
            SELECT journal_entry_unique_id, account_id, side, amount, invoice_id
            FROM journal_entry_details
            ORDER BY journal_entry_unique_id, position
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list journal entry details")?;

        let mut details: HashMap<Uuid, Vec<JournalEntryDetail>> = HashMap::new();
        for row in &rows {
            let unique_id_str: String = row.get("journal_entry_unique_id");
            let unique_id = Uuid::parse_str(&unique_id_str).context("Invalid journal entry ID")?;
            details
                .entry(unique_id)
                .or_default()
                .push(Self::row_to_detail(row)?);
        }

        Ok(entries
            .into_iter()
            .map(|entry| {
                let lines = details.remove(&entry.unique_id).unwrap_or_default();
                (entry, lines)
            })
            .collect())
    }

    /// True if any journal entry detail references the invoice.
    pub async fn has_payments(&self, invoice_id: &str) -> Result<bool> {
        let row = sqlx::query(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM journal_entry_details d
                JOIN journal_entries e ON e.unique_id = d.journal_entry_unique_id
                WHERE d.invoice_id = ?
                  AND (e.id_of_created_invoice IS NULL OR e.id_of_created_invoice <> d.invoice_id)
            ) as paid
            "#,
        )
        .bind(invoice_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to check payments")?;

        Ok(row.get::<i64, _>("paid") != 0)
    }

    fn row_to_journal_entry(row: &sqlx::sqlite::SqliteRow) -> Result<JournalEntry> {
        let unique_id_str: String = row.get("unique_id");
        let date: String = row.get("date");
        Ok(JournalEntry {
            unique_id: Uuid::parse_str(&unique_id_str).context("Invalid journal entry ID")?,
            id: row.get("id"),
            date: parse_date(&date)?,
            description: row.get("description"),
            id_of_created_invoice: row.get("id_of_created_invoice"),
        })
    }

    fn row_to_detail(row: &sqlx::sqlite::SqliteRow) -> Result<JournalEntryDetail> {
        let side_str: String = row.get("side");
        Ok(JournalEntryDetail {
            amount: Amount::from_cents(row.get("amount")),
            account_id: row.get("account_id"),
            side: Side::from_str(&side_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid side: {}", side_str))?,
            invoice_id: row.get("invoice_id"),
        })
    }

    // ========================
    // Seeding
    // ========================

    /// Populate an empty document in a single transaction.
    pub async fn seed(&self, seed: &DocumentSeed) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        write_bookkeeping(&mut tx, &seed.bookkeeping).await?;
        for account in &seed.accounts {
            insert_account(&mut tx, account).await?;
        }
        for party in &seed.parties {
            insert_party(&mut tx, party).await?;
        }
        for (invoice, lines) in &seed.invoices {
            insert_invoice(&mut tx, invoice, lines).await?;
        }
        if let Some(posting) = &seed.opening_entry {
            insert_posting(&mut tx, posting).await?;
        }
        for posting in &seed.entries {
            insert_posting(&mut tx, posting).await?;
        }

        tx.commit().await.context("Failed to commit document seed")?;
        Ok(())
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).with_context(|| format!("Invalid date: {}", s))
}

async fn write_bookkeeping(conn: &mut SqliteConnection, bookkeeping: &Bookkeeping) -> Result<()> {
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO bookkeeping (singleton, description, start_of_period, currency, invoice_id_format,
            organization_name, organization_address, organization_zip_code, organization_city, iban, bic,
            automatic_collection_contract_number, closed)
        VALUES (1, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&bookkeeping.description)
    .bind(format_date(bookkeeping.start_of_period))
    .bind(&bookkeeping.currency)
    .bind(&bookkeeping.invoice_id_format)
    .bind(&bookkeeping.organization_name)
    .bind(&bookkeeping.organization_address)
    .bind(&bookkeeping.organization_zip_code)
    .bind(&bookkeeping.organization_city)
    .bind(&bookkeeping.iban)
    .bind(&bookkeeping.bic)
    .bind(&bookkeeping.automatic_collection_contract_number)
    .bind(bookkeeping.closed)
    .execute(&mut *conn)
    .await
    .context("Failed to save bookkeeping")?;
    Ok(())
}

async fn insert_account(conn: &mut SqliteConnection, account: &Account) -> Result<()> {
    sqlx::query("INSERT INTO accounts (id, name, account_type) VALUES (?, ?, ?)")
        .bind(&account.id)
        .bind(&account.name)
        .bind(account.account_type.as_str())
        .execute(&mut *conn)
        .await
        .context("Failed to save account")?;
    Ok(())
}

async fn insert_party(conn: &mut SqliteConnection, party: &Party) -> Result<()> {
    sqlx::query(&format!(
        "INSERT INTO parties ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        PARTY_COLUMNS
    ))
    .bind(&party.id)
    .bind(&party.name)
    .bind(&party.address)
    .bind(&party.zip_code)
    .bind(&party.city)
    .bind(party.birth_date.map(format_date))
    .bind(&party.party_type)
    .bind(&party.remarks)
    .execute(&mut *conn)
    .await
    .context("Failed to save party")?;
    Ok(())
}

async fn insert_invoice(
    conn: &mut SqliteConnection,
    invoice: &Invoice,
    lines: &[InvoiceLine],
) -> Result<()> {
    sqlx::query(&format!(
        "INSERT INTO invoices ({}) VALUES (?, ?, ?, ?, ?, ?)",
        INVOICE_COLUMNS
    ))
    .bind(&invoice.id)
    .bind(&invoice.concerning_party_id)
    .bind(&invoice.paying_party_id)
    .bind(invoice.amount_to_be_paid.cents())
    .bind(format_date(invoice.issue_date))
    .bind(&invoice.description)
    .execute(&mut *conn)
    .await
    .context("Failed to save invoice")?;

    insert_invoice_lines(conn, &invoice.id, lines).await
}

async fn insert_invoice_lines(
    conn: &mut SqliteConnection,
    invoice_id: &str,
    lines: &[InvoiceLine],
) -> Result<()> {
    for (position, line) in lines.iter().enumerate() {
        sqlx::query(
            "INSERT INTO invoice_lines (invoice_id, position, description, amount) VALUES (?, ?, ?, ?)",
        )
        .bind(invoice_id)
        .bind(position as i64)
        .bind(&line.description)
        .bind(line.amount.map(Amount::cents))
        .execute(&mut *conn)
        .await
        .context("Failed to save invoice line")?;
    }
    Ok(())
}

async fn insert_posting(conn: &mut SqliteConnection, posting: &Posting) -> Result<()> {
    // The invoice goes first: the entry refers to it
    if let Some((invoice, lines)) = &posting.invoice {
        insert_invoice(conn, invoice, lines).await?;
    }

    let entry = &posting.entry;
    sqlx::query(&format!(
        "INSERT INTO journal_entries ({}) VALUES (?, ?, ?, ?, ?)",
        JOURNAL_ENTRY_COLUMNS
    ))
    .bind(entry.unique_id.to_string())
    .bind(&entry.id)
    .bind(format_date(entry.date))
    .bind(&entry.description)
    .bind(&entry.id_of_created_invoice)
    .execute(&mut *conn)
    .await
    .context("Failed to save journal entry")?;

    insert_details(conn, entry.unique_id, &posting.details).await
}

async fn insert_details(
    conn: &mut SqliteConnection,
    unique_id: Uuid,
    details: &[JournalEntryDetail],
) -> Result<()> {
    for (position, detail) in details.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO journal_entry_details (journal_entry_unique_id, position, account_id, side, amount, invoice_id)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(unique_id.to_string())
        .bind(position as i64)
        .bind(&detail.account_id)
        .bind(detail.side.as_str())
        .bind(detail.amount.cents())
        .bind(&detail.invoice_id)
        .execute(&mut *conn)
        .await
        .context("Failed to save journal entry detail")?;
    }
    Ok(())
}
