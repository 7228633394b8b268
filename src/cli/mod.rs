use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::warn;

use crate::application::{
    BalanceSheet, Document, IncomeStatement, InvoiceBatchRequest, InvoiceTemplateLine, Services,
};
use crate::domain::{
    Account, AccountType, Amount, Bookkeeping, InvoiceSearchCriteria, JournalEntry,
    JournalEntryDetail, Party, PartySearchCriteria, Report,
};
use crate::io::Exporter;

/// gogoaccount - double-entry bookkeeping for small organizations
#[derive(Parser)]
#[command(name = "gogoaccount")]
#[command(about = "Double-entry bookkeeping with invoices, parties and period closing")]
#[command(version)]
pub struct Cli {
    /// Bookkeeping document file path
    #[arg(short, long, env = "GOGOACCOUNT_DOCUMENT", default_value = "bookkeeping.db")]
    pub document: String,

    /// Log filter directive, e.g. "gogoaccount=debug"
    #[arg(long, env = "GOGOACCOUNT_LOG", default_value = "gogoaccount=info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new bookkeeping document
    Init {
        /// Description of the period, e.g. "2024"
        description: String,

        /// Start of the period (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// Currency code
        #[arg(short, long, default_value = "EUR")]
        currency: String,
    },

    /// Show the bookkeeping settings
    Info,

    /// Account management commands
    #[command(subcommand)]
    Account(AccountCommands),

    /// Debtor and creditor management commands
    #[command(subcommand)]
    Party(PartyCommands),

    /// Journal entry commands
    #[command(subcommand)]
    Journal(JournalCommands),

    /// Invoice commands
    #[command(subcommand)]
    Invoice(InvoiceCommands),

    /// Generate reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Close the period and start the next one in a new document
    Close {
        /// File path of the new document
        new_document: String,

        /// Description of the new period
        #[arg(short, long)]
        description: String,

        /// Closing date (YYYY-MM-DD); also the start of the new period
        #[arg(long)]
        date: String,

        /// Equity account receiving the result of the period
        #[arg(long)]
        equity: String,
    },
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create a new account
    Create {
        /// Account id (must be unique)
        id: String,

        /// Account name
        name: String,

        /// Account type: asset, liability, equity, revenue, expense, debtor, creditor
        #[arg(short = 't', long = "type")]
        account_type: String,
    },

    /// List all accounts
    List,

    /// Rename an account
    Rename {
        /// Account id
        id: String,

        /// New name
        name: String,
    },

    /// Delete an unused account
    Delete {
        /// Account id
        id: String,
    },
}

#[derive(Subcommand)]
pub enum PartyCommands {
    /// Add a new party
    Add {
        /// Party id (must be unique)
        id: String,

        /// Name
        name: String,

        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        zip_code: Option<String>,

        #[arg(long)]
        city: Option<String>,

        /// Free-form classification, e.g. "member" or "supplier"
        #[arg(short = 't', long = "type")]
        party_type: Option<String>,

        #[arg(long)]
        remarks: Option<String>,
    },

    /// List parties
    List {
        /// Case-insensitive text searched in id and name
        #[arg(short, long)]
        search: Option<String>,

        /// Only parties of this type
        #[arg(short = 't', long = "type")]
        party_type: Option<String>,
    },

    /// Delete a party that no invoice refers to
    Delete {
        /// Party id
        id: String,
    },
}

#[derive(Subcommand)]
pub enum JournalCommands {
    /// Add a journal entry
    Add {
        /// Journal entry id (must be unique)
        id: String,

        /// Date of the entry (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Description of the entry
        #[arg(short, long)]
        description: String,

        /// Debit line as ACCOUNT=AMOUNT[@INVOICE]; repeatable
        #[arg(long)]
        debit: Vec<String>,

        /// Credit line as ACCOUNT=AMOUNT[@INVOICE]; repeatable
        #[arg(long)]
        credit: Vec<String>,

        /// Accept an entry whose debits and credits differ
        #[arg(long)]
        unbalanced: bool,
    },

    /// List all journal entries
    List,

    /// Show a journal entry with its lines
    Show {
        /// Journal entry id
        id: String,
    },

    /// Delete a journal entry and the invoice it created
    Delete {
        /// Journal entry id
        id: String,
    },
}

#[derive(Subcommand)]
pub enum InvoiceCommands {
    /// List invoices
    List {
        /// Only invoices whose id contains this text
        #[arg(long)]
        id: Option<String>,

        /// Only invoices whose party name contains this text
        #[arg(long)]
        name: Option<String>,

        /// Include fully paid invoices
        #[arg(long)]
        all: bool,

        /// Date for the paid/unpaid decision (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Show an invoice with its lines
    Show {
        /// Invoice id
        id: String,
    },

    /// List the payments made against an invoice
    Payments {
        /// Invoice id
        id: String,
    },

    /// Suggest a free invoice id
    SuggestId {
        /// Label substituted for {date} in the invoice id format
        #[arg(long)]
        label: Option<String>,
    },

    /// Bill several parties with the same invoice lines
    Bill {
        /// Debtor (sales) or creditor (purchase) account
        #[arg(long)]
        account: String,

        /// Issue date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Label substituted for {date} in the invoice id format
        #[arg(long)]
        label: Option<String>,

        /// Description; {name} is replaced by the party's name
        #[arg(short, long)]
        description: String,

        /// Invoice line as DESCRIPTION=AMOUNT@ACCOUNT, or plain text; repeatable
        #[arg(long)]
        line: Vec<String>,

        /// Party to bill; repeatable
        #[arg(long = "party", required = true)]
        parties: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Balance sheet on a date
    BalanceSheet {
        /// Report date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Revenues and expenses of the period up to a date
    IncomeStatement {
        /// Report date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Ledger lines per account
    Ledger {
        /// Report date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Only this account
        #[arg(long)]
        account: Option<String>,

        /// Output format: table, csv, json
        #[arg(long, default_value = "table")]
        format: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let services = Services::new();

        if let Commands::Init {
            description,
            start,
            currency,
        } = &self.command
        {
            let start = parse_date(start)?;
            let bookkeeping = Bookkeeping::new(description.clone(), start).with_currency(currency.clone());
            let document = Document::create(&self.document, &bookkeeping).await?;
            println!("Document initialized: {}", document.path().display());
            document.close().await;
            return Ok(());
        }

        let document = Document::open(&self.document)
            .await
            .with_context(|| format!("Failed to open document {}", self.document))?;
        let result = self.dispatch(&services, &document).await;
        document.close().await;
        result
    }

    async fn dispatch(self, services: &Services, document: &Document) -> Result<()> {
        match self.command {
            Commands::Init { .. } => anyhow::bail!("Document {} already exists", self.document),

            Commands::Info => run_info_command(services, document).await?,

            Commands::Account(cmd) => run_account_command(services, document, cmd).await?,

            Commands::Party(cmd) => run_party_command(services, document, cmd).await?,

            Commands::Journal(cmd) => run_journal_command(services, document, cmd).await?,

            Commands::Invoice(cmd) => run_invoice_command(services, document, cmd).await?,

            Commands::Report(cmd) => run_report_command(services, document, cmd).await?,

            Commands::Close {
                new_document,
                description,
                date,
                equity,
            } => {
                let closing_date = parse_date(&date)?;
                let next = services
                    .bookkeeping
                    .close_bookkeeping(document, &new_document, &description, closing_date, &equity)
                    .await?;
                println!(
                    "Closed {} on {}; next period starts in {}",
                    document.path().display(),
                    closing_date,
                    next.path().display()
                );
                next.close().await;
            }
        }

        Ok(())
    }
}

async fn run_info_command(services: &Services, document: &Document) -> Result<()> {
    let bookkeeping = services.configuration.get_bookkeeping(document).await?;

    println!("Bookkeeping: {}", bookkeeping.description);
    println!("  Start of period:   {}", bookkeeping.start_of_period);
    println!("  Currency:          {}", bookkeeping.currency);
    println!("  Invoice id format: {}", bookkeeping.invoice_id_format);
    if let Some(name) = &bookkeeping.organization_name {
        println!("  Organization:      {}", name);
    }
    if let Some(iban) = &bookkeeping.iban {
        println!("  IBAN:              {}", iban);
    }
    println!(
        "  Status:            {}",
        if bookkeeping.closed { "closed" } else { "open" }
    );
    Ok(())
}

async fn run_account_command(services: &Services, document: &Document, cmd: AccountCommands) -> Result<()> {
    let configuration = &services.configuration;
    match cmd {
        AccountCommands::Create {
            id,
            name,
            account_type,
        } => {
            let account_type = AccountType::from_str(&account_type).with_context(|| {
                format!(
                    "Invalid account type '{}'. Valid types: asset, liability, equity, revenue, expense, debtor, creditor",
                    account_type
                )
            })?;
            let account = configuration
                .create_account(document, Account::new(id, name, account_type))
                .await?;
            println!("Created account: {} ({})", account.label(), account.account_type);
        }

        AccountCommands::List => {
            let accounts = configuration.find_all_accounts(document).await?;
            if accounts.is_empty() {
                println!("No accounts found.");
            } else {
                println!("{:<10} {:<30} {:<10}", "ID", "NAME", "TYPE");
                println!("{}", "-".repeat(52));
                for account in accounts {
                    println!(
                        "{:<10} {:<30} {:<10}",
                        account.id, account.name, account.account_type
                    );
                }
            }
        }

        AccountCommands::Rename { id, name } => {
            let mut account = configuration.get_account(document, &id).await?;
            account.name = name;
            let account = configuration.update_account(document, account).await?;
            println!("Renamed account: {}", account.label());
        }

        AccountCommands::Delete { id } => {
            configuration.delete_account(document, &id).await?;
            println!("Deleted account: {}", id);
        }
    }
    Ok(())
}

async fn run_party_command(services: &Services, document: &Document, cmd: PartyCommands) -> Result<()> {
    match cmd {
        PartyCommands::Add {
            id,
            name,
            address,
            zip_code,
            city,
            party_type,
            remarks,
        } => {
            let mut party = Party::new(id, name);
            party.address = address;
            party.zip_code = zip_code;
            party.city = city;
            party.party_type = party_type;
            party.remarks = remarks;
            let party = services.parties.create_party(document, party).await?;
            println!("Added party: {} {}", party.id, party.name);
        }

        PartyCommands::List { search, party_type } => {
            let criteria = PartySearchCriteria {
                text: search,
                party_type,
            };
            let parties = services.parties.find_parties(document, &criteria).await?;
            if parties.is_empty() {
                println!("No parties found.");
            } else {
                println!("{:<10} {:<30} {:<20} {:<12}", "ID", "NAME", "CITY", "TYPE");
                println!("{}", "-".repeat(75));
                for party in parties {
                    println!(
                        "{:<10} {:<30} {:<20} {:<12}",
                        party.id,
                        party.name,
                        party.city.as_deref().unwrap_or("-"),
                        party.party_type.as_deref().unwrap_or("-")
                    );
                }
            }
        }

        PartyCommands::Delete { id } => {
            services.parties.delete_party(document, &id).await?;
            println!("Deleted party: {}", id);
        }
    }
    Ok(())
}

async fn run_journal_command(services: &Services, document: &Document, cmd: JournalCommands) -> Result<()> {
    let ledger = &services.ledger;
    match cmd {
        JournalCommands::Add {
            id,
            date,
            description,
            debit,
            credit,
            unbalanced,
        } => {
            let date = parse_date_or_today(date.as_deref())?;
            let mut details = Vec::new();
            for arg in &debit {
                let (account_id, amount, invoice_id) = parse_detail(arg)?;
                details.push(with_invoice(JournalEntryDetail::debit(account_id, amount), invoice_id));
            }
            for arg in &credit {
                let (account_id, amount, invoice_id) = parse_detail(arg)?;
                details.push(with_invoice(JournalEntryDetail::credit(account_id, amount), invoice_id));
            }

            let entry = ledger
                .add_journal_entry(document, JournalEntry::new(id, date, description), details, !unbalanced)
                .await?;
            println!("Added journal entry: {} ({})", entry.id, entry.date);

            let balance_sheet = match services.bookkeeping.balance_sheet(document, entry.date).await {
                Ok(sheet) => Some(sheet),
                Err(err) => {
                    warn!(error = %err, "failed to render balance sheet after adding entry");
                    None
                }
            };
            print_balance_totals(balance_sheet.as_ref());
        }

        JournalCommands::List => {
            let entries = ledger.find_journal_entries(document).await?;
            if entries.is_empty() {
                println!("No journal entries found.");
            } else {
                println!("{:<12} {:<12} {:<40} {:<12}", "DATE", "ID", "DESCRIPTION", "INVOICE");
                println!("{}", "-".repeat(78));
                for entry in entries {
                    println!(
                        "{:<12} {:<12} {:<40} {:<12}",
                        entry.date,
                        entry.id,
                        truncate(&entry.description, 40),
                        entry.id_of_created_invoice.as_deref().unwrap_or("")
                    );
                }
            }
        }

        JournalCommands::Show { id } => {
            let entry = ledger.get_journal_entry(document, &id).await?;
            let details = ledger.find_journal_entry_details(document, &entry).await?;

            println!("Journal entry: {}", entry.id);
            println!("  Date:        {}", entry.date);
            println!("  Description: {}", entry.description);
            if let Some(invoice_id) = &entry.id_of_created_invoice {
                println!("  Creates:     invoice {}", invoice_id);
            }
            println!();
            println!("  {:<10} {:>12} {:>12} {:<12}", "ACCOUNT", "DEBIT", "CREDIT", "INVOICE");
            for detail in details {
                let (debit, credit) = if detail.is_debit() {
                    (detail.amount.to_string(), String::new())
                } else {
                    (String::new(), detail.amount.to_string())
                };
                println!(
                    "  {:<10} {:>12} {:>12} {:<12}",
                    detail.account_id,
                    debit,
                    credit,
                    detail.invoice_id.as_deref().unwrap_or("")
                );
            }
        }

        JournalCommands::Delete { id } => {
            ledger.remove_journal_entry(document, &id).await?;
            println!("Deleted journal entry: {}", id);
        }
    }
    Ok(())
}

async fn run_invoice_command(services: &Services, document: &Document, cmd: InvoiceCommands) -> Result<()> {
    let invoices = &services.invoices;
    match cmd {
        InvoiceCommands::List {
            id,
            name,
            all,
            as_of,
        } => {
            let as_of = parse_date_or_today(as_of.as_deref())?;
            let criteria = InvoiceSearchCriteria {
                id,
                name,
                include_paid: all,
                as_of: Some(as_of),
            };
            let found = invoices.find_invoices(document, &criteria).await?;
            if found.is_empty() {
                println!("No invoices found.");
            } else {
                println!(
                    "{:<16} {:<12} {:<10} {:>12} {:>12}",
                    "ID", "DATE", "PARTY", "AMOUNT", "REMAINING"
                );
                println!("{}", "-".repeat(66));
                for invoice in found {
                    let remaining = invoices
                        .get_remaining_amount_to_be_paid(document, &invoice.id, as_of)
                        .await?;
                    println!(
                        "{:<16} {:<12} {:<10} {:>12} {:>12}",
                        invoice.id,
                        invoice.issue_date,
                        invoice.concerning_party_id,
                        invoice.amount_to_be_paid,
                        remaining
                    );
                }
            }
        }

        InvoiceCommands::Show { id } => {
            let invoice = invoices.get_invoice(document, &id).await?;
            let lines = invoices.find_invoice_lines(document, &invoice).await?;
            let remaining = invoices
                .get_remaining_amount_to_be_paid(document, &invoice.id, Local::now().date_naive())
                .await?;

            println!("Invoice: {}", invoice.id);
            println!("  Issued:      {}", invoice.issue_date);
            println!("  Concerning:  {}", invoice.concerning_party_id);
            println!("  Paying:      {}", invoice.paying_party_id);
            if let Some(description) = &invoice.description {
                println!("  Description: {}", description);
            }
            println!("  Amount:      {}", invoice.amount_to_be_paid);
            println!("  Remaining:   {}", remaining);
            println!();
            for line in lines {
                match line.amount {
                    Some(amount) => println!("  {:<50} {:>12}", line.description, amount),
                    None => println!("  {}", line.description),
                }
            }
        }

        InvoiceCommands::Payments { id } => {
            let invoice = invoices.get_invoice(document, &id).await?;
            let payments = invoices.find_payments(document, &invoice).await?;
            if payments.is_empty() {
                println!("No payments found.");
            } else {
                println!("{:<12} {:<12} {:<40} {:>12}", "DATE", "ENTRY", "DESCRIPTION", "AMOUNT");
                println!("{}", "-".repeat(78));
                for payment in payments {
                    println!(
                        "{:<12} {:<12} {:<40} {:>12}",
                        payment.date,
                        payment.journal_entry_id,
                        truncate(&payment.description, 40),
                        payment.amount
                    );
                }
            }
        }

        InvoiceCommands::SuggestId { label } => {
            let label = label.unwrap_or_else(default_date_label);
            let id = invoices.suggest_new_invoice_id(document, &label).await?;
            println!("{}", id);
        }

        InvoiceCommands::Bill {
            account,
            date,
            label,
            description,
            line,
            parties,
        } => {
            let issue_date = parse_date_or_today(date.as_deref())?;
            let lines = line
                .iter()
                .map(|arg| parse_template_line(arg))
                .collect::<Result<Vec<_>>>()?;
            let request = InvoiceBatchRequest {
                debtor_or_creditor_account_id: account,
                issue_date,
                date_label: label.unwrap_or_else(default_date_label),
                description,
                lines,
                party_ids: parties,
            };

            let created = invoices
                .create_invoice_and_journal_for_parties(document, &request)
                .await?;
            for invoice in &created {
                println!(
                    "Created invoice: {} for {} ({})",
                    invoice.id, invoice.concerning_party_id, invoice.amount_to_be_paid
                );
            }
        }
    }
    Ok(())
}

async fn run_report_command(services: &Services, document: &Document, cmd: ReportCommands) -> Result<()> {
    let bookkeeping = &services.bookkeeping;
    let stdout = std::io::stdout();
    match cmd {
        ReportCommands::BalanceSheet { date, format } => {
            let date = parse_date_or_today(date.as_deref())?;
            let report = bookkeeping.create_report(document, date).await?;
            match format.as_str() {
                "table" => print_balance_sheet(&BalanceSheet::from_report(&report)),
                "json" => {
                    Exporter::new(&report).export_balance_sheet_json(stdout.lock()).await?;
                }
                _ => anyhow::bail!("Invalid format '{}'. Valid formats: table, json", format),
            }
        }

        ReportCommands::IncomeStatement { date, format } => {
            let date = parse_date_or_today(date.as_deref())?;
            let report = bookkeeping.create_report(document, date).await?;
            match format.as_str() {
                "table" => print_income_statement(&IncomeStatement::from_report(&report)),
                "json" => {
                    Exporter::new(&report)
                        .export_income_statement_json(stdout.lock())
                        .await?;
                }
                _ => anyhow::bail!("Invalid format '{}'. Valid formats: table, json", format),
            }
        }

        ReportCommands::Ledger {
            date,
            account,
            format,
        } => {
            let date = parse_date_or_today(date.as_deref())?;
            let report = bookkeeping.create_report(document, date).await?;
            if let Some(account_id) = &account {
                services.configuration.get_account(document, account_id).await?;
            }
            match format.as_str() {
                "table" => print_ledger(&report, account.as_deref()),
                "csv" => {
                    Exporter::new(&report).export_report_csv(stdout.lock()).await?;
                }
                "json" => {
                    Exporter::new(&report).export_full_json(stdout.lock()).await?;
                }
                _ => anyhow::bail!("Invalid format '{}'. Valid formats: table, csv, json", format),
            }
        }
    }
    Ok(())
}

fn print_balance_totals(balance_sheet: Option<&BalanceSheet>) {
    match balance_sheet {
        Some(sheet) => println!(
            "Assets {} | Liabilities {} | Result {}",
            sheet.total_assets, sheet.total_liabilities, sheet.result_of_operations
        ),
        None => println!("Assets - | Liabilities - | Result -"),
    }
}

fn print_balance_sheet(sheet: &BalanceSheet) {
    println!("Balance sheet as of {} ({})", sheet.as_of, sheet.currency);
    println!();
    println!("{:<40} {:>14}", "ASSETS", "");
    for line in &sheet.assets {
        println!("  {:<38} {:>14}", line.account.label(), line.balance);
    }
    println!("{:<40} {:>14}", "Total assets", sheet.total_assets);
    println!();
    println!("{:<40} {:>14}", "LIABILITIES AND EQUITY", "");
    for line in &sheet.liabilities {
        println!("  {:<38} {:>14}", line.account.label(), line.balance);
    }
    println!("  {:<38} {:>14}", "Result of operations", sheet.result_of_operations);
    println!(
        "{:<40} {:>14}",
        "Total liabilities and equity",
        sheet.total_liabilities + sheet.result_of_operations
    );
}

fn print_income_statement(statement: &IncomeStatement) {
    println!(
        "Income statement {} - {} ({})",
        statement.from_date, statement.to_date, statement.currency
    );
    println!();
    println!("REVENUES");
    for line in &statement.revenues {
        println!("  {:<38} {:>14}", line.account.label(), line.balance);
    }
    println!("{:<40} {:>14}", "Total revenues", statement.total_revenues);
    println!();
    println!("EXPENSES");
    for line in &statement.expenses {
        println!("  {:<38} {:>14}", line.account.label(), line.balance);
    }
    println!("{:<40} {:>14}", "Total expenses", statement.total_expenses);
    println!();
    println!("{:<40} {:>14}", "Result of operations", statement.result_of_operations);
}

fn print_ledger(report: &Report, account_id: Option<&str>) {
    for account in report.accounts() {
        if account_id.is_some_and(|id| id != account.id) {
            continue;
        }
        println!("{}", account.label());
        println!(
            "  {:<12} {:<10} {:<30} {:>12} {:>12}",
            "DATE", "ENTRY", "DESCRIPTION", "DEBIT", "CREDIT"
        );
        for line in report.ledger_lines(&account.id) {
            println!(
                "  {:<12} {:<10} {:<30} {:>12} {:>12}",
                line.date,
                line.journal_entry_id,
                truncate(&line.description, 30),
                line.debit_amount().map(|a| a.to_string()).unwrap_or_default(),
                line.credit_amount().map(|a| a.to_string()).unwrap_or_default()
            );
        }
        println!(
            "  {:<55} {:>12} {:>12}",
            "Total",
            report.debit_total(&account.id),
            report.credit_total(&account.id)
        );
        println!("  {:<55} {:>12}", "Balance", report.balance(account));
        println!();
    }
}

/// Parse `ACCOUNT=AMOUNT[@INVOICE]`.
fn parse_detail(arg: &str) -> Result<(String, Amount, Option<String>)> {
    let (account_id, rest) = arg
        .split_once('=')
        .with_context(|| format!("Invalid line '{}'. Use ACCOUNT=AMOUNT[@INVOICE]", arg))?;
    let (amount, invoice_id) = match rest.split_once('@') {
        Some((amount, invoice_id)) => (amount, Some(invoice_id.trim().to_string())),
        None => (rest, None),
    };
    let amount: Amount = amount
        .trim()
        .parse()
        .with_context(|| format!("Invalid amount in '{}'. Use '50.00' or '50'", arg))?;
    Ok((account_id.trim().to_string(), amount, invoice_id))
}

/// Parse `DESCRIPTION=AMOUNT@ACCOUNT`; anything without `=` is a text line.
fn parse_template_line(arg: &str) -> Result<InvoiceTemplateLine> {
    let Some((description, rest)) = arg.rsplit_once('=') else {
        return Ok(InvoiceTemplateLine::text(arg));
    };
    let (amount, account_id) = rest
        .split_once('@')
        .with_context(|| format!("Invalid invoice line '{}'. Use DESCRIPTION=AMOUNT@ACCOUNT", arg))?;
    let amount: Amount = amount
        .trim()
        .parse()
        .with_context(|| format!("Invalid amount in '{}'. Use '50.00' or '50'", arg))?;
    Ok(InvoiceTemplateLine::new(description.trim(), amount, account_id.trim()))
}

fn with_invoice(detail: JournalEntryDetail, invoice_id: Option<String>) -> JournalEntryDetail {
    match invoice_id {
        Some(id) => detail.with_invoice(id),
        None => detail,
    }
}

/// Parse date string in ISO 8601 format (YYYY-MM-DD)
fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date format '{}'. Use YYYY-MM-DD", s))
}

fn parse_date_or_today(s: Option<&str>) -> Result<NaiveDate> {
    match s {
        Some(s) => parse_date(s),
        None => Ok(Local::now().date_naive()),
    }
}

fn default_date_label() -> String {
    Local::now().format("%Y%m%d").to_string()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
