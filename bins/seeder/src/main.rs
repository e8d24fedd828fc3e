//! Database seeder for Tally development and testing.
//!
//! Seeds a demo business with a chart of accounts, an active financial year
//! for the current calendar year and a set of sample postings, then logs the
//! resulting reports. Postings go through the posting engine, so the seeded
//! books obey every ledger rule.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use anyhow::Context;
use chrono::{Datelike, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tally_core::account::{Account, AccountCategory, SystemAccountRole};
use tally_core::aging::{AgingFilter, DocumentKind, OutstandingDocument, aging_report};
use tally_core::fiscal::FinancialYear;
use tally_core::ledger::templates::{
    opening_balance, payment_made, payment_received, sales_invoice, vendor_bill,
};
use tally_core::ledger::{
    AccountRegistry, CashFlowCategory, DocumentLine, JournalItemInput, NewJournalEntry,
    PostingEngine,
};
use tally_core::reports::ReportService;
use tally_db::migration::{Migrator, MigratorTrait};
use tally_db::{MasterDataRepository, PgLedgerStore};
use tally_shared::types::{
    AccountId, BusinessId, DocumentId, FinancialYearId, JournalEntryId, PartyId,
};
use tally_shared::{AppConfig, LedgerContext, LogFormat, LoggingConfig};

/// Demo business ID (stable across runs).
const DEMO_BUSINESS_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Demo actor ID.
const DEMO_USER_ID: &str = "00000000-0000-0000-0000-000000000002";

/// Chart of accounts: code, name, category, cash flag, system role.
const CHART: &[(&str, &str, AccountCategory, bool, Option<SystemAccountRole>)] = &[
    ("1000", "Cash on Hand", AccountCategory::Asset, true, None),
    ("1010", "Operating Bank Account", AccountCategory::Asset, true, None),
    ("1200", "Accounts Receivable", AccountCategory::Asset, false, Some(SystemAccountRole::Receivable)),
    ("1300", "Input Tax", AccountCategory::Asset, false, Some(SystemAccountRole::TaxReceivable)),
    ("1500", "Equipment", AccountCategory::Asset, false, None),
    ("2000", "Accounts Payable", AccountCategory::Liability, false, Some(SystemAccountRole::Payable)),
    ("2100", "Output Tax", AccountCategory::Liability, false, Some(SystemAccountRole::TaxPayable)),
    ("2500", "Bank Loan", AccountCategory::Liability, false, None),
    ("3000", "Owner Capital", AccountCategory::Equity, false, None),
    ("3900", "Opening Balance Equity", AccountCategory::Equity, false, Some(SystemAccountRole::OpeningBalanceEquity)),
    ("4000", "Sales", AccountCategory::Revenue, false, None),
    ("5000", "Rent", AccountCategory::Expense, false, None),
    ("5100", "Office Supplies", AccountCategory::Expense, false, None),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    let db = tally_db::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    Migrator::up(&db, None).await.context("Failed to run migrations")?;

    let ctx = LedgerContext::new(DEMO_BUSINESS_ID.parse()?, DEMO_USER_ID.parse()?);
    let store = Arc::new(PgLedgerStore::new(db.clone()));
    let engine = PostingEngine::new(Arc::clone(&store))
        .with_reference_prefix(config.ledger.reference_prefix.clone());
    let reports =
        ReportService::new(Arc::clone(&store)).with_cash_flow_mode(config.ledger.cash_flow_mode);

    let today = Utc::now().date_naive();
    let year = if store.accounts(&ctx).await?.is_empty() {
        let master = MasterDataRepository::new(db);
        let year = seed_master_data(&master, ctx.business_id, today).await?;
        seed_postings(&engine, &ctx, &year).await?;
        info!("Seeding complete");
        year
    } else {
        info!("Demo business already seeded, skipping");
        engine.active_financial_year(&ctx).await?
    };

    log_reports(&reports, &ctx, &year, today).await?;
    Ok(())
}

fn init_tracing(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));
    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

/// Creates the chart of accounts and an active year for the calendar year of `today`.
async fn seed_master_data(
    master: &MasterDataRepository,
    business_id: BusinessId,
    today: NaiveDate,
) -> anyhow::Result<FinancialYear> {
    let start = NaiveDate::from_ymd_opt(today.year(), 1, 1).context("invalid year start")?;
    let end = NaiveDate::from_ymd_opt(today.year(), 12, 31).context("invalid year end")?;
    let year = master
        .create_financial_year(&FinancialYear {
            id: FinancialYearId::new(),
            business_id,
            name: format!("FY{}", today.year()),
            start_date: start,
            end_date: end,
            is_active: true,
        })
        .await?;
    info!(name = %year.name, "Seeded financial year");

    for (code, name, category, is_cash, system_role) in CHART {
        master
            .create_account(&Account {
                id: AccountId::new(),
                business_id,
                code: (*code).to_string(),
                name: (*name).to_string(),
                category: *category,
                is_active: true,
                is_cash: *is_cash,
                system_role: *system_role,
            })
            .await?;
    }
    info!(accounts = CHART.len(), "Seeded chart of accounts");
    Ok(year)
}

/// Looks up a seeded account by code.
async fn account(
    store: &PgLedgerStore,
    ctx: &LedgerContext,
    code: &str,
) -> anyhow::Result<Account> {
    store
        .accounts(ctx)
        .await?
        .into_iter()
        .find(|account| account.code == code)
        .with_context(|| format!("account {code} not seeded"))
}

/// Posts one balanced entry with a generated reference number.
async fn post(
    engine: &PostingEngine<PgLedgerStore>,
    ctx: &LedgerContext,
    year: &FinancialYear,
    day: u64,
    narration: &str,
    items: Vec<JournalItemInput>,
    tag: Option<CashFlowCategory>,
) -> anyhow::Result<JournalEntryId> {
    let reference = engine.next_reference_number(ctx).await?;
    let entry_date = year
        .start_date
        .checked_add_days(Days::new(day))
        .context("entry date out of range")?;
    let mut input = NewJournalEntry::new(reference, year.id, entry_date, narration, items);
    if let Some(tag) = tag {
        input = input.with_cash_flow_category(tag);
    }
    Ok(engine.submit_balanced_entry(ctx, input).await?)
}

async fn seed_postings(
    engine: &PostingEngine<PgLedgerStore>,
    ctx: &LedgerContext,
    year: &FinancialYear,
) -> anyhow::Result<()> {
    let store = engine.store().as_ref();
    let cash = account(store, ctx, "1000").await?;
    let bank = account(store, ctx, "1010").await?;
    let equipment = account(store, ctx, "1500").await?;
    let loan = account(store, ctx, "2500").await?;
    let capital = account(store, ctx, "3000").await?;
    let sales = account(store, ctx, "4000").await?;
    let rent = account(store, ctx, "5000").await?;
    let supplies = account(store, ctx, "5100").await?;

    let opening = opening_balance(store, ctx, &cash, dec!(2500)).await?;
    post(engine, ctx, year, 0, "Opening cash balance", opening, None).await?;

    post(
        engine,
        ctx,
        year,
        1,
        "Owner capital injection",
        vec![
            JournalItemInput::debit(bank.id, dec!(20000)),
            JournalItemInput::credit(capital.id, dec!(20000)),
        ],
        Some(CashFlowCategory::Financing),
    )
    .await?;

    let invoice = sales_invoice(store, ctx, &[DocumentLine::new(sales.id, dec!(4000))], dec!(400))
        .await?;
    post(engine, ctx, year, 14, "Invoice INV-0001 to Northwind", invoice, None).await?;

    let receipt = payment_received(store, ctx, bank.id, dec!(1500)).await?;
    post(engine, ctx, year, 40, "Payment received for INV-0001", receipt, None).await?;

    let bill = vendor_bill(store, ctx, &[DocumentLine::new(supplies.id, dec!(600))], dec!(60))
        .await?;
    post(engine, ctx, year, 20, "Bill BILL-0001 from Contoso Supplies", bill, None).await?;

    let payment = payment_made(store, ctx, bank.id, dec!(660)).await?;
    post(engine, ctx, year, 50, "Payment of BILL-0001", payment, None).await?;

    post(
        engine,
        ctx,
        year,
        31,
        "Office rent",
        vec![
            JournalItemInput::debit(rent.id, dec!(1200)),
            JournalItemInput::credit(bank.id, dec!(1200)),
        ],
        None,
    )
    .await?;

    post(
        engine,
        ctx,
        year,
        45,
        "Equipment purchase",
        vec![
            JournalItemInput::debit(equipment.id, dec!(5000)),
            JournalItemInput::credit(bank.id, dec!(5000)),
        ],
        None,
    )
    .await?;

    post(
        engine,
        ctx,
        year,
        60,
        "Bank loan drawdown",
        vec![
            JournalItemInput::debit(bank.id, dec!(10000)),
            JournalItemInput::credit(loan.id, dec!(10000)),
        ],
        None,
    )
    .await?;

    let duplicate = post(
        engine,
        ctx,
        year,
        32,
        "Office rent (duplicate)",
        vec![
            JournalItemInput::debit(rent.id, dec!(1200)),
            JournalItemInput::credit(bank.id, dec!(1200)),
        ],
        None,
    )
    .await?;
    engine.cancel(ctx, duplicate).await?;

    info!("Seeded sample postings");
    Ok(())
}

/// Open documents matching the seeded invoice and bill.
fn sample_documents(year: &FinancialYear) -> anyhow::Result<Vec<OutstandingDocument>> {
    let day = |n: u64| {
        year.start_date
            .checked_add_days(Days::new(n))
            .context("document date out of range")
    };
    Ok(vec![
        OutstandingDocument {
            id: DocumentId::new(),
            kind: DocumentKind::Receivable,
            party_id: PartyId::new(),
            party_name: "Northwind".to_string(),
            reference: "INV-0001".to_string(),
            issue_date: day(14)?,
            due_date: Some(day(44)?),
            total: dec!(4400),
            settled: dec!(1500),
        },
        OutstandingDocument {
            id: DocumentId::new(),
            kind: DocumentKind::Payable,
            party_id: PartyId::new(),
            party_name: "Contoso Supplies".to_string(),
            reference: "BILL-0001".to_string(),
            issue_date: day(20)?,
            due_date: Some(day(50)?),
            total: dec!(660),
            settled: dec!(660),
        },
    ])
}

async fn log_reports(
    reports: &ReportService<PgLedgerStore>,
    ctx: &LedgerContext,
    year: &FinancialYear,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let end = today.clamp(year.start_date, year.end_date);

    let trial = reports
        .trial_balance(ctx, year.id, year.start_date, end)
        .await?;
    info!(
        total_debit = %trial.totals.total_debit,
        total_credit = %trial.totals.total_credit,
        is_balanced = trial.totals.is_balanced,
        "Trial balance"
    );
    debug!(report = %serde_json::to_string(&trial)?, "Trial balance detail");

    let sheet = reports.balance_sheet(ctx, end).await?;
    info!(
        total_assets = %sheet.total_assets,
        total_liabilities = %sheet.total_liabilities,
        total_equity = %sheet.total_equity,
        is_balanced = sheet.is_balanced,
        "Balance sheet"
    );

    let income = reports
        .income_statement(ctx, year.id, year.start_date, end)
        .await?;
    info!(
        revenue = %income.revenue.total,
        expenses = %income.expenses.total,
        net_income = %income.net_income,
        "Income statement"
    );

    let cash_flow = reports.cash_flow(ctx, year.id, year.start_date, end).await?;
    info!(
        opening = %cash_flow.opening_cash,
        operating = %cash_flow.operating.total,
        investing = %cash_flow.investing.total,
        financing = %cash_flow.financing.total,
        closing = %cash_flow.closing_cash,
        reconciles = cash_flow.reconciles,
        "Cash flow statement"
    );

    let ledger = reports
        .general_ledger(ctx, year.id, year.start_date, end, None)
        .await?;
    for account in &ledger.accounts {
        info!(
            code = %account.code,
            name = %account.name,
            opening = %account.opening_balance,
            closing = %account.closing_balance,
            lines = account.lines.len(),
            "General ledger account"
        );
    }

    let documents = sample_documents(year)?;
    for filter in [AgingFilter::receivables(), AgingFilter::payables()] {
        let aging = aging_report(&documents, today, &filter);
        info!(
            kind = ?filter.kind,
            total_outstanding = %aging.total_outstanding,
            current = %aging.buckets.current,
            over_90 = %aging.buckets.over_90,
            parties = aging.parties.len(),
            "Aging report"
        );
    }

    let outstanding: Decimal = documents.iter().map(OutstandingDocument::remaining).sum();
    debug!(%outstanding, "Sample documents outstanding");
    Ok(())
}
