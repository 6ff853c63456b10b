//! Seeds the accounts and categories Tally expects to exist.
//!
//! Creates the configured cash accounts, the receivables account and the
//! sales category. Running it again changes nothing.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tally_core::Journal;
use tally_core::ledger::{AccountKind, TransactionKind};
use tally_db::PgStore;
use tally_shared::AppConfig;
use tally_shared::config::LoggingConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_tracing(&config.logging);

    let db = tally_db::connect(&config.database).await?;
    let journal = Journal::new(Arc::new(PgStore::new(db)), config.posting.clone());

    let posting = &config.posting;
    let accounts = posting
        .cash_accounts
        .iter()
        .chain(std::iter::once(&posting.receivable_account));
    for name in accounts {
        let account = journal.find_or_create_account(name, AccountKind::Asset).await?;
        info!(account_id = %account.id, name = %account.name, balance = %account.balance, "Account ready");
    }

    let category = journal
        .find_or_create_category(&posting.sales_category, TransactionKind::Revenue)
        .await?;
    info!(category_id = %category.id, name = %category.name, "Category ready");

    info!("Seeding complete");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
