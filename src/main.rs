use clap::{Parser, Subcommand};
use fundsub::application::engine::WorkflowEngine;
use fundsub::bootstrap;
use fundsub::domain::account::NotificationPreference;
use fundsub::domain::ports::{AccountStoreBox, CatalogStoreBox};
use fundsub::error::WorkflowError;
use fundsub::infrastructure::in_memory::{
    InMemoryAccountStore, InMemoryCatalogStore, InMemorySubscriptionLedger,
    InMemoryTransactionLedger,
};
use fundsub::infrastructure::notifier::LogNotifier;
use fundsub::interfaces::csv::{CatalogReader, LedgerWriter};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Subscribe an account to a fund, debiting the fund's minimum amount.
    Subscribe {
        account_id: String,
        fund_id: String,
    },
    /// Cancel a live subscription (no refund).
    Unsubscribe {
        account_id: String,
        fund_id: String,
    },
    /// Set the account's notification preference.
    SetPreference {
        account_id: String,
        #[arg(value_enum)]
        preference: PreferenceArg,
    },
    /// List an account's live subscriptions, newest first.
    Subscriptions { account_id: String },
    /// List an account's transaction history, newest first.
    Ledger {
        account_id: String,
        /// Emit CSV instead of plain text.
        #[arg(long)]
        csv: bool,
    },
    /// List the fund catalog.
    Funds,
    /// Provision the fund catalog and the demo account.
    Seed {
        /// CSV seed file (fund_id,name,category,minimum_subscription).
        /// Defaults to the built-in catalog.
        #[arg(long)]
        funds: Option<PathBuf>,
    },
}

/// Notification channels accepted on the command line. Anything else is
/// rejected by clap before it reaches the engine.
#[derive(Clone, Copy, clap::ValueEnum)]
enum PreferenceArg {
    Email,
    Sms,
}

impl From<PreferenceArg> for NotificationPreference {
    fn from(arg: PreferenceArg) -> Self {
        match arg {
            PreferenceArg::Email => Self::Email,
            PreferenceArg::Sms => Self::Sms,
        }
    }
}

/// The engine plus direct store handles for provisioning and catalog
/// listing, which bypass the workflow.
struct Services {
    engine: WorkflowEngine,
    accounts: AccountStoreBox,
    catalog: CatalogStoreBox,
}

fn wire_in_memory() -> Services {
    let accounts = InMemoryAccountStore::new();
    let catalog = InMemoryCatalogStore::new();
    let engine = WorkflowEngine::new(
        Box::new(accounts.clone()),
        Box::new(catalog.clone()),
        Box::new(InMemorySubscriptionLedger::new()),
        Box::new(InMemoryTransactionLedger::new()),
        Box::new(LogNotifier),
    );
    Services {
        engine,
        accounts: Box::new(accounts),
        catalog: Box::new(catalog),
    }
}

#[cfg(feature = "storage-rocksdb")]
fn wire_rocksdb(path: PathBuf) -> Result<Services> {
    use fundsub::infrastructure::rocksdb::RocksDbStore;

    let store = RocksDbStore::open(path).into_diagnostic()?;
    let engine = WorkflowEngine::new(
        Box::new(store.clone()),
        Box::new(store.clone()),
        Box::new(store.clone()),
        Box::new(store.clone()),
        Box::new(LogNotifier),
    );
    Ok(Services {
        engine,
        accounts: Box::new(store.clone()),
        catalog: Box::new(store),
    })
}

fn fail(err: &WorkflowError) -> ! {
    let envelope = serde_json::json!({
        "code": err.code(),
        "status": err.status(),
        "message": err.to_string(),
        "details": err.details(),
    });
    eprintln!("{envelope}");
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let services = match cli.db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => wire_rocksdb(path)?,
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            return Err(miette::miette!(
                "--db-path requires the storage-rocksdb feature; rebuild with --features storage-rocksdb"
            ));
        }
        None => {
            // The in-memory backend starts empty on every run, so it is
            // seeded with the stock data up front.
            let services = wire_in_memory();
            bootstrap::provision(
                services.accounts.as_ref(),
                services.catalog.as_ref(),
                bootstrap::default_catalog(),
            )
            .await
            .into_diagnostic()?;
            services
        }
    };

    match cli.command {
        Command::Subscribe {
            account_id,
            fund_id,
        } => match services.engine.subscribe(&account_id, &fund_id).await {
            Ok(receipt) => println!("{}", receipt.message),
            Err(err) => fail(&err),
        },
        Command::Unsubscribe {
            account_id,
            fund_id,
        } => match services.engine.unsubscribe(&account_id, &fund_id).await {
            Ok(receipt) => println!("{}", receipt.message),
            Err(err) => fail(&err),
        },
        Command::SetPreference {
            account_id,
            preference,
        } => {
            match services
                .engine
                .update_preference(&account_id, preference.into())
                .await
            {
                Ok(account) => println!(
                    "Notification preference for {} set to {}",
                    account.account_id, account.notification_preference
                ),
                Err(err) => fail(&err),
            }
        }
        Command::Subscriptions { account_id } => {
            match services.engine.subscriptions(&account_id).await {
                Ok(subscriptions) => {
                    for s in &subscriptions {
                        println!("{}\t{}", s.fund_id, s.subscribed_at.to_rfc3339());
                    }
                    println!("{} subscriptions", subscriptions.len());
                }
                Err(err) => fail(&err),
            }
        }
        Command::Ledger { account_id, csv } => match services.engine.ledger(&account_id).await {
            Ok(entries) => {
                if csv {
                    let stdout = io::stdout();
                    LedgerWriter::new(stdout.lock())
                        .write_entries(&entries)
                        .into_diagnostic()?;
                } else {
                    for e in &entries {
                        println!(
                            "{}\t{}\t{}\t{}\t{}",
                            e.timestamp.to_rfc3339(),
                            e.kind,
                            e.fund_id,
                            e.amount,
                            e.transaction_id
                        );
                    }
                    println!("{} entries", entries.len());
                }
            }
            Err(err) => fail(&err),
        },
        Command::Funds => {
            let funds = services.catalog.list().await.into_diagnostic()?;
            for f in &funds {
                println!("{}\t{}\t{}", f.fund_id, f.category, f.minimum_subscription);
            }
        }
        Command::Seed { funds } => {
            let definitions = match funds {
                Some(path) => {
                    let file = File::open(path).into_diagnostic()?;
                    CatalogReader::new(file)
                        .funds()
                        .collect::<std::result::Result<Vec<_>, _>>()
                        .into_diagnostic()?
                }
                None => bootstrap::default_catalog(),
            };
            let count = definitions.len();
            bootstrap::provision(
                services.accounts.as_ref(),
                services.catalog.as_ref(),
                definitions,
            )
            .await
            .into_diagnostic()?;
            println!("Provisioned {count} funds and the demo account");
        }
    }

    Ok(())
}
