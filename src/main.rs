use sheetledger::config::StoreConfig;
use sheetledger::errors::Result;
use sheetledger::store::{init_store, ping_store, SheetStore};

use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; non-fatal, env vars can be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load credentials and tuning from the environment
    let config = StoreConfig::from_env()
        .inspect_err(|e| error!("Failed to load store configuration: {}", e))?;

    // 4. Connect and make sure every table exists with its header
    let store = SheetStore::connect(&config)?;
    init_store(&store)
        .await
        .inspect(|()| info!("Store initialized; all tables present."))
        .inspect_err(|e| error!("Failed to initialize store: {}", e))?;

    // 5. Report connectivity the way a front end would
    let (ok, message) = ping_store(&store).await;
    if ok {
        info!("{}", message);
    } else {
        error!("Ping failed: {}", message);
    }

    Ok(())
}
