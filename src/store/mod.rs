//! The record store: typed CRUD families over the table reader/writer.
//!
//! Every operation takes an explicit [`SheetStore`] context. The context is
//! created once at startup and owns the remote client, the retry policy,
//! and the read cache; there is no module-level global state.

pub mod adjustments;
pub mod debts;
pub mod notes;
pub mod savings;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod transactions;

pub use adjustments::{add_cashflow_adjustment, delete_cashflow_adjustment, fetch_cashflow_adjustments};
pub use debts::{add_debt, delete_debt, fetch_debts, mark_debt_paid, settle_debt};
pub use notes::{add_note, delete_note, fetch_notes, update_note};
pub use savings::{
    clear_savings_goal, create_challenge_transaction, delete_challenge_transaction,
    fetch_savings_deposits_with_amount, get_savings_goal, min_deposits_for_target,
    reset_savings_marks, set_savings_goal, set_savings_override, toggle_savings_deposit,
};
pub use transactions::{
    add_transaction, delete_transaction, fetch_transactions, update_transactions_bulk,
};

use crate::config::{StoreConfig, TuningConfig};
use crate::errors::Result;
use crate::sheets::{HttpSheets, SheetsApi, Table, TableClient};
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use tracing::{info, instrument};

/// Store context: the single owner of the remote connection, retry policy,
/// and per-table read cache for a session.
pub struct SheetStore {
    pub(crate) tables: TableClient,
}

impl SheetStore {
    /// Builds a store over the production HTTP adapter.
    pub fn connect(config: &StoreConfig) -> Result<Self> {
        let api = Arc::new(HttpSheets::new(config)?);
        Ok(Self::with_api(api, config.tuning.clone()))
    }

    /// Builds a store over any `SheetsApi` implementation. Tests use this
    /// with the in-memory double.
    pub fn with_api(api: Arc<dyn SheetsApi>, tuning: TuningConfig) -> Self {
        Self {
            tables: TableClient::new(api, tuning),
        }
    }
}

/// Timestamp format used for `created_at`/`updated_at` cells.
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Ensures every logical table exists remotely with the correct header and
/// that the savings-goal singleton row exists. Idempotent: running it twice
/// produces no duplicate worksheets and no change to existing data.
#[instrument(skip(store))]
pub async fn init_store(store: &SheetStore) -> Result<()> {
    for table in Table::ALL {
        store.tables.ensure_table(table).await?;
    }

    let goal = store.tables.read(Table::SavingsGoal).await?;
    if goal.is_empty() {
        store
            .tables
            .append(Table::SavingsGoal, empty_goal_row())
            .await?;
        info!("Seeded savings-goal singleton row");
    }
    Ok(())
}

/// Cheap connectivity check; never panics, never retries past the executor's
/// ceiling. Returns `(ok, message)` so a UI can show the failure verbatim.
pub async fn ping_store(store: &SheetStore) -> (bool, String) {
    match store.tables.probe().await {
        Ok(count) => (true, format!("Connected; {count} worksheets visible")),
        Err(e) => (false, e.to_string()),
    }
}

pub(crate) fn empty_goal_row() -> Vec<String> {
    vec!["1".into(), String::new(), String::new(), String::new()]
}
