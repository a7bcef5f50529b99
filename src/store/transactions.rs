use crate::errors::{Error, Result};
use crate::models::{Transaction, TxKind};
use crate::sheets::Table;
use crate::store::{now_timestamp, SheetStore};
use chrono::NaiveDate;
use tracing::{info, instrument};

/// Records a new ledger entry and returns its allocated id.
///
/// Normalization matches what the table stores: the description is
/// trimmed, a blank category defaults to "Other". Validation happens
/// before any remote call.
///
/// # Errors
///
/// `Error::Validation` for an empty description or a negative amount;
/// otherwise whatever the remote layer surfaces.
#[instrument(skip(store, description))]
pub async fn add_transaction(
    store: &SheetStore,
    date: NaiveDate,
    description: &str,
    kind: TxKind,
    amount: f64,
    category: &str,
    paid: bool,
) -> Result<i64> {
    let description = description.trim();
    if description.is_empty() {
        return Err(Error::Validation("description must not be empty".into()));
    }
    if amount < 0.0 {
        return Err(Error::Validation("amount must not be negative".into()));
    }

    let existing = store.tables.read(Table::Transactions).await?;
    let id = existing.next_id();
    let category = category.trim();
    let tx = Transaction {
        id,
        date: date.to_string(),
        description: description.to_string(),
        kind,
        amount,
        category: if category.is_empty() {
            "Other".to_string()
        } else {
            category.to_string()
        },
        paid,
        created_at: now_timestamp(),
    };

    store.tables.append(Table::Transactions, tx.to_row()).await?;
    info!("Added transaction {} ({}, {})", id, tx.kind.as_str(), amount);
    Ok(id)
}

/// Fetches transactions, optionally bounded by an inclusive date range,
/// ordered descending by (date, id).
#[instrument(skip(store))]
pub async fn fetch_transactions(
    store: &SheetStore,
    date_start: Option<NaiveDate>,
    date_end: Option<NaiveDate>,
) -> Result<Vec<Transaction>> {
    let rows = store.tables.read(Table::Transactions).await?;
    let start = date_start.map(|d| d.to_string());
    let end = date_end.map(|d| d.to_string());

    let mut txs: Vec<Transaction> = rows
        .iter()
        .map(|row| Transaction::from_row(row))
        .filter(|tx| start.as_deref().is_none_or(|s| tx.date.as_str() >= s))
        .filter(|tx| end.as_deref().is_none_or(|e| tx.date.as_str() <= e))
        .collect();
    txs.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    Ok(txs)
}

/// Deletes a transaction and any savings link that references it.
///
/// The dependent link rows go first, then the owning transaction row, so a
/// crash in between leaves no link pointing at a missing transaction. The
/// reverse (an orphaned transaction) is repaired by re-running the delete.
#[instrument(skip(store))]
pub async fn delete_transaction(store: &SheetStore, id: i64) -> Result<()> {
    let mut links = store.tables.read(Table::SavingsTxLinks).await?;
    let before = links.len();
    links
        .rows
        .retain(|row| row.get(1).and_then(|c| c.trim().parse::<i64>().ok()) != Some(id));
    if links.len() != before {
        store.tables.rewrite(Table::SavingsTxLinks, &links).await?;
        info!("Removed savings link referencing transaction {}", id);
    }

    let mut txs = store.tables.read(Table::Transactions).await?;
    if txs.remove_by_id(id) {
        store.tables.rewrite(Table::Transactions, &txs).await?;
        info!("Deleted transaction {}", id);
    }
    Ok(())
}

/// Overwrites the mutable fields of every existing transaction whose id
/// appears in `updates`; ids with no matching row are silently ignored
/// (never inserted). The whole table is rewritten once.
///
/// `created_at` is not mutable and survives from the stored row.
#[instrument(skip(store, updates), fields(batch = updates.len()))]
pub async fn update_transactions_bulk(store: &SheetStore, updates: &[Transaction]) -> Result<()> {
    if updates.is_empty() {
        return Ok(());
    }

    let mut rows = store.tables.read(Table::Transactions).await?;
    let mut applied = 0usize;
    for row in &mut rows.rows {
        let Some(id) = row.first().and_then(|c| c.trim().parse::<i64>().ok()) else {
            continue;
        };
        let Some(update) = updates.iter().find(|u| u.id == id) else {
            continue;
        };
        let existing = Transaction::from_row(row);
        let category = update.category.trim();
        let merged = Transaction {
            id,
            date: update.date.clone(),
            description: update.description.trim().to_string(),
            kind: update.kind,
            amount: update.amount,
            category: if category.is_empty() {
                "Other".to_string()
            } else {
                category.to_string()
            },
            paid: update.paid,
            created_at: existing.created_at,
        };
        *row = merged.to_row();
        applied += 1;
    }

    store.tables.rewrite(Table::Transactions, &rows).await?;
    info!("Bulk-updated {} of {} submitted transactions", applied, updates.len());
    Ok(())
}
