use crate::errors::{Error, Result};
use crate::models::{Debt, TxKind};
use crate::sheets::Table;
use crate::store::{now_timestamp, transactions, SheetStore};
use chrono::NaiveDate;
use tracing::{info, instrument};

/// Debts with no due date sort after every real date.
const FAR_FUTURE: &str = "9999-12-31";

/// Registers a debt to settle at the first opportunity.
#[instrument(skip(store, description))]
pub async fn add_debt(
    store: &SheetStore,
    creditor: &str,
    description: &str,
    amount: f64,
    due_date: Option<NaiveDate>,
    priority: i64,
) -> Result<i64> {
    let creditor = creditor.trim();
    if creditor.is_empty() {
        return Err(Error::Validation("creditor must not be empty".into()));
    }
    if amount <= 0.0 {
        return Err(Error::Validation(
            "debt amount must be greater than zero".into(),
        ));
    }
    if !(1..=5).contains(&priority) {
        return Err(Error::Validation("priority must be within 1..=5".into()));
    }

    let existing = store.tables.read(Table::Debts).await?;
    let id = existing.next_id();
    let debt = Debt {
        id,
        creditor: creditor.to_string(),
        description: description.trim().to_string(),
        amount,
        due_date: due_date.map(|d| d.to_string()).unwrap_or_default(),
        priority,
        settled: false,
        created_at: now_timestamp(),
    };
    store.tables.append(Table::Debts, debt.to_row()).await?;
    info!("Added debt {} to '{}' for {}", id, creditor, amount);
    Ok(id)
}

/// Open debts (or all of them), ordered by priority ascending, then due
/// date ascending with missing dates sorting last, then id descending.
#[instrument(skip(store))]
pub async fn fetch_debts(store: &SheetStore, include_settled: bool) -> Result<Vec<Debt>> {
    let rows = store.tables.read(Table::Debts).await?;
    let mut debts: Vec<Debt> = rows
        .iter()
        .map(|row| Debt::from_row(row))
        .filter(|debt| include_settled || !debt.settled)
        .collect();
    debts.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| due_or_far_future(a).cmp(due_or_far_future(b)))
            .then(b.id.cmp(&a.id))
    });
    Ok(debts)
}

fn due_or_far_future(debt: &Debt) -> &str {
    if debt.due_date.trim().is_empty() {
        FAR_FUTURE
    } else {
        debt.due_date.as_str()
    }
}

/// Flips the settled flag on a debt. Unknown ids are a no-op.
#[instrument(skip(store))]
pub async fn mark_debt_paid(store: &SheetStore, id: i64, paid: bool) -> Result<()> {
    let mut rows = store.tables.read(Table::Debts).await?;
    let mut changed = false;
    for row in &mut rows.rows {
        if row.first().and_then(|c| c.trim().parse::<i64>().ok()) == Some(id) {
            let mut debt = Debt::from_row(row);
            debt.settled = paid;
            *row = debt.to_row();
            changed = true;
        }
    }
    if changed {
        store.tables.rewrite(Table::Debts, &rows).await?;
        info!("Marked debt {} as settled={}", id, paid);
    }
    Ok(())
}

#[instrument(skip(store))]
pub async fn delete_debt(store: &SheetStore, id: i64) -> Result<()> {
    let mut rows = store.tables.read(Table::Debts).await?;
    if rows.remove_by_id(id) {
        store.tables.rewrite(Table::Debts, &rows).await?;
        info!("Deleted debt {}", id);
    }
    Ok(())
}

/// Settles a debt: records a paid outflow transaction for its amount under
/// the "Debts" category and flips the settled flag. Returns the created
/// transaction id.
#[instrument(skip(store))]
pub async fn settle_debt(store: &SheetStore, id: i64, date: NaiveDate) -> Result<i64> {
    let rows = store.tables.read(Table::Debts).await?;
    let debt = rows
        .find_by_id(id)
        .map(|row| Debt::from_row(row))
        .ok_or_else(|| Error::Validation(format!("debt {id} not found")))?;

    let description = format!("Settle debt - {} ({})", debt.creditor, debt.description);
    let tx_id = transactions::add_transaction(
        store,
        date,
        &description,
        TxKind::Outflow,
        debt.amount,
        "Debts",
        true,
    )
    .await?;
    mark_debt_paid(store, id, true).await?;
    info!("Settled debt {} with transaction {}", id, tx_id);
    Ok(tx_id)
}
