use crate::errors::{Error, Result};
use crate::models::CashflowAdjustment;
use crate::sheets::Table;
use crate::store::{now_timestamp, SheetStore};
use chrono::NaiveDate;
use tracing::{info, instrument};

/// Records a manual cash-flow adjustment. The value is always positive and
/// downstream consumers treat it as a simulated outflow.
#[instrument(skip(store, description))]
pub async fn add_cashflow_adjustment(
    store: &SheetStore,
    date: NaiveDate,
    value: f64,
    description: Option<&str>,
) -> Result<i64> {
    if value <= 0.0 {
        return Err(Error::Validation(
            "adjustment value must be greater than zero".into(),
        ));
    }

    let existing = store.tables.read(Table::Adjustments).await?;
    let id = existing.next_id();
    let adjustment = CashflowAdjustment {
        id,
        date: date.to_string(),
        value,
        description: description.unwrap_or("").trim().to_string(),
        created_at: now_timestamp(),
    };
    store
        .tables
        .append(Table::Adjustments, adjustment.to_row())
        .await?;
    info!("Added cash-flow adjustment {} of {}", id, value);
    Ok(id)
}

/// Adjustments inside the inclusive date range, ascending by (date, id).
#[instrument(skip(store))]
pub async fn fetch_cashflow_adjustments(
    store: &SheetStore,
    date_start: NaiveDate,
    date_end: NaiveDate,
) -> Result<Vec<CashflowAdjustment>> {
    let rows = store.tables.read(Table::Adjustments).await?;
    let start = date_start.to_string();
    let end = date_end.to_string();

    let mut adjustments: Vec<CashflowAdjustment> = rows
        .iter()
        .map(|row| CashflowAdjustment::from_row(row))
        .filter(|adj| adj.date.as_str() >= start.as_str() && adj.date.as_str() <= end.as_str())
        .collect();
    adjustments.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
    Ok(adjustments)
}

#[instrument(skip(store))]
pub async fn delete_cashflow_adjustment(store: &SheetStore, id: i64) -> Result<()> {
    let mut rows = store.tables.read(Table::Adjustments).await?;
    if rows.remove_by_id(id) {
        store.tables.rewrite(Table::Adjustments, &rows).await?;
        info!("Deleted cash-flow adjustment {}", id);
    }
    Ok(())
}
