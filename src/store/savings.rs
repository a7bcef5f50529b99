use crate::errors::{Error, Result};
use crate::models::{SavingsDeposit, SavingsGoal, TxKind};
use crate::parse;
use crate::sheets::{RowSet, Table};
use crate::store::{empty_goal_row, transactions, SheetStore};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{info, instrument};

/// Minimal `N` such that the triangular sum `N*(N+1)/2` reaches `target`.
///
/// Closed form via the quadratic formula, with a correction step because
/// the floating-point root can land one short. Defends against a
/// non-positive target by returning 1; callers validate before getting
/// here.
pub fn min_deposits_for_target(target: f64) -> i64 {
    if target <= 0.0 {
        return 1;
    }
    let mut n = (((1.0 + 8.0 * target).sqrt() - 1.0) / 2.0) as i64;
    if (((n * (n + 1)) / 2) as f64) < target {
        n += 1;
    }
    n.max(1)
}

/// Sets (or replaces) the savings goal and reconciles the deposit table to
/// exactly rows `1..=N`.
///
/// Deposits that already existed and still fall within the new range keep
/// their done flag; rows, overrides, and links beyond the new `N` are
/// discarded.
#[instrument(skip(store))]
pub async fn set_savings_goal(
    store: &SheetStore,
    target: f64,
    due_date: Option<NaiveDate>,
) -> Result<()> {
    if target <= 0.0 {
        return Err(Error::Validation(
            "savings target must be greater than zero".into(),
        ));
    }
    let n = min_deposits_for_target(target);

    let goal_row = vec![
        "1".to_string(),
        target.to_string(),
        due_date.map(|d| d.to_string()).unwrap_or_default(),
        n.to_string(),
    ];
    store
        .tables
        .rewrite(Table::SavingsGoal, &RowSet::new(vec![goal_row]))
        .await?;

    // Rebuild deposits 1..=N, carrying existing done flags forward.
    let deposits = store.tables.read(Table::SavingsDeposits).await?;
    let existing: HashMap<i64, bool> = deposits
        .iter()
        .map(|row| {
            (
                parse::int_or(row.first().map(String::as_str).unwrap_or(""), 0),
                parse::flag_or(row.get(1).map(String::as_str).unwrap_or(""), false),
            )
        })
        .collect();
    let rebuilt: Vec<Vec<String>> = (1..=n)
        .map(|i| {
            vec![
                i.to_string(),
                parse::flag_cell(existing.get(&i).copied().unwrap_or(false)),
            ]
        })
        .collect();
    store
        .tables
        .rewrite(Table::SavingsDeposits, &RowSet::new(rebuilt))
        .await?;

    prune_beyond(store, Table::SavingsOverrides, n).await?;
    prune_beyond(store, Table::SavingsTxLinks, n).await?;

    info!("Savings goal set to {} with {} deposits", target, n);
    Ok(())
}

/// Drops rows whose deposit index exceeds the new count.
async fn prune_beyond(store: &SheetStore, table: Table, n: i64) -> Result<()> {
    let mut rows = store.tables.read(table).await?;
    let before = rows.len();
    rows.rows.retain(|row| {
        row.first()
            .and_then(|c| c.trim().parse::<i64>().ok())
            .is_some_and(|i| i <= n)
    });
    if rows.len() != before {
        store.tables.rewrite(table, &rows).await?;
    }
    Ok(())
}

/// The goal singleton; all `None`s when no goal is configured.
#[instrument(skip(store))]
pub async fn get_savings_goal(store: &SheetStore) -> Result<SavingsGoal> {
    let rows = store.tables.read(Table::SavingsGoal).await?;
    let Some(row) = rows.find_by_id(1) else {
        return Ok(SavingsGoal::default());
    };
    let target = row
        .get(1)
        .and_then(|c| c.trim().parse::<f64>().ok());
    let due_date = row
        .get(2)
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string);
    let deposit_count = row
        .get(3)
        .and_then(|c| c.trim().parse::<i64>().ok());
    Ok(SavingsGoal {
        target_amount: target,
        due_date,
        deposit_count,
    })
}

/// Every deposit slot with its effective amount (override when present,
/// otherwise the triangular default `n`), ascending by n.
#[instrument(skip(store))]
pub async fn fetch_savings_deposits_with_amount(store: &SheetStore) -> Result<Vec<SavingsDeposit>> {
    let deposits = store.tables.read(Table::SavingsDeposits).await?;
    let overrides = store.tables.read(Table::SavingsOverrides).await?;
    let override_map: HashMap<i64, f64> = overrides
        .iter()
        .map(|row| {
            (
                parse::int_or(row.first().map(String::as_str).unwrap_or(""), 0),
                parse::float_or(row.get(1).map(String::as_str).unwrap_or(""), 0.0),
            )
        })
        .collect();

    let mut slots: Vec<SavingsDeposit> = deposits
        .iter()
        .map(|row| {
            let n = parse::int_or(row.first().map(String::as_str).unwrap_or(""), 0);
            SavingsDeposit {
                n,
                done: parse::flag_or(row.get(1).map(String::as_str).unwrap_or(""), false),
                amount: override_map.get(&n).copied().unwrap_or(n as f64),
            }
        })
        .collect();
    slots.sort_by_key(|d| d.n);
    Ok(slots)
}

/// Marks deposit `n` done (or not). Toggling an `n` outside the current
/// valid range is a no-op.
#[instrument(skip(store))]
pub async fn toggle_savings_deposit(store: &SheetStore, n: i64, done: bool) -> Result<()> {
    let mut rows = store.tables.read(Table::SavingsDeposits).await?;
    let mut changed = false;
    for row in &mut rows.rows {
        if row.first().and_then(|c| c.trim().parse::<i64>().ok()) == Some(n) {
            *row = vec![n.to_string(), parse::flag_cell(done)];
            changed = true;
        }
    }
    if changed {
        store.tables.rewrite(Table::SavingsDeposits, &rows).await?;
    }
    Ok(())
}

/// Overrides the value of deposit `n`. `None` — or an amount equal to the
/// triangular default — removes the override row instead of storing a
/// redundant value.
#[instrument(skip(store))]
pub async fn set_savings_override(store: &SheetStore, n: i64, amount: Option<f64>) -> Result<()> {
    let mut rows = store.tables.read(Table::SavingsOverrides).await?;
    let keeps_default = match amount {
        None => true,
        Some(a) => (a - n as f64).abs() < 1e-4,
    };

    if keeps_default {
        if rows.remove_by_id(n) {
            store.tables.rewrite(Table::SavingsOverrides, &rows).await?;
            info!("Cleared override for deposit {}", n);
        }
        return Ok(());
    }

    let value = amount.unwrap_or_default().to_string();
    let mut found = false;
    for row in &mut rows.rows {
        if row.first().and_then(|c| c.trim().parse::<i64>().ok()) == Some(n) {
            *row = vec![n.to_string(), value.clone()];
            found = true;
        }
    }
    if !found {
        rows.rows.push(vec![n.to_string(), value]);
    }
    store.tables.rewrite(Table::SavingsOverrides, &rows).await?;
    Ok(())
}

/// Unmarks every deposit and clears all challenge links.
#[instrument(skip(store))]
pub async fn reset_savings_marks(store: &SheetStore) -> Result<()> {
    let mut rows = store.tables.read(Table::SavingsDeposits).await?;
    for row in &mut rows.rows {
        if let Some(done) = row.get_mut(1) {
            *done = "0".to_string();
        }
    }
    store.tables.rewrite(Table::SavingsDeposits, &rows).await?;
    store
        .tables
        .rewrite(Table::SavingsTxLinks, &RowSet::default())
        .await?;
    info!("Reset savings marks and links");
    Ok(())
}

/// Removes the goal and every deposit, override, and link. The singleton
/// row stays, nulled out, so the table never goes headerless-empty.
#[instrument(skip(store))]
pub async fn clear_savings_goal(store: &SheetStore) -> Result<()> {
    store
        .tables
        .rewrite(Table::SavingsGoal, &RowSet::new(vec![empty_goal_row()]))
        .await?;
    for table in [
        Table::SavingsDeposits,
        Table::SavingsOverrides,
        Table::SavingsTxLinks,
    ] {
        store.tables.rewrite(table, &RowSet::default()).await?;
    }
    info!("Cleared savings goal and challenge tables");
    Ok(())
}

/// Records the "confirm deposit n" transaction: a paid inflow under the
/// "Challenge" category, linked to `n`.
///
/// Idempotent: when a link for `n` already exists, the linked transaction
/// id is returned and nothing is written.
#[instrument(skip(store))]
pub async fn create_challenge_transaction(
    store: &SheetStore,
    date: NaiveDate,
    n: i64,
    amount: f64,
) -> Result<i64> {
    let links = store.tables.read(Table::SavingsTxLinks).await?;
    if let Some(row) = links.find_by_id(n) {
        let existing = parse::int_or(row.get(1).map(String::as_str).unwrap_or(""), 0);
        return Ok(existing);
    }

    let description = format!("Challenge deposit #{n}");
    let tx_id = transactions::add_transaction(
        store,
        date,
        &description,
        TxKind::Inflow,
        amount,
        "Challenge",
        true,
    )
    .await?;
    store
        .tables
        .append(Table::SavingsTxLinks, vec![n.to_string(), tx_id.to_string()])
        .await?;
    info!("Linked challenge deposit {} to transaction {}", n, tx_id);
    Ok(tx_id)
}

/// Undoes a confirmed deposit: deletes the linked transaction, which
/// cascades the link row away too. No-op when `n` is unlinked.
#[instrument(skip(store))]
pub async fn delete_challenge_transaction(store: &SheetStore, n: i64) -> Result<()> {
    let links = store.tables.read(Table::SavingsTxLinks).await?;
    let Some(row) = links.find_by_id(n) else {
        return Ok(());
    };
    let tx_id = parse::int_or(row.get(1).map(String::as_str).unwrap_or(""), 0);
    transactions::delete_transaction(store, tx_id).await?;
    info!("Deleted challenge transaction for deposit {}", n);
    Ok(())
}
