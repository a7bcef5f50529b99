use crate::config::TuningConfig;
use crate::errors::Result;
use crate::sheets::api::SheetsApi;
use crate::sheets::cache::RowCache;
use crate::sheets::retry::with_retry;
use crate::sheets::schema::Table;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// An in-memory ordered collection of rows sharing one table's schema.
///
/// Each row is padded to the table's width on read; the header row is never
/// part of a `RowSet`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub rows: Vec<Vec<String>>,
}

impl RowSet {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vec<String>> {
        self.rows.iter()
    }

    /// Next primary key: `max(existing id) + 1`, or 1 for an empty table.
    ///
    /// Computed from a (possibly cached) read, so two sessions racing to
    /// add against the same table can both allocate the same id. That is
    /// an accepted single-writer limitation, not a solved problem.
    pub fn next_id(&self) -> i64 {
        self.rows
            .iter()
            .filter_map(|row| row.first())
            .filter_map(|cell| cell.trim().parse::<i64>().ok())
            .max()
            .unwrap_or(0)
            + 1
    }

    /// First row whose key column (column 0) equals `id`.
    pub fn find_by_id(&self, id: i64) -> Option<&Vec<String>> {
        self.rows
            .iter()
            .find(|row| key_of(row) == Some(id))
    }

    /// Drops every row whose key column equals `id`; returns whether
    /// anything was removed.
    pub fn remove_by_id(&mut self, id: i64) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| key_of(row) != Some(id));
        self.rows.len() != before
    }
}

fn key_of(row: &[String]) -> Option<i64> {
    row.first().and_then(|cell| cell.trim().parse::<i64>().ok())
}

/// Reader/writer for logical tables: the only component that issues remote
/// requests, always through the retry executor.
pub struct TableClient {
    api: Arc<dyn SheetsApi>,
    cache: RowCache,
    tuning: TuningConfig,
}

impl TableClient {
    pub fn new(api: Arc<dyn SheetsApi>, tuning: TuningConfig) -> Self {
        let cache = RowCache::new(tuning.cache_ttl());
        Self { api, cache, tuning }
    }

    /// Fetches a bounded range from the table and normalizes it into a
    /// `RowSet`.
    ///
    /// The first remote row must equal the registered header; when it does
    /// not, just the header row is rewritten in place (data rows are left
    /// alone) and the read proceeds. Fully blank rows are stripped, short
    /// rows padded to the table width. Results are cached for the TTL;
    /// an empty remote table yields an empty (non-null) `RowSet`.
    #[instrument(skip(self), fields(table = table.name()))]
    pub async fn read(&self, table: Table) -> Result<RowSet> {
        if let Some(rows) = self.cache.get(table).await {
            return Ok(RowSet::new(rows));
        }

        let range = table.data_range(self.tuning.max_rows);
        let fetched = with_retry(&self.tuning.retry, || self.api.values_get(&range)).await?;

        let expected = table.header_row();
        let header_ok = fetched.first().is_some_and(|first| {
            first.len() == expected.len() && first.iter().zip(&expected).all(|(a, b)| a == b)
        });
        if !header_ok {
            debug!("Header mismatch on '{}', repairing in place", table.name());
            let header_range = table.header_range();
            with_retry(&self.tuning.retry, || {
                self.api.values_update(&header_range, vec![expected.clone()])
            })
            .await?;
        }

        let width = table.width();
        let rows: Vec<Vec<String>> = fetched
            .into_iter()
            .skip(1)
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        self.cache.put(table, rows.clone()).await;
        Ok(RowSet::new(rows))
    }

    /// The sole mutation primitive: clears the whole table, re-appends the
    /// header, then appends every row in order.
    ///
    /// Update and delete are both expressed as read-mutate-rewrite. There is
    /// no partial-failure recovery: an interruption mid-rewrite leaves the
    /// remote table with a header and a prefix of the rows, and only the
    /// next fetch coming up short will reveal it.
    #[instrument(skip(self, rows), fields(table = table.name(), rows = rows.len()))]
    pub async fn rewrite(&self, table: Table, rows: &RowSet) -> Result<()> {
        // Invalidate up front: from here on the remote contents are in flux.
        self.cache.invalidate(table).await;

        let range = table.data_range(self.tuning.max_rows);
        with_retry(&self.tuning.retry, || self.api.values_clear(&range)).await?;

        let mut payload = Vec::with_capacity(rows.len() + 1);
        payload.push(table.header_row());
        payload.extend(rows.rows.iter().cloned());
        with_retry(&self.tuning.retry, || {
            self.api.values_append(&range, payload.clone())
        })
        .await?;

        info!("Rewrote table '{}' with {} rows", table.name(), rows.len());
        Ok(())
    }

    /// Appends a single row without touching existing rows. Used by pure
    /// inserts; still invalidates the cache for the table.
    #[instrument(skip(self, row), fields(table = table.name()))]
    pub async fn append(&self, table: Table, row: Vec<String>) -> Result<()> {
        self.cache.invalidate(table).await;
        let range = table.data_range(self.tuning.max_rows);
        with_retry(&self.tuning.retry, || {
            self.api.values_append(&range, vec![row.clone()])
        })
        .await?;
        Ok(())
    }

    /// Makes sure the worksheet exists with the registered header. Safe to
    /// call repeatedly.
    #[instrument(skip(self), fields(table = table.name()))]
    pub async fn ensure_table(&self, table: Table) -> Result<()> {
        let titles = with_retry(&self.tuning.retry, || self.api.sheet_titles()).await?;
        if !titles.iter().any(|t| t == table.name()) {
            info!("Creating missing worksheet '{}'", table.name());
            with_retry(&self.tuning.retry, || self.api.add_sheet(table.name())).await?;
        }

        let header_range = table.header_range();
        let current = with_retry(&self.tuning.retry, || self.api.values_get(&header_range)).await?;
        let expected = table.header_row();
        let header_ok = current.first().is_some_and(|first| {
            first.len() == expected.len() && first.iter().zip(&expected).all(|(a, b)| a == b)
        });
        if !header_ok {
            with_retry(&self.tuning.retry, || {
                self.api.values_update(&header_range, vec![expected.clone()])
            })
            .await?;
        }
        Ok(())
    }

    /// Cheapest possible connectivity check: list the worksheet titles.
    pub async fn probe(&self) -> Result<usize> {
        let titles = with_retry(&self.tuning.retry, || self.api.sheet_titles()).await?;
        Ok(titles.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::test_utils::{test_tuning, InMemorySheets};

    fn client(api: Arc<InMemorySheets>) -> TableClient {
        TableClient::new(api, test_tuning())
    }

    #[tokio::test]
    async fn read_of_missing_table_repairs_header_and_returns_empty() {
        let api = Arc::new(InMemorySheets::default());
        api.seed(Table::Notes.name(), vec![]);
        let tables = client(Arc::clone(&api));

        let rows = tables.read(Table::Notes).await.unwrap();
        assert!(rows.is_empty());
        assert_eq!(
            api.raw_rows(Table::Notes.name()),
            vec![Table::Notes.header_row()]
        );
    }

    #[tokio::test]
    async fn read_strips_blank_rows_and_pads_short_ones() {
        let api = Arc::new(InMemorySheets::default());
        api.seed(
            Table::SavingsDeposits.name(),
            vec![
                Table::SavingsDeposits.header_row(),
                vec!["1".into(), "0".into()],
                vec!["".into(), "  ".into()],
                vec!["2".into()],
            ],
        );
        let tables = client(api);

        let rows = tables.read(Table::SavingsDeposits).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.rows[1], vec!["2".to_string(), String::new()]);
    }

    #[tokio::test]
    async fn cached_read_skips_remote_until_write_invalidates() {
        let api = Arc::new(InMemorySheets::default());
        api.seed(
            Table::Notes.name(),
            vec![Table::Notes.header_row()],
        );
        let tables = client(Arc::clone(&api));

        tables.read(Table::Notes).await.unwrap();
        tables.read(Table::Notes).await.unwrap();
        assert_eq!(api.get_calls(), 1);

        tables
            .append(Table::Notes, vec!["1".into(), "t".into(), "b".into(), "c".into(), "u".into()])
            .await
            .unwrap();
        let rows = tables.read(Table::Notes).await.unwrap();
        assert_eq!(api.get_calls(), 2);
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn rewrite_replaces_everything_and_keeps_header_first() {
        let api = Arc::new(InMemorySheets::default());
        api.seed(
            Table::SavingsOverrides.name(),
            vec![
                Table::SavingsOverrides.header_row(),
                vec!["9".into(), "99".into()],
            ],
        );
        let tables = client(Arc::clone(&api));

        let new_rows = RowSet::new(vec![vec!["1".into(), "5.5".into()]]);
        tables.rewrite(Table::SavingsOverrides, &new_rows).await.unwrap();

        let raw = api.raw_rows(Table::SavingsOverrides.name());
        assert_eq!(raw[0], Table::SavingsOverrides.header_row());
        assert_eq!(raw[1], vec!["1".to_string(), "5.5".to_string()]);
        assert_eq!(raw.len(), 2);
    }

    #[tokio::test]
    async fn ensure_table_creates_sheet_once() {
        let api = Arc::new(InMemorySheets::default());
        let tables = client(Arc::clone(&api));

        tables.ensure_table(Table::Debts).await.unwrap();
        tables.ensure_table(Table::Debts).await.unwrap();

        assert_eq!(api.add_sheet_calls(), 1);
        assert_eq!(
            api.raw_rows(Table::Debts.name())[0],
            Table::Debts.header_row()
        );
    }

    #[test]
    fn next_id_is_max_plus_one() {
        let rows = RowSet::new(vec![
            vec!["4".into()],
            vec!["11".into()],
            vec!["broken".into()],
        ]);
        assert_eq!(rows.next_id(), 12);
        assert_eq!(RowSet::default().next_id(), 1);
    }
}
