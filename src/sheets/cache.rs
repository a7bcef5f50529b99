use crate::sheets::schema::Table;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::trace;

/// Per-table read cache with a fixed, seconds-scale TTL.
///
/// Reads within the TTL window are served from memory without a remote
/// call; every write path invalidates the affected table synchronously
/// before it returns, so a committed write is never shadowed by a stale
/// cached read.
pub struct RowCache {
    ttl: Duration,
    entries: RwLock<HashMap<Table, CacheEntry>>,
}

struct CacheEntry {
    fetched_at: Instant,
    rows: Vec<Vec<String>>,
}

impl RowCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, table: Table) -> Option<Vec<Vec<String>>> {
        let entries = self.entries.read().await;
        let entry = entries.get(&table)?;
        if entry.fetched_at.elapsed() >= self.ttl {
            return None;
        }
        trace!("Cache hit for table '{}'", table.name());
        Some(entry.rows.clone())
    }

    pub async fn put(&self, table: Table, rows: Vec<Vec<String>>) {
        let mut entries = self.entries.write().await;
        entries.insert(
            table,
            CacheEntry {
                fetched_at: Instant::now(),
                rows,
            },
        );
    }

    pub async fn invalidate(&self, table: Table) {
        let mut entries = self.entries.write().await;
        if entries.remove(&table).is_some() {
            trace!("Invalidated cache for table '{}'", table.name());
        }
    }
}
