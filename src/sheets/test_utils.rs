//! In-memory stand-ins for the remote spreadsheet, used across the crate's
//! tests. The fake mirrors the observable semantics the store relies on:
//! whole-range reads, in-place updates, appends after the last row, clears,
//! and worksheet creation.

use crate::config::{RetryPolicy, TuningConfig};
use crate::errors::{Error, Result};
use crate::sheets::api::SheetsApi;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// Tuning with a long TTL and near-instant retries so tests stay fast and
/// deterministic.
pub fn test_tuning() -> TuningConfig {
    TuningConfig {
        cache_ttl_secs: 60,
        max_rows: 100,
        retry: RetryPolicy {
            max_attempts: 3,
            base_delay_ms: 1,
            max_jitter_ms: 0,
        },
    }
}

#[derive(Default)]
pub struct InMemorySheets {
    sheets: Mutex<BTreeMap<String, Vec<Vec<String>>>>,
    get_calls: AtomicUsize,
    add_sheet_calls: AtomicUsize,
}

impl InMemorySheets {
    /// Pre-creates a worksheet with the given raw rows (header included).
    pub fn seed(&self, title: &str, rows: Vec<Vec<String>>) {
        self.sheets
            .lock()
            .unwrap()
            .insert(title.to_string(), rows);
    }

    /// Raw worksheet contents, header row included.
    pub fn raw_rows(&self, title: &str) -> Vec<Vec<String>> {
        self.sheets
            .lock()
            .unwrap()
            .get(title)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn add_sheet_calls(&self) -> usize {
        self.add_sheet_calls.load(Ordering::SeqCst)
    }

    fn sheet_of(range: &str) -> String {
        range.split('!').next().unwrap_or(range).to_string()
    }

    /// Start row (1-based) of an A1 range like `notes!A1:E1000`.
    fn start_row(range: &str) -> usize {
        let cell = range
            .split('!')
            .nth(1)
            .unwrap_or("A1")
            .split(':')
            .next()
            .unwrap_or("A1");
        cell.chars()
            .skip_while(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .parse()
            .unwrap_or(1)
    }

    fn missing(title: &str) -> Error {
        Error::Remote {
            status: Some(400),
            message: format!("Unable to parse range: no sheet named '{title}'"),
        }
    }
}

#[async_trait]
impl SheetsApi for InMemorySheets {
    async fn values_get(&self, range: &str) -> Result<Vec<Vec<String>>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let title = Self::sheet_of(range);
        let sheets = self.sheets.lock().unwrap();
        let rows = sheets.get(&title).ok_or_else(|| Self::missing(&title))?;
        Ok(rows.clone())
    }

    async fn values_update(&self, range: &str, rows: Vec<Vec<String>>) -> Result<()> {
        let title = Self::sheet_of(range);
        let start = Self::start_row(range) - 1;
        let mut sheets = self.sheets.lock().unwrap();
        let sheet = sheets.get_mut(&title).ok_or_else(|| Self::missing(&title))?;
        for (offset, row) in rows.into_iter().enumerate() {
            let idx = start + offset;
            if sheet.len() <= idx {
                sheet.resize(idx + 1, Vec::new());
            }
            sheet[idx] = row;
        }
        Ok(())
    }

    async fn values_append(&self, range: &str, rows: Vec<Vec<String>>) -> Result<()> {
        let title = Self::sheet_of(range);
        let mut sheets = self.sheets.lock().unwrap();
        let sheet = sheets.get_mut(&title).ok_or_else(|| Self::missing(&title))?;
        sheet.extend(rows);
        Ok(())
    }

    async fn values_clear(&self, range: &str) -> Result<()> {
        let title = Self::sheet_of(range);
        let mut sheets = self.sheets.lock().unwrap();
        let sheet = sheets.get_mut(&title).ok_or_else(|| Self::missing(&title))?;
        sheet.clear();
        Ok(())
    }

    async fn sheet_titles(&self) -> Result<Vec<String>> {
        Ok(self.sheets.lock().unwrap().keys().cloned().collect())
    }

    async fn add_sheet(&self, title: &str) -> Result<()> {
        self.add_sheet_calls.fetch_add(1, Ordering::SeqCst);
        let mut sheets = self.sheets.lock().unwrap();
        if sheets.contains_key(title) {
            return Err(Error::Remote {
                status: Some(400),
                message: format!("A sheet with the name '{title}' already exists"),
            });
        }
        sheets.insert(title.to_string(), Vec::new());
        Ok(())
    }
}

/// Wrapper that fails the first `failures` reads with a rate-limit error,
/// then delegates. Exercises the retry executor end to end.
pub struct RateLimitedSheets {
    inner: InMemorySheets,
    remaining_failures: AtomicU32,
}

impl RateLimitedSheets {
    pub fn new(inner: InMemorySheets, failures: u32) -> Self {
        Self {
            inner,
            remaining_failures: AtomicU32::new(failures),
        }
    }

    fn maybe_fail(&self) -> Result<()> {
        let remaining = self.remaining_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.remaining_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(Error::Remote {
                status: Some(429),
                message: "Quota exceeded for quota metric 'Read requests'".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SheetsApi for RateLimitedSheets {
    async fn values_get(&self, range: &str) -> Result<Vec<Vec<String>>> {
        self.maybe_fail()?;
        self.inner.values_get(range).await
    }

    async fn values_update(&self, range: &str, rows: Vec<Vec<String>>) -> Result<()> {
        self.inner.values_update(range, rows).await
    }

    async fn values_append(&self, range: &str, rows: Vec<Vec<String>>) -> Result<()> {
        self.inner.values_append(range, rows).await
    }

    async fn values_clear(&self, range: &str) -> Result<()> {
        self.inner.values_clear(range).await
    }

    async fn sheet_titles(&self) -> Result<Vec<String>> {
        self.inner.sheet_titles().await
    }

    async fn add_sheet(&self, title: &str) -> Result<()> {
        self.inner.add_sheet(title).await
    }
}
