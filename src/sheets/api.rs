use crate::errors::Result;
use async_trait::async_trait;

/// The remote spreadsheet primitives the rest of the crate is allowed to use.
///
/// This is the whole surface: whole-range value reads, in-place updates,
/// appends, clears, and worksheet management. Everything database-shaped
/// (keys, upserts, deletes, references) is emulated above this seam, so the
/// remote request shapes stay isolated to one adapter and tests can swap in
/// an in-memory double.
#[async_trait]
pub trait SheetsApi: Send + Sync {
    /// Reads cell values from an A1 range. Missing trailing rows and cells
    /// are simply absent from the result, not padded.
    async fn values_get(&self, range: &str) -> Result<Vec<Vec<String>>>;

    /// Overwrites cells in place starting at the top-left of the range.
    async fn values_update(&self, range: &str, rows: Vec<Vec<String>>) -> Result<()>;

    /// Appends rows after the last non-empty row of the range's table.
    async fn values_append(&self, range: &str, rows: Vec<Vec<String>>) -> Result<()>;

    /// Clears all values in the range. Formatting and the worksheet itself
    /// survive.
    async fn values_clear(&self, range: &str) -> Result<()>;

    /// Titles of the worksheets currently in the spreadsheet.
    async fn sheet_titles(&self) -> Result<Vec<String>>;

    /// Creates an empty worksheet with the given title.
    async fn add_sheet(&self, title: &str) -> Result<()>;
}
