//! The remote spreadsheet adapter: the API seam, the HTTP implementation,
//! the retry executor, the schema registry, and the table reader/writer
//! that emulates record semantics on top of whole-range operations.

pub mod api;
pub mod cache;
pub mod http;
pub mod retry;
pub mod schema;
pub mod table;
#[cfg(test)]
pub(crate) mod test_utils;

pub use api::SheetsApi;
pub use http::HttpSheets;
pub use schema::Table;
pub use table::{RowSet, TableClient};
