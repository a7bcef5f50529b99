//! `SheetLedger` - a spreadsheet-backed store for a personal finance tracker
//!
//! This crate persists transactions, cash-flow adjustments, debts, notes,
//! and an incremental savings challenge in a remote spreadsheet, emulating
//! table semantics (headers, allocated ids, cross-table cascade) on top of
//! an API that only offers whole-range read, append, clear, and update.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    // Security and correctness
    unsafe_code,
    unsafe_op_in_unsafe_fn,

    // Code quality - things that are almost always bugs
    unreachable_code,
    unreachable_patterns,
    unused_must_use,

    // Documentation - broken links are bugs
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    clippy::all,
    clippy::pedantic,

    // Performance
    clippy::inefficient_to_string,
    clippy::needless_pass_by_value,

    // Correctness
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::exit,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,

    // Style consistency
    clippy::enum_glob_use,
    clippy::semicolon_if_nothing_returned,
    clippy::wildcard_imports,

    // Future compatibility
    future_incompatible,
    rust_2018_idioms,
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,  // Common pattern in Rust
    clippy::missing_errors_doc,       // Will add gradually
    clippy::float_cmp,                // Cells round-trip through strings; exact compares are intended
)]

/// Environment and tuning configuration
pub mod config;
/// Unified error types and result handling
pub mod errors;
/// Typed records and their row codecs
pub mod models;
/// Defensive cell parsing helpers
pub mod parse;
/// Remote spreadsheet adapter - wire client, retry, cache, table reader/writer
pub mod sheets;
/// The record store - per-table operation families over an explicit context
pub mod store;
