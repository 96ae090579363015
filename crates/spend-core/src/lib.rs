//! Core domain layer for SpendSmart.
//!
//! Holds the transaction data model, the shared error type, the CLI
//! settings surface and the number-formatting helpers used by the host
//! renderer. No I/O happens in this crate.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
