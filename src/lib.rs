//! Purpose: Decode CSV rows into caller-defined records by column name.
//! Exports: `api` (decode entrypoints, record tables, conversion hook, errors).
//! Role: Library backing the `advcsv` binary and embedding callers.
//! Invariants: Columns bind by header name; source column order never matters.
//! Invariants: Decoding is all-or-nothing; the first failure is returned to the caller.
pub mod api;
mod core;
