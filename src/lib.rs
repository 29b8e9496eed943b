//! Purpose: Shared core library crate used by the `rowfile` CLI and tests.
//! Exports: `core` (schema, record codec, table storage, scanning, errors), `token`.
//! Role: Internal library backing the binary; not yet a stable public SDK.
//! Invariants: Treat the crate API as internal until a dedicated library release.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod core;
pub mod token;
