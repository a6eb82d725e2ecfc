//! Persisted data models for the attachment server.
//!
//! Rows map to structs via `sqlx::FromRow`.

pub mod record;
