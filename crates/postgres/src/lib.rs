//! Postgres-backed stores for the lead engine.
//!
//! Implements the store contracts from `lead-store` over `sqlx`. The
//! repeat-lead read happens inside the insert transaction while holding an
//! advisory lock on the normalized email, so two concurrent submissions for
//! the same address cannot both come out as first leads.

pub mod client;
pub mod config;
pub mod health;
pub mod schema;
pub mod store;

pub use client::PostgresClient;
pub use config::PostgresConfig;
pub use store::PostgresStore;
