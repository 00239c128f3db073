//! Repository implementations.
//!
//! - [`local`]: in-memory backend for tests and local development
//! - [`postgres`]: Diesel-backed Postgres implementation (feature `postgres-repo`)

pub mod local;

#[cfg(feature = "postgres-repo")]
pub mod postgres;

pub use local::LocalRepository;

#[cfg(feature = "postgres-repo")]
pub use postgres::PostgresRepository;
