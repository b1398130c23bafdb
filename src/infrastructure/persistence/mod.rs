//! Repository implementations.
//!
//! PostgreSQL implementations of the domain repository traits, plus an
//! in-memory store used by tests and cache-less development runs.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Link storage, lookup, expiry sweep
//! - [`PgClickRepository`] - Click persistence, counters, analytics reads
//! - [`PgAggregateRepository`] - Daily aggregate upserts and trends
//! - [`MemoryStore`] - all three traits behind one mutex

pub mod memory;
pub mod pg_aggregate_repository;
pub mod pg_click_repository;
pub mod pg_link_repository;

pub use memory::MemoryStore;
pub use pg_aggregate_repository::PgAggregateRepository;
pub use pg_click_repository::PgClickRepository;
pub use pg_link_repository::PgLinkRepository;
