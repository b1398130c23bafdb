//! Repository trait definitions for the domain layer.
//!
//! This module defines the repository interfaces (traits) that abstract data
//! access operations following the Repository pattern. These traits are
//! implemented by concrete repositories in the infrastructure layer.
//!
//! # Architecture
//!
//! - Traits define the contract for data operations
//! - Implementations live in `crate::infrastructure::persistence`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Short link storage, lookup, and expiry sweep
//! - [`ClickRepository`] - Click persistence, counters, analytics reads
//! - [`AggregateRepository`] - Daily aggregate upserts and trend reads

pub mod aggregate_repository;
pub mod click_repository;
pub mod link_repository;

pub use aggregate_repository::{AggregateRepository, TrendPoint};
pub use click_repository::{ClickBreakdown, ClickRepository, DayRollup, RankedLink};
pub use link_repository::{LinkOrder, LinkQuery, LinkRepository, LinkTotals};

#[cfg(test)]
pub use aggregate_repository::MockAggregateRepository;
#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
