//! Core domain entities representing the business data model.
//!
//! This module contains the fundamental data structures that represent the
//! core concepts of the service. Entities are plain data structures without
//! business logic.
//!
//! # Entity Types
//!
//! - [`Link`] - A shortened URL mapping with its analytics counters
//! - [`Click`] - A recorded click on a shortened link
//! - [`DailyStat`] - Aggregated per-day click totals for a link
//!
//! # Design Pattern
//!
//! Entities follow the "New Type" pattern with separate structs for creation:
//! `NewLink`, `NewClick` for inserts, `LinkPatch` for partial updates.

pub mod click;
pub mod daily_stat;
pub mod link;

pub use click::{Click, NewClick};
pub use daily_stat::DailyStat;
pub use link::{Link, LinkPatch, NewLink};
