//! Domain layer containing business entities and logic.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`click_event`] - Click tracking event model
//! - [`click_worker`] - Asynchronous click ingestion worker
//!
//! # Click Processing Flow
//!
//! 1. The redirect handler resolves a code and responds immediately
//! 2. A [`click_event::ClickEvent`] is sent to a bounded channel
//! 3. [`click_worker::run_click_worker`] classifies, deduplicates, and
//!    persists events with bounded fixed-delay retry
//! 4. Click data lands via [`repositories::ClickRepository`] in one atomic
//!    write that also bumps the link counters

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod repositories;
