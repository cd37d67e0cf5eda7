//! Common test utilities for integration tests.
//!
//! This module provides:
//!
//! - [`harness::Harness`] - Engine wired to mock sources and an in-memory store,
//!   mirroring the wiring in main.rs
//! - [`factories`] - Builders for legislation and members
//! - [`http_mock`] - `wiremock` re-exports for HTTP source tests
//!
//! # Harness Usage
//!
//! ```ignore
//! use crate::common::harness::Harness;
//!
//! #[tokio::test]
//! async fn test_with_engine() {
//!     let h = Harness::new(5);
//!     let bill = LegislationFactory::ny_senate(1).stale().build();
//!     h.track(&bill).await;
//!     h.source(known::NY_SENATE).set_legislation(bill.clone());
//!     let report = h.scheduler.run(RefreshOptions::default(), &CancellationToken::new()).await;
//! }
//! ```

#![allow(dead_code, unused_imports)]

pub mod factories;
pub mod harness;
pub mod http_mock;
