//! Test data factories for reducing test setup boilerplate.
//!
//! # Usage
//!
//! ```rust
//! use common::factories::{member, LegislationFactory};
//!
//! let bill = LegislationFactory::ny_senate(5130)
//!     .with_sponsors(vec![member("alice"), member("bob")])
//!     .stale()
//!     .build();
//! ```

mod legislation;

pub use legislation::{current_session, member, LegislationFactory};

use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for generating unique test data.
/// Each call to `next_id()` returns a unique value across all tests.
static FACTORY_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Returns a unique ID for generating test data.
/// Thread-safe and guaranteed unique within a test run.
pub fn next_id() -> u64 {
    FACTORY_COUNTER.fetch_add(1, Ordering::SeqCst)
}
