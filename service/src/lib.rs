#![deny(
    clippy::expect_used,
    clippy::panic,
    clippy::print_stdout,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used
)]

pub mod config;
pub mod error;
pub mod limiter;
pub mod reconcile;
pub mod refresh;
pub mod resolver;
pub mod scorecard;
pub mod source;
pub mod store;
