//! Legislative data source module.
//!
//! Provides the client abstraction each body adapter uses to fetch
//! already-normalized records from its upstream.
//!
//! # Architecture
//!
//! - [`SourceClient`] - Trait defining source operations
//! - [`HttpSourceClient`] - Real HTTP implementation using reqwest
//! - [`mock::MockSourceClient`] - Mock for unit tests (behind `test-utils` feature)
//!
//! # Testing Patterns
//!
//! ## Unit Tests (Mock Implementation)
//!
//! ```ignore
//! use legtrack::source::mock::MockSourceClient;
//!
//! let mock = MockSourceClient::new();
//! mock.set_legislation(Legislation { id: "2021-S5130".into(), ..Default::default() });
//! mock.fail_legislation("2021-S9999", 503, "upstream down");
//! ```
//!
//! ## Integration Tests (HTTP Stubbing)
//!
//! ```ignore
//! let server = wiremock::MockServer::start().await;
//! Mock::given(method("GET"))
//!     .and(path("/legislation/2021-S5130"))
//!     .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "legislation": { ... } })))
//!     .mount(&server)
//!     .await;
//!
//! let client = HttpSourceClient::new(server.uri(), "test-key");
//! ```

mod client;
mod types;

pub use client::{HttpSourceClient, SourceClient, SourceError};
pub use types::{LegislationResponse, MembersResponse, Vote, VotesResponse};

#[cfg(any(test, feature = "test-utils"))]
pub use client::mock;
