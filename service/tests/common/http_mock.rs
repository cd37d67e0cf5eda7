//! HTTP mock server helpers for testing outbound HTTP calls.
//!
//! Thin re-export of `wiremock` for declarative HTTP stubbing of data sources.
//!
//! # Quick Start
//!
//! ```ignore
//! use crate::common::http_mock::{method, path, Mock, MockServer, ResponseTemplate};
//!
//! let server = MockServer::start().await;
//! Mock::given(method("GET"))
//!     .and(path("/legislation/2021-S5130"))
//!     .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "legislation": {} })))
//!     .mount(&server)
//!     .await;
//! ```
//!
//! # Patterns
//!
//! - **Success response**: `ResponseTemplate::new(200).set_body_json(value)`
//! - **Error response**: `ResponseTemplate::new(503).set_body_string("down")`
//! - **Request verification**: `.expect(1)` to assert call count

pub use wiremock::matchers::{header, method, path, query_param};
pub use wiremock::{Mock, MockServer, ResponseTemplate};
