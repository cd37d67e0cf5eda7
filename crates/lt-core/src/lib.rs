//! Canonical legislation model shared by every legislative body adapter.
//!
//! This crate is pure: no network, no storage. It holds the entity model,
//! the per-body identifier grammars, the sponsor-change diff, and the
//! scorecard arithmetic. Everything that talks to the outside world lives
//! in the `legtrack` service crate and consumes these types.
#![deny(
    clippy::expect_used,
    clippy::panic,
    clippy::print_stdout,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used
)]

mod body;
pub use body::{known, Bodies, Body, BodyId};

mod session;
pub use session::{Session, SessionParseError, Sessions};

mod member;
pub use member::{Member, MemberKey};

mod legislation;
pub use legislation::{Legislation, LegislationId, LegislationType};

mod changes;
pub use changes::{Changes, SponsorChange};

pub mod diff;
pub use diff::diff;

pub mod ids;
pub use ids::{IdError, IdGrammar};

mod bookmark;
pub use bookmark::Bookmark;

pub mod scoring;
pub use scoring::{
    Scorable, Score, ScoredBookmark, Scorecard, ScorecardItem, ScorecardPerson, ScoredColumn,
    WhipCount,
};
