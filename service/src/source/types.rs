//! Wire envelopes returned by legislative data sources.
//!
//! Sources are expected to have already normalized their records into the
//! canonical `lt-core` model; these types only wrap them.

use lt_core::{Legislation, Member};
use serde::{Deserialize, Serialize};

/// A recorded position of one member on one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub member: Member,
    /// Position as the source spells it ("Aye", "Nay", "Excused", ...).
    pub status: String,
}

/// Response from the legislation detail endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegislationResponse {
    pub legislation: Legislation,
}

/// Response from the members endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembersResponse {
    pub members: Vec<Member>,
}

/// Response from the votes endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotesResponse {
    #[serde(default)]
    pub votes: Vec<Vote>,
}
