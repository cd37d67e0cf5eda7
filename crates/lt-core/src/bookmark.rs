use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::body::BodyId;
use crate::legislation::LegislationId;

/// A user's tracked position on one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub user_id: Uuid,
    pub body: BodyId,
    pub legislation_id: LegislationId,
    /// The user wants this item to fail.
    #[serde(default)]
    pub oppose: bool,
    #[serde(default)]
    pub notes: String,
    pub created: DateTime<Utc>,
}
