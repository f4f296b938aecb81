//! Participant (player or team) data structure.

use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a participant (used in matches and lookups).
pub type ParticipantId = Uuid;

/// A player or team competing in one tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub tournament_id: TournamentId,
    pub name: String,
    pub tag: Option<String>,
    /// Display order in the league phase; fixtures follow this order too.
    pub seed_position: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl Participant {
    /// Create a new participant. Blank tags are stored as `None`.
    pub fn new(
        tournament_id: TournamentId,
        name: impl Into<String>,
        tag: Option<String>,
        seed_position: Option<u32>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            name: name.into(),
            tag: normalize_tag(tag),
            seed_position,
            created_at: Utc::now(),
        }
    }

    /// Name with the tag appended, e.g. `"Alice (#2PQ8)"`.
    pub fn display_name(&self) -> String {
        match &self.tag {
            Some(tag) => format!("{} ({})", self.name, tag),
            None => self.name.clone(),
        }
    }
}

pub(crate) fn normalize_tag(tag: Option<String>) -> Option<String> {
    tag.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}
