//! Tournament, TournamentStatus and Phase.

use crate::models::matches::PlayoffRound;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Lifecycle of the tournament. Only moves forward.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Adding participants; no matches exist.
    #[default]
    Setup,
    /// Round-robin fixtures generated; results being entered.
    League,
    /// Bracket in progress.
    Playoffs,
    /// Final played; champion known.
    Completed,
}

impl TournamentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TournamentStatus::Setup => "setup",
            TournamentStatus::League => "league",
            TournamentStatus::Playoffs => "playoffs",
            TournamentStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Active stage, meaningful only relative to [`TournamentStatus`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    League,
    #[serde(rename = "round_of_16")]
    RoundOf16,
    Quarter,
    Semi,
    Final,
}

impl From<PlayoffRound> for Phase {
    fn from(round: PlayoffRound) -> Self {
        match round {
            PlayoffRound::RoundOf16 => Phase::RoundOf16,
            PlayoffRound::Quarter => Phase::Quarter,
            PlayoffRound::Semi => Phase::Semi,
            PlayoffRound::Final => Phase::Final,
        }
    }
}

/// One event: name, optional description and rules, and where it stands.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub description: Option<String>,
    /// Ordered rule strings shown to participants.
    pub rules: Vec<String>,
    pub status: TournamentStatus,
    /// `None`/`League` before playoffs, the active round during playoffs, `Final` once completed.
    pub current_phase: Option<Phase>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tournament {
    /// Create a new tournament in Setup state.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            rules: Vec::new(),
            status: TournamentStatus::Setup,
            current_phase: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder-style description (blank becomes `None`).
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        self
    }

    /// Builder-style rules; blank entries are dropped.
    pub fn with_rules(mut self, rules: Vec<String>) -> Self {
        self.rules = clean_rules(rules);
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == TournamentStatus::Completed
    }

    /// The playoff round currently being played, if any.
    pub fn current_round(&self) -> Option<PlayoffRound> {
        if self.status != TournamentStatus::Playoffs {
            return None;
        }
        match self.current_phase? {
            Phase::RoundOf16 => Some(PlayoffRound::RoundOf16),
            Phase::Quarter => Some(PlayoffRound::Quarter),
            Phase::Semi => Some(PlayoffRound::Semi),
            Phase::Final => Some(PlayoffRound::Final),
            Phase::League => None,
        }
    }
}

pub(crate) fn clean_rules(rules: Vec<String>) -> Vec<String> {
    rules
        .into_iter()
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .collect()
}
