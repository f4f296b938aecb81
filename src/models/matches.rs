//! League and playoff matches, plus the playoff round ladder.

use crate::models::participant::ParticipantId;
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a league match.
pub type LeagueMatchId = Uuid;

/// Unique identifier for a playoff match.
pub type PlayoffMatchId = Uuid;

/// Highest score accepted for one side of a match.
pub const MAX_SCORE: u32 = 999;

/// Which side of a pairing won the match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    One,
    Two,
}

impl Side {
    /// Side with the strictly higher score; `None` on a draw.
    pub fn from_scores(score1: u32, score2: u32) -> Option<Self> {
        match score1.cmp(&score2) {
            std::cmp::Ordering::Greater => Some(Side::One),
            std::cmp::Ordering::Less => Some(Side::Two),
            std::cmp::Ordering::Equal => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Pending,
    Completed,
}

/// One round of the single-elimination bracket.
///
/// Ordered from earliest to latest, so `RoundOf16 < Quarter < Semi < Final`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayoffRound {
    #[serde(rename = "round_of_16")]
    RoundOf16,
    Quarter,
    Semi,
    Final,
}

impl PlayoffRound {
    /// The round that starts a bracket of `qualifiers` participants (4, 8 or 16).
    pub fn opening(qualifiers: usize) -> Option<Self> {
        match qualifiers {
            16 => Some(PlayoffRound::RoundOf16),
            8 => Some(PlayoffRound::Quarter),
            4 => Some(PlayoffRound::Semi),
            2 => Some(PlayoffRound::Final),
            _ => None,
        }
    }

    /// Round fed by this round's winners; `None` after the final.
    pub fn next(self) -> Option<Self> {
        match self {
            PlayoffRound::RoundOf16 => Some(PlayoffRound::Quarter),
            PlayoffRound::Quarter => Some(PlayoffRound::Semi),
            PlayoffRound::Semi => Some(PlayoffRound::Final),
            PlayoffRound::Final => None,
        }
    }

    /// Number of matches played in this round.
    pub fn match_count(self) -> usize {
        match self {
            PlayoffRound::RoundOf16 => 8,
            PlayoffRound::Quarter => 4,
            PlayoffRound::Semi => 2,
            PlayoffRound::Final => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlayoffRound::RoundOf16 => "round_of_16",
            PlayoffRound::Quarter => "quarter",
            PlayoffRound::Semi => "semi",
            PlayoffRound::Final => "final",
        }
    }
}

impl fmt::Display for PlayoffRound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A round-robin fixture. Scores are present only once completed.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LeagueMatch {
    pub id: LeagueMatchId,
    pub tournament_id: TournamentId,
    /// 1-based, unique within the tournament.
    pub match_number: u32,
    pub participant1: ParticipantId,
    pub participant2: ParticipantId,
    pub participant1_score: Option<u32>,
    pub participant2_score: Option<u32>,
    pub status: MatchStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeagueMatch {
    pub fn new(
        tournament_id: TournamentId,
        match_number: u32,
        participant1: ParticipantId,
        participant2: ParticipantId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            match_number,
            participant1,
            participant2,
            participant1_score: None,
            participant2_score: None,
            status: MatchStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    pub fn involves(&self, participant: ParticipantId) -> bool {
        self.participant1 == participant || self.participant2 == participant
    }

    /// Both scores, if the match has been completed.
    pub fn scores(&self) -> Option<(u32, u32)> {
        match (self.status, self.participant1_score, self.participant2_score) {
            (MatchStatus::Completed, Some(s1), Some(s2)) => Some((s1, s2)),
            _ => None,
        }
    }
}

/// A single-elimination match. Created only once both participants are known.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayoffMatch {
    pub id: PlayoffMatchId,
    pub tournament_id: TournamentId,
    pub round: PlayoffRound,
    /// 1-based, unique within (tournament, round); also the bracket slot.
    pub match_number: u32,
    pub participant1: ParticipantId,
    pub participant2: ParticipantId,
    pub winner: Option<ParticipantId>,
    pub participant1_score: Option<u32>,
    pub participant2_score: Option<u32>,
    pub status: MatchStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlayoffMatch {
    pub fn new(
        tournament_id: TournamentId,
        round: PlayoffRound,
        match_number: u32,
        participant1: ParticipantId,
        participant2: ParticipantId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            round,
            match_number,
            participant1,
            participant2,
            winner: None,
            participant1_score: None,
            participant2_score: None,
            status: MatchStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    pub fn participant(&self, side: Side) -> ParticipantId {
        match side {
            Side::One => self.participant1,
            Side::Two => self.participant2,
        }
    }
}
