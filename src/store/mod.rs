//! Persistence port for the engine.
//!
//! The engine assumes nothing stronger than per-row atomicity: every method below
//! touches one row, or inserts one batch guarded by an existence check. Methods that
//! return `bool` are conditional writes and report whether they took effect.

mod memory;

pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::models::{
    LeagueMatch, LeagueMatchId, Participant, ParticipantId, Phase, PlayoffMatch, PlayoffMatchId,
    PlayoffRound, StandingsDelta, StandingsRecord, Tournament, TournamentId, TournamentStatus,
};

/// Editable tournament fields. `None` leaves a field unchanged.
#[derive(Clone, Debug, Default)]
pub struct TournamentPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub rules: Option<Vec<String>>,
}

/// Editable participant fields. `None` leaves a field unchanged.
#[derive(Clone, Debug, Default)]
pub struct ParticipantPatch {
    pub name: Option<String>,
    pub tag: Option<Option<String>>,
}

pub trait DataStore: Send + Sync {
    fn insert_tournament(&self, tournament: Tournament) -> Result<(), StoreError>;

    fn tournament(&self, id: TournamentId) -> Result<Option<Tournament>, StoreError>;

    /// All tournaments, newest first.
    fn tournaments(&self) -> Result<Vec<Tournament>, StoreError>;

    /// Returns the updated row, or `None` if it does not exist.
    fn update_tournament(
        &self,
        id: TournamentId,
        patch: &TournamentPatch,
    ) -> Result<Option<Tournament>, StoreError>;

    /// Set status and phase only if the current status is `expected`.
    fn transition_tournament(
        &self,
        id: TournamentId,
        expected: TournamentStatus,
        status: TournamentStatus,
        phase: Option<Phase>,
    ) -> Result<bool, StoreError>;

    /// Set the phase only if the current status is `expected`.
    fn set_phase(
        &self,
        id: TournamentId,
        expected: TournamentStatus,
        phase: Phase,
    ) -> Result<bool, StoreError>;

    /// Deletes the tournament and every row it owns.
    fn delete_tournament(&self, id: TournamentId) -> Result<bool, StoreError>;

    fn insert_participants(&self, participants: Vec<Participant>) -> Result<(), StoreError>;

    /// Participants by seed position (unseeded last), then insertion order.
    fn participants(&self, tournament_id: TournamentId) -> Result<Vec<Participant>, StoreError>;

    fn participant(&self, id: ParticipantId) -> Result<Option<Participant>, StoreError>;

    fn update_participant(
        &self,
        id: ParticipantId,
        patch: &ParticipantPatch,
    ) -> Result<Option<Participant>, StoreError>;

    fn delete_participant(&self, id: ParticipantId) -> Result<bool, StoreError>;

    /// Insert fixtures and zeroed standings, only if the tournament has no league matches yet.
    fn insert_league_fixtures(
        &self,
        tournament_id: TournamentId,
        matches: Vec<LeagueMatch>,
        standings: Vec<StandingsRecord>,
    ) -> Result<bool, StoreError>;

    /// League matches in ascending `match_number`.
    fn league_matches(&self, tournament_id: TournamentId) -> Result<Vec<LeagueMatch>, StoreError>;

    fn league_match(&self, id: LeagueMatchId) -> Result<Option<LeagueMatch>, StoreError>;

    /// Record scores and flip pending -> completed. `false` if the match was not pending.
    fn complete_league_match(
        &self,
        id: LeagueMatchId,
        participant1_score: u32,
        participant2_score: u32,
    ) -> Result<bool, StoreError>;

    fn standings(&self, tournament_id: TournamentId) -> Result<Vec<StandingsRecord>, StoreError>;

    /// Atomically add one match to a participant's record. `false` if the record is missing.
    fn apply_standings_delta(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
        delta: StandingsDelta,
    ) -> Result<bool, StoreError>;

    /// Overwrite the record for `(tournament_id, participant_id)`, inserting it if missing.
    fn upsert_standings(&self, record: &StandingsRecord) -> Result<(), StoreError>;

    /// Insert a whole round, only if no match of that round exists yet.
    fn insert_playoff_round(
        &self,
        tournament_id: TournamentId,
        round: PlayoffRound,
        matches: Vec<PlayoffMatch>,
    ) -> Result<bool, StoreError>;

    /// Playoff matches ordered by round, then `match_number`.
    fn playoff_matches(&self, tournament_id: TournamentId) -> Result<Vec<PlayoffMatch>, StoreError>;

    fn playoff_match(&self, id: PlayoffMatchId) -> Result<Option<PlayoffMatch>, StoreError>;

    /// Record scores and winner, flipping pending -> completed. `false` if not pending.
    fn complete_playoff_match(
        &self,
        id: PlayoffMatchId,
        participant1_score: u32,
        participant2_score: u32,
        winner: ParticipantId,
    ) -> Result<bool, StoreError>;
}
