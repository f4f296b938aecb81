//! Tournament business logic: setup, league fixtures and standings, playoff bracket.
//!
//! Pure helpers (pairing, ranking, seeding) are free functions; operations that read
//! and write the store are methods on [`TournamentEngine`], one `impl` block per file.

mod bracket;
mod fixtures;
mod overview;
mod progression;
mod qualifiers;
mod setup;
mod standings;

pub use bracket::{bracket_order, opening_pairings};
pub use fixtures::{build_fixtures, round_robin_pairs};
pub use overview::{
    BracketRound, HistoryEntry, LeagueMatchView, LeagueProgress, MatchOutcome,
    ParticipantHistory, PlayoffMatchView, TournamentList, TournamentSnapshot,
};
pub use progression::{next_round_pairings, PlayoffOutcome};
pub use qualifiers::{qualifier_count, rank_standings, select_qualifiers, RankedStanding};
pub use setup::{NewParticipant, NewTournament, ParticipantUpdate, TournamentDetails};
pub use standings::{replay_standings, result_deltas, LeagueDrawPolicy};

use crate::error::TournamentError;
use crate::events::{EventSink, TournamentEvent};
use crate::models::{Tournament, TournamentId, MAX_SCORE};
use crate::store::DataStore;
use std::sync::Arc;

/// Fewest participants a league can be generated for.
pub const MIN_PARTICIPANTS: usize = 4;

pub const DEFAULT_MAX_PARTICIPANTS: usize = 32;

/// Reject scores above [`MAX_SCORE`] before anything is written.
pub(crate) fn check_score_range(score1: u32, score2: u32) -> Result<(), TournamentError> {
    if score1 > MAX_SCORE || score2 > MAX_SCORE {
        return Err(TournamentError::InvalidScore(format!(
            "scores must be between 0 and {} (got {}-{})",
            MAX_SCORE, score1, score2
        )));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineSettings {
    pub league_draw_policy: LeagueDrawPolicy,
    pub max_participants: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            league_draw_policy: LeagueDrawPolicy::default(),
            max_participants: DEFAULT_MAX_PARTICIPANTS,
        }
    }
}

/// The progression engine: a store, an event sink and the settings that shape scoring.
///
/// Cheap to clone; every operation is a short read-then-write sequence with no locks
/// held between steps.
#[derive(Clone)]
pub struct TournamentEngine {
    store: Arc<dyn DataStore>,
    events: Arc<dyn EventSink>,
    settings: EngineSettings,
}

impl TournamentEngine {
    pub fn new(
        store: Arc<dyn DataStore>,
        events: Arc<dyn EventSink>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            store,
            events,
            settings,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn store(&self) -> &dyn DataStore {
        self.store.as_ref()
    }

    /// Fetch a tournament or fail with `TournamentNotFound`.
    pub fn tournament(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        self.store
            .tournament(id)?
            .ok_or(TournamentError::TournamentNotFound(id))
    }

    fn publish(&self, event: TournamentEvent) {
        self.events.publish(event);
    }
}
