//! Clan tournament organizer: round-robin league, standings and a single-elimination
//! playoff bracket over a pluggable data store.

pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod logic;
pub mod models;
pub mod store;

pub use auth::{AdminGate, AuthorizedContext};
pub use config::{Config, ConfigError};
pub use error::{ErrorKind, StoreError, TournamentError};
pub use events::{
    BufferedEventSink, EventPage, EventSink, LogEventSink, NoopEventSink, RecordingEventSink,
    TournamentEvent,
};
pub use logic::{
    bracket_order, next_round_pairings, opening_pairings, qualifier_count, rank_standings,
    replay_standings, round_robin_pairs, select_qualifiers, EngineSettings, LeagueDrawPolicy,
    NewParticipant, NewTournament, ParticipantHistory, ParticipantUpdate, PlayoffOutcome,
    RankedStanding, TournamentDetails, TournamentEngine, TournamentSnapshot,
};
pub use models::{
    LeagueMatch, LeagueMatchId, MatchStatus, Participant, ParticipantId, Phase, PlayoffMatch,
    PlayoffMatchId, PlayoffRound, Side, StandingsRecord, Tournament, TournamentId,
    TournamentStatus, MAX_SCORE,
};
pub use store::{DataStore, MemoryStore};
