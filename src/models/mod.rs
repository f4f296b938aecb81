//! Data structures for the clan tournament: participants, matches, standings, tournament state.

mod matches;
mod participant;
mod standings;
mod tournament;

pub use matches::{
    LeagueMatch, LeagueMatchId, MatchStatus, PlayoffMatch, PlayoffMatchId, PlayoffRound, Side,
    MAX_SCORE,
};
pub use participant::{Participant, ParticipantId};
pub(crate) use participant::normalize_tag;
pub use standings::{StandingsDelta, StandingsRecord, StandingsRecordId, POINTS_PER_WIN};
pub use tournament::{Phase, Tournament, TournamentId, TournamentStatus};
