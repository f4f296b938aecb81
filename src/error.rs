//! Error taxonomy for the tournament engine and its data store.

use crate::models::{ParticipantId, PlayoffRound, TournamentId};
use thiserror::Error;

/// Failures reported by a [`crate::store::DataStore`]. Opaque to callers: retry the whole operation.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Coarse classification of a [`TournamentError`], used by callers to decide how to report it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Bad input; rejected before any write.
    Validation,
    /// Guard check failed; safe to treat as "already done".
    Conflict,
    NotFound,
    Unauthorized,
    /// Transport/availability; retry the whole operation.
    Store,
}

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TournamentError {
    #[error("Need at least {min} and at most {max} participants (have {actual})")]
    InvalidParticipantCount { min: usize, max: usize, actual: usize },
    #[error("League fixtures have already been generated")]
    AlreadyGenerated,
    #[error("Tournament not found")]
    TournamentNotFound(TournamentId),
    #[error("Match not found")]
    MatchNotFound,
    #[error("Participant not found")]
    ParticipantNotFound(ParticipantId),
    #[error("Match has already been completed")]
    AlreadyCompleted,
    #[error("Invalid score: {0}")]
    InvalidScore(String),
    #[error("Playoff matches cannot be a draw")]
    DrawNotAllowed,
    #[error("Not all league matches have been completed ({pending} pending)")]
    LeagueIncomplete { pending: usize },
    #[error("Need at least 4 participants with standings to build a bracket (have {actual})")]
    InsufficientParticipants { actual: usize },
    #[error("The {0} round has already been created")]
    RoundAlreadyExists(PlayoffRound),
    #[error("Invalid state for this action")]
    InvalidState,
    #[error("Name cannot be empty")]
    InvalidName,
    #[error("A participant with this name already exists")]
    DuplicateParticipantName,
    #[error("Participants cannot be removed once fixtures exist")]
    ParticipantLocked(ParticipantId),
    #[error("Admin authorization required")]
    Unauthorized,
    #[error("Invalid participant import: {0}")]
    InvalidImport(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TournamentError {
    pub fn kind(&self) -> ErrorKind {
        use TournamentError::*;
        match self {
            InvalidParticipantCount { .. }
            | InvalidScore(_)
            | DrawNotAllowed
            | InvalidName
            | DuplicateParticipantName
            | InsufficientParticipants { .. }
            | InvalidImport(_) => ErrorKind::Validation,
            AlreadyGenerated
            | AlreadyCompleted
            | LeagueIncomplete { .. }
            | RoundAlreadyExists(_)
            | InvalidState
            | ParticipantLocked(_) => ErrorKind::Conflict,
            TournamentNotFound(_) | MatchNotFound | ParticipantNotFound(_) => ErrorKind::NotFound,
            Unauthorized => ErrorKind::Unauthorized,
            Store(_) => ErrorKind::Store,
        }
    }
}
