//! Per-participant league standings aggregate.

use crate::models::participant::ParticipantId;
use crate::models::tournament::TournamentId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type StandingsRecordId = Uuid;

/// League points for a win. Losses and unplayed matches score nothing.
pub const POINTS_PER_WIN: u32 = 3;

/// Running league totals for one participant in one tournament.
///
/// Invariants: `wins + losses == games_played`, `points == 3 * wins`,
/// `crown_difference == crowns_for - crowns_against`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StandingsRecord {
    pub id: StandingsRecordId,
    pub tournament_id: TournamentId,
    pub participant_id: ParticipantId,
    pub wins: u32,
    pub losses: u32,
    pub points: u32,
    pub games_played: u32,
    pub crowns_for: u32,
    pub crowns_against: u32,
    pub crown_difference: i64,
}

/// One participant's share of a single completed match.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StandingsDelta {
    pub won: bool,
    pub crowns_for: u32,
    pub crowns_against: u32,
}

impl StandingsRecord {
    /// Zeroed record for a participant.
    pub fn new(tournament_id: TournamentId, participant_id: ParticipantId) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            participant_id,
            wins: 0,
            losses: 0,
            points: 0,
            games_played: 0,
            crowns_for: 0,
            crowns_against: 0,
            crown_difference: 0,
        }
    }

    /// Add one match to the totals. Counters saturate rather than wrap.
    pub fn apply(&mut self, delta: StandingsDelta) {
        if delta.won {
            self.wins = self.wins.saturating_add(1);
            self.points = self.points.saturating_add(POINTS_PER_WIN);
        } else {
            self.losses = self.losses.saturating_add(1);
        }
        self.games_played = self.games_played.saturating_add(1);
        self.crowns_for = self.crowns_for.saturating_add(delta.crowns_for);
        self.crowns_against = self.crowns_against.saturating_add(delta.crowns_against);
        self.crown_difference = i64::from(self.crowns_for) - i64::from(self.crowns_against);
    }

    /// Zero every counter, keeping identity.
    pub fn reset(&mut self) {
        *self = Self {
            id: self.id,
            ..Self::new(self.tournament_id, self.participant_id)
        };
    }

    pub fn is_consistent(&self) -> bool {
        self.wins + self.losses == self.games_played
            && self.points == POINTS_PER_WIN * self.wins
            && self.crown_difference == i64::from(self.crowns_for) - i64::from(self.crowns_against)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_win_and_loss() {
        let mut r = StandingsRecord::new(Uuid::new_v4(), Uuid::new_v4());
        r.apply(StandingsDelta { won: true, crowns_for: 3, crowns_against: 1 });
        r.apply(StandingsDelta { won: false, crowns_for: 0, crowns_against: 2 });
        assert_eq!(r.wins, 1);
        assert_eq!(r.losses, 1);
        assert_eq!(r.points, 3);
        assert_eq!(r.games_played, 2);
        assert_eq!(r.crown_difference, 0);
        assert!(r.is_consistent());
    }

    #[test]
    fn reset_keeps_identity() {
        let mut r = StandingsRecord::new(Uuid::new_v4(), Uuid::new_v4());
        let id = r.id;
        r.apply(StandingsDelta { won: true, crowns_for: 1, crowns_against: 0 });
        r.reset();
        assert_eq!(r.id, id);
        assert_eq!(r.games_played, 0);
        assert_eq!(r.points, 0);
    }

    #[test]
    fn huge_crowns_saturate_instead_of_overflowing() {
        let mut r = StandingsRecord::new(Uuid::new_v4(), Uuid::new_v4());
        let big = StandingsDelta { won: true, crowns_for: 3_000_000_000, crowns_against: 0 };
        r.apply(big);
        r.apply(big);
        assert_eq!(r.crowns_for, u32::MAX);
        assert_eq!(r.crown_difference, i64::from(u32::MAX));
        assert_eq!(r.wins, 2);
    }
}
