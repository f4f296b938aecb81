//! Ranking the league table and choosing who goes through to the playoffs.

use super::{TournamentEngine, MIN_PARTICIPANTS};
use crate::error::TournamentError;
use crate::models::{Participant, StandingsRecord, TournamentId};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// A standings row with its participant and 1-based league position.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RankedStanding {
    pub rank: usize,
    pub participant: Participant,
    pub record: StandingsRecord,
}

/// Bracket size for a league of `total` participants: 4–7 → 4, 8–15 → 8, 16+ → 16.
pub fn qualifier_count(total: usize) -> Option<usize> {
    match total {
        n if n < MIN_PARTICIPANTS => None,
        0..=7 => Some(4),
        8..=15 => Some(8),
        _ => Some(16),
    }
}

/// Points desc, crown difference desc, crowns scored desc, then seed position.
fn compare(a: &(Participant, StandingsRecord), b: &(Participant, StandingsRecord)) -> Ordering {
    let (pa, ra) = a;
    let (pb, rb) = b;
    rb.points
        .cmp(&ra.points)
        .then(rb.crown_difference.cmp(&ra.crown_difference))
        .then(rb.crowns_for.cmp(&ra.crowns_for))
        .then(
            pa.seed_position
                .unwrap_or(u32::MAX)
                .cmp(&pb.seed_position.unwrap_or(u32::MAX)),
        )
        .then(pa.id.cmp(&pb.id))
}

/// Join standings with participants and sort into league order. Records without a
/// matching participant are dropped.
pub fn rank_standings(
    records: Vec<StandingsRecord>,
    participants: &[Participant],
) -> Vec<RankedStanding> {
    let by_id: HashMap<_, _> = participants.iter().map(|p| (p.id, p)).collect();
    let mut joined: Vec<(Participant, StandingsRecord)> = records
        .into_iter()
        .filter_map(|r| by_id.get(&r.participant_id).map(|p| ((*p).clone(), r)))
        .collect();
    joined.sort_by(compare);
    joined
        .into_iter()
        .enumerate()
        .map(|(i, (participant, record))| RankedStanding {
            rank: i + 1,
            participant,
            record,
        })
        .collect()
}

/// The top of the table, sized by [`qualifier_count`].
pub fn select_qualifiers(ranked: &[RankedStanding]) -> Result<&[RankedStanding], TournamentError> {
    let count = qualifier_count(ranked.len()).ok_or(TournamentError::InsufficientParticipants {
        actual: ranked.len(),
    })?;
    Ok(&ranked[..count])
}

impl TournamentEngine {
    /// The league table in ranking order.
    pub fn standings_table(
        &self,
        tournament_id: TournamentId,
    ) -> Result<Vec<RankedStanding>, TournamentError> {
        self.tournament(tournament_id)?;
        let participants = self.store.participants(tournament_id)?;
        let records = self.store.standings(tournament_id)?;
        Ok(rank_standings(records, &participants))
    }

    /// Participants who would reach the playoffs if the league ended now.
    pub fn qualifiers(
        &self,
        tournament_id: TournamentId,
    ) -> Result<Vec<RankedStanding>, TournamentError> {
        let table = self.standings_table(tournament_id)?;
        Ok(select_qualifiers(&table)?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn qualifier_counts() {
        assert_eq!(qualifier_count(3), None);
        assert_eq!(qualifier_count(4), Some(4));
        assert_eq!(qualifier_count(5), Some(4));
        assert_eq!(qualifier_count(7), Some(4));
        assert_eq!(qualifier_count(8), Some(8));
        assert_eq!(qualifier_count(12), Some(8));
        assert_eq!(qualifier_count(15), Some(8));
        assert_eq!(qualifier_count(16), Some(16));
        assert_eq!(qualifier_count(20), Some(16));
        assert_eq!(qualifier_count(32), Some(16));
    }

    fn entry(t: Uuid, seed: u32, points: u32, diff: i64, crowns_for: u32) -> (Participant, StandingsRecord) {
        let p = Participant::new(t, format!("P{seed}"), None, Some(seed));
        let mut r = StandingsRecord::new(t, p.id);
        r.points = points;
        r.wins = points / 3;
        r.crown_difference = diff;
        r.crowns_for = crowns_for;
        (p, r)
    }

    #[test]
    fn ranks_by_points_then_crown_difference_then_seed() {
        let t = Uuid::new_v4();
        let entries = vec![
            entry(t, 1, 3, 1, 2),
            entry(t, 2, 6, -1, 4),
            entry(t, 3, 3, 4, 5),
            entry(t, 4, 3, 1, 2),
        ];
        let participants: Vec<_> = entries.iter().map(|(p, _)| p.clone()).collect();
        let records: Vec<_> = entries.into_iter().map(|(_, r)| r).collect();

        let ranked = rank_standings(records, &participants);
        let seeds: Vec<_> = ranked.iter().map(|r| r.participant.seed_position.unwrap()).collect();
        assert_eq!(seeds, vec![2, 3, 1, 4]);
        assert_eq!(ranked.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn too_few_for_a_bracket() {
        let t = Uuid::new_v4();
        let entries: Vec<_> = (1..=3).map(|s| entry(t, s, 0, 0, 0)).collect();
        let participants: Vec<_> = entries.iter().map(|(p, _)| p.clone()).collect();
        let ranked = rank_standings(entries.into_iter().map(|(_, r)| r).collect(), &participants);
        assert_eq!(
            select_qualifiers(&ranked).unwrap_err(),
            TournamentError::InsufficientParticipants { actual: 3 }
        );
    }
}
