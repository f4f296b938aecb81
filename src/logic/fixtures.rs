//! League stage: round-robin fixture generation.

use super::{TournamentEngine, MIN_PARTICIPANTS};
use crate::auth::AuthorizedContext;
use crate::error::TournamentError;
use crate::events::TournamentEvent;
use crate::models::{
    LeagueMatch, ParticipantId, Phase, StandingsRecord, TournamentId, TournamentStatus,
};

/// Every unordered index pair `(i, j)` with `i < j`, in lexicographic order.
///
/// Position `k` in the result is fixture number `k + 1`.
pub fn round_robin_pairs(n: usize) -> Vec<(usize, usize)> {
    let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in i + 1..n {
            pairs.push((i, j));
        }
    }
    pairs
}

/// Fixtures and zeroed standings for `participants`, in the order given.
pub fn build_fixtures(
    tournament_id: TournamentId,
    participants: &[ParticipantId],
) -> Result<(Vec<LeagueMatch>, Vec<StandingsRecord>), TournamentError> {
    if participants.len() < MIN_PARTICIPANTS {
        return Err(TournamentError::InvalidParticipantCount {
            min: MIN_PARTICIPANTS,
            max: usize::MAX,
            actual: participants.len(),
        });
    }
    let matches = round_robin_pairs(participants.len())
        .into_iter()
        .zip(1u32..)
        .map(|((i, j), number)| {
            LeagueMatch::new(tournament_id, number, participants[i], participants[j])
        })
        .collect();
    let standings = participants
        .iter()
        .map(|&p| StandingsRecord::new(tournament_id, p))
        .collect();
    Ok((matches, standings))
}

impl TournamentEngine {
    /// Generate the round-robin league and move the tournament from Setup to League.
    ///
    /// Fixtures follow the participants' seed order. Fails with `AlreadyGenerated` if any
    /// league match exists; an earlier call that stopped before the status change is
    /// finished off first.
    pub fn generate_fixtures(
        &self,
        _ctx: &AuthorizedContext,
        tournament_id: TournamentId,
    ) -> Result<Vec<LeagueMatch>, TournamentError> {
        let tournament = self.tournament(tournament_id)?;
        if tournament.status != TournamentStatus::Setup {
            return if self.store.league_matches(tournament_id)?.is_empty() {
                Err(TournamentError::InvalidState)
            } else {
                Err(TournamentError::AlreadyGenerated)
            };
        }

        let participants = self.store.participants(tournament_id)?;
        let max = self.settings.max_participants;
        if participants.len() < MIN_PARTICIPANTS || participants.len() > max {
            return Err(TournamentError::InvalidParticipantCount {
                min: MIN_PARTICIPANTS,
                max,
                actual: participants.len(),
            });
        }
        let ids: Vec<ParticipantId> = participants.iter().map(|p| p.id).collect();
        let (matches, standings) = build_fixtures(tournament_id, &ids)?;

        let inserted =
            self.store
                .insert_league_fixtures(tournament_id, matches.clone(), standings)?;
        // Finish the status change even when the batch was already there.
        self.store.transition_tournament(
            tournament_id,
            TournamentStatus::Setup,
            TournamentStatus::League,
            Some(Phase::League),
        )?;
        if !inserted {
            log::debug!("Fixtures for tournament {} already exist", tournament_id);
            return Err(TournamentError::AlreadyGenerated);
        }

        log::info!(
            "Generated {} league fixtures for {} participants in tournament {}",
            matches.len(),
            ids.len(),
            tournament_id
        );
        self.publish(TournamentEvent::FixturesGenerated {
            tournament_id,
            matches: matches.len(),
        });
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn pairs_cover_each_unordered_pair_once() {
        for n in 0..=12 {
            let pairs = round_robin_pairs(n);
            assert_eq!(pairs.len(), n * n.saturating_sub(1) / 2);
            let unique: HashSet<_> = pairs.iter().copied().collect();
            assert_eq!(unique.len(), pairs.len());
            assert!(pairs.iter().all(|&(i, j)| i < j && j < n));
        }
    }

    #[test]
    fn pairs_are_lexicographic() {
        assert_eq!(
            round_robin_pairs(4),
            vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]
        );
    }

    #[test]
    fn build_fixtures_requires_four() {
        let ids: Vec<_> = (0..3).map(|_| uuid::Uuid::new_v4()).collect();
        assert!(matches!(
            build_fixtures(uuid::Uuid::new_v4(), &ids),
            Err(TournamentError::InvalidParticipantCount { actual: 3, .. })
        ));
    }
}
