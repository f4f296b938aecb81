//! Playoff bracket: seeding the ranked qualifiers into the opening round.

use super::qualifiers::{rank_standings, select_qualifiers};
use super::TournamentEngine;
use crate::auth::AuthorizedContext;
use crate::error::TournamentError;
use crate::events::TournamentEvent;
use crate::models::{PlayoffMatch, PlayoffRound, TournamentId, TournamentStatus};

/// Seeds in bracket slot order for a power-of-two `size`.
///
/// Built by repeatedly replacing each seed `s` with `s, m + 1 - s` where `m` is the doubled
/// size, so seeds 1 and 2 only meet in the final: 8 → `[1, 8, 4, 5, 2, 7, 3, 6]`.
pub fn bracket_order(size: usize) -> Vec<usize> {
    let mut order = vec![1];
    while order.len() < size {
        let m = order.len() * 2;
        order = order.iter().flat_map(|&s| [s, m + 1 - s]).collect();
    }
    order
}

/// 1-based rank pairs for the opening round, in match-number order.
pub fn opening_pairings(qualifiers: usize) -> Vec<(usize, usize)> {
    bracket_order(qualifiers)
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect()
}

impl TournamentEngine {
    /// Seed the top of the league table into the opening playoff round and move the
    /// tournament from League to Playoffs.
    pub fn generate_playoff_bracket(
        &self,
        _ctx: &AuthorizedContext,
        tournament_id: TournamentId,
    ) -> Result<Vec<PlayoffMatch>, TournamentError> {
        let tournament = self.tournament(tournament_id)?;
        match tournament.status {
            TournamentStatus::League => {}
            TournamentStatus::Playoffs | TournamentStatus::Completed => {
                let existing = self.store.playoff_matches(tournament_id)?;
                return Err(match existing.first() {
                    Some(first) => TournamentError::RoundAlreadyExists(first.round),
                    None => TournamentError::InvalidState,
                });
            }
            TournamentStatus::Setup => return Err(TournamentError::InvalidState),
        }

        // An earlier call wrote the opening round but stopped before the status change.
        if let Some(first) = self.store.playoff_matches(tournament_id)?.first() {
            self.start_playoffs(tournament_id, first.round)?;
            return Err(TournamentError::RoundAlreadyExists(first.round));
        }

        let league = self.store.league_matches(tournament_id)?;
        let pending = league.iter().filter(|m| !m.is_completed()).count();
        if league.is_empty() || pending > 0 {
            return Err(TournamentError::LeagueIncomplete { pending });
        }

        // Standings feed the seeding, so make sure they match the results first.
        let stored = self.store.standings(tournament_id)?;
        let replayed = self.replayed_standings(tournament_id)?;
        let records = if replayed.iter().all(|r| stored.contains(r)) {
            stored
        } else {
            log::warn!(
                "Standings for tournament {} were out of date; rebuilding before seeding",
                tournament_id
            );
            for record in &replayed {
                self.store.upsert_standings(record)?;
            }
            replayed
        };

        let participants = self.store.participants(tournament_id)?;
        let ranked = rank_standings(records, &participants);
        let qualifiers = select_qualifiers(&ranked)?;
        let round =
            PlayoffRound::opening(qualifiers.len()).ok_or(TournamentError::InvalidState)?;

        let matches: Vec<PlayoffMatch> = opening_pairings(qualifiers.len())
            .into_iter()
            .zip(1u32..)
            .map(|((high, low), number)| {
                PlayoffMatch::new(
                    tournament_id,
                    round,
                    number,
                    qualifiers[high - 1].participant.id,
                    qualifiers[low - 1].participant.id,
                )
            })
            .collect();

        if !self
            .store
            .insert_playoff_round(tournament_id, round, matches.clone())?
        {
            self.start_playoffs(tournament_id, round)?;
            return Err(TournamentError::RoundAlreadyExists(round));
        }
        if !self.start_playoffs(tournament_id, round)? {
            log::warn!(
                "Tournament {} left the league phase while its bracket was being built",
                tournament_id
            );
        }
        log::info!(
            "Playoffs started in tournament {} with {} qualifiers",
            tournament_id,
            qualifiers.len()
        );
        Ok(matches)
    }

    /// League -> Playoffs with `round` as the current phase. `false` if the tournament
    /// was no longer in the league.
    fn start_playoffs(
        &self,
        tournament_id: TournamentId,
        round: PlayoffRound,
    ) -> Result<bool, TournamentError> {
        if !self.store.transition_tournament(
            tournament_id,
            TournamentStatus::League,
            TournamentStatus::Playoffs,
            Some(round.into()),
        )? {
            return Ok(false);
        }
        log::info!(
            "Tournament {} entered the playoffs at the {} round",
            tournament_id,
            round
        );
        self.publish(TournamentEvent::PlayoffsStarted {
            tournament_id,
            round,
        });
        Ok(true)
    }
}
