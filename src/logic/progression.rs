//! Playoff results and round advancement: quarter → semi → final → done.

use super::{check_score_range, TournamentEngine};
use crate::auth::AuthorizedContext;
use crate::error::TournamentError;
use crate::events::TournamentEvent;
use crate::models::{
    ParticipantId, Phase, PlayoffMatch, PlayoffMatchId, PlayoffRound, Side, TournamentId,
    TournamentStatus,
};
use serde::Serialize;

/// What a playoff result submission led to.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PlayoffOutcome {
    /// Winner recorded; the round is still in progress (or its successor already exists).
    Recorded { winner: ParticipantId },
    /// This result closed the round and the next one was created.
    RoundAdvanced {
        round: PlayoffRound,
        matches: Vec<PlayoffMatch>,
    },
    /// The final was decided.
    Completed { champion: ParticipantId },
}

/// Winners paired in match-number order (1 v 2, 3 v 4, ...). `None` until every match
/// of the round has a winner.
pub fn next_round_pairings(
    round_matches: &[PlayoffMatch],
) -> Option<Vec<(ParticipantId, ParticipantId)>> {
    let mut ordered: Vec<&PlayoffMatch> = round_matches.iter().collect();
    ordered.sort_by_key(|m| m.match_number);
    let winners: Vec<ParticipantId> = ordered
        .iter()
        .map(|m| if m.is_completed() { m.winner } else { None })
        .collect::<Option<_>>()?;
    if winners.len() < 2 || winners.len() % 2 != 0 {
        return None;
    }
    Some(winners.chunks_exact(2).map(|w| (w[0], w[1])).collect())
}

impl TournamentEngine {
    /// Record a playoff result; may create the next round or complete the tournament.
    ///
    /// Resubmitting a decided match finishes any round advance or completion that an
    /// earlier call left undone, and only then fails with `AlreadyCompleted`.
    pub fn submit_playoff_result(
        &self,
        _ctx: &AuthorizedContext,
        tournament_id: TournamentId,
        match_id: PlayoffMatchId,
        score1: u32,
        score2: u32,
    ) -> Result<PlayoffOutcome, TournamentError> {
        check_score_range(score1, score2)?;
        let side = Side::from_scores(score1, score2).ok_or(TournamentError::DrawNotAllowed)?;

        let m = self
            .store
            .playoff_match(match_id)?
            .filter(|m| m.tournament_id == tournament_id)
            .ok_or(TournamentError::MatchNotFound)?;
        if m.is_completed() {
            return self.resume_round(tournament_id, m.round);
        }
        let winner = m.participant(side);
        if !self
            .store
            .complete_playoff_match(match_id, score1, score2, winner)?
        {
            log::warn!("Playoff match {} was completed concurrently", match_id);
            return self.resume_round(tournament_id, m.round);
        }
        log::info!(
            "{} match #{} in tournament {} completed {}-{}",
            m.round,
            m.match_number,
            tournament_id,
            score1,
            score2
        );

        Ok(self
            .settle_round(tournament_id, m.round)?
            .unwrap_or(PlayoffOutcome::Recorded { winner }))
    }

    /// Follow-up work for a round whose matches were already decided.
    fn resume_round(
        &self,
        tournament_id: TournamentId,
        round: PlayoffRound,
    ) -> Result<PlayoffOutcome, TournamentError> {
        match self.settle_round(tournament_id, round)? {
            Some(outcome) => {
                log::info!(
                    "Finished pending {} round follow-up in tournament {}",
                    round,
                    tournament_id
                );
                Ok(outcome)
            }
            None => Err(TournamentError::AlreadyCompleted),
        }
    }

    /// Once every match of `round` is decided, create the next round or complete the
    /// tournament. `None` when the round is still open or the follow-up already happened.
    fn settle_round(
        &self,
        tournament_id: TournamentId,
        round: PlayoffRound,
    ) -> Result<Option<PlayoffOutcome>, TournamentError> {
        let round_matches: Vec<PlayoffMatch> = self
            .store
            .playoff_matches(tournament_id)?
            .into_iter()
            .filter(|x| x.round == round)
            .collect();
        if round_matches.is_empty() || !round_matches.iter().all(|x| x.is_completed()) {
            return Ok(None);
        }

        match round.next() {
            None => {
                let champion = round_matches
                    .first()
                    .and_then(|m| m.winner)
                    .ok_or(TournamentError::InvalidState)?;
                self.complete_tournament(tournament_id, champion)
            }
            Some(next) => self.advance_round(tournament_id, next, &round_matches),
        }
    }

    fn complete_tournament(
        &self,
        tournament_id: TournamentId,
        champion: ParticipantId,
    ) -> Result<Option<PlayoffOutcome>, TournamentError> {
        if !self.store.transition_tournament(
            tournament_id,
            TournamentStatus::Playoffs,
            TournamentStatus::Completed,
            Some(Phase::Final),
        )? {
            return Ok(None);
        }
        log::info!("Tournament {} completed; champion {}", tournament_id, champion);
        self.publish(TournamentEvent::TournamentCompleted {
            tournament_id,
            champion,
        });
        Ok(Some(PlayoffOutcome::Completed { champion }))
    }

    fn advance_round(
        &self,
        tournament_id: TournamentId,
        next: PlayoffRound,
        round_matches: &[PlayoffMatch],
    ) -> Result<Option<PlayoffOutcome>, TournamentError> {
        let pairings = next_round_pairings(round_matches).ok_or(TournamentError::InvalidState)?;
        let matches: Vec<PlayoffMatch> = pairings
            .into_iter()
            .zip(1u32..)
            .map(|((p1, p2), number)| PlayoffMatch::new(tournament_id, next, number, p1, p2))
            .collect();

        if !self
            .store
            .insert_playoff_round(tournament_id, next, matches.clone())?
        {
            return self.catch_up_phase(tournament_id, next);
        }
        self.store
            .set_phase(tournament_id, TournamentStatus::Playoffs, next.into())?;

        log::info!(
            "Tournament {} advanced to the {} round ({} matches)",
            tournament_id,
            next,
            matches.len()
        );
        self.publish(TournamentEvent::RoundAdvanced {
            tournament_id,
            round: next,
        });
        Ok(Some(PlayoffOutcome::RoundAdvanced {
            round: next,
            matches,
        }))
    }

    /// The `next` round exists; move the phase forward if an earlier call stopped short.
    fn catch_up_phase(
        &self,
        tournament_id: TournamentId,
        next: PlayoffRound,
    ) -> Result<Option<PlayoffOutcome>, TournamentError> {
        let tournament = self.tournament(tournament_id)?;
        let behind = match tournament.current_round() {
            Some(current) => current < next,
            None => false,
        };
        if !behind
            || !self
                .store
                .set_phase(tournament_id, TournamentStatus::Playoffs, next.into())?
        {
            log::debug!(
                "The {} round of tournament {} already exists; nothing to create",
                next,
                tournament_id
            );
            return Ok(None);
        }
        let matches: Vec<PlayoffMatch> = self
            .store
            .playoff_matches(tournament_id)?
            .into_iter()
            .filter(|m| m.round == next)
            .collect();
        log::info!("Tournament {} moved on to the {} round", tournament_id, next);
        self.publish(TournamentEvent::RoundAdvanced {
            tournament_id,
            round: next,
        });
        Ok(Some(PlayoffOutcome::RoundAdvanced {
            round: next,
            matches,
        }))
    }

    /// Winner of the final, once the tournament is completed.
    pub fn champion(
        &self,
        tournament_id: TournamentId,
    ) -> Result<Option<ParticipantId>, TournamentError> {
        let tournament = self.tournament(tournament_id)?;
        if !tournament.is_completed() {
            return Ok(None);
        }
        Ok(self
            .store
            .playoff_matches(tournament_id)?
            .into_iter()
            .find(|m| m.round == PlayoffRound::Final)
            .and_then(|m| m.winner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchStatus;
    use uuid::Uuid;

    fn decided(t: Uuid, number: u32, winner: ParticipantId) -> PlayoffMatch {
        let mut m = PlayoffMatch::new(t, PlayoffRound::Quarter, number, winner, Uuid::new_v4());
        m.winner = Some(winner);
        m.status = MatchStatus::Completed;
        m
    }

    #[test]
    fn winners_pair_in_match_number_order() {
        let t = Uuid::new_v4();
        let w: Vec<_> = (0..4).map(|_| Uuid::new_v4()).collect();
        // Deliberately shuffled input.
        let round = vec![
            decided(t, 3, w[2]),
            decided(t, 1, w[0]),
            decided(t, 4, w[3]),
            decided(t, 2, w[1]),
        ];
        assert_eq!(
            next_round_pairings(&round),
            Some(vec![(w[0], w[1]), (w[2], w[3])])
        );
    }

    #[test]
    fn no_pairings_while_a_match_is_pending() {
        let t = Uuid::new_v4();
        let mut round = vec![decided(t, 1, Uuid::new_v4()), decided(t, 2, Uuid::new_v4())];
        round[1].status = MatchStatus::Pending;
        round[1].winner = None;
        assert_eq!(next_round_pairings(&round), None);
    }
}
