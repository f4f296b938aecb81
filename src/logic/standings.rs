//! League results: single-result application and full recomputation of standings.
//!
//! Completed league matches are the source of truth; standings rows are a running
//! sum over them. Because the sum is commutative, replaying the completed matches in
//! any order gives the same rows as applying them one by one.

use super::{check_score_range, TournamentEngine};
use crate::auth::AuthorizedContext;
use crate::error::TournamentError;
use crate::events::TournamentEvent;
use crate::models::{
    LeagueMatch, LeagueMatchId, ParticipantId, Side, StandingsDelta, StandingsRecord,
    TournamentId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// What an equal-score league result means.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeagueDrawPolicy {
    /// Equal scores are rejected with `InvalidScore`.
    #[default]
    Reject,
    /// Equal scores count as a win for participant 2.
    Participant2Wins,
}

impl LeagueDrawPolicy {
    /// Winning side for a submitted league result.
    pub fn decide(self, score1: u32, score2: u32) -> Result<Side, TournamentError> {
        match (Side::from_scores(score1, score2), self) {
            (Some(side), _) => Ok(side),
            (None, LeagueDrawPolicy::Participant2Wins) => Ok(Side::Two),
            (None, LeagueDrawPolicy::Reject) => Err(TournamentError::InvalidScore(format!(
                "league matches cannot end level ({}-{})",
                score1, score2
            ))),
        }
    }
}

impl FromStr for LeagueDrawPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(LeagueDrawPolicy::Reject),
            "participant2_wins" => Ok(LeagueDrawPolicy::Participant2Wins),
            other => Err(format!("unknown league draw policy: {}", other)),
        }
    }
}

/// Winning side of an already completed match. A stored level score can only come from
/// the `Participant2Wins` policy (or a manual edit) and is read the same way.
fn completed_side(score1: u32, score2: u32) -> Side {
    Side::from_scores(score1, score2).unwrap_or(Side::Two)
}

/// Standings deltas for participant 1 and participant 2.
pub fn result_deltas(score1: u32, score2: u32, winner: Side) -> (StandingsDelta, StandingsDelta) {
    (
        StandingsDelta {
            won: winner == Side::One,
            crowns_for: score1,
            crowns_against: score2,
        },
        StandingsDelta {
            won: winner == Side::Two,
            crowns_for: score2,
            crowns_against: score1,
        },
    )
}

/// Zero `records`, then add every completed match in ascending `match_number`.
///
/// Participants referenced by a match but missing from `records` get a fresh record.
pub fn replay_standings(
    tournament_id: TournamentId,
    mut records: Vec<StandingsRecord>,
    matches: &[LeagueMatch],
) -> Vec<StandingsRecord> {
    for r in &mut records {
        r.reset();
    }
    let mut index: HashMap<ParticipantId, usize> = records
        .iter()
        .enumerate()
        .map(|(i, r)| (r.participant_id, i))
        .collect();

    let mut completed: Vec<&LeagueMatch> = matches.iter().filter(|m| m.is_completed()).collect();
    completed.sort_by_key(|m| m.match_number);

    for m in completed {
        let Some((s1, s2)) = m.scores() else { continue };
        let (d1, d2) = result_deltas(s1, s2, completed_side(s1, s2));
        for (participant, delta) in [(m.participant1, d1), (m.participant2, d2)] {
            let i = *index.entry(participant).or_insert_with(|| {
                records.push(StandingsRecord::new(tournament_id, participant));
                records.len() - 1
            });
            records[i].apply(delta);
        }
    }
    records
}

impl TournamentEngine {
    /// Record a league result and add it to both participants' standings.
    ///
    /// The pending -> completed flip is done first and guards against double counting;
    /// if the standings writes after it fail, `recalculate_standings` repairs them.
    pub fn submit_league_result(
        &self,
        _ctx: &AuthorizedContext,
        tournament_id: TournamentId,
        match_id: LeagueMatchId,
        score1: u32,
        score2: u32,
    ) -> Result<LeagueMatch, TournamentError> {
        check_score_range(score1, score2)?;
        let winner = self.settings.league_draw_policy.decide(score1, score2)?;

        let m = self
            .store
            .league_match(match_id)?
            .filter(|m| m.tournament_id == tournament_id)
            .ok_or(TournamentError::MatchNotFound)?;
        if m.is_completed() {
            return Err(TournamentError::AlreadyCompleted);
        }
        if !self.store.complete_league_match(match_id, score1, score2)? {
            log::warn!("League match {} was completed concurrently", match_id);
            return Err(TournamentError::AlreadyCompleted);
        }

        let (d1, d2) = result_deltas(score1, score2, winner);
        let applied1 = self
            .store
            .apply_standings_delta(tournament_id, m.participant1, d1)?;
        let applied2 = self
            .store
            .apply_standings_delta(tournament_id, m.participant2, d2)?;
        if !(applied1 && applied2) {
            log::warn!(
                "Standings row missing for league match {}; recomputing tournament {}",
                match_id,
                tournament_id
            );
            self.rebuild_standings(tournament_id)?;
        }

        log::info!(
            "League match #{} in tournament {} completed {}-{}",
            m.match_number,
            tournament_id,
            score1,
            score2
        );
        self.publish(TournamentEvent::StandingsChanged { tournament_id });
        self.store
            .league_match(match_id)?
            .ok_or(TournamentError::MatchNotFound)
    }

    /// Rebuild every standings row from the completed league matches. Idempotent.
    pub fn recalculate_standings(
        &self,
        _ctx: &AuthorizedContext,
        tournament_id: TournamentId,
    ) -> Result<Vec<StandingsRecord>, TournamentError> {
        self.tournament(tournament_id)?;
        let records = self.rebuild_standings(tournament_id)?;
        log::info!(
            "Recalculated standings for {} participants in tournament {}",
            records.len(),
            tournament_id
        );
        self.publish(TournamentEvent::StandingsChanged { tournament_id });
        Ok(records)
    }

    /// Replay and write back; returns rows in participant seed order.
    fn rebuild_standings(
        &self,
        tournament_id: TournamentId,
    ) -> Result<Vec<StandingsRecord>, TournamentError> {
        let records = self.replayed_standings(tournament_id)?;
        for record in &records {
            self.store.upsert_standings(record)?;
        }
        Ok(records)
    }

    /// What the standings rows should be, without writing anything.
    pub(super) fn replayed_standings(
        &self,
        tournament_id: TournamentId,
    ) -> Result<Vec<StandingsRecord>, TournamentError> {
        let mut existing: HashMap<ParticipantId, StandingsRecord> = self
            .store
            .standings(tournament_id)?
            .into_iter()
            .map(|r| (r.participant_id, r))
            .collect();
        let records: Vec<StandingsRecord> = self
            .store
            .participants(tournament_id)?
            .iter()
            .map(|p| {
                existing
                    .remove(&p.id)
                    .unwrap_or_else(|| StandingsRecord::new(tournament_id, p.id))
            })
            .collect();
        let matches = self.store.league_matches(tournament_id)?;
        Ok(replay_standings(tournament_id, records, &matches))
    }
}
