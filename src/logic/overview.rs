//! Read-side views: matches joined with participant names, the bracket by round,
//! per-participant fixture history and the tournament list.

use super::qualifiers::{rank_standings, RankedStanding};
use super::TournamentEngine;
use crate::error::TournamentError;
use crate::models::{
    LeagueMatch, Participant, ParticipantId, PlayoffMatch, PlayoffRound, Tournament,
    TournamentId,
};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Clone, Debug, Serialize)]
pub struct LeagueMatchView {
    #[serde(flatten)]
    pub fixture: LeagueMatch,
    pub participant1_name: String,
    pub participant2_name: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayoffMatchView {
    #[serde(flatten)]
    pub fixture: PlayoffMatch,
    pub participant1_name: String,
    pub participant2_name: String,
    pub winner_name: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct BracketRound {
    pub round: PlayoffRound,
    pub matches: Vec<PlayoffMatchView>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct LeagueProgress {
    pub completed: usize,
    pub total: usize,
}

/// Everything a dashboard needs to draw one tournament.
#[derive(Clone, Debug, Serialize)]
pub struct TournamentSnapshot {
    pub tournament: Tournament,
    pub participants: Vec<Participant>,
    pub league_matches: Vec<LeagueMatchView>,
    pub standings: Vec<RankedStanding>,
    pub league_progress: LeagueProgress,
    pub bracket: Vec<BracketRound>,
    pub champion: Option<Participant>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    Win,
    Loss,
    Draw,
}

/// One league fixture from a single participant's point of view.
#[derive(Clone, Debug, Serialize)]
pub struct HistoryEntry {
    pub match_number: u32,
    pub opponent: Participant,
    pub own_score: Option<u32>,
    pub opponent_score: Option<u32>,
    pub outcome: Option<MatchOutcome>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ParticipantHistory {
    pub participant: Participant,
    pub played: Vec<HistoryEntry>,
    pub remaining: Vec<HistoryEntry>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct TournamentList {
    pub active: Vec<Tournament>,
    pub completed: Vec<Tournament>,
}

fn name_of(names: &HashMap<ParticipantId, &Participant>, id: ParticipantId) -> String {
    names
        .get(&id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

impl TournamentEngine {
    pub fn list_tournaments(&self) -> Result<TournamentList, TournamentError> {
        let (completed, active): (Vec<Tournament>, Vec<Tournament>) = self
            .store
            .tournaments()?
            .into_iter()
            .partition(|t| t.is_completed());
        Ok(TournamentList { active, completed })
    }

    pub fn tournament_snapshot(
        &self,
        tournament_id: TournamentId,
    ) -> Result<TournamentSnapshot, TournamentError> {
        let tournament = self.tournament(tournament_id)?;
        let participants = self.store.participants(tournament_id)?;
        let names: HashMap<ParticipantId, &Participant> =
            participants.iter().map(|p| (p.id, p)).collect();

        let league = self.store.league_matches(tournament_id)?;
        let league_progress = LeagueProgress {
            completed: league.iter().filter(|m| m.is_completed()).count(),
            total: league.len(),
        };
        let league_matches = league
            .into_iter()
            .map(|m| LeagueMatchView {
                participant1_name: name_of(&names, m.participant1),
                participant2_name: name_of(&names, m.participant2),
                fixture: m,
            })
            .collect();

        let mut bracket: Vec<BracketRound> = Vec::new();
        for m in self.store.playoff_matches(tournament_id)? {
            let view = PlayoffMatchView {
                participant1_name: name_of(&names, m.participant1),
                participant2_name: name_of(&names, m.participant2),
                winner_name: m.winner.map(|w| name_of(&names, w)),
                fixture: m,
            };
            match bracket.last_mut() {
                Some(last) if last.round == view.fixture.round => last.matches.push(view),
                _ => bracket.push(BracketRound {
                    round: view.fixture.round,
                    matches: vec![view],
                }),
            }
        }

        let champion = if tournament.is_completed() {
            bracket
                .iter()
                .find(|r| r.round == PlayoffRound::Final)
                .and_then(|r| r.matches.first())
                .and_then(|m| m.fixture.winner)
                .and_then(|w| names.get(&w).map(|p| (*p).clone()))
        } else {
            None
        };

        let standings = rank_standings(self.store.standings(tournament_id)?, &participants);

        Ok(TournamentSnapshot {
            tournament,
            league_matches,
            standings,
            league_progress,
            bracket,
            champion,
            participants,
        })
    }

    /// League fixtures of one participant, split into played and remaining.
    pub fn participant_history(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
    ) -> Result<ParticipantHistory, TournamentError> {
        let participants = self.store.participants(tournament_id)?;
        let by_id: HashMap<ParticipantId, &Participant> =
            participants.iter().map(|p| (p.id, p)).collect();
        let participant = by_id
            .get(&participant_id)
            .map(|p| (*p).clone())
            .ok_or(TournamentError::ParticipantNotFound(participant_id))?;

        let mut played = Vec::new();
        let mut remaining = Vec::new();
        for m in self.store.league_matches(tournament_id)? {
            if !m.involves(participant_id) {
                continue;
            }
            let is_first = m.participant1 == participant_id;
            let opponent_id = if is_first { m.participant2 } else { m.participant1 };
            let Some(opponent) = by_id.get(&opponent_id).map(|p| (*p).clone()) else {
                continue;
            };
            let (own, theirs) = if is_first {
                (m.participant1_score, m.participant2_score)
            } else {
                (m.participant2_score, m.participant1_score)
            };
            let outcome = m.scores().map(|_| match own.cmp(&theirs) {
                std::cmp::Ordering::Greater => MatchOutcome::Win,
                std::cmp::Ordering::Less => MatchOutcome::Loss,
                std::cmp::Ordering::Equal => MatchOutcome::Draw,
            });
            let entry = HistoryEntry {
                match_number: m.match_number,
                opponent,
                own_score: own,
                opponent_score: theirs,
                outcome,
            };
            if m.is_completed() {
                played.push(entry);
            } else {
                remaining.push(entry);
            }
        }
        Ok(ParticipantHistory {
            participant,
            played,
            remaining,
        })
    }
}
