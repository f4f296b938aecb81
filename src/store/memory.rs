//! In-memory `DataStore`: one `RwLock` over plain vectors. Each method takes the lock once,
//! which gives the per-row (and per-batch) atomicity the engine relies on.

use super::{DataStore, ParticipantPatch, TournamentPatch};
use crate::error::StoreError;
use crate::models::{
    LeagueMatch, LeagueMatchId, MatchStatus, Participant, ParticipantId, Phase, PlayoffMatch,
    PlayoffMatchId, PlayoffRound, StandingsDelta, StandingsRecord, Tournament, TournamentId,
    TournamentStatus,
};
use chrono::Utc;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Tables {
    tournaments: Vec<Tournament>,
    participants: Vec<Participant>,
    league_matches: Vec<LeagueMatch>,
    standings: Vec<StandingsRecord>,
    playoff_matches: Vec<PlayoffMatch>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables.write().map_err(|_| StoreError::LockPoisoned)
    }
}

impl DataStore for MemoryStore {
    fn insert_tournament(&self, tournament: Tournament) -> Result<(), StoreError> {
        self.write()?.tournaments.push(tournament);
        Ok(())
    }

    fn tournament(&self, id: TournamentId) -> Result<Option<Tournament>, StoreError> {
        Ok(self.read()?.tournaments.iter().find(|t| t.id == id).cloned())
    }

    fn tournaments(&self) -> Result<Vec<Tournament>, StoreError> {
        let mut all = self.read()?.tournaments.clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    fn update_tournament(
        &self,
        id: TournamentId,
        patch: &TournamentPatch,
    ) -> Result<Option<Tournament>, StoreError> {
        let mut g = self.write()?;
        let Some(t) = g.tournaments.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &patch.name {
            t.name = name.clone();
        }
        if let Some(description) = &patch.description {
            t.description = description.clone();
        }
        if let Some(rules) = &patch.rules {
            t.rules = rules.clone();
        }
        t.updated_at = Utc::now();
        Ok(Some(t.clone()))
    }

    fn transition_tournament(
        &self,
        id: TournamentId,
        expected: TournamentStatus,
        status: TournamentStatus,
        phase: Option<Phase>,
    ) -> Result<bool, StoreError> {
        let mut g = self.write()?;
        match g.tournaments.iter_mut().find(|t| t.id == id) {
            Some(t) if t.status == expected => {
                t.status = status;
                t.current_phase = phase;
                t.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn set_phase(
        &self,
        id: TournamentId,
        expected: TournamentStatus,
        phase: Phase,
    ) -> Result<bool, StoreError> {
        let mut g = self.write()?;
        match g.tournaments.iter_mut().find(|t| t.id == id) {
            Some(t) if t.status == expected => {
                t.current_phase = Some(phase);
                t.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn delete_tournament(&self, id: TournamentId) -> Result<bool, StoreError> {
        let mut g = self.write()?;
        let before = g.tournaments.len();
        g.tournaments.retain(|t| t.id != id);
        if g.tournaments.len() == before {
            return Ok(false);
        }
        g.participants.retain(|p| p.tournament_id != id);
        g.league_matches.retain(|m| m.tournament_id != id);
        g.standings.retain(|s| s.tournament_id != id);
        g.playoff_matches.retain(|m| m.tournament_id != id);
        Ok(true)
    }

    fn insert_participants(&self, participants: Vec<Participant>) -> Result<(), StoreError> {
        self.write()?.participants.extend(participants);
        Ok(())
    }

    fn participants(&self, tournament_id: TournamentId) -> Result<Vec<Participant>, StoreError> {
        let mut list: Vec<Participant> = self
            .read()?
            .participants
            .iter()
            .filter(|p| p.tournament_id == tournament_id)
            .cloned()
            .collect();
        // Stable: insertion order breaks seed ties.
        list.sort_by_key(|p| p.seed_position.unwrap_or(u32::MAX));
        Ok(list)
    }

    fn participant(&self, id: ParticipantId) -> Result<Option<Participant>, StoreError> {
        Ok(self.read()?.participants.iter().find(|p| p.id == id).cloned())
    }

    fn update_participant(
        &self,
        id: ParticipantId,
        patch: &ParticipantPatch,
    ) -> Result<Option<Participant>, StoreError> {
        let mut g = self.write()?;
        let Some(p) = g.participants.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &patch.name {
            p.name = name.clone();
        }
        if let Some(tag) = &patch.tag {
            p.tag = tag.clone();
        }
        Ok(Some(p.clone()))
    }

    fn delete_participant(&self, id: ParticipantId) -> Result<bool, StoreError> {
        let mut g = self.write()?;
        let before = g.participants.len();
        g.participants.retain(|p| p.id != id);
        g.standings.retain(|s| s.participant_id != id);
        Ok(g.participants.len() != before)
    }

    fn insert_league_fixtures(
        &self,
        tournament_id: TournamentId,
        matches: Vec<LeagueMatch>,
        standings: Vec<StandingsRecord>,
    ) -> Result<bool, StoreError> {
        let mut g = self.write()?;
        if g.league_matches.iter().any(|m| m.tournament_id == tournament_id) {
            return Ok(false);
        }
        g.league_matches.extend(matches);
        for record in standings {
            let exists = g.standings.iter().any(|s| {
                s.tournament_id == record.tournament_id && s.participant_id == record.participant_id
            });
            if !exists {
                g.standings.push(record);
            }
        }
        Ok(true)
    }

    fn league_matches(&self, tournament_id: TournamentId) -> Result<Vec<LeagueMatch>, StoreError> {
        let mut list: Vec<LeagueMatch> = self
            .read()?
            .league_matches
            .iter()
            .filter(|m| m.tournament_id == tournament_id)
            .cloned()
            .collect();
        list.sort_by_key(|m| m.match_number);
        Ok(list)
    }

    fn league_match(&self, id: LeagueMatchId) -> Result<Option<LeagueMatch>, StoreError> {
        Ok(self.read()?.league_matches.iter().find(|m| m.id == id).cloned())
    }

    fn complete_league_match(
        &self,
        id: LeagueMatchId,
        participant1_score: u32,
        participant2_score: u32,
    ) -> Result<bool, StoreError> {
        let mut g = self.write()?;
        match g.league_matches.iter_mut().find(|m| m.id == id) {
            Some(m) if m.status == MatchStatus::Pending => {
                m.participant1_score = Some(participant1_score);
                m.participant2_score = Some(participant2_score);
                m.status = MatchStatus::Completed;
                m.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn standings(&self, tournament_id: TournamentId) -> Result<Vec<StandingsRecord>, StoreError> {
        Ok(self
            .read()?
            .standings
            .iter()
            .filter(|s| s.tournament_id == tournament_id)
            .cloned()
            .collect())
    }

    fn apply_standings_delta(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
        delta: StandingsDelta,
    ) -> Result<bool, StoreError> {
        let mut g = self.write()?;
        match g
            .standings
            .iter_mut()
            .find(|s| s.tournament_id == tournament_id && s.participant_id == participant_id)
        {
            Some(record) => {
                record.apply(delta);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn upsert_standings(&self, record: &StandingsRecord) -> Result<(), StoreError> {
        let mut g = self.write()?;
        match g.standings.iter_mut().find(|s| {
            s.tournament_id == record.tournament_id && s.participant_id == record.participant_id
        }) {
            Some(existing) => *existing = record.clone(),
            None => g.standings.push(record.clone()),
        }
        Ok(())
    }

    fn insert_playoff_round(
        &self,
        tournament_id: TournamentId,
        round: PlayoffRound,
        matches: Vec<PlayoffMatch>,
    ) -> Result<bool, StoreError> {
        let mut g = self.write()?;
        if g
            .playoff_matches
            .iter()
            .any(|m| m.tournament_id == tournament_id && m.round == round)
        {
            return Ok(false);
        }
        g.playoff_matches.extend(matches);
        Ok(true)
    }

    fn playoff_matches(&self, tournament_id: TournamentId) -> Result<Vec<PlayoffMatch>, StoreError> {
        let mut list: Vec<PlayoffMatch> = self
            .read()?
            .playoff_matches
            .iter()
            .filter(|m| m.tournament_id == tournament_id)
            .cloned()
            .collect();
        list.sort_by_key(|m| (m.round, m.match_number));
        Ok(list)
    }

    fn playoff_match(&self, id: PlayoffMatchId) -> Result<Option<PlayoffMatch>, StoreError> {
        Ok(self.read()?.playoff_matches.iter().find(|m| m.id == id).cloned())
    }

    fn complete_playoff_match(
        &self,
        id: PlayoffMatchId,
        participant1_score: u32,
        participant2_score: u32,
        winner: ParticipantId,
    ) -> Result<bool, StoreError> {
        let mut g = self.write()?;
        match g.playoff_matches.iter_mut().find(|m| m.id == id) {
            Some(m) if m.status == MatchStatus::Pending => {
                m.participant1_score = Some(participant1_score);
                m.participant2_score = Some(participant2_score);
                m.winner = Some(winner);
                m.status = MatchStatus::Completed;
                m.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
