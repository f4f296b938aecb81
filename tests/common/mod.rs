//! Shared setup for the integration tests: an engine over a fresh `MemoryStore`.
#![allow(dead_code)]

use clan_tournament_web::models::StandingsDelta;
use clan_tournament_web::store::{ParticipantPatch, TournamentPatch};
use clan_tournament_web::{
    AdminGate, AuthorizedContext, DataStore, EngineSettings, LeagueMatch, LeagueMatchId,
    MemoryStore, NewParticipant, NewTournament, Participant, ParticipantId, Phase, PlayoffMatch,
    PlayoffMatchId, PlayoffRound, RecordingEventSink, StandingsRecord, StoreError, Tournament,
    TournamentEngine, TournamentId, TournamentStatus,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

pub const SECRET: &str = "test-secret";

pub struct Harness {
    pub engine: TournamentEngine,
    /// The rows the engine sees, without injected failures.
    pub store: Arc<MemoryStore>,
    /// What the engine actually talks to.
    pub flaky: Arc<FlakyStore>,
    pub events: Arc<RecordingEventSink>,
    pub ctx: AuthorizedContext,
}

pub fn harness() -> Harness {
    harness_with(EngineSettings::default())
}

pub fn harness_with(settings: EngineSettings) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let flaky = Arc::new(FlakyStore::new(store.clone()));
    let events = Arc::new(RecordingEventSink::new());
    let engine = TournamentEngine::new(flaky.clone(), events.clone(), settings);
    let ctx = AdminGate::new(SECRET).authorize(SECRET).unwrap();
    Harness {
        engine,
        store,
        flaky,
        events,
        ctx,
    }
}

pub fn names(n: usize) -> Vec<NewParticipant> {
    (1..=n)
        .map(|i| NewParticipant {
            name: format!("P{i}"),
            tag: None,
        })
        .collect()
}

impl Harness {
    /// Tournament in Setup with participants P1..Pn (seeded in that order).
    pub fn tournament_with(&self, n: usize) -> (TournamentId, Vec<Participant>) {
        let t = self
            .engine
            .create_tournament(
                &self.ctx,
                NewTournament {
                    name: format!("Clan league of {n}"),
                    description: None,
                    rules: Vec::new(),
                    participants: names(n),
                },
            )
            .unwrap();
        (t.id, self.participants(t.id))
    }

    /// Tournament in League with fixtures generated.
    pub fn league(&self, n: usize) -> (TournamentId, Vec<Participant>) {
        let (id, participants) = self.tournament_with(n);
        self.engine.generate_fixtures(&self.ctx, id).unwrap();
        (id, participants)
    }

    pub fn participants(&self, id: TournamentId) -> Vec<Participant> {
        self.store.participants(id).unwrap()
    }

    pub fn league_matches(&self, id: TournamentId) -> Vec<LeagueMatch> {
        self.store.league_matches(id).unwrap()
    }

    /// Play every pending league match with the better seed winning 3-0, so the final
    /// table follows seed order.
    pub fn play_league_by_seed(&self, id: TournamentId) {
        for m in self.league_matches(id) {
            if !m.is_completed() {
                self.engine
                    .submit_league_result(&self.ctx, id, m.id, 3, 0)
                    .unwrap();
            }
        }
    }

    /// Seed position of a participant (1-based).
    pub fn seed_of(&self, id: TournamentId, participant: ParticipantId) -> u32 {
        self.participants(id)
            .into_iter()
            .find(|p| p.id == participant)
            .and_then(|p| p.seed_position)
            .unwrap()
    }
}

/// `DataStore` over a `MemoryStore` whose writes can be made to fail once, by method name.
pub struct FlakyStore {
    inner: Arc<MemoryStore>,
    armed: Mutex<HashSet<&'static str>>,
}

impl FlakyStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            armed: Mutex::new(HashSet::new()),
        }
    }

    /// The next call to `method` fails with `StoreError::Unavailable` and writes nothing.
    pub fn fail_once(&self, method: &'static str) {
        self.armed.lock().unwrap().insert(method);
    }

    fn trip(&self, method: &'static str) -> Result<(), StoreError> {
        if self.armed.lock().unwrap().remove(method) {
            return Err(StoreError::Unavailable(format!("{method} failed")));
        }
        Ok(())
    }
}

impl DataStore for FlakyStore {
    fn insert_tournament(&self, tournament: Tournament) -> Result<(), StoreError> {
        self.trip("insert_tournament")?;
        self.inner.insert_tournament(tournament)
    }

    fn tournament(&self, id: TournamentId) -> Result<Option<Tournament>, StoreError> {
        self.inner.tournament(id)
    }

    fn tournaments(&self) -> Result<Vec<Tournament>, StoreError> {
        self.inner.tournaments()
    }

    fn update_tournament(
        &self,
        id: TournamentId,
        patch: &TournamentPatch,
    ) -> Result<Option<Tournament>, StoreError> {
        self.trip("update_tournament")?;
        self.inner.update_tournament(id, patch)
    }

    fn transition_tournament(
        &self,
        id: TournamentId,
        expected: TournamentStatus,
        status: TournamentStatus,
        phase: Option<Phase>,
    ) -> Result<bool, StoreError> {
        self.trip("transition_tournament")?;
        self.inner.transition_tournament(id, expected, status, phase)
    }

    fn set_phase(
        &self,
        id: TournamentId,
        expected: TournamentStatus,
        phase: Phase,
    ) -> Result<bool, StoreError> {
        self.trip("set_phase")?;
        self.inner.set_phase(id, expected, phase)
    }

    fn delete_tournament(&self, id: TournamentId) -> Result<bool, StoreError> {
        self.trip("delete_tournament")?;
        self.inner.delete_tournament(id)
    }

    fn insert_participants(&self, participants: Vec<Participant>) -> Result<(), StoreError> {
        self.trip("insert_participants")?;
        self.inner.insert_participants(participants)
    }

    fn participants(&self, tournament_id: TournamentId) -> Result<Vec<Participant>, StoreError> {
        self.inner.participants(tournament_id)
    }

    fn participant(&self, id: ParticipantId) -> Result<Option<Participant>, StoreError> {
        self.inner.participant(id)
    }

    fn update_participant(
        &self,
        id: ParticipantId,
        patch: &ParticipantPatch,
    ) -> Result<Option<Participant>, StoreError> {
        self.trip("update_participant")?;
        self.inner.update_participant(id, patch)
    }

    fn delete_participant(&self, id: ParticipantId) -> Result<bool, StoreError> {
        self.trip("delete_participant")?;
        self.inner.delete_participant(id)
    }

    fn insert_league_fixtures(
        &self,
        tournament_id: TournamentId,
        matches: Vec<LeagueMatch>,
        standings: Vec<StandingsRecord>,
    ) -> Result<bool, StoreError> {
        self.trip("insert_league_fixtures")?;
        self.inner.insert_league_fixtures(tournament_id, matches, standings)
    }

    fn league_matches(&self, tournament_id: TournamentId) -> Result<Vec<LeagueMatch>, StoreError> {
        self.inner.league_matches(tournament_id)
    }

    fn league_match(&self, id: LeagueMatchId) -> Result<Option<LeagueMatch>, StoreError> {
        self.inner.league_match(id)
    }

    fn complete_league_match(
        &self,
        id: LeagueMatchId,
        participant1_score: u32,
        participant2_score: u32,
    ) -> Result<bool, StoreError> {
        self.trip("complete_league_match")?;
        self.inner
            .complete_league_match(id, participant1_score, participant2_score)
    }

    fn standings(&self, tournament_id: TournamentId) -> Result<Vec<StandingsRecord>, StoreError> {
        self.inner.standings(tournament_id)
    }

    fn apply_standings_delta(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
        delta: StandingsDelta,
    ) -> Result<bool, StoreError> {
        self.trip("apply_standings_delta")?;
        self.inner
            .apply_standings_delta(tournament_id, participant_id, delta)
    }

    fn upsert_standings(&self, record: &StandingsRecord) -> Result<(), StoreError> {
        self.trip("upsert_standings")?;
        self.inner.upsert_standings(record)
    }

    fn insert_playoff_round(
        &self,
        tournament_id: TournamentId,
        round: PlayoffRound,
        matches: Vec<PlayoffMatch>,
    ) -> Result<bool, StoreError> {
        self.trip("insert_playoff_round")?;
        self.inner.insert_playoff_round(tournament_id, round, matches)
    }

    fn playoff_matches(&self, tournament_id: TournamentId) -> Result<Vec<PlayoffMatch>, StoreError> {
        self.inner.playoff_matches(tournament_id)
    }

    fn playoff_match(&self, id: PlayoffMatchId) -> Result<Option<PlayoffMatch>, StoreError> {
        self.inner.playoff_match(id)
    }

    fn complete_playoff_match(
        &self,
        id: PlayoffMatchId,
        participant1_score: u32,
        participant2_score: u32,
        winner: ParticipantId,
    ) -> Result<bool, StoreError> {
        self.trip("complete_playoff_match")?;
        self.inner
            .complete_playoff_match(id, participant1_score, participant2_score, winner)
    }
}
