//! Integration tests for seeding the opening playoff round.

mod common;

use clan_tournament_web::{
    DataStore, Phase, PlayoffMatch, PlayoffRound, TournamentError, TournamentEvent, TournamentId,
    TournamentStatus,
};
use common::{harness, Harness};

fn seed_pairs(h: &Harness, id: TournamentId, matches: &[PlayoffMatch]) -> Vec<(u32, u32)> {
    matches
        .iter()
        .map(|m| (h.seed_of(id, m.participant1), h.seed_of(id, m.participant2)))
        .collect()
}

#[test]
fn eight_qualifiers_make_quarter_finals() {
    let h = harness();
    let (id, _) = h.league(12);
    h.play_league_by_seed(id);

    let matches = h.engine.generate_playoff_bracket(&h.ctx, id).unwrap();
    assert_eq!(matches.len(), 4);
    assert!(matches.iter().all(|m| m.round == PlayoffRound::Quarter));
    assert_eq!(
        matches.iter().map(|m| m.match_number).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );
    assert_eq!(seed_pairs(&h, id, &matches), vec![(1, 8), (4, 5), (2, 7), (3, 6)]);

    let t = h.engine.tournament(id).unwrap();
    assert_eq!(t.status, TournamentStatus::Playoffs);
    assert_eq!(t.current_phase, Some(Phase::Quarter));
    assert_eq!(h.store.playoff_matches(id).unwrap(), matches);
    assert!(h.events.events().contains(&TournamentEvent::PlayoffsStarted {
        tournament_id: id,
        round: PlayoffRound::Quarter
    }));
}

#[test]
fn four_qualifiers_make_semi_finals() {
    let h = harness();
    let (id, _) = h.league(5);
    h.play_league_by_seed(id);

    let matches = h.engine.generate_playoff_bracket(&h.ctx, id).unwrap();
    assert!(matches.iter().all(|m| m.round == PlayoffRound::Semi));
    assert_eq!(seed_pairs(&h, id, &matches), vec![(1, 4), (2, 3)]);
    assert_eq!(h.engine.tournament(id).unwrap().current_phase, Some(Phase::Semi));
}

#[test]
fn sixteen_qualifiers_make_round_of_sixteen() {
    let h = harness();
    let (id, _) = h.league(16);
    h.play_league_by_seed(id);

    let matches = h.engine.generate_playoff_bracket(&h.ctx, id).unwrap();
    assert_eq!(matches.len(), 8);
    assert!(matches.iter().all(|m| m.round == PlayoffRound::RoundOf16));
    let pairs = seed_pairs(&h, id, &matches);
    assert!(pairs.iter().all(|(a, b)| a + b == 17));
    assert_eq!(pairs[0], (1, 16));
    assert_eq!(
        h.engine.tournament(id).unwrap().current_phase,
        Some(Phase::RoundOf16)
    );
}

#[test]
fn refused_while_league_matches_are_pending() {
    let h = harness();
    let (id, _) = h.league(4);
    let matches = h.league_matches(id);
    for m in &matches[..4] {
        h.engine.submit_league_result(&h.ctx, id, m.id, 2, 1).unwrap();
    }

    assert_eq!(
        h.engine.generate_playoff_bracket(&h.ctx, id).unwrap_err(),
        TournamentError::LeagueIncomplete { pending: 2 }
    );
    assert!(h.store.playoff_matches(id).unwrap().is_empty());
    assert_eq!(h.engine.tournament(id).unwrap().status, TournamentStatus::League);
}

#[test]
fn second_generation_is_rejected() {
    let h = harness();
    let (id, _) = h.league(4);
    h.play_league_by_seed(id);
    h.engine.generate_playoff_bracket(&h.ctx, id).unwrap();

    assert_eq!(
        h.engine.generate_playoff_bracket(&h.ctx, id).unwrap_err(),
        TournamentError::RoundAlreadyExists(PlayoffRound::Semi)
    );
    assert_eq!(h.store.playoff_matches(id).unwrap().len(), 2);
}

#[test]
fn interrupted_start_is_finished_by_retrying() {
    let h = harness();
    let (id, _) = h.league(8);
    h.play_league_by_seed(id);

    h.flaky.fail_once("transition_tournament");
    assert!(matches!(
        h.engine.generate_playoff_bracket(&h.ctx, id),
        Err(TournamentError::Store(_))
    ));
    let written = h.store.playoff_matches(id).unwrap();
    assert_eq!(written.len(), 4);
    assert_eq!(h.engine.tournament(id).unwrap().status, TournamentStatus::League);

    assert_eq!(
        h.engine.generate_playoff_bracket(&h.ctx, id).unwrap_err(),
        TournamentError::RoundAlreadyExists(PlayoffRound::Quarter)
    );
    let t = h.engine.tournament(id).unwrap();
    assert_eq!(t.status, TournamentStatus::Playoffs);
    assert_eq!(t.current_phase, Some(Phase::Quarter));
    assert_eq!(h.store.playoff_matches(id).unwrap(), written);
    assert!(h.events.events().contains(&TournamentEvent::PlayoffsStarted {
        tournament_id: id,
        round: PlayoffRound::Quarter
    }));

    // Once started, the quarter-finals can be played.
    h.engine
        .submit_playoff_result(&h.ctx, id, written[0].id, 2, 1)
        .unwrap();
}

#[test]
fn refused_before_the_league() {
    let h = harness();
    let (id, _) = h.tournament_with(6);
    assert_eq!(
        h.engine.generate_playoff_bracket(&h.ctx, id).unwrap_err(),
        TournamentError::InvalidState
    );
}

#[test]
fn stale_standings_are_rebuilt_before_seeding() {
    let h = harness();
    let (id, _) = h.league(4);
    // Results written straight to the store: participant 2 wins every match and the
    // standings rows never see it.
    for m in h.league_matches(id) {
        assert!(h.store.complete_league_match(m.id, 0, 3).unwrap());
    }
    assert!(h.store.standings(id).unwrap().iter().all(|r| r.games_played == 0));

    let matches = h.engine.generate_playoff_bracket(&h.ctx, id).unwrap();
    // Table is seed 4, 3, 2, 1.
    assert_eq!(seed_pairs(&h, id, &matches), vec![(4, 1), (3, 2)]);
    assert!(h.store.standings(id).unwrap().iter().all(|r| r.games_played == 3));
}
