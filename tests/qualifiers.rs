//! Integration tests for the league table and playoff qualification.

mod common;

use clan_tournament_web::{TournamentError, TournamentId};
use common::{harness, Harness};

fn seeds_in_order(h: &Harness, id: TournamentId) -> Vec<u32> {
    h.engine
        .standings_table(id)
        .unwrap()
        .iter()
        .map(|r| r.participant.seed_position.unwrap())
        .collect()
}

fn play(h: &Harness, id: TournamentId, match_number: u32, s1: u32, s2: u32) {
    let m = h
        .league_matches(id)
        .into_iter()
        .find(|m| m.match_number == match_number)
        .unwrap();
    h.engine.submit_league_result(&h.ctx, id, m.id, s1, s2).unwrap();
}

#[test]
fn top_eight_of_twelve() {
    let h = harness();
    let (id, _) = h.league(12);
    h.play_league_by_seed(id);

    let q = h.engine.qualifiers(id).unwrap();
    assert_eq!(q.len(), 8);
    let seeds: Vec<u32> = q.iter().map(|r| r.participant.seed_position.unwrap()).collect();
    assert_eq!(seeds, (1..=8).collect::<Vec<_>>());
    assert_eq!(q[0].record.points, 33);
    assert_eq!(q[7].rank, 8);
}

#[test]
fn four_of_five_and_sixteen_of_twenty() {
    let h = harness();
    let (five, _) = h.league(5);
    h.play_league_by_seed(five);
    assert_eq!(h.engine.qualifiers(five).unwrap().len(), 4);

    let (twenty, _) = h.league(20);
    h.play_league_by_seed(twenty);
    let q = h.engine.qualifiers(twenty).unwrap();
    assert_eq!(q.len(), 16);
    assert_eq!(q.last().unwrap().participant.seed_position, Some(16));
}

#[test]
fn untouched_table_follows_seed_order() {
    let h = harness();
    let (id, _) = h.league(6);
    assert_eq!(seeds_in_order(&h, id), vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn crown_difference_breaks_points_ties() {
    let h = harness();
    let (id, _) = h.league(4);
    // 1: P1-P2, 6: P3-P4.
    play(&h, id, 1, 1, 0);
    play(&h, id, 6, 3, 0);
    assert_eq!(seeds_in_order(&h, id), vec![3, 1, 2, 4]);
}

#[test]
fn crowns_scored_break_difference_ties() {
    let h = harness();
    let (id, _) = h.league(4);
    play(&h, id, 1, 1, 0);
    play(&h, id, 6, 3, 2);
    assert_eq!(seeds_in_order(&h, id), vec![3, 1, 4, 2]);
}

#[test]
fn ranks_are_contiguous() {
    let h = harness();
    let (id, _) = h.league(7);
    h.play_league_by_seed(id);
    let table = h.engine.standings_table(id).unwrap();
    let ranks: Vec<usize> = table.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, (1..=7).collect::<Vec<_>>());
}

#[test]
fn unknown_tournament() {
    let h = harness();
    let missing = uuid::Uuid::new_v4();
    assert_eq!(
        h.engine.qualifiers(missing).unwrap_err(),
        TournamentError::TournamentNotFound(missing)
    );
}
