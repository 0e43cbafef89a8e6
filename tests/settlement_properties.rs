//! Settlement properties checked against every pocket on the wheel

use roulette::games::{
    evaluate,
    neighbors::neighbors,
    wheel::{covered_numbers, POCKET_COUNT, WHEEL_ORDER},
    Bet, BetType, FixedSource, PayoutTable, SettlementConfig, SettlementEngine,
};
use std::sync::Arc;

fn outside_bets() -> Vec<Bet> {
    let mut bets = Vec::new();
    for bet_type in [
        BetType::Red,
        BetType::Black,
        BetType::Odd,
        BetType::Even,
        BetType::Low,
        BetType::High,
    ] {
        let numbers = covered_numbers(&bet_type, None).unwrap();
        bets.push(Bet::new(bet_type, numbers, 10.0));
    }
    for value in 1..=3 {
        for bet_type in [BetType::Dozen, BetType::Column] {
            let numbers = covered_numbers(&bet_type, Some(value)).unwrap();
            bets.push(Bet::new(bet_type, numbers, 10.0));
        }
    }
    bets
}

#[test]
fn test_full_straight_coverage_returns_one_straight_per_pocket() {
    let payouts = PayoutTable::standard();
    let bets: Vec<Bet> = (0..=36u8)
        .map(|n| Bet::new(BetType::Straight, vec![n], 1.0))
        .collect();

    for winning_number in 0..=36u8 {
        let result = evaluate(&payouts, &bets, 100.0, winning_number);
        assert_eq!(result.winning_bets.len(), 1);
        assert_eq!(result.winning_bets[0].numbers, vec![winning_number]);
        assert_eq!(result.payout, 36.0);
        // 37 staked, 36 back: the house edge is exactly one unit
        assert_eq!(result.new_balance, 99.0);
    }
}

#[test]
fn test_zero_loses_every_outside_bet() {
    let payouts = PayoutTable::standard();
    let bets = outside_bets();
    let staked: f64 = bets.iter().map(|b| b.amount).sum();

    let result = evaluate(&payouts, &bets, 1000.0, 0);
    assert!(result.winning_bets.is_empty());
    assert_eq!(result.payout, 0.0);
    assert_eq!(result.new_balance, 1000.0 - staked);
}

#[test]
fn test_non_zero_pockets_hit_the_same_outside_shape() {
    let payouts = PayoutTable::standard();
    let bets = outside_bets();

    // One color, one parity, one half, one dozen, one column
    for winning_number in 1..=36u8 {
        let result = evaluate(&payouts, &bets, 1000.0, winning_number);
        assert_eq!(result.winning_bets.len(), 5, "pocket {}", winning_number);
        assert_eq!(result.payout, 3.0 * 20.0 + 2.0 * 30.0);
    }
}

#[test]
fn test_balance_identity_holds_for_every_pocket() {
    let payouts = PayoutTable::standard();
    let mut bets = outside_bets();
    bets.push(Bet::new(BetType::Split, vec![0, 32], 5.0));
    bets.push(Bet::new(BetType::Corner, vec![1, 2, 4, 5], 2.5));
    bets.push(Bet::new(BetType::Other("basket".to_string()), vec![0, 1, 2], 4.0));
    let staked: f64 = bets.iter().map(|b| b.amount).sum();

    for winning_number in 0..=36u8 {
        let result = evaluate(&payouts, &bets, 500.0, winning_number);
        let paid: f64 = result.winning_bets.iter().map(|b| b.payout).sum();
        assert_eq!(result.payout, paid);
        assert_eq!(result.new_balance, 500.0 - staked + result.payout);
        assert!(result.winning_bets.iter().all(|b| b.numbers.contains(&winning_number)));
    }
}

#[test]
fn test_neighbor_bet_covers_adjacent_pockets() {
    for (idx, centre) in WHEEL_ORDER.iter().enumerate() {
        let covered = covered_numbers(&BetType::Neighbor, Some(i64::from(*centre))).unwrap();
        let left = WHEEL_ORDER[(idx + POCKET_COUNT - 1) % POCKET_COUNT];
        let right = WHEEL_ORDER[(idx + 1) % POCKET_COUNT];
        assert_eq!(covered, vec![*centre, left, right]);

        let mut around = neighbors(i64::from(*centre), 1).unwrap();
        around.sort_unstable();
        let mut expected = vec![left, right];
        expected.sort_unstable();
        assert_eq!(around, expected);
    }
}

#[test]
fn test_engine_draws_once_per_accepted_spin() {
    let source = Arc::new(FixedSource::new((0..=36).collect()));
    let engine = SettlementEngine::with_source(SettlementConfig::default(), source.clone());
    let bets = vec![Bet::new(BetType::Straight, vec![7], 1.0)];

    for expected in 0..=36u8 {
        let result = engine.settle(&bets, 10.0).unwrap();
        assert_eq!(result.winning_number, expected);
    }
    assert!(engine.settle(&bets, 0.5).is_err());
    assert_eq!(source.draws(), 37);
}
