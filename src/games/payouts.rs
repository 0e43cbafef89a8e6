//! Payout ratios per bet category ("to one" odds)

use crate::games::types::{Bet, BetType};
use std::collections::HashMap;

/// Immutable ratio lookup built once at startup
#[derive(Debug, Clone)]
pub struct PayoutTable {
    ratios: HashMap<BetType, u32>,
}

impl PayoutTable {
    /// Standard single-zero table. Racetrack bets pay as a straight up on
    /// the pocket that hits.
    pub fn standard() -> Self {
        let ratios = [
            (BetType::Straight, 35),
            (BetType::Split, 17),
            (BetType::Street, 11),
            (BetType::Corner, 8),
            (BetType::Line, 5),
            (BetType::Dozen, 2),
            (BetType::Column, 2),
            (BetType::Red, 1),
            (BetType::Black, 1),
            (BetType::Odd, 1),
            (BetType::Even, 1),
            (BetType::High, 1),
            (BetType::Low, 1),
            (BetType::Neighbor, 35),
            (BetType::Voisins, 35),
            (BetType::Tiers, 35),
            (BetType::Orphelins, 35),
        ]
        .into_iter()
        .collect();

        Self { ratios }
    }

    /// Ratio for a category; unknown categories pay 0:1 (stake back only)
    pub fn ratio(&self, bet_type: &BetType) -> u32 {
        self.ratios.get(bet_type).copied().unwrap_or(0)
    }

    /// Total returned for a winning bet, stake included
    pub fn payout_for(&self, bet: &Bet) -> f64 {
        bet.amount * f64::from(self.ratio(&bet.bet_type) + 1)
    }
}

impl Default for PayoutTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_known_type_has_a_ratio() {
        let table = PayoutTable::standard();
        for bet_type in BetType::KNOWN.iter() {
            assert!(table.ratio(bet_type) > 0, "{} has no ratio", bet_type);
        }
    }

    #[test]
    fn test_standard_ratios() {
        let table = PayoutTable::standard();
        assert_eq!(table.ratio(&BetType::Straight), 35);
        assert_eq!(table.ratio(&BetType::Split), 17);
        assert_eq!(table.ratio(&BetType::Street), 11);
        assert_eq!(table.ratio(&BetType::Corner), 8);
        assert_eq!(table.ratio(&BetType::Line), 5);
        assert_eq!(table.ratio(&BetType::Dozen), 2);
        assert_eq!(table.ratio(&BetType::Red), 1);
        assert_eq!(table.ratio(&BetType::Tiers), 35);
    }

    #[test]
    fn test_unknown_type_pays_stake_back() {
        let table = PayoutTable::standard();
        let bet = Bet::new(BetType::Other("basket".into()), vec![0, 1, 2, 3], 10.0);
        assert_eq!(table.ratio(&bet.bet_type), 0);
        assert_eq!(table.payout_for(&bet), 10.0);
    }

    #[test]
    fn test_straight_payout_includes_stake() {
        let table = PayoutTable::standard();
        let bet = Bet::new(BetType::Straight, vec![7], 10.0);
        assert_eq!(table.payout_for(&bet), 360.0);
    }
}
