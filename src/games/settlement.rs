//! Settlement Engine
//!
//! Turns a bet list and a balance into a settled spin. Every check runs
//! before the wheel is spun, so a rejected request never consumes a draw.
//! Once validation passes, settlement cannot fail.

use crate::errors::GameError;
use crate::games::payouts::PayoutTable;
use crate::games::rng::{OsRngSource, SpinSource};
use crate::games::types::{Bet, SpinResult, WinningBet};
use crate::games::wheel;
use std::sync::Arc;
use tracing::debug;

/// Slack allowed when comparing float sums, so stakes like 0.1 + 0.2 fit a
/// balance of 0.3
pub const STAKE_TOLERANCE: f64 = 1e-9;

/// Settlement options
#[derive(Debug, Clone, Default)]
pub struct SettlementConfig {
    /// Reject unknown bet types instead of settling them at 0:1
    pub strict_bet_types: bool,
}

/// Stateless settlement engine, safe to share across requests
#[derive(Clone)]
pub struct SettlementEngine {
    payouts: PayoutTable,
    source: Arc<dyn SpinSource>,
    config: SettlementConfig,
}

impl SettlementEngine {
    pub fn new(config: SettlementConfig) -> Self {
        Self::with_source(config, Arc::new(OsRngSource))
    }

    pub fn with_source(config: SettlementConfig, source: Arc<dyn SpinSource>) -> Self {
        Self {
            payouts: PayoutTable::standard(),
            source,
            config,
        }
    }

    pub fn payouts(&self) -> &PayoutTable {
        &self.payouts
    }

    /// Validate the request, spin, and settle every bet
    pub fn settle(&self, bets: &[Bet], balance: f64) -> Result<SpinResult, GameError> {
        let total_staked = self.validate(bets, balance)?;

        let winning_number = self.source.draw();
        debug!(
            "Drew {} for {} bet(s) staking {}",
            winning_number,
            bets.len(),
            total_staked
        );

        Ok(evaluate(&self.payouts, bets, balance, winning_number))
    }

    /// Run all pre-draw checks and return the total stake
    pub fn validate(&self, bets: &[Bet], balance: f64) -> Result<f64, GameError> {
        if !balance.is_finite() || balance < 0.0 {
            return Err(GameError::InvalidBalance(balance));
        }

        for (index, bet) in bets.iter().enumerate() {
            bet.validate(index)?;
            if self.config.strict_bet_types && !bet.bet_type.is_known() {
                return Err(GameError::UnknownBetType(bet.bet_type.to_string()));
            }
        }

        let total_staked = total_stake(bets);
        if total_staked > balance + STAKE_TOLERANCE {
            return Err(GameError::InsufficientBalance {
                staked: total_staked,
                balance,
            });
        }

        Ok(total_staked)
    }
}

impl Default for SettlementEngine {
    fn default() -> Self {
        Self::new(SettlementConfig::default())
    }
}

pub fn total_stake(bets: &[Bet]) -> f64 {
    bets.iter().map(|bet| bet.amount).sum()
}

/// Settle `bets` against a known winning number.
///
/// Winning bets keep their input order; losing bets are dropped. The
/// client-supplied `payout` field is ignored.
pub fn evaluate(payouts: &PayoutTable, bets: &[Bet], balance: f64, winning_number: u8) -> SpinResult {
    let total_staked = total_stake(bets);

    let winning_bets: Vec<WinningBet> = bets
        .iter()
        .filter(|bet| bet.covers(winning_number))
        .map(|bet| WinningBet {
            bet_type: bet.bet_type.clone(),
            numbers: bet.numbers.clone(),
            amount: bet.amount,
            payout: payouts.payout_for(bet),
        })
        .collect();

    let payout: f64 = winning_bets.iter().map(|bet| bet.payout).sum();

    let mut new_balance = balance - total_staked + payout;
    // Rounding residue from a stake that exactly matched the balance
    if new_balance < 0.0 && new_balance > -STAKE_TOLERANCE {
        new_balance = 0.0;
    }

    SpinResult {
        winning_number,
        winning_color: wheel::color(winning_number),
        payout,
        new_balance,
        winning_bets,
    }
}
