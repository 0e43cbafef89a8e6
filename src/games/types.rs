use crate::errors::GameError;
use crate::games::wheel::MAX_NUMBER;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pocket color
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Black,
    Green,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => write!(f, "red"),
            Color::Black => write!(f, "black"),
            Color::Green => write!(f, "green"),
        }
    }
}

/// Bet categories accepted at the table.
///
/// Anything the table does not recognise is kept as `Other` so it can either
/// settle at a zero ratio or be rejected, depending on configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BetType {
    // Inside
    Straight,
    Split,
    Street,
    Corner,
    Line,
    // Outside
    Dozen,
    Column,
    Red,
    Black,
    Odd,
    Even,
    High,
    Low,
    // Racetrack
    Neighbor,
    Voisins,
    Tiers,
    Orphelins,
    Other(String),
}

impl BetType {
    pub const KNOWN: [BetType; 17] = [
        BetType::Straight,
        BetType::Split,
        BetType::Street,
        BetType::Corner,
        BetType::Line,
        BetType::Dozen,
        BetType::Column,
        BetType::Red,
        BetType::Black,
        BetType::Odd,
        BetType::Even,
        BetType::High,
        BetType::Low,
        BetType::Neighbor,
        BetType::Voisins,
        BetType::Tiers,
        BetType::Orphelins,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            BetType::Straight => "straight",
            BetType::Split => "split",
            BetType::Street => "street",
            BetType::Corner => "corner",
            BetType::Line => "line",
            BetType::Dozen => "dozen",
            BetType::Column => "column",
            BetType::Red => "red",
            BetType::Black => "black",
            BetType::Odd => "odd",
            BetType::Even => "even",
            BetType::High => "high",
            BetType::Low => "low",
            BetType::Neighbor => "neighbor",
            BetType::Voisins => "voisins",
            BetType::Tiers => "tiers",
            BetType::Orphelins => "orphelins",
            BetType::Other(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, BetType::Other(_))
    }
}

impl FromStr for BetType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bet_type = BetType::KNOWN
            .iter()
            .find(|known| known.as_str() == s)
            .cloned()
            .unwrap_or_else(|| BetType::Other(s.to_string()));
        Ok(bet_type)
    }
}

impl From<String> for BetType {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(bet_type) => bet_type,
            Err(never) => match never {},
        }
    }
}

impl From<BetType> for String {
    fn from(value: BetType) -> Self {
        match value {
            BetType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for BetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single wager as sent by the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bet {
    #[serde(rename = "type")]
    pub bet_type: BetType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
    pub numbers: Vec<u8>,
    pub amount: f64,
    /// Client-side display figure. Never read when settling.
    #[serde(default)]
    pub payout: f64,
}

impl Bet {
    pub fn new(bet_type: BetType, numbers: Vec<u8>, amount: f64) -> Self {
        Self {
            bet_type,
            value: None,
            numbers,
            amount,
            payout: 0.0,
        }
    }

    /// Check the structural invariants of a bet. `index` is its position in
    /// the request and only used for error reporting.
    pub fn validate(&self, index: usize) -> Result<(), GameError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(GameError::InvalidBet {
                index,
                reason: format!("amount must be positive, got {}", self.amount),
            });
        }

        if self.numbers.is_empty() {
            return Err(GameError::InvalidBet {
                index,
                reason: "bet covers no numbers".to_string(),
            });
        }

        if let Some(n) = self.numbers.iter().find(|n| **n > MAX_NUMBER) {
            return Err(GameError::InvalidBet {
                index,
                reason: format!("number {} is outside 0-36", n),
            });
        }

        Ok(())
    }

    pub fn covers(&self, number: u8) -> bool {
        self.numbers.contains(&number)
    }
}

/// Stateless spin request: the caller owns the balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpinRequest {
    pub bets: Vec<Bet>,
    pub balance: f64,
}

/// A bet that won, with the payout computed server-side
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WinningBet {
    #[serde(rename = "type")]
    pub bet_type: BetType,
    pub numbers: Vec<u8>,
    pub amount: f64,
    pub payout: f64,
}

/// Outcome of one settled spin
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpinResult {
    pub winning_number: u8,
    pub winning_color: Color,
    /// Sum of all winning payouts (stake included)
    pub payout: f64,
    pub new_balance: f64,
    pub winning_bets: Vec<WinningBet>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bet_type_round_trips_through_strings() {
        for bet_type in BetType::KNOWN.iter() {
            let parsed: BetType = bet_type.as_str().parse().unwrap();
            assert_eq!(&parsed, bet_type);
            assert!(parsed.is_known());
        }

        let other: BetType = "basket".parse().unwrap();
        assert_eq!(other, BetType::Other("basket".to_string()));
        assert!(!other.is_known());
        assert_eq!(other.to_string(), "basket");
    }

    #[test]
    fn test_bet_deserializes_wire_shape() {
        let json = r#"{"type":"straight","numbers":[7],"amount":10,"payout":999}"#;
        let bet: Bet = serde_json::from_str(json).unwrap();
        assert_eq!(bet.bet_type, BetType::Straight);
        assert_eq!(bet.numbers, vec![7]);
        assert_eq!(bet.amount, 10.0);
        assert_eq!(bet.value, None);
    }

    #[test]
    fn test_bet_payout_field_is_optional() {
        let json = r#"{"type":"orphelins","numbers":[1,6,9],"amount":5}"#;
        let bet: Bet = serde_json::from_str(json).unwrap();
        assert_eq!(bet.payout, 0.0);
    }

    #[test]
    fn test_unknown_type_survives_deserialization() {
        let json = r#"{"type":"snake","numbers":[1,5,9],"amount":5}"#;
        let bet: Bet = serde_json::from_str(json).unwrap();
        assert_eq!(bet.bet_type, BetType::Other("snake".to_string()));

        let out = serde_json::to_value(&bet).unwrap();
        assert_eq!(out["type"], "snake");
    }

    #[test]
    fn test_bet_validation() {
        assert!(Bet::new(BetType::Straight, vec![36], 1.0).validate(0).is_ok());

        let zero_amount = Bet::new(BetType::Straight, vec![1], 0.0);
        assert!(matches!(
            zero_amount.validate(3),
            Err(GameError::InvalidBet { index: 3, .. })
        ));

        let nan_amount = Bet::new(BetType::Straight, vec![1], f64::NAN);
        assert!(nan_amount.validate(0).is_err());

        let empty = Bet::new(BetType::Split, vec![], 5.0);
        assert!(empty.validate(0).is_err());

        let out_of_range = Bet::new(BetType::Split, vec![36, 37], 5.0);
        assert!(out_of_range.validate(0).is_err());
    }

    #[test]
    fn test_spin_result_uses_snake_case_keys() {
        let result = SpinResult {
            winning_number: 0,
            winning_color: Color::Green,
            payout: 0.0,
            new_balance: 90.0,
            winning_bets: vec![],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["winning_number"], 0);
        assert_eq!(json["winning_color"], "green");
        assert_eq!(json["new_balance"], 90.0);
        assert!(json["winning_bets"].as_array().unwrap().is_empty());
    }
}
