//! European wheel geometry
//!
//! Static tables for colors, physical pocket order and the racetrack call
//! bet sections. These are gameplay-critical and must match the standard
//! single-zero layout exactly.

use crate::games::types::{BetType, Color};

/// Number of pockets on a single-zero wheel
pub const POCKET_COUNT: usize = 37;

/// Highest number on the wheel
pub const MAX_NUMBER: u8 = 36;

pub const RED_NUMBERS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

pub const BLACK_NUMBERS: [u8; 18] = [
    2, 4, 6, 8, 10, 11, 13, 15, 17, 20, 22, 24, 26, 28, 29, 31, 33, 35,
];

/// Pockets in clockwise order starting from zero
pub const WHEEL_ORDER: [u8; POCKET_COUNT] = [
    0, 32, 15, 19, 4, 21, 2, 25, 17, 34, 6, 27, 13, 36, 11, 30, 8, 23, 10, 5, 24, 16, 33, 1, 20,
    14, 31, 9, 22, 18, 29, 7, 28, 12, 35, 3, 26,
];

pub const VOISINS_DU_ZERO: [u8; 17] = [
    0, 2, 3, 4, 7, 12, 15, 18, 19, 21, 22, 25, 26, 28, 29, 32, 35,
];

pub const TIERS_DU_CYLINDRE: [u8; 12] = [5, 8, 10, 11, 13, 16, 23, 24, 27, 30, 33, 36];

pub const ORPHELINS: [u8; 8] = [1, 6, 9, 14, 17, 20, 31, 34];

pub fn is_red(number: u8) -> bool {
    RED_NUMBERS.contains(&number)
}

pub fn color(number: u8) -> Color {
    if number == 0 {
        Color::Green
    } else if is_red(number) {
        Color::Red
    } else {
        Color::Black
    }
}

/// Position of `number` in [`WHEEL_ORDER`]
pub fn wheel_index(number: u8) -> Option<usize> {
    WHEEL_ORDER.iter().position(|n| *n == number)
}

/// Dozen (1, 2 or 3) a number belongs to; zero has none
pub fn dozen(number: u8) -> Option<u8> {
    match number {
        1..=MAX_NUMBER => Some((number - 1) / 12 + 1),
        _ => None,
    }
}

/// Table column (1, 2 or 3); column 1 starts at 1, column 3 at 3
pub fn column(number: u8) -> Option<u8> {
    match number {
        1..=MAX_NUMBER => Some((number - 1) % 3 + 1),
        _ => None,
    }
}

pub fn is_even(number: u8) -> bool {
    number != 0 && number % 2 == 0
}

pub fn is_odd(number: u8) -> bool {
    number % 2 == 1
}

pub fn is_low(number: u8) -> bool {
    (1..=18).contains(&number)
}

pub fn is_high(number: u8) -> bool {
    (19..=MAX_NUMBER).contains(&number)
}

/// Canonical coverage for bets that can be described by category alone.
///
/// `value` selects the dozen/column (1-3) or the centre pocket of a
/// neighbor bet. Inside bets other than straight need explicit numbers and
/// return `None`, as do unknown categories and out-of-range values.
pub fn covered_numbers(bet_type: &BetType, value: Option<i64>) -> Option<Vec<u8>> {
    let all = 1..=MAX_NUMBER;
    let numbers = match bet_type {
        BetType::Straight => vec![pocket(value?)?],
        BetType::Dozen => {
            let d = selector(value?)?;
            all.filter(|n| dozen(*n) == Some(d)).collect()
        }
        BetType::Column => {
            let c = selector(value?)?;
            all.filter(|n| column(*n) == Some(c)).collect()
        }
        BetType::Red => RED_NUMBERS.to_vec(),
        BetType::Black => BLACK_NUMBERS.to_vec(),
        BetType::Odd => all.filter(|n| is_odd(*n)).collect(),
        BetType::Even => all.filter(|n| is_even(*n)).collect(),
        BetType::Low => all.filter(|n| is_low(*n)).collect(),
        BetType::High => all.filter(|n| is_high(*n)).collect(),
        BetType::Voisins => VOISINS_DU_ZERO.to_vec(),
        BetType::Tiers => TIERS_DU_CYLINDRE.to_vec(),
        BetType::Orphelins => ORPHELINS.to_vec(),
        BetType::Neighbor => {
            let centre = pocket(value?)?;
            let idx = wheel_index(centre)?;
            // Table layout order: centre, then left/right pairs
            vec![
                centre,
                WHEEL_ORDER[(idx + POCKET_COUNT - 1) % POCKET_COUNT],
                WHEEL_ORDER[(idx + 1) % POCKET_COUNT],
            ]
        }
        BetType::Split
        | BetType::Street
        | BetType::Corner
        | BetType::Line
        | BetType::Other(_) => return None,
    };
    Some(numbers)
}

fn pocket(value: i64) -> Option<u8> {
    u8::try_from(value).ok().filter(|n| *n <= MAX_NUMBER)
}

fn selector(value: i64) -> Option<u8> {
    u8::try_from(value).ok().filter(|v| (1..=3).contains(v))
}
