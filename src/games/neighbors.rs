//! Racetrack neighbor lookups on the physical wheel

use crate::errors::GameError;
use crate::games::wheel::{wheel_index, MAX_NUMBER, POCKET_COUNT, WHEEL_ORDER};

/// Largest radius accepted by default
pub const MAX_RADIUS: u8 = 4;

/// Pockets physically adjacent to `number` on the wheel.
///
/// Walks offsets `-radius..=radius` (skipping 0) in ascending order, so the
/// counter-clockwise pockets come first, farthest first, followed by the
/// clockwise pockets, nearest first. The result always has `2 * radius`
/// entries.
pub fn neighbors(number: i64, radius: i64) -> Result<Vec<u8>, GameError> {
    neighbors_within(number, radius, MAX_RADIUS)
}

/// Same as [`neighbors`] with a configurable upper bound on the radius
pub fn neighbors_within(number: i64, radius: i64, max_radius: u8) -> Result<Vec<u8>, GameError> {
    let number = u8::try_from(number)
        .ok()
        .filter(|n| *n <= MAX_NUMBER)
        .ok_or(GameError::InvalidNumber(number))?;

    if radius < 1 || radius > i64::from(max_radius) {
        return Err(GameError::InvalidRadius {
            radius,
            max: max_radius,
        });
    }

    Ok(wheel_neighbors(number, radius as usize))
}

/// Unchecked lookup. A number missing from the wheel yields an empty list
/// rather than a panic; callers validate before getting here.
pub fn wheel_neighbors(number: u8, radius: usize) -> Vec<u8> {
    let Some(idx) = wheel_index(number) else {
        return Vec::new();
    };

    let radius = radius as isize;
    let len = POCKET_COUNT as isize;
    (-radius..=radius)
        .filter(|offset| *offset != 0)
        .map(|offset| WHEEL_ORDER[(idx as isize + offset).rem_euclid(len) as usize])
        .collect()
}
