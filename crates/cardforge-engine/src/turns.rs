//! Seat-ring turn arithmetic.

use serde::{Deserialize, Serialize};

use std::fmt;

/// Direction of play around the seat ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    /// The opposite direction (a Reverse play).
    pub fn flipped(self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Clockwise => write!(f, "clockwise"),
            Direction::CounterClockwise => write!(f, "counterClockwise"),
        }
    }
}

/// Advances `skip + 1` seats from `current` around a ring of `total`
/// seats, respecting `direction`. A ring of one (or zero) seats returns
/// `current` unchanged.
pub fn next_player_index(
    current: usize,
    total: usize,
    direction: Direction,
    skip: usize,
) -> usize {
    if total <= 1 {
        return current;
    }
    let steps = (skip + 1) % total;
    match direction {
        Direction::Clockwise => (current + steps) % total,
        Direction::CounterClockwise => (current + total - steps) % total,
    }
}

/// Exactly two players. In heads-up play a Reverse behaves as a Skip —
/// that policy belongs to the session controller, this is just the
/// predicate.
pub fn is_heads_up(player_count: usize) -> bool {
    player_count == 2
}
