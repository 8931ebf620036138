//! Compass directions and unit-step motion
//!
//! Directions form a cycle N -> E -> S -> W -> N. Turning right walks the
//! cycle forward, turning left walks it backward. "North" is +y.

use std::fmt;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::consts::DIRECTION_SYMBOLS;

/// Heading of a car on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All directions in clockwise order
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Position in the clockwise cycle (North = 0)
    #[inline]
    fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }

    pub fn symbol(self) -> char {
        DIRECTION_SYMBOLS[self.index()]
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        DIRECTION_SYMBOLS
            .iter()
            .position(|&s| s == c)
            .map(|i| Self::ALL[i])
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Rotate a quarter turn counterclockwise
#[inline]
pub fn turn_left(d: Direction) -> Direction {
    Direction::ALL[(d.index() + 3) % 4]
}

/// Rotate a quarter turn clockwise
#[inline]
pub fn turn_right(d: Direction) -> Direction {
    Direction::ALL[(d.index() + 1) % 4]
}

/// Unit displacement for one step forward
#[inline]
pub fn forward_delta(d: Direction) -> IVec2 {
    match d {
        Direction::North => IVec2::new(0, 1),
        Direction::East => IVec2::new(1, 0),
        Direction::South => IVec2::new(0, -1),
        Direction::West => IVec2::new(-1, 0),
    }
}
