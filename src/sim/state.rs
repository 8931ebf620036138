//! Car entities and the field they drive on
//!
//! Everything the scheduler mutates lives here. Cars are built by the caller
//! and only their position, direction and status change during a run.

use anyhow::{Result, ensure};
use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::direction::Direction;

/// One symbol of a car's command sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Forward,
    TurnLeft,
    TurnRight,
    /// Anything else; skipped at execution time
    Unknown(char),
}

impl Command {
    pub fn from_symbol(c: char) -> Self {
        match c {
            'F' => Command::Forward,
            'L' => Command::TurnLeft,
            'R' => Command::TurnRight,
            other => Command::Unknown(other),
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Command::Forward => 'F',
            Command::TurnLeft => 'L',
            Command::TurnRight => 'R',
            Command::Unknown(c) => c,
        }
    }

    /// Parse a raw command string, one command per character
    pub fn parse_all(raw: &str) -> Vec<Command> {
        raw.chars().map(Command::from_symbol).collect()
    }
}

/// Terminal outcome of a car. Once set the car is frozen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CarStatus {
    /// Two cars reached the same cell in the same step
    Collided { other: String, pos: IVec2, step: usize },
    /// Forward move would have left the field
    OutOfBounds { step: usize },
}

impl CarStatus {
    /// Step (1-based) at which the car froze
    pub fn step(&self) -> usize {
        match self {
            CarStatus::Collided { step, .. } | CarStatus::OutOfBounds { step } => *step,
        }
    }
}

/// A car on the field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    pub(crate) name: String,
    pub(crate) pos: IVec2,
    pub(crate) direction: Direction,
    pub(crate) commands: Vec<Command>,
    #[serde(default)]
    pub(crate) status: Option<CarStatus>,
}

impl Car {
    pub fn new(name: impl Into<String>, pos: IVec2, direction: Direction, commands: &str) -> Self {
        Self {
            name: name.into(),
            pos,
            direction,
            commands: Command::parse_all(commands),
            status: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pos(&self) -> IVec2 {
        self.pos
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Commands as originally entered
    pub fn raw_commands(&self) -> String {
        self.commands.iter().map(|c| c.symbol()).collect()
    }

    pub fn status(&self) -> Option<&CarStatus> {
        self.status.as_ref()
    }

    /// True once a collision or out-of-bounds has been recorded
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.status.is_some()
    }

    /// Command for a 0-based step, or None when the sequence is exhausted
    #[inline]
    pub fn command_at(&self, step: usize) -> Option<Command> {
        self.commands.get(step).copied()
    }
}

/// Bounds of the simulation field. Valid cells are [0, width) x [0, height).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub width: i32,
    pub height: i32,
}

impl Field {
    pub fn new(width: i32, height: i32) -> Result<Self> {
        ensure!(
            width > 0 && height > 0,
            "Width and height must be positive integers."
        );
        Ok(Self { width, height })
    }

    #[inline]
    pub fn contains(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Looser check used when placing a car: both upper edges are inclusive
    pub fn accepts_start(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.x <= self.width && pos.y >= 0 && pos.y <= self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_car_new() {
        let car = Car::new("TestCar", IVec2::ZERO, Direction::North, "FFRFL");
        assert_eq!(car.name(), "TestCar");
        assert_eq!(car.pos(), IVec2::ZERO);
        assert_eq!(car.direction(), Direction::North);
        assert_eq!(car.commands().len(), 5);
        assert_eq!(car.raw_commands(), "FFRFL");
        assert!(!car.is_frozen());
    }

    #[test]
    fn test_unknown_commands_survive() {
        let car = Car::new("A", IVec2::ZERO, Direction::East, "FxL");
        assert_eq!(car.command_at(1), Some(Command::Unknown('x')));
        assert_eq!(car.command_at(3), None);
        assert_eq!(car.raw_commands(), "FxL");
    }

    #[test]
    fn test_field_bounds() {
        let field = Field::new(2, 3).unwrap();
        assert!(field.contains(IVec2::new(0, 0)));
        assert!(field.contains(IVec2::new(1, 2)));
        assert!(!field.contains(IVec2::new(2, 0)));
        assert!(!field.contains(IVec2::new(0, 3)));
        assert!(!field.contains(IVec2::new(-1, 0)));
        assert!(field.accepts_start(IVec2::new(2, 3)));
        assert!(!field.accepts_start(IVec2::new(3, 0)));
    }

    #[test]
    fn test_field_rejects_non_positive() {
        assert!(Field::new(0, 5).is_err());
        assert!(Field::new(5, -1).is_err());
    }

    #[test]
    fn test_status_step() {
        let status = CarStatus::Collided {
            other: "B".into(),
            pos: IVec2::new(1, 1),
            step: 4,
        };
        assert_eq!(status.step(), 4);
        assert_eq!(CarStatus::OutOfBounds { step: 2 }.step(), 2);
    }
}
