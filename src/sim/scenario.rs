//! Scenario construction
//!
//! Cars come from three places: the interactive prompt, a JSON scenario
//! file, or a seeded random generator. All of them go through the same
//! placement and command checks.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::direction::Direction;
use super::state::{Car, Field};
use crate::consts::COMMAND_SYMBOLS;
use crate::is_command_symbol;

pub const BAD_START_HINT: &str =
    "Please provide the appropriate co-ordinates within the range and direction between N E S W";
pub const BAD_COMMANDS_HINT: &str = "Please provide the allowed commands \"F\" \"R\" \"L\" ";

/// Validate a starting position and direction symbol
pub fn check_start(field: &Field, pos: IVec2, direction: &str) -> Result<Direction> {
    let mut chars = direction.chars();
    let parsed = match (chars.next(), chars.next()) {
        (Some(c), None) => Direction::from_symbol(c),
        _ => None,
    };
    match parsed {
        Some(d) if field.accepts_start(pos) => Ok(d),
        _ => anyhow::bail!(BAD_START_HINT),
    }
}

/// Validate that a command string only uses F, R and L
pub fn check_commands(raw: &str) -> Result<()> {
    ensure!(raw.chars().all(is_command_symbol), BAD_COMMANDS_HINT);
    Ok(())
}

/// A car as written in a scenario file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarSpec {
    pub name: String,
    pub x: i32,
    pub y: i32,
    /// One of "N", "E", "S", "W"
    pub direction: String,
    #[serde(default)]
    pub commands: String,
}

impl CarSpec {
    pub fn build(&self, field: &Field) -> Result<Car> {
        let pos = IVec2::new(self.x, self.y);
        let direction = check_start(field, pos, &self.direction)
            .with_context(|| format!("car {}", self.name))?;
        check_commands(&self.commands).with_context(|| format!("car {}", self.name))?;
        Ok(Car::new(self.name.clone(), pos, direction, &self.commands))
    }
}

/// A stored field plus cars
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub cars: Vec<CarSpec>,
}

impl Scenario {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("parsing scenario {}", path.display()))
    }

    pub fn field(&self) -> Result<Field> {
        Field::new(self.width, self.height)
    }

    /// Validate every car; the first invalid one aborts
    pub fn build_cars(&self) -> Result<(Field, Vec<Car>)> {
        let field = self.field()?;
        let cars = self
            .cars
            .iter()
            .map(|spec| spec.build(&field))
            .collect::<Result<Vec<_>>>()?;
        Ok((field, cars))
    }
}

/// Generate `count` cars with random starts and commands.
///
/// Same seed, field and sizes always give the same cars. Starting cells are
/// distinct; `count` is capped at the number of cells.
pub fn random_cars(seed: u64, count: usize, field: &Field, command_len: usize) -> Vec<Car> {
    let mut rng = Pcg32::seed_from_u64(seed);
    let cells = (field.width as usize).saturating_mul(field.height as usize);
    let count = count.min(cells);

    let mut used = HashSet::new();
    let mut cars = Vec::with_capacity(count);
    while cars.len() < count {
        let pos = IVec2::new(
            rng.random_range(0..field.width),
            rng.random_range(0..field.height),
        );
        if !used.insert(pos) {
            continue;
        }
        let direction = Direction::ALL[rng.random_range(0..Direction::ALL.len())];
        let commands: String = (0..command_len)
            .map(|_| COMMAND_SYMBOLS[rng.random_range(0..COMMAND_SYMBOLS.len())])
            .collect();
        let name = format!("Car{}", cars.len() + 1);
        cars.push(Car::new(name, pos, direction, &commands));
    }

    log::debug!("Generated {} cars from seed {}", cars.len(), seed);
    cars
}
