//! Grid Cars - autonomous cars on a bounded grid
//!
//! Core modules:
//! - `sim`: Deterministic step-synchronized simulation (cars, turns, collisions)
//! - `prompt`: Interactive console front end and input validation
//! - `settings`: Runtime configuration

pub mod prompt;
pub mod settings;
pub mod sim;

pub use settings::Settings;
pub use sim::{Car, CarStatus, Command, Direction, Field, SimulationReport, run_simulation};

/// Simulation configuration constants
pub mod consts {
    /// Direction symbols in clockwise order (N -> E -> S -> W)
    pub const DIRECTION_SYMBOLS: [char; 4] = ['N', 'E', 'S', 'W'];
    /// Command symbols accepted when adding a car
    pub const COMMAND_SYMBOLS: [char; 3] = ['F', 'R', 'L'];

    /// Field size used by demo mode when no settings file overrides it
    pub const DEFAULT_FIELD_WIDTH: i32 = 10;
    pub const DEFAULT_FIELD_HEIGHT: i32 = 10;

    /// Demo scenario defaults
    pub const DEMO_CAR_COUNT: usize = 4;
    pub const DEMO_COMMAND_LEN: usize = 12;
    pub const DEMO_SEED: u64 = 12345;
}

/// True if `c` is one of the accepted command symbols
#[inline]
pub fn is_command_symbol(c: char) -> bool {
    consts::COMMAND_SYMBOLS.contains(&c)
}
