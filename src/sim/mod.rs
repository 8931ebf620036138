//! Deterministic simulation module
//!
//! All movement and collision logic lives here. This module must be pure and deterministic:
//! - Discrete global steps only
//! - Stable iteration order (car list order is the tie-break)
//! - No console or platform dependencies

pub mod collision;
pub mod direction;
pub mod report;
pub mod scenario;
pub mod state;
pub mod tick;

pub use collision::{OccupancyHistory, StepReservations, mark_collision};
pub use direction::{Direction, forward_delta, turn_left, turn_right};
pub use report::SimulationReport;
pub use scenario::{CarSpec, Scenario, random_cars};
pub use state::{Car, CarStatus, Command, Field};
pub use tick::run_simulation;
