//! Text rendering of cars and simulation results
//!
//! Statuses are stored as data and only turned into sentences here.

use std::fmt;

use serde::Serialize;

use super::state::{Car, CarStatus};

impl fmt::Display for Car {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            Some(CarStatus::Collided { other, pos, step }) => write!(
                f,
                "- {}, collides with {} at ({},{}) at step {}",
                self.name, other, pos.x, pos.y, step
            ),
            Some(CarStatus::OutOfBounds { step }) => {
                write!(f, "- {}, goes out of bounds at step {}", self.name, step)
            }
            None => write!(
                f,
                "- {}, ({},{}), {}",
                self.name, self.pos.x, self.pos.y, self.direction
            ),
        }
    }
}

/// Car line followed by its raw commands, as shown in the car list
pub fn car_list_entry(car: &Car) -> String {
    format!("{}, {}", car, car.raw_commands())
}

/// Final state of a simulation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    /// Steps fully executed
    pub steps_run: usize,
    /// False if the run stopped early on an internal fault
    pub completed: bool,
    /// One rendered line per car, in car list order
    pub lines: Vec<String>,
}

impl SimulationReport {
    pub fn from_cars(cars: &[Car], steps_run: usize, completed: bool) -> Self {
        Self {
            steps_run,
            completed,
            lines: cars.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines.join("\n"))
    }
}
