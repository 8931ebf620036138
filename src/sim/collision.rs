//! Position bookkeeping and collision classification
//!
//! Two tables drive every forward move:
//! - `StepReservations`: cells cars have moved into during the current step
//! - `OccupancyHistory`: every cell a car moved into during any completed step
//!
//! A cell stays in the history after its occupant leaves. Moving into such a
//! cell is refused without freezing the car.

use std::collections::HashMap;

use glam::IVec2;

use super::state::{Car, CarStatus, Field};

/// Outcome of checking a forward move against the field and both tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveCheck {
    /// Target lies outside the field
    OutOfBounds,
    /// Another car (by index) already moved into the target this step
    Contested { holder: usize },
    /// Target is free; the move can be committed
    Clear,
    /// Target was occupied at the end of an earlier step; the move is dropped
    Blocked { previous: usize },
}

/// Cells claimed during the current step, mapped to the claiming car's index
#[derive(Debug, Clone, Default)]
pub struct StepReservations {
    cells: HashMap<IVec2, usize>,
}

impl StepReservations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn holder(&self, pos: IVec2) -> Option<usize> {
        self.cells.get(&pos).copied()
    }

    pub fn reserve(&mut self, pos: IVec2, car_index: usize) {
        self.cells.insert(pos, car_index);
    }
}

/// Cells finalized by any completed step, mapped to the last car that moved in
#[derive(Debug, Clone, Default)]
pub struct OccupancyHistory {
    cells: HashMap<IVec2, usize>,
}

impl OccupancyHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn occupant(&self, pos: IVec2) -> Option<usize> {
        self.cells.get(&pos).copied()
    }

    /// Fold a finished step's reservations into the history
    pub fn merge(&mut self, step: StepReservations) {
        self.cells.extend(step.cells);
    }

    /// Number of cells ever moved into
    pub fn visited_cells(&self) -> usize {
        self.cells.len()
    }
}

/// Classify a forward move into `target`. Checks run in a fixed order:
/// bounds, same-step contention, then earlier occupancy.
pub fn check_move(
    field: &Field,
    reservations: &StepReservations,
    history: &OccupancyHistory,
    target: IVec2,
) -> MoveCheck {
    if !field.contains(target) {
        return MoveCheck::OutOfBounds;
    }
    if let Some(holder) = reservations.holder(target) {
        return MoveCheck::Contested { holder };
    }
    match history.occupant(target) {
        Some(previous) => MoveCheck::Blocked { previous },
        None => MoveCheck::Clear,
    }
}

/// Record that `car` collided with `other_name` at `pos`.
///
/// `step` is stored verbatim; the scheduler passes the 1-based step.
pub fn mark_collision(car: &mut Car, other_name: &str, pos: IVec2, step: usize) {
    car.status = Some(CarStatus::Collided {
        other: other_name.to_string(),
        pos,
        step,
    });
}
