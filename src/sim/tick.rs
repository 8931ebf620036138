//! Step scheduler
//!
//! Advances every car by one command per global step, in car list order.
//! Car order is the tie-break: the first car into a cell holds it for the step.

use std::panic::{self, AssertUnwindSafe};

use anyhow::{Result, anyhow, bail};
use glam::IVec2;

use super::collision::{MoveCheck, OccupancyHistory, StepReservations, check_move, mark_collision};
use super::direction::{Direction, forward_delta, turn_left, turn_right};
use super::report::SimulationReport;
use super::state::{Car, CarStatus, Command, Field};

/// Number of steps a run takes: the longest command sequence (0 for no cars)
fn total_steps(cars: &[Car]) -> usize {
    cars.iter().map(|c| c.commands.len()).max().unwrap_or(0)
}

/// Run all cars to completion, mutating them in place.
///
/// Never fails. An internal fault during a step (error or panic) is logged and
/// ends the run; the cars keep whatever state they had reached and the report
/// is marked incomplete.
pub fn run_simulation(cars: &mut [Car], field: &Field) -> SimulationReport {
    let steps = total_steps(cars);
    log::info!(
        "Simulating {} cars on {}x{} field for {} steps",
        cars.len(),
        field.width,
        field.height,
        steps
    );

    let mut history = OccupancyHistory::new();
    let mut steps_run = 0;
    let mut completed = true;

    for step in 0..steps {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            run_step(cars, field, &mut history, step)
        }));
        match outcome {
            Ok(Ok(())) => steps_run += 1,
            Ok(Err(err)) => {
                log::error!("Error during simulation: {:#}", err);
                completed = false;
                break;
            }
            Err(payload) => {
                log::error!("Error during simulation: {}", panic_message(payload.as_ref()));
                completed = false;
                break;
            }
        }
    }

    let frozen = cars.iter().filter(|c| c.is_frozen()).count();
    log::info!(
        "Simulation finished after {}/{} steps, {} cars frozen, {} cells visited",
        steps_run,
        steps,
        frozen,
        history.visited_cells()
    );

    SimulationReport::from_cars(cars, steps_run, completed)
}

/// Execute one global step (0-based `step`)
fn run_step(
    cars: &mut [Car],
    field: &Field,
    history: &mut OccupancyHistory,
    step: usize,
) -> Result<()> {
    let mut reservations = StepReservations::new();
    // Reported steps are 1-based
    let reported = step + 1;

    for i in 0..cars.len() {
        let car = &mut cars[i];
        if car.is_frozen() {
            continue;
        }
        let Some(command) = car.command_at(step) else {
            continue;
        };

        match command {
            Command::TurnLeft => car.direction = turn_left(car.direction),
            Command::TurnRight => car.direction = turn_right(car.direction),
            Command::Unknown(c) => {
                log::debug!("{} ignores unknown command {:?} at step {}", car.name, c, reported);
            }
            Command::Forward => {
                let target = advance(car.pos, car.direction)?;
                match check_move(field, &reservations, history, target) {
                    MoveCheck::OutOfBounds => {
                        log::info!("{} goes out of bounds at step {}", car.name, reported);
                        car.status = Some(CarStatus::OutOfBounds { step: reported });
                    }
                    MoveCheck::Contested { holder } => {
                        let name = car.name.clone();
                        let Some(holder_car) = cars.get(holder) else {
                            bail!("cell {} reserved by missing car #{}", target, holder);
                        };
                        let holder_name = holder_car.name.clone();
                        log::info!(
                            "{} collides with {} at {} at step {}",
                            name,
                            holder_name,
                            target,
                            reported
                        );
                        mark_collision(&mut cars[i], &holder_name, target, reported);
                        mark_collision(&mut cars[holder], &name, target, reported);
                    }
                    MoveCheck::Clear => {
                        log::debug!("{} moves to {} at step {}", car.name, target, reported);
                        reservations.reserve(target, i);
                        car.pos = target;
                    }
                    MoveCheck::Blocked { previous } => {
                        log::warn!(
                            "{} blocked at {}: cell was taken by car #{} in an earlier step",
                            car.name,
                            target,
                            previous
                        );
                    }
                }
            }
        }
    }

    history.merge(reservations);
    Ok(())
}

/// Position one step forward, failing on integer overflow
fn advance(pos: IVec2, direction: Direction) -> Result<IVec2> {
    let delta = forward_delta(direction);
    let x = pos.x.checked_add(delta.x);
    let y = pos.y.checked_add(delta.y);
    match (x, y) {
        (Some(x), Some(y)) => Ok(IVec2::new(x, y)),
        _ => Err(anyhow!("coordinate overflow moving {} from {}", direction, pos)),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn field(w: i32, h: i32) -> Field {
        Field::new(w, h).unwrap()
    }

    #[test]
    fn test_single_car_moves() {
        let mut cars = vec![Car::new("Car1", IVec2::new(0, 0), Direction::North, "F")];
        let report = run_simulation(&mut cars, &field(2, 2));
        assert_eq!(cars[0].pos(), IVec2::new(0, 1));
        assert!(!cars[0].is_frozen());
        assert!(report.completed);
        assert_eq!(report.steps_run, 1);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut cars = vec![Car::new("CarA", IVec2::new(0, 2), Direction::North, "F")];
        run_simulation(&mut cars, &field(2, 2));
        assert_eq!(cars[0].to_string(), "- CarA, goes out of bounds at step 1");
        assert_eq!(cars[0].pos(), IVec2::new(0, 2));
    }

    #[test]
    fn test_multiple_cars_collide() {
        let mut cars = vec![
            Car::new("Car1", IVec2::new(1, 2), Direction::North, "FFRFFFFRRL"),
            Car::new("Car2", IVec2::new(7, 8), Direction::West, "FFLFFFFFFF"),
        ];
        run_simulation(&mut cars, &field(10, 10));

        let expected_pos = IVec2::new(5, 4);
        assert_eq!(
            cars[0].status(),
            Some(&CarStatus::Collided {
                other: "Car2".into(),
                pos: expected_pos,
                step: 7,
            })
        );
        assert_eq!(
            cars[1].status(),
            Some(&CarStatus::Collided {
                other: "Car1".into(),
                pos: expected_pos,
                step: 7,
            })
        );
        // Car1 got there first; Car2 never entered the cell
        assert_eq!(cars[0].pos(), expected_pos);
        assert_eq!(cars[1].pos(), IVec2::new(5, 5));

        let report = SimulationReport::from_cars(&cars, 10, true);
        assert_eq!(
            report.to_string(),
            "- Car1, collides with Car2 at (5,4) at step 7\n\
             - Car2, collides with Car1 at (5,4) at step 7"
        );
    }

    #[test]
    fn test_turns_only() {
        let mut cars = vec![Car::new("Spinner", IVec2::new(1, 1), Direction::North, "RRL")];
        run_simulation(&mut cars, &field(3, 3));
        assert_eq!(cars[0].direction(), Direction::East);
        assert_eq!(cars[0].pos(), IVec2::new(1, 1));
    }

    #[test]
    fn test_unknown_commands_ignored() {
        let mut cars = vec![Car::new("A", IVec2::new(0, 0), Direction::East, "x?F")];
        let report = run_simulation(&mut cars, &field(3, 3));
        assert_eq!(cars[0].pos(), IVec2::new(1, 0));
        assert_eq!(report.steps_run, 3);
    }

    #[test]
    fn test_empty_car_list() {
        let mut cars: Vec<Car> = Vec::new();
        let report = run_simulation(&mut cars, &field(5, 5));
        assert_eq!(report.steps_run, 0);
        assert!(report.completed);
        assert!(report.is_empty());
    }

    #[test]
    fn test_previously_occupied_cell_blocks() {
        // A passes through (0,1) in step 1 and leaves in step 2. B tries (0,1) in step 3.
        let mut cars = vec![
            Car::new("A", IVec2::new(0, 0), Direction::North, "FF"),
            Car::new("B", IVec2::new(1, 1), Direction::West, "RLF"),
        ];
        run_simulation(&mut cars, &field(3, 3));

        assert_eq!(cars[0].pos(), IVec2::new(0, 2));
        assert_eq!(cars[1].pos(), IVec2::new(1, 1));
        assert_eq!(cars[1].direction(), Direction::West);
        assert!(!cars[1].is_frozen());
    }

    #[test]
    fn test_starting_cells_are_not_history() {
        // B drives into A's start cell after A left it; start cells are never recorded
        let mut cars = vec![
            Car::new("A", IVec2::new(0, 0), Direction::North, "F"),
            Car::new("B", IVec2::new(1, 0), Direction::West, "RLF"),
        ];
        run_simulation(&mut cars, &field(3, 3));
        assert_eq!(cars[1].pos(), IVec2::new(0, 0));
        assert!(!cars[1].is_frozen());
    }

    #[test]
    fn test_frozen_car_ignores_remaining_commands() {
        let mut cars = vec![Car::new("Runner", IVec2::new(0, 0), Direction::South, "FLLFF")];
        run_simulation(&mut cars, &field(4, 4));
        assert_eq!(cars[0].status(), Some(&CarStatus::OutOfBounds { step: 1 }));
        assert_eq!(cars[0].pos(), IVec2::new(0, 0));
        assert_eq!(cars[0].direction(), Direction::South);
    }

    #[test]
    fn test_later_contender_overwrites_holder_status() {
        // Three cars converge on (1,1) in step 1; the holder ends up referencing the last one
        let mut cars = vec![
            Car::new("A", IVec2::new(1, 0), Direction::North, "F"),
            Car::new("B", IVec2::new(0, 1), Direction::East, "F"),
            Car::new("C", IVec2::new(2, 1), Direction::West, "F"),
        ];
        run_simulation(&mut cars, &field(3, 3));
        let at = IVec2::new(1, 1);
        assert_eq!(
            cars[0].status(),
            Some(&CarStatus::Collided { other: "C".into(), pos: at, step: 1 })
        );
        assert_eq!(
            cars[1].status(),
            Some(&CarStatus::Collided { other: "A".into(), pos: at, step: 1 })
        );
        assert_eq!(
            cars[2].status(),
            Some(&CarStatus::Collided { other: "A".into(), pos: at, step: 1 })
        );
    }

    #[test]
    fn test_overflow_aborts_with_partial_results() {
        let huge = Field {
            width: i32::MAX,
            height: i32::MAX,
        };
        let mut cars = vec![
            Car::new("Mover", IVec2::new(0, 0), Direction::North, "FF"),
            Car::new("Edge", IVec2::new(i32::MAX, 0), Direction::East, "FF"),
        ];
        let report = run_simulation(&mut cars, &huge);
        assert!(!report.completed);
        assert_eq!(report.steps_run, 0);
        // Mover had already moved when the fault hit
        assert_eq!(cars[0].pos(), IVec2::new(0, 1));
        assert_eq!(cars[1].pos(), IVec2::new(i32::MAX, 0));
        assert_eq!(report.lines.len(), 2);
    }

    fn arb_car(index: usize) -> impl Strategy<Value = Car> {
        (
            0..6i32,
            0..6i32,
            prop::sample::select(Direction::ALL.to_vec()),
            "[FLRX]{0,12}",
        )
            .prop_map(move |(x, y, d, cmds)| Car::new(format!("Car{index}"), IVec2::new(x, y), d, &cmds))
    }

    fn arb_cars() -> impl Strategy<Value = Vec<Car>> {
        (1..5usize).prop_flat_map(|n| (0..n).map(arb_car).collect::<Vec<_>>())
    }

    proptest! {
        #[test]
        fn steps_match_longest_command_sequence(mut cars in arb_cars()) {
            let expected = cars.iter().map(|c| c.commands().len()).max().unwrap_or(0);
            let report = run_simulation(&mut cars, &field(6, 6));
            prop_assert!(report.completed);
            prop_assert_eq!(report.steps_run, expected);
        }

        #[test]
        fn frozen_cars_never_move(cars in arb_cars()) {
            let f = field(6, 6);
            let mut full = cars.clone();
            run_simulation(&mut full, &f);

            for (i, car) in full.iter().enumerate() {
                let Some(status) = car.status() else { continue };
                // Replay up to the freezing step and compare
                let mut replay = cars.clone();
                for c in replay.iter_mut() {
                    c.commands.truncate(status.step());
                }
                run_simulation(&mut replay, &f);
                prop_assert_eq!(replay[i].pos(), car.pos());
                prop_assert_eq!(replay[i].direction(), car.direction());
            }
        }

        #[test]
        fn collisions_are_mutual(mut cars in arb_cars()) {
            run_simulation(&mut cars, &field(6, 6));
            for car in &cars {
                if let Some(CarStatus::Collided { other, pos, step }) = car.status() {
                    let partner = cars.iter().find(|c| c.name() == other).unwrap();
                    match partner.status() {
                        Some(CarStatus::Collided { other: back, pos: p, step: s }) => {
                            prop_assert_eq!(p, pos);
                            prop_assert_eq!(s, step);
                            // A third contender may have overwritten the holder's partner
                            if back != car.name() {
                                let third = cars.iter().find(|c| c.name() == back).unwrap();
                                let third_status = third.status().cloned();
                                prop_assert_eq!(
                                    third_status,
                                    Some(CarStatus::Collided {
                                        other: partner.name().to_string(),
                                        pos: *pos,
                                        step: *step,
                                    })
                                );
                            }
                        }
                        other_status => prop_assert!(false, "partner status {:?}", other_status),
                    }
                }
            }
        }

        #[test]
        fn inactive_cars_unchanged(x in 0..6i32, y in 0..6i32) {
            let idle = Car::new("Idle", IVec2::new(x, y), Direction::South, "");
            let mut cars = vec![
                idle.clone(),
                Car::new("Busy", IVec2::new(0, 0), Direction::North, "RLRL"),
            ];
            run_simulation(&mut cars, &field(6, 6));
            prop_assert_eq!(&cars[0], &idle);
        }
    }
}
