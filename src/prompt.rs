//! Interactive console front end
//!
//! Asks for the field size, then loops over a small menu to add cars or run
//! the simulation. Generic over the reader and writer so it can be driven
//! from tests.

use std::io::{BufRead, Write};

use anyhow::{Context, Result, bail};
use glam::IVec2;

use crate::settings::Settings;
use crate::sim::report::car_list_entry;
use crate::sim::scenario::{check_commands, check_start};
use crate::sim::{Car, Field, run_simulation};

/// Parse "width height" into a field
pub fn parse_dimensions(line: &str) -> Result<Field> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let [w, h] = parts.as_slice() else {
        bail!("expected two values, got {}", parts.len());
    };
    let width: i32 = w.parse().with_context(|| format!("width {:?}", w))?;
    let height: i32 = h.parse().with_context(|| format!("height {:?}", h))?;
    Field::new(width, height)
}

/// Parse "x y direction" into a position and the raw direction symbol
pub fn parse_start(line: &str) -> Result<(IVec2, String)> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let [x, y, d] = parts.as_slice() else {
        bail!("expected \"x y direction\", got {} values", parts.len());
    };
    let x: i32 = x.parse().with_context(|| format!("x {:?}", x))?;
    let y: i32 = y.parse().with_context(|| format!("y {:?}", y))?;
    Ok((IVec2::new(x, y), d.to_string()))
}

/// One interactive session
pub struct Prompt<R, W> {
    input: R,
    out: W,
    echo_car_list: bool,
    cars: Vec<Car>,
}

enum Flow {
    Continue,
    Exit,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, out: W, settings: &Settings) -> Self {
        Self {
            input,
            out,
            echo_car_list: settings.echo_car_list,
            cars: Vec::new(),
        }
    }

    /// Cars currently on the field
    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    /// Run until the user exits or input ends
    pub fn run(&mut self) -> Result<()> {
        writeln!(self.out, "Welcome to Auto Driving Car Simulation!")?;
        writeln!(
            self.out,
            "Please enter the width and height of simulation field in x y format:"
        )?;
        let Some(line) = self.read_line()? else {
            return Ok(());
        };
        let field = match parse_dimensions(&line) {
            Ok(field) => field,
            Err(e) => {
                writeln!(self.out, "Invalid input for field dimensions: {:#}", e)?;
                return Ok(());
            }
        };
        writeln!(
            self.out,
            "\nYou have created a field of {} x {}.",
            field.width, field.height
        )?;

        loop {
            writeln!(
                self.out,
                "Please choose from the following options:\n[1] Add a car to field\n[2] Run simulation"
            )?;
            let Some(choice) = self.read_line()? else {
                break;
            };
            let flow = match choice.trim() {
                "1" => self.add_car(&field)?,
                "2" => self.simulate(&field)?,
                _ => Flow::Continue,
            };
            if let Flow::Exit = flow {
                break;
            }
        }

        log::info!("Session ended with {} cars", self.cars.len());
        Ok(())
    }

    fn add_car(&mut self, field: &Field) -> Result<Flow> {
        writeln!(self.out, "\nPlease enter the name of the car:")?;
        let Some(name) = self.read_line()? else {
            return Ok(Flow::Exit);
        };
        writeln!(
            self.out,
            "\nPlease enter initial position of Car {} in \"x y direction\" format",
            name
        )?;
        let Some(line) = self.read_line()? else {
            return Ok(Flow::Exit);
        };
        let (pos, symbol) = match parse_start(&line) {
            Ok(parsed) => parsed,
            Err(e) => {
                writeln!(self.out, "Error adding car: {:#}", e)?;
                return Ok(Flow::Continue);
            }
        };
        let direction = match check_start(field, pos, &symbol) {
            Ok(d) => d,
            Err(e) => {
                writeln!(self.out, "{}", e)?;
                return Ok(Flow::Continue);
            }
        };

        writeln!(self.out, "Please enter the commands for car {}:", name)?;
        let Some(commands) = self.read_line()? else {
            return Ok(Flow::Exit);
        };
        if let Err(e) = check_commands(&commands) {
            writeln!(self.out, "{}", e)?;
            return Ok(Flow::Continue);
        }

        log::debug!("Added car {} at {} facing {}", name, pos, direction);
        self.cars.push(Car::new(name, pos, direction, &commands));
        if self.echo_car_list {
            writeln!(self.out, "Your current list of cars are:\n")?;
            self.write_car_list()?;
        }
        Ok(Flow::Continue)
    }

    fn simulate(&mut self, field: &Field) -> Result<Flow> {
        if self.cars.is_empty() {
            writeln!(self.out, "There is no car added pls add the car")?;
            return Ok(Flow::Continue);
        }

        writeln!(self.out, "\nYour current list of cars are:")?;
        self.write_car_list()?;
        let report = run_simulation(&mut self.cars, field);
        writeln!(self.out, "After simulation, the result is:")?;
        writeln!(self.out, "{}", report)?;

        writeln!(
            self.out,
            "Please choose from the following options:\n[1] start over\n[2] exit"
        )?;
        let Some(choice) = self.read_line()? else {
            return Ok(Flow::Exit);
        };
        match choice.trim() {
            "1" => {
                self.cars.clear();
                Ok(Flow::Continue)
            }
            "2" => Ok(Flow::Exit),
            _ => Ok(Flow::Continue),
        }
    }

    fn write_car_list(&mut self) -> Result<()> {
        for car in &self.cars {
            writeln!(self.out, "{}", car_list_entry(car))?;
        }
        Ok(())
    }

    /// Next line without its line ending, or None at end of input
    fn read_line(&mut self) -> Result<Option<String>> {
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}
