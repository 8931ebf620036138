//! Grid Cars entry point
//!
//! Usage:
//!   grid-cars                          interactive prompt
//!   grid-cars --scenario cars.json     run a stored scenario
//!   grid-cars --demo [seed]            run a seeded random scenario
//!
//! Extra flags: `--settings <file>` picks the settings file, `--save-settings`
//! writes the effective settings back to it, `--json` prints final car states
//! as JSON instead of text.

use std::io;

use anyhow::{Context, Result};

use grid_cars::prompt::Prompt;
use grid_cars::settings::SETTINGS_FILE;
use grid_cars::sim::report::car_list_entry;
use grid_cars::sim::{Car, Field, Scenario, random_cars, run_simulation};
use grid_cars::Settings;

#[derive(Debug, PartialEq)]
struct Args {
    scenario: Option<String>,
    demo: Option<Option<u64>>,
    settings: String,
    save_settings: bool,
    json: bool,
}

/// Parse command-line flags (without the program name)
fn parse_args(argv: impl Iterator<Item = String>) -> Result<Args> {
    let mut args = Args {
        scenario: None,
        demo: None,
        settings: SETTINGS_FILE.to_string(),
        save_settings: false,
        json: false,
    };
    let mut iter = argv.peekable();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--scenario" => {
                args.scenario = Some(iter.next().context("--scenario needs a file")?);
            }
            "--settings" => {
                args.settings = iter.next().context("--settings needs a file")?;
            }
            "--demo" => {
                let seed = match iter.peek() {
                    Some(next) if !next.starts_with("--") => {
                        let seed: u64 = next.parse().with_context(|| format!("bad seed {:?}", next))?;
                        iter.next();
                        Some(seed)
                    }
                    _ => None,
                };
                args.demo = Some(seed);
            }
            "--save-settings" => args.save_settings = true,
            "--json" => args.json = true,
            other => anyhow::bail!("unknown argument {:?}", other),
        }
    }
    Ok(args)
}

fn print_results(cars: &mut [Car], field: &Field, json: bool) -> Result<()> {
    for car in cars.iter() {
        println!("{}", car_list_entry(car));
    }
    let report = run_simulation(cars, field);
    if json {
        println!("{}", serde_json::to_string_pretty(&*cars)?);
    } else {
        println!("After simulation, the result is:");
        println!("{}", report);
    }
    if !report.completed {
        log::warn!("Simulation stopped early after {} steps", report.steps_run);
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    log::info!("Grid Cars starting...");

    let args = parse_args(std::env::args().skip(1))?;
    let settings = Settings::load(&args.settings);
    if args.save_settings {
        settings.save(&args.settings)?;
    }

    if let Some(path) = &args.scenario {
        let (field, mut cars) = Scenario::load(path)?.build_cars()?;
        return print_results(&mut cars, &field, args.json);
    }

    if let Some(seed) = args.demo {
        let seed = seed.unwrap_or(settings.seed);
        let field = settings.demo_field()?;
        let mut cars = random_cars(seed, settings.demo_cars, &field, settings.demo_command_len);
        println!(
            "Demo field {} x {} with {} cars (seed {})",
            field.width,
            field.height,
            cars.len(),
            seed
        );
        return print_results(&mut cars, &field, args.json);
    }

    let stdin = io::stdin();
    let mut prompt = Prompt::new(stdin.lock(), io::stdout(), &settings);
    prompt.run()
}
