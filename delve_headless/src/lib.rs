// delve_headless: run delve worlds without a renderer.
//
// Drives the simulation crate end to end from the command line or from
// tests: generate a seeded world, plan dig paths to every room occupant,
// follow them, and report what happened. Useful for balance checks on world
// configs and as a smoke test of the whole pipeline.
//
// Module overview:
// - `scenario.rs`: `run_scenario` and `ScenarioReport`.
//
// The binary (`main.rs`) wraps `run_scenario` with argument parsing and
// logger setup.

pub mod scenario;

pub use scenario::{ScenarioReport, run_scenario};
