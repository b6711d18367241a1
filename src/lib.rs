// Core infrastructure modules
pub mod config;
pub mod core;
pub mod models;

// Example workflows and console output
pub mod results_grid;
pub mod runner;
pub mod samples;
pub mod setup;

#[cfg(test)]
pub(crate) mod test_utils;
