// src/lib.rs

#[macro_use]
pub mod log;

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod specs;

pub mod fetch;
pub mod file;
pub mod kml;
pub mod progress;
pub mod runner;

pub use error::AupError;
pub use runner::{ run, RunOutcome };
