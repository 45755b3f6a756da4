pub mod config;
pub mod error;
pub mod solver;
pub mod telemetry;
pub mod workflows;
