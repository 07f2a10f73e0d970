pub mod config;
pub mod record;
pub mod runner;
pub mod telemetry;
pub mod worker;
