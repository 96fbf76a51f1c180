pub mod aggregate;
pub mod charger;
/// Tick clock for timestep management.
pub mod clock;
pub mod orchestrator;
/// Seeded arrival and demand sampling.
pub mod random;
pub mod rollup;
pub mod summation;
pub mod types;
pub mod worker;
