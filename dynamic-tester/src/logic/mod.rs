pub mod reports;
pub mod seeds;
pub mod simulation;

pub use seeds::resolve_seed_inputs;
pub use simulation::{
    DynamicSimulation, PlayerAggregate, SimulationRecord, SimulationSettings,
    aggregate_by_players,
};
