pub mod assumptions;
pub mod monte_carlo;
pub mod simulation_service;

pub use assumptions::{assumption_for, ReturnAssumption};
pub use monte_carlo::{
    run_simulation, GlidepathLookup, PathPoint, SimulationInputs, SimulationResult,
    WithdrawalMode,
};
pub use simulation_service::{ProjectionRequest, SimulationService};
