//! AI components: brain substrate + архетипы (state machines, configs).

pub mod brain;
pub mod evader;
pub mod patroller;
pub mod player;
pub mod shooter;

#[cfg(test)]
mod patroller_tests;
#[cfg(test)]
mod player_tests;

pub use brain::{AgentBehavior, AgentBrain, ArchetypeDefaults, BrainContext, BrainOutput, Locomotion};
pub use evader::{EvaderBrain, EvaderConfig, EvaderState};
pub use patroller::{PatrollerBrain, PatrollerConfig, PatrollerState};
pub use player::{PlayerConfig, PlayerDirectedBrain};
pub use shooter::{ShooterBrain, ShooterConfig, ShooterState};
