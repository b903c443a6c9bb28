//! AI systems (decide + act phases of NpcTick)

pub mod actions;
pub mod decide;

// Re-export all systems
pub use actions::*;
pub use decide::*;
