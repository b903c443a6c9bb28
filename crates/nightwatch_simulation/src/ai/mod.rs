//! AI decision-making module
//!
//! Четыре архетипа за одним интерфейсом (`AgentBrain` + `AgentBehavior`):
//! Evader, Patroller, Shooter, PlayerDirected.
//!
//! Порядок внутри NpcTick:
//! 1. apply_move_requests: MoveRequest → player-directed (Decide)
//! 2. tick_agent_brains: state machines, ShootTriggered, ScheduledActions (Decide)
//! 3. execute_scheduled_actions: due spawn'ы снарядов (Act)

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod systems;

pub use components::*;
pub use events::{MoveRequest, ShootTriggered};
pub use systems::*;

use crate::schedules::{NpcSet, NpcTick};

/// AI Plugin
///
/// Регистрирует события и системы в NpcTick (детерминированный chain).
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<MoveRequest>()
            .add_event::<ShootTriggered>()
            .add_systems(
                NpcTick,
                (apply_move_requests, tick_agent_brains)
                    .chain()
                    .in_set(NpcSet::Decide),
            )
            .add_systems(NpcTick, execute_scheduled_actions.in_set(NpcSet::Act));
    }
}
