//! Decide systems: player requests + тик state machines.

use bevy::prelude::*;

use crate::ai::{AgentBehavior, AgentBrain, BrainContext, BrainOutput, MoveRequest, ShootTriggered};
use crate::geometry::Geometry;
use crate::navigation::{NavAgent, SpeedTiers};
use crate::perception::{Perception, SightConfig};
use crate::schedules::SimClock;
use crate::timing::ScheduledActions;
use crate::waypoints::Waypoints;
use crate::DeterministicRng;

/// System: MoveRequest → player-directed агенты
///
/// Запрос к агенту без PlayerDirected brain игнорируется.
pub fn apply_move_requests(
    mut requests: EventReader<MoveRequest>,
    mut agents: Query<(&mut AgentBrain, &mut NavAgent, &SpeedTiers)>,
) {
    for request in requests.read() {
        let Ok((mut brain, mut nav, tiers)) = agents.get_mut(request.agent) else {
            crate::log_warning(&format!("MoveRequest: agent {:?} not found", request.agent));
            continue;
        };
        let Some(player) = brain.as_player_mut() else {
            crate::log_warning(&format!("MoveRequest: {:?} is not player-directed", request.agent));
            continue;
        };

        player.request_move(request.point, &mut nav, tiers);
        crate::log(&format!("🖱️ {:?}: move to {:?}", request.agent, request.point));
    }
}

/// System: один тик каждого brain'а
///
/// Порядок итерации Query стабилен для одного и того же порядка spawn,
/// поэтому RNG потребляется детерминированно.
pub fn tick_agent_brains(
    clock: Res<SimClock>,
    geometry: Res<Geometry>,
    mut rng: ResMut<DeterministicRng>,
    mut scheduled: ResMut<ScheduledActions>,
    mut shots: EventWriter<ShootTriggered>,
    mut agents: Query<(
        Entity,
        &mut AgentBrain,
        &mut Transform,
        &mut NavAgent,
        &SpeedTiers,
        &SightConfig,
        &Perception,
        Option<&Waypoints>,
    )>,
) {
    let mut outputs = Vec::new();

    for (entity, mut brain, mut transform, mut nav, tiers, sight, perception, waypoints) in agents.iter_mut() {
        let previous = brain.state_name();

        let mut ctx = BrainContext {
            entity,
            now: clock.now(),
            delta: clock.delta(),
            transform: &mut *transform,
            nav: &mut *nav,
            tiers,
            sight,
            perception,
            waypoints,
            geometry: geometry.oracle(),
            rng: &mut rng.rng,
            outputs: &mut outputs,
        };
        brain.tick(&mut ctx);

        let current = brain.state_name();
        if previous != current {
            crate::log(&format!("🧠 {:?}: {} → {}", entity, previous, current));
        }

        for output in outputs.drain(..) {
            match output {
                BrainOutput::Shoot { aim_direction } => {
                    shots.write(ShootTriggered {
                        shooter: entity,
                        aim_direction,
                    });
                }
                BrainOutput::Schedule { due, action } => {
                    scheduled.schedule(due, action);
                }
            }
        }
    }
}
