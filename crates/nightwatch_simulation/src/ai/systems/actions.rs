//! Deferred actions: исполнение ScheduledActions по SimClock.

use bevy::prelude::*;

use crate::ai::AgentBrain;
use crate::components::BodyParts;
use crate::perception::SightConfig;
use crate::projectile::ProjectileSpawnRequested;
use crate::schedules::SimClock;
use crate::timing::{DeferredAction, ScheduledActions};

/// System: снимает due действия и исполняет их
///
/// Perception/цель здесь не проверяются: выстрел, уже запланированный,
/// завершается даже после потери цели. Despawned стрелок → снаряд всё равно
/// летит из origin, зафиксированного при trigger.
pub fn execute_scheduled_actions(
    clock: Res<SimClock>,
    mut scheduled: ResMut<ScheduledActions>,
    shooters: Query<(&Transform, &AgentBrain, &SightConfig, Option<&BodyParts>)>,
    mut spawn_requests: EventWriter<ProjectileSpawnRequested>,
) {
    for action in scheduled.drain_due(clock.now()) {
        match action {
            DeferredAction::SpawnProjectile {
                shooter,
                aim_point,
                fallback_origin,
                speed,
                damage,
            } => {
                let mut spawn_position = fallback_origin;
                let mut ignore = vec![shooter];

                if let Ok((transform, brain, sight, body_parts)) = shooters.get(shooter) {
                    // Есть shoot_origin offset → точка вылета по текущему Transform
                    if let Some(config) = brain.as_shooter().map(|brain| brain.config) {
                        if config.shoot_origin.is_some() {
                            spawn_position = config.origin(transform, sight);
                        }
                    }
                    if let Some(parts) = body_parts {
                        ignore.extend(parts.0.iter().copied());
                    }
                }

                crate::log(&format!(
                    "💥 {:?}: projectile spawn at {:?} → {:?} (t = {:.3})",
                    shooter,
                    spawn_position,
                    aim_point,
                    clock.now()
                ));
                spawn_requests.write(ProjectileSpawnRequested {
                    shooter,
                    spawn_position,
                    aim_point,
                    speed,
                    damage,
                    ignore,
                });
            }
        }
    }
}
