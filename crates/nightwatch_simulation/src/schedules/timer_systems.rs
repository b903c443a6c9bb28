//! Timer systems: FixedUpdate → NpcTick

use bevy::prelude::*;

use super::{NpcTick, SimClock};
use crate::ai::{MoveRequest, ShootTriggered};
use crate::projectile::{ProjectileHit, ProjectileSpawnRequested};

/// System: один NpcTick на каждый FixedUpdate (60 Hz)
///
/// Exclusive system (требует &mut World для run_schedule).
/// Внутри FixedUpdate `Time` = `Time<Fixed>`, delta стабильный.
/// Буферы событий в этом режиме ротирует сам Bevy (`First`).
pub fn run_npc_tick(world: &mut World) {
    let delta = world.resource::<Time<Fixed>>().delta_secs();
    run_tick(world, delta);
}

/// Продвигает SimClock на `delta` и прогоняет один NpcTick
///
/// Используется напрямую тестами / headless binary (детерминированный шаг
/// без реального времени). Перед тиком ротирует буферы событий симуляции:
/// после вызова `iter_current_update_events()` отдаёт события ровно этого тика,
/// события старше двух тиков отбрасываются.
pub fn step_simulation(world: &mut World, delta: f32) {
    update_events::<MoveRequest>(world);
    update_events::<ShootTriggered>(world);
    update_events::<ProjectileSpawnRequested>(world);
    update_events::<ProjectileHit>(world);
    run_tick(world, delta);
}

fn run_tick(world: &mut World, delta: f32) {
    world.resource_mut::<SimClock>().advance(delta);
    world.run_schedule(NpcTick);
}

fn update_events<E: Event>(world: &mut World) {
    if let Some(mut events) = world.get_resource_mut::<Events<E>>() {
        events.update();
    }
}
