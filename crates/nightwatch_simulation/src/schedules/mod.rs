//! NpcTick schedule + SimClock
//!
//! # Архитектура
//!
//! **FixedUpdate (60 Hz)** → run_npc_tick (exclusive)
//!   ├─ SimClock.advance(fixed delta)
//!   └─ world.run_schedule(NpcTick)
//!
//! Все cooldown'ы и dwell таймеры считаются от SimClock, не от wall-clock.
//! Пауза Time<Virtual> → FixedUpdate не тикает → все таймеры стоят одинаково.
//! Тесты гоняют `step_simulation(world, dt)` напрямую, без реального времени.

use std::time::Duration;

use bevy::ecs::schedule::ScheduleLabel;
use bevy::prelude::*;

pub mod timer_systems;

pub use timer_systems::{run_npc_tick, step_simulation};

/// Custom schedule: один логический тик всех NPC
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct NpcTick;

/// Порядок фаз внутри NpcTick (chain)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum NpcSet {
    /// Target acquisition + perception (FOV/range/occlusion)
    Sense,
    /// Player requests + agent brains (state machines)
    Decide,
    /// Deferred actions (projectile spawn после задержки)
    Act,
    /// Navigation / projectile backends (headless реализации)
    Integrate,
    /// Animation signal (blend parameter)
    Present,
}

/// Монотонные симуляционные часы
///
/// Elapsed копится в `Duration` (как `Time` в Bevy), наружу: секунды f64.
///
/// Инвариант: `now` только растёт, `delta`: шаг последнего тика.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct SimClock {
    elapsed: Duration,
    delta: f32,
    tick: u64,
}

impl SimClock {
    /// Секунды симуляции с начала сессии
    pub fn now(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn delta(&self) -> f32 {
        self.delta
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Отрицательный / NaN delta игнорируется (часы монотонны)
    pub fn advance(&mut self, delta: f32) {
        let step = Duration::try_from_secs_f32(delta).unwrap_or(Duration::ZERO);
        self.elapsed = self.elapsed.saturating_add(step);
        self.delta = step.as_secs_f32();
        self.tick = self.tick.wrapping_add(1);
    }
}

/// Регистрация NpcTick + SimClock + порядка фаз
pub struct NpcSchedulePlugin;

impl Plugin for NpcSchedulePlugin {
    fn build(&self, app: &mut App) {
        app.init_schedule(NpcTick)
            .init_resource::<SimClock>()
            .configure_sets(
                NpcTick,
                (
                    NpcSet::Sense,
                    NpcSet::Decide,
                    NpcSet::Act,
                    NpcSet::Integrate,
                    NpcSet::Present,
                )
                    .chain(),
            )
            .add_systems(FixedUpdate, run_npc_tick);
    }
}
