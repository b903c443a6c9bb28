//! Animation Signal Mapper: один blend параметр на агента
//!
//! 0 = idle, 0.5 = walk, 1 = run / chase / acting. Значение не "прыгает":
//! экспоненциально сглаживается к целевому с постоянной времени ~0.1 с.

use bevy::prelude::*;

use crate::ai::{AgentBehavior, AgentBrain, Locomotion};
use crate::navigation::{NavAgent, SpeedTier};
use crate::schedules::{NpcSet, NpcTick, SimClock};

/// Ниже этой скорости агент считается стоящим (м/с)
pub const STATIONARY_SPEED: f32 = 0.05;

/// Постоянная времени сглаживания (сек)
pub const SMOOTHING_TIME: f32 = 0.1;

pub const BLEND_IDLE: f32 = 0.0;
pub const BLEND_WALK: f32 = 0.5;
pub const BLEND_RUN: f32 = 1.0;

/// Animation Sink: сглаженный blend + цель текущего тика
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct AnimationSignal {
    pub blend: f32,
    pub target: f32,
}

pub fn map_signal(locomotion: Locomotion, speed: f32) -> f32 {
    if locomotion.suspended || speed < STATIONARY_SPEED {
        return BLEND_IDLE;
    }
    match locomotion.tier {
        SpeedTier::Walk => BLEND_WALK,
        SpeedTier::Run | SpeedTier::Chase => BLEND_RUN,
    }
}

/// Экспоненциальный подход к `target`: доля `1 - e^(-dt/tau)` за шаг
pub fn smooth_signal(current: f32, target: f32, delta: f32, tau: f32) -> f32 {
    if tau <= 0.0 {
        return target;
    }
    let alpha = 1.0 - (-delta.max(0.0) / tau).exp();
    (current + (target - current) * alpha).clamp(0.0, 1.0)
}

pub struct AnimationPlugin;

impl Plugin for AnimationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(NpcTick, update_animation_signals.in_set(NpcSet::Present));
    }
}

/// System: blend по brain state + фактической скорости из Navigation Oracle
pub fn update_animation_signals(
    clock: Res<SimClock>,
    mut agents: Query<(&AgentBrain, &NavAgent, &mut AnimationSignal)>,
) {
    for (brain, nav, mut signal) in agents.iter_mut() {
        let target = map_signal(brain.locomotion(nav), nav.velocity().length());
        signal.target = target;
        signal.blend = smooth_signal(signal.blend, target, clock.delta(), SMOOTHING_TIME);
    }
}
