//! Shooter: случайный обход waypoints + выстрелы по цели
//!
//! States: Moving → Acting (выстрел) → Frozen (post-shot recovery) → Moving
//!
//! Выстрел (только из Moving, цель видна, cooldown прошёл):
//! 1. aim = горизонтальное направление origin → target point (fallback: forward)
//! 2. snap ориентации на aim, rotation control забираем у Navigation Oracle
//! 3. BrainOutput::Shoot (ShootTriggered для Animation Sink)
//! 4. aim point = raycast вдоль aim до shoot_range (hit point / max-range point)
//! 5. spawn снаряда откладывается на projectile_spawn_delay (ScheduledActions)
//!
//! Acting длится shoot_action_duration, Frozen: до trigger + shoot_stop_time.
//! В обоих окнах: stop, velocity = 0, поворот к aim на shot_turn_speed.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::brain::{AgentBehavior, ArchetypeDefaults, BrainContext, BrainOutput, Locomotion};
use crate::geometry::COLLISION_MASK_AIM;
use crate::navigation::{rotate_towards, yaw_rotation, NavAgent, NavParams, SpeedTier, SpeedTiers};
use crate::perception::SightConfig;
use crate::timing::{Cooldown, Deadline, DeferredAction};
use crate::waypoints::pick_random_other;

/// Горизонтальный aim короче этого → fallback на forward
const MIN_AIM_LENGTH: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterConfig {
    pub arrive_threshold: f32,
    pub shoot_cooldown: f32,
    /// Freeze после trigger (сек)
    pub shoot_stop_time: f32,
    /// Длительность самого действия (анимация выстрела)
    pub shoot_action_duration: f32,
    /// Градусы/с, поворот к замороженному aim
    pub shot_turn_speed_deg: f32,
    pub projectile_speed: f32,
    pub projectile_damage: u32,
    pub shoot_range: f32,
    pub projectile_spawn_delay: f32,
    /// Точка вылета в локальных координатах агента.
    /// None → позиция + up · eye_height · 0.8
    pub shoot_origin: Option<[f32; 3]>,
    /// Маска raycast'а для aim point
    pub aim_mask: u32,
}

impl Default for ShooterConfig {
    fn default() -> Self {
        Self {
            arrive_threshold: 0.35,
            shoot_cooldown: 1.2,
            shoot_stop_time: 0.15,
            shoot_action_duration: 0.4,
            shot_turn_speed_deg: 900.0,
            projectile_speed: 18.0,
            projectile_damage: 10,
            shoot_range: 30.0,
            projectile_spawn_delay: 0.2,
            shoot_origin: None,
            aim_mask: COLLISION_MASK_AIM,
        }
    }
}

impl ShooterConfig {
    /// Точка вылета снаряда для текущего Transform
    pub fn origin(&self, transform: &Transform, sight: &SightConfig) -> Vec3 {
        match self.shoot_origin {
            Some(offset) => transform.transform_point(Vec3::from_array(offset)),
            None => transform.translation + Vec3::Y * (sight.eye_height * 0.8),
        }
    }
}

/// walk 2.6, FOV 60° / 18 м
pub fn archetype_defaults() -> ArchetypeDefaults {
    ArchetypeDefaults {
        tiers: SpeedTiers {
            walk: 2.6,
            run: 2.6,
            chase: 2.6,
        },
        nav: NavParams {
            acceleration: 18.0,
            angular_speed_deg: 720.0,
            stopping_distance: 0.35,
        },
        sight: SightConfig {
            sight_range: 18.0,
            sight_fov_deg: 60.0,
            ..SightConfig::default()
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShooterState {
    #[default]
    Moving,
    Acting,
    Frozen,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShooterBrain {
    pub config: ShooterConfig,
    state: ShooterState,
    current: Option<usize>,
    cooldown: Cooldown,
    action_end: Deadline,
    freeze_end: Deadline,
    /// Замороженный aim последнего выстрела (горизонтальный, нормализованный)
    aim_direction: Vec3,
    shots: u32,
}

impl Default for ShooterBrain {
    fn default() -> Self {
        Self::new(ShooterConfig::default())
    }
}

impl ShooterBrain {
    pub fn new(config: ShooterConfig) -> Self {
        Self {
            config,
            state: ShooterState::Moving,
            current: None,
            cooldown: Cooldown::new(config.shoot_cooldown),
            action_end: Deadline::inactive(),
            freeze_end: Deadline::inactive(),
            aim_direction: Vec3::ZERO,
            shots: 0,
        }
    }

    pub fn state(&self) -> ShooterState {
        self.state
    }

    pub fn current_waypoint(&self) -> Option<usize> {
        self.current
    }

    pub fn aim_direction(&self) -> Vec3 {
        self.aim_direction
    }

    pub fn shots_fired(&self) -> u32 {
        self.shots
    }

    fn pick_waypoint(&mut self, ctx: &mut BrainContext) {
        let Some(waypoints) = ctx.waypoints else {
            return;
        };
        if let Some(next) = pick_random_other(waypoints, self.current, ctx.rng) {
            self.current = Some(next);
            ctx.go_to_waypoint(next);
            ctx.set_tier(SpeedTier::Walk);
        }
    }

    /// Acting / Frozen: стоим, гасим скорость, доворачиваем к aim
    fn hold(&self, ctx: &mut BrainContext) {
        ctx.nav.stop();
        ctx.nav.zero_velocity();
        ctx.nav.set_rotation_control(false);

        if let Some(look) = yaw_rotation(self.aim_direction) {
            let max_angle = self.config.shot_turn_speed_deg.to_radians() * ctx.delta;
            ctx.transform.rotation = rotate_towards(ctx.transform.rotation, look, max_angle);
        }
    }

    fn shoot(&mut self, ctx: &mut BrainContext) {
        let now = ctx.now;
        let origin = self.config.origin(ctx.transform, ctx.sight);
        let forward = ctx.transform.forward().as_vec3();
        let target = ctx.perception.target_point.unwrap_or(origin + forward);

        let mut aim = target - origin;
        aim.y = 0.0;
        if aim.length_squared() < MIN_AIM_LENGTH * MIN_AIM_LENGTH {
            aim = Vec3::new(forward.x, 0.0, forward.z);
        }
        let aim = aim.normalize_or(Vec3::NEG_Z);
        self.aim_direction = aim;

        ctx.nav.set_rotation_control(false);
        if let Some(look) = yaw_rotation(aim) {
            ctx.transform.rotation = look;
        }

        let range = self.config.shoot_range;
        let aim_point = Dir3::new(aim)
            .ok()
            .and_then(|direction| ctx.geometry.raycast(origin, direction, range, self.config.aim_mask))
            .map(|hit| hit.point)
            .unwrap_or(origin + aim * range);

        ctx.outputs.push(BrainOutput::Shoot { aim_direction: aim });
        ctx.outputs.push(BrainOutput::Schedule {
            due: now + f64::from(self.config.projectile_spawn_delay.max(0.0)),
            action: DeferredAction::SpawnProjectile {
                shooter: ctx.entity,
                aim_point,
                fallback_origin: origin,
                speed: self.config.projectile_speed,
                damage: self.config.projectile_damage,
            },
        });

        self.cooldown.trigger(now);
        self.shots += 1;

        // Frozen не короче Acting: если stop_time кончается раньше, окна нет
        self.action_end.lock_for(now, self.config.shoot_action_duration);
        if self.config.shoot_stop_time > self.config.shoot_action_duration {
            self.freeze_end.lock_for(now, self.config.shoot_stop_time);
        } else {
            self.freeze_end.clear();
        }
        self.state = ShooterState::Acting;

        ctx.nav.stop();
        ctx.nav.zero_velocity();

        crate::log(&format!(
            "🔫 {:?} Shooter: shot #{} aim {:?} → aim point {:?}",
            ctx.entity, self.shots, aim, aim_point
        ));
    }
}

impl AgentBehavior for ShooterBrain {
    fn tick(&mut self, ctx: &mut BrainContext) {
        if ctx.valid_waypoints().is_none() {
            return;
        }

        if self.current.is_none() {
            self.pick_waypoint(ctx);
        }

        let now = ctx.now;

        if self.state != ShooterState::Moving {
            if self.action_end.is_locked(now) {
                self.state = ShooterState::Acting;
                self.hold(ctx);
                return;
            }
            if self.freeze_end.is_locked(now) {
                self.state = ShooterState::Frozen;
                self.hold(ctx);
                return;
            }

            self.action_end.clear();
            self.freeze_end.clear();
            ctx.nav.set_rotation_control(true);
            self.state = ShooterState::Moving;
            crate::log(&format!("{:?} Shooter: recovery done, Moving", ctx.entity));
        }

        ctx.nav.resume();

        if ctx.perception.sees_target && self.cooldown.ready(now) {
            self.shoot(ctx);
            return;
        }

        if ctx.nav.has_arrived(self.config.arrive_threshold) {
            self.pick_waypoint(ctx);
        }
    }

    fn locomotion(&self, nav: &NavAgent) -> Locomotion {
        Locomotion {
            tier: nav.tier(),
            suspended: self.state != ShooterState::Moving,
        }
    }

    fn state_name(&self) -> &'static str {
        match self.state {
            ShooterState::Moving => "Moving",
            ShooterState::Acting => "Acting",
            ShooterState::Frozen => "Frozen",
        }
    }
}
