//! Perception Module: FOV + range + occlusion
//!
//! `can_sense`: чистая функция от текущих Transform'ов, пересчитывается
//! КАЖДЫЙ тик (никакого кеширования между тиками).
//!
//! Алгоритм:
//! 1. eye = позиция агента + up · eye_height
//!    target point = позиция цели + up · (eye_height · target_height_fraction) ("торс")
//! 2. горизонтальное смещение eye → target; > sight_range или ≈ 0 → не видим
//! 3. угол forward ↔ смещение > fov/2 → не видим
//! 4. occlusion_mask != 0 → raycast eye → target point по 3D дистанции, любой hit → не видим

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::Player;
use crate::geometry::{Geometry, GeometryOracle};
use crate::schedules::{NpcSet, NpcTick};


/// Self-detection guard (горизонтальная дистанция)
pub const MIN_SENSE_DISTANCE: f32 = 0.001;

/// Параметры зрения
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct SightConfig {
    pub sight_range: f32,
    /// Полный угол конуса (градусы), проверяется половина
    pub sight_fov_deg: f32,
    pub eye_height: f32,
    /// Доля eye_height для точки на цели (0.6 = торс)
    pub target_height_fraction: f32,
    /// 0 = occlusion test выключен
    pub occlusion_mask: u32,
}

impl Default for SightConfig {
    fn default() -> Self {
        Self {
            sight_range: 12.0,
            sight_fov_deg: 90.0,
            eye_height: 1.6,
            target_height_fraction: 0.6,
            occlusion_mask: 0,
        }
    }
}

impl SightConfig {
    pub fn eye_position(&self, agent: &Transform) -> Vec3 {
        agent.translation + Vec3::Y * self.eye_height
    }

    pub fn target_point(&self, target_position: Vec3) -> Vec3 {
        target_position + Vec3::Y * (self.eye_height * self.target_height_fraction)
    }
}

/// Non-owning handle на отслеживаемую цель (может отсутствовать)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct TrackedTarget(pub Option<Entity>);

/// Результат perception за текущий тик
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Perception {
    pub sees_target: bool,
    /// Позиция цели (корень), если цель существует, даже когда не видна
    pub target_position: Option<Vec3>,
    /// Точка прицеливания на цели (target_height_fraction)
    pub target_point: Option<Vec3>,
}

pub fn can_sense(agent: &Transform, sight: &SightConfig, target_position: Vec3, geometry: &dyn GeometryOracle) -> bool {
    let eye = sight.eye_position(agent);
    let target = sight.target_point(target_position);

    let flat = Vec3::new(target.x - eye.x, 0.0, target.z - eye.z);
    let flat_distance = flat.length();
    if flat_distance > sight.sight_range || flat_distance <= MIN_SENSE_DISTANCE {
        return false;
    }

    let half_fov = sight.sight_fov_deg * 0.5;
    let angle = agent.forward().as_vec3().angle_between(flat).to_degrees();
    if angle > half_fov {
        return false;
    }

    if sight.occlusion_mask != 0 {
        let to_target = target - eye;
        let distance = to_target.length();
        if let Ok(direction) = Dir3::new(to_target) {
            if geometry
                .raycast(eye, direction, distance, sight.occlusion_mask)
                .is_some()
            {
                return false;
            }
        }
    }

    true
}

pub struct PerceptionPlugin;

impl Plugin for PerceptionPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            NpcTick,
            (acquire_player_target, update_perception)
                .chain()
                .in_set(NpcSet::Sense),
        );
    }
}

/// System: агенты без цели берут entity с `Player` (кроме самого себя)
///
/// Despawned цель → TrackedTarget сбрасывается, на следующем тике ищем заново.
pub fn acquire_player_target(
    mut agents: Query<(Entity, &mut TrackedTarget)>,
    players: Query<Entity, With<Player>>,
    alive: Query<(), With<Transform>>,
) {
    for (entity, mut tracked) in agents.iter_mut() {
        if let Some(target) = tracked.0 {
            if alive.get(target).is_ok() {
                continue;
            }
            crate::logger::log(&format!("👻 {:?}: tracked target {:?} gone", entity, target));
            tracked.0 = None;
        }

        if let Some(player) = players.iter().find(|&player| player != entity) {
            tracked.0 = Some(player);
            crate::logger::log(&format!("🎯 {:?}: tracking player {:?}", entity, player));
        }
    }
}

/// System: пересчёт Perception для всех агентов (каждый тик)
pub fn update_perception(
    mut agents: Query<(&Transform, &SightConfig, &TrackedTarget, &mut Perception)>,
    targets: Query<&Transform>,
    geometry: Res<Geometry>,
) {
    for (transform, sight, tracked, mut perception) in agents.iter_mut() {
        let target_position = tracked
            .0
            .and_then(|target| targets.get(target).ok())
            .map(|target| target.translation);

        let Some(target_position) = target_position else {
            *perception = Perception::default();
            continue;
        };

        let sees_target = can_sense(transform, sight, target_position, geometry.oracle());
        *perception = Perception {
            sees_target,
            target_position: Some(target_position),
            target_point: Some(sight.target_point(target_position)),
        };
    }
}
