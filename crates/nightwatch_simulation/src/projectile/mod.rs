//! Projectile backend (headless)
//!
//! ProjectileSpawnRequested → entity с Projectile + Transform.
//! Полёт по прямой с постоянной скоростью, lifetime 3 с.
//! Первый не-ignored hit (окружение через Geometry Oracle или actor) →
//! ProjectileHit + despawn. Урон никто не применяет: это задача потребителя события.

use bevy::math::Vec3Swizzles;
use bevy::prelude::*;

use crate::components::Actor;
use crate::geometry::{Geometry, COLLISION_MASK_PROJECTILES};
use crate::schedules::{NpcSet, NpcTick, SimClock};
use crate::timing::reached;

pub const PROJECTILE_LIFETIME: f32 = 3.0;

/// Грубый коллайдер actor'а: вертикальный цилиндр от ступней
pub const ACTOR_HIT_RADIUS: f32 = 0.5;
pub const ACTOR_HIT_HEIGHT: f32 = 2.0;

/// Запрос на создание снаряда (из отложенного действия стрелка)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ProjectileSpawnRequested {
    pub shooter: Entity,
    pub spawn_position: Vec3,
    pub aim_point: Vec3,
    pub speed: f32,
    pub damage: u32,
    /// Стрелок + его body parts
    pub ignore: Vec<Entity>,
}

/// Снаряд попал во что-то (target = None → окружение)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ProjectileHit {
    pub projectile: Entity,
    pub shooter: Entity,
    pub target: Option<Entity>,
    pub point: Vec3,
    pub damage: u32,
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Projectile {
    pub shooter: Entity,
    pub direction: Dir3,
    pub speed: f32,
    pub damage: u32,
    pub ignore: Vec<Entity>,
    pub expires_at: f64,
}

pub struct ProjectilePlugin;

impl Plugin for ProjectilePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ProjectileSpawnRequested>()
            .add_event::<ProjectileHit>()
            .add_systems(
                NpcTick,
                (move_projectiles, spawn_projectiles)
                    .chain()
                    .in_set(NpcSet::Integrate),
            );
    }
}

/// System: spawn снарядов (начинают лететь со следующего тика)
pub fn spawn_projectiles(
    mut commands: Commands,
    clock: Res<SimClock>,
    mut requests: EventReader<ProjectileSpawnRequested>,
) {
    for request in requests.read() {
        let Ok(direction) = Dir3::new(request.aim_point - request.spawn_position) else {
            crate::log_warning(&format!(
                "⚠️ {:?}: projectile aim point coincides with spawn position, skipped",
                request.shooter
            ));
            continue;
        };

        commands.spawn((
            Transform::from_translation(request.spawn_position).looking_to(direction, Vec3::Y),
            Projectile {
                shooter: request.shooter,
                direction,
                speed: request.speed,
                damage: request.damage,
                ignore: request.ignore.clone(),
                expires_at: clock.now() + f64::from(PROJECTILE_LIFETIME),
            },
        ));
    }
}

/// Пересечение отрезка с цилиндром actor'а → дистанция вдоль отрезка
fn segment_hits_actor(start: Vec3, end: Vec3, actor: Vec3) -> Option<f32> {
    let segment = end - start;
    let flat = segment.xz();
    let to_start = (start - actor).xz();

    let t = if flat.length_squared() > f32::EPSILON {
        (-to_start.dot(flat) / flat.length_squared()).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let closest = start + segment * t;
    let horizontal = (closest - actor).xz().length();
    let within_height = closest.y >= actor.y && closest.y <= actor.y + ACTOR_HIT_HEIGHT;

    (horizontal <= ACTOR_HIT_RADIUS && within_height).then_some(segment.length() * t)
}

/// System: полёт, попадания, lifetime
pub fn move_projectiles(
    mut commands: Commands,
    clock: Res<SimClock>,
    geometry: Res<Geometry>,
    mut projectiles: Query<(Entity, &mut Transform, &Projectile)>,
    actors: Query<(Entity, &Transform), (With<Actor>, Without<Projectile>)>,
    mut hits: EventWriter<ProjectileHit>,
) {
    let delta = clock.delta();

    for (entity, mut transform, projectile) in projectiles.iter_mut() {
        if reached(clock.now(), projectile.expires_at) {
            commands.entity(entity).despawn();
            continue;
        }

        let start = transform.translation;
        let step = projectile.speed * delta;
        let end = start + projectile.direction * step;

        let environment = geometry
            .oracle()
            .raycast(start, projectile.direction, step, COLLISION_MASK_PROJECTILES)
            .map(|hit| (hit.distance, None));

        let actor = actors
            .iter()
            .filter(|(actor, _)| !projectile.ignore.contains(actor))
            .filter_map(|(actor, actor_transform)| {
                segment_hits_actor(start, end, actor_transform.translation).map(|distance| (distance, Some(actor)))
            })
            .min_by(|(a, _), (b, _)| a.total_cmp(b));

        let hit = match (environment, actor) {
            (Some(environment), Some(actor)) => Some(if actor.0 <= environment.0 { actor } else { environment }),
            (environment, actor) => environment.or(actor),
        };

        let Some((distance, target)) = hit else {
            transform.translation = end;
            continue;
        };

        let point = start + projectile.direction * distance;
        crate::log(&format!(
            "💥 projectile {:?} (from {:?}) hit {:?} at {:?}",
            entity, projectile.shooter, target, point
        ));
        hits.write(ProjectileHit {
            projectile: entity,
            shooter: projectile.shooter,
            target,
            point,
            damage: projectile.damage,
        });
        commands.entity(entity).despawn();
    }
}
