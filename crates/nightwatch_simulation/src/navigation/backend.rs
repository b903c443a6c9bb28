//! Headless navigation backend: прямолинейный kinematic mover
//!
//! Заменяет navmesh движка в headless симуляции и тестах:
//! - путь = прямая по земле (XZ), Y агента не меняется
//! - pending снимается на первом проходе после set_destination
//! - acceleration / stopping distance / angular speed из NavParams
//! - ориентация по движению только если rotation_control == true

use bevy::prelude::*;

use super::{NavAgent, NavParams};
use crate::schedules::{NpcSet, NpcTick, SimClock};

/// Горизонтальные смещения короче этого считаются нулевыми
const MIN_DIRECTION_LENGTH: f32 = 1e-4;

pub struct NavigationBackendPlugin;

impl Plugin for NavigationBackendPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(NpcTick, integrate_navigation.in_set(NpcSet::Integrate));
    }
}

/// Yaw-only rotation, при которой `forward()` (-Z) смотрит вдоль `direction` (XZ)
///
/// None если горизонтальная проекция вырождена.
pub fn yaw_rotation(direction: Vec3) -> Option<Quat> {
    let flat = Vec3::new(direction.x, 0.0, direction.z);
    if flat.length_squared() < MIN_DIRECTION_LENGTH * MIN_DIRECTION_LENGTH {
        return None;
    }
    Some(Quat::from_rotation_y(f32::atan2(-flat.x, -flat.z)))
}

/// Поворот `from` → `to` не больше чем на `max_angle` радиан
pub fn rotate_towards(from: Quat, to: Quat, max_angle: f32) -> Quat {
    let angle = from.angle_between(to);
    if angle <= max_angle.max(0.0) || angle < 1e-6 {
        to
    } else {
        from.slerp(to, max_angle / angle)
    }
}

/// System: интеграция движения для всех NavAgent
pub fn integrate_navigation(
    clock: Res<SimClock>,
    mut agents: Query<(&mut Transform, &mut NavAgent, &NavParams)>,
) {
    let delta = clock.delta();

    for (mut transform, mut nav, params) in agents.iter_mut() {
        nav.report_path_ready();

        let Some(destination) = nav.destination() else {
            nav.report_progress(0.0, Vec3::ZERO);
            continue;
        };

        let to_destination = Vec3::new(
            destination.x - transform.translation.x,
            0.0,
            destination.z - transform.translation.z,
        );
        let distance = to_destination.length();

        if nav.is_stopped() || distance <= params.stopping_distance || distance < MIN_DIRECTION_LENGTH {
            nav.report_progress(distance, Vec3::ZERO);
            continue;
        }

        let direction = to_destination / distance;

        // Разгон/торможение к скорости tier'а
        let current_speed = nav.velocity().length();
        let target_speed = nav.speed();
        let max_change = params.acceleration * delta;
        let speed = if current_speed < target_speed {
            (current_speed + max_change).min(target_speed)
        } else {
            (current_speed - max_change).max(target_speed)
        };

        let step = (speed * delta).min(distance);
        transform.translation += direction * step;
        nav.report_progress(distance - step, direction * speed);

        if nav.rotation_control() {
            if let Some(look) = yaw_rotation(direction) {
                let max_angle = params.angular_speed_deg.to_radians() * delta;
                transform.rotation = rotate_towards(transform.rotation, look, max_angle);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaw_rotation_faces_direction() {
        for direction in [Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z, Vec3::new(1.0, 5.0, -1.0)] {
            let rotation = yaw_rotation(direction).expect("non-degenerate");
            let forward = rotation * Vec3::NEG_Z;
            let expected = Vec3::new(direction.x, 0.0, direction.z).normalize();
            assert!(forward.distance(expected) < 1e-5, "{direction:?} → {forward:?}");
        }

        assert!(yaw_rotation(Vec3::Y).is_none());
    }

    #[test]
    fn test_rotate_towards_limits_angle() {
        let from = Quat::IDENTITY;
        let to = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);

        let partial = rotate_towards(from, to, 0.5);
        assert!((from.angle_between(partial) - 0.5).abs() < 1e-4);

        let full = rotate_towards(from, to, 10.0);
        assert!(full.angle_between(to) < 1e-5);
    }
}
