//! Geometry Oracle: ray queries против геометрии мира
//!
//! Ядро только ЗАДАЁТ вопросы (LOS для perception, aim point для выстрела).
//! Реальная физика живёт в движке; здесь: trait + две headless реализации:
//! - `OpenField`: пустой мир, raycast всегда мимо
//! - `ObstacleField`: набор AABB препятствий на слоях (bevy::math::bounding)
//!
//! "Нет попадания": это отрицательный результат, не ошибка.

use bevy::math::bounding::{Aabb3d, RayCast3d};
use bevy::prelude::*;

pub mod layers;

pub use layers::*;

/// Результат попадания луча
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub distance: f32,
}

pub trait GeometryOracle: Send + Sync + 'static {
    /// Ближайшее попадание вдоль `direction` в пределах `max_distance`
    /// по объектам, чьи слои пересекаются с `mask`.
    fn raycast(&self, origin: Vec3, direction: Dir3, max_distance: f32, mask: u32) -> Option<RayHit>;
}

/// Resource: текущий Geometry Oracle
#[derive(Resource)]
pub struct Geometry(pub Box<dyn GeometryOracle>);

impl Default for Geometry {
    fn default() -> Self {
        Self(Box::new(OpenField))
    }
}

impl Geometry {
    pub fn new(oracle: impl GeometryOracle) -> Self {
        Self(Box::new(oracle))
    }

    pub fn oracle(&self) -> &dyn GeometryOracle {
        self.0.as_ref()
    }
}

/// Мир без препятствий
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenField;

impl GeometryOracle for OpenField {
    fn raycast(&self, _origin: Vec3, _direction: Dir3, _max_distance: f32, _mask: u32) -> Option<RayHit> {
        None
    }
}

/// Axis-aligned препятствие на слоях `layers`
#[derive(Debug, Clone, Copy)]
pub struct Obstacle {
    pub bounds: Aabb3d,
    pub layers: u32,
}

impl Obstacle {
    pub fn new(center: Vec3, half_extents: Vec3, layers: u32) -> Self {
        Self {
            bounds: Aabb3d::new(center, half_extents.abs()),
            layers,
        }
    }

    /// Стена/ящик на слое окружения
    pub fn wall(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center, half_extents, COLLISION_LAYER_ENVIRONMENT)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
}

impl ObstacleField {
    pub fn new(obstacles: Vec<Obstacle>) -> Self {
        Self { obstacles }
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}

impl GeometryOracle for ObstacleField {
    fn raycast(&self, origin: Vec3, direction: Dir3, max_distance: f32, mask: u32) -> Option<RayHit> {
        if mask == 0 || max_distance <= 0.0 {
            return None;
        }

        let ray = RayCast3d::new(origin, direction, max_distance);

        self.obstacles
            .iter()
            .filter(|obstacle| obstacle.layers & mask != 0)
            .filter_map(|obstacle| ray.aabb_intersection_at(&obstacle.bounds))
            .min_by(|a, b| a.total_cmp(b))
            .map(|distance| RayHit {
                point: origin + direction.as_vec3() * distance,
                distance,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall_ahead() -> ObstacleField {
        // Стена поперёк -Z на расстоянии 5м (толщина 1м)
        ObstacleField::new(vec![Obstacle::wall(
            Vec3::new(0.0, 1.0, -5.5),
            Vec3::new(5.0, 2.0, 0.5),
        )])
    }

    #[test]
    fn test_open_field_never_hits() {
        assert!(OpenField.raycast(Vec3::ZERO, Dir3::NEG_Z, 100.0, u32::MAX).is_none());
    }

    #[test]
    fn test_ray_hits_nearest_face() {
        let field = wall_ahead();
        let hit = field
            .raycast(Vec3::new(0.0, 1.0, 0.0), Dir3::NEG_Z, 30.0, COLLISION_MASK_RAYCAST_LOS)
            .expect("wall is in front");

        assert!((hit.distance - 5.0).abs() < 1e-4);
        assert!((hit.point.z + 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_ray_respects_max_distance_and_mask() {
        let field = wall_ahead();

        assert!(field
            .raycast(Vec3::new(0.0, 1.0, 0.0), Dir3::NEG_Z, 4.0, COLLISION_MASK_RAYCAST_LOS)
            .is_none());

        // Маска без слоя окружения: стена прозрачна
        assert!(field
            .raycast(Vec3::new(0.0, 1.0, 0.0), Dir3::NEG_Z, 30.0, COLLISION_LAYER_ACTORS)
            .is_none());
    }

    #[test]
    fn test_ray_pointing_away_misses() {
        let field = wall_ahead();
        assert!(field
            .raycast(Vec3::new(0.0, 1.0, 0.0), Dir3::Z, 30.0, u32::MAX)
            .is_none());
    }
}
