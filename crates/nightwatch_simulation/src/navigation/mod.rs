//! Navigation Oracle: интерфейс к path-planning движку
//!
//! Архитектура (как MovementCommand ↔ NavigationAgent в движке):
//! - Brain пишет команды в NavAgent: destination, speed tier, stop/resume, rotation control
//! - Navigation backend (движок или headless `backend`) читает команды,
//!   двигает Transform и пишет feedback: remaining distance, path pending, velocity
//!
//! Инварианты:
//! - максимум ОДИН активный destination
//! - скорость всегда одна из именованных tiers (walk/run/chase), ядро не интерполирует

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub mod backend;

pub use backend::{integrate_navigation, rotate_towards, yaw_rotation, NavigationBackendPlugin};

/// Именованные скоростные tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum SpeedTier {
    #[default]
    Walk,
    Run,
    Chase,
}

/// Скорости tiers (м/с)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct SpeedTiers {
    pub walk: f32,
    pub run: f32,
    pub chase: f32,
}

impl Default for SpeedTiers {
    fn default() -> Self {
        Self {
            walk: 2.2,
            run: 5.0,
            chase: 5.0,
        }
    }
}

impl SpeedTiers {
    pub fn speed(&self, tier: SpeedTier) -> f32 {
        match tier {
            SpeedTier::Walk => self.walk,
            SpeedTier::Run => self.run,
            SpeedTier::Chase => self.chase,
        }
    }
}

/// Параметры движения: выставляются один раз при spawn
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct NavParams {
    /// м/с²
    pub acceleration: f32,
    /// градусы/с (автоматическая ориентация по направлению движения)
    pub angular_speed_deg: f32,
    /// На этой дистанции до destination backend перестаёт двигать агента
    pub stopping_distance: f32,
}

impl Default for NavParams {
    fn default() -> Self {
        Self {
            acceleration: 22.0,
            angular_speed_deg: 720.0,
            stopping_distance: 0.35,
        }
    }
}

/// Navigation Oracle handle агента
#[derive(Component, Debug, Clone, PartialEq)]
pub struct NavAgent {
    destination: Option<Vec3>,
    tier: SpeedTier,
    speed: f32,
    stopped: bool,
    /// true = backend сам поворачивает агента по движению
    rotation_control: bool,

    // Feedback (пишет backend)
    remaining_distance: f32,
    path_pending: bool,
    velocity: Vec3,
}

impl Default for NavAgent {
    fn default() -> Self {
        Self {
            destination: None,
            tier: SpeedTier::Walk,
            speed: SpeedTiers::default().walk,
            stopped: false,
            rotation_control: true,
            remaining_distance: 0.0,
            path_pending: false,
            velocity: Vec3::ZERO,
        }
    }
}

impl NavAgent {
    // --- Команды (brain → backend) ---

    /// Новый destination заменяет старый; путь "считается" до следующего backend прохода
    pub fn set_destination(&mut self, point: Vec3) {
        self.destination = Some(point);
        self.path_pending = true;
    }

    pub fn clear_destination(&mut self) {
        self.destination = None;
        self.path_pending = false;
        self.remaining_distance = 0.0;
    }

    pub fn set_tier(&mut self, tier: SpeedTier, tiers: &SpeedTiers) {
        self.tier = tier;
        self.speed = tiers.speed(tier);
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn resume(&mut self) {
        self.stopped = false;
    }

    /// Мгновенно гасит скорость (freeze после выстрела)
    pub fn zero_velocity(&mut self) {
        self.velocity = Vec3::ZERO;
    }

    pub fn set_rotation_control(&mut self, enabled: bool) {
        self.rotation_control = enabled;
    }

    // --- Запросы ---

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    pub fn has_path(&self) -> bool {
        self.destination.is_some()
    }

    pub fn tier(&self) -> SpeedTier {
        self.tier
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn rotation_control(&self) -> bool {
        self.rotation_control
    }

    pub fn remaining_distance(&self) -> f32 {
        self.remaining_distance
    }

    pub fn path_pending(&self) -> bool {
        self.path_pending
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Прибыли: путь посчитан И remaining в пороге
    pub fn has_arrived(&self, threshold: f32) -> bool {
        !self.path_pending && self.remaining_distance <= threshold
    }

    // --- Feedback (backend → brain) ---

    pub fn report_path_ready(&mut self) {
        self.path_pending = false;
    }

    pub fn report_progress(&mut self, remaining_distance: f32, velocity: Vec3) {
        self.remaining_distance = remaining_distance.max(0.0);
        self.velocity = velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_destination_marks_pending() {
        let mut nav = NavAgent::default();
        nav.report_progress(0.0, Vec3::ZERO);
        assert!(nav.has_arrived(0.35));

        nav.set_destination(Vec3::new(10.0, 0.0, 0.0));
        assert!(nav.path_pending());
        // Пока путь не посчитан: remaining не доверяем
        assert!(!nav.has_arrived(0.35));

        nav.report_path_ready();
        nav.report_progress(10.0, Vec3::ZERO);
        assert!(!nav.has_arrived(0.35));
    }

    #[test]
    fn test_tier_sets_named_speed() {
        let tiers = SpeedTiers {
            walk: 3.0,
            run: 4.0,
            chase: 4.8,
        };
        let mut nav = NavAgent::default();

        nav.set_tier(SpeedTier::Chase, &tiers);
        assert_eq!(nav.tier(), SpeedTier::Chase);
        assert_eq!(nav.speed(), 4.8);

        nav.set_tier(SpeedTier::Walk, &tiers);
        assert_eq!(nav.speed(), 3.0);
    }

    #[test]
    fn test_single_destination() {
        let mut nav = NavAgent::default();
        nav.set_destination(Vec3::X);
        nav.set_destination(Vec3::Z);
        assert_eq!(nav.destination(), Some(Vec3::Z));

        nav.clear_destination();
        assert!(!nav.has_path());
        assert_eq!(nav.remaining_distance(), 0.0);
    }
}
