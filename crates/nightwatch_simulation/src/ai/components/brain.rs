//! AgentBrain: общий substrate для всех архетипов
//!
//! Один компонент-enum, вариант на архетип. Каждый вариант получает в тике
//! `BrainContext` (часы, perception, Navigation Oracle handle, waypoints, RNG,
//! Geometry Oracle) и пишет побочные эффекты в `outputs`. Сами события и
//! очередь ScheduledActions трогает только система `tick_agent_brains`.

use bevy::prelude::*;
use rand_chacha::ChaCha8Rng;

use super::evader::EvaderBrain;
use super::patroller::PatrollerBrain;
use super::player::PlayerDirectedBrain;
use super::shooter::ShooterBrain;
use crate::animation::AnimationSignal;
use crate::geometry::GeometryOracle;
use crate::navigation::{NavAgent, NavParams, SpeedTier, SpeedTiers};
use crate::perception::{Perception, SightConfig, TrackedTarget};
use crate::timing::DeferredAction;
use crate::waypoints::Waypoints;

/// Что brain хочет сделать за пределами своего агента
#[derive(Debug, Clone, PartialEq)]
pub enum BrainOutput {
    /// Action trigger для Animation Sink (ShootTriggered)
    Shoot { aim_direction: Vec3 },
    /// Отложенное действие (spawn снаряда после задержки)
    Schedule { due: f64, action: DeferredAction },
}

/// Вход для Animation Signal Mapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Locomotion {
    pub tier: SpeedTier,
    /// Движение приостановлено действием (выстрел / freeze)
    pub suspended: bool,
}

/// Всё, что brain видит и может менять за один тик
pub struct BrainContext<'a> {
    pub entity: Entity,
    pub now: f64,
    pub delta: f32,
    pub transform: &'a mut Transform,
    pub nav: &'a mut NavAgent,
    pub tiers: &'a SpeedTiers,
    pub sight: &'a SightConfig,
    pub perception: &'a Perception,
    pub waypoints: Option<&'a Waypoints>,
    pub geometry: &'a dyn GeometryOracle,
    pub rng: &'a mut ChaCha8Rng,
    pub outputs: &'a mut Vec<BrainOutput>,
}

impl<'a> BrainContext<'a> {
    /// Waypoints с хотя бы одной валидной записью
    pub fn valid_waypoints(&self) -> Option<&'a Waypoints> {
        self.waypoints.filter(|waypoints| waypoints.has_valid())
    }

    /// Speed tier → NavAgent (скорость всегда именованная)
    pub fn set_tier(&mut self, tier: SpeedTier) {
        self.nav.set_tier(tier, self.tiers);
    }

    /// Destination на waypoint по handle (невалидный handle → no-op)
    pub fn go_to_waypoint(&mut self, handle: usize) -> bool {
        let Some(point) = self.waypoints.and_then(|waypoints| waypoints.get(handle)) else {
            return false;
        };
        self.nav.set_destination(point);
        true
    }
}

/// Интерфейс архетипа
pub trait AgentBehavior {
    fn tick(&mut self, ctx: &mut BrainContext);

    fn locomotion(&self, nav: &NavAgent) -> Locomotion;

    fn state_name(&self) -> &'static str;
}

/// Brain агента (вариант = архетип)
///
/// Спавн: `(Actor::new(..), AgentBrain::Evader(..), Waypoints::..)`, остальное
/// через required components (NavAgent, Perception, AnimationSignal, ...).
/// Параметры движения/зрения по умолчанию у каждого архетипа свои, см. `defaults()`.
#[derive(Component, Debug, Clone, PartialEq)]
#[require(
    Transform,
    NavAgent,
    NavParams,
    SpeedTiers,
    SightConfig,
    Perception,
    TrackedTarget,
    AnimationSignal
)]
pub enum AgentBrain {
    Evader(EvaderBrain),
    Patroller(PatrollerBrain),
    Shooter(ShooterBrain),
    PlayerDirected(PlayerDirectedBrain),
}

/// Параметры архетипа по умолчанию (значения из lab-сцены)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchetypeDefaults {
    pub tiers: SpeedTiers,
    pub nav: NavParams,
    pub sight: SightConfig,
}

impl AgentBrain {
    pub fn defaults(&self) -> ArchetypeDefaults {
        match self {
            AgentBrain::Evader(_) => super::evader::archetype_defaults(),
            AgentBrain::Patroller(_) => super::patroller::archetype_defaults(),
            AgentBrain::Shooter(_) => super::shooter::archetype_defaults(),
            AgentBrain::PlayerDirected(_) => super::player::archetype_defaults(),
        }
    }

    pub fn as_evader(&self) -> Option<&EvaderBrain> {
        match self {
            AgentBrain::Evader(brain) => Some(brain),
            _ => None,
        }
    }

    pub fn as_patroller(&self) -> Option<&PatrollerBrain> {
        match self {
            AgentBrain::Patroller(brain) => Some(brain),
            _ => None,
        }
    }

    pub fn as_shooter(&self) -> Option<&ShooterBrain> {
        match self {
            AgentBrain::Shooter(brain) => Some(brain),
            _ => None,
        }
    }

    pub fn as_player(&self) -> Option<&PlayerDirectedBrain> {
        match self {
            AgentBrain::PlayerDirected(brain) => Some(brain),
            _ => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut PlayerDirectedBrain> {
        match self {
            AgentBrain::PlayerDirected(brain) => Some(brain),
            _ => None,
        }
    }
}

impl AgentBehavior for AgentBrain {
    fn tick(&mut self, ctx: &mut BrainContext) {
        match self {
            AgentBrain::Evader(brain) => brain.tick(ctx),
            AgentBrain::Patroller(brain) => brain.tick(ctx),
            AgentBrain::Shooter(brain) => brain.tick(ctx),
            AgentBrain::PlayerDirected(brain) => brain.tick(ctx),
        }
    }

    fn locomotion(&self, nav: &NavAgent) -> Locomotion {
        match self {
            AgentBrain::Evader(brain) => brain.locomotion(nav),
            AgentBrain::Patroller(brain) => brain.locomotion(nav),
            AgentBrain::Shooter(brain) => brain.locomotion(nav),
            AgentBrain::PlayerDirected(brain) => brain.locomotion(nav),
        }
    }

    fn state_name(&self) -> &'static str {
        match self {
            AgentBrain::Evader(brain) => brain.state_name(),
            AgentBrain::Patroller(brain) => brain.state_name(),
            AgentBrain::Shooter(brain) => brain.state_name(),
            AgentBrain::PlayerDirected(brain) => brain.state_name(),
        }
    }
}

/// Стенд для unit-тестов brain'ов: владеет всем, что одалживает BrainContext
#[cfg(test)]
pub(crate) struct BrainRig {
    pub entity: Entity,
    pub transform: Transform,
    pub nav: NavAgent,
    pub tiers: SpeedTiers,
    pub sight: SightConfig,
    pub perception: Perception,
    pub waypoints: Option<Waypoints>,
    pub geometry: Box<dyn GeometryOracle>,
    pub rng: ChaCha8Rng,
    pub outputs: Vec<BrainOutput>,
}

#[cfg(test)]
impl BrainRig {
    pub fn new(defaults: ArchetypeDefaults, waypoints: Option<Waypoints>) -> Self {
        use rand::SeedableRng;

        Self {
            entity: Entity::from_raw(7),
            transform: Transform::default(),
            nav: NavAgent::default(),
            tiers: defaults.tiers,
            sight: defaults.sight,
            perception: Perception::default(),
            waypoints,
            geometry: Box::new(crate::geometry::OpenField),
            rng: ChaCha8Rng::seed_from_u64(42),
            outputs: Vec::new(),
        }
    }

    pub fn tick(&mut self, brain: &mut impl AgentBehavior, now: f64, delta: f32) {
        let mut ctx = BrainContext {
            entity: self.entity,
            now,
            delta,
            transform: &mut self.transform,
            nav: &mut self.nav,
            tiers: &self.tiers,
            sight: &self.sight,
            perception: &self.perception,
            waypoints: self.waypoints.as_ref(),
            geometry: self.geometry.as_ref(),
            rng: &mut self.rng,
            outputs: &mut self.outputs,
        };
        brain.tick(&mut ctx);
    }

    /// Backend "посчитал" путь и сообщил remaining
    pub fn report(&mut self, remaining: f32) {
        self.nav.report_path_ready();
        self.nav.report_progress(remaining, Vec3::ZERO);
    }

    pub fn see_target_at(&mut self, position: Vec3) {
        self.perception = Perception {
            sees_target: true,
            target_position: Some(position),
            target_point: Some(self.sight.target_point(position)),
        };
    }

    pub fn lose_target(&mut self) {
        self.perception.sees_target = false;
    }
}
