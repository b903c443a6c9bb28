//! NIGHTWATCH Simulation Core
//!
//! Decision-and-movement ядро NPC на Bevy 0.16 ECS:
//! perception (FOV + range + occlusion), выбор waypoints, четыре state machine
//! (Evader / Patroller / Shooter / PlayerDirected), timing arbiter, animation signal.
//!
//! Внешние системы (navmesh, физика, рендер) подключаются через seams:
//! - Navigation Oracle: `NavAgent` команды/feedback (+ headless backend)
//! - Geometry Oracle: `GeometryOracle` trait в `Geometry` resource
//! - Animation Sink: `AnimationSignal` + `ShootTriggered`
//! - Projectile spawn: `ProjectileSpawnRequested`
//!
//! Один NpcTick на FixedUpdate (60 Hz), все таймеры от SimClock.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod animation;
pub mod components;
pub mod config;
pub mod geometry;
pub mod logger;
pub mod navigation;
pub mod perception;
pub mod projectile;
pub mod schedules;
pub mod timing;
pub mod waypoints;

// Re-export базовых типов для удобства
pub use ai::{
    AIPlugin, AgentBehavior, AgentBrain, EvaderBrain, EvaderConfig, EvaderState, MoveRequest, PatrollerBrain,
    PatrollerConfig, PatrollerState, PlayerConfig, PlayerDirectedBrain, ShootTriggered, ShooterBrain, ShooterConfig,
    ShooterState,
};
pub use animation::{AnimationPlugin, AnimationSignal};
pub use components::*;
pub use config::{spawn_agent, spawn_scenario, AgentSpec, ArchetypeSpec, ConfigError, Scenario};
pub use geometry::{Geometry, GeometryOracle, Obstacle, ObstacleField, OpenField, RayHit};
pub use logger::{init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel, LogPrinter};
pub use navigation::{NavAgent, NavParams, NavigationBackendPlugin, SpeedTier, SpeedTiers};
pub use perception::{can_sense, Perception, PerceptionPlugin, SightConfig, TrackedTarget};
pub use projectile::{Projectile, ProjectileHit, ProjectilePlugin, ProjectileSpawnRequested};
pub use schedules::{step_simulation, NpcSchedulePlugin, NpcSet, NpcTick, SimClock};
pub use timing::{Cooldown, Deadline, LockStatus, ScheduledActions};
pub use waypoints::Waypoints;

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            // Geometry по умолчанию: открытое поле (сцена может заменить)
            .init_resource::<Geometry>()
            .init_resource::<ScheduledActions>()
            .add_plugins((
                NpcSchedulePlugin,
                PerceptionPlugin,
                AIPlugin,
                NavigationBackendPlugin,
                ProjectilePlugin,
                AnimationPlugin,
            ));

        // Seed мог поставить create_headless_app / сцена
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource, Debug, Clone)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .add_plugins(SimulationPlugin);

    app
}

/// Снимок одного агента для сравнения детерминизма
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSnapshot {
    pub entity_index: u32,
    pub name: String,
    pub translation: Vec3,
    pub rotation: Quat,
    pub state: &'static str,
    pub destination: Option<Vec3>,
    pub blend: f32,
}

/// Snapshot всех агентов, отсортированный по Entity index
pub fn world_snapshot(world: &mut World) -> Vec<AgentSnapshot> {
    let mut query = world.query::<(Entity, &Actor, &Transform, &AgentBrain, &NavAgent, &AnimationSignal)>();
    let mut snapshot: Vec<AgentSnapshot> = query
        .iter(world)
        .map(|(entity, actor, transform, brain, nav, signal)| AgentSnapshot {
            entity_index: entity.index(),
            name: actor.name.clone(),
            translation: transform.translation,
            rotation: transform.rotation,
            state: brain.state_name(),
            destination: nav.destination(),
            blend: signal.blend,
        })
        .collect();

    // Сортируем по Entity ID для детерминизма
    snapshot.sort_by_key(|agent| agent.entity_index);
    snapshot
}
