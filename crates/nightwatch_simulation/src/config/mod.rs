//! Scenario configuration (RON)
//!
//! Сцена создаётся один раз при старте сессии: агенты, их waypoints,
//! препятствия, seed. Конфигурация: единственное место, где что-то может
//! "упасть"; тик симуляции ошибок не возвращает.
//!
//! ```ron
//! (
//!     seed: 42,
//!     agents: [
//!         (name: "guard", archetype: Patroller((dwell_time: 0.25)), position: (0.0, 0.0, 0.0),
//!          waypoints: [Some((0.0, 0.0, 0.0)), None, Some((8.0, 0.0, 0.0))]),
//!     ],
//!     obstacles: [(center: (0.0, 1.0, -5.0), half_extents: (3.0, 1.0, 0.2))],
//! )
//! ```

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ai::{
    AgentBrain, EvaderBrain, EvaderConfig, PatrollerBrain, PatrollerConfig, PlayerConfig, PlayerDirectedBrain,
    ShooterBrain, ShooterConfig,
};
use crate::components::{Actor, Player};
use crate::geometry::{Geometry, Obstacle, ObstacleField, COLLISION_LAYER_ENVIRONMENT};
use crate::navigation::{NavAgent, NavParams, SpeedTier, SpeedTiers};
use crate::perception::SightConfig;
use crate::waypoints::Waypoints;
use crate::DeterministicRng;

/// Errors of scenario loading / validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// RON syntax or schema mismatch
    #[error("Failed to parse scenario: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// Serialization back to RON failed
    #[error("Failed to serialize scenario: {0}")]
    Serialize(#[from] ron::Error),
    /// Scenario file unreadable
    #[error("Failed to read scenario {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Parameter outside its valid range
    #[error("Agent '{agent}': invalid {parameter} = {value} ({expected})")]
    InvalidParameter {
        agent: String,
        parameter: &'static str,
        value: f32,
        expected: &'static str,
    },
    /// Obstacle with degenerate extents
    #[error("Obstacle #{index}: half extents must be positive, got {half_extents:?}")]
    InvalidObstacle { index: usize, half_extents: [f32; 3] },
}

/// Архетип + его параметры
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArchetypeSpec {
    Evader(EvaderConfig),
    Patroller(PatrollerConfig),
    Shooter(ShooterConfig),
    Player(PlayerConfig),
}

impl ArchetypeSpec {
    pub fn build(&self) -> AgentBrain {
        match self {
            ArchetypeSpec::Evader(config) => AgentBrain::Evader(EvaderBrain::new(*config)),
            ArchetypeSpec::Patroller(config) => AgentBrain::Patroller(PatrollerBrain::new(*config)),
            ArchetypeSpec::Shooter(config) => AgentBrain::Shooter(ShooterBrain::new(*config)),
            ArchetypeSpec::Player(config) => AgentBrain::PlayerDirected(PlayerDirectedBrain::new(*config)),
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self, ArchetypeSpec::Player(_))
    }

    /// Порог прибытия, которым brain проверяет `has_arrived`
    pub fn arrive_threshold(&self) -> f32 {
        match self {
            ArchetypeSpec::Evader(config) => config.arrive_threshold,
            ArchetypeSpec::Patroller(config) => config.arrive_threshold,
            ArchetypeSpec::Shooter(config) => config.arrive_threshold,
            ArchetypeSpec::Player(config) => config.clamped().arrive_threshold,
        }
    }
}

/// Один агент сцены
///
/// `tiers` / `nav` / `sight` = None → значения архетипа по умолчанию.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub name: String,
    pub archetype: ArchetypeSpec,
    #[serde(default)]
    pub position: [f32; 3],
    /// Поворот вокруг Y (градусы), 0 = смотрит в -Z
    #[serde(default)]
    pub yaw_deg: f32,
    /// None = невалидная запись (пропускается при выборе)
    #[serde(default)]
    pub waypoints: Vec<Option<[f32; 3]>>,
    #[serde(default)]
    pub tiers: Option<SpeedTiers>,
    #[serde(default)]
    pub nav: Option<NavParams>,
    #[serde(default)]
    pub sight: Option<SightConfig>,
}

impl AgentSpec {
    pub fn new(name: impl Into<String>, archetype: ArchetypeSpec) -> Self {
        Self {
            name: name.into(),
            archetype,
            position: [0.0; 3],
            yaw_deg: 0.0,
            waypoints: Vec::new(),
            tiers: None,
            nav: None,
            sight: None,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position.to_array();
        self
    }

    pub fn facing(mut self, yaw_deg: f32) -> Self {
        self.yaw_deg = yaw_deg;
        self
    }

    pub fn with_waypoints(mut self, waypoints: impl IntoIterator<Item = Option<Vec3>>) -> Self {
        self.waypoints = waypoints
            .into_iter()
            .map(|point| point.map(|point| point.to_array()))
            .collect();
        self
    }

    pub fn with_tiers(mut self, tiers: SpeedTiers) -> Self {
        self.tiers = Some(tiers);
        self
    }

    pub fn with_nav(mut self, nav: NavParams) -> Self {
        self.nav = Some(nav);
        self
    }

    pub fn with_sight(mut self, sight: SightConfig) -> Self {
        self.sight = Some(sight);
        self
    }

    /// NavParams агента: stopping distance не больше порога прибытия,
    /// иначе backend останавливается раньше, чем brain "видит" arrival
    pub fn nav_params(&self, defaults: NavParams) -> NavParams {
        let mut params = self.nav.unwrap_or(defaults);
        let arrive_threshold = self.archetype.arrive_threshold();
        if params.stopping_distance > arrive_threshold {
            crate::log_warning(&format!(
                "⚠️ Agent '{}': stopping_distance {} > arrive_threshold {}, clamped",
                self.name, params.stopping_distance, arrive_threshold
            ));
            params.stopping_distance = arrive_threshold;
        }
        params
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(Vec3::from_array(self.position))
            .with_rotation(Quat::from_rotation_y(self.yaw_deg.to_radians()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let brain = self.archetype.build();
        let defaults = brain.defaults();
        let check = |parameter: &'static str, value: f32, valid: bool, expected: &'static str| {
            if valid && value.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::InvalidParameter {
                    agent: self.name.clone(),
                    parameter,
                    value,
                    expected,
                })
            }
        };

        let tiers = self.tiers.unwrap_or(defaults.tiers);
        for (parameter, value) in [("walk", tiers.walk), ("run", tiers.run), ("chase", tiers.chase)] {
            check(parameter, value, value > 0.0, "> 0")?;
        }

        let nav = self.nav.unwrap_or(defaults.nav);
        check("acceleration", nav.acceleration, nav.acceleration > 0.0, "> 0")?;
        check("angular_speed_deg", nav.angular_speed_deg, nav.angular_speed_deg >= 0.0, ">= 0")?;
        check("stopping_distance", nav.stopping_distance, nav.stopping_distance >= 0.0, ">= 0")?;

        let sight = self.sight.unwrap_or(defaults.sight);
        check("sight_range", sight.sight_range, sight.sight_range > 0.0, "> 0")?;
        check(
            "sight_fov_deg",
            sight.sight_fov_deg,
            sight.sight_fov_deg > 0.0 && sight.sight_fov_deg <= 360.0,
            "in (0, 360]",
        )?;
        check("eye_height", sight.eye_height, sight.eye_height >= 0.0, ">= 0")?;
        check(
            "target_height_fraction",
            sight.target_height_fraction,
            sight.target_height_fraction >= 0.0,
            ">= 0",
        )?;

        match &self.archetype {
            ArchetypeSpec::Evader(config) => {
                check("arrive_threshold", config.arrive_threshold, config.arrive_threshold >= 0.0, ">= 0")?;
                check(
                    "reselection_cooldown",
                    config.reselection_cooldown,
                    config.reselection_cooldown >= 0.0,
                    ">= 0",
                )?;
                check("dwell_time", config.dwell_time, config.dwell_time >= 0.0, ">= 0")?;
            }
            ArchetypeSpec::Patroller(config) => {
                check("arrive_threshold", config.arrive_threshold, config.arrive_threshold >= 0.0, ">= 0")?;
                check("dwell_time", config.dwell_time, config.dwell_time >= 0.0, ">= 0")?;
                check("lose_target_time", config.lose_target_time, config.lose_target_time >= 0.0, ">= 0")?;
            }
            ArchetypeSpec::Shooter(config) => {
                check("arrive_threshold", config.arrive_threshold, config.arrive_threshold >= 0.0, ">= 0")?;
                check("shoot_cooldown", config.shoot_cooldown, config.shoot_cooldown > 0.0, "> 0")?;
                check("shoot_stop_time", config.shoot_stop_time, config.shoot_stop_time >= 0.0, ">= 0")?;
                check(
                    "shoot_action_duration",
                    config.shoot_action_duration,
                    config.shoot_action_duration >= 0.0,
                    ">= 0",
                )?;
                check(
                    "shot_turn_speed_deg",
                    config.shot_turn_speed_deg,
                    config.shot_turn_speed_deg >= 0.0,
                    ">= 0",
                )?;
                check("projectile_speed", config.projectile_speed, config.projectile_speed > 0.0, "> 0")?;
                check("shoot_range", config.shoot_range, config.shoot_range > 0.0, "> 0")?;
                check(
                    "projectile_spawn_delay",
                    config.projectile_spawn_delay,
                    config.projectile_spawn_delay >= 0.0,
                    ">= 0",
                )?;
            }
            // Player thresholds clamp'ятся при создании brain'а
            ArchetypeSpec::Player(_) => {}
        }

        Ok(())
    }
}

/// Препятствие (AABB) для headless Geometry Oracle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSpec {
    pub center: [f32; 3],
    pub half_extents: [f32; 3],
    #[serde(default = "default_obstacle_layers")]
    pub layers: u32,
}

fn default_obstacle_layers() -> u32 {
    COLLISION_LAYER_ENVIRONMENT
}

impl ObstacleSpec {
    pub fn to_obstacle(&self) -> Obstacle {
        Obstacle::new(
            Vec3::from_array(self.center),
            Vec3::from_array(self.half_extents),
            self.layers,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub seed: u64,
    pub agents: Vec<AgentSpec>,
    pub obstacles: Vec<ObstacleSpec>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            seed: 42,
            agents: Vec::new(),
            obstacles: Vec::new(),
        }
    }
}

impl Scenario {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron_str(&source)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for agent in &self.agents {
            agent.validate()?;
        }
        for (index, obstacle) in self.obstacles.iter().enumerate() {
            if obstacle.half_extents.iter().any(|extent| !(*extent > 0.0)) {
                return Err(ConfigError::InvalidObstacle {
                    index,
                    half_extents: obstacle.half_extents,
                });
            }
        }
        Ok(())
    }

    pub fn geometry(&self) -> Geometry {
        Geometry::new(ObstacleField::new(
            self.obstacles.iter().map(ObstacleSpec::to_obstacle).collect(),
        ))
    }
}

/// Spawn одного агента (required components добавит AgentBrain)
pub fn spawn_agent(world: &mut World, spec: &AgentSpec) -> Entity {
    let brain = spec.archetype.build();
    let defaults = brain.defaults();
    let tiers = spec.tiers.unwrap_or(defaults.tiers);

    let mut nav = NavAgent::default();
    nav.set_tier(SpeedTier::Walk, &tiers);

    let mut entity = world.spawn((
        Actor::new(spec.name.clone()),
        brain,
        spec.transform(),
        nav,
        tiers,
        spec.nav_params(defaults.nav),
        spec.sight.unwrap_or(defaults.sight),
    ));

    if !spec.waypoints.is_empty() {
        entity.insert(Waypoints::new(
            spec.waypoints
                .iter()
                .map(|point| point.map(Vec3::from_array))
                .collect(),
        ));
    }
    if spec.archetype.is_player() {
        entity.insert(Player);
    }

    entity.id()
}

/// Валидирует сцену, ставит Geometry + seed, спавнит агентов (в порядке списка)
pub fn spawn_scenario(world: &mut World, scenario: &Scenario) -> Result<Vec<Entity>, ConfigError> {
    scenario.validate()?;

    world.insert_resource(scenario.geometry());
    world.insert_resource(DeterministicRng::new(scenario.seed));

    let entities: Vec<Entity> = scenario
        .agents
        .iter()
        .map(|spec| spawn_agent(world, spec))
        .collect();

    crate::log_info(&format!(
        "✅ Scenario spawned: {} agents, {} obstacles (seed {})",
        entities.len(),
        scenario.obstacles.len(),
        scenario.seed
    ));
    Ok(entities)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_scenario() {
        let scenario = Scenario::from_ron_str(
            r#"(
                seed: 7,
                agents: [
                    (
                        name: "guard",
                        archetype: Patroller((dwell_time: 0.5)),
                        position: (1.0, 0.0, 2.0),
                        waypoints: [Some((0.0, 0.0, 0.0)), None, Some((4.0, 0.0, 0.0))],
                    ),
                ],
            )"#,
        )
        .expect("valid scenario");

        assert_eq!(scenario.seed, 7);
        assert!(scenario.obstacles.is_empty());
        let guard = &scenario.agents[0];
        assert_eq!(guard.position, [1.0, 0.0, 2.0]);
        assert_eq!(guard.waypoints.len(), 3);
        assert_eq!(guard.waypoints[1], None);

        let ArchetypeSpec::Patroller(config) = &guard.archetype else {
            panic!("expected patroller, got {:?}", guard.archetype);
        };
        assert_eq!(config.dwell_time, 0.5);
        // Остальное: значения по умолчанию
        assert_eq!(config.lose_target_time, 2.0);
        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn test_parse_error_is_reported() {
        let result = Scenario::from_ron_str("(agents: [ (name: 1) ])");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        let bad_fov = Scenario {
            agents: vec![AgentSpec::new("eye", ArchetypeSpec::Evader(EvaderConfig::default())).with_sight(
                SightConfig {
                    sight_fov_deg: 400.0,
                    ..default()
                },
            )],
            ..default()
        };
        assert!(matches!(
            bad_fov.validate(),
            Err(ConfigError::InvalidParameter { parameter: "sight_fov_deg", .. })
        ));

        let bad_cooldown = Scenario {
            agents: vec![AgentSpec::new(
                "gun",
                ArchetypeSpec::Shooter(ShooterConfig {
                    shoot_cooldown: 0.0,
                    ..default()
                }),
            )],
            ..default()
        };
        assert!(bad_cooldown.validate().is_err());

        let bad_obstacle = Scenario {
            obstacles: vec![ObstacleSpec {
                center: [0.0; 3],
                half_extents: [1.0, 0.0, 1.0],
                layers: COLLISION_LAYER_ENVIRONMENT,
            }],
            ..default()
        };
        assert!(matches!(
            bad_obstacle.validate(),
            Err(ConfigError::InvalidObstacle { index: 0, .. })
        ));
    }

    #[test]
    fn test_ron_round_trip_keeps_invalid_waypoints() {
        let scenario = Scenario {
            seed: 3,
            agents: vec![AgentSpec::new("runner", ArchetypeSpec::Evader(EvaderConfig::default()))
                .at(Vec3::new(1.0, 0.0, 1.0))
                .with_waypoints([Some(Vec3::X), None])],
            obstacles: Vec::new(),
        };
        let text = scenario.to_ron_string().expect("serializable");
        let parsed = Scenario::from_ron_str(&text).expect("parsable");
        assert_eq!(parsed, scenario);
    }

    #[test]
    fn test_spawn_agent_uses_archetype_defaults() {
        let mut world = World::new();
        let spec = AgentSpec::new("gun", ArchetypeSpec::Shooter(ShooterConfig::default()))
            .at(Vec3::new(2.0, 0.0, 3.0))
            .facing(90.0)
            .with_waypoints([Some(Vec3::ZERO)]);

        let entity = spawn_agent(&mut world, &spec);

        let sight = world.get::<SightConfig>(entity).expect("sight");
        assert_eq!(sight.sight_fov_deg, 60.0);
        assert_eq!(world.get::<SpeedTiers>(entity).map(|tiers| tiers.walk), Some(2.6));
        assert_eq!(world.get::<NavAgent>(entity).map(|nav| nav.speed()), Some(2.6));
        assert_eq!(world.get::<NavParams>(entity).map(|nav| nav.acceleration), Some(18.0));
        assert!(world.get::<Waypoints>(entity).is_some());
        assert!(world.get::<Player>(entity).is_none());

        let transform = world.get::<Transform>(entity).expect("transform");
        assert_eq!(transform.translation, Vec3::new(2.0, 0.0, 3.0));
        // yaw 90° → forward = -X
        assert!(transform.forward().as_vec3().distance(Vec3::NEG_X) < 1e-5);
    }

    #[test]
    fn test_stopping_distance_clamped_to_arrive_threshold() {
        let mut world = World::new();

        let tight = AgentSpec::new(
            "guard",
            ArchetypeSpec::Patroller(PatrollerConfig {
                arrive_threshold: 0.2,
                ..default()
            }),
        );
        assert!(tight.validate().is_ok());
        let guard = spawn_agent(&mut world, &tight);
        assert_eq!(world.get::<NavParams>(guard).map(|nav| nav.stopping_distance), Some(0.2));

        // Player: порог после clamp'а (минимум 0.05)
        let player = AgentSpec::new(
            "player",
            ArchetypeSpec::Player(PlayerConfig {
                arrive_threshold: 0.0,
                ..default()
            }),
        );
        let player = spawn_agent(&mut world, &player);
        assert_eq!(world.get::<NavParams>(player).map(|nav| nav.stopping_distance), Some(0.05));

        // Stopping distance меньше порога не трогаем
        let loose = AgentSpec::new("runner", ArchetypeSpec::Evader(EvaderConfig::default())).with_nav(NavParams {
            stopping_distance: 0.1,
            ..default()
        });
        let runner = spawn_agent(&mut world, &loose);
        assert_eq!(world.get::<NavParams>(runner).map(|nav| nav.stopping_distance), Some(0.1));
    }
}
