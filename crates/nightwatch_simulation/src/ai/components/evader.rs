//! Evader: убегает по waypoints, когда замечает цель
//!
//! States: Patrolling ⇄ Waiting
//! - Patrolling: walk к текущему waypoint; увидел цель (и cooldown прошёл) →
//!   новый waypoint кроме текущего и последнего посещённого, run до прибытия
//! - прибыл → Waiting (dwell, stop)
//! - dwell истёк → last_visited = current, следующий waypoint, Patrolling
//!
//! Приоритет: пока идёт dwell, реселекция по perception не срабатывает.

use serde::{Deserialize, Serialize};

use super::brain::{AgentBehavior, ArchetypeDefaults, BrainContext, Locomotion};
use crate::navigation::{NavAgent, NavParams, SpeedTier, SpeedTiers};
use crate::perception::SightConfig;
use crate::timing::{Cooldown, Deadline};
use crate::waypoints::select_next;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaderConfig {
    pub arrive_threshold: f32,
    /// Минимальный интервал между реселекциями по perception (сек)
    pub reselection_cooldown: f32,
    /// Сколько стоим на waypoint (сек)
    pub dwell_time: f32,
}

impl Default for EvaderConfig {
    fn default() -> Self {
        Self {
            arrive_threshold: 0.35,
            reselection_cooldown: 0.4,
            dwell_time: 3.0,
        }
    }
}

pub fn archetype_defaults() -> ArchetypeDefaults {
    ArchetypeDefaults {
        tiers: SpeedTiers {
            walk: 2.2,
            run: 5.0,
            chase: 5.0,
        },
        nav: NavParams {
            acceleration: 22.0,
            angular_speed_deg: 720.0,
            stopping_distance: 0.35,
        },
        sight: SightConfig {
            sight_range: 12.0,
            sight_fov_deg: 90.0,
            ..SightConfig::default()
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaderState {
    #[default]
    Patrolling,
    Waiting,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaderBrain {
    pub config: EvaderConfig,
    state: EvaderState,
    current: Option<usize>,
    last_visited: Option<usize>,
    /// Run tier до следующего прибытия (после реселекции по perception)
    running: bool,
    retarget: Cooldown,
    dwell: Deadline,
}

impl Default for EvaderBrain {
    fn default() -> Self {
        Self::new(EvaderConfig::default())
    }
}

impl EvaderBrain {
    pub fn new(config: EvaderConfig) -> Self {
        Self {
            config,
            state: EvaderState::Patrolling,
            current: None,
            last_visited: None,
            running: false,
            retarget: Cooldown::new(config.reselection_cooldown),
            dwell: Deadline::inactive(),
        }
    }

    pub fn state(&self) -> EvaderState {
        self.state
    }

    pub fn current_waypoint(&self) -> Option<usize> {
        self.current
    }

    pub fn last_visited(&self) -> Option<usize> {
        self.last_visited
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn select(&mut self, ctx: &mut BrainContext, exclude_a: Option<usize>, exclude_b: Option<usize>) {
        let Some(waypoints) = ctx.waypoints else {
            return;
        };
        if let Some(next) = select_next(waypoints, exclude_a, exclude_b, ctx.rng) {
            self.current = Some(next);
            ctx.go_to_waypoint(next);
        }
    }
}

impl AgentBehavior for EvaderBrain {
    fn tick(&mut self, ctx: &mut BrainContext) {
        if ctx.valid_waypoints().is_none() {
            return;
        }

        if self.current.is_none() {
            self.select(ctx, None, None);
        }

        let now = ctx.now;

        if ctx.perception.sees_target && self.retarget.ready(now) && !self.dwell.is_active() {
            let (current, last_visited) = (self.current, self.last_visited);
            self.select(ctx, current, last_visited);
            self.retarget.trigger(now);
            self.running = true;
            crate::log(&format!(
                "🏃 {:?} Evader: target spotted, fleeing to waypoint {:?}",
                ctx.entity, self.current
            ));
        }

        if self.dwell.is_active() {
            ctx.nav.stop();
            ctx.set_tier(SpeedTier::Walk);

            if self.dwell.has_expired(now) {
                self.dwell.clear();
                ctx.nav.resume();
                self.last_visited = self.current;
                let last_visited = self.last_visited;
                self.select(ctx, last_visited, None);
                self.state = EvaderState::Patrolling;
                crate::log(&format!(
                    "{:?} Evader: Waiting → Patrolling (next waypoint {:?})",
                    ctx.entity, self.current
                ));
            }
            return;
        }

        ctx.nav.resume();
        ctx.set_tier(if self.running { SpeedTier::Run } else { SpeedTier::Walk });

        if ctx.nav.has_arrived(self.config.arrive_threshold) {
            self.running = false;
            self.dwell.lock_for(now, self.config.dwell_time);
            self.state = EvaderState::Waiting;
            ctx.nav.stop();
            ctx.set_tier(SpeedTier::Walk);
            crate::log(&format!(
                "{:?} Evader: arrived at waypoint {:?}, waiting {:.2}s",
                ctx.entity, self.current, self.config.dwell_time
            ));
        }
    }

    fn locomotion(&self, nav: &NavAgent) -> Locomotion {
        Locomotion {
            tier: nav.tier(),
            suspended: false,
        }
    }

    fn state_name(&self) -> &'static str {
        match self.state {
            EvaderState::Patrolling => "Patrolling",
            EvaderState::Waiting => "Waiting",
        }
    }
}
