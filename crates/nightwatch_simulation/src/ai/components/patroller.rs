//! Patroller: циклический обход waypoints + погоня
//!
//! States: Patrol → WaitAtWaypoint → Patrol ... ; любое → Chase при detection
//!
//! Chase:
//! - цель видна → destination = цель каждый тик, chase tier
//! - цель потеряна → бежим к последней известной позиции `lose_target_time`
//! - grace истёк → ближайший waypoint (прямая дистанция), Patrol

use serde::{Deserialize, Serialize};

use super::brain::{AgentBehavior, ArchetypeDefaults, BrainContext, Locomotion};
use crate::navigation::{NavAgent, NavParams, SpeedTier, SpeedTiers};
use crate::perception::SightConfig;
use crate::timing::Deadline;
use crate::waypoints::{nearest, next_cyclic};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrollerConfig {
    pub arrive_threshold: f32,
    /// 0 = без остановки на waypoint
    pub dwell_time: f32,
    /// Grace period после потери цели (сек)
    pub lose_target_time: f32,
}

impl Default for PatrollerConfig {
    fn default() -> Self {
        Self {
            arrive_threshold: 0.4,
            dwell_time: 0.25,
            lose_target_time: 2.0,
        }
    }
}

/// patrol 3.0 (walk tier), chase 4.8
pub fn archetype_defaults() -> ArchetypeDefaults {
    ArchetypeDefaults {
        tiers: SpeedTiers {
            walk: 3.0,
            run: 4.8,
            chase: 4.8,
        },
        nav: NavParams {
            acceleration: 20.0,
            angular_speed_deg: 720.0,
            stopping_distance: 0.35,
        },
        sight: SightConfig {
            sight_range: 7.0,
            sight_fov_deg: 90.0,
            ..SightConfig::default()
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatrollerState {
    #[default]
    Patrol,
    WaitAtWaypoint,
    Chase,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatrollerBrain {
    pub config: PatrollerConfig,
    state: PatrollerState,
    waypoint_index: usize,
    started: bool,
    wait: Deadline,
    /// Locked = цель видели меньше `lose_target_time` назад
    lose_target: Deadline,
    last_seen_at: Option<f64>,
}

impl Default for PatrollerBrain {
    fn default() -> Self {
        Self::new(PatrollerConfig::default())
    }
}

impl PatrollerBrain {
    pub fn new(config: PatrollerConfig) -> Self {
        Self {
            config,
            state: PatrollerState::Patrol,
            waypoint_index: 0,
            started: false,
            wait: Deadline::inactive(),
            lose_target: Deadline::inactive(),
            last_seen_at: None,
        }
    }

    pub fn state(&self) -> PatrollerState {
        self.state
    }

    pub fn waypoint_index(&self) -> usize {
        self.waypoint_index
    }

    pub fn last_seen_at(&self) -> Option<f64> {
        self.last_seen_at
    }

    fn set_state(&mut self, ctx: &BrainContext, next: PatrollerState) {
        if self.state != next {
            crate::log(&format!("{:?} Patroller: {:?} → {:?}", ctx.entity, self.state, next));
        }
        self.state = next;
    }

    /// Старт: первый валидный waypoint
    fn start(&mut self, ctx: &mut BrainContext) {
        self.started = true;
        let first = ctx
            .waypoints
            .and_then(|waypoints| waypoints.valid_handles().next());
        if let Some(first) = first {
            self.waypoint_index = first;
            ctx.go_to_waypoint(first);
        }
    }

    fn advance(&mut self, ctx: &mut BrainContext) {
        let Some(next) = ctx
            .waypoints
            .and_then(|waypoints| next_cyclic(waypoints, self.waypoint_index))
        else {
            return;
        };
        self.waypoint_index = next;
        ctx.nav.resume();
        ctx.go_to_waypoint(next);
    }

    /// Detection: фиксируем timestamp и сразу ведём destination на цель
    fn spotted(&mut self, ctx: &mut BrainContext) {
        let now = ctx.now;
        self.last_seen_at = Some(now);
        self.lose_target.lock_for(now, self.config.lose_target_time);
        self.wait.clear();

        ctx.nav.resume();
        ctx.set_tier(SpeedTier::Chase);
        if let Some(target) = ctx.perception.target_position {
            ctx.nav.set_destination(target);
        }
    }

    fn tick_patrol(&mut self, ctx: &mut BrainContext) {
        ctx.nav.resume();
        ctx.set_tier(SpeedTier::Walk);

        if !ctx.nav.has_arrived(self.config.arrive_threshold) {
            return;
        }

        if self.config.dwell_time > 0.0 {
            self.wait.lock_for(ctx.now, self.config.dwell_time);
            ctx.nav.stop();
            self.set_state(ctx, PatrollerState::WaitAtWaypoint);
            return;
        }

        self.advance(ctx);
    }

    fn tick_wait(&mut self, ctx: &mut BrainContext) {
        ctx.nav.stop();

        if self.wait.has_expired(ctx.now) {
            self.wait.clear();
            self.advance(ctx);
            self.set_state(ctx, PatrollerState::Patrol);
        }
    }

    fn tick_chase(&mut self, ctx: &mut BrainContext) {
        if self.lose_target.is_locked(ctx.now) {
            // Последняя известная позиция
            ctx.nav.resume();
            ctx.set_tier(SpeedTier::Chase);
            return;
        }

        self.lose_target.clear();
        let position = ctx.transform.translation;
        if let Some(index) = ctx.waypoints.and_then(|waypoints| nearest(waypoints, position)) {
            self.waypoint_index = index;
            ctx.go_to_waypoint(index);
        }
        ctx.set_tier(SpeedTier::Walk);
        crate::log(&format!(
            "👻 {:?} Patroller: target lost, back to waypoint {}",
            ctx.entity, self.waypoint_index
        ));
        self.set_state(ctx, PatrollerState::Patrol);
    }
}

impl AgentBehavior for PatrollerBrain {
    fn tick(&mut self, ctx: &mut BrainContext) {
        if !self.started {
            self.start(ctx);
        }

        if ctx.perception.sees_target {
            if self.state != PatrollerState::Chase {
                crate::log(&format!("🎯 {:?} Patroller: target spotted", ctx.entity));
            }
            self.spotted(ctx);
            self.set_state(ctx, PatrollerState::Chase);
            return;
        }

        // Обходить нечего: держим последний destination
        if self.state != PatrollerState::Chase && ctx.valid_waypoints().is_none() {
            return;
        }

        match self.state {
            PatrollerState::Patrol => self.tick_patrol(ctx),
            PatrollerState::WaitAtWaypoint => self.tick_wait(ctx),
            PatrollerState::Chase => self.tick_chase(ctx),
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
            PatrollerState::Patrol => "Patrol",
            PatrollerState::WaitAtWaypoint => "WaitAtWaypoint",
            PatrollerState::Chase => "Chase",
        }
    }
}
