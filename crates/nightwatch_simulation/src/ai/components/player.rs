//! Player-directed agent: без автономных состояний
//!
//! MoveRequest (click → точка на navmesh) → destination, run, resume.
//! Каждый тик (путь посчитан):
//! - remaining > slow_down_radius → run
//! - arrive_threshold < remaining ≤ slow_down_radius → walk
//! - remaining ≤ arrive_threshold → destination снят, stop

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::brain::{AgentBehavior, ArchetypeDefaults, BrainContext, Locomotion};
use crate::navigation::{NavAgent, NavParams, SpeedTier, SpeedTiers};
use crate::perception::SightConfig;

pub const MIN_ARRIVE_THRESHOLD: f32 = 0.05;
/// slow_down_radius ≥ arrive_threshold + margin
pub const SLOW_DOWN_MARGIN: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub slow_down_radius: f32,
    pub arrive_threshold: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            slow_down_radius: 2.5,
            arrive_threshold: 0.35,
        }
    }
}

impl PlayerConfig {
    /// Clamp на этапе конфигурации (в рантайме не проверяем)
    pub fn clamped(self) -> Self {
        let arrive_threshold = self.arrive_threshold.max(MIN_ARRIVE_THRESHOLD);
        let slow_down_radius = self.slow_down_radius.max(arrive_threshold + SLOW_DOWN_MARGIN);
        Self {
            slow_down_radius,
            arrive_threshold,
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
        nav: NavParams::default(),
        sight: SightConfig::default(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerDirectedBrain {
    config: PlayerConfig,
    target: Option<Vec3>,
}

impl Default for PlayerDirectedBrain {
    fn default() -> Self {
        Self::new(PlayerConfig::default())
    }
}

impl PlayerDirectedBrain {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            config: config.clamped(),
            target: None,
        }
    }

    pub fn config(&self) -> PlayerConfig {
        self.config
    }

    pub fn target(&self) -> Option<Vec3> {
        self.target
    }

    /// Target request (точка уже спроецирована на navmesh снаружи)
    pub fn request_move(&mut self, point: Vec3, nav: &mut NavAgent, tiers: &SpeedTiers) {
        self.target = Some(point);
        nav.set_tier(SpeedTier::Run, tiers);
        nav.resume();
        nav.set_destination(point);
    }
}

impl AgentBehavior for PlayerDirectedBrain {
    fn tick(&mut self, ctx: &mut BrainContext) {
        if self.target.is_none() || ctx.nav.path_pending() {
            return;
        }

        let remaining = ctx.nav.remaining_distance();
        if remaining > self.config.slow_down_radius {
            ctx.set_tier(SpeedTier::Run);
        } else if remaining > self.config.arrive_threshold {
            ctx.set_tier(SpeedTier::Walk);
        } else {
            self.target = None;
            ctx.nav.clear_destination();
            ctx.nav.stop();
            crate::log(&format!("{:?} Player: arrived", ctx.entity));
        }
    }

    fn locomotion(&self, nav: &NavAgent) -> Locomotion {
        Locomotion {
            tier: nav.tier(),
            suspended: false,
        }
    }

    fn state_name(&self) -> &'static str {
        if self.target.is_some() {
            "Moving"
        } else {
            "Idle"
        }
    }
}
