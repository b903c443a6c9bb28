//! Headless симуляция NIGHTWATCH
//!
//! Загружает сцену (RON), спавнит агентов и гоняет NpcTick без рендера.
//! Usage: `nightwatch_simulation [scenario.ron]` (без аргумента: встроенная lab сцена)

use bevy::prelude::*;
use nightwatch_simulation::{
    create_headless_app, log_error, log_info, spawn_scenario, step_simulation, Actor, AgentBehavior,
    AgentBrain, AnimationSignal, ProjectileHit, Scenario, ShootTriggered,
};

const LAB_SCENARIO: &str = include_str!("../scenarios/lab.ron");
const TICK_COUNT: u64 = 1000;
const TICK_DELTA: f32 = 1.0 / 60.0;

fn main() {
    let scenario = match std::env::args().nth(1) {
        Some(path) => Scenario::load(&path),
        None => Scenario::from_ron_str(LAB_SCENARIO),
    };

    let scenario = match scenario {
        Ok(scenario) => scenario,
        Err(error) => {
            log_error(&format!("❌ Failed to load scenario: {error}"));
            std::process::exit(1);
        }
    };

    let mut app = create_headless_app(scenario.seed);
    if let Err(error) = spawn_scenario(app.world_mut(), &scenario) {
        log_error(&format!("❌ Invalid scenario: {error}"));
        std::process::exit(1);
    }

    log_info(&format!(
        "Starting NIGHTWATCH headless simulation (seed: {}, {} agents)",
        scenario.seed,
        scenario.agents.len()
    ));

    let mut totals = Totals::default();
    for tick in 1..=TICK_COUNT {
        step_simulation(app.world_mut(), TICK_DELTA);
        totals.count_tick(app.world());

        if tick % 100 == 0 {
            report(app.world_mut(), tick, &totals);
        }
    }

    log_info("Simulation complete!");
}

/// Счётчики за всю сессию (буферы событий живут два тика)
#[derive(Default)]
struct Totals {
    shots: usize,
    hits: usize,
}

impl Totals {
    fn count_tick(&mut self, world: &World) {
        self.shots += world.resource::<Events<ShootTriggered>>().iter_current_update_events().count();
        self.hits += world.resource::<Events<ProjectileHit>>().iter_current_update_events().count();
    }
}

fn report(world: &mut World, tick: u64, totals: &Totals) {
    log_info(&format!(
        "Tick {tick}: {} shots, {} projectile hits so far",
        totals.shots, totals.hits
    ));

    let mut agents = world.query::<(Entity, &Actor, &AgentBrain, &Transform, &AnimationSignal)>();
    for (entity, actor, brain, transform, signal) in agents.iter(world) {
        log_info(&format!(
            "  {:?} {}: {} at ({:.2}, {:.2}) blend {:.2}",
            entity,
            actor.name,
            brain.state_name(),
            transform.translation.x,
            transform.translation.z,
            signal.blend
        ));
    }
}
