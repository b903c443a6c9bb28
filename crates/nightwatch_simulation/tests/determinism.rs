//! Тесты детерминизма
//!
//! Проверяем что симуляция с одинаковым seed даёт идентичные результаты
//! (RNG waypoint selection, порядок систем, SimClock).

use bevy::prelude::*;
use nightwatch_simulation::*;

const LAB_SCENARIO: &str = include_str!("../scenarios/lab.ron");
const DT: f32 = 1.0 / 60.0;

/// Запускает lab сцену и возвращает snapshot агентов + число выстрелов
fn run_simulation(seed: u64, tick_count: usize) -> (Vec<AgentSnapshot>, u32) {
    let mut scenario = Scenario::from_ron_str(LAB_SCENARIO).expect("lab scenario parses");
    scenario.seed = seed;

    let mut app = create_headless_app(seed);
    spawn_scenario(app.world_mut(), &scenario).expect("lab scenario is valid");

    // Игрок бегает по сцене: evader реагирует, shooter стреляет
    let player = app
        .world_mut()
        .query_filtered::<Entity, With<Player>>()
        .iter(app.world())
        .next()
        .expect("player agent");

    for tick in 0..tick_count {
        if tick % 150 == 0 {
            let corner = if (tick / 150) % 2 == 0 {
                Vec3::new(6.0, 0.0, -6.0)
            } else {
                Vec3::new(-3.0, 0.0, 3.0)
            };
            app.world_mut().send_event(MoveRequest {
                agent: player,
                point: corner,
            });
        }
        step_simulation(app.world_mut(), DT);
    }

    let shots = app
        .world_mut()
        .query::<&AgentBrain>()
        .iter(app.world())
        .filter_map(AgentBrain::as_shooter)
        .map(ShooterBrain::shots_fired)
        .sum();
    (world_snapshot(app.world_mut()), shots)
}

#[test]
fn test_determinism_same_seed() {
    const SEED: u64 = 12345;
    const TICK_COUNT: usize = 900;

    let first = run_simulation(SEED, TICK_COUNT);
    let second = run_simulation(SEED, TICK_COUNT);

    assert_eq!(
        first, second,
        "Симуляция с одинаковым seed ({}) дала разные результаты!",
        SEED
    );
    assert_eq!(first.0.len(), 4);
}

#[test]
fn test_determinism_multiple_runs() {
    const SEED: u64 = 42;
    const TICK_COUNT: usize = 600;

    // Запускаем 3 раза: все должны быть идентичны
    let snapshots: Vec<_> = (0..3).map(|_| run_simulation(SEED, TICK_COUNT)).collect();

    for (i, snapshot) in snapshots.iter().enumerate().skip(1) {
        assert_eq!(
            snapshots[0], *snapshot,
            "Прогон {} дал результат отличный от прогона 0",
            i
        );
    }
}
