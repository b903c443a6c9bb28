//! Evader integration tests
//!
//! Проверяем:
//! - прибытие → dwell (стоит на walk tier) → следующий waypoint ≠ только что посещённого
//! - detection → немедленная реселекция (не текущий, не last visited) + run tier
//! - во время dwell detection игнорируется

use bevy::prelude::*;
use nightwatch_simulation::*;

const DT: f32 = 1.0 / 64.0;
const DT_60HZ: f32 = 1.0 / 60.0;

fn spawn_evader(app: &mut App) -> Entity {
    let spec = AgentSpec::new("runner", ArchetypeSpec::Evader(EvaderConfig::default())).with_waypoints([
        Some(Vec3::new(0.0, 0.0, -6.0)),
        Some(Vec3::new(6.0, 0.0, 0.0)),
        None,
        Some(Vec3::new(0.0, 0.0, 6.0)),
        Some(Vec3::new(-6.0, 0.0, 0.0)),
    ]);
    spawn_agent(app.world_mut(), &spec)
}

fn evader(app: &App, entity: Entity) -> EvaderBrain {
    app.world()
        .get::<AgentBrain>(entity)
        .and_then(AgentBrain::as_evader)
        .cloned()
        .expect("evader brain")
}

fn step_until_waiting(app: &mut App, entity: Entity, dt: f32) {
    for _ in 0..2000 {
        step_simulation(app.world_mut(), dt);
        if evader(app, entity).state() == EvaderState::Waiting {
            return;
        }
    }
    panic!("Evader так и не дошёл до waypoint");
}

/// Dwell 3.0 с: Waiting ровно `dwell_ticks`, затем другой валидный waypoint
fn assert_dwell_then_moves(dt: f32, dwell_ticks: u32) {
    let mut app = create_headless_app(42);
    let runner = spawn_evader(&mut app);

    step_until_waiting(&mut app, runner, dt);
    let brain = evader(&app, runner);
    let visited = brain.current_waypoint().expect("current waypoint");
    assert_ne!(visited, 2, "невалидный waypoint не выбирается");
    assert!(!brain.is_running());

    let nav = app.world().get::<NavAgent>(runner).expect("nav");
    assert!(nav.is_stopped());
    assert_eq!(nav.tier(), SpeedTier::Walk);

    for tick in 1..dwell_ticks {
        step_simulation(app.world_mut(), dt);
        assert_eq!(evader(&app, runner).state(), EvaderState::Waiting, "dwell тик {tick}");
    }
    step_simulation(app.world_mut(), dt);

    let brain = evader(&app, runner);
    assert_eq!(brain.state(), EvaderState::Patrolling);
    assert_eq!(brain.last_visited(), Some(visited));
    let next = brain.current_waypoint().expect("next waypoint");
    assert_ne!(next, visited);
    assert_ne!(next, 2);

    let nav = app.world().get::<NavAgent>(runner).expect("nav");
    assert!(!nav.is_stopped());
}

/// dwell 3.0 с = 192 тика
#[test]
fn test_dwell_then_moves_to_other_waypoint() {
    assert_dwell_then_moves(DT, 192);
}

/// 60 Hz: dwell 3.0 с = 180 тиков
#[test]
fn test_dwell_at_sixty_hz() {
    assert_dwell_then_moves(DT_60HZ, 180);
}

#[test]
fn test_detection_reselects_and_runs() {
    let mut app = create_headless_app(42);
    let runner = spawn_evader(&mut app);

    // Лёгкий старт: идёт к первому waypoint
    for _ in 0..20 {
        step_simulation(app.world_mut(), DT);
    }
    let before = evader(&app, runner);
    assert_eq!(before.state(), EvaderState::Patrolling);
    let current = before.current_waypoint();

    // Игрок прямо по курсу, 4 м
    let transform = *app.world().get::<Transform>(runner).expect("transform");
    let ahead = transform.translation + transform.forward().as_vec3() * 4.0;
    app.world_mut()
        .spawn((Actor::new("player"), Player, Transform::from_translation(ahead)));

    step_simulation(app.world_mut(), DT);
    let brain = evader(&app, runner);
    assert!(app.world().get::<Perception>(runner).is_some_and(|perception| perception.sees_target));
    assert!(brain.is_running());
    assert_ne!(brain.current_waypoint(), current);
    assert_ne!(brain.current_waypoint(), Some(2));

    let nav = app.world().get::<NavAgent>(runner).expect("nav");
    assert_eq!(nav.tier(), SpeedTier::Run);
    let waypoints = app.world().get::<Waypoints>(runner).expect("waypoints");
    assert_eq!(
        nav.destination(),
        brain.current_waypoint().and_then(|handle| waypoints.get(handle))
    );
}

#[test]
fn test_detection_ignored_while_dwelling() {
    let mut app = create_headless_app(42);
    let runner = spawn_evader(&mut app);

    step_until_waiting(&mut app, runner, DT);
    let current = evader(&app, runner).current_waypoint();

    let transform = *app.world().get::<Transform>(runner).expect("transform");
    let ahead = transform.translation + transform.forward().as_vec3() * 4.0;
    app.world_mut()
        .spawn((Actor::new("player"), Player, Transform::from_translation(ahead)));

    for _ in 0..30 {
        step_simulation(app.world_mut(), DT);
    }

    let brain = evader(&app, runner);
    assert_eq!(brain.state(), EvaderState::Waiting);
    assert_eq!(brain.current_waypoint(), current);
    assert!(!brain.is_running());
    assert!(app.world().get::<NavAgent>(runner).is_some_and(NavAgent::is_stopped));
}
