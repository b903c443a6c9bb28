//! Tests for Patroller state machine.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::super::brain::BrainRig;
    use super::super::patroller::{archetype_defaults, PatrollerBrain, PatrollerConfig, PatrollerState};
    use crate::navigation::SpeedTier;
    use crate::waypoints::Waypoints;

    fn triangle() -> Waypoints {
        Waypoints::from_points([
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(8.0, 0.0, 0.0),
            Vec3::new(8.0, 0.0, 8.0),
        ])
    }

    fn rig() -> BrainRig {
        BrainRig::new(archetype_defaults(), Some(triangle()))
    }

    #[test]
    fn test_patroller_config_default() {
        let config = PatrollerConfig::default();
        assert_eq!(config.arrive_threshold, 0.4);
        assert_eq!(config.dwell_time, 0.25);
        assert_eq!(config.lose_target_time, 2.0);

        let defaults = archetype_defaults();
        assert_eq!(defaults.tiers.walk, 3.0);
        assert_eq!(defaults.tiers.chase, 4.8);
        assert_eq!(defaults.nav.acceleration, 20.0);
        assert_eq!(defaults.sight.sight_range, 7.0);
    }

    #[test]
    fn test_starts_at_first_valid_waypoint() {
        let waypoints = Waypoints::new(vec![None, Some(Vec3::X), Some(Vec3::Z)]);
        let mut rig = BrainRig::new(archetype_defaults(), Some(waypoints));
        let mut brain = PatrollerBrain::default();

        rig.tick(&mut brain, 0.0, 0.0);
        assert_eq!(brain.waypoint_index(), 1);
        assert_eq!(rig.nav.destination(), Some(Vec3::X));
        assert_eq!(brain.state(), PatrollerState::Patrol);
        assert_eq!(rig.nav.tier(), SpeedTier::Walk);
    }

    #[test]
    fn test_wait_then_advance_cyclic() {
        let mut rig = rig();
        let mut brain = PatrollerBrain::default();
        rig.tick(&mut brain, 0.0, 0.0);

        let mut visited = Vec::new();
        let mut now = 0.0;
        for _ in 0..6 {
            rig.report(0.3);
            now += 1.0;
            rig.tick(&mut brain, now, 1.0);
            assert_eq!(brain.state(), PatrollerState::WaitAtWaypoint);
            assert!(rig.nav.is_stopped());

            // Dwell 0.25
            rig.tick(&mut brain, now + 0.125, 0.125);
            assert_eq!(brain.state(), PatrollerState::WaitAtWaypoint);
            rig.tick(&mut brain, now + 0.25, 0.125);
            assert_eq!(brain.state(), PatrollerState::Patrol);
            visited.push(brain.waypoint_index());
            now += 0.25;
        }

        assert_eq!(visited, vec![1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn test_zero_dwell_advances_immediately() {
        let mut rig = rig();
        let mut brain = PatrollerBrain::new(PatrollerConfig {
            dwell_time: 0.0,
            ..default()
        });
        rig.tick(&mut brain, 0.0, 0.0);

        rig.report(0.1);
        rig.tick(&mut brain, 1.0, 1.0);
        assert_eq!(brain.state(), PatrollerState::Patrol);
        assert_eq!(brain.waypoint_index(), 1);
        assert!(rig.nav.path_pending());
    }

    #[test]
    fn test_lose_target_grace_exactly_two_seconds() {
        let mut rig = rig();
        let mut brain = PatrollerBrain::default();
        rig.tick(&mut brain, 0.0, 0.0);
        rig.report(5.0);

        let target = Vec3::new(3.0, 0.0, 3.0);
        rig.see_target_at(target);
        rig.tick(&mut brain, 1.0, 1.0);
        assert_eq!(brain.state(), PatrollerState::Chase);
        assert_eq!(brain.last_seen_at(), Some(1.0));
        assert_eq!(rig.nav.destination(), Some(target));
        assert_eq!(rig.nav.tier(), SpeedTier::Chase);
        assert_eq!(rig.nav.speed(), 4.8);

        // Агент добежал почти до waypoint 2
        rig.transform.translation = Vec3::new(7.0, 0.0, 7.0);
        rig.lose_target();

        for now in [1.5, 2.5, 2.984375] {
            rig.tick(&mut brain, now, 0.5);
            assert_eq!(brain.state(), PatrollerState::Chase, "t = {now}");
            assert_eq!(rig.nav.destination(), Some(target));
            assert_eq!(rig.nav.tier(), SpeedTier::Chase);
        }

        rig.tick(&mut brain, 3.0, 0.015625);
        assert_eq!(brain.state(), PatrollerState::Patrol);
        assert_eq!(brain.waypoint_index(), 2);
        assert_eq!(rig.nav.destination(), Some(Vec3::new(8.0, 0.0, 8.0)));
    }

    #[test]
    fn test_resighting_extends_grace() {
        let mut rig = rig();
        let mut brain = PatrollerBrain::default();
        rig.tick(&mut brain, 0.0, 0.0);

        rig.see_target_at(Vec3::new(1.0, 0.0, 1.0));
        rig.tick(&mut brain, 1.0, 1.0);
        rig.lose_target();
        rig.tick(&mut brain, 1.5, 0.5);

        let moved = Vec3::new(2.0, 0.0, 2.0);
        rig.see_target_at(moved);
        rig.tick(&mut brain, 2.0, 0.5);
        assert_eq!(rig.nav.destination(), Some(moved));
        rig.lose_target();

        rig.tick(&mut brain, 3.5, 1.5);
        assert_eq!(brain.state(), PatrollerState::Chase);
        rig.tick(&mut brain, 4.0, 0.5);
        assert_eq!(brain.state(), PatrollerState::Patrol);
    }

    #[test]
    fn test_detection_interrupts_wait() {
        let mut rig = rig();
        let mut brain = PatrollerBrain::default();
        rig.tick(&mut brain, 0.0, 0.0);
        rig.report(0.1);
        rig.tick(&mut brain, 1.0, 1.0);
        assert_eq!(brain.state(), PatrollerState::WaitAtWaypoint);

        rig.see_target_at(Vec3::new(0.0, 0.0, -4.0));
        rig.tick(&mut brain, 1.1, 0.1);
        assert_eq!(brain.state(), PatrollerState::Chase);
        assert!(!rig.nav.is_stopped());
    }

    #[test]
    fn test_no_valid_waypoints_holds_still() {
        let mut rig = BrainRig::new(archetype_defaults(), Some(Waypoints::new(vec![None, None])));
        let mut brain = PatrollerBrain::default();

        for tick in 0..40u32 {
            rig.report(0.0);
            rig.tick(&mut brain, f64::from(tick) * 0.125, 0.125);
            assert_eq!(brain.state(), PatrollerState::Patrol, "tick {tick}");
            assert_eq!(rig.nav.destination(), None);
        }
    }

    /// Погоня без waypoints: после grace остаётся на последней позиции цели
    #[test]
    fn test_chase_without_waypoints_keeps_last_known_position() {
        let mut rig = BrainRig::new(archetype_defaults(), None);
        let mut brain = PatrollerBrain::default();
        let target = Vec3::new(0.0, 0.0, -4.0);

        rig.see_target_at(target);
        rig.tick(&mut brain, 0.0, 0.0);
        assert_eq!(brain.state(), PatrollerState::Chase);

        rig.lose_target();
        rig.tick(&mut brain, 2.5, 2.5);
        assert_eq!(brain.state(), PatrollerState::Patrol);

        for step in 1..20u32 {
            rig.report(0.0);
            rig.tick(&mut brain, 2.5 + f64::from(step) * 0.25, 0.25);
            assert_eq!(brain.state(), PatrollerState::Patrol);
        }
        assert_eq!(rig.nav.destination(), Some(target));
    }
}
