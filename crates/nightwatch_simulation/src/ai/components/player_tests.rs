//! Tests for player-directed movement.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::super::brain::BrainRig;
    use super::super::player::{archetype_defaults, PlayerConfig, PlayerDirectedBrain};
    use crate::navigation::SpeedTier;

    fn request(rig: &mut BrainRig, brain: &mut PlayerDirectedBrain, point: Vec3) {
        let tiers = rig.tiers;
        brain.request_move(point, &mut rig.nav, &tiers);
    }

    #[test]
    fn test_config_clamped_at_construction() {
        let brain = PlayerDirectedBrain::new(PlayerConfig {
            slow_down_radius: 0.1,
            arrive_threshold: 0.01,
        });
        let config = brain.config();
        assert_eq!(config.arrive_threshold, 0.05);
        assert!((config.slow_down_radius - 0.15).abs() < 1e-6);

        // Валидная конфигурация не меняется
        let config = PlayerConfig::default().clamped();
        assert_eq!(config, PlayerConfig::default());
    }

    #[test]
    fn test_request_sets_run_and_destination() {
        let mut rig = BrainRig::new(archetype_defaults(), None);
        let mut brain = PlayerDirectedBrain::default();
        rig.nav.stop();

        let point = Vec3::new(10.0, 0.0, 0.0);
        request(&mut rig, &mut brain, point);

        assert_eq!(brain.target(), Some(point));
        assert_eq!(rig.nav.destination(), Some(point));
        assert_eq!(rig.nav.tier(), SpeedTier::Run);
        assert_eq!(rig.nav.speed(), 5.0);
        assert!(!rig.nav.is_stopped());

        // Путь ещё считается → tick ничего не меняет
        rig.tick(&mut brain, 0.1, 0.1);
        assert_eq!(brain.target(), Some(point));
    }

    #[test]
    fn test_run_walk_stop_by_remaining_distance() {
        let mut rig = BrainRig::new(archetype_defaults(), None);
        let mut brain = PlayerDirectedBrain::default();
        request(&mut rig, &mut brain, Vec3::new(10.0, 0.0, 0.0));

        let expectations = [
            (9.0, Some(SpeedTier::Run)),
            (2.6, Some(SpeedTier::Run)),
            (2.5, Some(SpeedTier::Walk)),
            (1.0, Some(SpeedTier::Walk)),
            (0.36, Some(SpeedTier::Walk)),
            (0.35, None),
        ];

        let mut now = 0.0;
        for (remaining, tier) in expectations {
            rig.report(remaining);
            now += 0.1;
            rig.tick(&mut brain, now, 0.1);

            match tier {
                Some(tier) => {
                    assert_eq!(rig.nav.tier(), tier, "remaining = {remaining}");
                    assert!(brain.target().is_some());
                    assert!(!rig.nav.is_stopped());
                }
                None => {
                    assert_eq!(brain.target(), None);
                    assert_eq!(rig.nav.destination(), None);
                    assert!(rig.nav.is_stopped());
                }
            }
        }
    }

    #[test]
    fn test_new_request_after_arrival() {
        let mut rig = BrainRig::new(archetype_defaults(), None);
        let mut brain = PlayerDirectedBrain::default();
        request(&mut rig, &mut brain, Vec3::X);
        rig.report(0.1);
        rig.tick(&mut brain, 0.1, 0.1);
        assert!(rig.nav.is_stopped());

        request(&mut rig, &mut brain, Vec3::Z * 20.0);
        assert!(!rig.nav.is_stopped());
        assert_eq!(rig.nav.tier(), SpeedTier::Run);
        assert_eq!(rig.nav.destination(), Some(Vec3::Z * 20.0));
    }
}
