//! Player marker

use bevy::prelude::*;

/// Цель по умолчанию для всех NPC (TrackedTarget захватывается автоматически)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Player;
