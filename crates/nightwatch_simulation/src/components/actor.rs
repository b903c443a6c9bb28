//! Actor: любое тело в мире, в которое может попасть снаряд

use bevy::prelude::*;

/// Актор (NPC или игрок)
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(Transform)]
pub struct Actor {
    pub name: String,
}

impl Actor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Дочерние коллайдеры актора (руки, оружие, хитбоксы)
///
/// Снаряды стрелка игнорируют его самого и все BodyParts.
#[derive(Component, Debug, Clone, Default)]
pub struct BodyParts(pub Vec<Entity>);
