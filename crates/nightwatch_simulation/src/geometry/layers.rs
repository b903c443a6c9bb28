//! Collision Layers: битовые маски для ray queries
//!
//! - Layer 1 (0b1 = 1): Reserved
//! - Layer 2 (0b10 = 2): Actors (NPC, player)
//! - Layer 3 (0b100 = 4): Environment (стены, препятствия)
//! - Layer 4 (0b1000 = 8): Projectiles
//!
//! Mask `0` в SightConfig = occlusion test выключен.

/// Layer 2: Actors
pub const COLLISION_LAYER_ACTORS: u32 = 0b10;

/// Layer 3: Environment
pub const COLLISION_LAYER_ENVIRONMENT: u32 = 0b100;

/// Layer 4: Projectiles
pub const COLLISION_LAYER_PROJECTILES: u32 = 0b1000;

/// Mask: LOS raycast (что закрывает видимость)
pub const COLLISION_MASK_RAYCAST_LOS: u32 = COLLISION_LAYER_ENVIRONMENT;

/// Mask: aim raycast при выстреле (всё кроме снарядов)
pub const COLLISION_MASK_AIM: u32 = COLLISION_LAYER_ACTORS | COLLISION_LAYER_ENVIRONMENT;

/// Mask: с чем сталкиваются снаряды
pub const COLLISION_MASK_PROJECTILES: u32 = COLLISION_LAYER_ACTORS | COLLISION_LAYER_ENVIRONMENT;
