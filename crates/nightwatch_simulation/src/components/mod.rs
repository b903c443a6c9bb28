//! ECS Components общие для всех агентов
//!
//! - actor: Actor (живое тело в мире), BodyParts (коллайдеры для ignore list)
//! - player: Player marker (цель по умолчанию для perception)

pub mod actor;
pub mod player;

pub use actor::*;
pub use player::*;
