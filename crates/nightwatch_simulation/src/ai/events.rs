//! AI Events: вход от игрока и триггеры для Animation Sink

use bevy::prelude::*;

/// Target request для player-directed агента
///
/// `point` уже спроецирован на проходимую поверхность внешним resolver'ом
/// (click raycast + navmesh sample делает движок, не ядро).
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct MoveRequest {
    pub agent: Entity,
    pub point: Vec3,
}

/// Action trigger: стрелок начал выстрел (ровно один раз на действие)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ShootTriggered {
    pub shooter: Entity,
    /// Горизонтальный нормализованный aim на момент trigger
    pub aim_direction: Vec3,
}
