//! ScheduledActions: очередь отложенных действий (keyed by due time)
//!
//! Заменяет "корутину с WaitForSeconds": действие кладётся в очередь с due time
//! и исполняется на первом тике, где `now >= due`. Потеря цели НЕ отменяет
//! уже запланированные действия.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy::prelude::*;

use super::reached;

/// Что именно отложено
#[derive(Debug, Clone, PartialEq)]
pub enum DeferredAction {
    /// Spawn снаряда после анимационной задержки
    SpawnProjectile {
        shooter: Entity,
        /// Точка прицеливания, зафиксированная в момент выстрела
        aim_point: Vec3,
        /// Origin в момент выстрела (если у стрелка нет shoot_origin offset)
        fallback_origin: Vec3,
        speed: f32,
        damage: u32,
    },
}

#[derive(Debug, Clone)]
pub struct ScheduledAction {
    pub due: f64,
    /// FIFO среди одинаковых due
    seq: u64,
    pub action: DeferredAction,
}

impl PartialEq for ScheduledAction {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledAction {}

impl PartialOrd for ScheduledAction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledAction {
    // BinaryHeap: max-heap, переворачиваем: раньше due → "больше"
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .total_cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Resource, Debug, Default)]
pub struct ScheduledActions {
    queue: BinaryHeap<ScheduledAction>,
    next_seq: u64,
}

impl ScheduledActions {
    pub fn schedule(&mut self, due: f64, action: DeferredAction) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.queue.push(ScheduledAction { due, seq, action });
    }

    /// Снимает все действия с `due <= now` в порядке due (затем FIFO)
    pub fn drain_due(&mut self, now: f64) -> Vec<DeferredAction> {
        let mut ready = Vec::new();
        while self.queue.peek().is_some_and(|next| reached(now, next.due)) {
            if let Some(next) = self.queue.pop() {
                ready.push(next.action);
            }
        }
        ready
    }

    pub fn next_due(&self) -> Option<f64> {
        self.queue.peek().map(|next| next.due)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
