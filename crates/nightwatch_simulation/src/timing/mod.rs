//! Action Timing Arbiter: "unlock at" таймеры для дискретных действий
//!
//! Один примитив на всё: re-target cooldown, dwell на waypoint, shot cooldown,
//! freeze window после выстрела. Время: всегда SimClock::now().
//!
//! Контракт:
//! - `check()` / `is_unlocked()`: read-only, идемпотентны
//! - `clear()`: отдельное явное действие владельца таймера (ровно один раз)

use serde::{Deserialize, Serialize};

pub mod scheduled;

pub use scheduled::{DeferredAction, ScheduledAction, ScheduledActions};


/// Sentinel для неактивного таймера
const INACTIVE: f64 = -1.0;

/// Допуск сравнения с SimClock (сек): шаг 1/60 не представим точно,
/// `n · delta` может недобрать до `duration` на доли наносекунды
pub const TIME_EPSILON: f64 = 1e-6;

/// `now` достиг `at` (с допуском TIME_EPSILON)
pub fn reached(now: f64, at: f64) -> bool {
    now + TIME_EPSILON >= at
}

/// Результат проверки таймера
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LockStatus {
    /// Таймер не взведён
    Inactive,
    /// До разблокировки осталось `remaining` секунд
    Locked { remaining: f32 },
    /// Порог пройден, действие ещё не "съедено" владельцем
    Unlocked,
}

/// "Unlock at" timestamp (или inactive)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deadline {
    unlock_at: f64,
}

impl Default for Deadline {
    fn default() -> Self {
        Self::inactive()
    }
}

impl Deadline {
    pub const fn inactive() -> Self {
        Self { unlock_at: INACTIVE }
    }

    pub fn at(unlock_at: f64) -> Self {
        Self {
            unlock_at: unlock_at.max(0.0),
        }
    }

    /// Взвести таймер на абсолютное время
    pub fn lock_until(&mut self, unlock_at: f64) {
        *self = Self::at(unlock_at);
    }

    /// Взвести таймер на `duration` от `now`
    pub fn lock_for(&mut self, now: f64, duration: f32) {
        self.lock_until(now + f64::from(duration.max(0.0)));
    }

    pub fn is_active(&self) -> bool {
        self.unlock_at >= 0.0
    }

    pub fn check(&self, now: f64) -> LockStatus {
        if !self.is_active() {
            LockStatus::Inactive
        } else if !reached(now, self.unlock_at) {
            LockStatus::Locked {
                remaining: (self.unlock_at - now) as f32,
            }
        } else {
            LockStatus::Unlocked
        }
    }

    /// Inactive тоже считается "не заблокирован"
    pub fn is_unlocked(&self, now: f64) -> bool {
        !self.is_locked(now)
    }

    pub fn is_locked(&self, now: f64) -> bool {
        matches!(self.check(now), LockStatus::Locked { .. })
    }

    /// Таймер взведён и порог пройден (dwell истёк, freeze закончился)
    pub fn has_expired(&self, now: f64) -> bool {
        matches!(self.check(now), LockStatus::Unlocked)
    }

    pub fn clear(&mut self) {
        *self = Self::inactive();
    }
}

/// Cooldown = длительность + Deadline
///
/// `ready()` до первого `trigger()` → true (таймер inactive).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cooldown {
    pub duration: f32,
    deadline: Deadline,
}

impl Cooldown {
    pub fn new(duration: f32) -> Self {
        Self {
            duration: duration.max(0.0),
            deadline: Deadline::inactive(),
        }
    }

    pub fn ready(&self, now: f64) -> bool {
        self.deadline.is_unlocked(now)
    }

    pub fn trigger(&mut self, now: f64) {
        self.deadline.lock_for(now, self.duration);
    }

    pub fn remaining(&self, now: f64) -> f32 {
        match self.deadline.check(now) {
            LockStatus::Locked { remaining } => remaining,
            LockStatus::Inactive | LockStatus::Unlocked => 0.0,
        }
    }
}
