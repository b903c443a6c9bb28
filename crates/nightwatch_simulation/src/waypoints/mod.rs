//! Target Selection Policy: выбор следующего waypoint
//!
//! Waypoint set неизменяем в течение сессии, handle = индекс.
//! Невалидные записи (None) пропускаются всеми политиками.
//! Пустой / полностью невалидный набор → выбор no-op, агент держит старый destination.

use bevy::prelude::*;
use rand::Rng;


#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct Waypoints {
    points: Vec<Option<Vec3>>,
}

impl Waypoints {
    pub fn new(points: Vec<Option<Vec3>>) -> Self {
        Self { points }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        Self {
            points: points.into_iter().map(Some).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, handle: usize) -> Option<Vec3> {
        self.points.get(handle).copied().flatten()
    }

    pub fn valid_handles(&self) -> impl Iterator<Item = usize> + '_ {
        self.points
            .iter()
            .enumerate()
            .filter_map(|(handle, point)| point.map(|_| handle))
    }

    pub fn valid_count(&self) -> usize {
        self.valid_handles().count()
    }

    pub fn has_valid(&self) -> bool {
        self.valid_handles().next().is_some()
    }
}

/// Случайный waypoint кроме `exclude_a` и `exclude_b`
///
/// Ослабление при пустом наборе кандидатов:
/// 1. исключаем оба
/// 2. исключаем только `exclude_a`
/// 3. без исключений
///
/// None только если валидных waypoint нет вообще.
pub fn select_next<R: Rng + ?Sized>(
    waypoints: &Waypoints,
    exclude_a: Option<usize>,
    exclude_b: Option<usize>,
    rng: &mut R,
) -> Option<usize> {
    let passes = [(exclude_a, exclude_b), (exclude_a, None), (None, None)];

    for (a, b) in passes {
        let candidates: Vec<usize> = waypoints
            .valid_handles()
            .filter(|&handle| Some(handle) != a && Some(handle) != b)
            .collect();
        if !candidates.is_empty() {
            return Some(candidates[rng.gen_range(0..candidates.len())]);
        }
    }
    None
}

/// Следующий валидный индекс по кругу (wrap-around)
pub fn next_cyclic(waypoints: &Waypoints, current: usize) -> Option<usize> {
    let len = waypoints.len();
    (1..=len)
        .map(|offset| (current + offset) % len)
        .find(|&handle| waypoints.get(handle).is_some())
}

/// Ближайший валидный waypoint (прямая дистанция)
pub fn nearest(waypoints: &Waypoints, position: Vec3) -> Option<usize> {
    waypoints
        .valid_handles()
        .filter_map(|handle| waypoints.get(handle).map(|point| (handle, point.distance_squared(position))))
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(handle, _)| handle)
}

/// Случайный индекс; совпал с `current` и есть альтернатива → следующий валидный
pub fn pick_random_other<R: Rng + ?Sized>(waypoints: &Waypoints, current: Option<usize>, rng: &mut R) -> Option<usize> {
    let valid: Vec<usize> = waypoints.valid_handles().collect();
    let &picked = valid.get(rng.gen_range(0..valid.len().max(1)))?;

    if valid.len() > 1 && Some(picked) == current {
        return next_cyclic(waypoints, picked);
    }
    Some(picked)
}
