//! Навесная баллистика миномёта
//!
//! Вершина траектории на `arc_height` над точкой старта:
//! - вертикальная скорость `vy = √(2·g·h)`
//! - время полёта `t = √(2h/g) + √(2(h − Δy)/g)` (подъём + падение с вершины до цели)
//! - горизонтальная скорость = горизонтальное смещение / t

use bevy::prelude::*;
use thiserror::Error;

/// Ниже этого времени полёта решение считается вырожденным
pub const MIN_FLIGHT_TIME: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum BallisticError {
    /// Цель выше вершины дуги: падение с вершины до неё невозможно
    #[error("negative discriminant: target rises {rise:.2}m above start but arc apex is only {arc_height:.2}m")]
    NegativeDiscriminant { rise: f32, arc_height: f32 },
    #[error("degenerate flight time {time:.6}s")]
    DegenerateFlightTime { time: f32 },
    #[error("arc height must be non-negative, got {0}")]
    NegativeArcHeight(f32),
    #[error("gravity must be positive, got {0}")]
    InvalidGravity(f32),
}

/// Решение: стартовая скорость и время до цели
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct BallisticSolution {
    pub start: Vec3,
    pub target: Vec3,
    pub velocity: Vec3,
    pub flight_time: f32,
    /// Модуль ускорения свободного падения (направлено вниз)
    pub gravity: f32,
}

impl BallisticSolution {
    /// Позиция снаряда через `time` секунд после старта
    pub fn position_at(&self, time: f32) -> Vec3 {
        self.start + self.velocity * time + 0.5 * Vec3::NEG_Y * self.gravity * time * time
    }

    /// Точки дуги для превью (resolution + 1 точка, от старта до цели)
    pub fn sample_path(&self, resolution: usize) -> Vec<Vec3> {
        let resolution = resolution.max(1);
        (0..=resolution)
            .map(|i| self.position_at(self.flight_time * i as f32 / resolution as f32))
            .collect()
    }
}

/// Высота дуги: base + per_meter·distance, не выше max
pub fn arc_height_for(distance: f32, base: f32, per_meter: f32, max: f32) -> f32 {
    (base + distance * per_meter).min(max)
}

/// Стартовая скорость навесного выстрела из `start` в `target`
pub fn solve(start: Vec3, target: Vec3, arc_height: f32, gravity: f32) -> Result<BallisticSolution, BallisticError> {
    if gravity.is_nan() || gravity <= 0.0 {
        return Err(BallisticError::InvalidGravity(gravity));
    }
    if arc_height < 0.0 {
        return Err(BallisticError::NegativeArcHeight(arc_height));
    }

    let rise = target.y - start.y;
    let ascent_term = 2.0 * arc_height / gravity;
    let descent_term = 2.0 * (arc_height - rise) / gravity;
    if descent_term < 0.0 {
        return Err(BallisticError::NegativeDiscriminant { rise, arc_height });
    }

    let flight_time = ascent_term.sqrt() + descent_term.sqrt();
    if flight_time <= MIN_FLIGHT_TIME {
        return Err(BallisticError::DegenerateFlightTime { time: flight_time });
    }

    let horizontal = Vec3::new(target.x - start.x, 0.0, target.z - start.z);
    let vertical = (2.0 * gravity * arc_height).sqrt();
    let velocity = horizontal / flight_time + Vec3::Y * vertical;

    Ok(BallisticSolution {
        start,
        target,
        velocity,
        flight_time,
        gravity,
    })
}
