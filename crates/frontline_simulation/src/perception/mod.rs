//! Perception: поиск ближайшей цели, дистанция, line of sight
//!
//! Perception не зависит от state machine - brains читают готовый
//! `Perception` компонент, обновлённый в начале тика.
//!
//! LOS семантика (optimistic):
//! - луч ничего не задел → видим
//! - задели саму цель или её часть (owner == target) → видим
//! - задели что-то другое → не видим

use bevy::prelude::*;
use crate::combat::Dead;
use crate::components::{Health, Targetable};
use crate::tactical::{HeadlessTactics, LayerMask, TacticalQueries};

/// Сенсор AI актора
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Sensor {
    /// Дальность обнаружения (включительно)
    pub detection_range: f32,
    /// Точка "глаз"/дула в локальных координатах
    pub eye_offset: Vec3,
    /// Слои, блокирующие/подтверждающие LOS
    pub line_of_sight_mask: LayerMask,
    /// Поворачивать актора к цели при обнаружении
    pub face_target: bool,
}

impl Sensor {
    pub fn new(detection_range: f32, eye_offset: Vec3) -> Self {
        Self {
            detection_range,
            eye_offset,
            line_of_sight_mask: LayerMask::LINE_OF_SIGHT,
            face_target: false,
        }
    }

    pub fn facing_target(mut self) -> Self {
        self.face_target = true;
        self
    }

    /// Мировая позиция глаз
    pub fn eye_position(&self, transform: &Transform) -> Vec3 {
        transform.translation + transform.rotation * self.eye_offset
    }
}

/// Зафиксированная цель (слабая ссылка, пересчитывается каждый тик)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct TargetFix {
    pub entity: Entity,
    pub position: Vec3,
    pub distance: f32,
}

impl TargetFix {
    pub fn within(&self, range: f32) -> bool {
        self.distance <= range
    }
}

/// Результат perception на текущий тик
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Perception {
    pub target: Option<TargetFix>,
    pub has_line_of_sight: bool,
}

impl Perception {
    pub fn lost() -> Self {
        Self::default()
    }

    /// Цель, если она в пределах `range`
    pub fn target_within(&self, range: f32) -> Option<&TargetFix> {
        self.target.as_ref().filter(|fix| fix.within(range))
    }

    pub fn distance(&self) -> Option<f32> {
        self.target.map(|fix| fix.distance)
    }
}

/// Ближайший кандидат в пределах `detection_range`
///
/// Строго ближайший; при равенстве побеждает первый встреченный.
/// Если ближайший дальше detection range - цели нет.
pub fn detect_target<I>(self_position: Vec3, candidates: I, detection_range: f32) -> Option<TargetFix>
where
    I: IntoIterator<Item = (Entity, Vec3)>,
{
    let mut closest: Option<TargetFix> = None;

    for (entity, position) in candidates {
        let distance = self_position.distance(position);
        if closest.map_or(true, |c| distance < c.distance) {
            closest = Some(TargetFix {
                entity,
                position,
                distance,
            });
        }
    }

    closest.filter(|fix| fix.distance <= detection_range)
}

/// LOS от глаз до цели (optimistic: нет попадания → видим)
pub fn check_line_of_sight(
    tactics: &dyn TacticalQueries,
    eye: Vec3,
    target: &TargetFix,
    max_distance: f32,
    mask: LayerMask,
) -> bool {
    let direction = target.position - eye;
    match tactics.raycast(eye, direction, max_distance, mask) {
        Some(hit) => hit.entity == target.entity || hit.root == target.entity,
        None => true,
    }
}

/// Горизонтальный поворот к точке (мгновенно)
pub fn face_toward(transform: &mut Transform, point: Vec3) {
    if let Some(rotation) = horizontal_look_rotation(transform.translation, point) {
        transform.rotation = rotation;
    }
}

/// Плавный горизонтальный поворот к точке (slerp, t клампится в [0, 1])
pub fn turn_toward(transform: &mut Transform, point: Vec3, t: f32) {
    if let Some(rotation) = horizontal_look_rotation(transform.translation, point) {
        transform.rotation = transform.rotation.slerp(rotation, t.clamp(0.0, 1.0));
    }
}

/// Rotation, смотрящая на точку в горизонтальной плоскости
pub fn horizontal_look_rotation(from: Vec3, to: Vec3) -> Option<Quat> {
    let flat = Vec3::new(to.x - from.x, 0.0, to.z - from.z);
    if flat.length_squared() <= f32::EPSILON {
        return None;
    }
    Some(Transform::IDENTITY.looking_to(flat, Vec3::Y).rotation)
}

/// Система: обновить Perception всех AI акторов
///
/// Кандидаты - живые Targetable, в порядке Entity (детерминизм tie-break).
pub fn update_perception(
    mut observers: Query<(&mut Transform, &Sensor, &mut Perception), Without<Dead>>,
    targets: Query<(Entity, &Transform, Option<&Health>), (With<Targetable>, Without<Sensor>, Without<Dead>)>,
    tactics: Res<HeadlessTactics>,
) {
    let mut candidates: Vec<(Entity, Vec3)> = targets
        .iter()
        .filter(|(_, _, health)| health.map_or(true, |h| h.is_alive()))
        .map(|(entity, transform, _)| (entity, transform.translation))
        .collect();
    candidates.sort_by_key(|(entity, _)| *entity);

    for (mut transform, sensor, mut perception) in observers.iter_mut() {
        let Some(fix) = detect_target(transform.translation, candidates.iter().copied(), sensor.detection_range) else {
            perception.set_if_neq(Perception::lost());
            continue;
        };

        if sensor.face_target {
            face_toward(&mut transform, fix.position);
        }

        let eye = sensor.eye_position(&transform);
        let has_line_of_sight =
            check_line_of_sight(&*tactics, eye, &fix, sensor.detection_range, sensor.line_of_sight_mask);

        perception.set_if_neq(Perception {
            target: Some(fix),
            has_line_of_sight,
        });
    }
}
