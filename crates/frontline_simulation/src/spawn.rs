//! Spawn helpers: полный набор компонентов для каждого архетипа
//!
//! Каждый враг получает:
//! - Transform + Collider (слой ENEMIES)
//! - Health, EnemyUnit (→ EnemyRoster)
//! - Sensor (радиус = радиус обнаружения архетипа, глаза = дуло) + Perception
//! - Brain + BrainReadout + AnimationKey

use bevy::prelude::*;
use crate::ai::{Archetype, BrainReadout, GunnerBrain, GunnerConfig, LogicalState, MortarBrain, MortarConfig, PatrolBrain, PatrolConfig};
use crate::combat::EncounterGroup;
use crate::components::{Collider, EnemyUnit, Health, NavAgent, Targetable};
use crate::perception::{Perception, Sensor};
use crate::presentation::AnimationKey;
use crate::tactical::LayerMask;

pub const ENEMY_HEALTH: f32 = 100.0;
pub const TARGET_HEALTH: f32 = 100.0;
/// Половинные размеры тела (коллайдер для LOS, пуль и взрывов), стоит на земле
pub const BODY_HALF_EXTENTS: Vec3 = Vec3::new(0.4, 0.9, 0.4);

fn body(layer: LayerMask) -> Collider {
    Collider::cuboid(BODY_HALF_EXTENTS, layer).with_offset(Vec3::new(0.0, BODY_HALF_EXTENTS.y, 0.0))
}

fn enemy_core(transform: Transform, archetype: Archetype) -> impl Bundle {
    (
        transform,
        body(LayerMask::ENEMIES),
        Health::new(ENEMY_HEALTH),
        EnemyUnit,
        Perception::default(),
        BrainReadout::new(archetype, LogicalState::Idle),
        AnimationKey::default(),
    )
}

fn facing(position: Vec3, yaw_degrees: f32) -> Transform {
    Transform::from_translation(position).with_rotation(Quat::from_rotation_y(yaw_degrees.to_radians()))
}

/// Spawn patrol soldier. Anchor патруля = точка спавна.
pub fn spawn_patrol_enemy(commands: &mut Commands, position: Vec3, config: PatrolConfig) -> Entity {
    // LOS считается лицом к цели, не по курсу NavAgent
    let sensor = Sensor::new(config.detection_range, config.fire_point()).facing_target();
    let agent = NavAgent::new(config.move_speed);
    commands
        .spawn((
            enemy_core(Transform::from_translation(position), Archetype::Patrol),
            sensor,
            agent,
            PatrolBrain::new(config, position),
        ))
        .id()
}

/// Spawn стационарного пулемётчика (смотрит по `yaw`, градусы)
pub fn spawn_machine_gunner(commands: &mut Commands, position: Vec3, yaw: f32, config: GunnerConfig) -> Entity {
    let sensor = Sensor::new(config.alert_range, config.fire_point());
    commands
        .spawn((
            enemy_core(facing(position, yaw), Archetype::MachineGunner),
            sensor,
            GunnerBrain::new(config),
        ))
        .id()
}

/// Spawn миномёта. Yaw спавна станет центром idle сканирования.
pub fn spawn_mortar(commands: &mut Commands, position: Vec3, yaw: f32, config: MortarConfig) -> Entity {
    let sensor = Sensor::new(config.alert_radius, config.fire_point());
    commands
        .spawn((
            enemy_core(facing(position, yaw), Archetype::Mortar),
            sensor,
            MortarBrain::new(config),
        ))
        .id()
}

/// Добавить врага в encounter группу (зачистка группы → EncounterGroupCleared)
pub fn assign_encounter_group(commands: &mut Commands, enemy: Entity, group: EncounterGroup) {
    commands.entity(enemy).insert(group);
}

/// Spawn цели (игрок / союзник), которую ищут сенсоры
pub fn spawn_target(commands: &mut Commands, position: Vec3) -> Entity {
    commands
        .spawn((
            Transform::from_translation(position),
            body(LayerMask::TARGETS),
            Health::new(TARGET_HEALTH),
            Targetable,
        ))
        .id()
}

/// Spawn препятствия (блокирует LOS и ловит снаряды)
pub fn spawn_obstacle(commands: &mut Commands, center: Vec3, half_extents: Vec3) -> Entity {
    commands
        .spawn((
            Transform::from_translation(center),
            Collider::cuboid(half_extents, LayerMask::ENVIRONMENT),
        ))
        .id()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patrol_sensor_faces_target() {
        let mut world = World::new();
        let patrol = {
            let mut commands = world.commands();
            spawn_patrol_enemy(&mut commands, Vec3::new(0.0, 0.0, -10.0), PatrolConfig::default())
        };
        world.flush();

        let sensor = world.get::<Sensor>(patrol).expect("patrol sensor");
        assert!(sensor.face_target);
        assert_eq!(sensor.detection_range, PatrolConfig::default().detection_range);
    }

    #[test]
    fn test_body_collider_stands_on_ground() {
        let collider = body(LayerMask::TARGETS);
        match collider.volume_at(Vec3::ZERO) {
            crate::components::ColliderVolume::Aabb(aabb) => {
                assert_eq!(aabb.min.y, 0.0);
                assert!((aabb.max.y - 2.0 * BODY_HALF_EXTENTS.y).abs() < 1e-5);
            }
            other => panic!("expected box body, got {:?}", other),
        }
    }
}
