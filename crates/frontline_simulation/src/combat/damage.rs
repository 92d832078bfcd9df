//! Death handling: Dead маркер, EntityDied, отложенный деспавн
//!
//! Урон наносится через `Health::take_damage` (взрывы, host попадания).
//! Смерть фиксируется один раз: первый тик, когда entity мертва,
//! вешаем `Dead`, шлём `EntityDied`, врагам - `DespawnAfter`.

use bevy::prelude::*;
use crate::ai::BrainReadout;
use crate::components::{EnemyUnit, Health};

/// Grace период до деспавна мёртвого врага (анимация + эффекты)
pub const ENEMY_DESPAWN_DELAY: f32 = 3.2;

/// Событие: урон нанесен
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DamageDealt {
    pub attacker: Entity,
    pub target: Entity,
    pub amount: f32,
    pub target_died: bool,
}

/// Событие: entity умер (health <= 0)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDied {
    pub entity: Entity,
    pub was_enemy: bool,
}

/// Компонент-маркер: entity мертв
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Dead;

/// Деспавн по таймауту (абсолютное время симуляции)
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct DespawnAfter {
    pub despawn_time: f32,
}

impl DespawnAfter {
    pub fn from_now(now: f32, delay: f32) -> Self {
        Self {
            despawn_time: now + delay,
        }
    }
}

/// Система: фиксация смерти
///
/// AI актор считается мёртвым когда его brain вошёл в Death
/// (readout.is_dead), остальные - по Health.
pub fn mark_dead_entities(
    mut commands: Commands,
    candidates: Query<(Entity, &Health, Option<&BrainReadout>, Has<EnemyUnit>), Without<Dead>>,
    mut died_events: EventWriter<EntityDied>,
    time: Res<Time>,
) {
    let mut dying: Vec<_> = candidates
        .iter()
        .filter(|(_, health, readout, _)| match readout {
            Some(readout) => readout.is_dead,
            None => !health.is_alive(),
        })
        .map(|(entity, _, _, is_enemy)| (entity, is_enemy))
        .collect();
    dying.sort_by_key(|(entity, _)| *entity);

    for (entity, is_enemy) in dying {
        let mut entity_commands = commands.entity(entity);
        entity_commands.insert(Dead);
        if is_enemy {
            entity_commands.insert(DespawnAfter::from_now(time.elapsed_secs(), ENEMY_DESPAWN_DELAY));
        }

        crate::logger::log_info(&format!("☠️ {:?} died (enemy: {})", entity, is_enemy));
        died_events.write(EntityDied {
            entity,
            was_enemy: is_enemy,
        });
    }
}

/// Система: деспавн entities с истёкшим DespawnAfter
pub fn despawn_after_timeout(
    mut commands: Commands,
    query: Query<(Entity, &DespawnAfter)>,
    time: Res<Time>,
) {
    let current_time = time.elapsed_secs();

    for (entity, despawn_after) in query.iter() {
        if current_time >= despawn_after.despawn_time {
            crate::logger::log(&format!("⚰️ Despawning entity {:?} (timeout)", entity));
            commands.entity(entity).despawn();
        }
    }
}
