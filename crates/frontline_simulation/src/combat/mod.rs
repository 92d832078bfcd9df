//! Combat system module
//!
//! ECS ответственность:
//! - CombatOutbox → события (ShotFired, OrdnanceLaunched, PresentationCue)
//! - Пули: hit-scan ShotFired, урон по Health
//! - Ordnance: полёт гранат/снарядов, взрывы, урон по Health
//! - Death handling: Dead маркер, EntityDied, отложенный деспавн
//! - EnemyRoster: учёт живых врагов

use bevy::prelude::*;

pub mod bullets;
pub mod damage;
pub mod ordnance;
pub mod outbox;
pub mod roster;

// Re-export основных типов
pub use bullets::{resolve_shots, trace_shot, BulletConfig, ShotOutcome};
pub use damage::{
    despawn_after_timeout, mark_dead_entities, DamageDealt, Dead, DespawnAfter, EntityDied, ENEMY_DESPAWN_DELAY,
};
pub use ordnance::{update_ordnance, Ordnance, OrdnanceConfig, OrdnanceExploded, OrdnanceKind};
pub use outbox::{flush_combat_outbox, CombatOutbox, OrdnanceLaunched, ShotFired};
pub use roster::{
    register_enemies, track_enemy_deaths, AllEnemiesDefeated, EncounterGroup, EncounterGroupCleared, EnemyRoster,
};

use crate::SimulationSet;

/// Combat Plugin
///
/// Порядок выполнения (FixedUpdate, 60Hz):
/// 1. flush_combat_outbox - intents brains → события + ordnance entities
/// 2. register_enemies → mark_dead_entities → track_enemy_deaths
/// 3. resolve_shots → update_ordnance - попадания пуль, полёт, взрывы, DamageDealt
/// 4. despawn_after_timeout - grace период мёртвых
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<DamageDealt>()
            .add_event::<EntityDied>()
            .add_event::<ShotFired>()
            .add_event::<OrdnanceLaunched>()
            .add_event::<OrdnanceExploded>()
            .add_event::<AllEnemiesDefeated>()
            .add_event::<EncounterGroupCleared>()
            .init_resource::<CombatOutbox>()
            .init_resource::<OrdnanceConfig>()
            .init_resource::<BulletConfig>()
            .init_resource::<EnemyRoster>();

        app.add_systems(FixedUpdate, flush_combat_outbox.in_set(SimulationSet::Outbox))
            .add_systems(
                FixedUpdate,
                (
                    // Фаза 1: Death handling
                    register_enemies,
                    mark_dead_entities,
                    track_enemy_deaths,
                    // Фаза 2: урон (попадёт в mark_dead_entities следующего тика)
                    resolve_shots,
                    update_ordnance,
                )
                    .chain() // Последовательное выполнение
                    .in_set(SimulationSet::Combat),
            )
            .add_systems(FixedUpdate, despawn_after_timeout.in_set(SimulationSet::Cleanup));
    }
}
