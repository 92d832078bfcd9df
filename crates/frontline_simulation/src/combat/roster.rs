//! EnemyRoster - учёт живых врагов и зачистки групп
//!
//! Каждый `EnemyUnit` регистрируется при спавне, снимается при смерти.
//! Счётчик вернулся в 0 → `AllEnemiesDefeated`. Группа (`EncounterGroup`)
//! опустела → `EncounterGroupCleared` (открыть проход, триггер и т.п.).

use std::collections::BTreeMap;
use bevy::prelude::*;
use crate::combat::EntityDied;
use crate::components::EnemyUnit;

/// Группа врагов, зачистка которой - отдельное событие
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
#[reflect(Component)]
pub struct EncounterGroup(pub u32);

/// Событие: все зарегистрированные враги мертвы
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllEnemiesDefeated;

/// Событие: все враги группы мертвы
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncounterGroupCleared {
    pub group: EncounterGroup,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct EnemyRoster {
    alive: u32,
    registered_total: u32,
    groups: BTreeMap<EncounterGroup, u32>,
    members: BTreeMap<Entity, Option<EncounterGroup>>,
}

/// Результат снятия врага с учёта
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RosterChange {
    pub all_defeated: bool,
    pub cleared_group: Option<EncounterGroup>,
}

impl EnemyRoster {
    pub fn alive(&self) -> u32 {
        self.alive
    }

    pub fn registered_total(&self) -> u32 {
        self.registered_total
    }

    pub fn group_alive(&self, group: EncounterGroup) -> u32 {
        self.groups.get(&group).copied().unwrap_or(0)
    }

    pub fn register(&mut self, entity: Entity, group: Option<EncounterGroup>) {
        if self.members.contains_key(&entity) {
            return;
        }
        self.members.insert(entity, group);
        self.alive += 1;
        self.registered_total += 1;
        if let Some(group) = group {
            *self.groups.entry(group).or_insert(0) += 1;
        }
    }

    /// Снять с учёта. Незарегистрированные - no-op.
    pub fn unregister(&mut self, entity: Entity) -> RosterChange {
        let Some(group) = self.members.remove(&entity) else {
            return RosterChange::default();
        };

        self.alive = self.alive.saturating_sub(1);
        let mut change = RosterChange {
            all_defeated: self.alive == 0 && self.registered_total > 0,
            cleared_group: None,
        };

        if let Some(group) = group {
            if let Some(count) = self.groups.get_mut(&group) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    change.cleared_group = Some(group);
                }
            }
        }

        change
    }
}

/// Система: регистрация новых врагов
pub fn register_enemies(
    mut roster: ResMut<EnemyRoster>,
    spawned: Query<(Entity, Option<&EncounterGroup>), Added<EnemyUnit>>,
) {
    let mut fresh: Vec<_> = spawned.iter().collect();
    fresh.sort_by_key(|(entity, _)| *entity);

    for (entity, group) in fresh {
        roster.register(entity, group.copied());
    }
}

/// Система: снятие погибших врагов с учёта
pub fn track_enemy_deaths(
    mut roster: ResMut<EnemyRoster>,
    mut deaths: EventReader<EntityDied>,
    mut defeated: EventWriter<AllEnemiesDefeated>,
    mut cleared: EventWriter<EncounterGroupCleared>,
) {
    for death in deaths.read() {
        if !death.was_enemy {
            continue;
        }

        let change = roster.unregister(death.entity);
        if let Some(group) = change.cleared_group {
            crate::logger::log_info(&format!("Encounter group {} cleared", group.0));
            cleared.write(EncounterGroupCleared { group });
        }
        if change.all_defeated {
            crate::logger::log_info("🏁 All enemies defeated");
            defeated.write(AllEnemiesDefeated);
        }
    }
}
