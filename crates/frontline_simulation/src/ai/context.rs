//! Общий контекст тика для всех brains + read-only readout для presentation

use bevy::prelude::*;
use rand_chacha::ChaCha8Rng;
use crate::combat::CombatOutbox;
use crate::components::Health;
use crate::perception::Perception;
use crate::tactical::TacticalQueries;

/// Архетип AI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum Archetype {
    #[default]
    Patrol,
    MachineGunner,
    Mortar,
}

/// Логическое состояние (общий словарь для всех архетипов)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum LogicalState {
    #[default]
    Idle,
    Alert,
    Follow,
    Shoot,
    Suppress,
    GrenadeThrow,
    Recovery,
    OverheatAndReload,
    Firing,
    Death,
}

/// Read-only снимок brain для presentation layer (опрашивается каждый тик)
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Reflect)]
#[reflect(Component)]
pub struct BrainReadout {
    pub archetype: Archetype,
    pub state: LogicalState,
    pub is_reloading: bool,
    pub has_line_of_sight: bool,
    pub is_idle_alert: bool,
    pub is_recover_returning: bool,
    pub is_overheated: bool,
    pub is_dead: bool,
}

impl BrainReadout {
    pub fn new(archetype: Archetype, state: LogicalState) -> Self {
        Self {
            archetype,
            state,
            ..Default::default()
        }
    }
}

/// Всё что brain может трогать за один тик
///
/// Brain владеет только своими полями; мир он видит через perception
/// (цель уже провалидирована) и tactical queries, наружу пишет в outbox.
pub struct BrainContext<'a> {
    pub entity: Entity,
    pub delta: f32,
    pub transform: &'a mut Transform,
    pub health: &'a mut Health,
    pub perception: &'a Perception,
    pub tactics: &'a dyn TacticalQueries,
    pub rng: &'a mut ChaCha8Rng,
    pub outbox: &'a mut CombatOutbox,
}

impl BrainContext<'_> {
    pub fn position(&self) -> Vec3 {
        self.transform.translation
    }

    /// Мировая позиция точки, заданной в локальных координатах актора
    pub fn local_point(&self, offset: Vec3) -> Vec3 {
        self.transform.translation + self.transform.rotation * offset
    }
}
