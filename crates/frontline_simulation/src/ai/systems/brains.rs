//! Brain tick systems: по одной на архетип
//!
//! Акторы тикаются в порядке Entity (детерминизм): perception уже
//! обновлена, brain пишет intent в NavAgent/Transform/outbox, затем
//! публикует BrainReadout (set_if_neq - Changed<BrainReadout> только на смене).

use bevy::prelude::*;
use crate::ai::context::{BrainContext, BrainReadout};
use crate::ai::gunner::GunnerBrain;
use crate::ai::mortar::MortarBrain;
use crate::ai::patrol::PatrolBrain;
use crate::combat::{CombatOutbox, Dead};
use crate::components::{Health, NavAgent};
use crate::perception::Perception;
use crate::tactical::HeadlessTactics;
use crate::DeterministicRng;

/// Система: тик patrol soldiers
pub fn tick_patrol_brains(
    mut actors: Query<
        (
            Entity,
            &mut PatrolBrain,
            &mut Transform,
            &mut Health,
            &Perception,
            &mut NavAgent,
            &mut BrainReadout,
        ),
        Without<Dead>,
    >,
    tactics: Res<HeadlessTactics>,
    mut rng: ResMut<DeterministicRng>,
    mut outbox: ResMut<CombatOutbox>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();
    let mut ordered: Vec<_> = actors.iter_mut().collect();
    ordered.sort_by_key(|(entity, ..)| *entity);

    for (entity, mut brain, mut transform, mut health, perception, mut agent, mut readout) in ordered {
        let mut ctx = BrainContext {
            entity,
            delta,
            transform: &mut transform,
            health: &mut health,
            perception,
            tactics: &*tactics,
            rng: &mut rng.rng,
            outbox: &mut outbox,
        };
        brain.tick(&mut ctx, &mut agent);
        readout.set_if_neq(brain.readout());
    }
}

/// Система: тик пулемётчиков
pub fn tick_gunner_brains(
    mut actors: Query<
        (
            Entity,
            &mut GunnerBrain,
            &mut Transform,
            &mut Health,
            &Perception,
            &mut BrainReadout,
        ),
        Without<Dead>,
    >,
    tactics: Res<HeadlessTactics>,
    mut rng: ResMut<DeterministicRng>,
    mut outbox: ResMut<CombatOutbox>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();
    let mut ordered: Vec<_> = actors.iter_mut().collect();
    ordered.sort_by_key(|(entity, ..)| *entity);

    for (entity, mut brain, mut transform, mut health, perception, mut readout) in ordered {
        let mut ctx = BrainContext {
            entity,
            delta,
            transform: &mut transform,
            health: &mut health,
            perception,
            tactics: &*tactics,
            rng: &mut rng.rng,
            outbox: &mut outbox,
        };
        brain.tick(&mut ctx);
        readout.set_if_neq(brain.readout());
    }
}

/// Система: тик миномётов
pub fn tick_mortar_brains(
    mut actors: Query<
        (
            Entity,
            &mut MortarBrain,
            &mut Transform,
            &mut Health,
            &Perception,
            &mut BrainReadout,
        ),
        Without<Dead>,
    >,
    tactics: Res<HeadlessTactics>,
    mut rng: ResMut<DeterministicRng>,
    mut outbox: ResMut<CombatOutbox>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();
    let mut ordered: Vec<_> = actors.iter_mut().collect();
    ordered.sort_by_key(|(entity, ..)| *entity);

    for (entity, mut brain, mut transform, mut health, perception, mut readout) in ordered {
        let mut ctx = BrainContext {
            entity,
            delta,
            transform: &mut transform,
            health: &mut health,
            perception,
            tactics: &*tactics,
            rng: &mut rng.rng,
            outbox: &mut outbox,
        };
        brain.tick(&mut ctx);
        readout.set_if_neq(brain.readout());
    }
}
