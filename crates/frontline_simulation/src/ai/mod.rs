//! AI decision-making module
//!
//! По одной state machine на архетип (patrol soldier, machine-gunner, mortar).
//! Brain = Component с явным Enter/Update/Exit, тикается в FixedUpdate
//! после perception, пишет intent в NavAgent/Transform и CombatOutbox.

use bevy::prelude::*;

pub mod context;
pub mod gunner;
pub mod mortar;
pub mod patrol;
pub mod resources;
pub mod systems;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export основных типов
pub use context::{Archetype, BrainContext, BrainReadout, LogicalState};
pub use gunner::{GunnerBrain, GunnerConfig, GunnerState};
pub use mortar::{BallisticError, BallisticSolution, MortarBrain, MortarConfig, MortarState, TrajectoryPreview};
pub use patrol::{PatrolBrain, PatrolConfig, PatrolState};
pub use resources::{GrenadePouch, HeatGauge, Magazine, TimedAction};
pub use systems::{tick_gunner_brains, tick_mortar_brains, tick_patrol_brains};

use crate::SimulationSet;

/// AI Plugin
///
/// Регистрирует AI системы в FixedUpdate для детерминизма.
/// Порядок выполнения:
/// 1. update_perception - цель, дистанция, LOS (SimulationSet::Perception)
/// 2. tick_patrol_brains → tick_gunner_brains → tick_mortar_brains (SimulationSet::Brains)
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            crate::perception::update_perception.in_set(SimulationSet::Perception),
        )
        .add_systems(
            FixedUpdate,
            (tick_patrol_brains, tick_gunner_brains, tick_mortar_brains)
                .chain() // Последовательное выполнение для детерминизма
                .in_set(SimulationSet::Brains),
        );
    }
}
