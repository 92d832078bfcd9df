//! CombatOutbox - буфер выходных действий brains за тик
//!
//! Brains не пишут в EventWriter напрямую: им нужен только `&mut CombatOutbox`
//! (тестируются без App). Система flush превращает буфер в события
//! и спавнит ordnance entities.

use bevy::prelude::*;
use crate::combat::ordnance::{Ordnance, OrdnanceConfig, OrdnanceKind};
use crate::presentation::PresentationCue;

/// Событие: выстрел пулей (hit-scan/projectile решает host)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ShotFired {
    pub shooter: Entity,
    pub origin: Vec3,
    /// Нормализованное направление
    pub direction: Vec3,
    pub suppressive: bool,
}

/// Событие: запущена граната или мина
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct OrdnanceLaunched {
    pub source: Entity,
    pub kind: OrdnanceKind,
    pub origin: Vec3,
    pub velocity: Vec3,
}

/// Буфер действий brains за текущий тик
#[derive(Resource, Debug, Default)]
pub struct CombatOutbox {
    pub cues: Vec<PresentationCue>,
    pub shots: Vec<ShotFired>,
    pub ordnance: Vec<OrdnanceLaunched>,
}

impl CombatOutbox {
    pub fn cue(&mut self, cue: PresentationCue) {
        self.cues.push(cue);
    }

    pub fn shot(&mut self, shot: ShotFired) {
        self.shots.push(shot);
    }

    pub fn launch(&mut self, launch: OrdnanceLaunched) {
        self.ordnance.push(launch);
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty() && self.shots.is_empty() && self.ordnance.is_empty()
    }

    pub fn clear(&mut self) {
        self.cues.clear();
        self.shots.clear();
        self.ordnance.clear();
    }
}

/// Система: outbox → события + ordnance entities
pub fn flush_combat_outbox(
    mut commands: Commands,
    mut outbox: ResMut<CombatOutbox>,
    config: Res<OrdnanceConfig>,
    mut cues: EventWriter<PresentationCue>,
    mut shots: EventWriter<ShotFired>,
    mut launches: EventWriter<OrdnanceLaunched>,
) {
    if outbox.is_empty() {
        return;
    }

    for cue in outbox.cues.drain(..) {
        cues.write(cue);
    }

    for shot in outbox.shots.drain(..) {
        shots.write(shot);
    }

    for launch in outbox.ordnance.drain(..) {
        commands.spawn((
            Ordnance::launched(&launch, &config),
            Transform::from_translation(launch.origin),
        ));
        crate::logger::log(&format!(
            "💣 {:?} launched {:?} from {:?} (v = {:?})",
            launch.source, launch.kind, launch.origin, launch.velocity
        ));
        launches.write(launch);
    }
}
