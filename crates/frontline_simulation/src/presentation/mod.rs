//! Presentation cues - fire-and-forget сигналы для animation/audio/particles
//!
//! Core только эмитит логические ключи, воспроизведением занимается host.
//! Выбор анимации - таблица поверх `BrainReadout` (состояние + флаги).

use bevy::prelude::*;
use crate::ai::{Archetype, BrainReadout, LogicalState};

/// Ключи звуков
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum SoundKey {
    GunShot,
    ReloadStart,
    GrenadeThrow,
    GrenadeExplosion,
    BloodHit,
    TerrainHit,
}

/// Ключи партиклов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum ParticleKey {
    Gunshot,
    GrenadeExplosion,
    BloodSplatter,
    TerrainHit,
}

impl ParticleKey {
    /// Имя эффекта в asset библиотеке host движка
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticleKey::Gunshot => "Gunshot",
            ParticleKey::GrenadeExplosion => "Grenade Explosion",
            ParticleKey::BloodSplatter => "Blood Splatter",
            ParticleKey::TerrainHit => "Terrain Hit",
        }
    }
}

/// Логический ключ анимации (клип выбирает host)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
#[reflect(Component)]
pub enum AnimationKey {
    #[default]
    Idle,
    Alert,
    Run,
    Shoot,
    Reload,
    ThrowGrenade,
    CrouchIdle,
    Death,
}

impl AnimationKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimationKey::Idle => "Idle",
            AnimationKey::Alert => "Alert",
            AnimationKey::Run => "Run",
            AnimationKey::Shoot => "Shoot",
            AnimationKey::Reload => "Reload",
            AnimationKey::ThrowGrenade => "ThrowGrenade",
            AnimationKey::CrouchIdle => "CrouchIdle",
            AnimationKey::Death => "Death",
        }
    }
}

/// Сигнал presentation layer
#[derive(Event, Debug, Clone, PartialEq)]
pub enum PresentationCue {
    PlayAnimation {
        entity: Entity,
        key: AnimationKey,
    },
    PlaySound {
        source: Entity,
        sound: SoundKey,
        /// None - 2D звук (без позиции)
        position: Option<Vec3>,
    },
    PlayParticle {
        particle: ParticleKey,
        position: Vec3,
        rotation: Quat,
    },
}

impl PresentationCue {
    pub fn sound(source: Entity, sound: SoundKey) -> Self {
        PresentationCue::PlaySound {
            source,
            sound,
            position: None,
        }
    }

    pub fn sound_at(source: Entity, sound: SoundKey, position: Vec3) -> Self {
        PresentationCue::PlaySound {
            source,
            sound,
            position: Some(position),
        }
    }

    pub fn particle(particle: ParticleKey, position: Vec3) -> Self {
        PresentationCue::PlayParticle {
            particle,
            position,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Выбор анимации по состоянию brain
pub fn select_animation(readout: &BrainReadout) -> AnimationKey {
    if readout.is_dead {
        return AnimationKey::Death;
    }

    match readout.archetype {
        Archetype::Patrol => match readout.state {
            LogicalState::Idle if readout.is_idle_alert => AnimationKey::Alert,
            LogicalState::Idle => AnimationKey::Idle,
            LogicalState::Alert => AnimationKey::Alert,
            LogicalState::Follow => AnimationKey::Run,
            LogicalState::Shoot if readout.is_reloading => AnimationKey::Reload,
            LogicalState::Shoot if !readout.has_line_of_sight => AnimationKey::Idle,
            LogicalState::Shoot => AnimationKey::Shoot,
            LogicalState::GrenadeThrow => AnimationKey::ThrowGrenade,
            LogicalState::Recovery if readout.is_recover_returning => AnimationKey::Idle,
            LogicalState::Recovery => AnimationKey::CrouchIdle,
            LogicalState::Death => AnimationKey::Death,
            _ => AnimationKey::Idle,
        },
        Archetype::MachineGunner => match readout.state {
            LogicalState::Shoot | LogicalState::Suppress => AnimationKey::Shoot,
            LogicalState::OverheatAndReload if readout.is_overheated => AnimationKey::Reload,
            LogicalState::Death => AnimationKey::Death,
            _ => AnimationKey::Idle,
        },
        // У миномёта только idle поза и смерть
        Archetype::Mortar => AnimationKey::Idle,
    }
}

/// Presentation Plugin: PresentationCue + AnimationKey после outbox flush
pub struct PresentationPlugin;

impl Plugin for PresentationPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PresentationCue>().add_systems(
            FixedUpdate,
            update_animation_keys
                .after(crate::combat::flush_combat_outbox)
                .in_set(crate::SimulationSet::Outbox),
        );
    }
}

/// Система: AnimationKey из BrainReadout, PlayAnimation только при смене ключа
pub fn update_animation_keys(
    mut actors: Query<(Entity, &BrainReadout, &mut AnimationKey), Changed<BrainReadout>>,
    mut cues: EventWriter<PresentationCue>,
) {
    let mut changed: Vec<_> = actors.iter_mut().collect();
    changed.sort_by_key(|(entity, _, _)| *entity);

    for (entity, readout, mut key) in changed {
        let next = select_animation(readout);
        if *key != next {
            *key = next;
            cues.write(PresentationCue::PlayAnimation { entity, key: next });
        }
    }
}
