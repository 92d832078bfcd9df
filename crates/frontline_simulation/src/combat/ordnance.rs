//! Ordnance: гранаты и мины в полёте
//!
//! - Граната: падает под гравитацией, ложится на землю, взрывается по фитилю
//! - Мина: взрывается при первом контакте (земля или ENVIRONMENT коллайдер)
//!
//! Взрыв: overlap sphere по victim mask → урон Health всем корневым entity.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use crate::combat::outbox::OrdnanceLaunched;
use crate::combat::DamageDealt;
use crate::components::{Health, NavMeshArea};
use crate::presentation::{ParticleKey, PresentationCue, SoundKey};
use crate::tactical::{HeadlessTactics, LayerMask, TacticalQueries};

/// Радиус проверки контакта мины с окружением
const CONTACT_PROBE_RADIUS: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum OrdnanceKind {
    Grenade,
    MortarShell,
}

/// Параметры взрывчатки
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrdnanceConfig {
    /// Ускорение свободного падения (м/с²)
    pub gravity: f32,
    pub grenade_fuse: f32,
    pub grenade_radius: f32,
    pub grenade_damage: f32,
    pub shell_radius: f32,
    pub shell_damage: f32,
    /// Кого задевает взрыв
    pub victim_mask: LayerMask,
    /// Мина/граната, не взорвавшаяся за это время, удаляется без взрыва
    pub max_flight_time: f32,
}

impl Default for OrdnanceConfig {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            grenade_fuse: 3.0,
            grenade_radius: 4.0,
            grenade_damage: 35.0,
            shell_radius: 20.0,
            shell_damage: 50.0,
            victim_mask: LayerMask::TARGETS,
            max_flight_time: 30.0,
        }
    }
}

impl OrdnanceConfig {
    pub fn blast(&self, kind: OrdnanceKind) -> (f32, f32) {
        match kind {
            OrdnanceKind::Grenade => (self.grenade_radius, self.grenade_damage),
            OrdnanceKind::MortarShell => (self.shell_radius, self.shell_damage),
        }
    }
}

/// Снаряд в полёте (позиция - Transform)
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Ordnance {
    pub kind: OrdnanceKind,
    pub source: Entity,
    pub velocity: Vec3,
    /// Оставшееся время фитиля (только гранаты)
    pub fuse: Option<f32>,
    pub age: f32,
    /// Граната лежит на земле
    pub resting: bool,
}

impl Ordnance {
    pub fn launched(launch: &OrdnanceLaunched, config: &OrdnanceConfig) -> Self {
        Self {
            kind: launch.kind,
            source: launch.source,
            velocity: launch.velocity,
            fuse: match launch.kind {
                OrdnanceKind::Grenade => Some(config.grenade_fuse),
                OrdnanceKind::MortarShell => None,
            },
            age: 0.0,
            resting: false,
        }
    }
}

/// Событие: взрыв
#[derive(Event, Debug, Clone, PartialEq)]
pub struct OrdnanceExploded {
    pub kind: OrdnanceKind,
    pub source: Entity,
    pub position: Vec3,
    pub victims: Vec<Entity>,
}

/// Что случилось со снарядом за шаг
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrdnanceStep {
    Flying,
    Detonate,
    Expired,
}

/// Один шаг полёта (gravity integrator + контакт + фитиль)
pub fn step_ordnance(
    ordnance: &mut Ordnance,
    transform: &mut Transform,
    delta: f32,
    config: &OrdnanceConfig,
    ground_height: f32,
    tactics: &dyn TacticalQueries,
) -> OrdnanceStep {
    ordnance.age += delta;

    if !ordnance.resting {
        ordnance.velocity.y -= config.gravity * delta;
        transform.translation += ordnance.velocity * delta;
    }

    let mut contact = false;
    if transform.translation.y <= ground_height {
        transform.translation.y = ground_height;
        contact = true;
    } else if !tactics
        .overlap_sphere(transform.translation, CONTACT_PROBE_RADIUS, LayerMask::ENVIRONMENT)
        .is_empty()
    {
        contact = true;
    }

    match ordnance.kind {
        OrdnanceKind::MortarShell if contact => return OrdnanceStep::Detonate,
        OrdnanceKind::Grenade => {
            if contact && !ordnance.resting {
                ordnance.resting = true;
                ordnance.velocity = Vec3::ZERO;
            }
            if let Some(fuse) = ordnance.fuse.as_mut() {
                *fuse -= delta;
                if *fuse <= 0.0 {
                    return OrdnanceStep::Detonate;
                }
            }
        }
        OrdnanceKind::MortarShell => {}
    }

    if ordnance.age >= config.max_flight_time {
        return OrdnanceStep::Expired;
    }
    OrdnanceStep::Flying
}

/// Система: полёт и взрывы ordnance
#[allow(clippy::too_many_arguments)]
pub fn update_ordnance(
    mut commands: Commands,
    mut projectiles: Query<(Entity, &mut Ordnance, &mut Transform)>,
    mut healths: Query<&mut Health>,
    tactics: Res<HeadlessTactics>,
    navmesh: Res<NavMeshArea>,
    config: Res<OrdnanceConfig>,
    time: Res<Time>,
    mut damage_events: EventWriter<DamageDealt>,
    mut explosions: EventWriter<OrdnanceExploded>,
    mut cues: EventWriter<PresentationCue>,
) {
    let delta = time.delta_secs();

    let mut flying: Vec<_> = projectiles.iter_mut().collect();
    flying.sort_by_key(|(entity, _, _)| *entity);

    for (entity, mut ordnance, mut transform) in flying {
        match step_ordnance(&mut ordnance, &mut transform, delta, &config, navmesh.ground_height, &*tactics) {
            OrdnanceStep::Flying => {}
            OrdnanceStep::Expired => {
                crate::logger::log_warning(&format!(
                    "{:?} {:?} expired without contact at {:?}",
                    entity, ordnance.kind, transform.translation
                ));
                commands.entity(entity).despawn();
            }
            OrdnanceStep::Detonate => {
                let position = transform.translation;
                let (radius, damage) = config.blast(ordnance.kind);
                let victims = tactics.overlap_sphere(position, radius, config.victim_mask);

                for &victim in &victims {
                    let Ok(mut health) = healths.get_mut(victim) else {
                        continue;
                    };
                    let applied = health.take_damage(damage);
                    if applied > 0.0 {
                        damage_events.write(DamageDealt {
                            attacker: ordnance.source,
                            target: victim,
                            amount: applied,
                            target_died: !health.is_alive(),
                        });
                    }
                }

                crate::logger::log(&format!(
                    "💥 {:?} exploded at {:?}, {} victims",
                    ordnance.kind,
                    position,
                    victims.len()
                ));

                cues.write(PresentationCue::particle(ParticleKey::GrenadeExplosion, position));
                cues.write(PresentationCue::sound_at(entity, SoundKey::GrenadeExplosion, position));
                explosions.write(OrdnanceExploded {
                    kind: ordnance.kind,
                    source: ordnance.source,
                    position,
                    victims,
                });
                commands.entity(entity).despawn();
            }
        }
    }
}
