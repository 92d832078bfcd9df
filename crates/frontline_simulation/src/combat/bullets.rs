//! Пули: hit-scan по ShotFired
//!
//! Луч от дула по направлению выстрела (victim mask + ENVIRONMENT):
//! - задели жертву → урон Health, кровь + звук попадания
//! - задели окружение → след попадания, развёрнутый к стрелку
//! - ничего не задели → пуля ушла в никуда

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use crate::combat::outbox::ShotFired;
use crate::combat::DamageDealt;
use crate::components::Health;
use crate::perception::horizontal_look_rotation;
use crate::presentation::{ParticleKey, PresentationCue, SoundKey};
use crate::tactical::{HeadlessTactics, LayerMask, RayHit, TacticalQueries};

/// Параметры пуль (общие для patrol soldier и пулемётчика)
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletConfig {
    pub damage: f32,
    /// Дальность hit-scan луча
    pub range: f32,
    /// Кому пуля наносит урон
    pub victim_mask: LayerMask,
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            damage: 4.0,
            range: 100.0,
            victim_mask: LayerMask::TARGETS,
        }
    }
}

/// Куда попала пуля
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShotOutcome {
    Victim(RayHit),
    Terrain(RayHit),
    Miss,
}

pub fn trace_shot(shot: &ShotFired, config: &BulletConfig, tactics: &dyn TacticalQueries) -> ShotOutcome {
    let mask = config.victim_mask | LayerMask::ENVIRONMENT;
    match tactics.raycast(shot.origin, shot.direction, config.range, mask) {
        Some(hit) if hit.layer.intersects(config.victim_mask) => ShotOutcome::Victim(hit),
        Some(hit) => ShotOutcome::Terrain(hit),
        None => ShotOutcome::Miss,
    }
}

/// Система: попадания пуль этого тика
pub fn resolve_shots(
    mut shots: EventReader<ShotFired>,
    mut healths: Query<&mut Health>,
    tactics: Res<HeadlessTactics>,
    config: Res<BulletConfig>,
    mut damage_events: EventWriter<DamageDealt>,
    mut cues: EventWriter<PresentationCue>,
) {
    for shot in shots.read() {
        match trace_shot(shot, &config, &*tactics) {
            ShotOutcome::Victim(hit) => {
                if let Ok(mut health) = healths.get_mut(hit.root) {
                    let applied = health.take_damage(config.damage);
                    if applied > 0.0 {
                        damage_events.write(DamageDealt {
                            attacker: shot.shooter,
                            target: hit.root,
                            amount: applied,
                            target_died: !health.is_alive(),
                        });
                    }
                }
                cues.write(PresentationCue::particle(ParticleKey::BloodSplatter, hit.point));
                cues.write(PresentationCue::sound_at(hit.root, SoundKey::BloodHit, hit.point));
            }
            ShotOutcome::Terrain(hit) => {
                cues.write(PresentationCue::PlayParticle {
                    particle: ParticleKey::TerrainHit,
                    position: hit.point,
                    rotation: horizontal_look_rotation(hit.point, shot.origin).unwrap_or(Quat::IDENTITY),
                });
                cues.write(PresentationCue::sound_at(hit.entity, SoundKey::TerrainHit, hit.point));
            }
            ShotOutcome::Miss => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;
    use crate::components::Collider;

    fn shot_along_x(shooter: Entity) -> ShotFired {
        ShotFired {
            shooter,
            origin: Vec3::new(0.0, 1.0, 0.0),
            direction: Vec3::X,
            suppressive: false,
        }
    }

    #[test]
    fn test_trace_shot_outcomes() {
        let config = BulletConfig::default();
        let target = Entity::from_raw(7);
        let wall = Entity::from_raw(8);
        let mut tactics = HeadlessTactics::default();
        tactics.insert_collider(target, Vec3::new(10.0, 1.0, 0.0), &Collider::sphere(0.5, LayerMask::TARGETS));

        let shot = shot_along_x(Entity::from_raw(1));
        match trace_shot(&shot, &config, &tactics) {
            ShotOutcome::Victim(hit) => assert_eq!(hit.root, target),
            other => panic!("expected victim, got {:?}", other),
        }

        // Стена перед целью забирает пулю
        tactics.insert_collider(
            wall,
            Vec3::new(5.0, 1.0, 0.0),
            &Collider::cuboid(Vec3::new(0.25, 2.0, 2.0), LayerMask::ENVIRONMENT),
        );
        match trace_shot(&shot, &config, &tactics) {
            ShotOutcome::Terrain(hit) => assert_eq!(hit.entity, wall),
            other => panic!("expected terrain hit, got {:?}", other),
        }

        let upward = ShotFired {
            direction: Vec3::Y,
            ..shot
        };
        assert_eq!(trace_shot(&upward, &config, &tactics), ShotOutcome::Miss);
    }

    #[test]
    fn test_enemies_are_not_victims() {
        let config = BulletConfig::default();
        let mut tactics = HeadlessTactics::default();
        tactics.insert_collider(Entity::from_raw(3), Vec3::new(4.0, 1.0, 0.0), &Collider::sphere(0.5, LayerMask::ENEMIES));

        let shot = shot_along_x(Entity::from_raw(1));
        assert_eq!(trace_shot(&shot, &config, &tactics), ShotOutcome::Miss);
    }

    #[test]
    fn test_resolve_shots_damages_victim() {
        let mut app = App::new();
        app.add_event::<ShotFired>()
            .add_event::<DamageDealt>()
            .add_event::<PresentationCue>()
            .init_resource::<BulletConfig>();

        let shooter = app.world_mut().spawn_empty().id();
        let target = app.world_mut().spawn(Health::new(10.0)).id();
        let mut tactics = HeadlessTactics::default();
        tactics.insert_collider(target, Vec3::new(10.0, 1.0, 0.0), &Collider::sphere(0.5, LayerMask::TARGETS));
        app.insert_resource(tactics);

        for _ in 0..3 {
            app.world_mut().send_event(shot_along_x(shooter));
        }
        app.world_mut()
            .run_system_once(resolve_shots)
            .expect("resolve_shots should run");

        // 4 + 4 + 2 (clamp в 0)
        assert_eq!(app.world().get::<Health>(target).unwrap().current, 0.0);

        let damage: Vec<DamageDealt> = app
            .world()
            .resource::<Events<DamageDealt>>()
            .iter_current_update_events()
            .copied()
            .collect();
        assert_eq!(damage.len(), 3);
        assert!(damage.iter().all(|event| event.attacker == shooter && event.target == target));
        assert_eq!(damage[2].amount, 2.0);
        assert!(damage[2].target_died);

        let blood = app
            .world()
            .resource::<Events<PresentationCue>>()
            .iter_current_update_events()
            .filter(|cue| matches!(cue, PresentationCue::PlaySound { sound: SoundKey::BloodHit, .. }))
            .count();
        assert_eq!(blood, 3);
    }
}
