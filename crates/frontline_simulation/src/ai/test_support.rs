//! Тестовый стенд для brains: один актор, ручная perception, headless tactics

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use crate::ai::context::BrainContext;
use crate::ai::gunner::GunnerBrain;
use crate::ai::mortar::MortarBrain;
use crate::ai::patrol::PatrolBrain;
use crate::combat::CombatOutbox;
use crate::components::{Health, NavAgent};
use crate::perception::{Perception, TargetFix};
use crate::tactical::navigation::{resolve_path, step_agent};
use crate::tactical::HeadlessTactics;

pub(crate) const TEST_DT: f32 = 1.0 / 60.0;

/// Цель, которую "видит" актор
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScriptedTarget {
    pub entity: Entity,
    pub position: Vec3,
    pub line_of_sight: bool,
}

pub(crate) struct Fixture {
    pub entity: Entity,
    pub transform: Transform,
    pub health: Health,
    pub perception: Perception,
    pub tactics: HeadlessTactics,
    pub rng: ChaCha8Rng,
    pub outbox: CombatOutbox,
    pub agent: NavAgent,
    pub delta: f32,
    pub detection_range: f32,
    pub target: Option<ScriptedTarget>,
}

impl Fixture {
    pub fn new(position: Vec3, detection_range: f32) -> Self {
        Self {
            entity: Entity::from_raw(1),
            transform: Transform::from_translation(position),
            health: Health::new(100.0),
            perception: Perception::default(),
            tactics: HeadlessTactics::default(),
            rng: ChaCha8Rng::seed_from_u64(42),
            outbox: CombatOutbox::default(),
            agent: NavAgent::default(),
            delta: TEST_DT,
            detection_range,
            target: None,
        }
    }

    pub fn target_entity() -> Entity {
        Entity::from_raw(99)
    }

    pub fn show_target(&mut self, position: Vec3, line_of_sight: bool) {
        self.target = Some(ScriptedTarget {
            entity: Self::target_entity(),
            position,
            line_of_sight,
        });
    }

    pub fn set_line_of_sight(&mut self, line_of_sight: bool) {
        if let Some(target) = self.target.as_mut() {
            target.line_of_sight = line_of_sight;
        }
    }

    pub fn hide_target(&mut self) {
        self.target = None;
    }

    /// Perception как её посчитала бы update_perception (дальность включительно)
    fn refresh_perception(&mut self) {
        self.perception = match self.target {
            Some(target) => {
                let distance = self.transform.translation.distance(target.position);
                if distance <= self.detection_range {
                    Perception {
                        target: Some(TargetFix {
                            entity: target.entity,
                            position: target.position,
                            distance,
                        }),
                        has_line_of_sight: target.line_of_sight,
                    }
                } else {
                    Perception::lost()
                }
            }
            None => Perception::lost(),
        };
    }

    pub fn tick_patrol(&mut self, brain: &mut PatrolBrain) {
        self.refresh_perception();
        {
            let mut ctx = BrainContext {
                entity: self.entity,
                delta: self.delta,
                transform: &mut self.transform,
                health: &mut self.health,
                perception: &self.perception,
                tactics: &self.tactics,
                rng: &mut self.rng,
                outbox: &mut self.outbox,
            };
            brain.tick(&mut ctx, &mut self.agent);
        }
        resolve_path(&mut self.agent, self.transform.translation, self.tactics.navmesh());
        step_agent(&mut self.agent, &mut self.transform, self.delta);
    }

    pub fn tick_gunner(&mut self, brain: &mut GunnerBrain) {
        self.refresh_perception();
        let mut ctx = BrainContext {
            entity: self.entity,
            delta: self.delta,
            transform: &mut self.transform,
            health: &mut self.health,
            perception: &self.perception,
            tactics: &self.tactics,
            rng: &mut self.rng,
            outbox: &mut self.outbox,
        };
        brain.tick(&mut ctx);
    }

    pub fn tick_mortar(&mut self, brain: &mut MortarBrain) {
        self.refresh_perception();
        let mut ctx = BrainContext {
            entity: self.entity,
            delta: self.delta,
            transform: &mut self.transform,
            health: &mut self.health,
            perception: &self.perception,
            tactics: &self.tactics,
            rng: &mut self.rng,
            outbox: &mut self.outbox,
        };
        brain.tick(&mut ctx);
    }

    /// Перевести patrol brain в состояние напрямую (через обычный exit/enter)
    pub fn force_patrol(&mut self, brain: &mut PatrolBrain, state: crate::ai::patrol::PatrolState) {
        self.refresh_perception();
        let mut ctx = BrainContext {
            entity: self.entity,
            delta: self.delta,
            transform: &mut self.transform,
            health: &mut self.health,
            perception: &self.perception,
            tactics: &self.tactics,
            rng: &mut self.rng,
            outbox: &mut self.outbox,
        };
        brain.change_state(state, &mut ctx, &mut self.agent);
    }

    pub fn force_gunner(&mut self, brain: &mut GunnerBrain, state: crate::ai::gunner::GunnerState) {
        self.refresh_perception();
        let mut ctx = BrainContext {
            entity: self.entity,
            delta: self.delta,
            transform: &mut self.transform,
            health: &mut self.health,
            perception: &self.perception,
            tactics: &self.tactics,
            rng: &mut self.rng,
            outbox: &mut self.outbox,
        };
        brain.change_state(state, &mut ctx);
    }

    pub fn force_mortar(&mut self, brain: &mut MortarBrain, state: crate::ai::mortar::MortarState) {
        self.refresh_perception();
        let mut ctx = BrainContext {
            entity: self.entity,
            delta: self.delta,
            transform: &mut self.transform,
            health: &mut self.health,
            perception: &self.perception,
            tactics: &self.tactics,
            rng: &mut self.rng,
            outbox: &mut self.outbox,
        };
        brain.change_state(state, &mut ctx);
    }

    /// Тики пока условие не выполнится (None - не дождались)
    pub fn run_patrol_until(
        &mut self,
        brain: &mut PatrolBrain,
        max_ticks: usize,
        mut done: impl FnMut(&PatrolBrain, &Fixture) -> bool,
    ) -> Option<usize> {
        for tick in 1..=max_ticks {
            self.tick_patrol(brain);
            if done(brain, self) {
                return Some(tick);
            }
        }
        None
    }

    /// Тики пока gunner не войдёт в `state`; возвращает число тиков
    pub fn run_until_gunner(
        &mut self,
        brain: &mut GunnerBrain,
        max_ticks: usize,
        state: crate::ai::gunner::GunnerState,
    ) -> usize {
        for tick in 1..=max_ticks {
            self.tick_gunner(brain);
            if brain.state() == state {
                return tick;
            }
        }
        panic!(
            "gunner did not reach {:?} in {} ticks (stuck in {:?})",
            state,
            max_ticks,
            brain.state()
        );
    }

    pub fn run_until_mortar(
        &mut self,
        brain: &mut MortarBrain,
        max_ticks: usize,
        state: crate::ai::mortar::MortarState,
    ) -> usize {
        for tick in 1..=max_ticks {
            self.tick_mortar(brain);
            if brain.state() == state {
                return tick;
            }
        }
        panic!(
            "mortar did not reach {:?} in {} ticks (stuck in {:?})",
            state,
            max_ticks,
            brain.state()
        );
    }

    pub fn shots_fired(&self) -> usize {
        self.outbox.shots.len()
    }

    pub fn grenades_launched(&self) -> usize {
        self.outbox.ordnance.len()
    }
}
