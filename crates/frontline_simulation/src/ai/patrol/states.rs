//! Enter/Update/Exit каждого состояния patrol soldier
//!
//! Update возвращает `Some(next)` если нужен переход - смену делает brain,
//! так что состояние никогда не переключает себя посреди своего update.

use bevy::prelude::*;
use rand::Rng;
use crate::ai::context::BrainContext;
use crate::ai::resources::TimedAction;
use crate::combat::{OrdnanceKind, OrdnanceLaunched, ShotFired};
use crate::components::NavAgent;
use crate::perception::face_toward;
use crate::presentation::{ParticleKey, PresentationCue, SoundKey};
use super::{PatrolBrain, PatrolState};

/// Дальше этой доли patrol_range от anchor - сначала вернуться в зону
const RETURN_TO_ZONE_FRACTION: f32 = 0.8;
/// Желаемая дистанция стрельбы (доля attack_range)
const HOLD_DISTANCE_FRACTION: f32 = 0.8;
/// Deadband перепозиционирования (метры)
const REPOSITION_DEADBAND: f32 = 0.8;

/// Фаза цикла патрулирования
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) enum PatrolLeg {
    #[default]
    Stopped,
    ReturningToZone,
    Moving,
    Waiting {
        elapsed: f32,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct IdleScratch {
    pub(crate) leg: PatrolLeg,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct AlertScratch {
    pub(crate) timer: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct ShootScratch {
    /// До следующего выстрела (≤ 0 - можно стрелять)
    pub(crate) fire_cooldown: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct GrenadeScratch {
    pub(crate) cooldown: TimedAction,
    pub(crate) looping: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct RecoveryScratch {
    pub(crate) returning: bool,
    pub(crate) heal_clock: f32,
    pub(crate) path_failure_reported: bool,
}

/// Двигаться к точке (снимает остановку)
fn move_to(agent: &mut NavAgent, point: Vec3) {
    agent.set_destination(point);
    agent.is_stopped = false;
}

/// Нога патруля закончена: дошли, либо путь не построился (стоим на месте)
fn leg_finished(agent: &NavAgent) -> bool {
    !agent.path_pending && (agent.remaining_distance <= agent.stopping_distance || !agent.has_path)
}

impl PatrolBrain {
    // ---------------------------------------------------------------- Idle

    pub(super) fn enter_idle(&mut self, ctx: &mut BrainContext, agent: &mut NavAgent) {
        let from_anchor = ctx.position().distance(self.anchor);
        if from_anchor > self.config.patrol_range * RETURN_TO_ZONE_FRACTION {
            self.is_idle_alert = false;
            self.idle.leg = PatrolLeg::ReturningToZone;
            move_to(agent, self.anchor);
        } else {
            self.start_patrol_leg(ctx, agent);
        }
    }

    fn start_patrol_leg(&mut self, ctx: &mut BrainContext, agent: &mut NavAgent) {
        let point = self.pick_patrol_point(ctx);
        self.is_idle_alert = false;
        self.idle.leg = PatrolLeg::Moving;
        move_to(agent, point);
    }

    /// Случайная точка в круге patrol_range вокруг anchor, спроецированная на navmesh.
    /// Вне navmesh → anchor.
    pub(crate) fn pick_patrol_point(&self, ctx: &mut BrainContext) -> Vec3 {
        let range = self.config.patrol_range;
        let radius = range * ctx.rng.gen::<f32>().sqrt();
        let angle = ctx.rng.gen::<f32>() * std::f32::consts::TAU;
        let candidate = self.anchor + Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin());

        match ctx.tactics.sample_navmesh(candidate, range) {
            Some(point) => point,
            None => {
                crate::logger::log_warning(&format!(
                    "{:?} Patrol: point {:?} is off navmesh, falling back to anchor",
                    ctx.entity, candidate
                ));
                self.anchor
            }
        }
    }

    pub(super) fn update_idle(&mut self, ctx: &mut BrainContext, agent: &mut NavAgent) -> Option<PatrolState> {
        if ctx.perception.target_within(self.config.detection_range).is_some() {
            return Some(PatrolState::Alert);
        }

        match self.idle.leg {
            PatrolLeg::Stopped => {}
            PatrolLeg::ReturningToZone => {
                if leg_finished(agent) {
                    self.start_patrol_leg(ctx, agent);
                }
            }
            PatrolLeg::Moving => {
                if leg_finished(agent) {
                    self.is_idle_alert = true;
                    self.idle.leg = PatrolLeg::Waiting { elapsed: 0.0 };
                }
            }
            PatrolLeg::Waiting { elapsed } => {
                let elapsed = elapsed + ctx.delta;
                if elapsed >= self.config.patrol_wait {
                    self.start_patrol_leg(ctx, agent);
                } else {
                    self.idle.leg = PatrolLeg::Waiting { elapsed };
                }
            }
        }

        None
    }

    pub(super) fn exit_idle(&mut self) {
        self.idle.leg = PatrolLeg::Stopped;
    }

    // --------------------------------------------------------------- Alert

    pub(super) fn enter_alert(&mut self, agent: &mut NavAgent) {
        self.alert.timer = 0.0;
        agent.halt();
    }

    pub(super) fn update_alert(&mut self, ctx: &mut BrainContext, _agent: &mut NavAgent) -> Option<PatrolState> {
        let Some(target) = ctx.perception.target_within(self.config.detection_range).copied() else {
            return Some(PatrolState::Idle);
        };

        face_toward(ctx.transform, target.position);

        if ctx.perception.has_line_of_sight {
            self.alert.timer += ctx.delta;
            if self.alert.timer >= self.config.alert_countdown {
                return Some(PatrolState::Follow);
            }
        } else {
            // LOS потерян - отсчёт заново
            self.alert.timer = 0.0;
        }

        None
    }

    // -------------------------------------------------------------- Follow

    pub(super) fn enter_follow(&mut self, agent: &mut NavAgent) {
        agent.is_stopped = false;
    }

    pub(super) fn update_follow(&mut self, ctx: &mut BrainContext, agent: &mut NavAgent) -> Option<PatrolState> {
        let Some(target) = ctx.perception.target_within(self.config.detection_range).copied() else {
            return Some(PatrolState::Idle);
        };

        if target.distance <= self.config.attack_range {
            agent.is_stopped = true;
            if ctx.perception.has_line_of_sight {
                return Some(PatrolState::Shoot);
            }
            if self.grenades.has_any() {
                return Some(PatrolState::GrenadeThrow);
            }
            // Ни LOS, ни гранат - стрелять всё равно (Shoot сам подойдёт ближе)
            return Some(PatrolState::Shoot);
        }

        move_to(agent, target.position);
        None
    }

    // --------------------------------------------------------------- Shoot

    pub(super) fn enter_shoot(&mut self) {
        self.shoot.fire_cooldown = 0.0;
    }

    pub(super) fn update_shoot(&mut self, ctx: &mut BrainContext, agent: &mut NavAgent) -> Option<PatrolState> {
        if self.magazine.poll_reload(ctx.delta) {
            crate::logger::log(&format!("{:?} Patrol: weapon reloaded", ctx.entity));
        }
        self.shoot.fire_cooldown -= ctx.delta;

        let Some(target) = ctx.perception.target else {
            return Some(PatrolState::Idle);
        };

        // Держим ~80% attack range от цели
        let away_from_target = (ctx.position() - target.position).normalize_or_zero();
        let hold_point =
            target.position + away_from_target * (self.config.attack_range * HOLD_DISTANCE_FRACTION);
        if ctx.position().distance(hold_point) > REPOSITION_DEADBAND {
            move_to(agent, hold_point);
        } else {
            agent.is_stopped = true;
        }

        if target.distance > self.config.attack_range {
            return Some(PatrolState::Follow);
        }

        if !ctx.perception.has_line_of_sight {
            if self.grenades.has_any() {
                agent.is_stopped = true;
                return Some(PatrolState::GrenadeThrow);
            }
            // Гранат нет - идём на цель, чтобы вернуть LOS
            move_to(agent, target.position);
        }

        face_toward(ctx.transform, target.position);

        if self.shoot.fire_cooldown <= 0.0 && !self.magazine.is_reloading() {
            if self.magazine.is_empty() {
                self.start_reload(ctx);
            } else {
                self.fire_bullet(ctx, target.position);
                self.shoot.fire_cooldown = self.config.fire_interval;
            }
        }

        None
    }

    fn fire_bullet(&mut self, ctx: &mut BrainContext, aim_point: Vec3) {
        if !self.magazine.consume() {
            return;
        }

        let origin = ctx.local_point(self.config.fire_point());
        let mut direction = (aim_point - origin).normalize_or_zero();
        if direction == Vec3::ZERO {
            direction = ctx.transform.forward().as_vec3();
        }

        ctx.outbox.shot(ShotFired {
            shooter: ctx.entity,
            origin,
            direction,
            suppressive: false,
        });
        ctx.outbox.cue(PresentationCue::sound(ctx.entity, SoundKey::GunShot));
        ctx.outbox.cue(PresentationCue::particle(ParticleKey::Gunshot, origin));

        if self.magazine.is_empty() {
            self.start_reload(ctx);
        }
    }

    /// Старт перезарядки (одна за раз)
    fn start_reload(&mut self, ctx: &mut BrainContext) {
        if self.magazine.start_reload(self.config.reload_time) {
            crate::logger::log(&format!("{:?} Patrol: reloading...", ctx.entity));
            ctx.outbox.cue(PresentationCue::sound(ctx.entity, SoundKey::ReloadStart));
        }
    }

    pub(super) fn exit_shoot(&mut self, ctx: &mut BrainContext) {
        if self.magazine.cancel_reload() {
            crate::logger::log(&format!("{:?} Patrol: reload interrupted", ctx.entity));
        }
    }

    // -------------------------------------------------------- GrenadeThrow

    pub(super) fn enter_grenade_throw(&mut self, ctx: &mut BrainContext, agent: &mut NavAgent) {
        ctx.outbox.cue(PresentationCue::sound(ctx.entity, SoundKey::GrenadeThrow));
        self.grenade.looping = true;
        self.attempt_grenade_throw(ctx, agent);
    }

    /// Голова цикла бросков: условия держатся → бросок + cooldown, иначе цикл закончен
    fn attempt_grenade_throw(&mut self, ctx: &mut BrainContext, agent: &mut NavAgent) {
        let target = match ctx.perception.target {
            Some(target) if self.grenades.has_any() && !ctx.perception.has_line_of_sight => target,
            _ => {
                self.grenade.looping = false;
                return;
            }
        };

        agent.halt();

        let origin = ctx.local_point(self.config.grenade_point());
        let direction = (target.position - origin).normalize_or_zero();
        let force = (ctx.position().distance(target.position) * self.config.grenade_force_per_meter)
            .clamp(self.config.grenade_force_min, self.config.grenade_force_max);
        let impulse = (direction + Vec3::Y * self.config.grenade_lift) * force;
        let velocity = impulse / self.config.grenade_mass.max(f32::EPSILON);

        self.grenades.take();
        ctx.outbox.launch(OrdnanceLaunched {
            source: ctx.entity,
            kind: OrdnanceKind::Grenade,
            origin,
            velocity,
        });
        crate::logger::log(&format!(
            "{:?} Patrol: threw grenade, {} left",
            ctx.entity,
            self.grenades.count()
        ));

        self.grenade.cooldown.start(self.config.grenade_cooldown);
    }

    pub(super) fn update_grenade_throw(&mut self, ctx: &mut BrainContext, agent: &mut NavAgent) -> Option<PatrolState> {
        let Some(target) = ctx.perception.target else {
            return Some(PatrolState::Idle);
        };

        if ctx.perception.has_line_of_sight || !self.grenades.has_any() {
            return Some(PatrolState::Shoot);
        }

        if target.distance > self.config.attack_range {
            return Some(PatrolState::Follow);
        }

        face_toward(ctx.transform, target.position);

        if self.grenade.looping && self.grenade.cooldown.poll(ctx.delta) {
            self.attempt_grenade_throw(ctx, agent);
        }

        None
    }

    pub(super) fn exit_grenade_throw(&mut self) {
        self.grenade.cooldown.cancel();
        self.grenade.looping = false;
    }

    // ------------------------------------------------------------ Recovery

    pub(super) fn enter_recovery(&mut self, agent: &mut NavAgent) {
        self.recovery = RecoveryScratch::default();
        agent.is_stopped = false;
        agent.reset_path();
    }

    /// Первый тик только выдаёт путь к anchor; лечение - после прибытия
    /// (или на месте, если путь не построился).
    pub(super) fn update_recovery(&mut self, ctx: &mut BrainContext, agent: &mut NavAgent) -> Option<PatrolState> {
        if !self.recovery.returning {
            agent.set_destination(self.anchor);
            self.recovery.returning = true;
            self.recovery.heal_clock = 0.0;
            self.is_recover_returning = true;
            return None;
        }

        self.recovery.heal_clock += ctx.delta;

        if agent.has_arrived() {
            agent.is_stopped = true;
            self.is_recover_returning = false;
            return self.heal_tick(ctx);
        }

        if !agent.path_pending && !agent.has_path {
            if !self.recovery.path_failure_reported {
                self.recovery.path_failure_reported = true;
                crate::logger::log_warning(&format!(
                    "{:?} Patrol: path to anchor {:?} failed, recovering in place",
                    ctx.entity, self.anchor
                ));
            }
            agent.is_stopped = true;
            self.is_recover_returning = false;
            return self.heal_tick(ctx);
        }

        None
    }

    fn heal_tick(&mut self, ctx: &mut BrainContext) -> Option<PatrolState> {
        let interval = self.config.heal_interval;
        if self.recovery.heal_clock < interval {
            return None;
        }
        self.recovery.heal_clock = 0.0;
        ctx.health.heal(self.config.recovery_rate * interval);

        if ctx.health.is_full() {
            return Some(PatrolState::Idle);
        }
        None
    }

    pub(super) fn exit_recovery(&mut self, agent: &mut NavAgent) {
        agent.is_stopped = false;
        self.is_recover_returning = false;
    }

    // --------------------------------------------------------------- Death

    pub(super) fn enter_death(&mut self, agent: &mut NavAgent) {
        agent.halt();
        agent.reset_path();
        self.is_idle_alert = false;
        self.is_recover_returning = false;
    }
}
