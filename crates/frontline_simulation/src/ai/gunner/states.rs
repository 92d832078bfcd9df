//! Enter/Update/Exit состояний пулемётчика

use bevy::prelude::*;
use rand::Rng;
use crate::ai::context::BrainContext;
use crate::combat::ShotFired;
use crate::perception::turn_toward;
use crate::presentation::{ParticleKey, PresentationCue, SoundKey};
use super::{GunnerBrain, GunnerState};

/// Idle сканирование: накопленный угол и направление (+1 / -1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct IdleScratch {
    pub(crate) angle: f32,
    pub(crate) direction: f32,
}

impl Default for IdleScratch {
    fn default() -> Self {
        Self {
            angle: 0.0,
            direction: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct AlertScratch {
    pub(crate) elapsed: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct ShootScratch {
    pub(crate) burst_timer: f32,
    /// 0..1 за одну очередь
    pub(crate) sweep_progress: f32,
    pub(crate) sweep_angle: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct SuppressScratch {
    pub(crate) burst_timer: f32,
}

/// Как отклонить выстрел от направления на цель
#[derive(Debug, Clone, Copy, PartialEq)]
enum AimMode {
    /// Прицельный, со sweep смещением (градусы)
    Sweep(f32),
    /// Подавляющий, случайный разброс по горизонтали
    Suppressive,
}

impl GunnerBrain {
    /// Выстрел, если позволяют патроны, нагрев и темп стрельбы.
    /// true - ствол перегрет или магазин пуст: пора в OverheatAndReload.
    fn fire(&mut self, ctx: &mut BrainContext, aim_point: Vec3, mode: AimMode) -> bool {
        if self.magazine.is_empty()
            || self.heat.is_overheated()
            || self.time_since_last_shot < self.config.fire_interval
        {
            return false;
        }

        let origin = ctx.local_point(self.config.fire_point());
        // Стреляем горизонтально, на высоте дула
        let level_aim = Vec3::new(aim_point.x, origin.y, aim_point.z);
        let mut direction = (level_aim - origin).normalize_or_zero();
        if direction == Vec3::ZERO {
            direction = ctx.transform.forward().as_vec3();
        }

        let yaw = match mode {
            AimMode::Sweep(angle) => angle,
            AimMode::Suppressive => {
                let spread = self.config.suppress_spread;
                ctx.rng.gen_range(-spread..=spread)
            }
        };
        direction = Quat::from_rotation_y(yaw.to_radians()) * direction;

        if !self.magazine.consume() {
            return false;
        }
        self.time_since_last_shot = 0.0;
        let overheated = self.heat.add(self.config.heat_per_shot);

        ctx.outbox.shot(ShotFired {
            shooter: ctx.entity,
            origin,
            direction,
            suppressive: mode == AimMode::Suppressive,
        });
        ctx.outbox.cue(PresentationCue::sound(ctx.entity, SoundKey::GunShot));
        ctx.outbox.cue(PresentationCue::particle(ParticleKey::Gunshot, origin));

        overheated || self.magazine.is_empty()
    }

    // ---------------------------------------------------------------- Idle

    pub(super) fn enter_idle(&mut self) {
        self.idle = IdleScratch::default();
    }

    pub(super) fn update_idle(&mut self, ctx: &mut BrainContext) -> Option<GunnerState> {
        let delta_angle = self.config.idle_rotation_speed * ctx.delta * self.idle.direction;
        ctx.transform.rotate_y(delta_angle.to_radians());
        self.idle.angle += delta_angle;

        if self.idle.angle.abs() > self.config.idle_arc / 2.0 {
            self.idle.direction = -self.idle.direction;
        }

        if ctx.perception.target_within(self.config.alert_range).is_some() {
            return Some(GunnerState::Alert);
        }
        None
    }

    // --------------------------------------------------------------- Alert

    pub(super) fn enter_alert(&mut self) {
        self.alert = AlertScratch::default();
    }

    pub(super) fn update_alert(&mut self, ctx: &mut BrainContext) -> Option<GunnerState> {
        if let Some(target) = ctx.perception.target {
            turn_toward(ctx.transform, target.position, ctx.delta * self.config.turn_rate);
        }

        self.alert.elapsed += ctx.delta;
        if self.alert.elapsed < self.config.alert_duration {
            return None;
        }

        // Цель всё ещё только в alert зоне - ждём дальше
        match self.range_tier(ctx.perception) {
            GunnerState::Alert => None,
            tier => Some(tier),
        }
    }

    // --------------------------------------------------------------- Shoot

    pub(super) fn enter_shoot(&mut self) {
        self.shoot = ShootScratch::default();
    }

    pub(super) fn update_shoot(&mut self, ctx: &mut BrainContext) -> Option<GunnerState> {
        if let Some(target) = ctx.perception.target {
            turn_toward(ctx.transform, target.position, ctx.delta * self.config.turn_rate);

            if !ctx.perception.has_line_of_sight {
                return Some(GunnerState::Suppress);
            }

            let sweep = (self.shoot.sweep_progress * std::f32::consts::PI).sin() * self.config.sweep_arc;
            self.shoot.sweep_angle = sweep;
            if self.fire(ctx, target.position, AimMode::Sweep(sweep)) {
                return Some(GunnerState::OverheatAndReload);
            }

            if self.config.sweep_arc > 0.0 {
                self.shoot.sweep_progress += ctx.delta * self.config.sweep_speed / self.config.sweep_arc;
            }
            self.shoot.sweep_progress = self.shoot.sweep_progress.clamp(0.0, 1.0);
        }

        self.shoot.burst_timer += ctx.delta;
        if self.shoot.burst_timer >= self.config.burst_duration {
            self.shoot = ShootScratch::default();

            if ctx.perception.target_within(self.config.shoot_range).is_none() {
                return Some(self.range_tier(ctx.perception));
            }
        }

        None
    }

    pub(super) fn exit_shoot(&mut self) {
        self.shoot.sweep_angle = 0.0;
    }

    // ------------------------------------------------------------ Suppress

    pub(super) fn enter_suppress(&mut self) {
        self.suppress = SuppressScratch::default();
    }

    pub(super) fn update_suppress(&mut self, ctx: &mut BrainContext) -> Option<GunnerState> {
        if let Some(target) = ctx.perception.target {
            turn_toward(ctx.transform, target.position, ctx.delta * self.config.turn_rate);

            if self.fire(ctx, target.position, AimMode::Suppressive) {
                return Some(GunnerState::OverheatAndReload);
            }
        }

        self.suppress.burst_timer += ctx.delta;
        if self.suppress.burst_timer >= self.config.suppress_burst_duration {
            self.suppress.burst_timer = 0.0;

            return match self.range_tier(ctx.perception) {
                GunnerState::Suppress => None,
                tier => Some(tier),
            };
        }

        None
    }

    // --------------------------------------------------- OverheatAndReload

    pub(super) fn enter_overheat(&mut self, ctx: &mut BrainContext) {
        self.heat.begin_cooling();
        self.magazine.dump();
        self.magazine.cancel_reload();
        self.magazine.start_reload(self.config.reload_time);
        ctx.outbox.cue(PresentationCue::sound(ctx.entity, SoundKey::ReloadStart));
        crate::logger::log(&format!(
            "{:?} Gunner: overheated (heat {:.1}), cooling and reloading",
            ctx.entity,
            self.heat.heat()
        ));
    }

    pub(super) fn update_overheat(&mut self, ctx: &mut BrainContext) -> Option<GunnerState> {
        self.heat.cool(self.config.cooling_rate, ctx.delta);
        if self.magazine.poll_reload(ctx.delta) {
            crate::logger::log(&format!("{:?} Gunner: magazine refilled", ctx.entity));
        }

        if self.heat.is_cold() && self.magazine.is_full() {
            self.heat.clear_overheat();
            return Some(self.range_tier(ctx.perception));
        }
        None
    }

    pub(super) fn exit_overheat(&mut self, ctx: &mut BrainContext) {
        if self.magazine.cancel_reload() {
            crate::logger::log(&format!("{:?} Gunner: reload interrupted", ctx.entity));
        }
    }
}
