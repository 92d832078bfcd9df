//! Enter/Update состояний миномёта + выстрел

use bevy::prelude::*;
use crate::ai::context::BrainContext;
use crate::combat::{OrdnanceKind, OrdnanceLaunched};
use crate::perception::turn_toward;
use super::ballistics::solve;
use super::{MortarBrain, MortarState, TrajectoryPreview};

/// Idle сканирование. Знак `speed` переживает повторные входы в Idle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct IdleScratch {
    pub(crate) scan_timer: f32,
    pub(crate) angle: f32,
    pub(crate) speed: f32,
}

impl IdleScratch {
    pub(crate) fn new(speed: f32) -> Self {
        Self {
            scan_timer: 0.0,
            angle: 0.0,
            speed,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct AlertScratch {
    pub(crate) loading: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct FiringScratch {
    pub(crate) reload: f32,
}

impl MortarBrain {
    fn in_alert_zone(&self, ctx: &BrainContext) -> bool {
        ctx.perception.target_within(self.config.alert_radius).is_some()
    }

    fn in_firing_range(&self, ctx: &BrainContext) -> bool {
        ctx.perception.target_within(self.config.firing_radius).is_some()
    }

    // ---------------------------------------------------------------- Idle

    pub(super) fn enter_idle(&mut self) {
        self.idle.scan_timer = 0.0;
        self.idle.angle = 0.0;
    }

    pub(super) fn update_idle(&mut self, ctx: &mut BrainContext) -> Option<MortarState> {
        self.idle.scan_timer += ctx.delta;
        if self.idle.scan_timer >= self.config.scan_interval {
            self.idle.angle += self.idle.speed * ctx.delta;
            ctx.transform.rotation = Quat::from_rotation_y(self.scan_center + self.idle.angle.to_radians());

            let half_range = self.config.scan_range / 2.0;
            let offset = self.config.scan_offset;
            if self.idle.angle > offset + half_range || self.idle.angle < offset - half_range {
                self.idle.speed = -self.idle.speed;
            }

            self.idle.scan_timer = 0.0;
        }

        if self.in_alert_zone(ctx) {
            return Some(MortarState::Alert);
        }
        None
    }

    // --------------------------------------------------------------- Alert

    pub(super) fn enter_alert(&mut self) {
        self.alert = AlertScratch::default();
    }

    pub(super) fn update_alert(&mut self, ctx: &mut BrainContext) -> Option<MortarState> {
        self.alert.loading += ctx.delta;

        if let Some(target) = ctx.perception.target {
            turn_toward(ctx.transform, target.position, ctx.delta * self.config.turn_rate);
        }

        if self.alert.loading >= self.config.loading_duration {
            if self.in_firing_range(ctx) {
                return Some(MortarState::Firing);
            }
            if !self.in_alert_zone(ctx) {
                return Some(MortarState::Idle);
            }
            // Цель в alert зоне, но вне firing range - ждём
        } else if !self.in_alert_zone(ctx) {
            return Some(MortarState::Idle);
        }

        None
    }

    // -------------------------------------------------------------- Firing

    /// Выстрел на входе. Нет цели → redirect в Idle.
    pub(super) fn enter_firing(&mut self, ctx: &mut BrainContext) -> Option<MortarState> {
        if !self.fire_shell(ctx) {
            return Some(MortarState::Idle);
        }
        self.firing = FiringScratch::default();
        None
    }

    pub(super) fn update_firing(&mut self, ctx: &mut BrainContext) -> Option<MortarState> {
        self.firing.reload += ctx.delta;
        if self.firing.reload < self.config.reload_duration {
            return None;
        }

        if self.in_firing_range(ctx) {
            if !self.fire_shell(ctx) {
                return Some(MortarState::Idle);
            }
            self.firing.reload = 0.0;
            None
        } else if self.in_alert_zone(ctx) {
            Some(MortarState::Alert)
        } else {
            Some(MortarState::Idle)
        }
    }

    /// Навесной выстрел по текущей цели.
    ///
    /// false - стрелять не по чему (цели нет / миномёт мёртв).
    /// Невалидная баллистика пропускает выстрел, но не считается отказом.
    pub(crate) fn fire_shell(&mut self, ctx: &mut BrainContext) -> bool {
        let Some(target) = ctx.perception.target else {
            crate::logger::log_error(&format!("{:?} Mortar: no target to fire at", ctx.entity));
            return false;
        };
        if !ctx.health.is_alive() {
            return false;
        }

        let start = ctx.local_point(self.config.fire_point());
        let arc_height = self.config.arc_height(start.distance(target.position));

        let solution = match solve(start, target.position, arc_height, self.config.gravity) {
            Ok(solution) => solution,
            Err(err) => {
                crate::logger::log_error(&format!("{:?} Mortar: shot aborted: {}", ctx.entity, err));
                return true;
            }
        };

        ctx.outbox.launch(OrdnanceLaunched {
            source: ctx.entity,
            kind: OrdnanceKind::MortarShell,
            origin: start,
            velocity: solution.velocity,
        });
        self.shells_fired += 1;
        crate::logger::log(&format!(
            "{:?} Mortar: fired at {:?} (arc {:.1}m, flight {:.2}s)",
            ctx.entity, target.position, arc_height, solution.flight_time
        ));

        if self.config.show_path {
            self.preview = Some(TrajectoryPreview {
                points: solution.sample_path(self.config.path_resolution),
                remaining: self.config.path_display_duration,
            });
        }
        self.last_solution = Some(solution);
        true
    }

    // ---------------------------------------------------------------- Dead

    pub(super) fn enter_dead(&mut self, ctx: &mut BrainContext) {
        self.preview = None;
        crate::logger::log_info(&format!("{:?} Mortar: destroyed", ctx.entity));
    }
}
