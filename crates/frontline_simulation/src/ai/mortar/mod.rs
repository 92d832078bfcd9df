//! Mortar - стационарный миномёт с навесной стрельбой
//!
//! Состояния: Idle (медленное сканирование) → Alert (заряжание) → Firing
//! (выстрел на входе, дальше по таймеру перезарядки), Dead.
//!
//! Firing на входе без цели сразу уходит в Idle (redirect внутри change_state).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use crate::ai::context::{Archetype, BrainContext, BrainReadout, LogicalState};

pub mod ballistics;
pub mod states;


pub use ballistics::{arc_height_for, solve, BallisticError, BallisticSolution};
use states::{AlertScratch, FiringScratch, IdleScratch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum MortarState {
    #[default]
    Idle,
    Alert,
    Firing,
    Dead,
}

impl MortarState {
    pub fn logical(self) -> LogicalState {
        match self {
            MortarState::Idle => LogicalState::Idle,
            MortarState::Alert => LogicalState::Alert,
            MortarState::Firing => LogicalState::Firing,
            MortarState::Dead => LogicalState::Death,
        }
    }
}

/// Тюнинг миномёта (углы в градусах)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MortarConfig {
    pub alert_radius: f32,
    pub firing_radius: f32,
    pub loading_duration: f32,
    pub reload_duration: f32,
    /// Idle: шаг сканирования раз в scan_interval
    pub scan_interval: f32,
    pub scan_speed: f32,
    /// Полная дуга сканирования
    pub scan_range: f32,
    /// Смещение центра сканирования от yaw спавна
    pub scan_offset: f32,
    pub base_arc_height: f32,
    pub arc_height_per_meter: f32,
    pub max_arc_height: f32,
    /// Должна совпадать с гравитацией полёта снарядов
    pub gravity: f32,
    pub path_resolution: usize,
    /// Сколько секунд держать превью траектории
    pub path_display_duration: f32,
    pub show_path: bool,
    pub turn_rate: f32,
    pub fire_point: [f32; 3],
}

impl Default for MortarConfig {
    fn default() -> Self {
        Self {
            alert_radius: 575.0,
            firing_radius: 50.0,
            loading_duration: 2.0,
            reload_duration: 10.0,
            scan_interval: 2.0,
            scan_speed: 30.0,
            scan_range: 90.0,
            scan_offset: 0.0,
            base_arc_height: 5.0,
            arc_height_per_meter: 0.15,
            max_arc_height: 20.0,
            gravity: 9.81,
            path_resolution: 100,
            path_display_duration: 3.0,
            show_path: true,
            turn_rate: 5.0,
            fire_point: [0.0, 1.5, -1.2],
        }
    }
}

impl MortarConfig {
    pub fn fire_point(&self) -> Vec3 {
        Vec3::from_array(self.fire_point)
    }

    pub fn arc_height(&self, distance: f32) -> f32 {
        arc_height_for(distance, self.base_arc_height, self.arc_height_per_meter, self.max_arc_height)
    }
}

/// Превью последнего выстрела (точки дуги + сколько ещё показывать)
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryPreview {
    pub points: Vec<Vec3>,
    pub remaining: f32,
}

#[derive(Component, Debug, Clone)]
pub struct MortarBrain {
    pub config: MortarConfig,
    state: MortarState,
    started: bool,
    /// Yaw спавна (радианы) - центр idle сканирования
    scan_center: f32,
    has_line_of_sight: bool,
    shells_fired: u32,
    last_solution: Option<BallisticSolution>,
    preview: Option<TrajectoryPreview>,
    idle: IdleScratch,
    alert: AlertScratch,
    firing: FiringScratch,
}

impl MortarBrain {
    pub fn new(config: MortarConfig) -> Self {
        Self {
            idle: IdleScratch::new(config.scan_speed),
            config,
            state: MortarState::Idle,
            started: false,
            scan_center: 0.0,
            has_line_of_sight: false,
            shells_fired: 0,
            last_solution: None,
            preview: None,
            alert: AlertScratch::default(),
            firing: FiringScratch::default(),
        }
    }

    pub fn state(&self) -> MortarState {
        self.state
    }

    pub fn shells_fired(&self) -> u32 {
        self.shells_fired
    }

    pub fn last_solution(&self) -> Option<&BallisticSolution> {
        self.last_solution.as_ref()
    }

    pub fn trajectory_preview(&self) -> Option<&TrajectoryPreview> {
        self.preview.as_ref()
    }

    pub fn scan_angle(&self) -> f32 {
        self.idle.angle
    }

    pub fn tick(&mut self, ctx: &mut BrainContext) {
        if !self.started {
            self.start(ctx);
            self.enter_or_redirect(MortarState::Idle, ctx);
        }

        self.has_line_of_sight = ctx.perception.target.is_some() && ctx.perception.has_line_of_sight;
        self.tick_preview(ctx.delta);

        if self.state != MortarState::Dead && !ctx.health.is_alive() {
            self.change_state(MortarState::Dead, ctx);
            return;
        }

        let next = match self.state {
            MortarState::Idle => self.update_idle(ctx),
            MortarState::Alert => self.update_alert(ctx),
            MortarState::Firing => self.update_firing(ctx),
            MortarState::Dead => None,
        };

        if let Some(next) = next {
            self.change_state(next, ctx);
        }
    }

    /// Запомнить yaw спавна как центр сканирования
    fn start(&mut self, ctx: &BrainContext) {
        self.started = true;
        self.scan_center = ctx.transform.rotation.to_euler(EulerRot::YXZ).0;
    }

    fn tick_preview(&mut self, delta: f32) {
        if let Some(preview) = self.preview.as_mut() {
            preview.remaining -= delta;
            if preview.remaining <= 0.0 {
                self.preview = None;
            }
        }
    }

    /// Смена состояния. Enter может перенаправить (Firing без цели → Idle).
    /// Exit фазы у миномёта нет: все таймеры сбрасываются на enter.
    pub fn change_state(&mut self, next: MortarState, ctx: &mut BrainContext) {
        if self.state == MortarState::Dead {
            crate::logger::log_warning(&format!(
                "{:?} Mortar: ignored transition Dead → {:?}",
                ctx.entity, next
            ));
            return;
        }

        if !self.started {
            self.start(ctx);
        }
        let previous = self.state;
        crate::logger::log(&format!("{:?} Mortar: {:?} → {:?}", ctx.entity, previous, next));
        self.enter_or_redirect(next, ctx);
    }

    fn enter_or_redirect(&mut self, next: MortarState, ctx: &mut BrainContext) {
        self.state = next;
        if let Some(redirect) = self.enter(next, ctx) {
            crate::logger::log(&format!("{:?} Mortar: {:?} → {:?}", ctx.entity, next, redirect));
            self.state = redirect;
            // Redirect только в Idle/Dead - их enter не перенаправляет
            self.enter(redirect, ctx);
        }
    }

    fn enter(&mut self, state: MortarState, ctx: &mut BrainContext) -> Option<MortarState> {
        match state {
            MortarState::Idle => {
                self.enter_idle();
                None
            }
            MortarState::Alert => {
                self.enter_alert();
                None
            }
            MortarState::Firing => self.enter_firing(ctx),
            MortarState::Dead => {
                self.enter_dead(ctx);
                None
            }
        }
    }

    pub fn readout(&self) -> BrainReadout {
        BrainReadout {
            archetype: Archetype::Mortar,
            state: self.state.logical(),
            is_reloading: self.state == MortarState::Firing,
            has_line_of_sight: self.has_line_of_sight,
            is_idle_alert: false,
            is_recover_returning: false,
            is_overheated: false,
            is_dead: self.state == MortarState::Dead,
        }
    }
}
