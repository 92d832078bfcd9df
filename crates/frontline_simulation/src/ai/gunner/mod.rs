//! Machine gunner - стационарный пулемётчик с перегревом ствола
//!
//! Состояния: Idle (сканирование дугой) → Alert → Shoot ⇄ Suppress,
//! OverheatAndReload (форсируется выстрелом), Death.
//!
//! Range tiers (ближний первый): shoot < suppress < alert.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use crate::ai::context::{Archetype, BrainContext, BrainReadout, LogicalState};
use crate::ai::resources::{HeatGauge, Magazine};
use crate::perception::Perception;

pub mod states;


use states::{AlertScratch, IdleScratch, ShootScratch, SuppressScratch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum GunnerState {
    #[default]
    Idle,
    Alert,
    Shoot,
    Suppress,
    OverheatAndReload,
    Death,
}

impl GunnerState {
    pub fn logical(self) -> LogicalState {
        match self {
            GunnerState::Idle => LogicalState::Idle,
            GunnerState::Alert => LogicalState::Alert,
            GunnerState::Shoot => LogicalState::Shoot,
            GunnerState::Suppress => LogicalState::Suppress,
            GunnerState::OverheatAndReload => LogicalState::OverheatAndReload,
            GunnerState::Death => LogicalState::Death,
        }
    }
}

/// Тюнинг пулемётчика (углы в градусах)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GunnerConfig {
    pub alert_range: f32,
    pub suppress_range: f32,
    pub shoot_range: f32,
    /// Минимальный интервал между выстрелами
    pub fire_interval: f32,
    pub burst_duration: f32,
    pub suppress_burst_duration: f32,
    pub alert_duration: f32,
    pub overheat_threshold: f32,
    pub heat_per_shot: f32,
    /// Остывание в секунду (только в OverheatAndReload)
    pub cooling_rate: f32,
    pub reload_time: f32,
    pub magazine_size: u32,
    /// Разброс подавляющего огня: ±spread
    pub suppress_spread: f32,
    pub idle_rotation_speed: f32,
    /// Полная дуга idle сканирования
    pub idle_arc: f32,
    /// Полная дуга sweep за очередь
    pub sweep_arc: f32,
    pub sweep_speed: f32,
    /// Скорость доворота к цели (slerp factor в секунду)
    pub turn_rate: f32,
    pub fire_point: [f32; 3],
}

impl Default for GunnerConfig {
    fn default() -> Self {
        Self {
            alert_range: 25.0,
            suppress_range: 15.0,
            shoot_range: 7.0,
            fire_interval: 0.1,
            burst_duration: 2.0,
            suppress_burst_duration: 3.0,
            alert_duration: 1.0,
            overheat_threshold: 10.0,
            heat_per_shot: 1.0,
            cooling_rate: 2.0,
            reload_time: 3.0,
            magazine_size: 30,
            suppress_spread: 15.0,
            idle_rotation_speed: 10.0,
            idle_arc: 60.0,
            sweep_arc: 30.0,
            sweep_speed: 60.0,
            turn_rate: 5.0,
            fire_point: [0.0, 1.2, -0.9],
        }
    }
}

impl GunnerConfig {
    pub fn fire_point(&self) -> Vec3 {
        Vec3::from_array(self.fire_point)
    }
}

#[derive(Component, Debug, Clone)]
pub struct GunnerBrain {
    pub config: GunnerConfig,
    state: GunnerState,
    started: bool,
    magazine: Magazine,
    heat: HeatGauge,
    time_since_last_shot: f32,
    has_line_of_sight: bool,
    idle: IdleScratch,
    alert: AlertScratch,
    shoot: ShootScratch,
    suppress: SuppressScratch,
}

impl GunnerBrain {
    pub fn new(config: GunnerConfig) -> Self {
        Self {
            magazine: Magazine::full(config.magazine_size),
            heat: HeatGauge::new(config.overheat_threshold),
            config,
            state: GunnerState::Idle,
            started: false,
            time_since_last_shot: 0.0,
            has_line_of_sight: false,
            idle: IdleScratch::default(),
            alert: AlertScratch::default(),
            shoot: ShootScratch::default(),
            suppress: SuppressScratch::default(),
        }
    }

    pub fn state(&self) -> GunnerState {
        self.state
    }

    pub fn magazine(&self) -> &Magazine {
        &self.magazine
    }

    pub fn heat(&self) -> &HeatGauge {
        &self.heat
    }

    pub fn time_since_last_shot(&self) -> f32 {
        self.time_since_last_shot
    }

    /// Текущий sweep угол очереди (градусы, 0 вне Shoot)
    pub fn sweep_angle(&self) -> f32 {
        self.shoot.sweep_angle
    }

    /// Один тик: (первый тик - enter Idle) → death guard → update → счётчик выстрела
    pub fn tick(&mut self, ctx: &mut BrainContext) {
        if !self.started {
            self.started = true;
            self.enter(GunnerState::Idle, ctx);
        }

        self.has_line_of_sight = ctx.perception.target.is_some() && ctx.perception.has_line_of_sight;

        if self.state != GunnerState::Death && !ctx.health.is_alive() {
            self.change_state(GunnerState::Death, ctx);
            return;
        }

        let next = match self.state {
            GunnerState::Idle => self.update_idle(ctx),
            GunnerState::Alert => self.update_alert(ctx),
            GunnerState::Shoot => self.update_shoot(ctx),
            GunnerState::Suppress => self.update_suppress(ctx),
            GunnerState::OverheatAndReload => self.update_overheat(ctx),
            GunnerState::Death => None,
        };

        if let Some(next) = next {
            self.change_state(next, ctx);
        }

        self.time_since_last_shot += ctx.delta;
    }

    /// Самый тесный range tier, в который попадает цель
    pub fn range_tier(&self, perception: &Perception) -> GunnerState {
        if perception.target_within(self.config.shoot_range).is_some() {
            GunnerState::Shoot
        } else if perception.target_within(self.config.suppress_range).is_some() {
            GunnerState::Suppress
        } else if perception.target_within(self.config.alert_range).is_some() {
            GunnerState::Alert
        } else {
            GunnerState::Idle
        }
    }

    pub fn change_state(&mut self, next: GunnerState, ctx: &mut BrainContext) {
        let previous = self.state;
        if previous == GunnerState::Death {
            crate::logger::log_warning(&format!(
                "{:?} Gunner: ignored transition Death → {:?}",
                ctx.entity, next
            ));
            return;
        }

        self.started = true;
        self.exit(previous, ctx);
        self.state = next;
        crate::logger::log(&format!("{:?} Gunner: {:?} → {:?}", ctx.entity, previous, next));
        self.enter(next, ctx);
    }

    fn enter(&mut self, state: GunnerState, ctx: &mut BrainContext) {
        match state {
            GunnerState::Idle => self.enter_idle(),
            GunnerState::Alert => self.enter_alert(),
            GunnerState::Shoot => self.enter_shoot(),
            GunnerState::Suppress => self.enter_suppress(),
            GunnerState::OverheatAndReload => self.enter_overheat(ctx),
            GunnerState::Death => {}
        }
    }

    fn exit(&mut self, state: GunnerState, ctx: &mut BrainContext) {
        match state {
            GunnerState::Shoot => self.exit_shoot(),
            GunnerState::OverheatAndReload => self.exit_overheat(ctx),
            GunnerState::Idle | GunnerState::Alert | GunnerState::Suppress | GunnerState::Death => {}
        }
    }

    pub fn readout(&self) -> BrainReadout {
        BrainReadout {
            archetype: Archetype::MachineGunner,
            state: self.state.logical(),
            is_reloading: self.magazine.is_reloading(),
            has_line_of_sight: self.has_line_of_sight,
            is_idle_alert: false,
            is_recover_returning: false,
            is_overheated: self.heat.is_overheated(),
            is_dead: self.state == GunnerState::Death,
        }
    }
}
