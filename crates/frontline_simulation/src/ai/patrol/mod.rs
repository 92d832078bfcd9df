//! Patrol soldier - пеший враг с патрулированием, стрельбой и гранатами
//!
//! Состояния: Idle → Alert → Follow → Shoot ⇄ GrenadeThrow, Recovery, Death.
//! Master guard (до update активного состояния):
//! - health ≤ 0 → Death (терминальное)
//! - health < recovery_threshold и не в Recovery → Recovery

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use crate::ai::context::{Archetype, BrainContext, BrainReadout, LogicalState};
use crate::ai::resources::{GrenadePouch, Magazine};
use crate::components::NavAgent;

pub mod states;


use states::{AlertScratch, GrenadeScratch, IdleScratch, RecoveryScratch, ShootScratch};

/// Состояния patrol soldier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum PatrolState {
    #[default]
    Idle,
    Alert,
    Follow,
    Shoot,
    GrenadeThrow,
    Recovery,
    Death,
}

impl PatrolState {
    pub fn logical(self) -> LogicalState {
        match self {
            PatrolState::Idle => LogicalState::Idle,
            PatrolState::Alert => LogicalState::Alert,
            PatrolState::Follow => LogicalState::Follow,
            PatrolState::Shoot => LogicalState::Shoot,
            PatrolState::GrenadeThrow => LogicalState::GrenadeThrow,
            PatrolState::Recovery => LogicalState::Recovery,
            PatrolState::Death => LogicalState::Death,
        }
    }
}

/// Тюнинг patrol soldier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolConfig {
    /// Радиус патрулирования вокруг anchor
    pub patrol_range: f32,
    pub detection_range: f32,
    pub attack_range: f32,
    pub max_ammo: u32,
    pub reload_time: f32,
    pub max_grenades: u32,
    pub grenade_cooldown: f32,
    /// Интервал между выстрелами (секунды)
    pub fire_interval: f32,
    /// Сколько секунд непрерывного LOS нужно для Alert → Follow
    pub alert_countdown: f32,
    /// Пауза на точке патруля
    pub patrol_wait: f32,
    pub recovery_threshold: f32,
    /// Лечение в секунду во время Recovery
    pub recovery_rate: f32,
    pub heal_interval: f32,
    pub move_speed: f32,
    /// Дуло (локальные координаты), из него же LOS
    pub fire_point: [f32; 3],
    pub grenade_point: [f32; 3],
    pub grenade_force_per_meter: f32,
    pub grenade_force_min: f32,
    pub grenade_force_max: f32,
    /// Вертикальная добавка к направлению броска
    pub grenade_lift: f32,
    pub grenade_mass: f32,
}

impl Default for PatrolConfig {
    fn default() -> Self {
        Self {
            patrol_range: 10.0,
            detection_range: 15.0,
            attack_range: 8.0,
            max_ammo: 30,
            reload_time: 2.0,
            max_grenades: 3,
            grenade_cooldown: 5.0,
            fire_interval: 0.5,
            alert_countdown: 1.6,
            patrol_wait: 3.0,
            recovery_threshold: 30.0,
            recovery_rate: 10.0,
            heal_interval: 0.5,
            move_speed: 3.5,
            fire_point: [0.0, 1.4, -0.6],
            grenade_point: [0.3, 1.6, -0.3],
            grenade_force_per_meter: 2.0,
            grenade_force_min: 10.0,
            grenade_force_max: 20.0,
            grenade_lift: 0.5,
            grenade_mass: 1.0,
        }
    }
}

impl PatrolConfig {
    pub fn fire_point(&self) -> Vec3 {
        Vec3::from_array(self.fire_point)
    }

    pub fn grenade_point(&self) -> Vec3 {
        Vec3::from_array(self.grenade_point)
    }
}

/// Brain patrol soldier (state machine host)
///
/// Владеет состоянием, ресурсами и scratch-данными каждого состояния.
/// Transition атомарен: exit старого → смена → enter нового.
#[derive(Component, Debug, Clone)]
pub struct PatrolBrain {
    pub config: PatrolConfig,
    anchor: Vec3,
    state: PatrolState,
    started: bool,
    magazine: Magazine,
    grenades: GrenadePouch,
    has_line_of_sight: bool,
    is_idle_alert: bool,
    is_recover_returning: bool,
    idle: IdleScratch,
    alert: AlertScratch,
    shoot: ShootScratch,
    grenade: GrenadeScratch,
    recovery: RecoveryScratch,
}

impl PatrolBrain {
    /// `anchor` - точка спавна (центр патруля, туда же возврат на Recovery)
    pub fn new(config: PatrolConfig, anchor: Vec3) -> Self {
        Self {
            magazine: Magazine::full(config.max_ammo),
            grenades: GrenadePouch::full(config.max_grenades),
            config,
            anchor,
            state: PatrolState::Idle,
            started: false,
            has_line_of_sight: false,
            is_idle_alert: false,
            is_recover_returning: false,
            idle: IdleScratch::default(),
            alert: AlertScratch::default(),
            shoot: ShootScratch::default(),
            grenade: GrenadeScratch::default(),
            recovery: RecoveryScratch::default(),
        }
    }

    pub fn state(&self) -> PatrolState {
        self.state
    }

    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    pub fn magazine(&self) -> &Magazine {
        &self.magazine
    }

    pub fn grenades(&self) -> &GrenadePouch {
        &self.grenades
    }

    pub fn alert_timer(&self) -> f32 {
        self.alert.timer
    }

    pub fn is_idle_alert(&self) -> bool {
        self.is_idle_alert
    }

    pub fn is_recover_returning(&self) -> bool {
        self.is_recover_returning
    }

    /// Один тик: (первый тик - enter Idle) → master guard → update активного состояния
    pub fn tick(&mut self, ctx: &mut BrainContext, agent: &mut NavAgent) {
        if !self.started {
            self.started = true;
            self.enter(PatrolState::Idle, ctx, agent);
        }

        self.has_line_of_sight = ctx.perception.target.is_some() && ctx.perception.has_line_of_sight;

        if let Some(forced) = self.master_guard(ctx) {
            self.change_state(forced, ctx, agent);
            return;
        }

        let next = match self.state {
            PatrolState::Idle => self.update_idle(ctx, agent),
            PatrolState::Alert => self.update_alert(ctx, agent),
            PatrolState::Follow => self.update_follow(ctx, agent),
            PatrolState::Shoot => self.update_shoot(ctx, agent),
            PatrolState::GrenadeThrow => self.update_grenade_throw(ctx, agent),
            PatrolState::Recovery => self.update_recovery(ctx, agent),
            PatrolState::Death => None,
        };

        if let Some(next) = next {
            self.change_state(next, ctx, agent);
        }
    }

    /// Проверки поверх state machine (приоритетнее переходов состояний)
    fn master_guard(&self, ctx: &BrainContext) -> Option<PatrolState> {
        if self.state == PatrolState::Death {
            return None;
        }
        if !ctx.health.is_alive() {
            return Some(PatrolState::Death);
        }
        if ctx.health.current < self.config.recovery_threshold && self.state != PatrolState::Recovery {
            return Some(PatrolState::Recovery);
        }
        None
    }

    /// Атомарная смена состояния. Из Death выхода нет.
    pub fn change_state(&mut self, next: PatrolState, ctx: &mut BrainContext, agent: &mut NavAgent) {
        let previous = self.state;
        if previous == PatrolState::Death {
            crate::logger::log_warning(&format!(
                "{:?} Patrol: ignored transition Death → {:?}",
                ctx.entity, next
            ));
            return;
        }

        self.started = true;
        self.exit(previous, ctx, agent);
        self.state = next;
        crate::logger::log(&format!("{:?} Patrol: {:?} → {:?}", ctx.entity, previous, next));
        self.enter(next, ctx, agent);
    }

    fn enter(&mut self, state: PatrolState, ctx: &mut BrainContext, agent: &mut NavAgent) {
        match state {
            PatrolState::Idle => self.enter_idle(ctx, agent),
            PatrolState::Alert => self.enter_alert(agent),
            PatrolState::Follow => self.enter_follow(agent),
            PatrolState::Shoot => self.enter_shoot(),
            PatrolState::GrenadeThrow => self.enter_grenade_throw(ctx, agent),
            PatrolState::Recovery => self.enter_recovery(agent),
            PatrolState::Death => self.enter_death(agent),
        }
    }

    fn exit(&mut self, state: PatrolState, ctx: &mut BrainContext, agent: &mut NavAgent) {
        match state {
            PatrolState::Idle => self.exit_idle(),
            PatrolState::Alert | PatrolState::Follow => agent.is_stopped = false,
            PatrolState::Shoot => self.exit_shoot(ctx),
            PatrolState::GrenadeThrow => self.exit_grenade_throw(),
            PatrolState::Recovery => self.exit_recovery(agent),
            PatrolState::Death => {}
        }
    }

    pub fn readout(&self) -> BrainReadout {
        BrainReadout {
            archetype: Archetype::Patrol,
            state: self.state.logical(),
            is_reloading: self.magazine.is_reloading(),
            has_line_of_sight: self.has_line_of_sight,
            is_idle_alert: self.is_idle_alert,
            is_recover_returning: self.is_recover_returning,
            is_overheated: false,
            is_dead: self.state == PatrolState::Death,
        }
    }
}
