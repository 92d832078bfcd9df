//! Resource trackers AI: магазин, гранаты, нагрев, отменяемые таймеры
//!
//! Все отложенные действия (reload, cooldown loop) - явный elapsed счётчик,
//! который brain опрашивает каждый тик. Отмена = поднять generation.

use bevy::prelude::*;

/// Отменяемое отложенное действие
///
/// `generation` растёт при каждом start/cancel: старый "тикет" больше
/// не может завершиться в новом, несвязанном состоянии.
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct TimedAction {
    duration: f32,
    elapsed: f32,
    active: bool,
    generation: u32,
}

impl TimedAction {
    /// Запуск (перезапуск) действия
    pub fn start(&mut self, duration: f32) -> u32 {
        self.duration = duration.max(0.0);
        self.elapsed = 0.0;
        self.active = true;
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    /// Продвинуть таймер. true - действие завершилось на этом тике.
    pub fn poll(&mut self, delta: f32) -> bool {
        if !self.active {
            return false;
        }
        self.elapsed += delta;
        if self.elapsed >= self.duration {
            self.active = false;
            return true;
        }
        false
    }

    /// Отмена. Если действие уже завершено - no-op (возвращает false).
    pub fn cancel(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.generation = self.generation.wrapping_add(1);
        true
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Тикет всё ещё актуален (не отменён и не перезапущен)
    pub fn is_current(&self, ticket: u32) -> bool {
        self.active && self.generation == ticket
    }

    pub fn remaining(&self) -> f32 {
        if self.active {
            (self.duration - self.elapsed).max(0.0)
        } else {
            0.0
        }
    }
}

/// Магазин: патроны + перезарядка
///
/// Инвариант: 0 ≤ rounds ≤ capacity, одновременно не больше одной перезарядки.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Magazine {
    rounds: u32,
    capacity: u32,
    reload: TimedAction,
}

impl Magazine {
    pub fn full(capacity: u32) -> Self {
        Self {
            rounds: capacity,
            capacity,
            reload: TimedAction::default(),
        }
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.rounds == 0
    }

    pub fn is_full(&self) -> bool {
        self.rounds == self.capacity
    }

    pub fn is_reloading(&self) -> bool {
        self.reload.is_active()
    }

    /// Списать один патрон. false - стрелять нечем (пусто или перезарядка).
    pub fn consume(&mut self) -> bool {
        if self.rounds == 0 || self.is_reloading() {
            return false;
        }
        self.rounds -= 1;
        true
    }

    /// Сбросить магазин в 0 (перегрев пулемёта)
    pub fn dump(&mut self) {
        self.rounds = 0;
    }

    /// Начать перезарядку. false - уже идёт (повторная не стартует).
    pub fn start_reload(&mut self, duration: f32) -> bool {
        if self.is_reloading() {
            return false;
        }
        self.reload.start(duration);
        true
    }

    /// Продвинуть перезарядку. true - магазин только что заполнен.
    pub fn poll_reload(&mut self, delta: f32) -> bool {
        if self.reload.poll(delta) {
            self.rounds = self.capacity;
            return true;
        }
        false
    }

    /// Прервать перезарядку (патроны не меняются)
    pub fn cancel_reload(&mut self) -> bool {
        self.reload.cancel()
    }
}

/// Запас гранат
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct GrenadePouch {
    count: u32,
    capacity: u32,
}

impl GrenadePouch {
    pub fn full(capacity: u32) -> Self {
        Self {
            count: capacity,
            capacity,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn has_any(&self) -> bool {
        self.count > 0
    }

    pub fn take(&mut self) -> bool {
        if self.count == 0 {
            return false;
        }
        self.count -= 1;
        true
    }
}

/// Нагрев ствола пулемёта
///
/// Инвариант: 0 ≤ heat ≤ threshold. Растёт только от выстрелов,
/// падает только в режиме охлаждения.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct HeatGauge {
    heat: f32,
    threshold: f32,
    overheated: bool,
}

impl HeatGauge {
    pub fn new(threshold: f32) -> Self {
        Self {
            heat: 0.0,
            threshold: threshold.max(0.0),
            overheated: false,
        }
    }

    pub fn heat(&self) -> f32 {
        self.heat
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn is_overheated(&self) -> bool {
        self.overheated
    }

    /// Добавить нагрев. true - порог достигнут (ствол перегрет).
    pub fn add(&mut self, amount: f32) -> bool {
        self.heat = (self.heat + amount.max(0.0)).min(self.threshold);
        if self.heat >= self.threshold {
            self.overheated = true;
        }
        self.overheated
    }

    /// Войти в режим охлаждения (и при неполном нагреве)
    pub fn begin_cooling(&mut self) {
        self.overheated = true;
    }

    /// Охлаждение за тик. Только в режиме перегрева.
    pub fn cool(&mut self, rate: f32, delta: f32) {
        if !self.overheated {
            return;
        }
        self.heat = (self.heat - rate * delta).max(0.0);
    }

    pub fn is_cold(&self) -> bool {
        self.heat <= 0.0
    }

    pub fn clear_overheat(&mut self) {
        self.overheated = false;
    }
}
