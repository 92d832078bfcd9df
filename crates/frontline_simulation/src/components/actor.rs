//! Базовые компоненты акторов: Health, Targetable, EnemyUnit

use bevy::prelude::*;

/// Здоровье актора
///
/// Инвариант: 0 ≤ current ≤ max
/// Мёртвого актора нельзя ни лечить, ни ранить повторно.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Health {
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    /// Урон (clamp в 0). Возвращает реально снятое количество.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        if !self.is_alive() || amount <= 0.0 {
            return 0.0;
        }
        let before = self.current;
        self.current = (self.current - amount).max(0.0);
        before - self.current
    }

    /// Лечение (clamp в max). Мёртвых не лечим.
    pub fn heal(&mut self, amount: f32) {
        if !self.is_alive() || amount <= 0.0 {
            return;
        }
        self.current = (self.current + amount).min(self.max);
    }

    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            self.current / self.max
        }
    }
}

/// Маркер: валидная цель для AI perception (игрок)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Targetable;

/// Маркер: AI-контролируемый враг (учитывается в EnemyRoster)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct EnemyUnit;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_damage() {
        let mut health = Health::new(100.0);
        assert_eq!(health.current, 100.0);

        assert_eq!(health.take_damage(30.0), 30.0);
        assert_eq!(health.current, 70.0);
        assert!(health.is_alive());

        assert_eq!(health.take_damage(100.0), 70.0); // Clamp в 0
        assert_eq!(health.current, 0.0);
        assert!(!health.is_alive());

        // Мёртвому урон не наносится
        assert_eq!(health.take_damage(5.0), 0.0);
    }

    #[test]
    fn test_health_heal() {
        let mut health = Health::new(100.0);
        health.take_damage(50.0);

        health.heal(30.0);
        assert_eq!(health.current, 80.0);

        health.heal(100.0); // Clamp в max
        assert_eq!(health.current, 100.0);
        assert!(health.is_full());
    }

    #[test]
    fn test_dead_cannot_heal() {
        let mut health = Health::new(10.0);
        health.take_damage(10.0);
        health.heal(5.0);
        assert_eq!(health.current, 0.0);
        assert_eq!(health.fraction(), 0.0);
    }
}
