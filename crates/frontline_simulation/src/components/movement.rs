//! Movement компоненты: навигационный агент

use bevy::prelude::*;

/// Навигационный агент (контракт NavMeshAgent host движка)
///
/// Архитектура:
/// - AI brain пишет intent: `set_destination`, `is_stopped`, `reset_path`
/// - Navigation step (headless или engine bridge) резолвит путь и двигает Transform
/// - AI читает `path_pending` / `has_path` / `remaining_distance` на следующем тике
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct NavAgent {
    /// Текущая цель (None - пути нет)
    pub destination: Option<Vec3>,
    /// Агент стоит (путь сохраняется)
    pub is_stopped: bool,
    /// Путь запрошен, но ещё не посчитан
    pub path_pending: bool,
    /// Путь посчитан и валиден
    pub has_path: bool,
    /// Остаток пути (метры)
    pub remaining_distance: f32,
    /// Дистанция при которой цель считается достигнутой
    pub stopping_distance: f32,
    /// Скорость (м/с)
    pub speed: f32,
    /// Текущая скорость (для presentation layer)
    pub velocity: Vec3,
}

impl Default for NavAgent {
    fn default() -> Self {
        Self::new(3.5)
    }
}

impl NavAgent {
    pub fn new(speed: f32) -> Self {
        Self {
            destination: None,
            is_stopped: false,
            path_pending: false,
            has_path: false,
            remaining_distance: 0.0,
            stopping_distance: 0.5,
            speed,
            velocity: Vec3::ZERO,
        }
    }

    /// Запросить путь к точке (посчитается на navigation step)
    pub fn set_destination(&mut self, target: Vec3) {
        self.destination = Some(target);
        self.path_pending = true;
    }

    /// Сбросить путь
    pub fn reset_path(&mut self) {
        self.destination = None;
        self.path_pending = false;
        self.has_path = false;
        self.remaining_distance = 0.0;
    }

    /// Остановиться немедленно (сбросить velocity)
    pub fn halt(&mut self) {
        self.is_stopped = true;
        self.velocity = Vec3::ZERO;
    }

    /// Цель достигнута (путь посчитан и остаток в пределах stopping distance)
    pub fn has_arrived(&self) -> bool {
        !self.path_pending && self.remaining_distance <= self.stopping_distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_destination_marks_pending() {
        let mut agent = NavAgent::default();
        agent.set_destination(Vec3::new(4.0, 0.0, 0.0));

        assert!(agent.path_pending);
        assert!(!agent.has_arrived());
    }

    #[test]
    fn test_reset_path_clears_destination() {
        let mut agent = NavAgent::default();
        agent.set_destination(Vec3::X);
        agent.reset_path();

        assert_eq!(agent.destination, None);
        assert!(!agent.has_path);
        assert!(agent.has_arrived());
    }

    #[test]
    fn test_halt_zeroes_velocity() {
        let mut agent = NavAgent::default();
        agent.velocity = Vec3::new(1.0, 0.0, 0.0);
        agent.halt();

        assert!(agent.is_stopped);
        assert_eq!(agent.velocity, Vec3::ZERO);
    }
}
