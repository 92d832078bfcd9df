//! Tactical layer - контракт физики/навигации host движка
//!
//! HYBRID ARCHITECTURE:
//! - ECS (strategic): AI решения, ресурсы, таймеры
//! - Tactical (engine): raycast, overlap, navmesh sampling, движение агентов
//!
//! AI brains видят tactical layer только через `TacticalQueries`.
//! `HeadlessTactics` - реализация для headless симуляции и тестов.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub mod headless;
pub mod navigation;

pub use headless::{rebuild_headless_tactics, HeadlessTactics};
pub use navigation::advance_nav_agents;

/// Битовая маска слоёв коллизий
///
/// - TARGETS: игрок и прочие цели AI
/// - ENEMIES: AI-контролируемые акторы
/// - ENVIRONMENT: стены, укрытия, рельеф
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const TARGETS: LayerMask = LayerMask(0b10);
    pub const ENEMIES: LayerMask = LayerMask(0b100);
    pub const ENVIRONMENT: LayerMask = LayerMask(0b1000);

    /// Mask: LOS raycast (цели + окружение, свои не мешают)
    pub const LINE_OF_SIGHT: LayerMask = LayerMask(Self::TARGETS.0 | Self::ENVIRONMENT.0);

    pub fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for LayerMask {
    type Output = LayerMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        LayerMask(self.0 | rhs.0)
    }
}

/// Результат raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Коллайдер в который попали
    pub entity: Entity,
    /// Корневая entity коллайдера (сам коллайдер если owner нет)
    pub root: Entity,
    /// Слой задетого коллайдера
    pub layer: LayerMask,
    pub distance: f32,
    pub point: Vec3,
}

/// Запросы к tactical layer (physics + navigation provider)
pub trait TacticalQueries {
    /// Ближайшее попадание луча по слоям `mask` (None - ничего не задето)
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: LayerMask) -> Option<RayHit>;

    /// Корневые entity коллайдеров `mask` внутри сферы
    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> Vec<Entity>;

    /// Ближайшая навигабельная точка в радиусе `max_distance`
    fn sample_navmesh(&self, point: Vec3, max_distance: f32) -> Option<Vec3>;
}
