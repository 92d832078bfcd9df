//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: здоровье и маркеры (Health, Targetable, EnemyUnit)
//! - movement: навигационный агент (NavAgent)
//! - world: коллайдеры и навигационная область (Collider, NavMeshArea)

pub mod actor;
pub mod movement;
pub mod world;

// Re-exports для удобного импорта
pub use actor::*;
pub use movement::*;
pub use world::*;
