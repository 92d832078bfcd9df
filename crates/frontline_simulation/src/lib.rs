//! Frontline Simulation Core
//!
//! ECS-симуляция вражеского AI на Bevy 0.16 (strategic layer)
//!
//! HYBRID ARCHITECTURE:
//! - ECS = strategic layer (perception, state machines, ресурсы, combat rules)
//! - Host engine = tactical layer (physics, navigation, rendering) за `TacticalQueries`
//!
//! Headless режим: `HeadlessTactics` + прямолинейная навигация по `NavMeshArea`.

use std::time::Duration;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod logger;
pub mod perception;
pub mod presentation;
pub mod spawn;
pub mod tactical;

// Re-export базовых типов для удобства
pub use ai::{
    AIPlugin, Archetype, BrainReadout, GunnerBrain, GunnerConfig, GunnerState, LogicalState, MortarBrain,
    MortarConfig, MortarState, PatrolBrain, PatrolConfig, PatrolState,
};
pub use combat::{
    AllEnemiesDefeated, BulletConfig, CombatOutbox, CombatPlugin, DamageDealt, Dead, EncounterGroup, EncounterGroupCleared,
    EnemyRoster, EntityDied, Ordnance, OrdnanceConfig, OrdnanceExploded, OrdnanceKind, OrdnanceLaunched, ShotFired,
    ShotOutcome,
};
pub use components::*;
pub use config::{ConfigError, TuningFile};
pub use logger::{init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel, LogPrinter};
pub use perception::{Perception, Sensor, TargetFix};
pub use presentation::{AnimationKey, ParticleKey, PresentationCue, PresentationPlugin, SoundKey};
pub use spawn::*;
pub use tactical::{HeadlessTactics, LayerMask, RayHit, TacticalQueries};

/// Фиксированный шаг симуляции
pub const SIMULATION_HZ: f64 = 60.0;

/// Фазы тика (FixedUpdate), выполняются строго по порядку
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Снапшот коллайдеров/navmesh для tactical queries
    Snapshot,
    /// Поиск цели, дистанция, LOS
    Perception,
    /// Тики brains (patrol → gunner → mortar)
    Brains,
    /// CombatOutbox → события, AnimationKey
    Outbox,
    /// Смерти, roster, полёт ordnance
    Combat,
    /// Навигационный шаг агентов
    Movement,
    /// Деспавн по таймерам
    Cleanup,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Seed из create_headless_app не перетираем
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app
            // Fixed timestep 60Hz для simulation tick (легче считать интервалы)
            .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ))
            .init_resource::<NavMeshArea>()
            .init_resource::<HeadlessTactics>()
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Snapshot,
                    SimulationSet::Perception,
                    SimulationSet::Brains,
                    SimulationSet::Outbox,
                    SimulationSet::Combat,
                    SimulationSet::Movement,
                    SimulationSet::Cleanup,
                )
                    .chain(),
            )
            .add_systems(
                FixedUpdate,
                tactical::rebuild_headless_tactics.in_set(SimulationSet::Snapshot),
            )
            .add_systems(
                FixedUpdate,
                tactical::advance_nav_agents.in_set(SimulationSet::Movement),
            )
            // Подсистемы (ECS strategic layer)
            .add_plugins((PresentationPlugin, CombatPlugin, AIPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время ручное: каждый `app.update()` продвигает мир ровно на один fixed tick
/// (первый update только запускает часы).
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();

    let fixed = Time::<Fixed>::from_hz(SIMULATION_HZ);
    let step: Duration = fixed.timestep();

    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(fixed) // 60Hz FixedUpdate
        .insert_resource(TimeUpdateStrategy::ManualDuration(step));

    app
}

/// Прогнать `ticks` fixed тиков
pub fn run_ticks(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        app.update();
    }
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    // Собираем все компоненты в детерминированный формат
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
