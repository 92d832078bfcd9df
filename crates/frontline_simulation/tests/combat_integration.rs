//! Combat integration test
//!
//! Headless App + SimulationPlugin, тик за тиком:
//! - patrol soldier: Alert → Follow → Shoot, анимации по смене состояния
//! - пулемётчик: перегрев → OverheatAndReload → снова Shoot
//! - пули: hit-scan попадания снимают Health цели
//! - миномёт: навесной выстрел, взрыв, урон по цели
//! - смерть врагов: Dead, EntityDied, roster, деспавн после grace периода

use bevy::prelude::*;
use frontline_simulation::*;

/// Всё, что симуляция отправила наружу
#[derive(Resource, Default)]
struct Collected {
    shots: Vec<ShotFired>,
    cues: Vec<PresentationCue>,
    deaths: Vec<EntityDied>,
    damage: Vec<DamageDealt>,
    explosions: Vec<OrdnanceExploded>,
    defeated: usize,
    cleared: Vec<EncounterGroupCleared>,
}

#[allow(clippy::too_many_arguments)]
fn collect_events(
    mut collected: ResMut<Collected>,
    mut shots: EventReader<ShotFired>,
    mut cues: EventReader<PresentationCue>,
    mut deaths: EventReader<EntityDied>,
    mut damage: EventReader<DamageDealt>,
    mut explosions: EventReader<OrdnanceExploded>,
    mut defeated: EventReader<AllEnemiesDefeated>,
    mut cleared: EventReader<EncounterGroupCleared>,
) {
    collected.shots.extend(shots.read().copied());
    collected.cues.extend(cues.read().cloned());
    collected.deaths.extend(deaths.read().copied());
    collected.damage.extend(damage.read().copied());
    collected.explosions.extend(explosions.read().cloned());
    collected.defeated += defeated.read().count();
    collected.cleared.extend(cleared.read().copied());
}

/// Helper: создать полный combat App с всеми plugins
fn create_combat_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin)
        .init_resource::<Collected>()
        .add_systems(Last, collect_events);
    app
}

fn readout(app: &App, entity: Entity) -> BrainReadout {
    *app.world().get::<BrainReadout>(entity).expect("brain readout")
}

fn animation_keys(app: &App, entity: Entity) -> Vec<AnimationKey> {
    app.world()
        .resource::<Collected>()
        .cues
        .iter()
        .filter_map(|cue| match cue {
            PresentationCue::PlayAnimation { entity: e, key } if *e == entity => Some(*key),
            _ => None,
        })
        .collect()
}

/// `expected` встречается в `seen` как подпоследовательность
fn contains_in_order<T: PartialEq>(seen: &[T], expected: &[T]) -> bool {
    let mut rest = expected.iter().peekable();
    for item in seen {
        if rest.peek() == Some(&item) {
            rest.next();
        }
    }
    rest.peek().is_none()
}

/// Прогнать тики, записывая смены логического состояния
fn record_states(app: &mut App, entity: Entity, ticks: usize) -> Vec<LogicalState> {
    let mut states = vec![readout(app, entity).state];
    for _ in 0..ticks {
        app.update();
        let state = readout(app, entity).state;
        if states.last() != Some(&state) {
            states.push(state);
        }
    }
    states
}

#[test]
fn test_patrol_enemy_closes_in_and_shoots() {
    let mut app = create_combat_app(42);
    let (patrol, target) = {
        let mut commands = app.world_mut().commands();
        let patrol = spawn_patrol_enemy(&mut commands, Vec3::new(0.0, 0.0, -12.0), PatrolConfig::default());
        let target = spawn_target(&mut commands, Vec3::ZERO);
        (patrol, target)
    };

    app.world_mut().flush();
    let states = record_states(&mut app, patrol, 420);

    assert!(
        contains_in_order(&states, &[LogicalState::Alert, LogicalState::Follow, LogicalState::Shoot]),
        "states: {:?}",
        states
    );
    assert_eq!(readout(&app, patrol).state, LogicalState::Shoot);

    // Держит дистанцию ~0.8 * attack range
    let position = app.world().get::<Transform>(patrol).unwrap().translation;
    let distance = position.distance(Vec3::ZERO);
    assert!(distance < 8.0 && distance > 5.0, "distance {}", distance);

    let collected = app.world().resource::<Collected>();
    assert!(collected.shots.len() >= 3, "{} shots", collected.shots.len());
    assert!(collected.shots.iter().all(|shot| shot.shooter == patrol && !shot.suppressive));

    // Каждое попадание - DamageDealt и звук крови
    let hits: Vec<&DamageDealt> = collected.damage.iter().filter(|event| event.target == target).collect();
    assert!(!hits.is_empty());
    assert!(hits.iter().all(|event| event.attacker == patrol));
    let blood = collected
        .cues
        .iter()
        .filter(|cue| matches!(cue, PresentationCue::PlaySound { sound: SoundKey::BloodHit, .. }))
        .count();
    assert!(blood >= 1);
    let total: f32 = hits.iter().map(|event| event.amount).sum();
    let health = app.world().get::<Health>(target).unwrap().current;
    assert!((health - (TARGET_HEALTH - total)).abs() < 1e-3, "health {} after {} damage", health, total);
    assert!(health > 0.0);

    let keys = animation_keys(&app, patrol);
    assert!(
        contains_in_order(&keys, &[AnimationKey::Alert, AnimationKey::Run, AnimationKey::Shoot]),
        "keys: {:?}",
        keys
    );
    // PlayAnimation только на смене ключа
    assert!(keys.windows(2).all(|pair| pair[0] != pair[1]));
}

#[test]
fn test_patrol_enemy_without_line_of_sight_holds_alert() {
    let mut app = create_combat_app(7);
    let patrol = {
        let mut commands = app.world_mut().commands();
        let patrol = spawn_patrol_enemy(&mut commands, Vec3::new(0.0, 0.0, -7.0), PatrolConfig::default());
        spawn_target(&mut commands, Vec3::ZERO);
        // Стена между ними, выше глаз
        spawn_obstacle(&mut commands, Vec3::new(0.0, 1.5, -3.5), Vec3::new(3.0, 1.5, 0.25));
        patrol
    };

    // Без LOS alert countdown не идёт: в Follow не переходим
    app.world_mut().flush();
    let states = record_states(&mut app, patrol, 240);
    assert_eq!(states, vec![LogicalState::Idle, LogicalState::Alert], "states: {:?}", states);
    assert!(!readout(&app, patrol).has_line_of_sight);
    assert!(app.world().resource::<Collected>().shots.is_empty());
}

#[test]
fn test_machine_gunner_overheats_and_returns_to_shoot() {
    let mut app = create_combat_app(42);
    let gunner = {
        let mut commands = app.world_mut().commands();
        // Yaw 180° - лицом к цели
        let gunner = spawn_machine_gunner(&mut commands, Vec3::new(0.0, 0.0, -5.0), 180.0, GunnerConfig::default());
        spawn_target(&mut commands, Vec3::ZERO);
        gunner
    };

    app.world_mut().flush();
    let mut states = vec![readout(&app, gunner).state];
    let mut saw_overheated_flag = false;
    for _ in 0..540 {
        app.update();
        let current = readout(&app, gunner);
        saw_overheated_flag |= current.is_overheated;
        if states.last() != Some(&current.state) {
            states.push(current.state);
        }
    }

    assert!(
        contains_in_order(
            &states,
            &[
                LogicalState::Alert,
                LogicalState::Shoot,
                LogicalState::OverheatAndReload,
                LogicalState::Shoot,
            ]
        ),
        "states: {:?}",
        states
    );
    assert!(saw_overheated_flag);

    let collected = app.world().resource::<Collected>();
    // Первая очередь - ровно overheat_threshold выстрелов, потом перезарядка и ещё
    assert!(collected.shots.len() > 10, "{} shots", collected.shots.len());
    assert!(collected.shots.iter().all(|shot| shot.shooter == gunner));

    let gunshots = collected
        .cues
        .iter()
        .filter(|cue| matches!(cue, PresentationCue::PlaySound { sound: SoundKey::GunShot, .. }))
        .count();
    assert_eq!(gunshots, collected.shots.len());
}

#[test]
fn test_machine_gunner_fire_damages_target() {
    let mut app = create_combat_app(42);
    let (gunner, target) = {
        let mut commands = app.world_mut().commands();
        let gunner = spawn_machine_gunner(&mut commands, Vec3::new(0.0, 0.0, -6.0), 180.0, GunnerConfig::default());
        let target = spawn_target(&mut commands, Vec3::ZERO);
        (gunner, target)
    };

    run_ticks(&mut app, 300);

    let collected = app.world().resource::<Collected>();
    assert!(!collected.shots.is_empty());

    let hits: Vec<&DamageDealt> = collected
        .damage
        .iter()
        .filter(|event| event.attacker == gunner && event.target == target)
        .collect();
    assert!(!hits.is_empty(), "{} shots, no hits", collected.shots.len());
    // Разброс sweep может увести часть пуль мимо
    assert!(hits.len() <= collected.shots.len());
    assert!(hits.iter().all(|event| event.amount == BulletConfig::default().damage));

    let blood = collected
        .cues
        .iter()
        .filter(|cue| matches!(cue, PresentationCue::PlaySound { sound: SoundKey::BloodHit, .. }))
        .count();
    assert_eq!(blood, hits.len());

    let total: f32 = hits.iter().map(|event| event.amount).sum();
    let health = app.world().get::<Health>(target).unwrap().current;
    assert!(health < TARGET_HEALTH);
    assert!((health - (TARGET_HEALTH - total)).abs() < 1e-3, "health {} after {} damage", health, total);
}

#[test]
fn test_mortar_shell_lands_on_target() {
    let mut app = create_combat_app(42);
    let (mortar, target) = {
        let mut commands = app.world_mut().commands();
        let mortar = spawn_mortar(&mut commands, Vec3::new(0.0, 0.0, -40.0), 180.0, MortarConfig::default());
        let target = spawn_target(&mut commands, Vec3::ZERO);
        (mortar, target)
    };

    // 2s заряжания + ~3s полёта
    run_ticks(&mut app, 420);

    assert_eq!(readout(&app, mortar).state, LogicalState::Firing);
    assert_eq!(app.world().get::<MortarBrain>(mortar).unwrap().shells_fired(), 1);

    let collected = app.world().resource::<Collected>();
    assert_eq!(collected.explosions.len(), 1);
    let explosion = &collected.explosions[0];
    assert_eq!(explosion.kind, OrdnanceKind::MortarShell);
    assert_eq!(explosion.source, mortar);
    assert!(explosion.position.distance(Vec3::ZERO) < 2.0, "landed at {:?}", explosion.position);
    assert_eq!(explosion.victims, vec![target]);

    let default_damage = OrdnanceConfig::default().shell_damage;
    assert_eq!(collected.damage.len(), 1);
    assert_eq!(collected.damage[0].attacker, mortar);
    assert_eq!(collected.damage[0].amount, default_damage);
    assert_eq!(
        app.world().get::<Health>(target).unwrap().current,
        TARGET_HEALTH - default_damage
    );

    // Снаряд удалён после взрыва
    let mut shells = app.world_mut().query::<&Ordnance>();
    assert_eq!(shells.iter(app.world()).count(), 0);
}

#[test]
fn test_enemy_deaths_update_roster_and_despawn() {
    let mut app = create_combat_app(42);
    let (patrol, gunner, mortar) = {
        let mut commands = app.world_mut().commands();
        let patrol = spawn_patrol_enemy(&mut commands, Vec3::new(0.0, 0.0, -10.0), PatrolConfig::default());
        let gunner = spawn_machine_gunner(&mut commands, Vec3::new(10.0, 0.0, -10.0), 0.0, GunnerConfig::default());
        let mortar = spawn_mortar(&mut commands, Vec3::new(-10.0, 0.0, -10.0), 0.0, MortarConfig::default());
        assign_encounter_group(&mut commands, patrol, EncounterGroup(1));
        assign_encounter_group(&mut commands, gunner, EncounterGroup(1));
        (patrol, gunner, mortar)
    };

    run_ticks(&mut app, 5);
    assert_eq!(app.world().resource::<EnemyRoster>().alive(), 3);

    for enemy in [patrol, gunner] {
        app.world_mut().get_mut::<Health>(enemy).unwrap().take_damage(1_000.0);
    }
    run_ticks(&mut app, 2);

    for enemy in [patrol, gunner] {
        assert!(app.world().get::<Dead>(enemy).is_some());
        let current = readout(&app, enemy);
        assert!(current.is_dead);
        assert_eq!(current.state, LogicalState::Death);
    }
    {
        let collected = app.world().resource::<Collected>();
        assert_eq!(collected.deaths.len(), 2);
        assert!(collected.deaths.iter().all(|death| death.was_enemy));
        assert_eq!(collected.cleared, vec![EncounterGroupCleared { group: EncounterGroup(1) }]);
        assert_eq!(collected.defeated, 0);
    }
    assert_eq!(app.world().resource::<EnemyRoster>().alive(), 1);

    app.world_mut().get_mut::<Health>(mortar).unwrap().take_damage(1_000.0);
    run_ticks(&mut app, 2);
    assert_eq!(readout(&app, mortar).state, LogicalState::Death);
    assert_eq!(app.world().resource::<Collected>().defeated, 1);
    assert_eq!(app.world().resource::<EnemyRoster>().alive(), 0);

    // Grace период 3.2s, потом деспавн
    run_ticks(&mut app, 120);
    assert!(app.world().get_entity(patrol).is_ok());
    run_ticks(&mut app, 100);
    for enemy in [patrol, gunner, mortar] {
        assert!(app.world().get_entity(enemy).is_err(), "{:?} still alive", enemy);
    }
}

#[test]
fn test_resource_invariants_hold_in_full_battle() {
    let mut app = create_combat_app(123);
    let (patrol, gunner) = {
        let mut commands = app.world_mut().commands();
        let patrol = spawn_patrol_enemy(&mut commands, Vec3::new(-4.0, 0.0, -10.0), PatrolConfig::default());
        let gunner = spawn_machine_gunner(&mut commands, Vec3::new(4.0, 0.0, -10.0), 180.0, GunnerConfig::default());
        spawn_mortar(&mut commands, Vec3::new(0.0, 0.0, -45.0), 180.0, MortarConfig::default());
        spawn_target(&mut commands, Vec3::ZERO);
        (patrol, gunner)
    };

    for tick in 0..900 {
        app.update();
        let world = app.world();

        if let Some(brain) = world.get::<PatrolBrain>(patrol) {
            assert!(brain.magazine().rounds() <= brain.magazine().capacity(), "tick {}", tick);
            assert!(brain.grenades().count() <= brain.grenades().capacity(), "tick {}", tick);
        }
        if let Some(brain) = world.get::<GunnerBrain>(gunner) {
            assert!(brain.magazine().rounds() <= brain.magazine().capacity(), "tick {}", tick);
            assert!(brain.heat().heat() >= 0.0 && brain.heat().heat() <= brain.heat().threshold(), "tick {}", tick);
        }
        let mut healths = app.world_mut().query::<&Health>();
        for health in healths.iter(app.world()) {
            assert!(health.current >= 0.0 && health.current <= health.max, "tick {}", tick);
        }
    }

    log("✓ Full battle: 900 ticks, all invariants held");
}
