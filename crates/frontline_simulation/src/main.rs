//! Headless симуляция Frontline
//!
//! Поле боя без рендера: patrol soldier, пулемётчик и миномёт против одной цели.
//! Первый аргумент - опциональный путь к tuning TOML.

use bevy::prelude::*;
use frontline_simulation::*;

const TICKS: usize = 1800;

fn main() {
    let seed = 42;
    init_logger();
    set_log_level(LogLevel::Info);
    log_info(&format!("Starting Frontline headless simulation (seed: {})", seed));

    let tuning = match std::env::args().nth(1) {
        Some(path) => match TuningFile::load(&path) {
            Ok(tuning) => tuning,
            Err(err) => {
                log_error(&format!("Failed to load tuning {}: {}", path, err));
                std::process::exit(1);
            }
        },
        None => TuningFile::default(),
    };

    let mut app = create_headless_app(seed);
    app.insert_resource(tuning.ordnance.clone())
        .insert_resource(tuning.bullets.clone())
        .add_plugins(SimulationPlugin);

    let (patrol, gunner, mortar) = {
        let world = app.world_mut();
        let mut commands = world.commands();
        let patrol = spawn_patrol_enemy(&mut commands, Vec3::new(-6.0, 0.0, -10.0), tuning.patrol.clone());
        let gunner = spawn_machine_gunner(&mut commands, Vec3::new(6.0, 0.0, -14.0), 0.0, tuning.gunner.clone());
        let mortar = spawn_mortar(&mut commands, Vec3::new(0.0, 0.0, -45.0), 0.0, tuning.mortar.clone());
        spawn_target(&mut commands, Vec3::ZERO);
        spawn_obstacle(&mut commands, Vec3::new(3.0, 1.0, -7.0), Vec3::new(1.0, 1.0, 0.5));
        (patrol, gunner, mortar)
    };

    for tick in 0..TICKS {
        app.update();

        if tick % 120 == 0 {
            let world = app.world();
            let describe = |entity: Entity| {
                world
                    .get::<BrainReadout>(entity)
                    .map(|readout| format!("{:?}", readout.state))
                    .unwrap_or_else(|| "despawned".to_string())
            };
            let alive = world.resource::<EnemyRoster>().alive();
            log_info(&format!(
                "Tick {}: patrol={} gunner={} mortar={} (enemies alive: {})",
                tick,
                describe(patrol),
                describe(gunner),
                describe(mortar),
                alive
            ));
        }
    }

    log_info("Simulation complete!");
}
