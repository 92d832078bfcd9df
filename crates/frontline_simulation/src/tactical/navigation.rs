//! Headless navigation step - движение NavAgent по прямой внутри NavMeshArea
//!
//! Engine bridge заменяет эту систему настоящим NavMesh агентом.
//! Контракт тот же: brain пишет intent, step резолвит путь и двигает Transform.

use bevy::prelude::*;
use crate::components::{NavAgent, NavMeshArea};

/// Резолв pending пути: цель вне navmesh → пути нет
pub fn resolve_path(agent: &mut NavAgent, position: Vec3, navmesh: &NavMeshArea) {
    if !agent.path_pending {
        return;
    }
    agent.path_pending = false;

    match agent.destination {
        Some(destination) if navmesh.contains(destination) => {
            agent.has_path = true;
            agent.remaining_distance = horizontal_distance(position, destination);
        }
        _ => {
            // Путь не построен - has_arrived() false, AI увидит !has_path
            agent.has_path = false;
            agent.remaining_distance = f32::INFINITY;
        }
    }
}

/// Один шаг движения агента (после резолва пути)
pub fn step_agent(agent: &mut NavAgent, transform: &mut Transform, delta: f32) {
    let Some(destination) = agent.destination else {
        agent.velocity = Vec3::ZERO;
        return;
    };
    if !agent.has_path {
        agent.velocity = Vec3::ZERO;
        return;
    }

    let position = transform.translation;
    let to_target = Vec3::new(destination.x - position.x, 0.0, destination.z - position.z);
    let distance = to_target.length();

    if agent.is_stopped || distance <= f32::EPSILON {
        agent.velocity = Vec3::ZERO;
        agent.remaining_distance = distance;
        return;
    }

    let direction = to_target / distance;
    let step = (agent.speed * delta).min(distance);
    transform.translation += direction * step;
    // NavMesh агент поворачивается по ходу движения
    transform.rotation = Transform::IDENTITY.looking_to(direction, Vec3::Y).rotation;

    agent.velocity = if delta > 0.0 { direction * (step / delta) } else { Vec3::ZERO };
    agent.remaining_distance = distance - step;
}

fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}

/// Система: продвинуть всех NavAgent на fixed timestep
pub fn advance_nav_agents(
    mut agents: Query<(&mut Transform, &mut NavAgent)>,
    navmesh: Res<NavMeshArea>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();
    for (mut transform, mut agent) in agents.iter_mut() {
        let position = transform.translation;
        resolve_path(&mut agent, position, &navmesh);
        step_agent(&mut agent, &mut transform, delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> NavMeshArea {
        NavMeshArea::new(Vec2::splat(-20.0), Vec2::splat(20.0))
    }

    #[test]
    fn test_resolve_path_inside_navmesh() {
        let mut agent = NavAgent::new(2.0);
        agent.set_destination(Vec3::new(6.0, 0.0, 8.0));
        resolve_path(&mut agent, Vec3::ZERO, &arena());

        assert!(!agent.path_pending);
        assert!(agent.has_path);
        assert!((agent.remaining_distance - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_resolve_path_off_navmesh_fails() {
        let mut agent = NavAgent::new(2.0);
        agent.set_destination(Vec3::new(100.0, 0.0, 0.0));
        resolve_path(&mut agent, Vec3::ZERO, &arena());

        assert!(!agent.has_path);
        assert!(!agent.has_arrived());
    }

    #[test]
    fn test_step_moves_toward_destination() {
        let mut agent = NavAgent::new(2.0);
        let mut transform = Transform::default();
        agent.set_destination(Vec3::new(4.0, 0.0, 0.0));
        resolve_path(&mut agent, transform.translation, &arena());

        step_agent(&mut agent, &mut transform, 0.5);
        assert!((transform.translation.x - 1.0).abs() < 1e-4);
        assert!((agent.remaining_distance - 3.0).abs() < 1e-4);

        for _ in 0..10 {
            step_agent(&mut agent, &mut transform, 0.5);
        }
        assert!((transform.translation.x - 4.0).abs() < 1e-4);
        assert!(agent.has_arrived());
        assert_eq!(agent.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_stopped_agent_does_not_move() {
        let mut agent = NavAgent::new(2.0);
        let mut transform = Transform::default();
        agent.set_destination(Vec3::new(4.0, 0.0, 0.0));
        resolve_path(&mut agent, transform.translation, &arena());
        agent.is_stopped = true;

        step_agent(&mut agent, &mut transform, 0.5);
        assert_eq!(transform.translation, Vec3::ZERO);
        assert!((agent.remaining_distance - 4.0).abs() < 1e-4);
    }
}
