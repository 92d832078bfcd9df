//! Headless tactical backend - raycast/overlap/navmesh без physics движка
//!
//! Геометрия запросов - `bevy::math::bounding` (RayCast3d, Aabb3d, BoundingSphere).
//! Коллайдеры снимаются с ECS world в начале каждого тика
//! (`rebuild_headless_tactics`), запросы идут по снапшоту.

use bevy::math::bounding::{BoundingSphere, IntersectsVolume, RayCast3d};
use bevy::prelude::*;
use crate::components::{Collider, ColliderVolume, NavMeshArea};
use crate::tactical::{LayerMask, RayHit, TacticalQueries};

#[derive(Debug, Clone, Copy)]
struct ColliderEntry {
    entity: Entity,
    root: Entity,
    volume: ColliderVolume,
    layer: LayerMask,
}

/// Снапшот tactical мира для headless симуляции
#[derive(Resource, Debug, Clone, Default)]
pub struct HeadlessTactics {
    colliders: Vec<ColliderEntry>,
    navmesh: NavMeshArea,
}

impl HeadlessTactics {
    pub fn new(navmesh: NavMeshArea) -> Self {
        Self {
            colliders: Vec::new(),
            navmesh,
        }
    }

    pub fn navmesh(&self) -> &NavMeshArea {
        &self.navmesh
    }

    pub fn set_navmesh(&mut self, navmesh: NavMeshArea) {
        self.navmesh = navmesh;
    }

    pub fn clear_colliders(&mut self) {
        self.colliders.clear();
    }

    pub fn insert_collider(&mut self, entity: Entity, translation: Vec3, collider: &Collider) {
        self.colliders.push(ColliderEntry {
            entity,
            root: collider.owner.unwrap_or(entity),
            volume: collider.volume_at(translation),
            layer: collider.layer,
        });
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }
}

impl TacticalQueries for HeadlessTactics {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: LayerMask) -> Option<RayHit> {
        let Ok(direction) = Dir3::new(direction) else {
            return None;
        };
        if max_distance <= 0.0 {
            return None;
        }
        let ray = RayCast3d::new(origin, direction, max_distance);

        let mut best: Option<RayHit> = None;
        for entry in self.colliders.iter().filter(|e| e.layer.intersects(mask)) {
            let hit_distance = match &entry.volume {
                ColliderVolume::Sphere(sphere) => ray.sphere_intersection_at(sphere),
                ColliderVolume::Aabb(aabb) => ray.aabb_intersection_at(aabb),
            };

            let Some(distance) = hit_distance else {
                continue;
            };
            if best.map_or(true, |b| distance < b.distance) {
                best = Some(RayHit {
                    entity: entry.entity,
                    root: entry.root,
                    layer: entry.layer,
                    distance,
                    point: origin + *direction * distance,
                });
            }
        }

        best
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> Vec<Entity> {
        let query = BoundingSphere::new(center, radius);
        let mut roots = Vec::new();
        for entry in self.colliders.iter().filter(|e| e.layer.intersects(mask)) {
            let overlaps = match &entry.volume {
                ColliderVolume::Sphere(sphere) => query.intersects(sphere),
                ColliderVolume::Aabb(aabb) => query.intersects(aabb),
            };
            if overlaps && !roots.contains(&entry.root) {
                roots.push(entry.root);
            }
        }
        roots
    }

    fn sample_navmesh(&self, point: Vec3, max_distance: f32) -> Option<Vec3> {
        let closest = self.navmesh.closest_point(point);
        let flat = Vec3::new(point.x, self.navmesh.ground_height, point.z);
        (flat.distance(closest) <= max_distance).then_some(closest)
    }
}

/// Система: снапшот коллайдеров и navmesh в HeadlessTactics
///
/// Запускается первой в тике - perception и brains видят позиции начала тика.
pub fn rebuild_headless_tactics(
    mut tactics: ResMut<HeadlessTactics>,
    navmesh: Res<NavMeshArea>,
    colliders: Query<(Entity, &Transform, &Collider)>,
) {
    tactics.clear_colliders();
    tactics.set_navmesh(*navmesh);

    let mut entries: Vec<_> = colliders.iter().collect();
    entries.sort_by_key(|(entity, _, _)| *entity);

    for (entity, transform, collider) in entries {
        tactics.insert_collider(entity, transform.translation, collider);
    }
}
