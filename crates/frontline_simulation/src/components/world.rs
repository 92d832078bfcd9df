//! World компоненты: коллайдеры (LOS, взрывы) и навигационная область

use bevy::math::bounding::{Aabb3d, BoundingSphere};
use bevy::prelude::*;
use crate::tactical::LayerMask;

/// Форма коллайдера (axis-aligned, без вращения)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum ColliderShape {
    Sphere { radius: f32 },
    Cuboid { half_extents: Vec3 },
}

/// Коллайдер для tactical queries (raycast, overlap sphere)
///
/// Позиция берётся из Transform.translation (+ `offset`, без вращения).
/// `owner` - корневая entity (для "child of target" при LOS).
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Collider {
    pub shape: ColliderShape,
    pub layer: LayerMask,
    pub owner: Option<Entity>,
    pub offset: Vec3,
}

impl Collider {
    pub fn sphere(radius: f32, layer: LayerMask) -> Self {
        Self {
            shape: ColliderShape::Sphere { radius },
            layer,
            owner: None,
            offset: Vec3::ZERO,
        }
    }

    pub fn cuboid(half_extents: Vec3, layer: LayerMask) -> Self {
        Self {
            shape: ColliderShape::Cuboid { half_extents },
            layer,
            owner: None,
            offset: Vec3::ZERO,
        }
    }

    /// Смещение центра от Transform (тело стоит на земле, Transform - ступни)
    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    /// Bounding volume в мировых координатах
    pub fn volume_at(&self, translation: Vec3) -> ColliderVolume {
        let center = translation + self.offset;
        match self.shape {
            ColliderShape::Sphere { radius } => ColliderVolume::Sphere(BoundingSphere::new(center, radius)),
            ColliderShape::Cuboid { half_extents } => ColliderVolume::Aabb(Aabb3d::new(center, half_extents)),
        }
    }

    /// Коллайдер-часть другой entity (рука, оружие, хитбокс)
    pub fn owned_by(mut self, owner: Entity) -> Self {
        self.owner = Some(owner);
        self
    }
}

/// Коллайдер, размещённый в мире
#[derive(Debug, Clone, Copy)]
pub enum ColliderVolume {
    Sphere(BoundingSphere),
    Aabb(Aabb3d),
}

/// Навигационная область (прямоугольник в XZ на высоте ground_height)
///
/// Упрощённый NavMesh для headless режима: точка навигабельна если лежит внутри.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct NavMeshArea {
    pub min: Vec2,
    pub max: Vec2,
    pub ground_height: f32,
}

impl Default for NavMeshArea {
    fn default() -> Self {
        Self {
            min: Vec2::splat(-1000.0),
            max: Vec2::splat(1000.0),
            ground_height: 0.0,
        }
    }
}

impl NavMeshArea {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min,
            max,
            ground_height: 0.0,
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.z >= self.min.y && point.z <= self.max.y
    }

    /// Ближайшая навигабельная точка (на уровне земли)
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        Vec3::new(
            point.x.clamp(self.min.x, self.max.x),
            self.ground_height,
            point.z.clamp(self.min.y, self.max.y),
        )
    }
}
