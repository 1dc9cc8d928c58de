// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Collider shapes attached to rigid bodies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// Smallest half-extent or radius the collision math will work with.
///
/// Stored shape parameters are never rewritten; degenerate values are clamped
/// to this floor when they are read for a query.
pub const MIN_EXTENT: f32 = 1e-4;

/// The closed set of supported collider shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColliderType {
    /// Oriented box described by half-extents.
    Box,
    /// Sphere described by a radius.
    Sphere,
}

impl ColliderType {
    /// The canonical text name, as written in scene files.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColliderType::Box => "BOX",
            ColliderType::Sphere => "SPHERE",
        }
    }
}

impl fmt::Display for ColliderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a [`ColliderType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColliderTypeError {
    /// The rejected input.
    pub input: String,
}

impl fmt::Display for ParseColliderTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid collider shape", self.input)
    }
}

impl std::error::Error for ParseColliderTypeError {}

impl FromStr for ColliderType {
    type Err = ParseColliderTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("BOX") {
            Ok(ColliderType::Box)
        } else if trimmed.eq_ignore_ascii_case("SPHERE") {
            Ok(ColliderType::Sphere)
        } else {
            Err(ParseColliderTypeError {
                input: s.to_string(),
            })
        }
    }
}

/// Box shape data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxCollider {
    /// Half the size of the box along each local axis, in world units.
    pub half_extents: Vec3,
}

impl BoxCollider {
    /// Creates a box collider from absolute half-extents.
    pub fn new(half_extents: Vec3) -> Self {
        Self { half_extents }
    }

    /// Half-extents as used by the collision math.
    #[inline]
    pub fn effective_half_extents(&self) -> Vec3 {
        let h = self.half_extents.abs();
        if h.is_finite() {
            h.max_scalar(MIN_EXTENT)
        } else {
            Vec3::splat(MIN_EXTENT)
        }
    }
}

/// Sphere shape data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphereCollider {
    /// Radius in world units.
    pub radius: f32,
}

impl SphereCollider {
    /// Creates a sphere collider from an absolute radius.
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }

    /// Radius as used by the collision math.
    #[inline]
    pub fn effective_radius(&self) -> f32 {
        if self.radius.is_finite() {
            self.radius.abs().max(MIN_EXTENT)
        } else {
            MIN_EXTENT
        }
    }
}

/// The shape owned by a rigid body.
///
/// The variant is fixed when the body is created; only the parameters of
/// the active variant can change afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Collider {
    /// Oriented box.
    Box(BoxCollider),
    /// Sphere.
    Sphere(SphereCollider),
}

impl Collider {
    /// Derives a collider from a logical scale vector.
    ///
    /// Boxes get half-extents of `scale * 0.5`; spheres use `scale.x` as radius.
    pub fn from_scale(collider_type: ColliderType, scale: Vec3) -> Self {
        match collider_type {
            ColliderType::Box => Collider::Box(BoxCollider::new(scale * 0.5)),
            ColliderType::Sphere => Collider::Sphere(SphereCollider::new(scale.x)),
        }
    }

    /// Returns the type tag of the active variant.
    pub fn collider_type(&self) -> ColliderType {
        match self {
            Collider::Box(_) => ColliderType::Box,
            Collider::Sphere(_) => ColliderType::Sphere,
        }
    }

    /// Returns the box data, if this is a box.
    pub fn as_box(&self) -> Option<&BoxCollider> {
        match self {
            Collider::Box(b) => Some(b),
            Collider::Sphere(_) => None,
        }
    }

    /// Returns the sphere data, if this is a sphere.
    pub fn as_sphere(&self) -> Option<&SphereCollider> {
        match self {
            Collider::Sphere(s) => Some(s),
            Collider::Box(_) => None,
        }
    }

    /// Recomputes the shape parameters for a new logical scale.
    ///
    /// Returns `true` only if a parameter actually changed.
    pub fn apply_scale(&mut self, scale: Vec3) -> bool {
        match self {
            Collider::Box(b) => {
                let half_extents = scale * 0.5;
                if b.half_extents != half_extents {
                    b.half_extents = half_extents;
                    true
                } else {
                    false
                }
            }
            Collider::Sphere(s) => {
                if s.radius != scale.x {
                    s.radius = scale.x;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Writes box half-extents. A no-op returning `false` on spheres.
    pub fn set_half_extents(&mut self, half_extents: Vec3) -> bool {
        match self {
            Collider::Box(b) if b.half_extents != half_extents => {
                b.half_extents = half_extents;
                true
            }
            _ => false,
        }
    }

    /// Writes the sphere radius. A no-op returning `false` on boxes.
    pub fn set_radius(&mut self, radius: f32) -> bool {
        match self {
            Collider::Sphere(s) if s.radius != radius => {
                s.radius = radius;
                true
            }
            _ => false,
        }
    }

    /// The logical scale this collider corresponds to.
    ///
    /// Boxes report their full size; spheres report `(radius, 0, 0)`.
    pub fn logical_scale(&self) -> Vec3 {
        match self {
            Collider::Box(b) => b.half_extents * 2.0,
            Collider::Sphere(s) => Vec3::new(s.radius, 0.0, 0.0),
        }
    }

    /// Principal moments of inertia of a solid shape of `mass`, in local space.
    pub fn inertia_diagonal(&self, mass: f32) -> Vec3 {
        match self {
            Collider::Box(b) => {
                let h = b.effective_half_extents();
                let (x2, y2, z2) = (h.x * h.x, h.y * h.y, h.z * h.z);
                Vec3::new(y2 + z2, x2 + z2, x2 + y2) * (mass / 3.0)
            }
            Collider::Sphere(s) => {
                let r = s.effective_radius();
                Vec3::splat(0.4 * mass * r * r)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collider_type_parsing_is_case_insensitive() {
        assert_eq!("BOX".parse::<ColliderType>(), Ok(ColliderType::Box));
        assert_eq!("sphere".parse::<ColliderType>(), Ok(ColliderType::Sphere));
        assert_eq!(" Box ".parse::<ColliderType>(), Ok(ColliderType::Box));
        let err = "CAPSULE".parse::<ColliderType>().unwrap_err();
        assert_eq!(err.input, "CAPSULE");
        assert_eq!(ColliderType::Sphere.to_string(), "SPHERE");
    }

    #[test]
    fn test_from_scale_derives_absolute_size() {
        let scale = Vec3::new(2.0, 4.0, 6.0);
        let b = Collider::from_scale(ColliderType::Box, scale);
        assert_eq!(b.as_box().unwrap().half_extents, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(b.logical_scale(), scale);

        let s = Collider::from_scale(ColliderType::Sphere, scale);
        assert_eq!(s.as_sphere().unwrap().radius, 2.0);
        assert_eq!(s.logical_scale(), Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_cross_variant_writes_are_noops() {
        let mut sphere = Collider::Sphere(SphereCollider::new(1.0));
        assert!(!sphere.set_half_extents(Vec3::ONE));
        assert_eq!(sphere, Collider::Sphere(SphereCollider::new(1.0)));

        let mut cube = Collider::Box(BoxCollider::new(Vec3::ONE));
        assert!(!cube.set_radius(3.0));
        assert!(cube.set_half_extents(Vec3::splat(2.0)));
        assert!(!cube.set_half_extents(Vec3::splat(2.0)));
    }

    #[test]
    fn test_apply_scale_reports_change_once() {
        let mut cube = Collider::from_scale(ColliderType::Box, Vec3::ONE);
        assert!(cube.apply_scale(Vec3::splat(2.0)));
        assert!(!cube.apply_scale(Vec3::splat(2.0)));
        assert_eq!(cube.collider_type(), ColliderType::Box);
    }

    #[test]
    fn test_degenerate_extents_are_clamped_for_math() {
        let b = BoxCollider::new(Vec3::new(0.0, -2.0, f32::NAN));
        assert_eq!(b.effective_half_extents(), Vec3::splat(MIN_EXTENT));
        let b = BoxCollider::new(Vec3::new(0.0, -2.0, 1.0));
        assert_eq!(b.effective_half_extents(), Vec3::new(MIN_EXTENT, 2.0, 1.0));
        assert_eq!(SphereCollider::new(0.0).effective_radius(), MIN_EXTENT);
        assert_eq!(SphereCollider::new(-0.5).effective_radius(), 0.5);
    }
}
