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

//! Simulation state of a single rigid body.

use serde::{Deserialize, Serialize};

use super::collider::{Collider, ColliderType};
use crate::math::{Aabb, Mat3, Quat, Vec3};

/// Description for creating a rigid body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidBodyDesc {
    /// Initial position.
    pub position: Vec3,
    /// Initial rotation.
    pub rotation: Quat,
    /// Shape of the owned collider.
    pub collider_type: ColliderType,
    /// Logical scale the collider size is derived from.
    pub scale: Vec3,
    /// Mass in kilograms.
    pub mass: f32,
    /// Bounciness, nominally in `[0, 1]`.
    pub restitution: f32,
    /// Friction coefficient while at rest relative to the other surface.
    pub static_friction: f32,
    /// Friction coefficient while sliding.
    pub dynamic_friction: f32,
    /// Multiplier applied to the world gravity.
    pub gravity_factor: f32,
    /// Whether the body is moved by the simulation.
    pub is_dynamic: bool,
    /// Whether gravity is applied to the body.
    pub use_gravity: bool,
}

impl Default for RigidBodyDesc {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            collider_type: ColliderType::Box,
            scale: Vec3::ONE,
            mass: 1.0,
            restitution: 0.5,
            static_friction: 0.5,
            dynamic_friction: 0.3,
            gravity_factor: 1.0,
            is_dynamic: true,
            use_gravity: true,
        }
    }
}

/// A simulated rigid body and its exclusively owned collider.
///
/// Plain state fields are public. Setters compare before writing and return
/// whether anything changed, so callers can skip side effects on no-op writes.
/// The collider variant cannot be replaced after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    /// World-space position of the center of mass.
    pub position: Vec3,
    /// World-space orientation (unit quaternion).
    pub rotation: Quat,
    /// Logical scale the collider was sized from.
    pub scale: Vec3,
    /// Linear velocity.
    pub velocity: Vec3,
    /// Angular velocity in world space (radians per second).
    pub angular_velocity: Vec3,
    /// Mass in kilograms.
    pub mass: f32,
    /// Bounciness.
    pub restitution: f32,
    /// Static friction coefficient.
    pub static_friction: f32,
    /// Dynamic friction coefficient.
    pub dynamic_friction: f32,
    /// Multiplier applied to the world gravity.
    pub gravity_factor: f32,
    /// Whether the body is moved by the simulation.
    pub is_dynamic: bool,
    /// Whether gravity is applied to the body.
    pub use_gravity: bool,
    collider: Collider,
}

fn write_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot != value {
        *slot = value;
        true
    } else {
        false
    }
}

impl RigidBody {
    /// Creates a body from a description; the collider is sized from `desc.scale`.
    pub fn new(desc: &RigidBodyDesc) -> Self {
        Self {
            position: desc.position,
            rotation: desc.rotation,
            scale: desc.scale,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass: desc.mass,
            restitution: desc.restitution,
            static_friction: desc.static_friction,
            dynamic_friction: desc.dynamic_friction,
            gravity_factor: desc.gravity_factor,
            is_dynamic: desc.is_dynamic,
            use_gravity: desc.use_gravity,
            collider: Collider::from_scale(desc.collider_type, desc.scale),
        }
    }

    /// The owned collider.
    #[inline]
    pub fn collider(&self) -> &Collider {
        &self.collider
    }

    /// Shorthand for `self.collider().collider_type()`.
    #[inline]
    pub fn collider_type(&self) -> ColliderType {
        self.collider.collider_type()
    }

    /// Sets the position.
    pub fn set_position(&mut self, position: Vec3) -> bool {
        write_if_changed(&mut self.position, position)
    }

    /// Sets the rotation.
    pub fn set_rotation(&mut self, rotation: Quat) -> bool {
        write_if_changed(&mut self.rotation, rotation)
    }

    /// Sets the logical scale and recomputes the collider size from it.
    pub fn set_scale(&mut self, scale: Vec3) -> bool {
        let scale_changed = write_if_changed(&mut self.scale, scale);
        let shape_changed = self.collider.apply_scale(scale);
        scale_changed || shape_changed
    }

    /// Writes box half-extents directly and keeps `scale` in step with them.
    /// A no-op on sphere bodies.
    pub fn set_half_extents(&mut self, half_extents: Vec3) -> bool {
        let changed = self.collider.set_half_extents(half_extents);
        if changed {
            self.scale = self.collider.logical_scale();
        }
        changed
    }

    /// Writes the sphere radius directly and keeps `scale.x` in step with it.
    /// A no-op on box bodies.
    pub fn set_radius(&mut self, radius: f32) -> bool {
        let changed = self.collider.set_radius(radius);
        if changed {
            self.scale.x = radius;
        }
        changed
    }

    /// Sets the linear velocity.
    pub fn set_velocity(&mut self, velocity: Vec3) -> bool {
        write_if_changed(&mut self.velocity, velocity)
    }

    /// Sets the angular velocity.
    pub fn set_angular_velocity(&mut self, angular_velocity: Vec3) -> bool {
        write_if_changed(&mut self.angular_velocity, angular_velocity)
    }

    /// Sets the mass. Not validated; see [`RigidBody::inverse_mass`].
    pub fn set_mass(&mut self, mass: f32) -> bool {
        write_if_changed(&mut self.mass, mass)
    }

    /// Sets the restitution.
    pub fn set_restitution(&mut self, restitution: f32) -> bool {
        write_if_changed(&mut self.restitution, restitution)
    }

    /// Sets the static friction coefficient.
    pub fn set_static_friction(&mut self, static_friction: f32) -> bool {
        write_if_changed(&mut self.static_friction, static_friction)
    }

    /// Sets the dynamic friction coefficient.
    pub fn set_dynamic_friction(&mut self, dynamic_friction: f32) -> bool {
        write_if_changed(&mut self.dynamic_friction, dynamic_friction)
    }

    /// Sets the gravity multiplier.
    pub fn set_gravity_factor(&mut self, gravity_factor: f32) -> bool {
        write_if_changed(&mut self.gravity_factor, gravity_factor)
    }

    /// Marks the body as dynamic or static.
    pub fn set_dynamic(&mut self, is_dynamic: bool) -> bool {
        write_if_changed(&mut self.is_dynamic, is_dynamic)
    }

    /// Enables or disables gravity for the body.
    pub fn set_use_gravity(&mut self, use_gravity: bool) -> bool {
        write_if_changed(&mut self.use_gravity, use_gravity)
    }

    /// Zeroes the linear velocity.
    pub fn reset_velocity(&mut self) {
        self.velocity = Vec3::ZERO;
    }

    /// Zeroes the angular velocity.
    pub fn reset_angular_velocity(&mut self) {
        self.angular_velocity = Vec3::ZERO;
    }

    /// Returns `true` if impulses and integration can move this body.
    ///
    /// Static bodies and bodies whose mass is non-positive, non-finite, or
    /// too small to invert without overflow are immovable.
    #[inline]
    pub fn is_movable(&self) -> bool {
        self.is_dynamic
            && self.mass.is_finite()
            && self.mass > 0.0
            && self.mass.recip().is_finite()
    }

    /// Inverse mass, zero for immovable bodies.
    #[inline]
    pub fn inverse_mass(&self) -> f32 {
        if self.is_movable() {
            1.0 / self.mass
        } else {
            0.0
        }
    }

    /// World-space inverse inertia tensor, zero for immovable bodies.
    pub fn world_inverse_inertia(&self) -> Mat3 {
        if !self.is_movable() {
            return Mat3::ZERO;
        }
        let inertia = self.collider.inertia_diagonal(self.mass);
        // An axis whose moment underflows cannot be rotated about.
        let inv_axis = |moment: f32| {
            let inv = moment.recip();
            if moment > 0.0 && inv.is_finite() {
                inv
            } else {
                0.0
            }
        };
        let inv_local = Vec3::new(
            inv_axis(inertia.x),
            inv_axis(inertia.y),
            inv_axis(inertia.z),
        );
        let r = Mat3::from_quat(self.rotation);
        r * Mat3::from_diagonal(inv_local) * r.transpose()
    }

    /// Velocity of the material point at world position `point`.
    #[inline]
    pub fn velocity_at_point(&self, point: Vec3) -> Vec3 {
        self.velocity + self.angular_velocity.cross(point - self.position)
    }

    /// Applies an impulse at a world-space point.
    pub fn apply_impulse_at(&mut self, impulse: Vec3, point: Vec3) {
        if !self.is_movable() {
            return;
        }
        let r = point - self.position;
        self.velocity += impulse * self.inverse_mass();
        self.angular_velocity += self.world_inverse_inertia() * r.cross(impulse);
    }

    /// World-space bounding box of the collider at the body's current pose.
    pub fn aabb(&self) -> Aabb {
        let extents = super::CollisionDetection::compute_aabb_from_obb(self);
        Aabb::from_center_half_extents(self.position, extents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_copies_description() {
        let desc = RigidBodyDesc {
            position: Vec3::new(1.0, 2.0, 3.0),
            collider_type: ColliderType::Sphere,
            scale: Vec3::new(0.75, 1.0, 1.0),
            mass: 4.0,
            ..Default::default()
        };
        let body = RigidBody::new(&desc);
        assert_eq!(body.position, desc.position);
        assert_eq!(body.mass, 4.0);
        assert_eq!(body.collider_type(), ColliderType::Sphere);
        assert_eq!(body.collider().as_sphere().unwrap().radius, 0.75);
        assert_eq!(body.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_setters_report_changes_once() {
        let mut body = RigidBody::new(&RigidBodyDesc::default());
        assert!(body.set_mass(2.0));
        assert!(!body.set_mass(2.0));
        assert!(body.set_scale(Vec3::splat(3.0)));
        assert!(!body.set_scale(Vec3::splat(3.0)));
        assert_eq!(
            body.collider().as_box().unwrap().half_extents,
            Vec3::splat(1.5)
        );
        assert!(!body.set_radius(1.0));
    }

    #[test]
    fn test_immovable_bodies_have_zero_inverse_mass() {
        let mut body = RigidBody::new(&RigidBodyDesc::default());
        assert_relative_eq!(body.inverse_mass(), 1.0);

        body.set_mass(0.0);
        assert_eq!(body.inverse_mass(), 0.0);
        body.set_mass(-3.0);
        assert_eq!(body.inverse_mass(), 0.0);
        assert_eq!(body.world_inverse_inertia(), Mat3::ZERO);

        body.set_mass(2.0);
        body.set_dynamic(false);
        assert_eq!(body.inverse_mass(), 0.0);
    }

    #[test]
    fn test_mass_too_small_to_invert_is_immovable() {
        let mut body = RigidBody::new(&RigidBodyDesc::default());
        body.set_mass(1e-39);
        assert!(!body.is_movable());
        assert_eq!(body.inverse_mass(), 0.0);
        assert_eq!(body.world_inverse_inertia(), Mat3::ZERO);

        body.apply_impulse_at(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(body.velocity, Vec3::ZERO);
        assert_eq!(body.angular_velocity, Vec3::ZERO);
    }

    #[test]
    fn test_underflowing_inertia_stays_finite() {
        let mut body = RigidBody::new(&RigidBodyDesc {
            scale: Vec3::splat(1e-6),
            mass: 1e-36,
            ..Default::default()
        });
        assert!(body.is_movable());
        let inv = body.world_inverse_inertia();
        assert!(inv.cols.iter().all(|c| c.is_finite()));

        body.apply_impulse_at(Vec3::new(0.0, 1e-36, 0.0), Vec3::new(1e-6, 0.0, 0.0));
        assert!(body.velocity.is_finite());
        assert!(body.angular_velocity.is_finite());
    }

    #[test]
    fn test_direct_shape_writes_keep_scale_in_step() {
        let mut cube = RigidBody::new(&RigidBodyDesc::default());
        assert!(cube.set_half_extents(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(cube.scale, Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(cube.scale, cube.collider().logical_scale());

        let mut ball = RigidBody::new(&RigidBodyDesc {
            collider_type: ColliderType::Sphere,
            scale: Vec3::new(0.5, 1.0, 1.0),
            ..Default::default()
        });
        assert!(ball.set_radius(2.0));
        assert_eq!(ball.scale.x, 2.0);
        assert!(!ball.set_half_extents(Vec3::ONE));
        assert_eq!(ball.scale.x, 2.0);
    }

    #[test]
    fn test_impulse_at_offset_point_spins_body() {
        let mut body = RigidBody::new(&RigidBodyDesc::default());
        body.apply_impulse_at(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.5, 0.0, 0.0));
        assert_relative_eq!(body.velocity, Vec3::new(0.0, 1.0, 0.0));
        assert!(body.angular_velocity.z > 0.0);
    }

    #[test]
    fn test_reset_velocities() {
        let mut body = RigidBody::new(&RigidBodyDesc::default());
        body.velocity = Vec3::ONE;
        body.angular_velocity = Vec3::ONE;
        body.reset_velocity();
        body.reset_angular_velocity();
        assert_eq!(body.velocity, Vec3::ZERO);
        assert_eq!(body.angular_velocity, Vec3::ZERO);
    }
}
