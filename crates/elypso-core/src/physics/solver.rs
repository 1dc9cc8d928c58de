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

//! # Impulse Solver
//!
//! Pure mathematical implementation of contact resolution using impulses.
//!
//! A manifold is resolved as one contact at the centroid of its points, so
//! symmetric contacts produce no spurious spin. Callers repeat passes to
//! converge when several pairs share a body.

use serde::{Deserialize, Serialize};

use super::{ContactManifold, RigidBody};
use crate::math::{Vec3, EPSILON};

/// Tunable constants of the impulse solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Velocity passes per contact pair and step.
    pub iterations: u32,
    /// Fraction of the penetration (beyond `slop`) removed per step.
    pub baumgarte_percent: f32,
    /// Penetration allowance to avoid jitter.
    pub slop: f32,
    /// Closing speeds below this resolve inelastically.
    pub restitution_threshold: f32,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            iterations: 4,
            baumgarte_percent: 0.8,
            slop: 0.01,
            restitution_threshold: 0.5,
        }
    }
}

/// A mathematical solver for impulse-based contact resolution.
#[derive(Debug, Clone, Default)]
pub struct ImpulseSolver {
    /// Solver constants.
    pub settings: SolverSettings,
}

fn sanitize_coefficient(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Effective mass denominator along `direction` for contact offsets `ra`, `rb`.
fn effective_mass_denominator(
    a: &RigidBody,
    b: &RigidBody,
    ra: Vec3,
    rb: Vec3,
    direction: Vec3,
) -> f32 {
    let angular_a = (a.world_inverse_inertia() * ra.cross(direction)).cross(ra);
    let angular_b = (b.world_inverse_inertia() * rb.cross(direction)).cross(rb);
    a.inverse_mass() + b.inverse_mass() + direction.dot(angular_a + angular_b)
}

impl ImpulseSolver {
    /// Creates a solver with the given settings.
    pub fn new(settings: SolverSettings) -> Self {
        Self { settings }
    }

    /// Restitution of a pair: the larger of the two, clamped to `[0, 1]`.
    pub fn combined_restitution(a: &RigidBody, b: &RigidBody) -> f32 {
        sanitize_coefficient(a.restitution)
            .max(sanitize_coefficient(b.restitution))
            .min(1.0)
    }

    /// Static and dynamic friction of a pair, each the geometric mean.
    pub fn combined_friction(a: &RigidBody, b: &RigidBody) -> (f32, f32) {
        let mix = |x: f32, y: f32| (sanitize_coefficient(x) * sanitize_coefficient(y)).sqrt();
        (
            mix(a.static_friction, b.static_friction),
            mix(a.dynamic_friction, b.dynamic_friction),
        )
    }

    /// Runs one velocity pass over the manifold.
    ///
    /// The manifold normal must point from `a` to `b`. The contacts are
    /// resolved as a single point at their centroid, which is exact for a
    /// body resting on a face and reduces to the contact itself for a corner.
    /// Returns `true` if any impulse was applied.
    pub fn resolve_velocity(
        &self,
        a: &mut RigidBody,
        b: &mut RigidBody,
        manifold: &ContactManifold,
    ) -> bool {
        let Some(n) = manifold.normal() else {
            return false;
        };
        if !manifold.colliding || a.inverse_mass() + b.inverse_mass() <= 0.0 {
            return false;
        }

        let point = manifold
            .contacts
            .iter()
            .fold(Vec3::ZERO, |acc, c| acc + c.point)
            / manifold.contacts.len() as f32;
        let ra = point - a.position;
        let rb = point - b.position;

        // 1. Relative velocity along the normal.
        let rv = b.velocity_at_point(point) - a.velocity_at_point(point);
        let vel_along_normal = rv.dot(n);

        // 2. Already separating.
        if vel_along_normal > 0.0 {
            return false;
        }

        // 3. Normal impulse, with restitution only for real impacts.
        let k = effective_mass_denominator(a, b, ra, rb, n);
        if k <= EPSILON {
            return false;
        }
        let bounce = if -vel_along_normal > self.settings.restitution_threshold {
            Self::combined_restitution(a, b)
        } else {
            0.0
        };
        let jn = -(1.0 + bounce) * vel_along_normal / k;
        let impulse = n * jn;
        a.apply_impulse_at(-impulse, point);
        b.apply_impulse_at(impulse, point);

        // 4. Coulomb friction, bounded by the normal impulse.
        let rv = b.velocity_at_point(point) - a.velocity_at_point(point);
        let tangential = rv - n * rv.dot(n);
        let speed = tangential.length();
        if speed <= EPSILON {
            return true;
        }
        let t = tangential / speed;
        let k = effective_mass_denominator(a, b, ra, rb, t);
        if k <= EPSILON {
            return true;
        }
        let (static_friction, dynamic_friction) = Self::combined_friction(a, b);
        let jt = -speed / k;
        let jt = if jt.abs() <= jn * static_friction {
            jt
        } else {
            -jn * dynamic_friction
        };
        let friction = t * jt;
        a.apply_impulse_at(-friction, point);
        b.apply_impulse_at(friction, point);

        true
    }

    /// Pushes the bodies apart along the manifold normal.
    ///
    /// Only the part of the penetration above `slop` is corrected, scaled by
    /// `baumgarte_percent` and split by inverse mass.
    pub fn correct_positions(
        &self,
        a: &mut RigidBody,
        b: &mut RigidBody,
        manifold: &ContactManifold,
    ) {
        let Some(normal) = manifold.normal() else {
            return;
        };
        let inv_mass_a = a.inverse_mass();
        let inv_mass_b = b.inverse_mass();
        let total_inv_mass = inv_mass_a + inv_mass_b;
        if total_inv_mass <= 0.0 {
            return;
        }

        let depth = manifold.max_penetration();
        let correction_mag = (depth - self.settings.slop).max(0.0) / total_inv_mass
            * self.settings.baumgarte_percent;
        if correction_mag <= 0.0 {
            return;
        }
        let correction = normal * correction_mag;
        a.position -= correction * inv_mass_a;
        b.position += correction * inv_mass_b;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{ColliderType, CollisionDetection, RigidBodyDesc};
    use approx::assert_relative_eq;

    fn ball(position: Vec3, velocity: Vec3, restitution: f32) -> RigidBody {
        let mut body = RigidBody::new(&RigidBodyDesc {
            position,
            collider_type: ColliderType::Sphere,
            restitution,
            ..Default::default()
        });
        body.velocity = velocity;
        body
    }

    #[test]
    fn test_elastic_head_on_collision_swaps_velocities() {
        let solver = ImpulseSolver::default();
        let mut a = ball(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), 1.0);
        let mut b = ball(Vec3::new(1.9, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0), 1.0);
        let manifold = CollisionDetection::generate_contact_manifold(&a, &b);

        assert!(solver.resolve_velocity(&mut a, &mut b, &manifold));
        assert_relative_eq!(a.velocity, Vec3::new(-1.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(b.velocity, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(a.angular_velocity, Vec3::ZERO, epsilon = 1e-6);
    }

    #[test]
    fn test_separating_bodies_are_left_alone() {
        let solver = ImpulseSolver::default();
        let mut a = ball(Vec3::ZERO, Vec3::new(-1.0, 0.0, 0.0), 1.0);
        let mut b = ball(Vec3::new(1.9, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), 1.0);
        let manifold = CollisionDetection::generate_contact_manifold(&a, &b);

        assert!(!solver.resolve_velocity(&mut a, &mut b, &manifold));
        assert_eq!(a.velocity, Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_static_body_reflects_dynamic_one() {
        let solver = ImpulseSolver::default();
        let mut wall = ball(Vec3::ZERO, Vec3::ZERO, 0.5);
        wall.set_dynamic(false);
        let mut b = ball(Vec3::new(1.9, 0.0, 0.0), Vec3::new(-2.0, 0.0, 0.0), 0.0);
        let manifold = CollisionDetection::generate_contact_manifold(&wall, &b);

        solver.resolve_velocity(&mut wall, &mut b, &manifold);
        assert_eq!(wall.velocity, Vec3::ZERO);
        // Restitution combines to the larger value.
        assert_relative_eq!(b.velocity, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_two_immovable_bodies_get_no_impulse() {
        let solver = ImpulseSolver::default();
        let mut a = ball(Vec3::ZERO, Vec3::ZERO, 0.5);
        let mut b = ball(Vec3::new(1.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0), 0.5);
        a.set_mass(0.0);
        b.set_dynamic(false);
        let manifold = CollisionDetection::generate_contact_manifold(&a, &b);

        assert!(manifold.colliding);
        assert!(!solver.resolve_velocity(&mut a, &mut b, &manifold));
        solver.correct_positions(&mut a, &mut b, &manifold);
        assert_eq!(b.position, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_friction_slows_sliding_box() {
        let solver = ImpulseSolver::default();
        let mut ground = RigidBody::new(&RigidBodyDesc {
            scale: Vec3::new(10.0, 1.0, 10.0),
            is_dynamic: false,
            ..Default::default()
        });
        let mut crate_body = RigidBody::new(&RigidBodyDesc {
            position: Vec3::new(0.0, 0.99, 0.0),
            ..Default::default()
        });
        crate_body.velocity = Vec3::new(2.0, -0.1, 0.0);
        let manifold = CollisionDetection::generate_contact_manifold(&ground, &crate_body);

        solver.resolve_velocity(&mut ground, &mut crate_body, &manifold);
        assert!(crate_body.velocity.x < 2.0);
        assert!(crate_body.velocity.x > 0.0);
        assert!(crate_body.velocity.y >= -1e-4);
    }

    #[test]
    fn test_position_correction_splits_by_inverse_mass() {
        let solver = ImpulseSolver::default();
        let mut a = ball(Vec3::ZERO, Vec3::ZERO, 0.0);
        let mut b = ball(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO, 0.0);
        let manifold = CollisionDetection::generate_contact_manifold(&a, &b);

        solver.correct_positions(&mut a, &mut b, &manifold);
        // depth 1.0, slop 0.01, percent 0.8 => 0.792 total, half each.
        assert_relative_eq!(a.position.x, -0.396, epsilon = 1e-5);
        assert_relative_eq!(b.position.x, 1.396, epsilon = 1e-5);
    }

    #[test]
    fn test_friction_combines_as_geometric_mean() {
        let mut a = RigidBody::new(&RigidBodyDesc::default());
        let mut b = RigidBody::new(&RigidBodyDesc::default());
        a.static_friction = 0.25;
        b.static_friction = 1.0;
        a.dynamic_friction = -1.0;
        let (s, d) = ImpulseSolver::combined_friction(&a, &b);
        assert_relative_eq!(s, 0.5);
        assert_eq!(d, 0.0);
    }
}
