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

//! Provides a Quaternion type for representing 3D rotations.

use serde::{Deserialize, Serialize};

use super::{Vec3, EPSILON};
use std::ops::{Add, Mul, MulAssign, Neg};

/// Represents a quaternion for 3D rotations.
///
/// Stored as `(x, y, z, w)`, where `[x, y, z]` is the vector part and `w` is
/// the scalar part. Body orientations are always kept as unit quaternions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct Quaternion {
    /// The x component of the vector part.
    pub x: f32,
    /// The y component of the vector part.
    pub y: f32,
    /// The z component of the vector part.
    pub z: f32,
    /// The scalar (real) part.
    pub w: f32,
}

impl Quaternion {
    /// The identity quaternion, representing no rotation.
    pub const IDENTITY: Quaternion = Quaternion {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Creates a new quaternion from its raw components.
    ///
    /// Note: This does not guarantee a unit quaternion.
    #[inline]
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Creates a quaternion representing a rotation around `axis` by `angle_radians`.
    #[inline]
    pub fn from_axis_angle(axis: Vec3, angle_radians: f32) -> Self {
        let normalized_axis = axis.normalize();
        let half_angle = angle_radians * 0.5;
        let s = half_angle.sin();
        let c = half_angle.cos();
        Self {
            x: normalized_axis.x * s,
            y: normalized_axis.y * s,
            z: normalized_axis.z * s,
            w: c,
        }
    }

    /// Builds a rotation from Euler angles in radians.
    ///
    /// `euler.x` is pitch, `euler.y` is yaw and `euler.z` is roll. This is the
    /// convention editor transforms are authored in; [`Quaternion::to_euler`]
    /// is its inverse.
    pub fn from_euler(euler: Vec3) -> Self {
        let (sx, cx) = (euler.x * 0.5).sin_cos();
        let (sy, cy) = (euler.y * 0.5).sin_cos();
        let (sz, cz) = (euler.z * 0.5).sin_cos();

        Self {
            w: cx * cy * cz + sx * sy * sz,
            x: sx * cy * cz - cx * sy * sz,
            y: cx * sy * cz + sx * cy * sz,
            z: cx * cy * sz - sx * sy * cz,
        }
    }

    /// Decomposes the rotation into Euler angles in radians (pitch, yaw, roll).
    pub fn to_euler(&self) -> Vec3 {
        let (x, y, z, w) = (self.x, self.y, self.z, self.w);

        let pitch_y = 2.0 * (y * z + w * x);
        let pitch_x = w * w - x * x - y * y + z * z;
        let pitch = if pitch_y.abs() < EPSILON && pitch_x.abs() < EPSILON {
            // Gimbal lock: fall back to the axis component alone.
            2.0 * x.atan2(w)
        } else {
            pitch_y.atan2(pitch_x)
        };

        let yaw = (-2.0 * (x * z - w * y)).clamp(-1.0, 1.0).asin();

        let roll_y = 2.0 * (x * y + w * z);
        let roll_x = w * w + x * x - y * y - z * z;
        let roll = if roll_y.abs() < EPSILON && roll_x.abs() < EPSILON {
            0.0
        } else {
            roll_y.atan2(roll_x)
        };

        Vec3::new(pitch, yaw, roll)
    }

    /// Calculates the squared magnitude of the quaternion.
    #[inline]
    pub fn magnitude_squared(&self) -> f32 {
        self.dot(*self)
    }

    /// Calculates the magnitude of the quaternion.
    #[inline]
    pub fn magnitude(&self) -> f32 {
        self.magnitude_squared().sqrt()
    }

    /// Returns a unit-length copy, or the identity if the magnitude is degenerate.
    #[inline]
    pub fn normalize(&self) -> Self {
        let mag_sq = self.magnitude_squared();
        if mag_sq > EPSILON * EPSILON && mag_sq.is_finite() {
            let inv_mag = 1.0 / mag_sq.sqrt();
            Self::new(
                self.x * inv_mag,
                self.y * inv_mag,
                self.z * inv_mag,
                self.w * inv_mag,
            )
        } else {
            Self::IDENTITY
        }
    }

    /// Computes the conjugate, which is the inverse for unit quaternions.
    #[inline]
    pub fn conjugate(&self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Computes the dot product of two quaternions.
    #[inline]
    pub fn dot(&self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Rotates a 3D vector by this quaternion.
    pub fn rotate_vec3(&self, v: Vec3) -> Vec3 {
        let u = Vec3::new(self.x, self.y, self.z);
        let s: f32 = self.w;
        2.0 * u.dot(v) * u + (s * s - u.dot(u)) * v + 2.0 * s * u.cross(v)
    }

    /// Advances this orientation by a world-space angular velocity over `dt` seconds.
    pub fn integrate(&self, angular_velocity: Vec3, dt: f32) -> Self {
        let w_mag = angular_velocity.length();
        if w_mag <= EPSILON {
            return *self;
        }
        let axis = angular_velocity / w_mag;
        let delta_rot = Self::from_axis_angle(axis, w_mag * dt);
        (delta_rot * *self).normalize()
    }
}

impl Default for Quaternion {
    /// Returns the identity quaternion, representing no rotation.
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Quaternion> for Quaternion {
    type Output = Self;
    /// Combines two rotations using the Hamilton product (`self` applied after `rhs`).
    #[inline]
    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            x: self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            y: self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            z: self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            w: self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        }
    }
}

impl MulAssign<Quaternion> for Quaternion {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Mul<Vec3> for Quaternion {
    type Output = Vec3;
    /// Rotates a `Vec3` by this quaternion.
    #[inline]
    fn mul(self, rhs: Vec3) -> Self::Output {
        self.normalize().rotate_vec3(rhs)
    }
}

impl Add<Quaternion> for Quaternion {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(
            self.x + rhs.x,
            self.y + rhs.y,
            self.z + rhs.z,
            self.w + rhs.w,
        )
    }
}

impl Mul<f32> for Quaternion {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f32) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs, self.w * rhs)
    }
}

impl Neg for Quaternion {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z, -self.w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::degrees_to_radians;
    use approx::assert_relative_eq;

    fn quat_approx_eq(q1: Quaternion, q2: Quaternion) -> bool {
        let dot = q1.dot(q2).abs();
        approx::relative_eq!(dot, 1.0, epsilon = EPSILON * 10.0)
    }

    #[test]
    fn test_identity_and_default() {
        assert_eq!(Quaternion::IDENTITY, Quaternion::default());
        assert_relative_eq!(Quaternion::IDENTITY.magnitude(), 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_from_axis_angle_rotates_vector() {
        let q = Quaternion::from_axis_angle(Vec3::Y, std::f32::consts::FRAC_PI_2);
        let rotated = q.rotate_vec3(Vec3::X);
        assert_relative_eq!(rotated, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_euler_single_axis_matches_axis_angle() {
        let angle = degrees_to_radians(30.0);
        let qx = Quaternion::from_euler(Vec3::new(angle, 0.0, 0.0));
        assert!(quat_approx_eq(qx, Quaternion::from_axis_angle(Vec3::X, angle)));
        let qy = Quaternion::from_euler(Vec3::new(0.0, angle, 0.0));
        assert!(quat_approx_eq(qy, Quaternion::from_axis_angle(Vec3::Y, angle)));
        let qz = Quaternion::from_euler(Vec3::new(0.0, 0.0, angle));
        assert!(quat_approx_eq(qz, Quaternion::from_axis_angle(Vec3::Z, angle)));
    }

    #[test]
    fn test_euler_round_trip() {
        let euler = Vec3::new(
            degrees_to_radians(20.0),
            degrees_to_radians(-35.0),
            degrees_to_radians(70.0),
        );
        let q = Quaternion::from_euler(euler);
        assert_relative_eq!(q.magnitude(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(q.to_euler(), euler, epsilon = 1e-4);
    }

    #[test]
    fn test_integrate_quarter_turn() {
        let w = Vec3::new(0.0, 0.0, std::f32::consts::FRAC_PI_2);
        let q = Quaternion::IDENTITY.integrate(w, 1.0);
        assert!(quat_approx_eq(
            q,
            Quaternion::from_axis_angle(Vec3::Z, std::f32::consts::FRAC_PI_2)
        ));
        assert_eq!(Quaternion::IDENTITY.integrate(Vec3::ZERO, 1.0), Quaternion::IDENTITY);
    }

    #[test]
    fn test_normalize_degenerate_falls_back_to_identity() {
        let q = Quaternion::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(q.normalize(), Quaternion::IDENTITY);
    }
}
