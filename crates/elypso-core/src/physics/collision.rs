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

//! # Narrow Phase
//!
//! Pure geometric queries between pairs of rigid bodies. Nothing here mutates
//! a body: "what-if" variants take a hypothetical position instead.
//!
//! Two tiers are exposed. The AABB tests are a cheap prefilter; the oriented
//! tests (separating-axis for boxes, closest-point for spheres) are exact.
//! All overlap tests treat boundaries as closed: touching shapes collide.

use super::collider::{BoxCollider, Collider, SphereCollider};
use super::contact::{Contact, ContactManifold, MAX_CONTACTS};
use super::RigidBody;
use crate::math::{Aabb, Mat3, Quat, Vec3, EPSILON};

/// Cross products shorter than this come from (nearly) parallel edges and
/// are skipped as candidate axes.
const PARALLEL_EPSILON: f32 = 1e-6;

/// Slack used when deciding whether a vertex lies inside the other box.
const CONTACT_TOLERANCE: f32 = 1e-3;

/// An edge-edge axis only wins over the best face axis if it is shallower
/// by this factor. Keeps resting contacts from flickering between axes.
const EDGE_AXIS_BIAS: f32 = 0.95;

/// A box in world space: center, orientation axes and half-extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    /// World-space center.
    pub center: Vec3,
    /// Columns are the box's local X, Y and Z axes in world space.
    pub axes: Mat3,
    /// Half-extents along each local axis.
    pub half_extents: Vec3,
}

impl OrientedBox {
    /// Creates an oriented box from a pose and half-extents.
    pub fn new(center: Vec3, rotation: Quat, half_extents: Vec3) -> Self {
        Self {
            center,
            axes: Mat3::from_quat(rotation),
            half_extents,
        }
    }

    /// Builds the box of `shape` placed at `center` with `rotation`.
    pub fn from_collider(shape: &BoxCollider, center: Vec3, rotation: Quat) -> Self {
        Self::new(center, rotation, shape.effective_half_extents())
    }

    /// Returns the local axis `i` in world space.
    #[inline]
    pub fn axis(&self, i: usize) -> Vec3 {
        self.axes[i]
    }

    /// Half-length of the box's projection onto a unit `axis`.
    #[inline]
    pub fn projected_radius(&self, axis: Vec3) -> f32 {
        (0..3)
            .map(|i| self.half_extents[i] * self.axis(i).dot(axis).abs())
            .sum()
    }

    /// Expresses a world point in the box's local frame.
    #[inline]
    pub fn to_local(&self, point: Vec3) -> Vec3 {
        let d = point - self.center;
        Vec3::new(d.dot(self.axis(0)), d.dot(self.axis(1)), d.dot(self.axis(2)))
    }

    /// Maps a local-frame point back to world space.
    #[inline]
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.center + self.axes * local
    }

    /// The eight corners, in a fixed order.
    pub fn vertices(&self) -> [Vec3; 8] {
        let mut out = [Vec3::ZERO; 8];
        for (n, slot) in out.iter_mut().enumerate() {
            let sign = |bit: usize| if n & bit == 0 { -1.0 } else { 1.0 };
            let local = Vec3::new(
                sign(1) * self.half_extents.x,
                sign(2) * self.half_extents.y,
                sign(4) * self.half_extents.z,
            );
            *slot = self.to_world(local);
        }
        out
    }

    /// Returns `true` if `point` is inside the box grown by `tolerance`.
    pub fn contains_point(&self, point: Vec3, tolerance: f32) -> bool {
        let local = self.to_local(point);
        (0..3).all(|i| local[i].abs() <= self.half_extents[i] + tolerance)
    }

    /// The point of the box furthest along `direction`.
    ///
    /// Axes perpendicular to `direction` contribute nothing, so a face-on
    /// query returns the face center rather than an arbitrary corner.
    pub fn support(&self, direction: Vec3) -> Vec3 {
        let mut local = Vec3::ZERO;
        for i in 0..3 {
            let d = self.axis(i).dot(direction);
            if d > PARALLEL_EPSILON {
                local[i] = self.half_extents[i];
            } else if d < -PARALLEL_EPSILON {
                local[i] = -self.half_extents[i];
            }
        }
        self.to_world(local)
    }
}

/// Result of the separating-axis search for an overlapping pair.
#[derive(Debug, Clone, Copy)]
struct AxisQuery {
    /// Unit axis of least overlap, oriented from A to B.
    axis: Vec3,
    /// Overlap along `axis`.
    depth: f32,
}

/// Overlap of the two boxes projected onto a unit `axis`, or `None` if the
/// axis separates them.
fn axis_overlap(a: &OrientedBox, b: &OrientedBox, offset: Vec3, axis: Vec3) -> Option<AxisQuery> {
    let distance = offset.dot(axis);
    let depth = a.projected_radius(axis) + b.projected_radius(axis) - distance.abs();
    if depth < 0.0 {
        return None;
    }
    let axis = if distance < 0.0 { -axis } else { axis };
    Some(AxisQuery { axis, depth })
}

fn keep_shallowest(best: &mut Option<AxisQuery>, candidate: AxisQuery) {
    match best {
        Some(current) if current.depth <= candidate.depth => {}
        _ => *best = Some(candidate),
    }
}

/// Separating-axis test over the 15 candidate axes of two boxes.
///
/// Returns `None` as soon as a separating axis is found.
fn sat_query(a: &OrientedBox, b: &OrientedBox) -> Option<AxisQuery> {
    let offset = b.center - a.center;
    let mut best_face = None;
    let mut best_edge = None;

    for i in 0..3 {
        keep_shallowest(&mut best_face, axis_overlap(a, b, offset, a.axis(i))?);
        keep_shallowest(&mut best_face, axis_overlap(a, b, offset, b.axis(i))?);
    }

    for i in 0..3 {
        for j in 0..3 {
            let cross = a.axis(i).cross(b.axis(j));
            let len_sq = cross.length_squared();
            if len_sq < PARALLEL_EPSILON {
                continue;
            }
            let axis = cross / len_sq.sqrt();
            keep_shallowest(&mut best_edge, axis_overlap(a, b, offset, axis)?);
        }
    }

    match (best_face, best_edge) {
        (Some(face), Some(edge)) if edge.depth < face.depth * EDGE_AXIS_BIAS => Some(edge),
        (Some(face), _) => Some(face),
        (None, edge) => edge,
    }
}

fn push_unique(points: &mut Vec<Vec3>, p: Vec3) {
    let duplicate = points
        .iter()
        .any(|q| q.distance_squared(p) <= CONTACT_TOLERANCE * CONTACT_TOLERANCE);
    if !duplicate {
        points.push(p);
    }
}

/// Contact points for two overlapping boxes.
///
/// Corners of each box that lie inside the other become contacts. When no
/// corner is contained (edge-on-edge crossings) a single contact is placed
/// halfway between the two support features along the normal.
fn box_box_contacts(a: &OrientedBox, b: &OrientedBox, query: AxisQuery) -> Vec<Contact> {
    let mut points = Vec::with_capacity(MAX_CONTACTS);
    for v in b.vertices() {
        if a.contains_point(v, CONTACT_TOLERANCE) {
            push_unique(&mut points, v);
        }
    }
    for v in a.vertices() {
        if b.contains_point(v, CONTACT_TOLERANCE) {
            push_unique(&mut points, v);
        }
    }
    if points.is_empty() {
        points.push((a.support(query.axis) + b.support(-query.axis)) * 0.5);
    }

    points
        .into_iter()
        .take(MAX_CONTACTS)
        .map(|point| Contact {
            point,
            normal: query.axis,
            penetration: query.depth,
        })
        .collect()
}

/// Sphere (A) against box (B); the normal points from the sphere to the box.
fn sphere_box_manifold(center: Vec3, radius: f32, obb: &OrientedBox) -> ContactManifold {
    let local = obb.to_local(center);
    let h = obb.half_extents;
    let clamped = Vec3::new(
        local.x.clamp(-h.x, h.x),
        local.y.clamp(-h.y, h.y),
        local.z.clamp(-h.z, h.z),
    );
    let delta = local - clamped;
    let dist_sq = delta.length_squared();
    if dist_sq > radius * radius {
        return ContactManifold::separated();
    }

    let (local_outward, depth, local_point) = if dist_sq > EPSILON * EPSILON {
        let dist = dist_sq.sqrt();
        (delta / dist, radius - dist, clamped)
    } else {
        // Center inside the box: push out through the nearest face.
        let mut axis = 0;
        let mut face_distance = f32::MAX;
        for i in 0..3 {
            let d = h[i] - local[i].abs();
            if d < face_distance {
                face_distance = d;
                axis = i;
            }
        }
        let sign = if local[axis] >= 0.0 { 1.0 } else { -1.0 };
        let mut outward = Vec3::ZERO;
        outward[axis] = sign;
        let mut on_face = local;
        on_face[axis] = sign * h[axis];
        (outward, radius + face_distance, on_face)
    };

    let outward = obb.axes * local_outward;
    ContactManifold::from_contacts(vec![Contact {
        point: obb.to_world(local_point),
        normal: -outward,
        penetration: depth,
    }])
}

fn sphere_sphere_manifold(pa: Vec3, ra: f32, pb: Vec3, rb: f32) -> ContactManifold {
    let delta = pb - pa;
    let dist_sq = delta.length_squared();
    let total_r = ra + rb;
    if dist_sq > total_r * total_r {
        return ContactManifold::separated();
    }
    let dist = dist_sq.sqrt();
    let normal = if dist > EPSILON { delta / dist } else { Vec3::Y };
    let depth = total_r - dist;
    ContactManifold::from_contacts(vec![Contact {
        point: pa + normal * (ra - depth * 0.5),
        normal,
        penetration: depth,
    }])
}

fn shapes_overlap(
    a: &Collider,
    pos_a: Vec3,
    rot_a: Quat,
    b: &Collider,
    pos_b: Vec3,
    rot_b: Quat,
) -> bool {
    match (a, b) {
        (Collider::Box(box_a), Collider::Box(box_b)) => {
            let obb_a = OrientedBox::from_collider(box_a, pos_a, rot_a);
            let obb_b = OrientedBox::from_collider(box_b, pos_b, rot_b);
            sat_query(&obb_a, &obb_b).is_some()
        }
        (Collider::Sphere(sa), Collider::Sphere(sb)) => {
            CollisionDetection::check_sphere_sphere_collision(sa, pos_a, sb, pos_b)
        }
        (Collider::Sphere(s), Collider::Box(bx)) => {
            CollisionDetection::check_sphere_box_collision(s, pos_a, bx, pos_b, rot_b)
        }
        (Collider::Box(bx), Collider::Sphere(s)) => {
            CollisionDetection::check_sphere_box_collision(s, pos_b, bx, pos_a, rot_a)
        }
    }
}

/// Narrow-phase collision detection entry points.
pub struct CollisionDetection;

impl CollisionDetection {
    /// Runs the separating-axis test on two box bodies and builds their manifold.
    ///
    /// The normal is the axis of least overlap, oriented from `a` to `b`, and
    /// every contact carries that overlap as its penetration. Separated boxes
    /// yield `colliding == false` and no contacts. Pairs involving a sphere
    /// are forwarded to [`CollisionDetection::generate_contact_manifold`].
    pub fn generate_obb_contact_manifold(a: &RigidBody, b: &RigidBody) -> ContactManifold {
        match (a.collider(), b.collider()) {
            (Collider::Box(box_a), Collider::Box(box_b)) => {
                let obb_a = OrientedBox::from_collider(box_a, a.position, a.rotation);
                let obb_b = OrientedBox::from_collider(box_b, b.position, b.rotation);
                match sat_query(&obb_a, &obb_b) {
                    Some(query) => {
                        ContactManifold::from_contacts(box_box_contacts(&obb_a, &obb_b, query))
                    }
                    None => ContactManifold::separated(),
                }
            }
            _ => Self::generate_contact_manifold(a, b),
        }
    }

    /// Builds the manifold for any pair of shapes, normal pointing from `a` to `b`.
    pub fn generate_contact_manifold(a: &RigidBody, b: &RigidBody) -> ContactManifold {
        match (a.collider(), b.collider()) {
            (Collider::Box(_), Collider::Box(_)) => Self::generate_obb_contact_manifold(a, b),
            (Collider::Sphere(sa), Collider::Sphere(sb)) => sphere_sphere_manifold(
                a.position,
                sa.effective_radius(),
                b.position,
                sb.effective_radius(),
            ),
            (Collider::Sphere(s), Collider::Box(bx)) => {
                let obb = OrientedBox::from_collider(bx, b.position, b.rotation);
                sphere_box_manifold(a.position, s.effective_radius(), &obb)
            }
            (Collider::Box(bx), Collider::Sphere(s)) => {
                let obb = OrientedBox::from_collider(bx, a.position, a.rotation);
                sphere_box_manifold(b.position, s.effective_radius(), &obb).inverted()
            }
        }
    }

    /// Exact overlap test between two bodies at their current poses.
    ///
    /// Box pairs use the separating-axis test; pairs with a sphere use the
    /// matching closest-point test.
    pub fn check_obb_collision(a: &RigidBody, b: &RigidBody) -> bool {
        Self::check_obb_collision_at(a, a.position, b)
    }

    /// Same as [`CollisionDetection::check_obb_collision`] with `moving_body`
    /// hypothetically placed at `future_position`.
    pub fn check_obb_collision_at(
        moving_body: &RigidBody,
        future_position: Vec3,
        other_body: &RigidBody,
    ) -> bool {
        shapes_overlap(
            moving_body.collider(),
            future_position,
            moving_body.rotation,
            other_body.collider(),
            other_body.position,
            other_body.rotation,
        )
    }

    /// Half-extents of the world axis-aligned box enclosing the body's collider.
    pub fn compute_aabb_from_obb(body: &RigidBody) -> Vec3 {
        match body.collider() {
            Collider::Box(bx) => {
                Mat3::from_quat(body.rotation).abs() * bx.effective_half_extents()
            }
            Collider::Sphere(s) => Vec3::splat(s.effective_radius()),
        }
    }

    /// Cheap axis-aligned overlap test, used to reject far-apart pairs.
    pub fn check_aabb_collision(a: &RigidBody, b: &RigidBody) -> bool {
        Self::check_aabb_collision_at(a, a.position, b)
    }

    /// Axis-aligned overlap test with `moving_body` placed at `future_position`.
    pub fn check_aabb_collision_at(
        moving_body: &RigidBody,
        future_position: Vec3,
        other_body: &RigidBody,
    ) -> bool {
        let a = Aabb::from_center_half_extents(
            future_position,
            Self::compute_aabb_from_obb(moving_body),
        );
        let b = Aabb::from_center_half_extents(
            other_body.position,
            Self::compute_aabb_from_obb(other_body),
        );
        a.intersects_aabb(&b)
    }

    /// Overlap test between two unrotated boxes at explicit positions.
    pub fn check_box_box_collision(
        box_a: &BoxCollider,
        pos_a: Vec3,
        box_b: &BoxCollider,
        pos_b: Vec3,
    ) -> bool {
        let a = Aabb::from_center_half_extents(pos_a, box_a.effective_half_extents());
        let b = Aabb::from_center_half_extents(pos_b, box_b.effective_half_extents());
        a.intersects_aabb(&b)
    }

    /// Squared-distance test between two spheres at explicit positions.
    pub fn check_sphere_sphere_collision(
        sphere_a: &SphereCollider,
        pos_a: Vec3,
        sphere_b: &SphereCollider,
        pos_b: Vec3,
    ) -> bool {
        let total_r = sphere_a.effective_radius() + sphere_b.effective_radius();
        pos_a.distance_squared(pos_b) <= total_r * total_r
    }

    /// Closest-point test between a sphere and an oriented box.
    pub fn check_sphere_box_collision(
        sphere: &SphereCollider,
        sphere_pos: Vec3,
        box_shape: &BoxCollider,
        box_pos: Vec3,
        box_rot: Quat,
    ) -> bool {
        let obb = OrientedBox::from_collider(box_shape, box_pos, box_rot);
        let local = obb.to_local(sphere_pos);
        let h = obb.half_extents;
        let closest = Vec3::new(
            local.x.clamp(-h.x, h.x),
            local.y.clamp(-h.y, h.y),
            local.z.clamp(-h.z, h.z),
        );
        let r = sphere.effective_radius();
        local.distance_squared(closest) <= r * r
    }
}
