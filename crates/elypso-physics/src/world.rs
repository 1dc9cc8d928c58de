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


//! # Physics World
//!
//! Owns every rigid body and advances the simulation. Consumers hold
//! [`GameObjectHandle`]s and must re-resolve them on every access: a handle
//! may go stale at any time once its body is destroyed.
//!
//! The world is single-threaded. A multi-threaded host must serialize every
//! call, e.g. by owning the world on one thread.

use std::sync::Arc;

use elypso_core::math::Vec3;
use elypso_core::physics::{
    ColliderType, CollisionDetection, ContactManifold, GameObjectHandle, ImpulseSolver,
    RigidBody, RigidBodyDesc,
};

use crate::config::PhysicsConfig;
use crate::console::{Caller, ConsoleSink, LogSink, MessageType};
use crate::error::{PhysicsError, PhysicsResult};
use crate::storage::BodyStore;

/// Diagnostics gathered during one [`PhysicsWorld::step_simulation`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Body pairs considered (pairs of two immovable bodies are skipped).
    pub pairs_tested: usize,
    /// Pairs whose bounding boxes overlapped.
    pub aabb_overlaps: usize,
    /// Pairs that produced a colliding manifold.
    pub manifolds: usize,
    /// Total contact points across all manifolds.
    pub contacts: usize,
}

/// The physics world: body storage plus the stepping pipeline.
pub struct PhysicsWorld {
    bodies: BodyStore,
    config: PhysicsConfig,
    solver: ImpulseSolver,
    accumulator: f32,
    sink: Arc<dyn ConsoleSink>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

impl std::fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("bodies", &self.bodies.len())
            .field("config", &self.config)
            .field("accumulator", &self.accumulator)
            .finish()
    }
}

impl PhysicsWorld {
    /// Creates an empty world that reports diagnostics through [`LogSink`].
    pub fn new(config: PhysicsConfig) -> Self {
        Self::with_sink(config, Arc::new(LogSink))
    }

    /// Creates an empty world with an explicit console sink.
    pub fn with_sink(config: PhysicsConfig, sink: Arc<dyn ConsoleSink>) -> Self {
        log::debug!("Creating physics world with gravity {:?}", config.gravity);
        Self {
            bodies: BodyStore::new(),
            solver: ImpulseSolver::new(config.solver),
            config,
            accumulator: 0.0,
            sink,
        }
    }

    /// Replaces the console sink.
    pub fn set_sink(&mut self, sink: Arc<dyn ConsoleSink>) {
        self.sink = sink;
    }

    /// The active configuration.
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// World gravity.
    pub fn gravity(&self) -> Vec3 {
        self.config.gravity
    }

    /// Sets the world gravity.
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.config.gravity = gravity;
    }

    /// Allocates a body from `desc` and returns its handle.
    ///
    /// The body is stored exactly as described; nothing is validated.
    pub fn create_rigid_body(&mut self, desc: &RigidBodyDesc) -> GameObjectHandle {
        let handle = self.bodies.insert(RigidBody::new(desc));
        log::debug!(
            "Created {} rigid body {:?} at {:?}",
            desc.collider_type,
            handle,
            desc.position
        );
        handle
    }

    /// Like [`PhysicsWorld::create_rigid_body`], with the shape given by name.
    ///
    /// An unknown name allocates nothing.
    pub fn create_rigid_body_named(
        &mut self,
        collider_type: &str,
        desc: RigidBodyDesc,
    ) -> PhysicsResult<GameObjectHandle> {
        let collider_type: ColliderType = collider_type.parse()?;
        Ok(self.create_rigid_body(&RigidBodyDesc {
            collider_type,
            ..desc
        }))
    }

    /// Returns the body behind `handle`, or `None` if the handle is stale or
    /// was never issued by this world.
    pub fn get_rigid_body(&self, handle: GameObjectHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    /// Mutable variant of [`PhysicsWorld::get_rigid_body`].
    pub fn get_rigid_body_mut(&mut self, handle: GameObjectHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }

    /// Like [`PhysicsWorld::get_rigid_body_mut`], reporting a stale handle as an error.
    pub fn require_rigid_body_mut(
        &mut self,
        handle: GameObjectHandle,
    ) -> PhysicsResult<&mut RigidBody> {
        self.bodies
            .get_mut(handle)
            .ok_or(PhysicsError::StaleHandle(handle))
    }

    /// Destroys the body behind `handle`.
    ///
    /// Returns `false` (and writes a warning) if the handle was already stale.
    pub fn destroy_rigid_body(&mut self, handle: GameObjectHandle) -> bool {
        if self.bodies.remove(handle).is_some() {
            log::debug!("Destroyed rigid body {:?}", handle);
            true
        } else {
            self.sink.write(
                Caller::Physics,
                MessageType::Warning,
                &format!("Cannot destroy rigid body {:?}: handle is stale.", handle),
            );
            false
        }
    }

    /// Returns `true` if `handle` refers to a live body.
    pub fn is_valid(&self, handle: GameObjectHandle) -> bool {
        self.bodies.get(handle).is_some()
    }

    /// Number of live bodies.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Returns `true` if the world holds no bodies.
    pub fn is_empty(&self) -> bool {
        self.bodies.len() == 0
    }

    /// Handles of all live bodies.
    pub fn handles(&self) -> impl Iterator<Item = GameObjectHandle> + '_ {
        self.bodies.iter().map(|(handle, _)| handle)
    }

    /// Live bodies with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (GameObjectHandle, &RigidBody)> + '_ {
        self.bodies.iter()
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Applies gravity, resolves every colliding pair and then integrates
    /// positions and rotations. A non-positive or non-finite `dt` does nothing.
    pub fn step_simulation(&mut self, dt: f32) -> StepReport {
        if !(dt.is_finite() && dt > 0.0) {
            log::trace!("Skipping physics step with dt = {}", dt);
            return StepReport::default();
        }

        // 1. Integrate Forces
        self.integrate_velocities(dt);

        // 2. Resolve Collisions
        let report = self.solve_collisions();

        // 3. Integrate Positions
        self.integrate_positions(dt);

        log::trace!("Physics step: {:?}", report);
        report
    }

    /// Runs as many fixed steps as `frame_dt` (plus carried-over time) allows.
    ///
    /// Returns the number of steps taken. At most `max_substeps` steps run per
    /// call; time beyond that is dropped so a long frame cannot snowball.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        let fixed_dt = self.config.fixed_dt;
        if !(fixed_dt.is_finite() && fixed_dt > 0.0) {
            log::warn!("Invalid fixed timestep {}, nothing simulated", fixed_dt);
            return 0;
        }
        if frame_dt.is_finite() && frame_dt > 0.0 {
            self.accumulator += frame_dt;
        }

        let mut steps = 0;
        while self.accumulator >= fixed_dt && steps < self.config.max_substeps {
            self.step_simulation(fixed_dt);
            self.accumulator -= fixed_dt;
            steps += 1;
        }
        if self.accumulator >= fixed_dt {
            log::debug!(
                "Dropping {:.4}s of simulation time after {} substeps",
                self.accumulator,
                steps
            );
            self.accumulator = 0.0;
        }
        steps
    }

    /// Fraction of a fixed step currently accumulated, for render interpolation.
    pub fn interpolation_alpha(&self) -> f32 {
        if self.config.fixed_dt > 0.0 {
            (self.accumulator / self.config.fixed_dt).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    fn integrate_velocities(&mut self, dt: f32) {
        let gravity = self.config.gravity;
        for body in self.bodies.iter_mut() {
            if body.is_movable() && body.use_gravity {
                // v = v + g * factor * dt
                body.velocity += gravity * (body.gravity_factor * dt);
            }
        }
    }

    fn solve_collisions(&mut self) -> StepReport {
        let mut report = StepReport::default();
        let indices = self.bodies.live_indices();
        let mut colliding: Vec<(usize, usize, ContactManifold)> = Vec::new();

        for (n, &i) in indices.iter().enumerate() {
            for &j in &indices[n + 1..] {
                let (Some(a), Some(b)) = (self.bodies.slot(i), self.bodies.slot(j)) else {
                    continue;
                };
                if !a.is_movable() && !b.is_movable() {
                    continue;
                }
                report.pairs_tested += 1;

                if !CollisionDetection::check_aabb_collision(a, b) {
                    continue;
                }
                report.aabb_overlaps += 1;

                let manifold = CollisionDetection::generate_contact_manifold(a, b);
                if manifold.colliding {
                    report.manifolds += 1;
                    report.contacts += manifold.contacts.len();
                    colliding.push((i, j, manifold));
                }
            }
        }

        for _ in 0..self.solver.settings.iterations.max(1) {
            for (i, j, manifold) in &colliding {
                if let Some((a, b)) = self.bodies.pair_mut(*i, *j) {
                    self.solver.resolve_velocity(a, b, manifold);
                }
            }
        }

        for (i, j, manifold) in &colliding {
            if let Some((a, b)) = self.bodies.pair_mut(*i, *j) {
                self.solver.correct_positions(a, b, manifold);
            }
        }

        report
    }

    fn integrate_positions(&mut self, dt: f32) {
        for body in self.bodies.iter_mut() {
            if !body.is_movable() {
                continue;
            }
            body.position += body.velocity * dt;
            body.rotation = body.rotation.integrate(body.angular_velocity, dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::RecordingSink;
    use approx::assert_relative_eq;

    #[test]
    fn test_free_fall_matches_semi_implicit_euler() {
        let mut world = PhysicsWorld::default();
        let handle = world.create_rigid_body(&RigidBodyDesc {
            position: Vec3::new(0.0, 10.0, 0.0),
            ..Default::default()
        });

        let dt = 0.1;
        world.step_simulation(dt);
        world.step_simulation(dt);

        let body = world.get_rigid_body(handle).unwrap();
        assert_relative_eq!(body.velocity.y, -9.81 * 0.2, epsilon = 1e-4);
        // y = 10 - g*dt^2*(1 + 2)
        assert_relative_eq!(body.position.y, 10.0 - 9.81 * 0.01 * 3.0, epsilon = 1e-4);
    }

    #[test]
    fn test_gravity_factor_and_flags() {
        let mut world = PhysicsWorld::default();
        let half = world.create_rigid_body(&RigidBodyDesc {
            position: Vec3::new(0.0, 0.0, 0.0),
            gravity_factor: 0.5,
            ..Default::default()
        });
        let floating = world.create_rigid_body(&RigidBodyDesc {
            position: Vec3::new(10.0, 0.0, 0.0),
            use_gravity: false,
            ..Default::default()
        });
        let fixed = world.create_rigid_body(&RigidBodyDesc {
            position: Vec3::new(20.0, 0.0, 0.0),
            is_dynamic: false,
            ..Default::default()
        });

        world.step_simulation(1.0);

        assert_relative_eq!(world.get_rigid_body(half).unwrap().velocity.y, -4.905);
        assert_eq!(world.get_rigid_body(floating).unwrap().velocity, Vec3::ZERO);
        assert_eq!(
            world.get_rigid_body(fixed).unwrap().position,
            Vec3::new(20.0, 0.0, 0.0)
        );
    }

    #[test]
    fn test_invalid_dt_is_ignored() {
        let mut world = PhysicsWorld::default();
        let handle = world.create_rigid_body(&RigidBodyDesc::default());
        assert_eq!(world.step_simulation(0.0), StepReport::default());
        world.step_simulation(-1.0);
        world.step_simulation(f32::NAN);
        assert_eq!(world.get_rigid_body(handle).unwrap().position, Vec3::ZERO);
    }

    #[test]
    fn test_advance_caps_substeps() {
        let mut world = PhysicsWorld::new(PhysicsConfig {
            fixed_dt: 0.1,
            max_substeps: 3,
            ..Default::default()
        });
        assert_eq!(world.advance(0.05), 0);
        assert_eq!(world.advance(0.06), 1);
        assert_eq!(world.advance(10.0), 3);
        assert_eq!(world.interpolation_alpha(), 0.0);
    }

    #[test]
    fn test_named_creation_rejects_unknown_shape() {
        let mut world = PhysicsWorld::default();
        let err = world
            .create_rigid_body_named("CAPSULE", RigidBodyDesc::default())
            .unwrap_err();
        assert!(matches!(err, PhysicsError::UnknownColliderType(ref s) if s == "CAPSULE"));
        assert!(world.is_empty());

        let handle = world
            .create_rigid_body_named("sphere", RigidBodyDesc::default())
            .unwrap();
        assert_eq!(
            world.get_rigid_body(handle).unwrap().collider_type(),
            ColliderType::Sphere
        );
    }

    #[test]
    fn test_destroying_stale_handle_warns_through_sink() {
        let sink = Arc::new(RecordingSink::new());
        let mut world = PhysicsWorld::with_sink(PhysicsConfig::default(), sink.clone());
        let handle = world.create_rigid_body(&RigidBodyDesc::default());

        assert!(world.destroy_rigid_body(handle));
        assert!(sink.is_empty());
        assert!(!world.destroy_rigid_body(handle));

        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].kind, MessageType::Warning);
        assert!(matches!(
            world.require_rigid_body_mut(handle),
            Err(PhysicsError::StaleHandle(h)) if h == handle
        ));
    }

    #[test]
    fn test_static_pairs_are_not_tested() {
        let mut world = PhysicsWorld::default();
        for x in 0..3 {
            world.create_rigid_body(&RigidBodyDesc {
                position: Vec3::new(x as f32 * 0.5, 0.0, 0.0),
                is_dynamic: false,
                ..Default::default()
            });
        }
        let report = world.step_simulation(0.01);
        assert_eq!(report.pairs_tested, 0);
    }
}
