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


//! Game-side components that reference bodies owned by a [`PhysicsWorld`].
//!
//! A component only holds a [`GameObjectHandle`]. Every accessor takes the
//! world explicitly and re-resolves the handle, so a body destroyed elsewhere
//! turns the accessor into a logged no-op instead of a dangling access.

use std::sync::Arc;

use elypso_core::math::{degrees_to_radians, radians_to_degrees, Quat, Vec3};
use elypso_core::physics::{ColliderType, GameObjectHandle, RigidBody, RigidBodyDesc};
use elypso_physics::{Caller, ConsoleSink, MessageType, PhysicsError, PhysicsWorld};

/// Position, orientation and scale of a game object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformComponent {
    /// World position.
    pub position: Vec3,
    /// Euler angles in **degrees** (pitch, yaw, roll).
    pub rotation: Vec3,
    /// Logical scale.
    pub scale: Vec3,
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

/// Converts Euler angles in degrees to a quaternion.
pub fn euler_degrees_to_quat(degrees: Vec3) -> Quat {
    Quat::from_euler(Vec3::new(
        degrees_to_radians(degrees.x),
        degrees_to_radians(degrees.y),
        degrees_to_radians(degrees.z),
    ))
}

/// Converts a quaternion to Euler angles in degrees.
pub fn quat_to_euler_degrees(rotation: Quat) -> Vec3 {
    let radians = rotation.to_euler();
    Vec3::new(
        radians_to_degrees(radians.x),
        radians_to_degrees(radians.y),
        radians_to_degrees(radians.z),
    )
}

impl TransformComponent {
    /// The rotation as a quaternion.
    pub fn rotation_quat(&self) -> Quat {
        euler_degrees_to_quat(self.rotation)
    }
}

/// Construction parameters of a [`RigidBodyComponent`].
///
/// The collider shape is kept as text: this is the boundary where names
/// from editors and scene files are turned into a [`ColliderType`].
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBodySettings {
    /// Shape name, `"BOX"` or `"SPHERE"` (case-insensitive).
    pub collider_type: String,
    /// Whether the body is moved by the simulation.
    pub is_dynamic: bool,
    /// Whether gravity applies.
    pub use_gravity: bool,
    /// Gravity multiplier.
    pub gravity_factor: f32,
    /// Mass in kilograms.
    pub mass: f32,
    /// Bounciness.
    pub restitution: f32,
    /// Static friction coefficient.
    pub static_friction: f32,
    /// Dynamic friction coefficient.
    pub dynamic_friction: f32,
}

impl Default for RigidBodySettings {
    fn default() -> Self {
        Self {
            collider_type: ColliderType::Box.to_string(),
            is_dynamic: true,
            use_gravity: true,
            gravity_factor: 1.0,
            mass: 1.0,
            restitution: 0.5,
            static_friction: 0.5,
            dynamic_friction: 0.3,
        }
    }
}

/// A game object's link to its rigid body.
#[derive(Clone)]
pub struct RigidBodyComponent {
    handle: GameObjectHandle,
    sink: Arc<dyn ConsoleSink>,
}

impl std::fmt::Debug for RigidBodyComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RigidBodyComponent")
            .field("handle", &self.handle)
            .finish()
    }
}

fn format_vec3(v: Vec3) -> String {
    format!("{}, {}, {}", v.x, v.y, v.z)
}

impl RigidBodyComponent {
    /// Creates the body in `world` from a transform and settings.
    ///
    /// An unknown collider name is reported through `sink` and leaves the
    /// component with an invalid handle; nothing is allocated in that case.
    pub fn new(
        world: &mut PhysicsWorld,
        sink: Arc<dyn ConsoleSink>,
        transform: &TransformComponent,
        settings: &RigidBodySettings,
    ) -> Self {
        let mut component = Self {
            handle: GameObjectHandle::INVALID,
            sink,
        };

        let desc = RigidBodyDesc {
            position: transform.position,
            rotation: transform.rotation_quat(),
            scale: transform.scale,
            mass: settings.mass,
            restitution: settings.restitution,
            static_friction: settings.static_friction,
            dynamic_friction: settings.dynamic_friction,
            gravity_factor: settings.gravity_factor,
            is_dynamic: settings.is_dynamic,
            use_gravity: settings.use_gravity,
            ..Default::default()
        };

        let handle = match world.create_rigid_body_named(&settings.collider_type, desc) {
            Ok(handle) => handle,
            Err(PhysicsError::UnknownColliderType(name)) => {
                component.sink.write(
                    Caller::Input,
                    MessageType::Exception,
                    &format!(
                        "Failed to initialize rigidbody because the colliderType '{}' is not a valid shape!",
                        name
                    ),
                );
                return component;
            }
            Err(err) => {
                component.sink.write(
                    Caller::Input,
                    MessageType::Exception,
                    &format!("Failed to initialize rigidbody: {}", err),
                );
                return component;
            }
        };

        if world.get_rigid_body(handle).is_none() {
            component.sink.write(
                Caller::Input,
                MessageType::Exception,
                "Failed to initialize rigidbody!",
            );
        } else {
            component.handle = handle;
            component.sink.write(
                Caller::Input,
                MessageType::Info,
                "Successfully initialized rigidbody!",
            );
        }
        component
    }

    /// The handle of the referenced body; [`GameObjectHandle::INVALID`] if
    /// construction failed.
    pub fn handle(&self) -> GameObjectHandle {
        self.handle
    }

    /// Returns `true` if the referenced body is still alive in `world`.
    pub fn is_valid(&self, world: &PhysicsWorld) -> bool {
        world.is_valid(self.handle)
    }

    /// Destroys the referenced body. Returns `false` if it was already gone.
    pub fn destroy(&mut self, world: &mut PhysicsWorld) -> bool {
        let destroyed = world.destroy_rigid_body(self.handle);
        self.handle = GameObjectHandle::INVALID;
        destroyed
    }

    fn with_body<R>(
        &self,
        world: &mut PhysicsWorld,
        operation: &str,
        f: impl FnOnce(&mut RigidBody) -> R,
    ) -> Option<R> {
        match world.require_rigid_body_mut(self.handle) {
            Ok(body) => Some(f(body)),
            Err(err) => {
                self.sink.write(
                    Caller::Input,
                    MessageType::Warning,
                    &format!("Cannot {}: {}", operation, err),
                );
                None
            }
        }
    }

    fn read_body<R>(&self, world: &PhysicsWorld, f: impl FnOnce(&RigidBody) -> R) -> Option<R> {
        let body = world.get_rigid_body(self.handle);
        if body.is_none() {
            log::warn!("Rigid body {:?} is no longer alive", self.handle);
        }
        body.map(f)
    }

    // --- Transform ---

    /// Moves the body. Writes a diagnostic only when the position changes.
    pub fn set_position(&self, world: &mut PhysicsWorld, position: Vec3) -> bool {
        let changed = self
            .with_body(world, "set position", |body| body.set_position(position))
            .unwrap_or(false);
        if changed {
            self.sink.write(
                Caller::Input,
                MessageType::Debug,
                &format!("new box position: {}", format_vec3(position)),
            );
        }
        changed
    }

    /// Rotates the body to Euler angles given in degrees.
    pub fn set_rotation(&self, world: &mut PhysicsWorld, euler_degrees: Vec3) -> bool {
        let rotation = euler_degrees_to_quat(euler_degrees);
        let changed = self
            .with_body(world, "set rotation", |body| body.set_rotation(rotation))
            .unwrap_or(false);
        if changed {
            self.sink.write(
                Caller::Input,
                MessageType::Debug,
                &format!("new box rotation: {}", format_vec3(euler_degrees)),
            );
        }
        changed
    }

    /// Sets the logical scale and resizes the collider from it.
    pub fn set_scale(&self, world: &mut PhysicsWorld, scale: Vec3) -> bool {
        let outcome = self.with_body(world, "set scale", |body| {
            (body.set_scale(scale), body.collider_type())
        });
        let Some((true, collider_type)) = outcome else {
            return false;
        };
        let message = match collider_type {
            ColliderType::Box => format!("new box size: {}", format_vec3(scale)),
            ColliderType::Sphere => format!("new sphere radius: {}", scale.x),
        };
        self.sink.write(Caller::Input, MessageType::Debug, &message);
        true
    }

    /// Position of the body.
    pub fn position(&self, world: &PhysicsWorld) -> Option<Vec3> {
        self.read_body(world, |body| body.position)
    }

    /// Rotation of the body as Euler angles in degrees.
    pub fn rotation(&self, world: &PhysicsWorld) -> Option<Vec3> {
        self.read_body(world, |body| quat_to_euler_degrees(body.rotation))
    }

    /// Size of the collider: full box size, or `(radius, 0, 0)` for spheres.
    pub fn scale(&self, world: &PhysicsWorld) -> Option<Vec3> {
        self.read_body(world, |body| body.collider().logical_scale())
    }

    /// Shape of the collider.
    pub fn collider_type(&self, world: &PhysicsWorld) -> Option<ColliderType> {
        self.read_body(world, |body| body.collider_type())
    }

    // --- Motion ---

    /// Sets the linear velocity.
    pub fn set_velocity(&self, world: &mut PhysicsWorld, velocity: Vec3) -> bool {
        self.with_body(world, "set velocity", |body| body.set_velocity(velocity))
            .unwrap_or(false)
    }

    /// Sets the angular velocity (radians per second).
    pub fn set_angular_velocity(&self, world: &mut PhysicsWorld, angular_velocity: Vec3) -> bool {
        self.with_body(world, "set angular velocity", |body| {
            body.set_angular_velocity(angular_velocity)
        })
        .unwrap_or(false)
    }

    /// Zeroes the linear velocity.
    pub fn reset_velocity(&self, world: &mut PhysicsWorld) {
        self.with_body(world, "reset velocity", RigidBody::reset_velocity);
    }

    /// Zeroes the angular velocity.
    pub fn reset_angular_velocity(&self, world: &mut PhysicsWorld) {
        self.with_body(world, "reset angular velocity", RigidBody::reset_angular_velocity);
    }

    /// Linear velocity.
    pub fn velocity(&self, world: &PhysicsWorld) -> Option<Vec3> {
        self.read_body(world, |body| body.velocity)
    }

    /// Angular velocity.
    pub fn angular_velocity(&self, world: &PhysicsWorld) -> Option<Vec3> {
        self.read_body(world, |body| body.angular_velocity)
    }

    // --- Material ---

    /// Marks the body as dynamic or static.
    pub fn set_dynamic(&self, world: &mut PhysicsWorld, is_dynamic: bool) -> bool {
        self.with_body(world, "set dynamic", |body| body.set_dynamic(is_dynamic))
            .unwrap_or(false)
    }

    /// Enables or disables gravity.
    pub fn enable_gravity(&self, world: &mut PhysicsWorld, use_gravity: bool) -> bool {
        self.with_body(world, "enable gravity", |body| body.set_use_gravity(use_gravity))
            .unwrap_or(false)
    }

    /// Sets the gravity multiplier.
    pub fn set_gravity_factor(&self, world: &mut PhysicsWorld, gravity_factor: f32) -> bool {
        self.with_body(world, "set gravity factor", |body| {
            body.set_gravity_factor(gravity_factor)
        })
        .unwrap_or(false)
    }

    /// Sets the mass.
    pub fn set_mass(&self, world: &mut PhysicsWorld, mass: f32) -> bool {
        self.with_body(world, "set mass", |body| body.set_mass(mass))
            .unwrap_or(false)
    }

    /// Sets the restitution.
    pub fn set_restitution(&self, world: &mut PhysicsWorld, restitution: f32) -> bool {
        self.with_body(world, "set restitution", |body| body.set_restitution(restitution))
            .unwrap_or(false)
    }

    /// Sets the static friction coefficient.
    pub fn set_static_friction(&self, world: &mut PhysicsWorld, static_friction: f32) -> bool {
        self.with_body(world, "set static friction", |body| {
            body.set_static_friction(static_friction)
        })
        .unwrap_or(false)
    }

    /// Sets the dynamic friction coefficient.
    pub fn set_dynamic_friction(&self, world: &mut PhysicsWorld, dynamic_friction: f32) -> bool {
        self.with_body(world, "set dynamic friction", |body| {
            body.set_dynamic_friction(dynamic_friction)
        })
        .unwrap_or(false)
    }

    /// Whether the body is dynamic.
    pub fn is_dynamic(&self, world: &PhysicsWorld) -> Option<bool> {
        self.read_body(world, |body| body.is_dynamic)
    }

    /// Whether gravity applies.
    pub fn use_gravity(&self, world: &PhysicsWorld) -> Option<bool> {
        self.read_body(world, |body| body.use_gravity)
    }

    /// Gravity multiplier.
    pub fn gravity_factor(&self, world: &PhysicsWorld) -> Option<f32> {
        self.read_body(world, |body| body.gravity_factor)
    }

    /// Mass.
    pub fn mass(&self, world: &PhysicsWorld) -> Option<f32> {
        self.read_body(world, |body| body.mass)
    }

    /// Restitution.
    pub fn restitution(&self, world: &PhysicsWorld) -> Option<f32> {
        self.read_body(world, |body| body.restitution)
    }

    /// Static friction coefficient.
    pub fn static_friction(&self, world: &PhysicsWorld) -> Option<f32> {
        self.read_body(world, |body| body.static_friction)
    }

    /// Dynamic friction coefficient.
    pub fn dynamic_friction(&self, world: &PhysicsWorld) -> Option<f32> {
        self.read_body(world, |body| body.dynamic_friction)
    }

    /// Snapshot of the body's construction parameters, for saving.
    pub fn settings(&self, world: &PhysicsWorld) -> Option<RigidBodySettings> {
        self.read_body(world, |body| RigidBodySettings {
            collider_type: body.collider_type().to_string(),
            is_dynamic: body.is_dynamic,
            use_gravity: body.use_gravity,
            gravity_factor: body.gravity_factor,
            mass: body.mass,
            restitution: body.restitution,
            static_friction: body.static_friction,
            dynamic_friction: body.dynamic_friction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use elypso_physics::RecordingSink;

    fn setup() -> (PhysicsWorld, Arc<RecordingSink>) {
        (PhysicsWorld::default(), Arc::new(RecordingSink::new()))
    }

    #[test]
    fn test_unknown_collider_type_allocates_nothing() {
        // --- 1. SETUP ---
        let (mut world, sink) = setup();
        let settings = RigidBodySettings {
            collider_type: "CAPSULE".to_string(),
            ..Default::default()
        };

        // --- 2. ACTION ---
        let component = RigidBodyComponent::new(
            &mut world,
            sink.clone(),
            &TransformComponent::default(),
            &settings,
        );

        // --- 3. ASSERTIONS ---
        assert!(component.handle().is_null());
        assert!(world.is_empty());
        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].kind, MessageType::Exception);
        assert_eq!(
            messages[0].message,
            "Failed to initialize rigidbody because the colliderType 'CAPSULE' is not a valid shape!"
        );
    }

    #[test]
    fn test_successful_construction_reports_info() {
        let (mut world, sink) = setup();
        let transform = TransformComponent {
            position: Vec3::new(0.0, 5.0, 0.0),
            rotation: Vec3::new(0.0, 45.0, 0.0),
            scale: Vec3::new(2.0, 2.0, 2.0),
        };
        let settings = RigidBodySettings {
            collider_type: "sphere".to_string(),
            mass: 2.5,
            ..Default::default()
        };

        let component = RigidBodyComponent::new(&mut world, sink.clone(), &transform, &settings);

        assert!(component.is_valid(&world));
        assert_eq!(sink.messages()[0].kind, MessageType::Info);
        assert_eq!(component.position(&world), Some(Vec3::new(0.0, 5.0, 0.0)));
        assert_eq!(component.collider_type(&world), Some(ColliderType::Sphere));
        assert_eq!(component.scale(&world), Some(Vec3::new(2.0, 0.0, 0.0)));
        assert_eq!(component.mass(&world), Some(2.5));
        assert_relative_eq!(component.rotation(&world).unwrap().y, 45.0, epsilon = 1e-3);
    }

    #[test]
    fn test_repeated_setter_writes_nothing() {
        let (mut world, sink) = setup();
        let component = RigidBodyComponent::new(
            &mut world,
            sink.clone(),
            &TransformComponent::default(),
            &RigidBodySettings::default(),
        );
        sink.clear();

        assert!(component.set_position(&mut world, Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(sink.len(), 1);
        assert!(!component.set_position(&mut world, Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(sink.len(), 1);

        assert!(component.set_mass(&mut world, 4.0));
        assert!(!component.set_mass(&mut world, 4.0));
        assert_eq!(component.mass(&world), Some(4.0));
        assert_eq!(sink.len(), 1);

        assert!(component.set_scale(&mut world, Vec3::splat(3.0)));
        assert!(!component.set_scale(&mut world, Vec3::splat(3.0)));
        assert_eq!(component.scale(&world), Some(Vec3::splat(3.0)));
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_scale_diagnostic_names_the_shape() {
        let (mut world, sink) = setup();
        let cube = RigidBodyComponent::new(
            &mut world,
            sink.clone(),
            &TransformComponent::default(),
            &RigidBodySettings::default(),
        );
        let ball = RigidBodyComponent::new(
            &mut world,
            sink.clone(),
            &TransformComponent::default(),
            &RigidBodySettings {
                collider_type: "SPHERE".to_string(),
                ..Default::default()
            },
        );
        sink.clear();

        assert!(cube.set_scale(&mut world, Vec3::new(2.0, 3.0, 4.0)));
        assert!(ball.set_scale(&mut world, Vec3::new(1.5, 0.0, 0.0)));

        let messages = sink.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].message, "new box size: 2, 3, 4");
        assert_eq!(messages[1].message, "new sphere radius: 1.5");
        assert_eq!(ball.scale(&world), Some(Vec3::new(1.5, 0.0, 0.0)));
    }

    #[test]
    fn test_stale_handle_is_a_logged_noop() {
        let (mut world, sink) = setup();
        let mut component = RigidBodyComponent::new(
            &mut world,
            sink.clone(),
            &TransformComponent::default(),
            &RigidBodySettings::default(),
        );
        let other = component.clone();
        assert!(component.destroy(&mut world));
        sink.clear();

        assert!(!other.set_position(&mut world, Vec3::ONE));
        assert!(!other.set_mass(&mut world, 3.0));
        other.reset_velocity(&mut world);
        assert_eq!(other.position(&world), None);
        assert_eq!(other.mass(&world), None);

        let messages = sink.messages();
        assert_eq!(messages.len(), 3);
        assert!(messages.iter().all(|m| m.kind == MessageType::Warning));
    }

    #[test]
    fn test_settings_snapshot_reflects_writes() {
        let (mut world, sink) = setup();
        let component = RigidBodyComponent::new(
            &mut world,
            sink,
            &TransformComponent::default(),
            &RigidBodySettings::default(),
        );
        component.set_dynamic(&mut world, false);
        component.enable_gravity(&mut world, false);
        component.set_restitution(&mut world, 0.9);

        let settings = component.settings(&world).unwrap();
        assert!(!settings.is_dynamic);
        assert!(!settings.use_gravity);
        assert_eq!(settings.restitution, 0.9);
        assert_eq!(settings.collider_type, "BOX");
    }
}
