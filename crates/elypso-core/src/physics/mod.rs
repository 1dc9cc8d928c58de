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

//! # Physics Data Model
//!
//! Rigid-body state, collider shapes, contact manifolds and the pure
//! collision / impulse math. Storage and stepping live in `elypso-physics`;
//! nothing in this module owns more than a single body.

mod body;
mod collider;
mod collision;
mod contact;
mod solver;

pub use body::{RigidBody, RigidBodyDesc};
pub use collider::{
    BoxCollider, Collider, ColliderType, ParseColliderTypeError, SphereCollider, MIN_EXTENT,
};
pub use collision::{CollisionDetection, OrientedBox};
pub use contact::{Contact, ContactManifold, MAX_CONTACTS};
pub use solver::{ImpulseSolver, SolverSettings};

use serde::{Deserialize, Serialize};

/// Opaque, copyable reference to a rigid body owned by a physics world.
///
/// It combines a slot index with a generation count. When a body is destroyed
/// its slot can be recycled, but the generation is incremented, so handles to
/// the old body never resolve to the new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameObjectHandle {
    /// Slot index in the world's body storage.
    pub index: u32,
    /// Generation of the slot at the time the handle was issued.
    pub generation: u32,
}

impl GameObjectHandle {
    /// A handle that never resolves to a body.
    pub const INVALID: Self = Self {
        index: u32::MAX,
        generation: u32::MAX,
    };

    /// Returns `true` for the [`GameObjectHandle::INVALID`] sentinel.
    ///
    /// A handle that is not null may still be stale; only the owning world
    /// can tell.
    #[inline]
    pub fn is_null(&self) -> bool {
        *self == Self::INVALID
    }
}

impl Default for GameObjectHandle {
    fn default() -> Self {
        Self::INVALID
    }
}
