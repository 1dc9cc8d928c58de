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

use crate::math::Vec3;

/// Upper bound on the number of contacts a single manifold carries.
pub const MAX_CONTACTS: usize = 8;

/// A single contact point between two bodies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// World-space contact point.
    pub point: Vec3,
    /// Unit normal pointing from body A to body B.
    pub normal: Vec3,
    /// Overlap along the normal; `>= 0` while touching or overlapping.
    pub penetration: f32,
}

/// The result of a narrow-phase query between two bodies.
///
/// Built fresh for every query and owned by the caller. A non-colliding
/// manifold is the normal outcome of most checks, not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactManifold {
    /// Whether the two shapes touch or overlap.
    pub colliding: bool,
    /// Contact points, in a stable order for a given input.
    pub contacts: Vec<Contact>,
}

impl ContactManifold {
    /// A manifold describing separated shapes.
    pub fn separated() -> Self {
        Self::default()
    }

    /// Builds a colliding manifold from its contacts.
    pub fn from_contacts(mut contacts: Vec<Contact>) -> Self {
        contacts.truncate(MAX_CONTACTS);
        Self {
            colliding: !contacts.is_empty(),
            contacts,
        }
    }

    /// The shared contact normal, if any contact exists.
    pub fn normal(&self) -> Option<Vec3> {
        self.contacts.first().map(|c| c.normal)
    }

    /// The deepest penetration among all contacts, `0.0` when empty.
    pub fn max_penetration(&self) -> f32 {
        self.contacts
            .iter()
            .map(|c| c.penetration)
            .fold(0.0, f32::max)
    }

    /// Returns the manifold as seen from the other body (normals flipped).
    pub fn inverted(mut self) -> Self {
        for contact in &mut self.contacts {
            contact.normal = -contact.normal;
        }
        self
    }
}
