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


//! Generational slot storage for rigid bodies.

use elypso_core::physics::{GameObjectHandle, RigidBody};

/// Slot arena owning every rigid body of a world.
///
/// Each slot remembers the handle it last issued. Removing a body frees the
/// slot for reuse; reusing it bumps the generation, so handles to the old
/// body stop resolving. A slot whose generation is exhausted is retired
/// instead of being recycled.
#[derive(Debug, Clone, Default)]
pub(crate) struct BodyStore {
    /// One entry per slot ever allocated. The body is `Some` while alive.
    slots: Vec<(GameObjectHandle, Option<RigidBody>)>,
    /// Indices available for reuse.
    freed: Vec<u32>,
    /// Number of live bodies.
    live: usize,
}

impl BodyStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `body` in a new or recycled slot and returns its handle.
    pub fn insert(&mut self, body: RigidBody) -> GameObjectHandle {
        self.live += 1;
        if let Some(index) = self.freed.pop() {
            let (handle, slot) = &mut self.slots[index as usize];
            handle.generation += 1;
            *slot = Some(body);
            *handle
        } else {
            let handle = GameObjectHandle {
                index: self.slots.len() as u32,
                generation: 0,
            };
            self.slots.push((handle, Some(body)));
            handle
        }
    }

    /// Removes the body behind `handle`, if it is alive.
    pub fn remove(&mut self, handle: GameObjectHandle) -> Option<RigidBody> {
        let (slot_handle, slot) = self.slots.get_mut(handle.index as usize)?;
        if slot_handle.generation != handle.generation {
            return None;
        }
        let body = slot.take()?;
        self.live -= 1;
        if slot_handle.generation < u32::MAX {
            self.freed.push(handle.index);
        }
        Some(body)
    }

    /// Returns the body behind `handle` if the handle is live.
    pub fn get(&self, handle: GameObjectHandle) -> Option<&RigidBody> {
        self.slots
            .get(handle.index as usize)
            .and_then(|(slot_handle, body)| {
                if slot_handle.generation == handle.generation {
                    body.as_ref()
                } else {
                    None
                }
            })
    }

    /// Mutable variant of [`BodyStore::get`].
    pub fn get_mut(&mut self, handle: GameObjectHandle) -> Option<&mut RigidBody> {
        self.slots
            .get_mut(handle.index as usize)
            .and_then(|(slot_handle, body)| {
                if slot_handle.generation == handle.generation {
                    body.as_mut()
                } else {
                    None
                }
            })
    }

    /// Number of live bodies.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Iterates over live bodies with their handles, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (GameObjectHandle, &RigidBody)> + '_ {
        self.slots
            .iter()
            .filter_map(|(handle, body)| body.as_ref().map(|b| (*handle, b)))
    }

    /// Mutably iterates over live bodies, in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RigidBody> + '_ {
        self.slots.iter_mut().filter_map(|(_, body)| body.as_mut())
    }

    /// Raw indices of all live slots, in ascending order.
    pub fn live_indices(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, (_, body))| body.as_ref().map(|_| i))
            .collect()
    }

    /// The body in raw slot `index`, if alive.
    pub fn slot(&self, index: usize) -> Option<&RigidBody> {
        self.slots.get(index).and_then(|(_, body)| body.as_ref())
    }

    /// Mutable access to two distinct live slots at once.
    pub fn pair_mut(&mut self, a: usize, b: usize) -> Option<(&mut RigidBody, &mut RigidBody)> {
        if a == b || a >= self.slots.len() || b >= self.slots.len() {
            return None;
        }
        if a < b {
            let (left, right) = self.slots.split_at_mut(b);
            Some((left[a].1.as_mut()?, right[0].1.as_mut()?))
        } else {
            let (left, right) = self.slots.split_at_mut(a);
            Some((right[0].1.as_mut()?, left[b].1.as_mut()?))
        }
    }
}
