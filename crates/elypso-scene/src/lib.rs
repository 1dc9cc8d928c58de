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


//! # Elypso Scene
//!
//! The game-side boundary of the physics stack: components that reference
//! bodies by handle, and the plain-text scene format that rebuilds them.

#![warn(missing_docs)]

pub mod component;
pub mod scene_file;

pub use component::{
    euler_degrees_to_quat, quat_to_euler_degrees, RigidBodyComponent, RigidBodySettings,
    TransformComponent,
};
pub use scene_file::{RigidBodyRecord, SceneFile, SceneFileError, SceneFileResult};
