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


//! Error type of the physics crate.

use elypso_core::physics::{GameObjectHandle, ParseColliderTypeError};
use thiserror::Error;

/// Errors reported by the physics world and its configuration.
#[derive(Error, Debug)]
pub enum PhysicsError {
    /// A collider shape name did not match any known shape.
    #[error("'{0}' is not a valid collider shape")]
    UnknownColliderType(String),
    /// The handle does not refer to a live body.
    #[error("handle {0:?} does not refer to a live rigid body")]
    StaleHandle(GameObjectHandle),
    /// The configuration text could not be parsed.
    #[error("failed to parse physics configuration: {0}")]
    Config(#[from] ron::error::SpannedError),
    /// The configuration could not be serialized.
    #[error("failed to serialize physics configuration: {0}")]
    Serialize(#[from] ron::Error),
    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ParseColliderTypeError> for PhysicsError {
    fn from(err: ParseColliderTypeError) -> Self {
        PhysicsError::UnknownColliderType(err.input)
    }
}

/// Result alias used throughout the physics crate.
pub type PhysicsResult<T> = Result<T, PhysicsError>;
