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


//! # Elypso Physics
//!
//! The physics world: generational storage for rigid bodies, the fixed-step
//! simulation pipeline and its configuration.

#![warn(missing_docs)]

pub mod config;
pub mod console;
pub mod error;
mod storage;
pub mod world;

pub use config::PhysicsConfig;
pub use console::{Caller, ConsoleMessage, ConsoleSink, LogSink, MessageType, RecordingSink};
pub use error::{PhysicsError, PhysicsResult};
pub use world::{PhysicsWorld, StepReport};

pub use elypso_core::physics::{GameObjectHandle, RigidBody, RigidBodyDesc};
