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


//! World configuration, stored as RON text.

use std::path::Path;

use elypso_core::math::Vec3;
use elypso_core::physics::SolverSettings;
use serde::{Deserialize, Serialize};

use crate::error::PhysicsResult;

/// Configuration of a [`PhysicsWorld`](crate::PhysicsWorld).
///
/// Missing fields fall back to their defaults when loaded from RON, so a
/// file only needs to name what it overrides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Acceleration applied to bodies that use gravity.
    pub gravity: Vec3,
    /// Impulse solver constants.
    pub solver: SolverSettings,
    /// Step length used by [`PhysicsWorld::advance`](crate::PhysicsWorld::advance), in seconds.
    pub fixed_dt: f32,
    /// Maximum number of fixed steps a single `advance` call may run.
    /// Leftover time beyond that is dropped.
    pub max_substeps: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            solver: SolverSettings::default(),
            fixed_dt: 1.0 / 60.0,
            max_substeps: 8,
        }
    }
}

impl PhysicsConfig {
    /// Parses a configuration from RON text.
    pub fn from_ron_str(text: &str) -> PhysicsResult<Self> {
        Ok(ron::de::from_str(text)?)
    }

    /// Reads and parses a RON configuration file.
    pub fn load(path: impl AsRef<Path>) -> PhysicsResult<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        let config = ron::de::from_bytes(&bytes)?;
        log::debug!("Loaded physics configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Serializes the configuration as pretty-printed RON.
    pub fn to_ron_string(&self) -> PhysicsResult<String> {
        let pretty_config = ron::ser::PrettyConfig::default().indentor("  ".to_string());
        Ok(ron::ser::to_string_pretty(self, pretty_config)?)
    }

    /// Writes the configuration to a RON file.
    pub fn save(&self, path: impl AsRef<Path>) -> PhysicsResult<()> {
        std::fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }
}
