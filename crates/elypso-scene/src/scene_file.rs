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


//! Plain-text scene persistence.
//!
//! A scene file is a list of `key= value` lines. Vectors are written as
//! `x, y, z`. An `id` line starts a new object; every line before the first
//! `id` is a scene-level setting and is kept verbatim. Blank lines and lines
//! starting with `#` are ignored.
//!
//! ```text
//! backgroundColor= 0.1, 0.1, 0.1
//!
//! id= 1
//! name= Crate
//! position= 0, 3, 0
//! colliderType= BOX
//! mass= 2
//! ```

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use elypso_core::math::Vec3;
use elypso_physics::{ConsoleSink, PhysicsWorld};
use thiserror::Error;

use crate::component::{RigidBodyComponent, RigidBodySettings, TransformComponent};

/// Errors raised while reading or writing a scene file.
#[derive(Error, Debug)]
pub enum SceneFileError {
    /// The file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A non-empty line has no `=`.
    #[error("line {line}: expected 'key= value', got '{text}'")]
    MalformedLine {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        text: String,
    },
    /// A vector value does not have three numeric components.
    #[error("line {line}: '{value}' is not a valid vector for '{key}'")]
    MalformedVector {
        /// 1-based line number.
        line: usize,
        /// Key of the entry.
        key: String,
        /// The rejected value.
        value: String,
    },
    /// A scalar value is not a number.
    #[error("line {line}: '{value}' is not a valid number for '{key}'")]
    MalformedNumber {
        /// 1-based line number.
        line: usize,
        /// Key of the entry.
        key: String,
        /// The rejected value.
        value: String,
    },
    /// A flag is neither `true`/`false` nor `1`/`0`.
    #[error("line {line}: '{value}' is not a valid boolean for '{key}'")]
    MalformedBool {
        /// 1-based line number.
        line: usize,
        /// Key of the entry.
        key: String,
        /// The rejected value.
        value: String,
    },
    /// Text handed to [`RigidBodyRecord::parse`] held no object or several.
    #[error("expected exactly one object, found {0}")]
    ObjectCount(usize),
}

/// Result alias for scene file operations.
pub type SceneFileResult<T> = Result<T, SceneFileError>;

#[derive(Debug, Clone)]
struct Entry {
    line: usize,
    key: String,
    value: String,
}

fn split_entries(text: &str) -> SceneFileResult<Vec<Entry>> {
    let mut entries = Vec::new();
    for (n, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(SceneFileError::MalformedLine {
                line: n + 1,
                text: raw.to_string(),
            });
        };
        entries.push(Entry {
            line: n + 1,
            key: key.trim().to_string(),
            value: value.trim().to_string(),
        });
    }
    Ok(entries)
}

impl Entry {
    fn vec3(&self) -> SceneFileResult<Vec3> {
        let malformed = || SceneFileError::MalformedVector {
            line: self.line,
            key: self.key.clone(),
            value: self.value.clone(),
        };
        let parts: Vec<&str> = self.value.split(',').map(str::trim).collect();
        let [x, y, z] = parts.as_slice() else {
            return Err(malformed());
        };
        let parse = |s: &str| s.parse::<f32>().map_err(|_| malformed());
        Ok(Vec3::new(parse(*x)?, parse(*y)?, parse(*z)?))
    }

    fn f32(&self) -> SceneFileResult<f32> {
        self.value
            .parse()
            .map_err(|_| SceneFileError::MalformedNumber {
                line: self.line,
                key: self.key.clone(),
                value: self.value.clone(),
            })
    }

    fn u32(&self) -> SceneFileResult<u32> {
        self.value
            .parse()
            .map_err(|_| SceneFileError::MalformedNumber {
                line: self.line,
                key: self.key.clone(),
                value: self.value.clone(),
            })
    }

    fn bool(&self) -> SceneFileResult<bool> {
        match self.value.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(SceneFileError::MalformedBool {
                line: self.line,
                key: self.key.clone(),
                value: self.value.clone(),
            }),
        }
    }
}

/// One object of a scene: identity, transform and rigid body settings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RigidBodyRecord {
    /// Object id.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Transform the body is created from.
    pub transform: TransformComponent,
    /// Rigid body parameters. The collider name is validated on spawn.
    pub rigid_body: RigidBodySettings,
}

impl RigidBodyRecord {
    fn from_entries(entries: &[Entry]) -> SceneFileResult<Self> {
        let mut record = Self::default();
        for entry in entries {
            match entry.key.as_str() {
                "id" => record.id = entry.u32()?,
                "name" => record.name = entry.value.clone(),
                "position" => record.transform.position = entry.vec3()?,
                "rotation" => record.transform.rotation = entry.vec3()?,
                "scale" => record.transform.scale = entry.vec3()?,
                "colliderType" => record.rigid_body.collider_type = entry.value.clone(),
                "isDynamic" => record.rigid_body.is_dynamic = entry.bool()?,
                "useGravity" => record.rigid_body.use_gravity = entry.bool()?,
                "gravityFactor" => record.rigid_body.gravity_factor = entry.f32()?,
                "mass" => record.rigid_body.mass = entry.f32()?,
                "restitution" => record.rigid_body.restitution = entry.f32()?,
                "staticFriction" => record.rigid_body.static_friction = entry.f32()?,
                "dynamicFriction" => record.rigid_body.dynamic_friction = entry.f32()?,
                other => log::debug!("Ignoring unknown scene key '{}' on line {}", other, entry.line),
            }
        }
        Ok(record)
    }

    /// Parses the text of exactly one object.
    pub fn parse(text: &str) -> SceneFileResult<Self> {
        let scene = SceneFile::parse(text)?;
        match <[RigidBodyRecord; 1]>::try_from(scene.objects) {
            Ok([record]) => Ok(record),
            Err(objects) => Err(SceneFileError::ObjectCount(objects.len())),
        }
    }

    /// Writes the record as `key= value` lines.
    pub fn to_text(&self) -> String {
        let vec3 = |v: Vec3| format!("{}, {}, {}", v.x, v.y, v.z);
        let rb = &self.rigid_body;
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "id= {}", self.id);
        let _ = writeln!(out, "name= {}", self.name);
        let _ = writeln!(out, "position= {}", vec3(self.transform.position));
        let _ = writeln!(out, "rotation= {}", vec3(self.transform.rotation));
        let _ = writeln!(out, "scale= {}", vec3(self.transform.scale));
        let _ = writeln!(out, "colliderType= {}", rb.collider_type);
        let _ = writeln!(out, "isDynamic= {}", rb.is_dynamic);
        let _ = writeln!(out, "useGravity= {}", rb.use_gravity);
        let _ = writeln!(out, "gravityFactor= {}", rb.gravity_factor);
        let _ = writeln!(out, "mass= {}", rb.mass);
        let _ = writeln!(out, "restitution= {}", rb.restitution);
        let _ = writeln!(out, "staticFriction= {}", rb.static_friction);
        let _ = writeln!(out, "dynamicFriction= {}", rb.dynamic_friction);
        out
    }

    /// Recreates the body through [`RigidBodyComponent::new`].
    ///
    /// An invalid collider name is reported through `sink` exactly as for a
    /// component built in code, and yields a component with an invalid handle.
    pub fn spawn(&self, world: &mut PhysicsWorld, sink: Arc<dyn ConsoleSink>) -> RigidBodyComponent {
        RigidBodyComponent::new(world, sink, &self.transform, &self.rigid_body)
    }
}

/// A whole scene: scene-level settings plus its objects.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneFile {
    /// Entries that appear before the first object, keyed by name.
    pub settings: BTreeMap<String, String>,
    /// Objects in file order.
    pub objects: Vec<RigidBodyRecord>,
}

impl SceneFile {
    /// Parses scene text.
    pub fn parse(text: &str) -> SceneFileResult<Self> {
        let entries = split_entries(text)?;
        let mut scene = SceneFile::default();

        let first_object = entries
            .iter()
            .position(|e| e.key == "id")
            .unwrap_or(entries.len());
        for entry in &entries[..first_object] {
            scene.settings.insert(entry.key.clone(), entry.value.clone());
        }

        let mut start = first_object;
        while start < entries.len() {
            let end = entries[start + 1..]
                .iter()
                .position(|e| e.key == "id")
                .map_or(entries.len(), |offset| start + 1 + offset);
            scene
                .objects
                .push(RigidBodyRecord::from_entries(&entries[start..end])?);
            start = end;
        }
        Ok(scene)
    }

    /// Writes the scene as text.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.settings {
            let _ = writeln!(out, "{}= {}", key, value);
        }
        for object in &self.objects {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&object.to_text());
        }
        out
    }

    /// Reads and parses a scene file.
    pub fn load(path: impl AsRef<Path>) -> SceneFileResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let scene = Self::parse(&text)?;
        log::info!(
            "Loaded scene '{}' with {} objects",
            path.as_ref().display(),
            scene.objects.len()
        );
        Ok(scene)
    }

    /// Writes the scene to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> SceneFileResult<()> {
        std::fs::write(path.as_ref(), self.to_text())?;
        log::info!("Saved scene '{}'", path.as_ref().display());
        Ok(())
    }

    /// Spawns every object into `world`, in file order.
    pub fn spawn_all(
        &self,
        world: &mut PhysicsWorld,
        sink: Arc<dyn ConsoleSink>,
    ) -> Vec<RigidBodyComponent> {
        self.objects
            .iter()
            .map(|object| object.spawn(world, sink.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = "\
backgroundColor= 0.1, 0.2, 0.3

id= 1
name= Floor
position= 0, 0, 0
scale= 20, 1, 20
isDynamic= false

# a falling crate
id= 2
name= Crate
position= 0,3 ,0
colliderType= box
mass= 2.5
";

    #[test]
    fn test_parse_splits_objects_on_id() {
        let scene = SceneFile::parse(SCENE).unwrap();

        assert_eq!(scene.settings["backgroundColor"], "0.1, 0.2, 0.3");
        assert_eq!(scene.objects.len(), 2);

        let floor = &scene.objects[0];
        assert_eq!(floor.id, 1);
        assert_eq!(floor.transform.scale, Vec3::new(20.0, 1.0, 20.0));
        assert!(!floor.rigid_body.is_dynamic);
        assert_eq!(floor.rigid_body.collider_type, "BOX");

        let crate_record = &scene.objects[1];
        assert_eq!(crate_record.name, "Crate");
        assert_eq!(crate_record.transform.position, Vec3::new(0.0, 3.0, 0.0));
        assert_eq!(crate_record.rigid_body.collider_type, "box");
        assert_eq!(crate_record.rigid_body.mass, 2.5);
    }

    #[test]
    fn test_text_round_trip() {
        let scene = SceneFile::parse(SCENE).unwrap();
        let reparsed = SceneFile::parse(&scene.to_text()).unwrap();
        assert_eq!(reparsed, scene);
    }

    #[test]
    fn test_malformed_input_reports_line() {
        let err = SceneFile::parse("id= 1\nposition= 1, 2\n").unwrap_err();
        assert!(matches!(err, SceneFileError::MalformedVector { line: 2, .. }));

        let err = SceneFile::parse("id= 1\nmass= heavy\n").unwrap_err();
        assert!(matches!(err, SceneFileError::MalformedNumber { line: 2, .. }));

        let err = SceneFile::parse("id= 1\nisDynamic= maybe\n").unwrap_err();
        assert!(matches!(err, SceneFileError::MalformedBool { .. }));

        let err = SceneFile::parse("id= 1\njust some words\n").unwrap_err();
        assert!(matches!(err, SceneFileError::MalformedLine { line: 2, .. }));
    }

    #[test]
    fn test_record_parse_requires_single_object() {
        assert!(matches!(
            RigidBodyRecord::parse(SCENE),
            Err(SceneFileError::ObjectCount(2))
        ));
        let record = RigidBodyRecord::parse("id= 7\nmass= 3\n").unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.rigid_body.mass, 3.0);
    }
}
