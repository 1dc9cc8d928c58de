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


use std::sync::Arc;

use elypso_core::math::Vec3;
use elypso_core::physics::ColliderType;
use elypso_physics::{MessageType, PhysicsWorld, RecordingSink};
use elypso_scene::{RigidBodyComponent, RigidBodyRecord, SceneFile, TransformComponent};

#[test]
fn test_saved_scene_respawns_identical_bodies() {
    // --- 1. SETUP ---
    let mut world = PhysicsWorld::default();
    let sink = Arc::new(RecordingSink::new());
    let mut scene = SceneFile::default();
    scene.objects.push(RigidBodyRecord {
        id: 1,
        name: "Ball".to_string(),
        transform: TransformComponent {
            position: Vec3::new(1.0, 4.0, -2.0),
            rotation: Vec3::new(0.0, 30.0, 0.0),
            scale: Vec3::splat(0.5),
        },
        ..Default::default()
    });
    scene.objects[0].rigid_body.collider_type = "SPHERE".to_string();
    scene.objects[0].rigid_body.restitution = 0.8;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Scene.txt");

    // --- 2. ACTION ---
    scene.save(&path).unwrap();
    let loaded = SceneFile::load(&path).unwrap();
    let components = loaded.spawn_all(&mut world, sink.clone());

    // --- 3. ASSERTIONS ---
    assert_eq!(loaded, scene);
    assert_eq!(components.len(), 1);
    let ball = &components[0];
    assert_eq!(ball.collider_type(&world), Some(ColliderType::Sphere));
    assert_eq!(ball.position(&world), Some(Vec3::new(1.0, 4.0, -2.0)));
    assert_eq!(ball.restitution(&world), Some(0.8));
    assert_eq!(sink.messages()[0].kind, MessageType::Info);
}

#[test]
fn test_invalid_shape_in_file_is_reported_on_spawn() {
    let mut world = PhysicsWorld::default();
    let sink = Arc::new(RecordingSink::new());
    let record = RigidBodyRecord::parse("id= 3\ncolliderType= CONE\n").unwrap();

    let component = record.spawn(&mut world, sink.clone());

    assert!(component.handle().is_null());
    assert!(world.is_empty());
    assert_eq!(sink.messages()[0].kind, MessageType::Exception);
}

#[test]
fn test_component_survives_simulation_and_reads_back() {
    let mut world = PhysicsWorld::default();
    let sink = Arc::new(RecordingSink::new());
    let scene = SceneFile::parse(
        "id= 1\nscale= 20, 1, 20\nisDynamic= false\n\nid= 2\nposition= 0, 2, 0\n",
    )
    .unwrap();
    let components: Vec<RigidBodyComponent> = scene.spawn_all(&mut world, sink);

    for _ in 0..180 {
        world.step_simulation(1.0 / 60.0);
    }

    let floor = components[0].position(&world).unwrap();
    let crate_y = components[1].position(&world).unwrap().y;
    assert_eq!(floor, Vec3::ZERO);
    assert!(crate_y > 0.9 && crate_y < 1.1, "crate y = {}", crate_y);
}

#[test]
fn test_loading_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = SceneFile::load(dir.path().join("missing.txt")).unwrap_err();
    assert!(matches!(err, elypso_scene::SceneFileError::Io(_)));
}
