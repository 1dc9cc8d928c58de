use std::sync::Arc;

use anyhow::{Context, Result};
use elypso_core::math::Vec3;
use elypso_physics::{ConsoleSink, LogSink, PhysicsConfig, PhysicsWorld};
use elypso_scene::{RigidBodyRecord, RigidBodySettings, SceneFile, TransformComponent};

/// Simulated frames per second of the demo loop.
const FRAME_RATE: f32 = 60.0;
/// Length of the demo, in frames.
const FRAME_COUNT: u32 = 240;

fn demo_scene() -> SceneFile {
    let record = |id: u32, name: &str, position: Vec3, scale: Vec3, settings: RigidBodySettings| {
        RigidBodyRecord {
            id,
            name: name.to_string(),
            transform: TransformComponent {
                position,
                rotation: Vec3::ZERO,
                scale,
            },
            rigid_body: settings,
        }
    };

    let mut scene = SceneFile::default();
    scene.objects.push(record(
        1,
        "Floor",
        Vec3::ZERO,
        Vec3::new(20.0, 1.0, 20.0),
        RigidBodySettings {
            is_dynamic: false,
            ..Default::default()
        },
    ));
    scene.objects.push(record(
        2,
        "Crate",
        Vec3::new(0.0, 4.0, 0.0),
        Vec3::ONE,
        RigidBodySettings::default(),
    ));
    scene.objects.push(record(
        3,
        "Ball",
        Vec3::new(3.0, 6.0, 0.0),
        Vec3::splat(0.5),
        RigidBodySettings {
            collider_type: "SPHERE".to_string(),
            restitution: 0.8,
            ..Default::default()
        },
    ));
    scene
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    // Usage: sandbox [physics.ron] [scene.txt]
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => PhysicsConfig::load(&path)
            .with_context(|| format!("failed to load physics config '{}'", path))?,
        None => PhysicsConfig::default(),
    };
    let scene = match args.next() {
        Some(path) => {
            SceneFile::load(&path).with_context(|| format!("failed to load scene '{}'", path))?
        }
        None => demo_scene(),
    };

    let sink: Arc<dyn ConsoleSink> = Arc::new(LogSink);
    let mut world = PhysicsWorld::with_sink(config, sink.clone());
    let components = scene.spawn_all(&mut world, sink);
    log::info!("Spawned {} bodies", world.len());

    for frame in 1..=FRAME_COUNT {
        world.advance(1.0 / FRAME_RATE);

        if frame % 30 == 0 {
            for (record, component) in scene.objects.iter().zip(&components) {
                if let Some(position) = component.position(&world) {
                    log::info!(
                        "t={:.2}s {:>8}: ({:.3}, {:.3}, {:.3})",
                        frame as f32 / FRAME_RATE,
                        record.name,
                        position.x,
                        position.y,
                        position.z
                    );
                }
            }
        }
    }

    Ok(())
}
