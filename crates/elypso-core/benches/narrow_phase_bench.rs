use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use elypso_core::math::{Quat, Vec3};
use elypso_core::physics::{ColliderType, CollisionDetection, RigidBody, RigidBodyDesc};

fn body(position: Vec3, rotation: Quat, collider_type: ColliderType) -> RigidBody {
    RigidBody::new(&RigidBodyDesc {
        position,
        rotation,
        collider_type,
        ..Default::default()
    })
}

fn bench_narrow_phase(c: &mut Criterion) {
    let tilted = Quat::from_euler(Vec3::new(0.3, 0.7, 0.1));
    let a = body(Vec3::ZERO, Quat::IDENTITY, ColliderType::Box);
    let overlapping = body(Vec3::new(0.6, 0.3, 0.2), tilted, ColliderType::Box);
    let separated = body(Vec3::new(3.0, 0.0, 0.0), tilted, ColliderType::Box);
    let sphere = body(Vec3::new(0.0, 1.2, 0.0), Quat::IDENTITY, ColliderType::Sphere);

    let mut group = c.benchmark_group("Narrow Phase");

    group.bench_function("AABB prefilter", |b| {
        b.iter(|| {
            black_box(CollisionDetection::check_aabb_collision(
                black_box(&a),
                black_box(&overlapping),
            ))
        });
    });

    group.bench_function("OBB SAT (separated)", |b| {
        b.iter(|| {
            black_box(CollisionDetection::check_obb_collision(
                black_box(&a),
                black_box(&separated),
            ))
        });
    });

    group.bench_function("OBB manifold (overlapping)", |b| {
        b.iter(|| {
            black_box(CollisionDetection::generate_obb_contact_manifold(
                black_box(&a),
                black_box(&overlapping),
            ))
        });
    });

    group.bench_function("Sphere-box manifold", |b| {
        b.iter(|| {
            black_box(CollisionDetection::generate_contact_manifold(
                black_box(&sphere),
                black_box(&a),
            ))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_narrow_phase);
criterion_main!(benches);
