//! LOD classification, cull and indirect-counter pipeline over the CPU
//! reference executor.

use glam::{Mat4, Vec2, Vec3};

use swell3d::backend::reference::ReferenceBackend;
use swell3d::{Frustum, Ocean, OceanConfig};

const CELLS: u32 = 32 * 32;

fn test_config() -> OceanConfig {
    OceanConfig {
        world_size: Vec2::splat(100.0),
        grid_width: 32,
        grid_height: 32,
        ..Default::default()
    }
}

fn build_ocean(backend: &mut ReferenceBackend) -> Ocean {
    let mut ocean = Ocean::new(test_config()).unwrap();
    ocean.initialize(backend).unwrap();
    ocean.declare_resources(backend);
    ocean
}

fn all_encompassing_frustum() -> Frustum {
    Frustum::from_view_proj(&Mat4::orthographic_rh(
        -1.0e4, 1.0e4, -1.0e4, 1.0e4, -1.0e4, 1.0e4,
    ))
}

fn empty_frustum() -> Frustum {
    // A small box a kilometer above the heightmap range: no cell overlaps.
    let proj = Mat4::orthographic_rh(-10.0, 10.0, -10.0, 10.0, -1.0, 1.0);
    let view = Mat4::from_translation(Vec3::new(0.0, -1000.0, 0.0));
    Frustum::from_view_proj(&(proj * view))
}

fn counter_records(backend: &ReferenceBackend, ocean: &mut Ocean) -> Vec<u32> {
    let info = ocean.render_info(backend).unwrap();
    backend.buffer_words(info.indirect_counters)
}

fn instance_counts(records: &[u32]) -> Vec<u32> {
    records.chunks(8).map(|record| record[1]).collect()
}

#[test]
fn full_frustum_accounts_for_every_cell() {
    let mut backend = ReferenceBackend::new();
    let mut ocean = build_ocean(&mut backend);

    assert_eq!(ocean.grid_base_coord(Vec3::ZERO), glam::IVec2::new(-16, -16));

    ocean
        .record_lod_pass(&mut backend, Vec3::ZERO, &all_encompassing_frustum())
        .unwrap();

    let records = counter_records(&backend, &mut ocean);
    let counts = instance_counts(&records);
    assert_eq!(counts.iter().sum::<u32>(), CELLS);
}

#[test]
fn empty_frustum_produces_zero_counters() {
    let mut backend = ReferenceBackend::new();
    let mut ocean = build_ocean(&mut backend);

    ocean
        .record_lod_pass(&mut backend, Vec3::ZERO, &empty_frustum())
        .unwrap();

    let records = counter_records(&backend, &mut ocean);
    assert!(instance_counts(&records).iter().all(|&count| count == 0));
}

#[test]
fn partial_frustum_never_exceeds_cell_count() {
    let mut backend = ReferenceBackend::new();
    let mut ocean = build_ocean(&mut backend);

    // Half-space: only cells overlapping x >= 0 survive.
    let frustum = Frustum::from_view_proj(&Mat4::orthographic_rh(
        0.0, 1.0e4, -1.0e4, 1.0e4, -1.0e4, 1.0e4,
    ));
    ocean.record_lod_pass(&mut backend, Vec3::ZERO, &frustum).unwrap();

    let counts = instance_counts(&counter_records(&backend, &mut ocean));
    let total: u32 = counts.iter().sum();
    assert!(total > 0, "half the window faces the frustum");
    assert!(total < CELLS);
}

#[test]
fn index_counts_are_static_across_frames() {
    let mut backend = ReferenceBackend::new();
    let mut ocean = build_ocean(&mut backend);

    ocean
        .record_lod_pass(&mut backend, Vec3::ZERO, &all_encompassing_frustum())
        .unwrap();
    let first = counter_records(&backend, &mut ocean);

    // Different camera and visibility; the seeded index counts must not move.
    ocean
        .record_lod_pass(&mut backend, Vec3::new(40.0, 10.0, -25.0), &empty_frustum())
        .unwrap();
    let second = counter_records(&backend, &mut ocean);

    let expected: Vec<u32> = ocean
        .render_info(&backend)
        .unwrap()
        .meshes
        .iter()
        .map(|mesh| mesh.index_count)
        .collect();

    for records in [&first, &second] {
        for (bucket, record) in records.chunks(8).enumerate() {
            let expected_count = expected.get(bucket).copied().unwrap_or(0);
            assert_eq!(record[0], expected_count, "bucket {bucket} index count");
        }
    }
}

#[test]
fn buckets_stay_within_mesh_lod_range() {
    let mut backend = ReferenceBackend::new();
    let mut ocean = build_ocean(&mut backend);

    // Camera high above pushes distant cells toward the coarsest LOD.
    ocean
        .record_lod_pass(
            &mut backend,
            Vec3::new(0.0, 300.0, 0.0),
            &all_encompassing_frustum(),
        )
        .unwrap();

    let lod_count = ocean.lods().len();
    let counts = instance_counts(&counter_records(&backend, &mut ocean));
    assert_eq!(counts.iter().sum::<u32>(), CELLS);
    for (bucket, &count) in counts.iter().enumerate() {
        if bucket >= lod_count {
            assert_eq!(count, 0, "bucket {bucket} has no mesh LOD");
        }
    }
}

#[test]
fn visible_instances_land_in_their_bucket_region() {
    let mut backend = ReferenceBackend::new();
    let mut ocean = build_ocean(&mut backend);

    ocean
        .record_lod_pass(&mut backend, Vec3::ZERO, &all_encompassing_frustum())
        .unwrap();

    let info = ocean.render_info(&backend).unwrap().clone();
    let counts = instance_counts(&backend.buffer_words(info.indirect_counters));
    let data = backend.buffer_words(info.instance_data);
    let cells_per_bucket = info.cells_per_bucket as usize;

    for (bucket, &count) in counts.iter().enumerate() {
        for slot in 0..count as usize {
            let word_base = (bucket * cells_per_bucket + slot) * 8;
            let lod = f32::from_bits(data[word_base + 2]);
            assert_eq!(
                lod.floor() as usize,
                bucket,
                "instance in bucket {bucket} carries LOD {lod}"
            );
        }
    }
}

#[test]
fn render_info_is_cached_per_configuration() {
    let mut backend = ReferenceBackend::new();
    let mut ocean = build_ocean(&mut backend);

    ocean
        .record_lod_pass(&mut backend, Vec3::ZERO, &all_encompassing_frustum())
        .unwrap();

    let first_key = ocean.render_info(&backend).unwrap().instance_key;
    let second_key = ocean.render_info(&backend).unwrap().instance_key;
    assert_eq!(first_key, second_key);
}
