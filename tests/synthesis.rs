//! Field synthesis properties over the CPU reference executor: transform
//! round trips, mip chain shape, and idempotence at fixed simulation time.

use glam::Vec2;
use half::f16;

use swell3d::backend::reference::ReferenceBackend;
use swell3d::device::{
    CommandEncoder, FrameContext, ImageFormat, OceanDevice, TransformDesc, TransformKind,
    TransformTarget,
};
use swell3d::graph::{AttachmentInfo, ResourceGraph};
use swell3d::spectrum::ComplexAmplitude;
use swell3d::{Ocean, OceanConfig, WaveField};

fn pack_half2(re: f32, im: f32) -> u32 {
    u32::from(f16::from_f32(re).to_bits()) | (u32::from(f16::from_f32(im).to_bits()) << 16)
}

#[test]
fn single_bin_inverse_transform_is_a_sinusoid() {
    let n = 64u32;
    let (kx, ky) = (3u32, 5u32);

    let mut backend = ReferenceBackend::new();
    let plan = backend
        .create_transform(TransformDesc {
            size: n,
            kind: TransformKind::ComplexToReal,
        })
        .unwrap();
    let output_res =
        backend.declare_storage_image("test-output", AttachmentInfo::absolute(ImageFormat::R16Float, n, n));
    let output = backend.physical_image(output_res);

    let mut packed = vec![0u32; (n * n) as usize];
    packed[(ky * n + kx) as usize] = pack_half2(1.0, 0.0);
    let input = backend
        .create_storage_buffer("test-input", u64::from(n * n) * 4)
        .unwrap();
    backend
        .write_buffer(input, 0, bytemuck::cast_slice(&packed))
        .unwrap();

    backend.transform(plan, TransformTarget::base(output), input);

    // An unnormalized inverse transform of one unit bin is a pure complex
    // exponential; the real output is its cosine.
    let two_pi = 2.0 * std::f32::consts::PI;
    for y in 0..n {
        for x in 0..n {
            let expected =
                (two_pi * (kx * x + ky * y) as f32 / n as f32).cos();
            let actual = backend.image_texel(output, 0, x, y)[0];
            assert!(
                (actual - expected).abs() < 1e-2,
                "texel ({x}, {y}): expected {expected}, got {actual}"
            );
        }
    }
}

fn seeded_ocean(backend: &mut ReferenceBackend, config: OceanConfig) -> Ocean {
    let mut ocean = Ocean::new(config).unwrap();
    ocean.initialize(backend).unwrap();

    for (field, size) in [
        (WaveField::Height, ocean.config().height_fft_size),
        (WaveField::Displacement, ocean.config().displacement_fft_size),
        (WaveField::Normal, ocean.config().normal_fft_size),
    ] {
        // Deterministic low-amplitude pseudo-spectrum.
        let bins: Vec<ComplexAmplitude> = (0..size * size)
            .map(|i| ComplexAmplitude {
                re: ((i * 37 + 11) % 101) as f32 * 1.0e-3,
                im: ((i * 53 + 29) % 97) as f32 * 1.0e-3,
            })
            .collect();
        ocean.upload_distribution(backend, field, &bins).unwrap();
    }

    ocean.declare_resources(backend);
    ocean
}

#[test]
fn height_displacement_mip_chain_matches_lod_count() {
    for resolution in [16u32, 64, 128] {
        let mut backend = ReferenceBackend::new();
        let config = OceanConfig {
            grid_resolution: resolution,
            ..Default::default()
        };
        let mut ocean = Ocean::new(config).unwrap();
        ocean.initialize(&mut backend).unwrap();
        ocean.declare_resources(&mut backend);

        let lod_count = ocean.lods().len();
        let info = ocean.render_info(&backend).unwrap();
        assert_eq!(info.meshes.len(), lod_count);
        assert_eq!(
            backend.image_levels(info.height_displacement) as usize,
            lod_count,
            "base resolution {resolution}"
        );
    }
}

#[test]
fn synthesis_is_idempotent_at_fixed_time() {
    let mut backend = ReferenceBackend::new();
    let mut ocean = seeded_ocean(&mut backend, OceanConfig::default());
    let time = 1.25;

    ocean.record_synthesis_pass(&mut backend, time).unwrap();
    let info = ocean.render_info(&backend).unwrap().clone();
    let levels = backend.image_levels(info.height_displacement);
    let first_hd: Vec<Vec<[f32; 4]>> = (0..levels)
        .map(|level| backend.image_level_data(info.height_displacement, level).to_vec())
        .collect();
    let first_gj = backend.image_level_data(info.gradient_jacobian, 0).to_vec();
    let first_normal = backend.image_level_data(info.normal, 0).to_vec();

    ocean.record_synthesis_pass(&mut backend, time).unwrap();
    for (level, first) in first_hd.iter().enumerate() {
        let second = backend.image_level_data(info.height_displacement, level as u32);
        assert_eq!(first.as_slice(), second, "height+displacement mip {level}");
    }
    assert_eq!(
        first_gj.as_slice(),
        backend.image_level_data(info.gradient_jacobian, 0)
    );
    assert_eq!(
        first_normal.as_slice(),
        backend.image_level_data(info.normal, 0)
    );
}

#[test]
fn calm_sea_bakes_unit_jacobian() {
    let mut backend = ReferenceBackend::new();
    let mut ocean = Ocean::new(OceanConfig::default()).unwrap();
    ocean.initialize(&mut backend).unwrap();
    ocean.declare_resources(&mut backend);

    // Zeroed distributions: flat height, no displacement.
    ocean.record_synthesis_pass(&mut backend, 0.0).unwrap();

    let info = ocean.render_info(&backend).unwrap();
    let gj = backend.image_texel(info.gradient_jacobian, 0, 17, 4);
    assert_eq!(gj[0], 0.0, "flat sea has no gradient");
    assert_eq!(gj[1], 0.0);
    assert!((gj[2] - 1.0).abs() < 1e-3, "undisplaced jacobian is one");

    let hd = backend.image_texel(info.height_displacement, 0, 9, 30);
    assert_eq!(hd, [0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn synthesis_responds_to_time() {
    let mut backend = ReferenceBackend::new();
    let mut ocean = seeded_ocean(&mut backend, OceanConfig::default());

    ocean.record_synthesis_pass(&mut backend, 0.0).unwrap();
    let info = ocean.render_info(&backend).unwrap().clone();
    let at_zero = backend.image_level_data(info.height_displacement, 0).to_vec();

    ocean.record_synthesis_pass(&mut backend, 3.0).unwrap();
    let later = backend.image_level_data(info.height_displacement, 0);
    assert_ne!(at_zero.as_slice(), later, "phase evolution must move the field");
}

#[test]
fn normal_field_scale_differs_from_primary() {
    // The normal field synthesizes at its own tiling period; with world and
    // normal sizes equal the fields would alias, so the default config keeps
    // them apart.
    let config = OceanConfig::default();
    assert_ne!(config.world_size, config.normal_world_size);
    assert_eq!(
        Vec2::splat(2.0 * std::f32::consts::PI) / config.world_size
            * (config.world_size / config.normal_world_size),
        Vec2::splat(2.0 * std::f32::consts::PI) / config.normal_world_size
    );
}
