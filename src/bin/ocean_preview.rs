// Headless ocean preview: seeds a Phillips spectrum, runs a few simulation
// frames on the wgpu backend, renders one frame offscreen and writes it to a
// PNG.

use glam::{Mat4, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use swell3d::backend::wgpu::{OceanRenderer, WgpuBackend};
use swell3d::spectrum::ComplexAmplitude;
use swell3d::{Frustum, Ocean, OceanConfig, RenderResult, WaveField};

const FRAMES: usize = 8;
const FRAME_DT: f64 = 1.0 / 60.0;

/// Phillips spectrum with gaussian amplitudes; the crate treats the
/// statistical model as externally supplied, so the preview brings its own.
fn phillips_spectrum(size: u32, world_size: Vec2, wind: Vec2, amplitude: f32) -> Vec<ComplexAmplitude> {
    let mut rng = StdRng::seed_from_u64(0x0cea);
    let n = size as i32;
    let gravity = 9.81f32;
    let wind_speed = wind.length();
    let l = wind_speed * wind_speed / gravity;
    let wind_dir = wind / wind_speed;

    let mut bins = Vec::with_capacity((n * n) as usize);
    for y in 0..n {
        for x in 0..n {
            let fx = if x <= n / 2 { x } else { x - n };
            let fy = if y <= n / 2 { y } else { y - n };
            let k = Vec2::new(fx as f32, fy as f32) * (2.0 * std::f32::consts::PI) / world_size;
            let k_len = k.length();
            if k_len < 1e-5 {
                bins.push(ComplexAmplitude::default());
                continue;
            }
            let k_hat = k / k_len;
            let alignment = k_hat.dot(wind_dir);
            let phillips = amplitude * (-1.0 / (k_len * l).powi(2)).exp()
                / k_len.powi(4)
                * alignment
                * alignment;
            let magnitude = (phillips * 0.5).sqrt();
            // Box-Muller gaussian pair.
            let u1: f32 = rng.gen_range(1e-6f32..1.0);
            let u2: f32 = rng.gen_range(0.0f32..1.0);
            let r = (-2.0 * u1.ln()).sqrt();
            let theta = 2.0 * std::f32::consts::PI * u2;
            bins.push(ComplexAmplitude {
                re: magnitude * r * theta.cos(),
                im: magnitude * r * theta.sin(),
            });
        }
    }
    bins
}

fn run() -> RenderResult<()> {
    let config = OceanConfig::default();
    let mut backend = WgpuBackend::new();
    let mut ocean = Ocean::new(config.clone())?;
    ocean.initialize(&mut backend)?;

    let wind = Vec2::new(14.0, 6.0);
    for (field, size, world) in [
        (WaveField::Height, config.height_fft_size, config.world_size),
        (
            WaveField::Displacement,
            config.displacement_fft_size,
            config.world_size,
        ),
        (
            WaveField::Normal,
            config.normal_fft_size,
            config.normal_world_size,
        ),
    ] {
        let bins = phillips_spectrum(size, world, wind, 0.8);
        ocean.upload_distribution(&mut backend, field, &bins)?;
    }

    ocean.declare_resources(&mut backend);

    let camera = Vec3::new(0.0, 18.0, 40.0);
    let view = Mat4::look_at_rh(camera, Vec3::new(0.0, 0.0, -60.0), Vec3::Y);
    let proj = Mat4::perspective_rh(62f32.to_radians(), 16.0 / 9.0, 0.5, 2000.0);
    let frustum = Frustum::from_view_proj(&(proj * view));

    for frame in 0..FRAMES {
        let time = frame as f64 * FRAME_DT;
        ocean.record_synthesis_pass(&mut backend, time)?;
        ocean.record_lod_pass(&mut backend, camera, &frustum)?;
        backend.submit();
    }

    let info = ocean.render_info(&backend)?.clone();
    log::info!(
        "render info assembled: key {:016x}, {} mesh LODs",
        info.instance_key,
        info.meshes.len()
    );

    let renderer = OceanRenderer::new(1280, 720)?;
    renderer.render(&backend, &info, &config, proj * view, camera)?;
    let pixels = renderer.read_rgba()?;
    let (width, height) = renderer.extent();

    image::save_buffer(
        "ocean_preview.png",
        &pixels,
        width,
        height,
        image::ColorType::Rgba8,
    )
    .map_err(|e| swell3d::RenderError::readback(format!("failed to write PNG: {e}")))?;
    log::info!("wrote ocean_preview.png ({width}x{height})");
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("ocean preview failed: {err}");
        std::process::exit(1);
    }
}
