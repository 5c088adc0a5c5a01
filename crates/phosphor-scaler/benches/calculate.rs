#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
use criterion::{black_box, criterion_group, criterion_main, Criterion};

#[cfg(not(target_arch = "wasm32"))]
use phosphor_scaler::{calculate, DeviceProfile, Rotation, ScalerInput, ScalingMode};

#[cfg(not(target_arch = "wasm32"))]
fn bench_calculate(c: &mut Criterion) {
    let cases = [
        (
            "native_integer",
            ScalerInput {
                src_w: 256,
                src_h: 224,
                src_pitch: 512,
                rotation: Rotation::Deg0,
                aspect_ratio: 4.0 / 3.0,
                mode: ScalingMode::Native,
                device: DeviceProfile::vga_fit(),
                max_dst: None,
            },
        ),
        (
            "aspect_fit",
            ScalerInput {
                src_w: 256,
                src_h: 224,
                src_pitch: 512,
                rotation: Rotation::Deg0,
                aspect_ratio: 4.0 / 3.0,
                mode: ScalingMode::Aspect,
                device: DeviceProfile::square_fit(),
                max_dst: Some((960, 720)),
            },
        ),
        (
            "oversized_pillarbox",
            ScalerInput {
                src_w: 256,
                src_h: 224,
                src_pitch: 512,
                rotation: Rotation::Deg90,
                aspect_ratio: 4.0 / 3.0,
                mode: ScalingMode::Aspect,
                device: DeviceProfile::hdmi_oversized(),
                max_dst: Some((1920, 1080)),
            },
        ),
    ];

    for (name, input) in cases {
        c.bench_function(name, |b| b.iter(|| calculate(black_box(&input))));
    }
}

#[cfg(not(target_arch = "wasm32"))]
criterion_group!(benches, bench_calculate);
#[cfg(not(target_arch = "wasm32"))]
criterion_main!(benches);
