use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rawlab::prelude::*;

fn test_image() -> PixelBuffer {
    PixelBuffer::from_fn(1024, 768, |x, y| {
        [(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8, 255]
    })
    .unwrap()
}

// ============================================================================
// Point and geometry
// ============================================================================

fn bench_point(c: &mut Criterion) {
    let img = test_image();
    c.bench_function("grayscale_weighted", |b| {
        b.iter(|| black_box(grayscale_weighted(&img).unwrap()))
    });
    c.bench_function("invert", |b| b.iter(|| black_box(invert(&img).unwrap())));
}

fn bench_geometry(c: &mut Criterion) {
    let img = test_image();
    let mut group = c.benchmark_group("geometry");
    group.bench_function("rotate_right", |b| {
        b.iter(|| black_box(rotate_right(&img).unwrap()))
    });
    group.bench_function("scale_bilinear_1.5", |b| {
        b.iter(|| black_box(scale_bilinear(&img, 1.5).unwrap()))
    });
    group.bench_function("mosaic_16", |b| {
        b.iter(|| black_box(mosaic(&img, 16).unwrap()))
    });
    group.finish();
}

// ============================================================================
// Noise, histogram and convolution
// ============================================================================

fn bench_noise(c: &mut Criterion) {
    let img = test_image();
    c.bench_function("gaussian_noise", |b| {
        let mut rng = StdRng::seed_from_u64(7);
        b.iter(|| black_box(gaussian_noise_with_rng(&img, 15.0, &mut rng).unwrap()))
    });
}

fn bench_histogram(c: &mut Criterion) {
    let img = test_image();
    c.bench_function("equalize_full_color", |b| {
        b.iter(|| black_box(equalize_full_color(&img).unwrap()))
    });
}

fn bench_convolution(c: &mut Criterion) {
    let img = test_image();
    let mut group = c.benchmark_group("convolution");
    for size in [3u32, 5, 9] {
        let kernel = Kernel::from_coefficients(vec![1.0; (size * size) as usize]).unwrap();
        group.bench_function(format!("box_{size}x{size}"), |b| {
            b.iter(|| black_box(convolve_full_color(&img, &kernel).unwrap()))
        });
    }
    group.bench_function("edge_detect", |b| {
        b.iter(|| black_box(edge_detect(&img).unwrap()))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_point,
    bench_geometry,
    bench_noise,
    bench_histogram,
    bench_convolution
);
criterion_main!(benches);
