//! Benchmarks for the krill CPU kernels

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use krill_core::{pack_dwconv_3x3_weights, DwConvParams, PackedQs8Weights, Qs8GemmParams};
use krill_cpu::{dwconv_3x3p1_f32, gemm_qs8_1x8c8};
use ndarray::{ArrayD, IxDyn};

/// Generate a random array of given shape
fn random_array(shape: &[usize]) -> ArrayD<f32> {
    use rand::Rng;
    let len: usize = shape.iter().product();
    let mut rng = rand::rng();
    let data: Vec<f32> = (0..len).map(|_| rng.random::<f32>() - 0.5).collect();
    ArrayD::from_shape_vec(IxDyn(shape), data).unwrap()
}

fn bench_dwconv(c: &mut Criterion) {
    let mut group = c.benchmark_group("dwconv_3x3p1_f32");

    for size in [32usize, 64, 128] {
        // rows must stay readable through the next multiple of four
        let padded_len = (size - 1) * size + size.div_ceil(4) * 4;
        let input = random_array(&[padded_len]);
        let input = input.as_slice().unwrap();
        let weights = pack_dwconv_3x3_weights(0.1, &[0.5, -0.25, 0.125, 1.0, -0.5, 0.25, 0.75, -0.125, 0.0625]);
        let params = DwConvParams::new(size, -4.0, 4.0).unwrap();
        let zero = [0.0f32; 4];
        let mut out = vec![0.0f32; size * size];

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |bench, &size| {
            bench.iter(|| {
                unsafe {
                    dwconv_3x3p1_f32(
                        size,
                        size,
                        input.as_ptr(),
                        &weights,
                        zero.as_ptr(),
                        out.as_mut_ptr(),
                        1,
                        &params,
                    );
                }
                black_box(out[0])
            });
        });
    }

    group.finish();
}

fn bench_gemm(c: &mut Criterion) {
    use rand::Rng;
    let mut group = c.benchmark_group("gemm_qs8_1x8c8");
    let mut rng = rand::rng();

    for (nc, kc) in [(64usize, 64usize), (256, 64), (256, 256)] {
        let a: Vec<i8> = (0..kc).map(|_| rng.random_range(-127..=127)).collect();
        let weights: Vec<i8> = (0..nc * kc).map(|_| rng.random_range(-127..=127)).collect();
        let bias: Vec<i32> = (0..nc).map(|_| rng.random_range(-1000..=1000)).collect();
        let packed = PackedQs8Weights::pack(nc, kc, &weights, &bias).unwrap();
        let params = Qs8GemmParams::from_scale(0.0173, 3, -128, 127).unwrap();
        let mut out = vec![0i8; nc];

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", nc, kc)),
            &(nc, kc),
            |bench, &(nc, kc)| {
                bench.iter(|| {
                    unsafe {
                        gemm_qs8_1x8c8(
                            1,
                            nc,
                            kc,
                            a.as_ptr(),
                            kc,
                            packed.as_ptr(),
                            out.as_mut_ptr(),
                            0,
                            8,
                            &params,
                        );
                    }
                    black_box(out[0])
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_dwconv, bench_gemm);
criterion_main!(benches);
