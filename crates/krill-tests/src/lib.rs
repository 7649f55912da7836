//! Conformance suite for the krill micro-kernels
//!
//! Every vector kernel is checked against an independently written
//! reference (ndarray zero-padded convolution, plain-loop quantized
//! matmul, division-based requantization) and held to bit-equality
//! against its scalar fallback across edge shapes: every trailing
//! column count, every partial-store path, padded and unpadded
//! reduction depths.

pub mod conv;
pub mod gemm;
pub mod requant;

/// Test utilities
pub mod utils {
    /// Lays out an `height x width` feature map so that every row is
    /// readable through the next multiple of four columns, as the
    /// vector convolution requires. The slack holds a large sentinel:
    /// if a kernel ever lets a padding lane through, the output is
    /// visibly wrong.
    pub fn padded_feature_map(
        height: usize,
        width: usize,
        mut fill: impl FnMut(usize, usize) -> f32,
    ) -> Vec<f32> {
        padded_feature_map_with_sentinel(height, width, 9.0e30, &mut fill)
    }

    pub fn padded_feature_map_with_sentinel(
        height: usize,
        width: usize,
        sentinel: f32,
        fill: &mut impl FnMut(usize, usize) -> f32,
    ) -> Vec<f32> {
        let slack = width.div_ceil(4) * 4 - width;
        let mut out = vec![sentinel; (height - 1) * width + width + slack];
        for y in 0..height {
            for x in 0..width {
                out[y * width + x] = fill(y, x);
            }
        }
        out
    }

    /// Pads an activation row out to a multiple of eight values with a
    /// garbage byte; the packed weights are zero past the real depth,
    /// so the garbage must never show in the output.
    pub fn padded_activations(a: &[i8]) -> Vec<i8> {
        let mut out = a.to_vec();
        out.resize(a.len().div_ceil(8) * 8, 0x55);
        out
    }
}
