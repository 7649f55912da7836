//! Scalar fallback kernels.
//!
//! Plain-Rust renditions of the vector kernels, over natural
//! (unpadded) buffer layouts. A dispatch layer picks these when no
//! vector unit is worth using; the conformance suite also holds the
//! vector kernels to bit-equality against them, so the accumulation
//! and rounding here deliberately mirror the vector pipelines step for
//! step.

use krill_core::{DwConvParams, Qs8GemmParams};

/// Scalar depthwise 3x3 convolution with stride 1 and one pixel of
/// logical zero padding, matching [`crate::dwconv_3x3p1_f32`] bit for
/// bit.
///
/// `input` is the unpadded `input_height x input_width` feature map;
/// no read slack is required.
pub fn dwconv_3x3p1_f32_scalar(
    input_height: usize,
    input_width: usize,
    input: &[f32],
    weights: &[f32; 10],
    output: &mut [f32],
    params: &DwConvParams,
) {
    assert!(input_height >= 1 && input_width >= 1);
    assert!(input.len() >= input_height * input_width);
    assert!(output.len() >= input_height * input_width);

    let at = |x: isize, y: isize| -> f32 {
        if x < 0 || y < 0 || x >= input_width as isize || y >= input_height as isize {
            0.0
        } else {
            input[y as usize * input_width + x as usize]
        }
    };

    for y in 0..input_height as isize {
        for x in 0..input_width as isize {
            // two partial sums, ordered as in the vector kernel, so
            // the results agree to the last bit
            let mut p0 = weights[0] + at(x, y - 1) * weights[2];
            let mut p1 = at(x, y) * weights[5];
            p0 += at(x, y + 1) * weights[8];
            p1 += at(x - 1, y - 1) * weights[1];
            p0 += at(x - 1, y) * weights[4];
            p1 += at(x - 1, y + 1) * weights[7];
            p0 += at(x + 1, y - 1) * weights[3];
            p1 += at(x + 1, y) * weights[6];
            p0 += at(x + 1, y + 1) * weights[9];

            let v = (p0 + p1).max(params.min).min(params.max);
            output[y as usize * input_width + x as usize] = v;
        }
    }
}

/// Scalar quantized GEMM over one activation row and unpacked
/// row-major `nc x kc` weights, matching [`crate::gemm_qs8_1x8c8`]
/// bit for bit.
pub fn gemm_qs8_scalar(
    nc: usize,
    kc: usize,
    a: &[i8],
    weights: &[i8],
    bias: &[i32],
    c: &mut [i8],
    params: &Qs8GemmParams,
) {
    assert!(nc >= 1 && kc >= 1);
    assert!(a.len() >= kc);
    assert_eq!(weights.len(), nc * kc);
    assert_eq!(bias.len(), nc);
    assert!(c.len() >= nc);

    for n in 0..nc {
        let mut acc = bias[n];
        for k in 0..kc {
            acc = acc.wrapping_add(i32::from(a[k]) * i32::from(weights[n * kc + k]));
        }

        // requantize, then the same saturation ladder as the vector
        // kernel: narrow to i16, saturating zero-point add, narrow to
        // i8, clamp
        let scaled = params.requantize(acc);
        let narrowed = scaled.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;
        let biased = narrowed.saturating_add(params.output_zero_point);
        let v = biased.clamp(i16::from(i8::MIN), i16::from(i8::MAX)) as i8;
        c[n] = v.max(params.output_min).min(params.output_max);
    }
}
