//! Depthwise 3x3 convolution, stride 1, unit padding.

use krill_core::DwConvParams;

use crate::simd::F32x4;

/// Convolves one `input_height x input_width` f32 channel with a 3x3
/// kernel, stride 1 and one pixel of logical zero padding on every
/// side, then clamps each output to `[params.min, params.max]`.
///
/// `weights` is the bias followed by the nine taps in row-major order.
/// The padded top and bottom rows are realized by reading `zero`, an
/// all-zero buffer of at least four f32 values, in place of the
/// missing input row; the zero-row pointer is never advanced, so four
/// values always suffice. Padded left/right columns are synthesized
/// with lane splices from a zero carry register, so no padding is ever
/// materialized in memory.
///
/// Each row is processed four output columns at a time. The trailing
/// 1-4 columns are computed with `params.mask` blanking the lanes past
/// the row end and stored with partial (two then one element) stores.
///
/// # Safety
///
/// - `input` must be valid for reads of
///   `(input_height - 1) * input_width + round_up(input_width, 4)`
///   f32 values: every row must be readable through the next multiple
///   of four columns (the trailing padding can hold anything, it never
///   reaches the output).
/// - `zero` must be valid for reads of four f32 values, all zero.
/// - `output` must be valid for writes of
///   `input_height * input_width` f32 values; exactly that many are
///   written.
/// - `params.mask` must have been built for `input_width`
///   (see [`DwConvParams::new`]).
#[allow(clippy::too_many_arguments)]
pub unsafe fn dwconv_3x3p1_f32(
    input_height: usize,
    input_width: usize,
    input: *const f32,
    weights: &[f32; 10],
    zero: *const f32,
    output: *mut f32,
    padding_top: usize,
    params: &DwConvParams,
) {
    debug_assert!(input_height >= 1);
    debug_assert!(input_width >= 1);
    debug_assert_eq!(padding_top, 1);

    let vmask = F32x4::from_bits(params.mask);
    let vmin = F32x4::splat(params.min);
    let vmax = F32x4::splat(params.max);

    let vbias = F32x4::splat(weights[0]);
    let vk00 = F32x4::splat(weights[1]);
    let vk01 = F32x4::splat(weights[2]);
    let vk02 = F32x4::splat(weights[3]);
    let vk10 = F32x4::splat(weights[4]);
    let vk11 = F32x4::splat(weights[5]);
    let vk12 = F32x4::splat(weights[6]);
    let vk20 = F32x4::splat(weights[7]);
    let vk21 = F32x4::splat(weights[8]);
    let vk22 = F32x4::splat(weights[9]);

    for y in 0..input_height {
        // Rows above and below the feature map read the shared zero
        // row; its pointer step is zero so it is never advanced.
        let (mut i0, s0) = if y == 0 {
            (zero, 0)
        } else {
            (input.add((y - 1) * input_width), 4)
        };
        let mut i1 = input.add(y * input_width);
        let (mut i2, s2) = if y + 1 == input_height {
            (zero, 0)
        } else {
            (input.add((y + 1) * input_width), 4)
        };
        let mut o = output.add(y * input_width);

        // Carry registers hold the previous column group; zero at the
        // row start so column 0 sees a zero left neighbor.
        let mut vi0_prev = F32x4::zero();
        let mut vi1_prev = F32x4::zero();
        let mut vi2_prev = F32x4::zero();

        let mut vi0 = F32x4::load(i0);
        i0 = i0.add(s0);
        let mut vi1 = F32x4::load(i1);
        i1 = i1.add(4);
        let mut vi2 = F32x4::load(i2);
        i2 = i2.add(s2);

        let mut w = input_width;
        while w > 4 {
            let vi0_next = F32x4::load(i0);
            i0 = i0.add(s0);
            let vi1_next = F32x4::load(i1);
            i1 = i1.add(4);
            let vi2_next = F32x4::load(i2);
            i2 = i2.add(s2);

            let vi0_left = F32x4::shuffle::<3, 4, 5, 6>(vi0_prev, vi0);
            let vi1_left = F32x4::shuffle::<3, 4, 5, 6>(vi1_prev, vi1);
            let vi2_left = F32x4::shuffle::<3, 4, 5, 6>(vi2_prev, vi2);
            let vi0_right = F32x4::shuffle::<1, 2, 3, 4>(vi0, vi0_next);
            let vi1_right = F32x4::shuffle::<1, 2, 3, 4>(vi1, vi1_next);
            let vi2_right = F32x4::shuffle::<1, 2, 3, 4>(vi2, vi2_next);

            let mut vo0 = vbias + vi0 * vk01;
            let mut vo1 = vi1 * vk11;
            vo0 = vo0 + vi2 * vk21;
            vo1 = vo1 + vi0_left * vk00;
            vo0 = vo0 + vi1_left * vk10;
            vo1 = vo1 + vi2_left * vk20;
            vo0 = vo0 + vi0_right * vk02;
            vo1 = vo1 + vi1_right * vk12;
            vo0 = vo0 + vi2_right * vk22;

            let vo = (vo0 + vo1).max(vmin).min(vmax);
            vo.store(o);
            o = o.add(4);

            vi0_prev = vi0;
            vi1_prev = vi1;
            vi2_prev = vi2;
            vi0 = vi0_next;
            vi1 = vi1_next;
            vi2 = vi2_next;
            w -= 4;
        }

        // Trailing 1-4 columns: blank the lanes past the row end and
        // feed zero as the right neighbor of the final column.
        vi0 = vi0.and(vmask);
        vi1 = vi1.and(vmask);
        vi2 = vi2.and(vmask);

        let vi0_left = F32x4::shuffle::<3, 4, 5, 6>(vi0_prev, vi0);
        let vi1_left = F32x4::shuffle::<3, 4, 5, 6>(vi1_prev, vi1);
        let vi2_left = F32x4::shuffle::<3, 4, 5, 6>(vi2_prev, vi2);
        let vi0_right = F32x4::shuffle::<1, 2, 3, 4>(vi0, F32x4::zero());
        let vi1_right = F32x4::shuffle::<1, 2, 3, 4>(vi1, F32x4::zero());
        let vi2_right = F32x4::shuffle::<1, 2, 3, 4>(vi2, F32x4::zero());

        let mut vo0 = vbias + vi0 * vk01;
        let mut vo1 = vi1 * vk11;
        vo0 = vo0 + vi2 * vk21;
        vo1 = vo1 + vi0_left * vk00;
        vo0 = vo0 + vi1_left * vk10;
        vo1 = vo1 + vi2_left * vk20;
        vo0 = vo0 + vi0_right * vk02;
        vo1 = vo1 + vi1_right * vk12;
        vo0 = vo0 + vi2_right * vk22;

        let mut vo = (vo0 + vo1).max(vmin).min(vmax);
        if w == 4 {
            vo.store(o);
        } else {
            if w & 2 != 0 {
                vo.store_lo2(o);
                o = o.add(2);
                vo = F32x4::shuffle::<2, 3, 2, 3>(vo, vo);
            }
            if w & 1 != 0 {
                *o = vo.extract::<0>();
            }
        }
    }
}
