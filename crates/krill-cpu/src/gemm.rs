//! Quantized int8 GEMM micro-kernel: one row, eight columns per
//! group, eight-deep reduction slices.

use krill_core::Qs8GemmParams;

use crate::simd::{I16x16, I16x8, I32x8, I8x16};

/// Multiplies one row of i8 activations against packed i8 weights,
/// producing `nc` requantized i8 outputs.
///
/// Columns are produced in groups of eight. Per group, four pairs of
/// i32 accumulators (one pair per two output columns) are seeded from
/// the packed bias block, then the reduction runs in k-steps of eight:
/// eight activations are broadcast-widened to i16 and multiplied
/// against the four 2-column weight tiles with a widening
/// multiply-add of adjacent lane pairs. Two rounds of pairwise
/// horizontal adds plus a half interleave put the eight column sums
/// back in natural order; each is then requantized
/// (see [`Qs8GemmParams::requantize`]), offset by the output zero
/// point between two saturating narrows, clamped, and stored. A
/// trailing group of fewer than eight columns is stored 4/2/1 elements
/// at a time, shifting the held vector right to expose the next lanes.
///
/// The activation pointer is re-based to the row start for every
/// column group; only the weight pointer advances.
///
/// # Safety
///
/// - `mr` must be 1 (this instantiation produces a single output row;
///   `a_stride` and `cm_stride` exist for signature parity with wider
///   tiles and are not read).
/// - `a` must be valid for reads of `round_up(kc, 8)` i8 values. The
///   values past `kc` may hold anything: the packed weights are zero
///   there, so the products vanish.
/// - `w` must point at a buffer produced by
///   [`krill_core::PackedQs8Weights`] for at least `nc` channels and
///   depth `kc` (4-byte aligned, which `PackedQs8Weights` guarantees).
/// - `c` must be valid for writes of the addressed output region:
///   groups of eight start `cn_stride` elements apart, and only the
///   final `nc % 8` columns are written in a trailing group.
#[allow(clippy::too_many_arguments)]
pub unsafe fn gemm_qs8_1x8c8(
    mr: usize,
    nc: usize,
    kc: usize,
    a: *const i8,
    a_stride: usize,
    w: *const i32,
    c: *mut i8,
    cm_stride: usize,
    cn_stride: usize,
    params: &Qs8GemmParams,
) {
    debug_assert_eq!(mr, 1);
    debug_assert!(nc >= 1);
    debug_assert!(kc >= 1);
    debug_assert!(!a.is_null());
    debug_assert!(!w.is_null());
    debug_assert!(!c.is_null());
    let _ = (a_stride, cm_stride);

    let kc = (kc + 7) & !7;

    let vzero_point = I16x8::splat(params.output_zero_point);
    let vmin = I8x16::splat(params.output_min);
    let vmax = I8x16::splat(params.output_max);

    let mut w = w as *const i16;
    let mut c0 = c;
    let mut nc = nc;
    loop {
        let bias = w as *const i32;
        let mut vacc01 = I32x8::with_bias(bias.read(), bias.add(1).read());
        let mut vacc23 = I32x8::with_bias(bias.add(2).read(), bias.add(3).read());
        let mut vacc45 = I32x8::with_bias(bias.add(4).read(), bias.add(5).read());
        let mut vacc67 = I32x8::with_bias(bias.add(6).read(), bias.add(7).read());
        w = w.add(16);

        let mut a0 = a;
        let mut k = kc;
        while k != 0 {
            let va = I16x16::load_splat_i8x8(a0);
            a0 = a0.add(8);

            vacc01 = vacc01.add(I16x16::madd(va, I16x16::load(w)));
            vacc23 = vacc23.add(I16x16::madd(va, I16x16::load(w.add(16))));
            vacc45 = vacc45.add(I16x16::madd(va, I16x16::load(w.add(32))));
            vacc67 = vacc67.add(I16x16::madd(va, I16x16::load(w.add(48))));

            w = w.add(64);
            k -= 8;
        }

        // Collapse the per-tile partial sums back into column order:
        // [0 2 4 6 | 1 3 5 7], then interleave the halves.
        let vacc0213 = vacc01.hadd(vacc23);
        let vacc4657 = vacc45.hadd(vacc67);
        let vacc01234567 = vacc0213.hadd(vacc4657).interleave_halves();

        let acc = vacc01234567.to_array();
        let mut scaled = [0i32; 8];
        for (s, &v) in scaled.iter_mut().zip(acc.iter()) {
            *s = params.requantize(v);
        }

        let vout = I32x8::from_array(scaled)
            .pack_sat_i16()
            .add_sat(vzero_point)
            .pack_sat_i8()
            .max(vmin)
            .min(vmax);

        if nc >= 8 {
            vout.store_lo8(c0);
            c0 = c0.add(cn_stride);
            nc -= 8;
            if nc == 0 {
                break;
            }
        } else {
            let mut vout = vout;
            let mut o = c0;
            if nc & 4 != 0 {
                vout.store_lo4(o);
                o = o.add(4);
                vout = vout.shift_right_bytes::<4>();
            }
            if nc & 2 != 0 {
                vout.store_lo2(o);
                o = o.add(2);
                vout = vout.shift_right_bytes::<2>();
            }
            if nc & 1 != 0 {
                *o = vout.extract::<0>();
            }
            break;
        }
    }
}
