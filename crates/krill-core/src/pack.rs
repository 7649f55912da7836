//! Weight packing for the quantized GEMM micro-kernel.
//!
//! The kernel walks one flat buffer front to back, so the packer must
//! emit bias values and weights in exactly the order the inner loop
//! consumes them. Packing happens once at model-load time; the buffer
//! is then shared read-only across every kernel invocation.

use log::debug;

use crate::error::{KrillError, Result};

/// Output channels per column group.
pub const QS8_GEMM_NR: usize = 8;
/// Reduction depth per k-slice.
pub const QS8_GEMM_KR: usize = 8;

/// Weights and biases packed in the order `gemm_qs8_1x8c8` consumes
/// them.
///
/// Per group of 8 output channels:
///
/// ```text
/// [bias c+0 .. bias c+7]                                  8 x i32
/// for each 8-deep k-slice:
///     for each column pair (c+0,c+1) (c+2,c+3) (c+4,c+5) (c+6,c+7):
///         [w(c, k..k+8), w(c+1, k..k+8)]                  16 x i16
/// ```
///
/// Weights are sign-extended from i8 to i16 at pack time. Channels are
/// padded up to a multiple of 8 and depth up to a multiple of 8 with
/// zeros, so the kernel never sees a partial group or slice. Backing
/// storage is `Vec<i32>`; adjacent i16 lanes share a storage slot in
/// little-endian order, as on every supported target.
#[derive(Debug, Clone)]
pub struct PackedQs8Weights {
    channels: usize,
    depth: usize,
    data: Vec<i32>,
}

impl PackedQs8Weights {
    /// Packs a row-major `channels x depth` i8 weight matrix plus one
    /// i32 bias per channel.
    pub fn pack(channels: usize, depth: usize, weights: &[i8], bias: &[i32]) -> Result<Self> {
        if channels == 0 || depth == 0 {
            return Err(KrillError::InvalidDimension(format!(
                "packed weights need non-zero dimensions, got {}x{}",
                channels, depth
            )));
        }
        if weights.len() != channels * depth {
            return Err(KrillError::LengthMismatch {
                expected: channels * depth,
                got: weights.len(),
            });
        }
        if bias.len() != channels {
            return Err(KrillError::LengthMismatch {
                expected: channels,
                got: bias.len(),
            });
        }

        let padded_channels = channels.div_ceil(QS8_GEMM_NR) * QS8_GEMM_NR;
        let padded_depth = depth.div_ceil(QS8_GEMM_KR) * QS8_GEMM_KR;
        debug!(
            "packing qs8 weights: {}x{} -> {} groups, {} k-slices each",
            channels,
            depth,
            padded_channels / QS8_GEMM_NR,
            padded_depth / QS8_GEMM_KR
        );

        let slots_per_group = QS8_GEMM_NR + padded_depth / QS8_GEMM_KR * 32;
        let mut data = Vec::with_capacity(padded_channels / QS8_GEMM_NR * slots_per_group);

        let weight_at = |c: usize, k: usize| -> i16 {
            if c < channels && k < depth {
                i16::from(weights[c * depth + k])
            } else {
                0
            }
        };

        for group in (0..padded_channels).step_by(QS8_GEMM_NR) {
            for j in 0..QS8_GEMM_NR {
                data.push(if group + j < channels { bias[group + j] } else { 0 });
            }
            for slice in (0..padded_depth).step_by(QS8_GEMM_KR) {
                for pair in 0..QS8_GEMM_NR / 2 {
                    let c0 = group + 2 * pair;
                    let mut tile = [0i16; 16];
                    for (i, lane) in tile.iter_mut().enumerate() {
                        *lane = weight_at(c0 + i / 8, slice + i % 8);
                    }
                    for slot in 0..8 {
                        data.push(pack_pair(tile[2 * slot], tile[2 * slot + 1]));
                    }
                }
            }
        }

        Ok(Self {
            channels,
            depth,
            data,
        })
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.data
    }

    pub fn as_ptr(&self) -> *const i32 {
        self.data.as_ptr()
    }
}

/// Two adjacent i16 lanes into one i32 storage slot, low lane first.
fn pack_pair(lo: i16, hi: i16) -> i32 {
    (u32::from(lo as u16) | (u32::from(hi as u16) << 16)) as i32
}

/// Depthwise 3x3 weight vector: bias followed by the nine taps in
/// row-major order (k00..k22).
pub fn pack_dwconv_3x3_weights(bias: f32, taps: &[f32; 9]) -> [f32; 10] {
    let mut out = [0.0f32; 10];
    out[0] = bias;
    out[1..].copy_from_slice(taps);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unpack_pair(slot: i32) -> (i16, i16) {
        let bits = slot as u32;
        ((bits & 0xffff) as u16 as i16, (bits >> 16) as u16 as i16)
    }

    #[test]
    fn two_channel_layout_is_bias_then_column_pairs() {
        let weights: Vec<i8> = (0..16).map(|v| v as i8).collect(); // 2 channels x 8
        let bias = [100, -200];
        let packed = PackedQs8Weights::pack(2, 8, &weights, &bias).unwrap();
        let data = packed.as_slice();

        // one group: 8 bias slots + one k-slice of 4 tiles
        assert_eq!(data.len(), 8 + 32);
        assert_eq!(&data[..8], &[100, -200, 0, 0, 0, 0, 0, 0]);

        // first tile interleaves channel 0 and channel 1 per slot pair
        assert_eq!(unpack_pair(data[8]), (0, 1)); // c0 k0, c0 k1
        assert_eq!(unpack_pair(data[11]), (6, 7)); // c0 k6, c0 k7
        assert_eq!(unpack_pair(data[12]), (8, 9)); // c1 k0, c1 k1
        assert_eq!(unpack_pair(data[15]), (14, 15)); // c1 k6, c1 k7

        // channel pairs (2,3) (4,5) (6,7) are padding
        assert!(data[16..40].iter().all(|&v| v == 0));
    }

    #[test]
    fn depth_is_zero_padded_to_a_multiple_of_eight() {
        let weights: Vec<i8> = vec![-1; 3 * 5]; // 3 channels x 5
        let bias = [1, 2, 3];
        let packed = PackedQs8Weights::pack(3, 5, &weights, &bias).unwrap();
        let data = packed.as_slice();

        assert_eq!(data.len(), 8 + 32);
        assert_eq!(&data[..8], &[1, 2, 3, 0, 0, 0, 0, 0]);

        // channel 0, k-slice lanes: five -1 weights then three zeros
        let (w0, w1) = unpack_pair(data[8]);
        assert_eq!((w0, w1), (-1, -1));
        let (w4, w5) = unpack_pair(data[10]);
        assert_eq!((w4, w5), (-1, 0));
        let (w6, w7) = unpack_pair(data[11]);
        assert_eq!((w6, w7), (0, 0));
    }

    #[test]
    fn channels_beyond_eight_start_a_new_group() {
        let channels = 9;
        let depth = 8;
        let weights: Vec<i8> = vec![7; channels * depth];
        let bias: Vec<i32> = (0..channels as i32).collect();
        let packed = PackedQs8Weights::pack(channels, depth, &weights, &bias).unwrap();
        let data = packed.as_slice();

        assert_eq!(data.len(), 2 * (8 + 32));
        assert_eq!(&data[..8], &[0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(&data[40..48], &[8, 0, 0, 0, 0, 0, 0, 0]);
        // second group carries channel 8's weights in its first tile
        assert_eq!(unpack_pair(data[48]), (7, 7));
        // and zeros for the padded channel 9
        assert_eq!(unpack_pair(data[52]), (0, 0));
    }

    #[test]
    fn shape_mismatches_are_rejected() {
        assert!(PackedQs8Weights::pack(0, 8, &[], &[]).is_err());
        assert!(PackedQs8Weights::pack(2, 8, &[0; 15], &[0; 2]).is_err());
        assert!(PackedQs8Weights::pack(2, 8, &[0; 16], &[0; 3]).is_err());
    }

    #[test]
    fn dwconv_weights_put_bias_first() {
        let taps = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let w = pack_dwconv_3x3_weights(0.5, &taps);
        assert_eq!(w[0], 0.5);
        assert_eq!(&w[1..], &taps);
    }
}
