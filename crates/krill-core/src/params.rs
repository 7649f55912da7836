//! Kernel parameter blocks and fixed-point quantization derivation.

use serde::{Deserialize, Serialize};

use crate::error::{KrillError, Result};

/// Quantized output description as it appears in model configuration:
/// the real-valued requantization scale plus the integer output range.
///
/// This is the serializable form; kernels consume the derived
/// [`Qs8GemmParams`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantSpec {
    /// Requantization scale, `input_scale * weight_scale / output_scale`.
    pub scale: f32,
    pub zero_point: i8,
    pub min: i8,
    pub max: i8,
}

/// Parameters for the depthwise 3x3 convolution kernel.
///
/// `mask` covers the trailing 1-4 column group of each row: a lane is
/// all-ones when the column exists and zero otherwise, so the kernel
/// can blank out-of-row lanes with a single bitwise and. When the row
/// width is a multiple of four the mask keeps every lane.
#[derive(Debug, Clone, Copy)]
pub struct DwConvParams {
    pub mask: [u32; 4],
    pub min: f32,
    pub max: f32,
}

impl DwConvParams {
    pub fn new(input_width: usize, min: f32, max: f32) -> Result<Self> {
        if input_width == 0 {
            return Err(KrillError::InvalidDimension(
                "input_width must be non-zero".to_string(),
            ));
        }
        if !(min <= max) {
            return Err(KrillError::InvalidClamp { min, max });
        }
        let live = match input_width % 4 {
            0 => 4,
            r => r,
        };
        let mut mask = [0u32; 4];
        for lane in mask.iter_mut().take(live) {
            *lane = u32::MAX;
        }
        Ok(Self { mask, min, max })
    }
}

/// Parameters for the quantized GEMM micro-kernel.
///
/// A 32-bit accumulator is requantized as
///
/// ```text
/// q31 = (acc * multiplier + rounding) >> 31          (64-bit product)
/// out = (q31 >> shift) + correction                   (remainder-based)
/// ```
///
/// then offset by `output_zero_point`, saturated through i16 down to
/// i8, and clamped to `[output_min, output_max]`. The remainder
/// correction makes the second stage a round-half-away-from-zero
/// division by `2^shift`.
#[derive(Debug, Clone, Copy)]
pub struct Qs8GemmParams {
    pub multiplier: i32,
    pub rounding: i64,
    pub remainder_mask: i32,
    pub remainder_threshold: i32,
    pub shift: u32,
    pub output_zero_point: i16,
    pub output_min: i8,
    pub output_max: i8,
}

impl Qs8GemmParams {
    /// Derives the fixed-point multiplier and shift from a real-valued
    /// requantization scale in `[2^-31, 1)`.
    ///
    /// The f32 mantissa (with its implicit bit) becomes a Q31
    /// multiplier in `[2^30, 2^31)`; the exponent becomes the shift.
    pub fn from_scale(scale: f32, zero_point: i8, min: i8, max: i8) -> Result<Self> {
        if !scale.is_finite() || scale <= 0.0 || scale >= 1.0 {
            return Err(KrillError::InvalidScale(scale));
        }
        let bits = scale.to_bits();
        let multiplier = (((bits & 0x007f_ffff) | 0x0080_0000) << 7) as i32;
        let shift = 126 - ((bits >> 23) as i32);
        if !(0..31).contains(&shift) {
            return Err(KrillError::InvalidScale(scale));
        }
        Self::from_parts(multiplier, shift as u32, zero_point, min, max)
    }

    /// Builds the parameter block from a raw multiplier/shift pair.
    pub fn from_parts(
        multiplier: i32,
        shift: u32,
        zero_point: i8,
        min: i8,
        max: i8,
    ) -> Result<Self> {
        if multiplier < (1 << 30) {
            return Err(KrillError::InvalidMultiplier(multiplier));
        }
        if shift >= 31 {
            return Err(KrillError::InvalidShift(shift));
        }
        let remainder_mask = ((1u32 << shift) - 1) as i32;
        Ok(Self {
            multiplier,
            rounding: 0x4000_0000,
            remainder_mask,
            remainder_threshold: ((remainder_mask as u32) >> 1) as i32,
            shift,
            output_zero_point: i16::from(zero_point),
            output_min: min,
            output_max: max,
        })
    }

    pub fn from_spec(spec: &QuantSpec) -> Result<Self> {
        Self::from_scale(spec.scale, spec.zero_point, spec.min, spec.max)
    }

    /// Requantizes one 32-bit accumulator down to the scaled integer
    /// domain (before the zero-point offset and output clamp).
    ///
    /// This single definition is shared by the scalar and vector
    /// kernels, so every variant rounds identically.
    #[inline]
    pub fn requantize(&self, acc: i32) -> i32 {
        let product = i64::from(acc) * i64::from(self.multiplier);
        let q31 = ((product + self.rounding) >> 31) as i32;
        let remainder = (q31 & self.remainder_mask) - i32::from(q31 < 0);
        (q31 >> self.shift) + i32::from(remainder > self.remainder_threshold)
    }
}
