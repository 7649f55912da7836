//! CPU backend for krill
//!
//! Two leaf compute kernels for neural-network inference, written
//! against a fixed-width vector layer:
//!
//! - [`dwconv_3x3p1_f32`]: depthwise 3x3 convolution, stride 1, one
//!   pixel of logical zero padding, one channel per call.
//! - [`gemm_qs8_1x8c8`]: signed-8-bit GEMM micro-kernel producing one
//!   output row, eight columns per group, with fixed-point
//!   requantization back down to i8.
//!
//! Both kernels are pure functions over caller-owned buffers: no
//! allocation, no I/O, no shared state. Scalar fallbacks with
//! bit-identical results live in [`scalar`].

mod dwconv;
mod gemm;
pub mod scalar;
pub mod simd;

pub use dwconv::dwconv_3x3p1_f32;
pub use gemm::gemm_qs8_1x8c8;
pub use scalar::{dwconv_3x3p1_f32_scalar, gemm_qs8_scalar};

/// Whether the vector types compile down to hardware SIMD here.
#[cfg(all(target_arch = "wasm32", target_feature = "simd128"))]
pub fn has_simd() -> bool {
    true
}

/// Whether the vector types compile down to hardware SIMD here.
#[cfg(not(all(target_arch = "wasm32", target_feature = "simd128")))]
pub fn has_simd() -> bool {
    false
}
