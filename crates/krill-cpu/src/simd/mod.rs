//! Fixed-width vector types used by the kernels.
//!
//! The kernels are written once against these types; the backing
//! implementation is chosen per target:
//!
//! - wasm32 with simd128: `std::arch::wasm32` intrinsics
//! - everywhere else: portable `[T; N]` lanes, shaped so LLVM can
//!   auto-vectorize the hot loops
//!
//! Every operation has identical lane semantics on both backends. The
//! widths mirror the kernels' needs: 128-bit f32 lanes for the
//! convolution, 256-bit integer lanes (held as two halves) for the
//! quantized GEMM.

#[cfg(all(target_arch = "wasm32", target_feature = "simd128"))]
mod wasm;
#[cfg(all(target_arch = "wasm32", target_feature = "simd128"))]
pub use wasm::{F32x4, I16x16, I16x8, I32x8, I8x16};

#[cfg(not(all(target_arch = "wasm32", target_feature = "simd128")))]
mod portable;
#[cfg(not(all(target_arch = "wasm32", target_feature = "simd128")))]
pub use portable::{F32x4, I16x16, I16x8, I32x8, I8x16};
