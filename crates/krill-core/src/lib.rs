//! krill core - shared types for the krill micro-kernel library
//!
//! This crate holds everything the compute backends have in common:
//! kernel parameter blocks, fixed-point quantization parameter
//! derivation, and the weight-packing routines that produce buffers in
//! the exact order the micro-kernels consume them.
//!
//! The kernels themselves live in backend crates (`krill-cpu`); this
//! crate contains no SIMD and no unsafe code.

pub mod error;
pub mod pack;
pub mod params;

pub use error::{KrillError, Result};
pub use pack::{pack_dwconv_3x3_weights, PackedQs8Weights};
pub use params::{DwConvParams, Qs8GemmParams, QuantSpec};
