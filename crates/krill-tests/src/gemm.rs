//! Quantized GEMM conformance tests
