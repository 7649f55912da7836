//! Depthwise convolution conformance tests
