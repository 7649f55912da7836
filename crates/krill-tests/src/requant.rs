//! Fixed-point requantization rounding tests
