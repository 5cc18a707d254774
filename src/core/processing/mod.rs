//! Band-ratio engine: ratio with zero handling and sanitization (`ops`),
//! statistics and histograms (`stats`), threshold classification (`classify`),
//! and the end-to-end `pipeline`.
pub mod classify;
pub mod ops;
pub mod pipeline;
pub mod stats;
