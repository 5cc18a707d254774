//! Core building blocks: the multi-band cube, georeferencing, band selection,
//! analysis parameters, and the band-ratio processing engine. These are
//! consumed by the high-level `api` module.
pub mod bands;
pub mod cube;
pub mod geo;
pub mod params;
pub mod processing;
