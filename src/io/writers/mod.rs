//! Output products handed to renderers: the ratio raster and display mask as
//! GeoTIFF (or the mask as JPEG with a world file), and a JSON sidecar.
pub mod jpeg;
pub mod metadata;
pub mod tiff;
pub mod worldfile;
