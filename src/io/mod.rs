//! I/O layer: decoding multi-band GeoTIFFs into a [`HyperspectralCube`] and
//! writing the analysis products. The pure-Rust `native` reader is always
//! available; `gdal` adds a GDAL-backed reader for every format GDAL knows.
use std::path::Path;

use crate::core::cube::HyperspectralCube;
use crate::core::geo::{GeoBounds, GeoTransform};
use crate::error::Result;

pub mod native;
pub use native::NativeTiffReader;

#[cfg(feature = "gdal")]
pub mod gdal;
#[cfg(feature = "gdal")]
pub use self::gdal::GdalCubeReader;

pub mod writers;

/// A decoded raster: samples plus whatever georeferencing the file carried.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub cube: HyperspectralCube,
    pub geotransform: Option<GeoTransform>,
    /// `EPSG:XXXX` when the code is known, otherwise WKT
    pub projection: Option<String>,
}

impl DecodedImage {
    pub fn bounds(&self) -> Option<GeoBounds> {
        let (rows, cols) = self.cube.dims();
        self.geotransform.map(|gt| gt.bounds(rows, cols))
    }
}

/// Anything that can hand over a decoded multi-band image.
pub trait CubeSource {
    fn read_image(&self) -> Result<DecodedImage>;
}

/// Decode `path` with the preferred reader for this build.
pub fn open_image(path: &Path) -> Result<DecodedImage> {
    #[cfg(feature = "gdal")]
    {
        GdalCubeReader::open(path)?.read_image()
    }
    #[cfg(not(feature = "gdal"))]
    {
        NativeTiffReader::open(path)?.read_image()
    }
}

/// Extract the `EPSG:XXXX` code from a WKT authority tag, if present.
pub(crate) fn parse_epsg(wkt: &str) -> Option<String> {
    const KEY: &str = "AUTHORITY[\"EPSG\",\"";
    let start = wkt.rfind(KEY)? + KEY.len();
    let end = wkt[start..].find('"')?;
    Some(format!("EPSG:{}", &wkt[start..start + end]))
}

/// Numeric part of an `EPSG:XXXX` string.
pub(crate) fn epsg_code(projection: &str) -> Option<u16> {
    projection
        .strip_prefix("EPSG:")
        .or_else(|| projection.strip_prefix("epsg:"))
        .and_then(|code| code.trim().parse().ok())
}
