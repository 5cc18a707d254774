use std::collections::HashMap;
use std::path::Path;

use gdal::raster::ResampleAlg;
use gdal::{Dataset, Metadata};
use tracing::info;

use crate::core::cube::HyperspectralCube;
use crate::core::geo::GeoTransform;
use crate::error::{Error, Result};
use crate::io::{CubeSource, DecodedImage, parse_epsg};

/// Metadata extracted from a GDAL-supported dataset
#[derive(Debug, Clone)]
pub struct GdalMetadata {
    /// Width (pixels) of the raster
    pub size_x: usize,
    /// Height (lines) of the raster
    pub size_y: usize,
    /// Number of raster bands
    pub bands: usize,
    /// `None` when the dataset carries no (or an identity) geotransform
    pub geotransform: Option<GeoTransform>,
    /// Projection as `EPSG:XXXX` when resolvable, otherwise WKT; empty if absent
    pub projection: String,
    /// Additional metadata key-value pairs
    pub metadata: HashMap<String, String>,
}

/// Reader for any raster format GDAL can open (GeoTIFF, ENVI, HDF5, ...)
pub struct GdalCubeReader {
    pub dataset: Dataset,
    pub metadata: GdalMetadata,
}

impl GdalCubeReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let dataset = Dataset::open(path.as_ref())?;
        let (size_x, size_y) = dataset.raster_size();
        let bands = dataset.raster_count() as usize;
        if bands == 0 {
            return Err(Error::UnsupportedFormat("No raster bands found".into()));
        }
        let geotransform = dataset
            .geo_transform()
            .ok()
            .map(GeoTransform::from_gdal)
            .filter(|gt| !gt.is_identity());
        let proj = dataset.projection();
        let projection = if proj.starts_with("EPSG:") {
            proj
        } else if let Some(code) = parse_epsg(&proj) {
            code
        } else {
            proj
        };
        let mut metadata_map = HashMap::new();
        if let Some(entries) = dataset.metadata_domain("") {
            for entry in entries {
                if let Some((key, val)) = entry.split_once('=') {
                    metadata_map.insert(key.to_string(), val.to_string());
                }
            }
        }
        Ok(GdalCubeReader {
            dataset,
            metadata: GdalMetadata {
                size_x,
                size_y,
                bands,
                geotransform,
                projection,
                metadata: metadata_map,
            },
        })
    }

    /// Read a single band (1-based index) as f64 samples in row-major order
    pub fn read_band(&self, index: usize) -> Result<Vec<f64>> {
        if index == 0 || index > self.metadata.bands {
            return Err(Error::InvalidArgument {
                arg: "band",
                value: index.to_string(),
            });
        }
        let band = self.dataset.rasterband(index)?;
        let window = (self.metadata.size_x, self.metadata.size_y);
        let buf = band.read_as::<f64>((0, 0), window, window, Some(ResampleAlg::NearestNeighbour))?;
        let data = buf.data().to_vec();
        if data.len() != self.metadata.size_x * self.metadata.size_y {
            return Err(Error::DimensionMismatch {
                expected: self.metadata.size_x * self.metadata.size_y,
                actual: data.len(),
            });
        }
        Ok(data)
    }
}

impl CubeSource for GdalCubeReader {
    fn read_image(&self) -> Result<DecodedImage> {
        let mut samples =
            Vec::with_capacity(self.metadata.bands * self.metadata.size_x * self.metadata.size_y);
        for idx in 1..=self.metadata.bands {
            samples.extend(self.read_band(idx)?);
        }
        let cube = HyperspectralCube::from_band_sequential(
            self.metadata.bands,
            self.metadata.size_y,
            self.metadata.size_x,
            samples,
        )?;
        info!(
            "GDAL decoded {} band(s) of {}x{}",
            self.metadata.bands, self.metadata.size_y, self.metadata.size_x
        );
        Ok(DecodedImage {
            cube,
            geotransform: self.metadata.geotransform,
            projection: Some(self.metadata.projection.clone()).filter(|p| !p.is_empty()),
        })
    }
}
