use ndarray::{Array3, ArrayView2, Axis};

use crate::error::{Error, Result};

/// Multi-band raster held as `(bands, rows, cols)`.
///
/// Every band shares the same grid dimensions because the samples live in a
/// single 3-D array. The cube is read-only once constructed.
#[derive(Debug, Clone)]
pub struct HyperspectralCube {
    data: Array3<f64>,
}

impl HyperspectralCube {
    pub fn new(data: Array3<f64>) -> Self {
        Self { data }
    }

    /// Build a cube from per-band planes stored back to back (band-sequential).
    pub fn from_band_sequential(
        bands: usize,
        rows: usize,
        cols: usize,
        samples: Vec<f64>,
    ) -> Result<Self> {
        let expected = bands * rows * cols;
        if samples.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: samples.len(),
            });
        }
        let data = Array3::from_shape_vec((bands, rows, cols), samples).map_err(|_| {
            Error::DimensionMismatch {
                expected,
                actual: expected,
            }
        })?;
        Ok(Self { data })
    }

    /// Build a cube from pixel-interleaved samples (`[p0b0, p0b1, .., p1b0, ..]`).
    pub fn from_pixel_interleaved(
        bands: usize,
        rows: usize,
        cols: usize,
        samples: &[f64],
    ) -> Result<Self> {
        let expected = bands * rows * cols;
        if samples.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: samples.len(),
            });
        }
        let data = Array3::from_shape_fn((bands, rows, cols), |(b, r, c)| {
            samples[(r * cols + c) * bands + b]
        });
        Ok(Self { data })
    }

    pub fn band_count(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    /// Grid dimensions shared by every band, as `(rows, cols)`.
    pub fn dims(&self) -> (usize, usize) {
        let (_, rows, cols) = self.data.dim();
        (rows, cols)
    }

    /// View of one band plane; `None` when `index >= band_count()`.
    pub fn band(&self, index: usize) -> Option<ArrayView2<'_, f64>> {
        if index < self.band_count() {
            Some(self.data.index_axis(Axis(0), index))
        } else {
            None
        }
    }

    /// Approximate in-memory size of the samples in bytes.
    pub fn byte_size(&self) -> usize {
        self.data.len() * std::mem::size_of::<f64>()
    }

    pub fn as_array(&self) -> &Array3<f64> {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interleaved_and_sequential_layouts_agree() {
        // 2 bands, 1 row, 3 cols
        let seq = HyperspectralCube::from_band_sequential(
            2,
            1,
            3,
            vec![1.0, 2.0, 3.0, 10.0, 20.0, 30.0],
        )
        .unwrap();
        let inter = HyperspectralCube::from_pixel_interleaved(
            2,
            1,
            3,
            &[1.0, 10.0, 2.0, 20.0, 3.0, 30.0],
        )
        .unwrap();
        assert_eq!(seq.as_array(), inter.as_array());
        assert_eq!(seq.band_count(), 2);
        assert_eq!(seq.dims(), (1, 3));
        assert_eq!(seq.band(1).unwrap()[[0, 2]], 30.0);
        assert!(seq.band(2).is_none());
    }

    #[test]
    fn sample_count_is_validated() {
        let err = HyperspectralCube::from_band_sequential(2, 2, 2, vec![0.0; 7]).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: 8,
                actual: 7
            }
        ));
    }
}
