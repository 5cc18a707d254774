//! Pure-Rust GeoTIFF decoding via the `tiff` crate.
//!
//! Handles chunky (pixel-interleaved) and planar multi-sample images, and
//! single-sample images that store one band per page. Georeferencing is read
//! from ModelPixelScale + ModelTiepoint or ModelTransformation, and the EPSG
//! code from the GeoKey directory.
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::{Path, PathBuf};

use tiff::decoder::{ChunkType, Decoder, DecodingResult};
use tiff::tags::Tag;
use tracing::{debug, info, warn};

use crate::core::cube::HyperspectralCube;
use crate::core::geo::GeoTransform;
use crate::error::{Error, Result};
use crate::io::{CubeSource, DecodedImage};

pub(crate) const MODEL_PIXEL_SCALE_TAG: u16 = 33550;
pub(crate) const MODEL_TIEPOINT_TAG: u16 = 33922;
pub(crate) const MODEL_TRANSFORMATION_TAG: u16 = 34264;
pub(crate) const GEO_KEY_DIRECTORY_TAG: u16 = 34735;

pub(crate) const GEOGRAPHIC_TYPE_GEO_KEY: u32 = 2048;
pub(crate) const PROJECTED_CS_TYPE_GEO_KEY: u32 = 3072;

/// Reader for (Geo)TIFF files on disk
pub struct NativeTiffReader {
    path: PathBuf,
}

impl NativeTiffReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is not a file", path.display()),
            )));
        }
        Ok(Self { path })
    }
}

impl CubeSource for NativeTiffReader {
    fn read_image(&self) -> Result<DecodedImage> {
        info!("Decoding {:?}", self.path);
        let file = File::open(&self.path)?;
        decode_tiff(BufReader::new(file))
    }
}

/// Decode a GeoTIFF held in memory (e.g. an uploaded file).
pub fn read_tiff_from_buffer(data: &[u8]) -> Result<DecodedImage> {
    decode_tiff(Cursor::new(data))
}

fn to_f64(result: DecodingResult) -> Result<Vec<f64>> {
    Ok(match result {
        DecodingResult::U8(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U16(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U64(buf) => buf.into_iter().map(|v| v as f64).collect(),
        DecodingResult::I8(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I16(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I64(buf) => buf.into_iter().map(|v| v as f64).collect(),
        DecodingResult::F32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::F64(buf) => buf,
        #[allow(unreachable_patterns)]
        _ => {
            return Err(Error::UnsupportedFormat(
                "unsupported TIFF sample type".to_string(),
            ));
        }
    })
}

fn decode_tiff<R: Read + Seek>(reader: R) -> Result<DecodedImage> {
    let mut decoder = Decoder::new(reader)?;
    let (width, height) = decoder.dimensions()?;
    let (rows, cols) = (height as usize, width as usize);
    let pixels = rows * cols;
    if pixels == 0 {
        return Err(Error::UnsupportedFormat("image has no pixels".to_string()));
    }

    // Georeferencing lives on the first page
    let geotransform = read_geotransform(&mut decoder);
    let projection = read_epsg(&mut decoder);
    let planar = decoder.get_tag_u32(Tag::PlanarConfiguration).unwrap_or(1) == 2;
    let sample_count = decoder.get_tag_u32(Tag::SamplesPerPixel).unwrap_or(1) as usize;

    if planar && sample_count > 1 {
        debug!("Band-interleaved TIFF: {} planes", sample_count);
        let samples = read_planes(&mut decoder, sample_count, rows, cols)?;
        let cube = HyperspectralCube::from_band_sequential(sample_count, rows, cols, samples)?;
        return Ok(finish(cube, geotransform, projection));
    }

    let first = to_f64(decoder.read_image()?)?;
    if first.is_empty() || first.len() % pixels != 0 {
        return Err(Error::DimensionMismatch {
            expected: pixels * (first.len() / pixels).max(1),
            actual: first.len(),
        });
    }
    let samples_per_pixel = first.len() / pixels;

    let cube = if samples_per_pixel > 1 {
        debug!("Pixel-interleaved TIFF: {} bands", samples_per_pixel);
        HyperspectralCube::from_pixel_interleaved(samples_per_pixel, rows, cols, &first)?
    } else {
        // One band per page; pages of other sizes (overviews, thumbnails) are skipped
        let mut samples = first;
        let mut bands = 1;
        while decoder.more_images() {
            decoder.next_image()?;
            if decoder.dimensions()? != (width, height) {
                debug!("Skipping page with different dimensions");
                continue;
            }
            let page = to_f64(decoder.read_image()?)?;
            if page.len() != pixels {
                warn!(
                    "Skipping page with {} samples, expected {}",
                    page.len(),
                    pixels
                );
                continue;
            }
            samples.extend(page);
            bands += 1;
        }
        HyperspectralCube::from_band_sequential(bands, rows, cols, samples)?
    };

    Ok(finish(cube, geotransform, projection))
}

fn finish(
    cube: HyperspectralCube,
    geotransform: Option<GeoTransform>,
    projection: Option<String>,
) -> DecodedImage {
    let (rows, cols) = cube.dims();
    info!(
        "Decoded {} band(s) of {}x{} ({:.2} MB)",
        cube.band_count(),
        rows,
        cols,
        cube.byte_size() as f64 / 1024.0 / 1024.0
    );
    DecodedImage {
        cube,
        geotransform,
        projection,
    }
}

/// Read a `PlanarConfiguration=2` image chunk by chunk into band-sequential
/// samples. `read_image` only yields the first plane for this layout.
///
/// Chunks are numbered plane by plane; within a plane, strips run top to
/// bottom and tiles row-major.
fn read_planes<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    planes: usize,
    rows: usize,
    cols: usize,
) -> Result<Vec<f64>> {
    let chunk_count = match decoder.get_chunk_type() {
        ChunkType::Strip => decoder.strip_count()?,
        ChunkType::Tile => decoder.tile_count()?,
    } as usize;
    if chunk_count == 0 || chunk_count % planes != 0 {
        return Err(Error::UnsupportedFormat(format!(
            "{} chunks cannot be split into {} planes",
            chunk_count, planes
        )));
    }
    let per_plane = chunk_count / planes;
    let (chunk_w, chunk_h) = decoder.chunk_dimensions();
    let (chunk_w, chunk_h) = (chunk_w as usize, chunk_h as usize);
    if chunk_w == 0 || chunk_h == 0 {
        return Err(Error::UnsupportedFormat("zero-sized TIFF chunk".to_string()));
    }
    let chunks_across = cols.div_ceil(chunk_w);

    let plane_len = rows * cols;
    let mut samples = vec![0.0; planes * plane_len];
    for index in 0..chunk_count {
        let (data_w, data_h) = decoder.chunk_data_dimensions(index as u32);
        let (data_w, data_h) = (data_w as usize, data_h as usize);
        let data = to_f64(decoder.read_chunk(index as u32)?)?;
        if data.len() < data_w * data_h {
            return Err(Error::DimensionMismatch {
                expected: data_w * data_h,
                actual: data.len(),
            });
        }

        let plane = index / per_plane;
        let local = index % per_plane;
        let row0 = (local / chunks_across) * chunk_h;
        let col0 = (local % chunks_across) * chunk_w;
        let out = &mut samples[plane * plane_len..(plane + 1) * plane_len];
        for r in 0..data_h.min(rows.saturating_sub(row0)) {
            let width = data_w.min(cols.saturating_sub(col0));
            let src = &data[r * data_w..r * data_w + width];
            let start = (row0 + r) * cols + col0;
            out[start..start + width].copy_from_slice(src);
        }
    }
    Ok(samples)
}

fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<GeoTransform> {
    if let (Ok(scale), Ok(tiepoint)) = (
        decoder.get_tag_f64_vec(Tag::Unknown(MODEL_PIXEL_SCALE_TAG)),
        decoder.get_tag_f64_vec(Tag::Unknown(MODEL_TIEPOINT_TAG)),
    ) {
        if scale.len() >= 2 && tiepoint.len() >= 6 {
            // tiepoint: [I, J, K, X, Y, Z], scale: [ScaleX, ScaleY, ScaleZ]
            let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
            let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
            return Some(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]));
        }
    }

    // 4x4 row-major model transformation matrix
    if let Ok(m) = decoder.get_tag_f64_vec(Tag::Unknown(MODEL_TRANSFORMATION_TAG)) {
        if m.len() >= 8 {
            return Some(GeoTransform::from_gdal([m[3], m[0], m[1], m[7], m[4], m[5]]));
        }
    }

    debug!("No georeferencing tags found");
    None
}

fn read_epsg<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<String> {
    let keys = decoder
        .get_tag_u32_vec(Tag::Unknown(GEO_KEY_DIRECTORY_TAG))
        .ok()?;
    // header: version, revision, minor, key count; then 4 values per key
    let count = *keys.get(3)? as usize;
    keys.get(4..4 + count * 4)?
        .chunks_exact(4)
        .find(|entry| {
            (entry[0] == PROJECTED_CS_TYPE_GEO_KEY || entry[0] == GEOGRAPHIC_TYPE_GEO_KEY)
                && entry[1] == 0
                && entry[3] != 0
                && entry[3] != 32767
        })
        .map(|entry| format!("EPSG:{}", entry[3]))
}
