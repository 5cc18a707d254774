use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use ndarray::Array2;
use tiff::encoder::colortype::{ColorType, Gray8, Gray32Float};
use tiff::encoder::{DirectoryEncoder, TiffEncoder, TiffKindStandard, TiffValue};
use tiff::tags::Tag;

use crate::core::geo::GeoTransform;
use crate::error::Result;
use crate::io::epsg_code;
use crate::io::native::{
    GEO_KEY_DIRECTORY_TAG, GEOGRAPHIC_TYPE_GEO_KEY, MODEL_PIXEL_SCALE_TAG, MODEL_TIEPOINT_TAG,
    MODEL_TRANSFORMATION_TAG, PROJECTED_CS_TYPE_GEO_KEY,
};

/// Georeferencing to embed in a written GeoTIFF
#[derive(Debug, Clone, Copy, Default)]
pub struct Georeference<'a> {
    pub geotransform: Option<GeoTransform>,
    pub projection: Option<&'a str>,
}

fn geo_key_directory(projection: Option<&str>) -> Vec<u16> {
    // GTModelTypeGeoKey 1=projected 2=geographic, GTRasterTypeGeoKey 1=PixelIsArea
    let code = projection.and_then(epsg_code);
    let geographic = matches!(code, Some(c) if (4000..5000).contains(&c));
    let model_type = if geographic { 2 } else { 1 };
    let mut keys: Vec<u16> = vec![1, 1, 0, 2, 1024, 0, 1, model_type, 1025, 0, 1, 1];
    if let Some(c) = code {
        let key = if geographic {
            GEOGRAPHIC_TYPE_GEO_KEY
        } else {
            PROJECTED_CS_TYPE_GEO_KEY
        };
        keys.extend_from_slice(&[key as u16, 0, 1, c]);
        keys[3] = 3;
    }
    keys
}

fn write_geo_tags<W: Write + Seek>(
    dir: &mut DirectoryEncoder<'_, W, TiffKindStandard>,
    georef: &Georeference<'_>,
) -> Result<()> {
    let Some(gt) = georef.geotransform else {
        return Ok(());
    };
    if gt.row_rotation == 0.0 && gt.col_rotation == 0.0 {
        let scale = [gt.pixel_width, gt.pixel_height.abs(), 0.0];
        dir.write_tag(Tag::Unknown(MODEL_PIXEL_SCALE_TAG), &scale[..])?;
        let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
        dir.write_tag(Tag::Unknown(MODEL_TIEPOINT_TAG), &tiepoint[..])?;
    } else {
        let m = [
            gt.pixel_width,
            gt.row_rotation,
            0.0,
            gt.origin_x,
            gt.col_rotation,
            gt.pixel_height,
            0.0,
            gt.origin_y,
            0.0,
            0.0,
            0.0,
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
        ];
        dir.write_tag(Tag::Unknown(MODEL_TRANSFORMATION_TAG), &m[..])?;
    }
    let keys = geo_key_directory(georef.projection);
    dir.write_tag(Tag::Unknown(GEO_KEY_DIRECTORY_TAG), &keys[..])?;
    Ok(())
}

fn write_single_band<C: ColorType>(
    output: &Path,
    cols: usize,
    rows: usize,
    data: &[C::Inner],
    georef: &Georeference<'_>,
) -> Result<()>
where
    [C::Inner]: TiffValue,
{
    let file = File::create(output)?;
    let mut encoder = TiffEncoder::new(BufWriter::new(file))?;
    let mut image = encoder.new_image::<C>(cols as u32, rows as u32)?;
    write_geo_tags(image.encoder(), georef)?;
    image.write_data(data)?;
    Ok(())
}

/// Write the 0/255 display mask as an 8-bit single-band GeoTIFF
pub fn write_mask_tiff(output: &Path, mask: &Array2<u8>, georef: &Georeference<'_>) -> Result<()> {
    let (rows, cols) = mask.dim();
    let data: Vec<u8> = mask.iter().copied().collect();
    write_single_band::<Gray8>(output, cols, rows, &data, georef)
}

/// Write the ratio raster as a Float32 single-band GeoTIFF
pub fn write_ratio_tiff(output: &Path, ratio: &Array2<f64>, georef: &Georeference<'_>) -> Result<()> {
    let (rows, cols) = ratio.dim();
    let data: Vec<f32> = ratio.iter().map(|&v| v as f32).collect();
    write_single_band::<Gray32Float>(output, cols, rows, &data, georef)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::native::read_tiff_from_buffer;
    use ndarray::array;

    #[test]
    fn mask_round_trips_with_georeference() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mask.tif");
        let mask = array![[0u8, 255, 0], [255, 255, 0]];
        let georef = Georeference {
            geotransform: Some(GeoTransform::new(500000.0, 4200000.0, 30.0, -30.0)),
            projection: Some("EPSG:32633"),
        };
        write_mask_tiff(&path, &mask, &georef).unwrap();

        let image = read_tiff_from_buffer(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(image.cube.band_count(), 1);
        assert_eq!(image.cube.band(0).unwrap(), mask.mapv(f64::from));
        assert_eq!(image.geotransform, georef.geotransform);
        assert_eq!(image.projection.as_deref(), Some("EPSG:32633"));
    }

    #[test]
    fn ratio_is_written_as_float() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ratio.tif");
        let ratio = array![[0.5, 1.25], [2.0, 0.0]];
        write_ratio_tiff(&path, &ratio, &Georeference::default()).unwrap();

        let image = read_tiff_from_buffer(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(image.cube.band(0).unwrap(), ratio);
        assert!(image.geotransform.is_none());
    }

    #[test]
    fn geographic_codes_use_the_geographic_key() {
        let keys = geo_key_directory(Some("EPSG:4326"));
        assert_eq!(keys[3], 3);
        assert_eq!(keys[7], 2);
        assert_eq!(&keys[12..], &[2048, 0, 1, 4326]);
        assert_eq!(geo_key_directory(None).len(), 12);
    }
}
