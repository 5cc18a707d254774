use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::core::geo::GeoTransform;
use crate::error::Result;

fn world_file_extension(output_image: &Path) -> String {
    let ext = output_image
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => "jgw".to_string(),
        "png" => "pgw".to_string(),
        "tif" | "tiff" => "tfw".to_string(),
        other => match other.chars().next() {
            // first letter + "w"
            Some(first) => format!("{}w", first),
            None => "wld".to_string(),
        },
    }
}

/// Write a world file next to the raster image; the world file stores the
/// transform in pixel-center convention. Returns the world file path.
pub fn write_world_file(output_image: &Path, geotransform: &GeoTransform) -> Result<PathBuf> {
    let world_path = output_image.with_extension(world_file_extension(output_image));

    // A: pixel size X, D: rotation about Y, B: rotation about X, E: pixel size Y
    // C, F: center of upper-left pixel
    let a = geotransform.pixel_width;
    let d = geotransform.col_rotation;
    let b = geotransform.row_rotation;
    let e = geotransform.pixel_height;
    let c = geotransform.origin_x + 0.5 * a + 0.5 * b;
    let f = geotransform.origin_y + 0.5 * d + 0.5 * e;

    let mut file = File::create(&world_path)?;
    for v in [a, d, b, e, c, f] {
        writeln!(file, "{:.12}", v)?;
    }
    Ok(world_path)
}

/// Write a .prj file with the provided projection (WKT or EPSG:XXXX)
pub fn write_prj_file(output_image: &Path, projection: &str) -> Result<PathBuf> {
    let prj_path = output_image.with_extension("prj");
    std::fs::write(&prj_path, projection.as_bytes())?;
    Ok(prj_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_file_uses_pixel_centers() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("mask.jpg");
        let gt = GeoTransform::new(100.0, 50.0, 2.0, -2.0);
        let path = write_world_file(&image, &gt).unwrap();
        assert_eq!(path.extension().unwrap(), "jgw");

        let text = std::fs::read_to_string(path).unwrap();
        let values: Vec<f64> = text.lines().map(|l| l.parse().unwrap()).collect();
        assert_eq!(values, vec![2.0, 0.0, 0.0, -2.0, 101.0, 49.0]);
    }

    #[test]
    fn extensions_follow_the_image_format() {
        assert_eq!(world_file_extension(Path::new("a.TIF")), "tfw");
        assert_eq!(world_file_extension(Path::new("a.bmp")), "bw");
        assert_eq!(world_file_extension(Path::new("a")), "wld");
    }
}
