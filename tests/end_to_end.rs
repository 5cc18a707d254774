use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use approx::assert_relative_eq;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{TiffEncoder, colortype};
use tiff::tags::Tag;

use ironratio::{
    AnalysisParams, BandPair, Error, MineralTarget, OutputFormat, ZeroPolicy,
    analyze_directory_to_path, analyze_file, analyze_file_to_path,
};

const WIDTH: u32 = 4;
const HEIGHT: u32 = 3;

/// Band 7 holds `col + 1`, band 6 is 1.0 except a zero at (0, 0); the other
/// bands are constant filler.
fn band_values(band: usize) -> Vec<f32> {
    (0..HEIGHT)
        .flat_map(|r| (0..WIDTH).map(move |c| (r, c)))
        .map(|(r, c)| match band {
            7 => (c + 1) as f32,
            6 if r == 0 && c == 0 => 0.0,
            6 => 1.0,
            _ => 5.0,
        })
        .collect()
}

/// Eight single-band pages, georeferenced on the first page (EPSG:4326).
fn write_scene(path: &Path, bands: usize) {
    let file = File::create(path).unwrap();
    let mut encoder = TiffEncoder::new(file).unwrap();
    {
        let mut image = encoder
            .new_image::<colortype::Gray32Float>(WIDTH, HEIGHT)
            .unwrap();
        image
            .encoder()
            .write_tag(Tag::Unknown(33550), &[0.5f64, 0.25, 0.0][..])
            .unwrap();
        image
            .encoder()
            .write_tag(
                Tag::Unknown(33922),
                &[0.0f64, 0.0, 0.0, 30.0, -10.0, 0.0][..],
            )
            .unwrap();
        image
            .encoder()
            .write_tag(Tag::Unknown(34735), &[1u16, 1, 0, 1, 2048, 0, 1, 4326][..])
            .unwrap();
        image.write_data(&band_values(0)).unwrap();
    }
    for band in 1..bands {
        encoder
            .write_image::<colortype::Gray32Float>(WIDTH, HEIGHT, &band_values(band))
            .unwrap();
    }
}

fn read_gray8(path: &Path) -> Vec<u8> {
    let mut decoder = Decoder::new(BufReader::new(File::open(path).unwrap())).unwrap();
    assert_eq!(decoder.dimensions().unwrap(), (WIDTH, HEIGHT));
    match decoder.read_image().unwrap() {
        DecodingResult::U8(buf) => buf,
        other => panic!("expected 8-bit mask, got {:?}", std::mem::discriminant(&other)),
    }
}

#[test]
fn iron_preset_on_eight_band_scene() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("scene.tif");
    write_scene(&input, 8);

    let output = dir.path().join("out").join("scene_mask.tif");
    let params = AnalysisParams::default();
    let report = analyze_file_to_path(&input, &output, &params).unwrap();

    assert!(report.band_warning.is_none());
    assert_eq!(report.stats.count, 11);
    assert_relative_eq!(report.stats.min, 1.0);
    assert_relative_eq!(report.stats.max, 4.0);
    assert_relative_eq!(report.stats.mean, 29.0 / 11.0, epsilon = 1e-9);
    assert_eq!(report.flagged, 9);

    let mask = read_gray8(&report.mask);
    assert_eq!(&mask[..4], &[0, 255, 255, 255]);
    assert_eq!(&mask[4..8], &[0, 255, 255, 255]);

    assert!(report.ratio.ends_with("scene_mask_ratio.tif"));
    let mut decoder = Decoder::new(BufReader::new(File::open(&report.ratio).unwrap())).unwrap();
    match decoder.read_image().unwrap() {
        DecodingResult::F32(buf) => {
            assert_eq!(buf[0], 0.0);
            assert_eq!(buf[3], 4.0);
        }
        _ => panic!("ratio raster should be 32-bit float"),
    }
    // georeferencing is carried through to the ratio raster
    let scale = decoder.get_tag_f64_vec(Tag::Unknown(33550)).unwrap();
    assert_eq!(&scale[..2], &[0.5, 0.25]);

    let sidecar: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report.sidecar).unwrap()).unwrap();
    assert_eq!(sidecar["mineral"], "iron");
    assert_eq!(sidecar["bands"]["used"]["numerator"], 7);
    assert_eq!(sidecar["flagged_pixels"], 9);
    assert_eq!(sidecar["crs"], "EPSG:4326");
    assert_eq!(sidecar["overlay"]["bounds"]["west"], 30.0);
    assert_eq!(sidecar["overlay"]["bounds"]["east"], 32.0);
    assert_eq!(sidecar["overlay"]["bounds"]["north"], -10.0);
    assert_eq!(sidecar["overlay"]["bounds"]["south"], -10.75);
    assert_eq!(sidecar["histogram"]["counts"].as_array().unwrap().len(), 50);
}

#[test]
fn epsilon_policy_keeps_large_ratio() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("scene.tif");
    write_scene(&input, 8);

    let params = AnalysisParams {
        zero_policy: ZeroPolicy::Epsilon { epsilon: 1e-10 },
        ..AnalysisParams::default()
    };
    let analyzed = analyze_file(&input, &params).unwrap();
    let ratio = &analyzed.analysis.ratio.values;
    assert_relative_eq!(ratio[[0, 0]], 1e10, max_relative = 1e-9);
    assert_eq!(analyzed.analysis.flagged, 10);
    assert_eq!(analyzed.projection.as_deref(), Some("EPSG:4326"));
}

#[test]
fn small_scene_falls_back_to_first_two_bands() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("small.tif");
    write_scene(&input, 3);

    let params = AnalysisParams {
        mineral: MineralTarget::IronSwir,
        ..AnalysisParams::default()
    };
    let analyzed = analyze_file(&input, &params).unwrap();
    let selection = &analyzed.analysis.selection;
    assert_eq!(selection.requested, BandPair::new(30, 45));
    assert_eq!(selection.used, BandPair::new(0, 1));
    assert!(selection.warning.is_some());
    // bands 0 and 1 are both constant 5.0
    assert_eq!(analyzed.analysis.stats.min, 1.0);
    assert_eq!(analyzed.analysis.flagged, 0);
}

#[test]
fn single_band_scene_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("one.tif");
    write_scene(&input, 1);

    let err = analyze_file(&input, &AnalysisParams::default()).unwrap_err();
    assert!(matches!(err, Error::InsufficientBands { bands: 1 }));
}

#[test]
fn jpeg_output_writes_world_and_prj_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("scene.tif");
    write_scene(&input, 8);

    let output = dir.path().join("scene_mask.jpg");
    let params = AnalysisParams {
        format: OutputFormat::JPEG,
        ..AnalysisParams::default()
    };
    let report = analyze_file_to_path(&input, &output, &params).unwrap();
    assert!(output.exists());
    assert!(dir.path().join("scene_mask.jgw").exists());
    assert!(dir.path().join("scene_mask.prj").exists());
    assert_eq!(report.auxiliary.len(), 2);
    assert!(report.sidecar.exists());
}

#[test]
fn batch_counts_processed_skipped_and_failed() {
    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("in");
    let output_dir = dir.path().join("out");
    std::fs::create_dir_all(&input_dir).unwrap();

    write_scene(&input_dir.join("a.tif"), 8);
    std::fs::write(input_dir.join("notes.txt"), "not a raster").unwrap();
    std::fs::write(input_dir.join("broken.tif"), b"definitely not a tiff").unwrap();

    let params = AnalysisParams::default();
    let report = analyze_directory_to_path(&input_dir, &output_dir, &params, true).unwrap();
    assert_eq!(report.processed, 1);
    assert_eq!(report.errors, 1);
    assert_eq!(report.skipped, 1);
    assert!(output_dir.join("a_mask.tif").exists());
    assert!(output_dir.join("a_mask_ratio.tif").exists());

    // without continue-on-error the broken input aborts the batch
    let strict = analyze_directory_to_path(&input_dir, &dir.path().join("strict"), &params, false);
    assert!(strict.is_err());
}

#[test]
fn batch_ignores_subdirectories_including_nested_output() {
    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("in");
    std::fs::create_dir_all(input_dir.join("archive")).unwrap();
    write_scene(&input_dir.join("a.tif"), 8);
    std::fs::write(input_dir.join("readme.md"), "scenes").unwrap();

    let output_dir = input_dir.join("out");
    let params = AnalysisParams::default();
    let report = analyze_directory_to_path(&input_dir, &output_dir, &params, true).unwrap();
    assert_eq!(report.processed, 1);
    assert_eq!(report.errors, 0);
    assert_eq!(report.skipped, 1);

    // a second run sees the populated output directory and still skips only the file
    let again = analyze_directory_to_path(&input_dir, &output_dir, &params, true).unwrap();
    assert_eq!((again.processed, again.skipped, again.errors), (1, 1, 0));
}
