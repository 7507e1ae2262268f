//! FFmpeg-backed media source integration tests.
//!
//! Decoding tests require a fixture at `tests/fixtures/sample_video.mp4`
//! (any short clip with a video stream) and are skipped when it is absent.

use std::fs;
use std::path::Path;

use vhash::{FrameSource, HashOptions, MediaSource, RasterGeometry, VhashError, hash_video};

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

#[test]
fn open_nonexistent_file_fails() {
    let result = MediaSource::open("this_does_not_exist.mp4", RasterGeometry::default());
    assert!(matches!(result, Err(VhashError::FileOpen { .. })));
}

#[test]
fn open_rejects_unhashable_geometry() {
    // Geometry is validated before any file access.
    let result = MediaSource::open(
        "this_does_not_exist.mp4",
        RasterGeometry {
            width: 3,
            height: 3,
        },
    );
    assert!(matches!(result, Err(VhashError::InvalidGeometry { .. })));
}

#[test]
fn open_reports_duration_and_geometry() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let source = MediaSource::open(path, RasterGeometry::default()).expect("Failed to open");
    assert!(!source.duration().is_zero(), "Fixture should have a duration");
    assert_eq!(source.geometry(), RasterGeometry { width: 8, height: 8 });
}

#[test]
fn decoded_rasters_have_the_configured_geometry() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let geometry = RasterGeometry {
        width: 16,
        height: 16,
    };
    let mut source = MediaSource::open(path, geometry).expect("Failed to open");
    let raster = source
        .next_raster()
        .expect("Decode error")
        .expect("Fixture should produce at least one frame");
    assert_eq!(raster.geometry(), geometry);
    assert_eq!(raster.pixels().len(), 256);
}

#[test]
fn hash_real_video_lines_are_well_formed() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output_path = directory.path().join("hashes.txt");

    let summary =
        hash_video(path, &output_path, &HashOptions::new()).expect("Hashing should succeed");
    assert!(summary.samples > 0, "Fixture should yield at least one hash");

    let contents = fs::read_to_string(&output_path).expect("Failed to read output");
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len() as u64, summary.samples);
    for line in lines {
        assert_eq!(line.len(), 16);
        assert!(
            line.chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
        );
    }
}

#[test]
fn hashing_is_reproducible_across_runs() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let first_path = directory.path().join("first.txt");
    let second_path = directory.path().join("second.txt");

    hash_video(path, &first_path, &HashOptions::new()).expect("First run failed");
    hash_video(path, &second_path, &HashOptions::new()).expect("Second run failed");

    let first = fs::read_to_string(&first_path).unwrap();
    let second = fs::read_to_string(&second_path).unwrap();
    assert_eq!(first, second);
}
