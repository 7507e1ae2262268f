//! End-to-end pipeline tests with scripted sources and real file sinks.

use std::fs;
use std::time::Duration;

use vhash::{
    FileSink, FrameSource, HashOptions, HashSink, Raster, RasterGeometry, VhashError, pipeline,
};

/// Scripted frame source serving pre-built rasters in order.
struct ScriptedSource {
    duration: Duration,
    rasters: Vec<Raster>,
    served: usize,
}

impl ScriptedSource {
    fn new(duration: Duration, rasters: Vec<Raster>) -> Self {
        Self {
            duration,
            rasters,
            served: 0,
        }
    }

    fn uniform(duration: Duration, frames: usize, value: u8) -> Self {
        let raster = Raster::from_pixels(RasterGeometry::default(), vec![value; 64]).unwrap();
        Self::new(duration, vec![raster; frames])
    }
}

impl FrameSource for ScriptedSource {
    fn duration(&self) -> Duration {
        self.duration
    }

    fn seek(&mut self, _target: Duration) -> Result<(), VhashError> {
        Ok(())
    }

    fn next_raster(&mut self) -> Result<Option<&Raster>, VhashError> {
        if self.served >= self.rasters.len() {
            return Ok(None);
        }
        let index = self.served;
        self.served += 1;
        Ok(Some(&self.rasters[index]))
    }
}

/// In-memory sink recording lines and whether it was finished.
#[derive(Default)]
struct MemorySink {
    lines: Vec<String>,
    finished: bool,
}

impl HashSink for MemorySink {
    fn write_line(&mut self, line: &str) -> Result<(), VhashError> {
        self.lines.push(line.to_string());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), VhashError> {
        self.finished = true;
        Ok(())
    }
}

// ── happy path ─────────────────────────────────────────────────────

#[test]
fn run_writes_one_line_per_sample() {
    let mut source = ScriptedSource::uniform(Duration::from_secs(6), 10, 100);
    let mut sink = MemorySink::default();
    let options = HashOptions::new();

    let summary = pipeline::run(&mut source, &mut sink, &options).unwrap();

    assert_eq!(summary.samples, 3);
    assert_eq!(summary.media_duration, Duration::from_secs(6));
    assert_eq!(sink.lines.len(), 3);
    assert!(sink.finished, "Sink should be flushed on success");
    for line in &sink.lines {
        assert_eq!(line, "0000000000000000");
    }
}

#[test]
fn file_sink_end_to_end() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output_path = directory.path().join("hashes.txt");

    let row = [0_u8, 0, 0, 0, 255, 255, 255, 255];
    let pixels: Vec<u8> = row.iter().copied().cycle().take(64).collect();
    let raster = Raster::from_pixels(RasterGeometry::default(), pixels).unwrap();
    let mut source = ScriptedSource::new(Duration::from_secs(4), vec![raster.clone(), raster]);

    let mut sink = FileSink::create(&output_path).expect("Failed to create sink");
    let summary = pipeline::run(&mut source, &mut sink, &HashOptions::new()).unwrap();
    assert_eq!(summary.samples, 2);

    let contents = fs::read_to_string(&output_path).expect("Failed to read output");
    assert_eq!(contents, "0f0f0f0f0f0f0f0f\n0f0f0f0f0f0f0f0f\n");
}

#[test]
fn every_line_is_lowercase_hex_of_fixed_length() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output_path = directory.path().join("hashes.txt");

    let rasters: Vec<Raster> = (0..4)
        .map(|seed: usize| {
            let pixels: Vec<u8> = (0..64).map(|i| ((i * 13 + seed * 71) % 256) as u8).collect();
            Raster::from_pixels(RasterGeometry::default(), pixels).unwrap()
        })
        .collect();
    let mut source = ScriptedSource::new(Duration::from_secs(8), rasters);

    let mut sink = FileSink::create(&output_path).expect("Failed to create sink");
    pipeline::run(&mut source, &mut sink, &HashOptions::new()).unwrap();

    let contents = fs::read_to_string(&output_path).expect("Failed to read output");
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 4);
    for line in lines {
        assert_eq!(line.len(), 16);
        assert!(
            line.chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
        );
    }
}

// ── empty stream ───────────────────────────────────────────────────

#[test]
fn zero_duration_media_succeeds_with_empty_output() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output_path = directory.path().join("hashes.txt");

    let mut source = ScriptedSource::uniform(Duration::ZERO, 10, 100);
    let mut sink = FileSink::create(&output_path).expect("Failed to create sink");

    let summary = pipeline::run(&mut source, &mut sink, &HashOptions::new()).unwrap();
    assert_eq!(summary.samples, 0);

    let metadata = fs::metadata(&output_path).expect("Output file should exist");
    assert_eq!(metadata.len(), 0, "Output should be a zero-length file");
}

// ── fatal conditions ───────────────────────────────────────────────

#[test]
fn geometry_drift_keeps_pre_drift_lines() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output_path = directory.path().join("hashes.txt");

    let good = Raster::from_pixels(RasterGeometry::default(), vec![100_u8; 64]).unwrap();
    let drifted = Raster::from_pixels(
        RasterGeometry {
            width: 16,
            height: 16,
        },
        vec![100_u8; 256],
    )
    .unwrap();
    let mut source = ScriptedSource::new(Duration::from_secs(10), vec![good, drifted]);

    let mut sink = FileSink::create(&output_path).expect("Failed to create sink");
    let result = pipeline::run(&mut source, &mut sink, &HashOptions::new());
    assert!(matches!(result, Err(VhashError::GeometryChanged { .. })));

    // The sink is flushed on the error path: the one pre-drift line survives.
    let contents = fs::read_to_string(&output_path).expect("Failed to read output");
    assert_eq!(contents, "0000000000000000\n");
}

#[test]
fn invalid_options_are_rejected_before_any_output() {
    let mut source = ScriptedSource::uniform(Duration::from_secs(10), 10, 100);
    let mut sink = MemorySink::default();
    let options = HashOptions::new().with_step(Duration::ZERO);

    let result = pipeline::run(&mut source, &mut sink, &options);
    assert!(matches!(result, Err(VhashError::InvalidStep)));
    assert!(sink.lines.is_empty());
}

// ── progress ───────────────────────────────────────────────────────

#[test]
fn progress_fires_once_per_sample_with_totals() {
    use std::sync::{Arc, Mutex};

    use vhash::{ProgressCallback, ProgressInfo};

    #[derive(Default)]
    struct Recorder {
        snapshots: Mutex<Vec<(u64, Option<u64>)>>,
    }

    impl ProgressCallback for Recorder {
        fn on_progress(&self, info: &ProgressInfo) {
            self.snapshots
                .lock()
                .unwrap()
                .push((info.current, info.total));
        }
    }

    let recorder = Arc::new(Recorder::default());
    let mut source = ScriptedSource::uniform(Duration::from_secs(6), 10, 100);
    let mut sink = MemorySink::default();
    let options = HashOptions::new().with_progress(recorder.clone());

    pipeline::run(&mut source, &mut sink, &options).unwrap();

    let snapshots = recorder.snapshots.lock().unwrap();
    assert_eq!(snapshots.as_slice(), &[(1, Some(3)), (2, Some(3)), (3, Some(3))]);
}
