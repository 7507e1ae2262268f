use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use vhash::{
    FfmpegLogLevel, FileSink, FrameSource, HashOptions, HashSink, MediaSource, ProgressCallback,
    ProgressInfo, RasterGeometry, StdoutSink, estimate_sample_count, pipeline,
};

const CLI_AFTER_HELP: &str = "Examples:\n  vhash input.mp4 hashes.txt\n  vhash input.mp4 - | head\n  vhash input.mp4 hashes.txt --step 0.5 --progress\n  vhash input.mp4 hashes.txt --dump-frames samples --verbose";

#[derive(Debug, Parser)]
#[command(
    name = "vhash",
    version,
    about = "Compute per-frame average-hash fingerprints for a video",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Input media path.
    input: Option<PathBuf>,

    /// Destination for the hash stream ("-" for stdout).
    output: Option<String>,

    /// Seconds of media time between samples.
    #[arg(long, default_value_t = 2.0)]
    step: f64,

    /// Hash raster width in pixels.
    #[arg(long, default_value_t = 8)]
    hash_width: u32,

    /// Hash raster height in pixels.
    #[arg(long, default_value_t = 8)]
    hash_height: u32,

    /// Allow overwriting an existing output file.
    #[arg(long)]
    overwrite: bool,

    /// Show a progress bar.
    #[arg(long)]
    progress: bool,

    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,

    /// Print a machine-readable run summary on completion.
    #[arg(long)]
    json: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long)]
    log_level: Option<String>,

    /// Save each sampled raster as a PNG into this directory.
    #[arg(long)]
    dump_frames: Option<PathBuf>,

    /// Generate shell completion scripts and exit.
    #[arg(long, value_enum)]
    completions: Option<Shell>,
}

fn parse_log_level(value: &str) -> Option<FfmpegLogLevel> {
    match value.to_ascii_lowercase().as_str() {
        "quiet" => Some(FfmpegLogLevel::Quiet),
        "panic" => Some(FfmpegLogLevel::Panic),
        "fatal" => Some(FfmpegLogLevel::Fatal),
        "error" => Some(FfmpegLogLevel::Error),
        "warning" | "warn" => Some(FfmpegLogLevel::Warning),
        "info" => Some(FfmpegLogLevel::Info),
        "verbose" => Some(FfmpegLogLevel::Verbose),
        "debug" => Some(FfmpegLogLevel::Debug),
        "trace" => Some(FfmpegLogLevel::Trace),
        _ => None,
    }
}

fn parse_step(seconds: f64) -> Result<Duration, Box<dyn std::error::Error>> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(format!("--step must be a positive number of seconds, got {seconds}").into());
    }
    Ok(Duration::from_secs_f64(seconds))
}

struct BarProgress {
    bar: ProgressBar,
}

impl ProgressCallback for BarProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.bar.set_position(info.current);
    }
}

struct SampleLogProgress;

impl ProgressCallback for SampleLogProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Some(timestamp) = info.timestamp {
            eprintln!("sample {} at {:.2}s", info.current, timestamp.as_secs_f64());
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(
        if cli.verbose { "debug" } else { "warn" },
    ))
    .init();

    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "vhash", &mut std::io::stdout());
        return Ok(());
    }

    // Required positionals are handled by hand so that missing arguments
    // exit with status 1 rather than clap's usage-error status.
    let (input, output) = match (&cli.input, &cli.output) {
        (Some(input), Some(output)) => (input.clone(), output.clone()),
        _ => {
            eprintln!("{}", Cli::command().render_usage());
            return Err("missing required arguments <INPUT> <OUTPUT>".into());
        }
    };

    if let Some(level) = &cli.log_level {
        let parsed = parse_log_level(level).ok_or(format!("unsupported --log-level: {level}"))?;
        vhash::set_ffmpeg_log_level(parsed);
    }

    let step = parse_step(cli.step)?;
    let geometry = RasterGeometry {
        width: cli.hash_width,
        height: cli.hash_height,
    };

    let mut options = HashOptions::new().with_step(step).with_geometry(geometry);

    if let Some(directory) = &cli.dump_frames {
        options = options.with_frame_dump(directory);
    }

    let mut source = MediaSource::open(&input, geometry)?;

    let estimated = estimate_sample_count(source.duration(), step);

    let progress_bar = if cli.progress {
        let bar = ProgressBar::new(estimated);
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        options = options.with_progress(Arc::new(BarProgress { bar: bar.clone() }));
        Some(bar)
    } else {
        if cli.verbose {
            options = options.with_progress(Arc::new(SampleLogProgress));
        }
        None
    };

    let to_stdout = output == "-";
    let mut sink: Box<dyn HashSink> = if to_stdout {
        Box::new(StdoutSink::new())
    } else {
        let path = PathBuf::from(&output);
        if path.exists() && !cli.overwrite {
            return Err(format!(
                "output already exists: {} (use --overwrite to replace)",
                path.display()
            )
            .into());
        }
        Box::new(FileSink::create(&path)?)
    };

    let summary = pipeline::run(&mut source, &mut sink, &options)?;

    if let Some(bar) = progress_bar {
        bar.finish_with_message("done");
    }

    if cli.json {
        let payload = json!({
            "input": input.display().to_string(),
            "output": output,
            "samples": summary.samples,
            "step_seconds": step.as_secs_f64(),
            "hash_width": geometry.width,
            "hash_height": geometry.height,
            "media_duration_seconds": summary.media_duration.as_secs_f64(),
        });
        let rendered = serde_json::to_string_pretty(&payload)?;
        if to_stdout {
            eprintln!("{rendered}");
        } else {
            println!("{rendered}");
        }
    } else {
        let message = format!(
            "Wrote {} hash line(s) to {}",
            summary.samples,
            if to_stdout { "stdout" } else { output.as_str() }
        );
        if to_stdout {
            eprintln!("{} {}", "success:".green().bold(), message.green());
        } else {
            println!("{} {}", "success:".green().bold(), message.green());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
