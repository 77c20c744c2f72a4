use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reelcut_core::{Tools, Video};

#[derive(Parser, Debug)]
#[command(name = "reelcut")]
#[command(about = "Trim, resize and crop videos by driving the FFmpeg command line")]
#[command(version)]
struct Args {
    /// Input video file path
    #[arg(short, long)]
    input: PathBuf,

    /// Output video file path (the extension picks the container)
    #[arg(short, long, required_unless_present = "print_command")]
    output: Option<PathBuf>,

    /// Keep the input from this time on, in seconds (e.g. 12.5)
    #[arg(short, long)]
    start: Option<f64>,

    /// Keep the input up to this time, in seconds
    #[arg(short, long)]
    end: Option<f64>,

    /// Output frame rate
    #[arg(long)]
    fps: Option<u32>,

    /// Resize the output (e.g. "1280x720")
    #[arg(long)]
    size: Option<String>,

    /// Crop to a sub-rectangle as "W:H:X:Y", with (x, y) the top-left corner
    #[arg(long)]
    crop: Option<String>,

    /// Split the input into consecutive clips of this many seconds,
    /// numbered after the output path
    #[arg(long, value_name = "SECS", conflicts_with_all = ["start", "end", "print_command"])]
    segment_length: Option<f64>,

    /// Discard this many seconds of footage between consecutive clips
    /// in split mode
    #[arg(long, value_name = "SECS", requires = "segment_length")]
    gap: Option<f64>,

    /// Print the ffmpeg command line instead of executing it
    #[arg(long)]
    print_command: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    // Resolve the FFmpeg toolchain
    let tools = match Tools::discover() {
        Ok(tools) => tools,
        Err(e) => {
            eprintln!("Error: FFmpeg not found!");
            eprintln!("Please install FFmpeg to use this tool.");
            eprintln!();
            eprintln!("Installation instructions:");
            eprintln!("  Ubuntu/Debian: sudo apt install ffmpeg");
            eprintln!("  macOS:         brew install ffmpeg");
            eprintln!("  Windows:       Download from https://ffmpeg.org/download.html");
            eprintln!();
            eprintln!("Details: {}", e);
            std::process::exit(1);
        }
    };

    if let Ok(version) = tools.ffmpeg_version() {
        log::info!("FFmpeg version {} detected", version);
    }

    log::info!("Input: {:?}", args.input);
    log::info!("Output: {:?}", args.output);

    // Create output directory if it doesn't exist
    if let Some(output) = &args.output
        && let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).context("Failed to create output directory")?;
    }

    let mut video = Video::load_with(&tools, &args.input)
        .with_context(|| format!("Failed to load {:?}", args.input))?;

    if let Some(start) = args.start {
        video.set_start(to_duration(start)?);
    }
    if let Some(end) = args.end {
        video.set_end(to_duration(end)?);
    }
    if let Some(fps) = args.fps {
        video.set_fps(fps);
    }
    if let Some(size) = &args.size {
        let (width, height) = parse_size(size)?;
        video.set_size(width, height);
    }
    if let Some(crop) = &args.crop {
        let (width, height, x, y) = parse_crop(crop)?;
        video.crop(x, y, width, height);
    }

    if args.print_command {
        let output = args
            .output
            .unwrap_or_else(|| PathBuf::from("output.mp4"));
        println!("{}", video.command_line(output).join(" "));
        return Ok(());
    }

    // The output path must exist if we get here
    let output = args
        .output
        .ok_or_else(|| anyhow::anyhow!("Output file required"))?;

    if let Some(clip_length) = args.segment_length {
        let gap = args.gap.map(to_duration).transpose()?.unwrap_or_default();
        let count = split_into_clips(&video, &output, to_duration(clip_length)?, gap)?;
        println!("\n✅ Wrote {} clips next to {:?}", count, output);
        return Ok(());
    }

    video
        .render(&output)
        .with_context(|| format!("Failed to render {:?}", output))?;

    println!("\n✅ Video processing completed successfully!");
    println!("📁 Output saved to: {:?}", output);

    Ok(())
}

/// Cut the source into clips of `clip_length`, rendering each clip on its
/// own thread, and return how many clips were written.
///
/// Consecutive clips start `clip_length + gap` apart, so a non-zero gap
/// discards that much footage between kept clips. The descriptor is cloned
/// per clip, so the workers are fully independent; the library itself never
/// shares state across renders.
fn split_into_clips(
    video: &Video,
    output: &Path,
    clip_length: Duration,
    gap: Duration,
) -> Result<usize> {
    anyhow::ensure!(
        !clip_length.is_zero(),
        "segment length must be greater than zero"
    );

    let mut workers = Vec::new();

    for (index, (start, end)) in clip_windows(video.duration(), clip_length, gap)
        .into_iter()
        .enumerate()
    {
        let clip_path = clip_name(output, index + 1);

        let mut clip = video.clone();
        clip.trim(start, end);

        log::info!("Trimming clip: {:?}", clip_path);
        let worker_path = clip_path.clone();
        workers.push((
            std::thread::spawn(move || clip.render(worker_path)),
            clip_path,
        ));
    }

    let count = workers.len();
    for (worker, clip_path) in workers {
        match worker.join() {
            Ok(result) => {
                result.with_context(|| format!("Failed to render {:?}", clip_path))?;
            }
            Err(_) => anyhow::bail!("Render worker for {:?} panicked", clip_path),
        }
    }

    log::info!("Trimming complete");
    Ok(count)
}

/// Trim windows for split mode: clips of `clip_length`, each starting
/// `clip_length + gap` after the previous one, clamped to the total
/// duration.
fn clip_windows(
    total: Duration,
    clip_length: Duration,
    gap: Duration,
) -> Vec<(Duration, Duration)> {
    let mut windows = Vec::new();
    let mut at = Duration::ZERO;
    while at < total {
        windows.push((at, total.min(at + clip_length)));
        at += clip_length + gap;
    }
    windows
}

/// Name for the n-th clip: `out.mp4` becomes `out-3.mp4`.
fn clip_name(output: &Path, index: usize) -> PathBuf {
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("clip");
    match output.extension().and_then(|e| e.to_str()) {
        Some(ext) => output.with_file_name(format!("{stem}-{index}.{ext}")),
        None => output.with_file_name(format!("{stem}-{index}")),
    }
}

fn to_duration(secs: f64) -> Result<Duration> {
    anyhow::ensure!(
        secs.is_finite() && secs >= 0.0,
        "seconds must be non-negative, got {secs}"
    );
    Ok(Duration::from_secs_f64(secs))
}

/// Parse a "WxH" size specification (e.g. "1280x720").
fn parse_size(spec: &str) -> Result<(u32, u32)> {
    let parsed = spec.split_once(['x', 'X']).and_then(|(w, h)| {
        let width = w.parse::<u32>().ok()?;
        let height = h.parse::<u32>().ok()?;
        Some((width, height))
    });
    parsed.ok_or_else(|| anyhow::anyhow!("size must look like 1280x720, got {spec:?}"))
}

/// Parse a "W:H:X:Y" crop specification.
fn parse_crop(spec: &str) -> Result<(u32, u32, u32, u32)> {
    let parts: Vec<u32> = spec.split(':').filter_map(|p| p.parse().ok()).collect();
    if parts.len() != 4 || spec.split(':').count() != 4 {
        anyhow::bail!("crop must look like W:H:X:Y, got {spec:?}");
    }
    Ok((parts[0], parts[1], parts[2], parts[3]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_spec_parses_both_separators() {
        assert_eq!(parse_size("1280x720").unwrap(), (1280, 720));
        assert_eq!(parse_size("640X480").unwrap(), (640, 480));
        assert!(parse_size("1280").is_err());
        assert!(parse_size("widexhigh").is_err());
    }

    #[test]
    fn crop_spec_needs_four_fields() {
        assert_eq!(parse_crop("200:200:0:0").unwrap(), (200, 200, 0, 0));
        assert!(parse_crop("200:200:0").is_err());
        assert!(parse_crop("200:200:0:-1").is_err());
    }

    #[test]
    fn clip_windows_cover_the_file_back_to_back() {
        let windows = clip_windows(Duration::from_secs(10), Duration::from_secs(4), Duration::ZERO);
        assert_eq!(
            windows,
            [
                (Duration::from_secs(0), Duration::from_secs(4)),
                (Duration::from_secs(4), Duration::from_secs(8)),
                (Duration::from_secs(8), Duration::from_secs(10)),
            ]
        );
    }

    #[test]
    fn gap_discards_footage_between_clips() {
        let windows = clip_windows(
            Duration::from_secs(60),
            Duration::from_secs(25),
            Duration::from_secs(10),
        );
        assert_eq!(
            windows,
            [
                (Duration::from_secs(0), Duration::from_secs(25)),
                (Duration::from_secs(35), Duration::from_secs(60)),
            ]
        );
    }

    #[test]
    fn clip_names_count_up_before_the_extension() {
        assert_eq!(
            clip_name(Path::new("clips/out.mp4"), 3),
            Path::new("clips/out-3.mp4")
        );
        assert_eq!(clip_name(Path::new("out"), 1), Path::new("out-1"));
    }

    #[test]
    fn negative_seconds_are_rejected() {
        assert!(to_duration(-1.0).is_err());
        assert_eq!(to_duration(1.5).unwrap(), Duration::from_millis(1500));
    }
}
