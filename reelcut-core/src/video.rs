//! The mutable video descriptor and the ffmpeg command line built from it.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::probe;
use crate::tools::Tools;

/// Frame rate a freshly loaded video renders at unless overridden.
pub const DEFAULT_FPS: u32 = 30;

/// Ordered, append-only list of filter-graph fragments.
///
/// Each resize or crop contributes one fragment; fragments are applied by
/// ffmpeg in the order they were appended and there is no removal or
/// replacement.
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    fragments: Vec<String>,
}

impl FilterChain {
    fn push(&mut self, fragment: String) {
        self.fragments.push(fragment);
    }

    /// Fragments in the order they were appended.
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Comma-joined filter expression, ending with the fixed suffix that
    /// pins the sample aspect ratio and the output frame rate.
    fn render(&self, fps: u32) -> String {
        let mut expr = String::new();
        for fragment in &self.fragments {
            expr.push_str(fragment);
            expr.push(',');
        }
        expr.push_str(&format!("setsar=1,fps=fps={fps}"));
        expr
    }
}

/// A video file and the operations queued against it.
///
/// [`Video::load`] probes the source and records its dimensions and
/// duration. The setters describe the desired output: a trim window, a
/// frame rate, and a chain of resize/crop filters. [`Video::render`] then
/// runs ffmpeg, or [`Video::command_line`] returns the exact invocation
/// without executing it.
///
/// Trim times are always relative to the original, un-trimmed source. None
/// of the setters validate their input: a trim window outside the probed
/// duration, an end before the start, or zero-sized crops are passed to
/// ffmpeg as-is.
#[derive(Debug, Clone)]
pub struct Video {
    tools: Tools,
    filepath: PathBuf,
    width: u32,
    height: u32,
    fps: u32,
    start: Duration,
    end: Duration,
    duration: Duration,
    filters: FilterChain,
}

impl Video {
    /// Probe `path` and build a descriptor for it.
    ///
    /// The media data itself is not read; ffprobe is spawned once to report
    /// dimensions and duration. The trim window starts as the whole file
    /// and the frame rate defaults to [`DEFAULT_FPS`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(&Tools::discover()?, path)
    }

    /// Like [`Video::load`], with an already-resolved toolchain.
    pub fn load_with(tools: &Tools, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }

        let data = probe::probe(tools, path)?;
        log::debug!(
            "probed {}: {}x{}, {:.3}s",
            path.display(),
            data.width,
            data.height,
            data.duration.as_secs_f64()
        );

        Ok(Self {
            tools: tools.clone(),
            filepath: path.to_path_buf(),
            width: data.width,
            height: data.height,
            fps: DEFAULT_FPS,
            start: Duration::ZERO,
            end: data.duration,
            duration: data.duration,
            filters: FilterChain::default(),
        })
    }

    /// Set both ends of the trim window, relative to the original source.
    pub fn trim(&mut self, start: Duration, end: Duration) {
        self.start = start;
        self.end = end;
    }

    /// Set the start of the trim window, relative to the original source.
    pub fn set_start(&mut self, start: Duration) {
        self.start = start;
    }

    /// Set the end of the trim window, relative to the original source.
    pub fn set_end(&mut self, end: Duration) {
        self.end = end;
    }

    /// Set the output frame rate.
    pub fn set_fps(&mut self, fps: u32) {
        self.fps = fps;
    }

    /// Resize the output and append the matching scale filter.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.filters.push(format!("scale={width}:{height}"));
    }

    /// Keep the sub-rectangle of the given size whose top-left corner sits
    /// at (x, y); x grows to the right, y grows down.
    pub fn crop(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.filters.push(format!("crop={width}:{height}:{x}:{y}"));
    }

    /// The ffmpeg invocation [`Video::render`] would run, as an argument
    /// vector starting with the transcoder path.
    ///
    /// Pure: repeated calls on the same descriptor yield identical output
    /// and the descriptor is not mutated.
    pub fn command_line(&self, output: impl AsRef<Path>) -> Vec<String> {
        vec![
            self.tools.ffmpeg().display().to_string(),
            "-y".to_string(),
            "-i".to_string(),
            self.filepath.display().to_string(),
            "-ss".to_string(),
            format_seconds(self.start),
            "-t".to_string(),
            format_seconds(self.end.saturating_sub(self.start)),
            "-vf".to_string(),
            self.filters.render(self.fps),
            "-strict".to_string(),
            "-2".to_string(),
            output.as_ref().display().to_string(),
        ]
    }

    /// Run ffmpeg with the assembled arguments, writing `output`.
    ///
    /// The child's stdout and stderr are forwarded to the caller's own.
    /// Blocks until ffmpeg exits; there is no timeout, so a hung process
    /// blocks indefinitely.
    pub fn render(&self, output: impl AsRef<Path>) -> Result<()> {
        let line = self.command_line(output);
        log::debug!("running {line:?}");

        let status = Command::new(&line[0])
            .args(&line[1..])
            .status()
            .map_err(Error::RenderSpawn)?;

        if !status.success() {
            return Err(Error::RenderFailed(status));
        }
        Ok(())
    }

    /// Path of the input video.
    pub fn filepath(&self) -> &Path {
        &self.filepath
    }

    /// Output width in pixels, as probed or last set by a resize/crop.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Output height in pixels, as probed or last set by a resize/crop.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Output frame rate.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Start of the trim window.
    pub fn start(&self) -> Duration {
        self.start
    }

    /// End of the trim window.
    pub fn end(&self) -> Duration {
        self.end
    }

    /// Duration of the original source, as probed.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Filters appended so far.
    pub fn filters(&self) -> &FilterChain {
        &self.filters
    }
}

/// Seconds as the shortest string that round-trips the value: `10`, `1.5`.
fn format_seconds(d: Duration) -> String {
    format!("{}", d.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> Video {
        Video {
            tools: Tools::with_paths("ffmpeg", "ffprobe"),
            filepath: PathBuf::from("in.mp4"),
            width: 1280,
            height: 720,
            fps: DEFAULT_FPS,
            start: Duration::ZERO,
            end: Duration::from_secs(52),
            duration: Duration::from_secs(52),
            filters: FilterChain::default(),
        }
    }

    #[test]
    fn fresh_descriptor_spans_whole_file_at_default_fps() {
        let v = descriptor();
        assert_eq!(v.fps(), 30);
        assert_eq!(v.start(), Duration::ZERO);
        assert_eq!(v.end(), v.duration());
        assert!(v.filters().fragments().is_empty());
    }

    #[test]
    fn scale_then_crop_accumulates_in_order() {
        let mut v = descriptor();
        v.set_size(400, 300);
        v.crop(0, 0, 200, 200);
        assert_eq!(
            v.filters().fragments(),
            ["scale=400:300", "crop=200:200:0:0"]
        );
        assert_eq!((v.width(), v.height()), (200, 200));
    }

    #[test]
    fn trim_overwrites_window_unchecked() {
        let mut v = descriptor();
        v.trim(Duration::from_secs(10), Duration::from_secs(20));
        assert_eq!(v.start(), Duration::from_secs(10));
        assert_eq!(v.end(), Duration::from_secs(20));

        // ends past the probed duration are taken at face value
        v.set_end(Duration::from_secs(90));
        assert_eq!(v.end(), Duration::from_secs(90));
    }

    #[test]
    fn command_line_shape() {
        let mut v = descriptor();
        v.trim(Duration::from_secs(10), Duration::from_secs(20));
        v.set_size(400, 300);
        v.set_fps(48);
        assert_eq!(
            v.command_line("out.mov"),
            [
                "ffmpeg",
                "-y",
                "-i",
                "in.mp4",
                "-ss",
                "10",
                "-t",
                "10",
                "-vf",
                "scale=400:300,setsar=1,fps=fps=48",
                "-strict",
                "-2",
                "out.mov",
            ]
        );
    }

    #[test]
    fn command_line_is_pure() {
        let mut v = descriptor();
        v.crop(0, 0, 200, 200);
        let first = v.command_line("out.mp4");
        let second = v.command_line("out.mp4");
        assert_eq!(first, second);
        assert_eq!(v.filters().fragments().len(), 1);
        assert_eq!((v.width(), v.height()), (200, 200));
    }

    #[test]
    fn empty_chain_still_pins_sar_and_fps() {
        let v = descriptor();
        let line = v.command_line("out.mp4");
        assert_eq!(line[9], "setsar=1,fps=fps=30");
    }

    #[test]
    fn fractional_seconds_keep_precision() {
        let mut v = descriptor();
        v.trim(Duration::from_millis(1500), Duration::from_millis(4750));
        let line = v.command_line("out.mp4");
        assert_eq!(line[5], "1.5");
        assert_eq!(line[7], "3.25");
    }

    #[test]
    fn inverted_window_yields_zero_length() {
        let mut v = descriptor();
        v.trim(Duration::from_secs(20), Duration::from_secs(10));
        let line = v.command_line("out.mp4");
        assert_eq!(line[7], "0");
    }

    #[test]
    fn load_with_missing_file_fails_before_spawning() {
        let tools = Tools::with_paths("/nonexistent/ffmpeg", "/nonexistent/ffprobe");
        let err = Video::load_with(&tools, "definitely-missing.mp4").unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }
}
