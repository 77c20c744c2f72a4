//! Reelcut Core - trim, resize and crop videos through the FFmpeg CLI
//!
//! This library builds and runs video-transcoding command lines by wrapping
//! the FFmpeg command-line tools: `ffprobe` reports a file's dimensions and
//! duration, a [`Video`] descriptor accumulates the requested operations,
//! and `ffmpeg` does the actual media work. It supports:
//! - Trimming to a start/end window with sub-second precision
//! - Resizing and cropping through an ordered filter chain
//! - Frame-rate selection
//! - Inspecting the exact command line without running it

pub mod error;
pub mod probe;
pub mod tools;
pub mod video;

// Re-export commonly used types at the crate root
pub use error::{Error, Result};
pub use probe::ProbeData;
pub use tools::Tools;
pub use video::{DEFAULT_FPS, FilterChain, Video};
