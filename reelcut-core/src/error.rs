use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while loading or rendering a video.
#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "{tool} was not found in PATH; install ffmpeg (https://ffmpeg.org/) \
         and make sure ffmpeg and ffprobe are available"
    )]
    ToolNotFound { tool: &'static str },

    #[error("unable to load {0}: file not found")]
    FileNotFound(PathBuf),

    #[error("ffprobe could not be started for {path}: {source}")]
    ProbeSpawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ffprobe failed on {path} ({status})")]
    ProbeFailed { path: PathBuf, status: ExitStatus },

    #[error("unable to parse ffprobe output: {0}")]
    ProbeParse(#[from] serde_json::Error),

    #[error("ffprobe reported an invalid duration {value:?}")]
    InvalidDuration { value: String },

    #[error("no stream data in {0}; make sure the file contains a valid video")]
    NoStreamData(PathBuf),

    #[error("ffmpeg could not be started: {0}")]
    RenderSpawn(#[source] std::io::Error),

    #[error("ffmpeg failed ({0})")]
    RenderFailed(ExitStatus),
}
