//! ffprobe integration: spawn the prober and map its JSON report.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::tools::Tools;

/// Facts about a media file as reported by ffprobe.
#[derive(Debug, Clone)]
pub struct ProbeData {
    pub width: u32,
    pub height: u32,
    pub duration: Duration,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    #[serde(default)]
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Run ffprobe on `path` and decode its stdout.
///
/// Spawns exactly one child process and reads its complete output before
/// returning.
pub fn probe(tools: &Tools, path: &Path) -> Result<ProbeData> {
    let output = Command::new(tools.ffprobe())
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .map_err(|source| Error::ProbeSpawn {
            path: path.to_path_buf(),
            source,
        })?;

    if !output.status.success() {
        return Err(Error::ProbeFailed {
            path: path.to_path_buf(),
            status: output.status,
        });
    }

    parse_probe_output(&String::from_utf8_lossy(&output.stdout), path)
}

/// Map ffprobe's JSON document into [`ProbeData`]. Pure; no process involved.
///
/// Dimensions come from the first stream; streams without them (audio-only
/// files probed by mistake) report 0x0. The duration is the container
/// duration string, parsed with sub-second precision.
fn parse_probe_output(json: &str, path: &Path) -> Result<ProbeData> {
    let decoded: FfprobeOutput = serde_json::from_str(json)?;

    let Some(stream) = decoded.streams.first() else {
        return Err(Error::NoStreamData(path.to_path_buf()));
    };

    let raw = decoded.format.duration.unwrap_or_default();
    let secs = raw.parse::<f64>().ok().filter(|s| s.is_finite() && *s >= 0.0);
    let Some(secs) = secs else {
        return Err(Error::InvalidDuration { value: raw });
    };

    Ok(ProbeData {
        width: stream.width.unwrap_or(0),
        height: stream.height.unwrap_or(0),
        duration: Duration::from_secs_f64(secs),
    })
}
