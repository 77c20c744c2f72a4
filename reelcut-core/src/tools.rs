use std::path::{Path, PathBuf};
use std::process::Command;

use regex::Regex;

use crate::error::{Error, Result};

/// Resolved locations of the external executables the library shells out to.
///
/// Resolution happens once, up front, so a missing installation surfaces as
/// [`Error::ToolNotFound`] before any media file is touched. Tests and
/// callers with unusual installations inject fixed paths through
/// [`Tools::with_paths`] instead of going through `PATH`.
#[derive(Debug, Clone)]
pub struct Tools {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl Tools {
    /// Locate `ffmpeg` and `ffprobe` on `PATH`.
    pub fn discover() -> Result<Self> {
        Ok(Self {
            ffmpeg: resolve("ffmpeg")?,
            ffprobe: resolve("ffprobe")?,
        })
    }

    /// Build a toolchain from explicit executable paths, skipping `PATH`
    /// lookup. The paths are not checked for existence.
    pub fn with_paths(ffmpeg: impl AsRef<Path>, ffprobe: impl AsRef<Path>) -> Self {
        Self {
            ffmpeg: ffmpeg.as_ref().to_path_buf(),
            ffprobe: ffprobe.as_ref().to_path_buf(),
        }
    }

    /// Path to the transcoder executable.
    pub fn ffmpeg(&self) -> &Path {
        &self.ffmpeg
    }

    /// Path to the prober executable.
    pub fn ffprobe(&self) -> &Path {
        &self.ffprobe
    }

    /// Run `ffmpeg -version` and return the version token.
    pub fn ffmpeg_version(&self) -> Result<String> {
        let output = Command::new(&self.ffmpeg)
            .arg("-version")
            .output()
            .map_err(|_| Error::ToolNotFound { tool: "ffmpeg" })?;

        Ok(extract_version(&String::from_utf8_lossy(&output.stdout)))
    }
}

fn resolve(tool: &'static str) -> Result<PathBuf> {
    which::which(tool).map_err(|_| Error::ToolNotFound { tool })
}

fn extract_version(banner: &str) -> String {
    let version_regex = Regex::new(r"ffmpeg version (\S+)").unwrap();
    match version_regex.captures(banner) {
        Some(caps) => caps[1].to_string(),
        None => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_paths_skips_lookup() {
        let tools = Tools::with_paths("/opt/ffmpeg/bin/ffmpeg", "/opt/ffmpeg/bin/ffprobe");
        assert_eq!(tools.ffmpeg(), Path::new("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(tools.ffprobe(), Path::new("/opt/ffmpeg/bin/ffprobe"));
    }

    #[test]
    fn version_token_is_extracted_from_banner() {
        let banner = "ffmpeg version 6.1.1 Copyright (c) 2000-2023 the FFmpeg developers";
        assert_eq!(extract_version(banner), "6.1.1");
    }

    #[test]
    fn unrecognized_banner_falls_back_to_unknown() {
        assert_eq!(extract_version("not an ffmpeg banner"), "unknown");
    }
}
