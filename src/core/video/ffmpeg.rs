//! ffprobe / ffmpeg backed video collaborators.

use crate::core::error::{PipelineError, Result};
use log::{debug, error};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

/// Discovers structural metadata of a video.
pub trait VideoProbe: Send + Sync {
    /// Stream duration in seconds.
    fn duration(&self, video: &Path) -> Result<f64>;
}

/// Writes sampled frames of a video to disk.
pub trait FrameDecoder: Send + Sync {
    /// Decode `video` at `rate` frames per second into `out_dir`, naming
    /// files with the printf-style `pattern`, starting at index 0.
    fn decode(&self, video: &Path, rate: f64, out_dir: &Path, pattern: &str) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Parses ffprobe's `-of json` output down to the container duration.
fn parse_probe_duration(json: &str) -> Result<f64> {
    let output: ProbeOutput = serde_json::from_str(json)?;
    let raw = output
        .format
        .and_then(|f| f.duration)
        .ok_or_else(|| PipelineError::Probe("no duration reported".into()))?;
    let duration: f64 = raw
        .trim()
        .parse()
        .map_err(|_| PipelineError::Probe(format!("unparseable duration {:?}", raw)))?;
    if !duration.is_finite() || duration < 0.0 {
        return Err(PipelineError::Probe(format!("invalid duration {}", duration)));
    }
    Ok(duration)
}

/// Runs the `ffprobe` and `ffmpeg` executables found on `PATH` (or at the
/// configured locations).
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    ffmpeg: String,
    ffprobe: String,
}

impl Ffmpeg {
    pub fn new() -> Self {
        Self::with_programs("ffmpeg", "ffprobe")
    }

    pub fn with_programs(ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoProbe for Ffmpeg {
    fn duration(&self, video: &Path) -> Result<f64> {
        let output = Command::new(&self.ffprobe)
            .args(["-v", "error", "-show_entries", "format=duration", "-of", "json"])
            .arg(video)
            .output()
            .map_err(|e| PipelineError::Probe(format!("could not run {}: {}", self.ffprobe, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("❌ ffprobe failed on {}: {}", video.display(), stderr.trim());
            return Err(PipelineError::Probe(stderr.trim().to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!("Video metadata: {}", stdout.trim());
        parse_probe_duration(&stdout).map_err(|e| match e {
            PipelineError::Json(e) => PipelineError::Probe(e.to_string()),
            other => other,
        })
    }
}

impl FrameDecoder for Ffmpeg {
    fn decode(&self, video: &Path, rate: f64, out_dir: &Path, pattern: &str) -> Result<()> {
        let output = Command::new(&self.ffmpeg)
            .args(["-y", "-v", "error", "-i"])
            .arg(video)
            .arg("-r")
            .arg(format!("{}", rate))
            .args(["-start_number", "0"])
            .arg(out_dir.join(pattern))
            .output()
            .map_err(|e| PipelineError::Extraction {
                status: "spawn failed".into(),
                stderr: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("❌ FFmpeg error: {}", stderr);
            return Err(PipelineError::Extraction {
                status: output.status.to_string(),
                stderr,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_json_decode() {
        let json = r#"
{
    "programs": [],
    "format": {
        "duration": "20.033000"
    }
}
"#;
        let duration = parse_probe_duration(json).unwrap();
        assert!((duration - 20.033).abs() < 1e-9);
    }

    #[test]
    fn test_probe_json_without_duration() {
        let json = r#"{ "format": {} }"#;
        assert!(matches!(
            parse_probe_duration(json),
            Err(PipelineError::Probe(_))
        ));

        let json = r#"{ "format": { "duration": "N/A" } }"#;
        assert!(matches!(
            parse_probe_duration(json),
            Err(PipelineError::Probe(_))
        ));
    }

    #[test]
    fn test_probe_json_garbage() {
        assert!(parse_probe_duration("not json").is_err());
    }

    #[test]
    fn test_missing_programs_are_reported() {
        let tools = Ffmpeg::with_programs(
            "/nonexistent/bin/ffmpeg-missing",
            "/nonexistent/bin/ffprobe-missing",
        );
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            tools.duration(Path::new("clip.mp4")),
            Err(PipelineError::Probe(_))
        ));
        assert!(matches!(
            tools.decode(Path::new("clip.mp4"), 0.2, dir.path(), "%01d.jpg"),
            Err(PipelineError::Extraction { .. })
        ));
    }
}
