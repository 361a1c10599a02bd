//! 帧采样 - probe the video, size the schedule, ask the decoder for frames.

use super::ffmpeg::{FrameDecoder, VideoProbe};
use super::frame::{FrameFile, SampleSchedule};
use crate::config::is_supported_video;
use crate::core::error::{PipelineError, Result};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// A video file accepted for processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoAsset {
    path: PathBuf,
}

impl VideoAsset {
    /// Fails if the file is missing or its container extension is not one we
    /// accept. No decoding happens here.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(PipelineError::ResourceNotFound(path.to_path_buf()));
        }
        if !is_supported_video(path) {
            return Err(PipelineError::UnsupportedContainer(path.to_path_buf()));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name without its extension.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_string())
    }
}

/// Frames produced by one sampling pass, in capture order.
#[derive(Debug, Clone)]
pub struct SampledFrames {
    pub schedule: SampleSchedule,
    pub frames: Vec<FrameFile>,
}

pub struct FrameSampler<'a> {
    probe: &'a dyn VideoProbe,
    decoder: &'a dyn FrameDecoder,
}

impl<'a> FrameSampler<'a> {
    pub fn new(probe: &'a dyn VideoProbe, decoder: &'a dyn FrameDecoder) -> Self {
        Self { probe, decoder }
    }

    /// Samples `video` every `frame_gap` seconds into `out_dir`.
    ///
    /// When the gap exceeds the video's duration the schedule expects zero
    /// frames, but the decoder still runs and whatever it emits (usually the
    /// first frame) is returned.
    pub fn sample(&self, video: &VideoAsset, frame_gap: f64, out_dir: &Path) -> Result<SampledFrames> {
        if !frame_gap.is_finite() || frame_gap <= 0.0 {
            return Err(PipelineError::Config(format!(
                "frame gap must be positive, got {}",
                frame_gap
            )));
        }
        if !video.path().is_file() {
            return Err(PipelineError::ResourceNotFound(video.path().to_path_buf()));
        }

        let duration = self.probe.duration(video.path())?;
        let schedule = SampleSchedule::new(duration, frame_gap);
        info!(
            "🎬 Extracting frames from {}: {:.2}s, every {}s, ~{} frames",
            video.path().display(),
            duration,
            frame_gap,
            schedule.frame_count
        );
        if schedule.frame_count == 0 {
            warn!(
                "Frame gap {}s exceeds video duration {:.2}s; keeping only what the decoder emits",
                frame_gap, duration
            );
        }

        fs::create_dir_all(out_dir)?;
        let stale = clear_frames(out_dir)?;
        if stale > 0 {
            warn!(
                "Removed {} stale frames from {}",
                stale,
                out_dir.display()
            );
        }
        self.decoder
            .decode(video.path(), schedule.rate(), out_dir, &schedule.file_pattern())?;

        let frames = list_frames(out_dir)?;
        info!("✅ Successfully extracted {} frames", frames.len());
        Ok(SampledFrames { schedule, frames })
    }
}

/// Deletes frame files left in `dir` by an earlier run so they are never
/// mixed into this one. Other files are left alone.
pub fn clear_frames(dir: &Path) -> Result<usize> {
    let mut removed = 0;
    for frame in list_frames(dir)? {
        fs::remove_file(&frame.path)?;
        removed += 1;
    }
    Ok(removed)
}

/// Frame files in `dir`, ordered by the index embedded in their names rather
/// than by directory enumeration order.
pub fn list_frames(dir: &Path) -> Result<Vec<FrameFile>> {
    let mut frames = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(frame) = FrameFile::from_path(&entry.path()) {
            frames.push(frame);
        }
    }
    frames.sort_by_key(|f| f.index);
    Ok(frames)
}
