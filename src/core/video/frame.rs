use crate::core::error::{PipelineError, Result};
use image::RgbImage;
use std::path::{Path, PathBuf};

/// Extension used for sampled frame files.
pub const FRAME_EXTENSION: &str = "jpg";

/// 采样计划 - derived once per video from its duration and the frame gap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSchedule {
    pub duration: f64,
    pub frame_gap: f64,
    pub frame_count: u64,
    pub digit_width: usize,
}

impl SampleSchedule {
    pub fn new(duration: f64, frame_gap: f64) -> Self {
        let frame_count = if duration > 0.0 && frame_gap > 0.0 {
            (duration / frame_gap).floor() as u64
        } else {
            0
        };
        Self {
            duration,
            frame_gap,
            frame_count,
            digit_width: digit_width(frame_count),
        }
    }

    /// Frames per second handed to the decoder.
    pub fn rate(&self) -> f64 {
        1.0 / self.frame_gap
    }

    /// Output pattern in the decoder's printf style, e.g. `%03d.jpg`.
    pub fn file_pattern(&self) -> String {
        format!("%0{}d.{}", self.digit_width, FRAME_EXTENSION)
    }

    pub fn file_name(&self, index: u64) -> String {
        format!(
            "{:0width$}.{}",
            index,
            FRAME_EXTENSION,
            width = self.digit_width
        )
    }
}

/// Number of decimal digits needed to print `n`; never less than 1.
pub fn digit_width(n: u64) -> usize {
    let mut width = 1;
    let mut rest = n / 10;
    while rest > 0 {
        width += 1;
        rest /= 10;
    }
    width
}

/// Channel order of decoded pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelOrder {
    Rgb,
    Bgr,
}

/// A sampled frame on disk, before its pixels are decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameFile {
    pub index: u64,
    pub path: PathBuf,
}

impl FrameFile {
    /// Parses the numeric index out of a `<digits>.jpg` file name.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if !ext.eq_ignore_ascii_case(FRAME_EXTENSION) {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let index = stem.parse().ok()?;
        Some(Self {
            index,
            path: path.to_path_buf(),
        })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.index.to_string())
    }

    pub fn load(&self) -> Result<Frame> {
        if !self.path.is_file() {
            return Err(PipelineError::ResourceNotFound(self.path.clone()));
        }
        let pixels = image::open(&self.path)?.to_rgb8();
        Ok(Frame {
            index: self.index,
            name: self.file_name(),
            pixels,
            order: PixelOrder::Rgb,
        })
    }
}

/// 帧数据结构
#[derive(Debug, Clone)]
pub struct Frame {
    pub index: u64,
    pub name: String,
    pub pixels: RgbImage,
    pub order: PixelOrder,
}

impl Frame {
    pub fn new(index: u64, name: impl Into<String>, pixels: RgbImage, order: PixelOrder) -> Self {
        Self {
            index,
            name: name.into(),
            pixels,
            order,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Stem of the frame name, used to label debug output.
    pub fn stem(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.name)
    }
}
