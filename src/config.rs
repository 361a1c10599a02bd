//! Pipeline configuration, passed explicitly into every component.

use crate::core::error::{PipelineError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

static LANG_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_]+(\+[A-Za-z_]+)*$").expect("valid language regex"));

/// Container extensions accepted as video input (compared case-insensitively).
pub const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "avi", "mov", "mkv"];

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// OCR language codes, tried in order for every frame.
    pub languages: Vec<String>,
    /// Engine-specific flags handed to the OCR engine untouched.
    pub ocr_options: String,
    /// Seconds between sampled frames.
    pub frame_gap: f64,
    pub save_frames: bool,
    pub save_frame_text: bool,
    pub debug: bool,
    pub frames_dir: PathBuf,
    pub text_dir: PathBuf,
    pub debug_dir: PathBuf,
    pub output_dir: PathBuf,
    pub output_extension: String,
    /// Upper bound on frames preprocessed/recognized concurrently.
    pub workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            languages: vec!["eng".to_string()],
            ocr_options: String::new(),
            frame_gap: 5.0,
            save_frames: false,
            save_frame_text: false,
            debug: false,
            frames_dir: PathBuf::from("frames"),
            text_dir: PathBuf::from("text"),
            debug_dir: PathBuf::from("debug"),
            output_dir: PathBuf::from("."),
            output_extension: "txt".to_string(),
            workers: num_cpus::get().max(1),
        }
    }
}

impl PipelineConfig {
    /// Checks everything that can be checked without touching the filesystem
    /// or the OCR engine.
    pub fn validate(&self) -> Result<()> {
        if !self.frame_gap.is_finite() || self.frame_gap <= 0.0 {
            return Err(PipelineError::Config(format!(
                "frame gap must be a positive number of seconds, got {}",
                self.frame_gap
            )));
        }
        if self.languages.is_empty() {
            return Err(PipelineError::Config("no OCR languages configured".into()));
        }
        if let Some(bad) = self.languages.iter().find(|l| !LANG_CODE.is_match(l)) {
            return Err(PipelineError::Config(format!(
                "invalid language code: {:?}",
                bad
            )));
        }
        if self.workers == 0 {
            return Err(PipelineError::Config("worker count must be at least 1".into()));
        }
        if self.output_extension.is_empty() || self.output_extension.contains('/') {
            return Err(PipelineError::Config(format!(
                "invalid output extension: {:?}",
                self.output_extension
            )));
        }
        Ok(())
    }

    /// Every `+`-joined part of every configured language must be installed.
    pub fn check_languages(&self, installed: &[String]) -> Result<()> {
        let mut missing: Vec<String> = Vec::new();
        for part in self.languages.iter().flat_map(|l| l.split('+')) {
            if !installed.iter().any(|i| i == part) && !missing.iter().any(|m| m == part) {
                missing.push(part.to_string());
            }
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::LanguageDataMissing(missing))
        }
    }

    /// `<output_dir>/<stem>_words.<ext>`
    pub fn output_path(&self, video_stem: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_words.{}", video_stem, self.output_extension))
    }
}

pub fn is_supported_video(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|v| v.eq_ignore_ascii_case(e))
        })
        .unwrap_or(false)
}
