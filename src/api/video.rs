//! 视频词表提取器 - facade wiring the pipeline to ffmpeg and tesseract.

use crate::config::PipelineConfig;
use crate::core::error::Result;
use crate::core::ocr::TesseractCli;
use crate::core::pipeline::{collect_videos, BatchReport, PipelineDriver};
use crate::core::video::Ffmpeg;
use log::{info, warn};
use std::path::PathBuf;

/// ```no_run
/// use video_words::api::video::VideoWordExtractor;
/// use video_words::PipelineConfig;
///
/// let extractor = VideoWordExtractor::create(PipelineConfig::default());
/// let report = extractor.process(&["talk.mp4".into()]).unwrap();
/// assert!(report.is_success());
/// ```
pub struct VideoWordExtractor {
    config: PipelineConfig,
    video_tools: Ffmpeg,
    ocr: TesseractCli,
}

impl VideoWordExtractor {
    pub fn create(config: PipelineConfig) -> Self {
        Self::with_tools(config, Ffmpeg::new(), TesseractCli::new())
    }

    pub fn with_tools(config: PipelineConfig, video_tools: Ffmpeg, ocr: TesseractCli) -> Self {
        info!("🎬 VideoWordExtractor: created");
        Self {
            config,
            video_tools,
            ocr,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Startup problems (bad configuration, missing language data) come back
    /// as `Err`; per-video failures are listed in the report.
    pub fn process(&self, inputs: &[PathBuf]) -> Result<BatchReport> {
        let driver = PipelineDriver::new(
            &self.config,
            &self.video_tools,
            &self.video_tools,
            &self.ocr,
        )?;
        let videos = collect_videos(inputs)?;
        if videos.is_empty() {
            warn!("No videos to process");
        }
        Ok(driver.run(&videos))
    }
}

impl Drop for VideoWordExtractor {
    fn drop(&mut self) {
        info!("🗑️ VideoWordExtractor: released");
    }
}
