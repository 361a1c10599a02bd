//! 处理流程 - per-video sequencing of sampler, preprocessor, OCR and
//! aggregation, plus batch handling with per-video failure isolation.

use crate::config::{is_supported_video, PipelineConfig};
use crate::core::aggregate::aggregate;
use crate::core::error::{PipelineError, Result};
use crate::core::ocr::{OcrEngine, TextExtractor};
use crate::core::video::{
    DebugSink, FrameDecoder, FrameFile, FrameSampler, ImagePreprocessor, VideoAsset, VideoProbe,
};
use log::{error, info, warn};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// What happened to one successfully processed video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoReport {
    pub video: PathBuf,
    pub frames: usize,
    pub frames_with_text: usize,
    pub words: Vec<String>,
    /// `None` when no frames were extracted and nothing was written.
    pub output: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: Vec<VideoReport>,
    pub failed: Vec<(PathBuf, PipelineError)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct PipelineDriver<'a> {
    config: &'a PipelineConfig,
    probe: &'a dyn VideoProbe,
    decoder: &'a dyn FrameDecoder,
    ocr: &'a dyn OcrEngine,
    pool: ThreadPool,
    written: Mutex<HashSet<PathBuf>>,
}

impl<'a> PipelineDriver<'a> {
    /// Validates the configuration and language data before any processing
    /// side effects happen.
    pub fn new(
        config: &'a PipelineConfig,
        probe: &'a dyn VideoProbe,
        decoder: &'a dyn FrameDecoder,
        ocr: &'a dyn OcrEngine,
    ) -> Result<Self> {
        config.validate()?;
        let installed = ocr.installed_languages()?;
        config.check_languages(&installed)?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("frame-worker-{}", i))
            .build()
            .map_err(|e| PipelineError::Config(format!("could not start worker pool: {}", e)))?;

        info!(
            "🔧 Pipeline ready: languages {:?}, frame gap {}s, {} workers",
            config.languages, config.frame_gap, config.workers
        );
        Ok(Self {
            config,
            probe,
            decoder,
            ocr,
            pool,
            written: Mutex::new(HashSet::new()),
        })
    }

    /// Processes every video; a failing video is recorded and the batch moves on.
    pub fn run(&self, videos: &[PathBuf]) -> BatchReport {
        let mut report = BatchReport::default();
        for video in videos {
            match self.process_video(video) {
                Ok(r) => report.processed.push(r),
                Err(e) => {
                    error!("Failed to process video {}: {}", video.display(), e);
                    report.failed.push((video.clone(), e));
                }
            }
        }
        info!(
            "Video processing completed: {} succeeded, {} failed",
            report.processed.len(),
            report.failed.len()
        );
        report
    }

    pub fn process_video(&self, path: &Path) -> Result<VideoReport> {
        info!("Processing video: {}", path.display());
        let video = VideoAsset::open(path)?;
        let stem = video.stem();

        // Frames go to a scratch directory unless the user asked to keep them.
        let scratch: Option<TempDir>;
        let frames_dir = if self.config.save_frames {
            scratch = None;
            self.config.frames_dir.join(&stem)
        } else {
            let dir = tempfile::Builder::new().prefix("video-words-").tempdir()?;
            let path = dir.path().to_path_buf();
            scratch = Some(dir);
            path
        };

        let sampler = FrameSampler::new(self.probe, self.decoder);
        let sampled = sampler.sample(&video, self.config.frame_gap, &frames_dir)?;

        if sampled.frames.is_empty() {
            warn!("No frames extracted from {}; skipping", path.display());
            return Ok(VideoReport {
                video: path.to_path_buf(),
                frames: 0,
                frames_with_text: 0,
                words: Vec::new(),
                output: None,
            });
        }

        let texts = self.recognize_frames(&stem, &sampled.frames);
        drop(scratch);

        let frames_with_text = texts.len();
        let words = aggregate(&texts);
        if words.is_empty() {
            warn!("No words recognized in {}", path.display());
        }

        let output = self.write_words(&stem, &words)?;
        info!(
            "Successfully processed video: {} ({} words from {}/{} frames)",
            path.display(),
            words.len(),
            frames_with_text,
            sampled.frames.len()
        );
        Ok(VideoReport {
            video: path.to_path_buf(),
            frames: sampled.frames.len(),
            frames_with_text,
            words,
            output: Some(output),
        })
    }

    /// Preprocess + OCR each frame on the worker pool. Frames that fail to
    /// load or yield no text are skipped; result order is not meaningful.
    fn recognize_frames(&self, stem: &str, frames: &[FrameFile]) -> Vec<String> {
        let preprocessor = if self.config.debug {
            ImagePreprocessor::with_debug(DebugSink::new(self.config.debug_dir.join(stem)))
        } else {
            ImagePreprocessor::new()
        };
        let mut extractor =
            TextExtractor::new(self.ocr, &self.config.languages, &self.config.ocr_options);
        if self.config.save_frame_text {
            extractor = extractor.with_text_dir(self.config.text_dir.join(stem));
        }

        self.pool.install(|| {
            frames
                .par_iter()
                .filter_map(|file| {
                    info!("Processing frame: {}", file.path.display());
                    let frame = match file.load() {
                        Ok(frame) => frame,
                        Err(e) => {
                            error!("Error processing frame {}: {}", file.path.display(), e);
                            return None;
                        }
                    };
                    let image = preprocessor.preprocess(&frame);
                    let text = extractor.extract(&image);
                    (!text.is_empty()).then_some(text.text)
                })
                .collect()
        })
    }

    fn write_words(&self, stem: &str, words: &[String]) -> Result<PathBuf> {
        let path = self.config.output_path(stem);
        if !self.claim_output(&path) {
            warn!(
                "{} was already written by another video in this run; overwriting",
                path.display()
            );
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, words.join("\n"))?;
        info!("Successfully saved results to: {}", path.display());
        Ok(path)
    }

    /// Records `path` as written by this driver; false if it already was.
    fn claim_output(&self, path: &Path) -> bool {
        match self.written.lock() {
            Ok(mut written) => written.insert(path.to_path_buf()),
            Err(poisoned) => poisoned.into_inner().insert(path.to_path_buf()),
        }
    }
}

/// Expands directories to the supported videos they contain (sorted by
/// name); explicit files are passed through for later validation.
pub fn collect_videos(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut videos = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = fs::read_dir(input)?
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_file() && is_supported_video(p))
                .collect();
            found.sort();
            if found.is_empty() {
                warn!("No video files found in {}", input.display());
            }
            videos.extend(found);
        } else {
            videos.push(input.clone());
        }
    }
    Ok(videos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ocr::MockOcrEngine;

    struct NoVideo;

    impl VideoProbe for NoVideo {
        fn duration(&self, _: &Path) -> Result<f64> {
            panic!("probe must not run")
        }
    }

    impl FrameDecoder for NoVideo {
        fn decode(&self, _: &Path, _: f64, _: &Path, _: &str) -> Result<()> {
            panic!("decoder must not run")
        }
    }

    #[test]
    fn test_startup_rejects_missing_language_data() {
        let config = PipelineConfig {
            languages: vec!["eng+jpn".into()],
            workers: 1,
            ..Default::default()
        };
        let ocr = MockOcrEngine::new().with_languages(&["eng"]);
        match PipelineDriver::new(&config, &NoVideo, &NoVideo, &ocr) {
            Err(PipelineError::LanguageDataMissing(missing)) => assert_eq!(missing, vec!["jpn"]),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("expected startup failure"),
        }
    }

    #[test]
    fn test_startup_rejects_bad_gap() {
        let config = PipelineConfig {
            frame_gap: 0.0,
            workers: 1,
            ..Default::default()
        };
        let ocr = MockOcrEngine::new();
        let err = PipelineDriver::new(&config, &NoVideo, &NoVideo, &ocr).err().unwrap();
        assert!(err.is_startup());
    }

    #[test]
    fn test_missing_and_unsupported_videos_never_reach_collaborators() {
        let dir = tempfile::tempdir().unwrap();
        let unsupported = dir.path().join("clip.flv");
        fs::write(&unsupported, b"").unwrap();

        let config = PipelineConfig {
            output_dir: dir.path().join("out"),
            workers: 1,
            ..Default::default()
        };
        let ocr = MockOcrEngine::new();
        let driver = PipelineDriver::new(&config, &NoVideo, &NoVideo, &ocr).unwrap();

        let report = driver.run(&[dir.path().join("missing.mp4"), unsupported]);
        assert_eq!(report.failed.len(), 2);
        assert!(matches!(report.failed[0].1, PipelineError::ResourceNotFound(_)));
        assert!(matches!(report.failed[1].1, PipelineError::UnsupportedContainer(_)));
        assert!(!dir.path().join("out").exists());
        assert!(!report.is_success());
    }

    #[test]
    fn test_output_claimed_once_per_run() {
        let config = PipelineConfig {
            workers: 1,
            ..Default::default()
        };
        let ocr = MockOcrEngine::new();
        let driver = PipelineDriver::new(&config, &NoVideo, &NoVideo, &ocr).unwrap();

        let path = config.output_path("clip");
        assert!(driver.claim_output(&path));
        assert!(!driver.claim_output(&path));
        assert!(driver.claim_output(&config.output_path("other")));
    }

    #[test]
    fn test_collect_videos_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.MKV", "a.mp4", "notes.txt", "c.webm"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("nested.mp4")).unwrap();
        let explicit = PathBuf::from("elsewhere/clip.avi");

        let videos = collect_videos(&[dir.path().to_path_buf(), explicit.clone()]).unwrap();
        assert_eq!(
            videos,
            vec![dir.path().join("a.mp4"), dir.path().join("b.MKV"), explicit]
        );
    }
}
