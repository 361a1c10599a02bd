//! 文字提取 - run every configured language over one frame and join the
//! non-empty results.

use super::engine::OcrEngine;
use crate::core::video::PreprocessedImage;
use log::{debug, warn};
use std::fs;
use std::path::PathBuf;

/// Joined OCR output for one frame; empty when no language produced text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameText {
    pub frame_index: u64,
    pub text: String,
}

impl FrameText {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

pub struct TextExtractor<'a> {
    engine: &'a dyn OcrEngine,
    languages: &'a [String],
    options: &'a str,
    text_dir: Option<PathBuf>,
}

impl<'a> TextExtractor<'a> {
    pub fn new(engine: &'a dyn OcrEngine, languages: &'a [String], options: &'a str) -> Self {
        Self {
            engine,
            languages,
            options,
            text_dir: None,
        }
    }

    /// Persist each frame's joined text as `<dir>/<frame name>.txt`.
    pub fn with_text_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.text_dir = Some(dir.into());
        self
    }

    pub fn extract(&self, image: &PreprocessedImage) -> FrameText {
        let mut parts: Vec<String> = Vec::with_capacity(self.languages.len());

        for lang in self.languages {
            match self.engine.recognize(&image.image, lang, self.options) {
                Ok(text) if !text.trim().is_empty() => {
                    debug!("Extracted text using {} for frame {}", lang, image.frame_name);
                    parts.push(text);
                }
                Ok(_) => debug!("No {} text in frame {}", lang, image.frame_name),
                Err(e) => warn!(
                    "Failed to extract text using {} for frame {}: {}",
                    lang, image.frame_name, e
                ),
            }
        }

        if parts.is_empty() {
            warn!("No text extracted from frame {} using any language", image.frame_name);
            return FrameText {
                frame_index: image.frame_index,
                text: String::new(),
            };
        }

        let text = parts.join("\n");
        self.persist(image, &text);
        FrameText {
            frame_index: image.frame_index,
            text,
        }
    }

    fn persist(&self, image: &PreprocessedImage, text: &str) {
        let Some(dir) = &self.text_dir else {
            return;
        };
        let path = dir.join(format!("{}.txt", image.frame_name));
        match fs::create_dir_all(dir).and_then(|_| fs::write(&path, text)) {
            Ok(()) => debug!("Saved text to: {}", path.display()),
            Err(e) => warn!("Could not save frame text {}: {}", path.display(), e),
        }
    }
}
