//! OCR engine seam and the tesseract CLI implementation.

use crate::core::error::{PipelineError, Result};
use image::{ImageOutputFormat, RgbImage};
use log::debug;
use std::io::{Cursor, Write};
use std::process::{Command, Stdio};

pub trait OcrEngine: Send + Sync {
    /// Recognize text in an RGB image. `options` are engine flags passed
    /// through untouched.
    fn recognize(&self, image: &RgbImage, lang: &str, options: &str) -> Result<String>;

    /// Language codes with installed data.
    fn installed_languages(&self) -> Result<Vec<String>>;
}

/// Runs the `tesseract` executable, feeding PNG data over stdin.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    program: String,
}

impl TesseractCli {
    pub fn new() -> Self {
        Self::with_program("tesseract")
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn ocr_error(lang: &str, message: impl Into<String>) -> PipelineError {
        PipelineError::Ocr {
            lang: lang.to_string(),
            message: message.into(),
        }
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(&self, image: &RgbImage, lang: &str, options: &str) -> Result<String> {
        let mut png = Cursor::new(Vec::new());
        image.write_to(&mut png, ImageOutputFormat::Png)?;

        let mut child = Command::new(&self.program)
            .args(["stdin", "stdout", "-l", lang])
            .args(options.split_whitespace())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Self::ocr_error(lang, format!("could not run {}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(png.get_ref())
                .map_err(|e| Self::ocr_error(lang, format!("could not send image: {}", e)))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| Self::ocr_error(lang, e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Self::ocr_error(lang, stderr.trim()));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("tesseract [{}] returned {} bytes", lang, text.len());
        Ok(text)
    }

    fn installed_languages(&self) -> Result<Vec<String>> {
        let output = Command::new(&self.program)
            .arg("--list-langs")
            .output()
            .map_err(|e| {
                PipelineError::Config(format!("could not run {}: {}", self.program, e))
            })?;
        if !output.status.success() {
            return Err(PipelineError::Config(format!(
                "{} --list-langs failed: {}",
                self.program,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(parse_language_list(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Parses `tesseract --list-langs` output, skipping the header line.
pub fn parse_language_list(listing: &str) -> Vec<String> {
    listing
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with("List of available languages"))
        .map(str::to_string)
        .collect()
}

type RecognizeFn = dyn Fn(&RgbImage, &str) -> Result<String> + Send + Sync;

/// In-process engine driven by a closure, for tests and dry runs.
pub struct MockOcrEngine {
    languages: Vec<String>,
    pattern: Box<RecognizeFn>,
}

impl MockOcrEngine {
    pub fn new() -> Self {
        Self::with_pattern(|_, _| Ok(String::new()))
    }

    pub fn with_pattern<F>(pattern: F) -> Self
    where
        F: Fn(&RgbImage, &str) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            languages: vec!["eng".to_string()],
            pattern: Box::new(pattern),
        }
    }

    /// Same text for every image, per language.
    pub fn with_fixed_text(per_lang: Vec<(&str, &str)>) -> Self {
        let table: Vec<(String, String)> = per_lang
            .into_iter()
            .map(|(l, t)| (l.to_string(), t.to_string()))
            .collect();
        let languages = table.iter().map(|(l, _)| l.clone()).collect();
        let mut engine = Self::with_pattern(move |_, lang| {
            Ok(table
                .iter()
                .find(|(l, _)| l == lang)
                .map(|(_, t)| t.clone())
                .unwrap_or_default())
        });
        engine.languages = languages;
        engine
    }

    pub fn with_languages(mut self, languages: &[&str]) -> Self {
        self.languages = languages.iter().map(|l| l.to_string()).collect();
        self
    }
}

impl Default for MockOcrEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrEngine for MockOcrEngine {
    fn recognize(&self, image: &RgbImage, lang: &str, _options: &str) -> Result<String> {
        (self.pattern)(image, lang)
    }

    fn installed_languages(&self) -> Result<Vec<String>> {
        Ok(self.languages.clone())
    }
}
