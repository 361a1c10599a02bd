//! Command-line entry point: sample frames, OCR them, write one word list per
//! video.

use anyhow::Context;
use clap::Parser;
use log::{error, info, warn};
use std::path::PathBuf;
use std::process::ExitCode;
use video_words::api::video::VideoWordExtractor;
use video_words::{init_logging, PipelineConfig};

#[derive(Debug, Parser)]
/// Extract a sorted, deduplicated vocabulary list from the text shown in
/// videos (.mp4, .avi, .mov, .mkv).
#[command(name = "video-words", version)]
struct Args {
    /// Video files, or directories containing videos.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Seconds between sampled frames.
    #[arg(long, default_value_t = 5.0)]
    frame_gap: f64,

    /// Keep the sampled frames under --frames-dir.
    #[arg(long)]
    save_frames: bool,

    /// Write each frame's recognized text under --text-dir.
    #[arg(long = "save-text")]
    save_frame_text: bool,

    /// OCR language codes, tried in order (repeat or comma separate).
    #[arg(long = "lang", value_delimiter = ',', default_value = "eng")]
    languages: Vec<String>,

    /// Extra flags passed to tesseract unchanged, e.g. "--psm 11".
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    ocr_options: String,

    /// Save intermediate preprocessing images and log at debug level.
    #[arg(long)]
    debug: bool,

    /// Where word lists are written.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Extension of the word list files.
    #[arg(long, default_value = "txt")]
    output_ext: String,

    #[arg(long, default_value = "frames")]
    frames_dir: PathBuf,

    #[arg(long, default_value = "text")]
    text_dir: PathBuf,

    #[arg(long, default_value = "debug")]
    debug_dir: PathBuf,

    /// Frames processed in parallel (defaults to the number of CPUs).
    #[arg(long)]
    workers: Option<usize>,

    /// Also append log output to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> PipelineConfig {
        let defaults = PipelineConfig::default();
        PipelineConfig {
            languages: self.languages,
            ocr_options: self.ocr_options,
            frame_gap: self.frame_gap,
            save_frames: self.save_frames,
            save_frame_text: self.save_frame_text,
            debug: self.debug,
            frames_dir: self.frames_dir,
            text_dir: self.text_dir,
            debug_dir: self.debug_dir,
            output_dir: self.output_dir,
            output_extension: self.output_ext,
            workers: self.workers.unwrap_or(defaults.workers),
        }
    }
}

fn run(args: Args) -> anyhow::Result<bool> {
    init_logging(args.debug, args.log_file.as_deref())
        .context("could not open log file")?;
    info!("Starting video processing");

    let inputs = args.inputs.clone();
    let extractor = VideoWordExtractor::create(args.into_config());
    let report = extractor
        .process(&inputs)
        .context("could not start processing")?;

    for video in &report.processed {
        match &video.output {
            Some(path) => println!(
                "{} -> {} ({} words)",
                video.video.display(),
                path.display(),
                video.words.len()
            ),
            None => warn!("{}: no frames extracted", video.video.display()),
        }
    }
    for (video, err) in &report.failed {
        eprintln!("error: {}: {}", video.display(), err);
    }
    Ok(report.is_success())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("Application error: {:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
