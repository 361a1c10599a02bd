//! 图像预处理 - binarize, dilate, find text blobs and outline them on the
//! original frame before OCR.

use super::frame::{Frame, PixelOrder};
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::contrast::otsu_level;
use imageproc::distance_transform::Norm;
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::morphology::dilate;
use imageproc::rect::Rect;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Outline colour drawn around detected blobs.
pub const HIGHLIGHT: Rgb<u8> = Rgb([0, 255, 0]);
/// Outline stroke width in pixels.
pub const STROKE_WIDTH: u32 = 3;
/// Dilation passes with a 3×3 square element.
pub const DILATE_ITERATIONS: usize = 2;

/// Frame ready for OCR: RGB order, blobs outlined.
#[derive(Debug, Clone)]
pub struct PreprocessedImage {
    pub frame_index: u64,
    pub frame_name: String,
    pub image: RgbImage,
    pub contour_count: usize,
}

/// Writes intermediate stages as PNG for inspection.
#[derive(Debug, Clone)]
pub struct DebugSink {
    dir: PathBuf,
}

impl DebugSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Debug output never fails the frame.
    fn save(&self, frame: &Frame, stage: &str, img: DynamicImage) {
        let path = self.dir.join(format!("{}_{}.png", frame.stem(), stage));
        let result = fs::create_dir_all(&self.dir)
            .map_err(image::ImageError::IoError)
            .and_then(|_| img.save(&path));
        match result {
            Ok(()) => debug!("Saved debug image: {}", path.display()),
            Err(e) => warn!("Could not save debug image {}: {}", path.display(), e),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImagePreprocessor {
    debug: Option<DebugSink>,
}

impl ImagePreprocessor {
    pub fn new() -> Self {
        Self { debug: None }
    }

    pub fn with_debug(sink: DebugSink) -> Self {
        Self { debug: Some(sink) }
    }

    /// Runs the fixed chain: grayscale → inverted Otsu threshold → dilation →
    /// external contours → outline on the original → RGB order.
    pub fn preprocess(&self, frame: &Frame) -> PreprocessedImage {
        let gray = to_grayscale(&frame.pixels, frame.order);
        self.stage(frame, "gray", || DynamicImage::ImageLuma8(gray.clone()));

        let binary = binarize_inverted(&gray);
        self.stage(frame, "binary", || DynamicImage::ImageLuma8(binary.clone()));

        let dilated = dilate_strokes(&binary);
        self.stage(frame, "dilated", || DynamicImage::ImageLuma8(dilated.clone()));

        let mut annotated = frame.pixels.clone();
        let contour_count = outline_external_contours(&dilated, &mut annotated, highlight_for(frame.order));

        if frame.order == PixelOrder::Bgr {
            swap_red_blue(&mut annotated);
        }
        self.stage(frame, "contours", || DynamicImage::ImageRgb8(annotated.clone()));

        debug!(
            "Frame {}: {} external contours",
            frame.name, contour_count
        );
        PreprocessedImage {
            frame_index: frame.index,
            frame_name: frame.name.clone(),
            image: annotated,
            contour_count,
        }
    }

    fn stage<F: FnOnce() -> DynamicImage>(&self, frame: &Frame, name: &str, image: F) {
        if let Some(sink) = &self.debug {
            sink.save(frame, name, image());
        }
    }
}

/// BT.601 luma, reading channels according to `order`.
pub fn to_grayscale(pixels: &RgbImage, order: PixelOrder) -> GrayImage {
    GrayImage::from_fn(pixels.width(), pixels.height(), |x, y| {
        let p = pixels.get_pixel(x, y).0;
        let (r, g, b) = match order {
            PixelOrder::Rgb => (p[0] as u32, p[1] as u32, p[2] as u32),
            PixelOrder::Bgr => (p[2] as u32, p[1] as u32, p[0] as u32),
        };
        Luma([((r * 299 + g * 587 + b * 114 + 500) / 1000) as u8])
    })
}

/// Otsu threshold with inverted polarity: dark strokes become 255.
pub fn binarize_inverted(gray: &GrayImage) -> GrayImage {
    if gray.width() == 0 || gray.height() == 0 {
        return gray.clone();
    }
    let level = otsu_level(gray);
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y)[0] > level {
            Luma([0])
        } else {
            Luma([255])
        }
    })
}

/// 3×3 square dilation, applied `DILATE_ITERATIONS` times.
pub fn dilate_strokes(binary: &GrayImage) -> GrayImage {
    if binary.width() == 0 || binary.height() == 0 {
        return binary.clone();
    }
    let mut dilated = binary.clone();
    for _ in 0..DILATE_ITERATIONS {
        dilated = dilate(&dilated, Norm::LInf, 1);
    }
    dilated
}

/// Draws outermost blob boundaries only; holes and anything nested inside
/// them are skipped. Returns how many contours were drawn.
fn outline_external_contours(binary: &GrayImage, canvas: &mut RgbImage, color: Rgb<u8>) -> usize {
    if binary.width() == 0 || binary.height() == 0 {
        return 0;
    }
    let half = (STROKE_WIDTH / 2) as i32;
    let mut drawn = 0;
    for contour in find_contours::<i32>(binary) {
        if contour.border_type != BorderType::Outer || contour.parent.is_some() {
            continue;
        }
        // Trace points are 8-connected, so a square brush per point gives an
        // unbroken stroke.
        for point in &contour.points {
            let brush = Rect::at(point.x - half, point.y - half).of_size(STROKE_WIDTH, STROKE_WIDTH);
            draw_filled_rect_mut(canvas, brush, color);
        }
        drawn += 1;
    }
    drawn
}

/// Highlight expressed in the frame's own channel order.
fn highlight_for(order: PixelOrder) -> Rgb<u8> {
    match order {
        PixelOrder::Rgb => HIGHLIGHT,
        PixelOrder::Bgr => Rgb([HIGHLIGHT[2], HIGHLIGHT[1], HIGHLIGHT[0]]),
    }
}

fn swap_red_blue(image: &mut RgbImage) {
    for pixel in image.pixels_mut() {
        pixel.0.swap(0, 2);
    }
}
