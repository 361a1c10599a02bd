pub mod engine;
pub mod extractor;

pub use engine::{MockOcrEngine, OcrEngine, TesseractCli};
pub use extractor::{FrameText, TextExtractor};
