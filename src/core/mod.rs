pub mod aggregate;
pub mod error;
pub mod ocr;
pub mod pipeline;
pub mod video;

pub use error::{PipelineError, Result};
