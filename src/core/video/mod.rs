pub mod ffmpeg;
pub mod frame;
pub mod preprocess;
pub mod sampler;

pub use ffmpeg::{Ffmpeg, FrameDecoder, VideoProbe};
pub use frame::{digit_width, Frame, FrameFile, PixelOrder, SampleSchedule};
pub use preprocess::{DebugSink, ImagePreprocessor, PreprocessedImage};
pub use sampler::{clear_frames, list_frames, FrameSampler, SampledFrames, VideoAsset};
