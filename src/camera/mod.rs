pub mod ffmpeg_source;
pub mod jpeg;
pub mod pipeline;
pub mod redact;
pub mod service;
pub mod traits;
