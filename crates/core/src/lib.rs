pub mod artifact;
pub mod error;
pub mod ffmpeg;
pub mod options;
pub mod providers;
pub mod validation;
