//! HTTP clients for the external services, each implementing one of the
//! provider traits from `autoreel_core::providers`.

mod http;

pub mod elevenlabs;
pub mod openai;
pub mod pika;
pub mod youtube;

pub use http::{build_client, DEFAULT_REQUEST_TIMEOUT};
pub use elevenlabs::ElevenLabsSynthesizer;
pub use openai::OpenAiScriptGenerator;
pub use pika::PikaAnimationService;
pub use youtube::YoutubePublisher;
