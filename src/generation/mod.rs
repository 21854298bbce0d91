pub mod client;
pub mod request;

pub use client::{decode_text_stream, GenerationBackend, HttpGenerationBackend, TextStream};
pub use request::{CancelHandle, GenerationHooks, GenerationRequest, GenerationState, Generator};
