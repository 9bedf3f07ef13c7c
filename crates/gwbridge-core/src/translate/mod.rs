//! The translation engine.
//!
//! - `request`: OpenAI chat request -> gateway request (pure)
//! - `response`: buffered gateway reply -> `chat.completion` (pure)
//! - `sse`: line framing of the gateway byte stream
//! - `stream`: per-request stream state machine and its task

pub mod request;
pub mod response;
pub mod sse;
pub mod stream;

pub use request::translate_request;
pub use response::{decode_sync_result, translate_response, translate_sync_body};
pub use sse::SseLineFramer;
pub use stream::{
    LineEvent, StreamState, StreamTranslator, Termination, TranslatedStream,
    spawn_stream_translator,
};

/// Current wall-clock time in epoch seconds, as OpenAI's `created`.
pub(crate) fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}
