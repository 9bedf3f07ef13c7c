//! Relay of translated chunks onto the client's SSE response.
//!
//! Each chunk is written as one `data: <json>\n\n` event. After the terminal
//! chunk the relay writes `data: [DONE]\n\n` and records usage. If the stream
//! ends any other way the response simply ends. The relay owns a drop guard
//! on the translator's cancellation token, so a client that disconnects
//! stops the translator and releases the gateway connection.

use std::convert::Infallible;

use bytes::{BufMut, Bytes, BytesMut};
use futures_util::Stream;
use futures_util::stream;
use gwbridge_core::ChatCompletionChunk;
use gwbridge_core::translate::TranslatedStream;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, error};

use crate::usage::UsageRecorder;

pub const DONE_EVENT: &[u8] = b"data: [DONE]\n\n";

struct Relay {
    stream: TranslatedStream,
    usage: UsageRecorder,
    finished: bool,
    _cancel_on_drop: DropGuard,
}

/// Encode one chunk as an SSE `data:` event.
pub fn encode_event(chunk: &ChatCompletionChunk) -> Result<BytesMut, serde_json::Error> {
    let json = serde_json::to_vec(chunk)?;
    let mut frame = BytesMut::with_capacity(json.len() + 8);
    frame.put_slice(b"data: ");
    frame.put_slice(&json);
    frame.put_slice(b"\n\n");
    Ok(frame)
}

/// Turn a running translation into SSE body frames.
pub fn relay_body(
    stream: TranslatedStream,
    usage: UsageRecorder,
    cancel: CancellationToken,
) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
    let relay = Relay {
        stream,
        usage,
        finished: false,
        _cancel_on_drop: cancel.drop_guard(),
    };

    stream::unfold(relay, |mut relay| async move {
        if relay.finished {
            return None;
        }

        let Ok(chunk) = relay.stream.chunks.recv_async().await else {
            // Channel closed before the terminal chunk.
            match relay.stream.errors.await {
                Ok(err) if err.is_cancellation() => debug!(id = %relay.stream.id, "Stream cancelled"),
                Ok(err) => error!(id = %relay.stream.id, "Stream aborted: {err}"),
                Err(_) => {}
            }
            return None;
        };

        let mut frame = match encode_event(&chunk) {
            Ok(frame) => frame,
            Err(e) => {
                error!(id = %relay.stream.id, "Failed to encode chunk: {e}");
                return None;
            }
        };

        if chunk.is_terminal() {
            frame.put_slice(DONE_EVENT);
            relay.finished = true;
            if let Some(usage) = chunk.usage {
                relay.usage.record(usage.total_tokens);
            }
        }

        Some((Ok(frame.freeze()), relay))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Caller;
    use futures_util::StreamExt;
    use gwbridge_core::translate::spawn_stream_translator;
    use gwbridge_core::{CoreError, GatewayBody, UuidIdGenerator};
    use tokio_test::{assert_pending, task};

    fn anonymous() -> UsageRecorder {
        UsageRecorder::new(None, &Caller::Anonymous)
    }

    fn gateway_body(raw: &'static str) -> GatewayBody {
        stream::iter(vec![Ok::<_, CoreError>(Bytes::from_static(raw.as_bytes()))]).boxed()
    }

    async fn collect_text(body: GatewayBody) -> String {
        let cancel = CancellationToken::new();
        let translated = spawn_stream_translator(body, "m", &UuidIdGenerator, cancel.clone());
        let frames: Vec<_> = relay_body(translated, anonymous(), cancel).collect().await;
        frames
            .into_iter()
            .map(|f| String::from_utf8(f.unwrap().to_vec()).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_relay_writes_events_and_done() {
        let text = collect_text(gateway_body(
            "data: {\"chunk\":\"Hi\",\"tokens_used\":2}\n\ndata: [DONE]\n\n",
        ))
        .await;

        let events: Vec<&str> = text.split("\n\n").filter(|e| !e.is_empty()).collect();
        assert_eq!(events.len(), 3);
        assert!(events[0].starts_with("data: {"));
        assert!(events[0].contains("\"content\":\"Hi\""));
        assert!(events[1].contains("\"finish_reason\":\"stop\""));
        assert!(events[1].contains("\"total_tokens\":2"));
        assert_eq!(events[2], "data: [DONE]");
    }

    #[tokio::test]
    async fn test_relay_omits_done_after_failure() {
        let text = collect_text(gateway_body("data: {\"chunk\":\"Hi\",\"tokens_used\":2}\n\n")).await;

        assert!(text.contains("\"content\":\"Hi\""));
        assert!(!text.contains("[DONE]"));
        assert!(!text.contains("\"finish_reason\":\"stop\""));
    }

    #[tokio::test]
    async fn test_dropping_relay_cancels_translator() {
        let cancel = CancellationToken::new();
        let body: GatewayBody = stream::pending().boxed();
        let translated = spawn_stream_translator(body, "m", &UuidIdGenerator, cancel.clone());
        let handle_cancel = cancel.clone();

        let mut relay = task::spawn(relay_body(translated, anonymous(), cancel));
        assert_pending!(relay.poll_next());
        tokio::task::yield_now().await;
        assert_pending!(relay.poll_next());
        assert!(!handle_cancel.is_cancelled());

        drop(relay);
        assert!(handle_cancel.is_cancelled());
    }

    #[test]
    fn test_encode_event_framing() {
        let chunk = ChatCompletionChunk::delta("chatcmpl-1".into(), 0, "m".into(), "x".into());
        let frame = encode_event(&chunk).unwrap();
        assert!(frame.starts_with(b"data: {"));
        assert!(frame.ends_with(b"}\n\n"));
    }
}
