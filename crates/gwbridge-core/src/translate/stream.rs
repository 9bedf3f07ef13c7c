//! Gateway SSE stream -> `chat.completion.chunk` stream.
//!
//! [`StreamTranslator`] is the per-request state machine: it is fed one SSE
//! line at a time, keeps the running token total and decides what to emit.
//! [`spawn_stream_translator`] runs it on its own task against the gateway
//! body and hands chunks to the relay over a rendezvous channel, so the
//! translator never gets ahead of the client.
//!
//! ```text
//! Open -> Consuming -> (Emitting)* -> Terminal { Success | Error | Cancelled }
//! ```

use futures_util::StreamExt;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::{ChatCompletionChunk, GatewayStreamChunk, Usage};
use crate::error::CoreError;
use crate::ids::IdGenerator;
use crate::ports::GatewayBody;

use super::sse::SseLineFramer;
use super::unix_now;

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

/// How a stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// `[DONE]` seen and the terminal chunk produced.
    Success,
    /// The gateway connection failed or ended early.
    Error,
    /// The client went away.
    Cancelled,
}

/// Lifecycle of one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Created, no input seen yet.
    Open,
    /// At least one line consumed.
    Consuming,
    Terminal(Termination),
}

/// Outcome of feeding one line to the translator.
#[derive(Debug)]
pub enum LineEvent {
    /// Not a `data:` line, or the stream is already terminal.
    Ignored,
    /// A data chunk to emit; `finish_reason` is empty.
    Chunk(ChatCompletionChunk),
    /// The terminal chunk; the stream is now `Terminal(Success)`.
    Finished(ChatCompletionChunk),
    /// The payload did not parse. Nothing to emit, keep consuming.
    Malformed(CoreError),
}

/// Per-request translation state.
#[derive(Debug)]
pub struct StreamTranslator {
    id: String,
    model: String,
    total_tokens: u32,
    emitted: usize,
    state: StreamState,
}

impl StreamTranslator {
    /// Allocate the stream id that every chunk will share.
    pub fn new(model: impl Into<String>, ids: &dyn IdGenerator) -> Self {
        Self {
            id: ids.next_id(),
            model: model.into(),
            total_tokens: 0,
            emitted: 0,
            state: StreamState::Open,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub const fn state(&self) -> StreamState {
        self.state
    }

    /// Tokens accumulated from the chunks seen so far.
    pub const fn total_tokens(&self) -> u32 {
        self.total_tokens
    }

    /// Chunks produced so far, terminal chunk included.
    pub const fn emitted(&self) -> usize {
        self.emitted
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self.state, StreamState::Terminal(_))
    }

    /// Feed one SSE line (without its line terminator).
    pub fn on_line(&mut self, line: &str) -> LineEvent {
        if self.is_terminal() {
            return LineEvent::Ignored;
        }
        self.state = StreamState::Consuming;

        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
            return LineEvent::Ignored;
        };

        if payload.trim() == DONE_SENTINEL {
            self.state = StreamState::Terminal(Termination::Success);
            self.emitted += 1;
            return LineEvent::Finished(ChatCompletionChunk::terminal(
                self.id.clone(),
                unix_now(),
                self.model.clone(),
                Usage::total(self.total_tokens),
            ));
        }

        match serde_json::from_str::<GatewayStreamChunk>(payload) {
            Ok(chunk) => {
                self.total_tokens = self.total_tokens.saturating_add(chunk.tokens_used);
                self.emitted += 1;
                LineEvent::Chunk(self.translate_chunk(chunk))
            }
            Err(e) => LineEvent::Malformed(CoreError::StreamFrame(e.to_string())),
        }
    }

    /// Map one gateway chunk onto an OpenAI delta under this stream's id.
    pub fn translate_chunk(&self, chunk: GatewayStreamChunk) -> ChatCompletionChunk {
        ChatCompletionChunk::delta(self.id.clone(), unix_now(), self.model.clone(), chunk.chunk)
    }

    /// Move to `Terminal(Cancelled)` unless already terminal.
    pub fn cancel(&mut self) {
        if !self.is_terminal() {
            self.state = StreamState::Terminal(Termination::Cancelled);
        }
    }

    /// Move to `Terminal(Error)` unless already terminal.
    pub fn fail(&mut self) {
        if !self.is_terminal() {
            self.state = StreamState::Terminal(Termination::Error);
        }
    }
}

/// Consumer side of a running stream translation.
///
/// `chunks` closes when the translator task exits. `errors` then resolves
/// with the reason the stream ended early, or with `RecvError` when it ended
/// with the terminal chunk.
#[derive(Debug)]
pub struct TranslatedStream {
    pub id: String,
    pub chunks: flume::Receiver<ChatCompletionChunk>,
    pub errors: oneshot::Receiver<CoreError>,
    pub task: JoinHandle<()>,
}

/// Start translating `body` on a new task.
///
/// Cancelling `cancel` stops the task within one read or write step and drops
/// the gateway body. Dropping the chunk receiver has the same effect at the
/// next write.
pub fn spawn_stream_translator(
    body: GatewayBody,
    model: impl Into<String>,
    ids: &dyn IdGenerator,
    cancel: CancellationToken,
) -> TranslatedStream {
    let translator = StreamTranslator::new(model, ids);
    let id = translator.id().to_string();
    let (chunk_tx, chunk_rx) = flume::bounded(0);
    let (error_tx, error_rx) = oneshot::channel();

    let worker = StreamWorker {
        body,
        framer: SseLineFramer::new(),
        translator,
        chunks: chunk_tx,
        cancel,
    };

    let task = tokio::spawn(async move {
        let mut worker = worker;
        let outcome = worker.drive().await;
        let stream_id = worker.translator.id.clone();
        let emitted = worker.translator.emitted;
        let total_tokens = worker.translator.total_tokens;

        // Releases the gateway connection and closes the chunk channel.
        drop(worker);

        match outcome {
            Ok(()) => debug!(%stream_id, emitted, total_tokens, "Stream completed"),
            Err(err) => {
                debug!(%stream_id, emitted, "Stream ended early: {err}");
                // Receiver may already be gone; nobody to tell then.
                let _ = error_tx.send(err);
            }
        }
    });

    TranslatedStream {
        id,
        chunks: chunk_rx,
        errors: error_rx,
        task,
    }
}

struct StreamWorker {
    body: GatewayBody,
    framer: SseLineFramer,
    translator: StreamTranslator,
    chunks: flume::Sender<ChatCompletionChunk>,
    cancel: CancellationToken,
}

impl StreamWorker {
    async fn drive(&mut self) -> Result<(), CoreError> {
        loop {
            let next = tokio::select! {
                biased;
                () = self.cancel.cancelled() => None,
                next = self.body.next() => Some(next),
            };

            match next {
                None => return Err(self.cancelled()),
                Some(Some(Ok(bytes))) => self.framer.push(&bytes),
                Some(Some(Err(err))) => {
                    return Err(self.failed(match err {
                        err @ CoreError::StreamFatal(_) => err,
                        other => CoreError::StreamFatal(other.to_string()),
                    }));
                }
                Some(None) => {
                    let tail = self.framer.finish().map_err(|e| self.failed(e))?;
                    if let Some(line) = tail {
                        if self.handle_line(&line).await? {
                            return Ok(());
                        }
                    }
                    return Err(self.failed(CoreError::StreamFatal(
                        "gateway stream ended before [DONE]".to_string(),
                    )));
                }
            }

            while let Some(line) = self.framer.next_line().map_err(|e| self.failed(e))? {
                if self.handle_line(&line).await? {
                    return Ok(());
                }
            }
        }
    }

    /// Returns `Ok(true)` once the terminal chunk has been delivered.
    async fn handle_line(&mut self, line: &str) -> Result<bool, CoreError> {
        match self.translator.on_line(line) {
            LineEvent::Ignored => Ok(false),
            LineEvent::Malformed(err) => {
                warn!(stream_id = %self.translator.id, "Skipping gateway event: {err}");
                Ok(false)
            }
            LineEvent::Chunk(chunk) => {
                self.emit(chunk).await?;
                Ok(false)
            }
            LineEvent::Finished(chunk) => {
                self.emit(chunk).await?;
                Ok(true)
            }
        }
    }

    async fn emit(&mut self, chunk: ChatCompletionChunk) -> Result<(), CoreError> {
        let delivered = tokio::select! {
            biased;
            () = self.cancel.cancelled() => false,
            sent = self.chunks.send_async(chunk) => sent.is_ok(),
        };

        if delivered {
            Ok(())
        } else {
            Err(self.cancelled())
        }
    }

    fn failed(&mut self, err: CoreError) -> CoreError {
        self.translator.fail();
        err
    }

    fn cancelled(&mut self) -> CoreError {
        self.translator.cancel();
        CoreError::Cancelled
    }
}
