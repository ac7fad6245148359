// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{fmt::{Debug, Formatter},
          sync::{Arc, Mutex as StdMutex},
          time::Duration};

use futures_util::StreamExt;
use strum_macros::Display;
use tokio::task::JoinHandle;

use super::{CompletionRequest, CompletionTransport, ProviderEndpoint, SseFrame,
            SseFrameDecoder};
use crate::{DEBUG_GENERATION_MOD, GenerationToken, StreamError, lock_or_recover};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Pending,
    Streaming,
    Completed,
    Cancelled,
    Failed,
}

impl SessionState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Cancelled | SessionState::Failed
        )
    }
}

pub type OnChunk = Arc<dyn Fn(usize, &str, &str) + Send + Sync>;
pub type OnDone = Arc<dyn Fn(usize, &str) + Send + Sync>;
pub type OnError = Arc<dyn Fn(usize, &StreamError) + Send + Sync>;

/// Callbacks get the session id first. [`OnChunk`] gets the delta and then the
/// accumulated text so far.
///
/// Callbacks run while the session's state lock is held. That is what makes
/// [`StreamSession::cancel`] a hard barrier (no callback runs after it returns), and it
/// means callbacks must not call back into the same session.
#[derive(Clone)]
pub struct SessionCallbacks {
    pub on_chunk: OnChunk,
    pub on_done: OnDone,
    pub on_error: OnError,
}

impl Debug for SessionCallbacks {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCallbacks").finish_non_exhaustive()
    }
}

impl SessionCallbacks {
    #[must_use]
    pub fn noop() -> Self {
        Self {
            on_chunk: Arc::new(|_, _, _| {}),
            on_done: Arc::new(|_, _| {}),
            on_error: Arc::new(|_, _| {}),
        }
    }
}

/// One cancellable streaming completion. Cheap to clone; all clones share state.
///
/// `accumulated_text` only grows while the state is [`SessionState::Streaming`], and is
/// frozen once the state is terminal. Chunks that arrive after that are dropped.
#[derive(Debug, Clone)]
pub struct StreamSession {
    id: usize,
    prompt_variant: String,
    temperature_offset: f32,
    token: GenerationToken,
    shared: Arc<StdMutex<SessionShared>>,
}

#[derive(Debug)]
struct SessionShared {
    state: SessionState,
    accumulated_text: String,
    error: Option<StreamError>,
}

/// Returned by [`StreamSession::start`].
#[derive(Debug)]
pub struct SessionHandle {
    pub session: StreamSession,
    pub join_handle: JoinHandle<SessionState>,
}

impl SessionHandle {
    pub fn cancel(&self) { self.session.cancel(); }
}

impl StreamSession {
    #[must_use]
    pub fn new(
        id: usize,
        prompt_variant: String,
        temperature_offset: f32,
        token: GenerationToken,
    ) -> Self {
        Self {
            id,
            prompt_variant,
            temperature_offset,
            token,
            shared: Arc::new(StdMutex::new(SessionShared {
                state: SessionState::Pending,
                accumulated_text: String::new(),
                error: None,
            })),
        }
    }

    #[must_use]
    pub fn id(&self) -> usize { self.id }

    #[must_use]
    pub fn prompt_variant(&self) -> &str { &self.prompt_variant }

    #[must_use]
    pub fn temperature_offset(&self) -> f32 { self.temperature_offset }

    #[must_use]
    pub fn generation(&self) -> u64 { self.token.generation() }

    #[must_use]
    pub fn state(&self) -> SessionState { lock_or_recover!(self.shared).state }

    #[must_use]
    pub fn accumulated_text(&self) -> String {
        lock_or_recover!(self.shared).accumulated_text.clone()
    }

    #[must_use]
    pub fn error(&self) -> Option<StreamError> { lock_or_recover!(self.shared).error.clone() }

    /// Abort the transfer. A session that is not yet terminal becomes
    /// [`SessionState::Cancelled`], and no callback fires after this returns. Idempotent.
    pub fn cancel(&self) {
        {
            let mut shared = lock_or_recover!(self.shared);
            if !shared.state.is_terminal() {
                shared.state = SessionState::Cancelled;
            }
        }
        self.token.cancel();
    }

    /// Spawn [`run`](Self::run) on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn start(
        &self,
        transport: Arc<dyn CompletionTransport>,
        endpoint: ProviderEndpoint,
        request: CompletionRequest,
        callbacks: SessionCallbacks,
    ) -> SessionHandle {
        let session = self.clone();
        let join_handle = tokio::spawn(async move {
            session
                .run(
                    transport.as_ref(),
                    &endpoint,
                    &request,
                    Duration::ZERO,
                    &callbacks,
                )
                .await
        });
        SessionHandle {
            session: self.clone(),
            join_handle,
        }
    }

    /// Wait `start_delay`, open the stream, and feed frames to the callbacks until the
    /// stream ends, fails, or the session is cancelled. Returns the terminal state.
    pub async fn run(
        &self,
        transport: &dyn CompletionTransport,
        endpoint: &ProviderEndpoint,
        request: &CompletionRequest,
        start_delay: Duration,
        callbacks: &SessionCallbacks,
    ) -> SessionState {
        if !start_delay.is_zero() {
            tokio::select! {
                () = self.token.cancelled() => return self.mark_cancelled(),
                () = tokio::time::sleep(start_delay) => {}
            }
        }

        let open_result = tokio::select! {
            () = self.token.cancelled() => return self.mark_cancelled(),
            it = transport.open_stream(endpoint, request) => it,
        };
        let mut byte_stream = match open_result {
            Ok(it) => it,
            Err(error) => return self.fail(error, callbacks),
        };

        if !self.mark_streaming() {
            return self.state();
        }

        let mut decoder = SseFrameDecoder::new();
        loop {
            let next = tokio::select! {
                biased;
                () = self.token.cancelled() => return self.mark_cancelled(),
                it = byte_stream.next() => it,
            };

            match next {
                Some(Ok(bytes)) => {
                    for frame in decoder.push(&bytes) {
                        if let Some(terminal) = self.apply_frame(frame, callbacks) {
                            return terminal;
                        }
                    }
                }
                Some(Err(error)) => return self.fail(error, callbacks),
                None => {
                    for frame in decoder.finish() {
                        if let Some(terminal) = self.apply_frame(frame, callbacks) {
                            return terminal;
                        }
                    }
                    return self.complete(callbacks);
                }
            }
        }
    }

    /// Returns the terminal state if `frame` ended the session.
    fn apply_frame(
        &self,
        frame: SseFrame,
        callbacks: &SessionCallbacks,
    ) -> Option<SessionState> {
        match frame {
            SseFrame::Delta(delta) => {
                let mut shared = lock_or_recover!(self.shared);
                if shared.state != SessionState::Streaming {
                    return Some(shared.state);
                }
                shared.accumulated_text.push_str(&delta);
                (callbacks.on_chunk)(self.id, &delta, &shared.accumulated_text);
                None
            }
            SseFrame::Done => Some(self.complete(callbacks)),
            SseFrame::ProviderError(message) => {
                Some(self.fail(StreamError::Provider(message), callbacks))
            }
            SseFrame::Skipped => None,
        }
    }

    fn mark_streaming(&self) -> bool {
        let mut shared = lock_or_recover!(self.shared);
        if shared.state == SessionState::Pending {
            shared.state = SessionState::Streaming;
        }
        shared.state == SessionState::Streaming
    }

    fn mark_cancelled(&self) -> SessionState {
        let mut shared = lock_or_recover!(self.shared);
        if !shared.state.is_terminal() {
            shared.state = SessionState::Cancelled;
        }
        shared.state
    }

    /// A stream that ends without any content is a failure, not a completion.
    fn complete(&self, callbacks: &SessionCallbacks) -> SessionState {
        let mut shared = lock_or_recover!(self.shared);
        if shared.state.is_terminal() {
            return shared.state;
        }

        if shared.accumulated_text.trim().is_empty() {
            let error = StreamError::EmptyCompletion;
            shared.state = SessionState::Failed;
            (callbacks.on_error)(self.id, &error);
            shared.error = Some(error);
        } else {
            shared.state = SessionState::Completed;
            (callbacks.on_done)(self.id, &shared.accumulated_text);
        }

        DEBUG_GENERATION_MOD.then(|| {
            // % is Display, ? is Debug.
            tracing::debug!(
                message = "Stream session finished",
                id = %self.id,
                state = %shared.state,
                chars = %shared.accumulated_text.chars().count()
            );
        });

        shared.state
    }

    /// Cancellation is routed to [`SessionState::Cancelled`] and never reaches
    /// `on_error`.
    fn fail(&self, error: StreamError, callbacks: &SessionCallbacks) -> SessionState {
        if error.is_cancellation() {
            return self.mark_cancelled();
        }

        let mut shared = lock_or_recover!(self.shared);
        if shared.state.is_terminal() {
            return shared.state;
        }

        // % is Display, ? is Debug.
        tracing::error!(message = "Stream session failed", id = %self.id, error = %error);

        shared.state = SessionState::Failed;
        (callbacks.on_error)(self.id, &error);
        shared.error = Some(error);
        shared.state
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{ApiKey, GenerationClock, MockTransport, ScriptedResponse, sse_delta_lines};

    fn endpoint() -> ProviderEndpoint {
        ProviderEndpoint {
            url: "http://localhost/v1/chat/completions".into(),
            api_key: ApiKey::new("test"),
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest::new("gpt-4.1-mini", "prompt".into(), 500, 0.7)
    }

    fn session(id: usize) -> StreamSession {
        StreamSession::new(id, "prompt".into(), 0.0, GenerationClock::new().next_token())
    }

    /// Records every callback as a string, eg: `chunk:Hel:Hel`.
    fn recording_callbacks() -> (SessionCallbacks, Arc<StdMutex<Vec<String>>>) {
        let log = Arc::new(StdMutex::new(vec![]));
        let (a, b, c) = (log.clone(), log.clone(), log.clone());
        let callbacks = SessionCallbacks {
            on_chunk: Arc::new(move |_, delta, acc| {
                a.lock().unwrap().push(format!("chunk:{delta}:{acc}"));
            }),
            on_done: Arc::new(move |_, text| b.lock().unwrap().push(format!("done:{text}"))),
            on_error: Arc::new(move |_, error| {
                c.lock().unwrap().push(format!("error:{error}"));
            }),
        };
        (callbacks, log)
    }

    #[tokio::test]
    async fn test_happy_path_accumulates_chunks() {
        let transport = MockTransport::new(vec![ScriptedResponse::chunks(sse_delta_lines(
            &["Hel", "lo world", "."],
            true,
        ))]);
        let (callbacks, log) = recording_callbacks();
        let session = session(0);

        let state = session
            .run(&transport, &endpoint(), &request(), Duration::ZERO, &callbacks)
            .await;

        assert_eq!(state, SessionState::Completed);
        assert_eq!(session.accumulated_text(), "Hello world.");
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "chunk:Hel:Hel".to_string(),
                "chunk:lo world:Hello world".to_string(),
                "chunk:.:Hello world.".to_string(),
                "done:Hello world.".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_stream_end_without_sentinel_completes() {
        let transport = MockTransport::new(vec![ScriptedResponse::chunks(sse_delta_lines(
            &["partial"],
            false,
        ))]);
        let session = session(0);
        let state = session
            .run(
                &transport,
                &endpoint(),
                &request(),
                Duration::ZERO,
                &SessionCallbacks::noop(),
            )
            .await;
        assert_eq!(state, SessionState::Completed);
        assert_eq!(session.accumulated_text(), "partial");
    }

    #[tokio::test]
    async fn test_garbage_frames_are_skipped() {
        let chunks = vec![
            b"data: {not json}\n\n".to_vec(),
            b": comment\n".to_vec(),
            b"data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n".to_vec(),
            b"data: [DONE]\n".to_vec(),
        ];
        let transport = MockTransport::new(vec![ScriptedResponse::chunks(chunks)]);
        let session = session(0);
        let state = session
            .run(
                &transport,
                &endpoint(),
                &request(),
                Duration::ZERO,
                &SessionCallbacks::noop(),
            )
            .await;
        assert_eq!(state, SessionState::Completed);
        assert_eq!(session.accumulated_text(), "ok");
    }

    #[tokio::test]
    async fn test_only_garbage_is_empty_completion_failure() {
        let transport = MockTransport::new(vec![ScriptedResponse::chunks(vec![
            b"data: {oops\n".to_vec(),
            b"data: [DONE]\n".to_vec(),
        ])]);
        let (callbacks, log) = recording_callbacks();
        let session = session(0);
        let state = session
            .run(&transport, &endpoint(), &request(), Duration::ZERO, &callbacks)
            .await;
        assert_eq!(state, SessionState::Failed);
        assert_eq!(session.error(), Some(StreamError::EmptyCompletion));
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_fails_session() {
        let transport =
            MockTransport::new(vec![ScriptedResponse::fail_open(StreamError::Http {
                status: 401,
            })]);
        let (callbacks, log) = recording_callbacks();
        let session = session(0);
        let state = session
            .run(&transport, &endpoint(), &request(), Duration::ZERO, &callbacks)
            .await;
        assert_eq!(state, SessionState::Failed);
        assert_eq!(session.error(), Some(StreamError::Http { status: 401 }));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["error:Completion provider responded with HTTP status 401".to_string()]
        );
    }

    #[tokio::test]
    async fn test_provider_error_frame_fails_session() {
        let transport = MockTransport::new(vec![ScriptedResponse::chunks(vec![
            b"data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n".to_vec(),
            b"data: {\"error\":{\"message\":\"overloaded\"}}\n".to_vec(),
        ])]);
        let session = session(0);
        let state = session
            .run(
                &transport,
                &endpoint(),
                &request(),
                Duration::ZERO,
                &SessionCallbacks::noop(),
            )
            .await;
        assert_eq!(state, SessionState::Failed);
        assert_eq!(
            session.error(),
            Some(StreamError::Provider("overloaded".into()))
        );
        assert_eq!(session.accumulated_text(), "Hi");
    }

    #[tokio::test]
    async fn test_cancel_mid_stream_suppresses_error_and_freezes_text() {
        let transport = Arc::new(MockTransport::new(vec![
            ScriptedResponse::chunks(sse_delta_lines(&["a", "b", "c", "d"], true))
                .with_delay(Duration::from_millis(20)),
        ]));
        let chunk_count = Arc::new(AtomicUsize::new(0));
        let error_count = Arc::new(AtomicUsize::new(0));
        let callbacks = {
            let chunk_count = chunk_count.clone();
            let error_count = error_count.clone();
            SessionCallbacks {
                on_chunk: Arc::new(move |_, _, _| {
                    chunk_count.fetch_add(1, Ordering::SeqCst);
                }),
                on_done: Arc::new(|_, _| {}),
                on_error: Arc::new(move |_, _| {
                    error_count.fetch_add(1, Ordering::SeqCst);
                }),
            }
        };

        let handle = session(0).start(transport, endpoint(), request(), callbacks);
        while chunk_count.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        handle.cancel();
        let frozen_text = handle.session.accumulated_text();
        let frozen_chunks = chunk_count.load(Ordering::SeqCst);

        let state = handle.join_handle.await.unwrap();

        assert_eq!(state, SessionState::Cancelled);
        assert_eq!(handle.session.accumulated_text(), frozen_text);
        assert_eq!(chunk_count.load(Ordering::SeqCst), frozen_chunks);
        assert_eq!(error_count.load(Ordering::SeqCst), 0);
        assert!(frozen_chunks < 4);
    }

    #[tokio::test]
    async fn test_cancel_during_start_delay() {
        let transport = MockTransport::new(vec![ScriptedResponse::chunks(sse_delta_lines(
            &["never"],
            true,
        ))]);
        let session = session(0);
        let runner = session.clone();
        let task = tokio::spawn(async move {
            runner
                .run(
                    &transport,
                    &endpoint(),
                    &request(),
                    Duration::from_secs(60),
                    &SessionCallbacks::noop(),
                )
                .await
        });
        tokio::task::yield_now().await;
        session.cancel();
        assert_eq!(task.await.unwrap(), SessionState::Cancelled);
        assert_eq!(session.accumulated_text(), "");
    }

    #[test]
    fn test_cancel_after_completion_keeps_completed() {
        let session = session(0);
        {
            let mut shared = session.shared.lock().unwrap();
            shared.state = SessionState::Completed;
            shared.accumulated_text = "done".into();
        }
        session.cancel();
        assert_eq!(session.state(), SessionState::Completed);
        assert_eq!(session.accumulated_text(), "done");
    }
}
