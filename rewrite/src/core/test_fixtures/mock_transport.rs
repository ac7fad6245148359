// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{fmt::{Debug, Formatter},
          sync::{Arc, Mutex as StdMutex,
                 atomic::{AtomicUsize, Ordering}},
          time::Duration};

use async_trait::async_trait;

use super::gen_chunk_stream_with_delay;
use crate::{ByteChunkStream, CompletionRequest, CompletionTransport, ProviderEndpoint,
            StreamError, lock_or_recover};

/// What a [`MockTransport`] does for one call to `open_stream`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScriptedResponse {
    pub chunks: Vec<Vec<u8>>,
    /// Applied before every chunk.
    pub chunk_delay: Duration,
    /// Returned from `open_stream` instead of a stream.
    pub open_error: Option<StreamError>,
    /// Yielded after the last chunk.
    pub trailing_error: Option<StreamError>,
}

impl ScriptedResponse {
    #[must_use]
    pub fn chunks(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            chunks,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn fail_open(error: StreamError) -> Self {
        Self {
            open_error: Some(error),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    #[must_use]
    pub fn then_fail(mut self, error: StreamError) -> Self {
        self.trailing_error = Some(error);
        self
    }
}

/// Picks the response for the `n`th (zero based) call to `open_stream`.
pub type Responder = Arc<dyn Fn(usize, &CompletionRequest) -> ScriptedResponse + Send + Sync>;

/// Scripted [`CompletionTransport`] that also records every request it receives.
#[derive(Clone)]
pub struct MockTransport {
    responder: Responder,
    open_count: Arc<AtomicUsize>,
    requests: Arc<StdMutex<Vec<CompletionRequest>>>,
}

impl Debug for MockTransport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("open_count", &self.open_count())
            .finish_non_exhaustive()
    }
}

impl MockTransport {
    /// Responses are handed out in call order. Once they run out, the last one repeats;
    /// an empty list yields streams without any chunks.
    #[must_use]
    pub fn new(responses: Vec<ScriptedResponse>) -> Self {
        Self::with_responder(Arc::new(move |index, _| {
            responses
                .get(index)
                .or_else(|| responses.last())
                .cloned()
                .unwrap_or_default()
        }))
    }

    #[must_use]
    pub fn with_responder(responder: Responder) -> Self {
        Self {
            responder,
            open_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(StdMutex::new(vec![])),
        }
    }

    #[must_use]
    pub fn open_count(&self) -> usize { self.open_count.load(Ordering::SeqCst) }

    #[must_use]
    pub fn requests(&self) -> Vec<CompletionRequest> { lock_or_recover!(self.requests).clone() }
}

#[async_trait]
impl CompletionTransport for MockTransport {
    async fn open_stream(
        &self,
        _endpoint: &ProviderEndpoint,
        request: &CompletionRequest,
    ) -> Result<ByteChunkStream, StreamError> {
        let index = self.open_count.fetch_add(1, Ordering::SeqCst);
        lock_or_recover!(self.requests).push(request.clone());

        let response = (self.responder)(index, request);
        if let Some(error) = response.open_error {
            return Err(error);
        }
        Ok(gen_chunk_stream_with_delay(
            response.chunks,
            response.chunk_delay,
            response.trailing_error,
        ))
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ApiKey;

    fn endpoint() -> ProviderEndpoint {
        ProviderEndpoint {
            url: "http://localhost".into(),
            api_key: ApiKey::new("k"),
        }
    }

    #[tokio::test]
    async fn test_responses_in_order_then_last_repeats() {
        let transport = MockTransport::new(vec![
            ScriptedResponse::chunks(vec![b"one".to_vec()]),
            ScriptedResponse::fail_open(StreamError::Http { status: 500 }),
        ]);
        let request = CompletionRequest::new("m", "p".into(), 10, 0.5);

        let mut first = transport.open_stream(&endpoint(), &request).await.unwrap();
        assert_eq!(first.next().await, Some(Ok(b"one".to_vec())));

        for _ in 0..2 {
            let result = transport.open_stream(&endpoint(), &request).await;
            assert_eq!(result.err(), Some(StreamError::Http { status: 500 }));
        }

        assert_eq!(transport.open_count(), 3);
        assert_eq!(transport.requests().len(), 3);
        assert_eq!(transport.requests()[0].prompt(), "p");
    }
}
