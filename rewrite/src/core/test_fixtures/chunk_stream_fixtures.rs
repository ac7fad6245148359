// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::time::Duration;

use async_stream::stream;

use crate::{ByteChunkStream, DATA_PREFIX, DONE_SENTINEL, StreamError};

/// One complete event stream frame carrying `text` as a content delta, in the shape
/// chat completion providers use.
#[must_use]
pub fn sse_delta_frame(text: &str) -> Vec<u8> {
    let payload = serde_json::json!({ "choices": [ { "delta": { "content": text } } ] });
    format!("{DATA_PREFIX}{payload}\n\n").into_bytes()
}

#[must_use]
pub fn sse_done_frame() -> Vec<u8> { format!("{DATA_PREFIX}{DONE_SENTINEL}\n\n").into_bytes() }

/// One chunk per delta, optionally followed by the terminal sentinel.
#[must_use]
pub fn sse_delta_lines(deltas: &[&str], with_done: bool) -> Vec<Vec<u8>> {
    let mut acc: Vec<Vec<u8>> = deltas.iter().map(|it| sse_delta_frame(it)).collect();
    if with_done {
        acc.push(sse_done_frame());
    }
    acc
}

pub fn gen_chunk_stream(chunks: Vec<Vec<u8>>) -> ByteChunkStream {
    gen_chunk_stream_with_delay(chunks, Duration::ZERO, None)
}

/// Each chunk is preceded by `delay`. When `trailing_error` is set it is yielded after
/// the last chunk.
pub fn gen_chunk_stream_with_delay(
    chunks: Vec<Vec<u8>>,
    delay: Duration,
    trailing_error: Option<StreamError>,
) -> ByteChunkStream {
    let it = stream! {
        for chunk in chunks {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            yield Ok(chunk);
        }
        if let Some(error) = trailing_error {
            yield Err(error);
        }
    };
    Box::pin(it)
}
