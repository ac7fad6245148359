// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Decoder for the provider's server-sent-events stream. Each event is one line:
//!
//! ```text
//! data: {"choices":[{"delta":{"content":"Hel"}}]}
//! data: {"choices":[{"delta":{"content":"lo"}}]}
//! data: [DONE]
//! ```
//!
//! Network chunks split lines (and even UTF-8 sequences) at arbitrary byte offsets, so
//! bytes are buffered until a full line is available.

use serde::Deserialize;
use smallvec::SmallVec;

pub const DATA_PREFIX: &str = "data:";
pub const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseFrame {
    Delta(String),
    Done,
    ProviderError(String),
    /// A `data:` line that carried no content: unparsable JSON, a role-only delta, or an
    /// empty string.
    Skipped,
}

pub type SseFrames = SmallVec<[SseFrame; 4]>;

#[derive(Debug, Default)]
pub struct SseFrameDecoder {
    buffer: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct ChunkPayload {
    #[serde(default)]
    choices: Vec<ChoicePayload>,
    error: Option<ErrorPayload>,
}

#[derive(Debug, Deserialize)]
struct ChoicePayload {
    #[serde(default)]
    delta: DeltaPayload,
}

#[derive(Debug, Default, Deserialize)]
struct DeltaPayload {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    message: Option<String>,
}

impl SseFrameDecoder {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Feed one network chunk, returning the frames of every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> SseFrames {
        self.buffer.extend_from_slice(chunk);

        let mut frames = SseFrames::new();
        while let Some(newline_index) = self.buffer.iter().position(|it| *it == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline_index).collect();
            if let Some(frame) = parse_line(&String::from_utf8_lossy(&line)) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Flush a final line that had no trailing newline.
    pub fn finish(&mut self) -> SseFrames {
        let rest = std::mem::take(&mut self.buffer);
        parse_line(&String::from_utf8_lossy(&rest))
            .into_iter()
            .collect()
    }
}

/// `None` for lines that aren't `data:` events (blank separators, comments, `event:`).
#[must_use]
pub fn parse_line(line: &str) -> Option<SseFrame> {
    let payload = line
        .trim_end_matches(['\r', '\n'])
        .strip_prefix(DATA_PREFIX)?
        .trim();

    if payload == DONE_SENTINEL {
        return Some(SseFrame::Done);
    }

    let Ok(chunk) = serde_json::from_str::<ChunkPayload>(payload) else {
        return Some(SseFrame::Skipped);
    };

    if let Some(error) = chunk.error {
        return Some(SseFrame::ProviderError(
            error
                .message
                .unwrap_or_else(|| "unknown provider error".to_string()),
        ));
    }

    match chunk.choices.into_iter().next().and_then(|it| it.delta.content) {
        Some(content) if !content.is_empty() => Some(SseFrame::Delta(content)),
        _ => Some(SseFrame::Skipped),
    }
}
