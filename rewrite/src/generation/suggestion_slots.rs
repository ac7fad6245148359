// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The board a UI renders: one slot per session of the current batch. Every mutation is
//! a [`SlotUpdate`] tagged with its generation, and updates from older generations are
//! discarded on arrival.

use crate::{SessionState, StreamError};

pub const FAILED_SLOT_MESSAGE: &str = "Failed to generate suggestion. Please try again.";
pub const CANCELLED_SLOT_MESSAGE: &str = "Cancelled";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotView {
    pub index: usize,
    pub state: SessionState,
    pub text: String,
    pub error: Option<String>,
}

impl SlotView {
    #[must_use]
    pub fn pending(index: usize) -> Self {
        Self {
            index,
            state: SessionState::Pending,
            text: String::new(),
            error: None,
        }
    }

    /// What to show for this slot right now. Partial text wins over the placeholder.
    #[must_use]
    pub fn display_text(&self) -> String {
        match self.state {
            SessionState::Failed => FAILED_SLOT_MESSAGE.to_string(),
            SessionState::Cancelled if self.text.is_empty() => {
                CANCELLED_SLOT_MESSAGE.to_string()
            }
            _ if self.text.is_empty() => format!("Generating suggestion {}...", self.index + 1),
            _ => self.text.clone(),
        }
    }

    /// Only a completed slot can be accepted.
    #[must_use]
    pub fn candidate(&self) -> Option<&str> {
        (self.state == SessionState::Completed).then_some(self.text.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotUpdate {
    BatchStarted {
        generation: u64,
        slot_count: usize,
    },
    Chunk {
        generation: u64,
        index: usize,
        delta: String,
        accumulated: String,
    },
    Completed {
        generation: u64,
        index: usize,
        text: String,
    },
    Failed {
        generation: u64,
        index: usize,
        message: String,
    },
    Cancelled {
        generation: u64,
        index: usize,
    },
    Cleared {
        generation: u64,
    },
}

impl SlotUpdate {
    #[must_use]
    pub fn generation(&self) -> u64 {
        match self {
            SlotUpdate::BatchStarted { generation, .. }
            | SlotUpdate::Chunk { generation, .. }
            | SlotUpdate::Completed { generation, .. }
            | SlotUpdate::Failed { generation, .. }
            | SlotUpdate::Cancelled { generation, .. }
            | SlotUpdate::Cleared { generation } => *generation,
        }
    }

    #[must_use]
    pub fn failed(generation: u64, index: usize, error: &StreamError) -> Self {
        SlotUpdate::Failed {
            generation,
            index,
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionSlots {
    generation: u64,
    slots: Vec<SlotView>,
}

impl SuggestionSlots {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn generation(&self) -> u64 { self.generation }

    #[must_use]
    pub fn slots(&self) -> &[SlotView] { &self.slots }

    #[must_use]
    pub fn slot(&self, index: usize) -> Option<&SlotView> { self.slots.get(index) }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.slots.is_empty() }

    pub fn reset(&mut self, generation: u64, slot_count: usize) {
        self.generation = generation;
        self.slots = (0..slot_count).map(SlotView::pending).collect();
    }

    /// Returns `false` if the update was stale or targeted a slot that is already
    /// terminal, in which case the board is unchanged.
    pub fn apply(&mut self, update: &SlotUpdate) -> bool {
        let generation = update.generation();
        if generation < self.generation {
            return false;
        }

        match update {
            SlotUpdate::BatchStarted {
                generation,
                slot_count,
            } => {
                self.reset(*generation, *slot_count);
                return true;
            }
            SlotUpdate::Cleared { generation } => {
                self.generation = *generation;
                self.slots.clear();
                return true;
            }
            _ => {}
        }

        if generation != self.generation {
            return false;
        }

        match update {
            SlotUpdate::Chunk {
                index, accumulated, ..
            } => self.with_live_slot(*index, |slot| {
                slot.state = SessionState::Streaming;
                slot.text.clone_from(accumulated);
            }),
            SlotUpdate::Completed { index, text, .. } => {
                self.with_live_slot(*index, |slot| {
                    slot.state = SessionState::Completed;
                    slot.text.clone_from(text);
                })
            }
            SlotUpdate::Failed { index, message, .. } => {
                self.with_live_slot(*index, |slot| {
                    slot.state = SessionState::Failed;
                    slot.error = Some(message.clone());
                })
            }
            SlotUpdate::Cancelled { index, .. } => self.with_live_slot(*index, |slot| {
                slot.state = SessionState::Cancelled;
            }),
            SlotUpdate::BatchStarted { .. } | SlotUpdate::Cleared { .. } => false,
        }
    }

    fn with_live_slot(&mut self, index: usize, f: impl FnOnce(&mut SlotView)) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) if !slot.state.is_terminal() => {
                f(slot);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn started(generation: u64, slot_count: usize) -> SuggestionSlots {
        let mut board = SuggestionSlots::new();
        board.apply(&SlotUpdate::BatchStarted {
            generation,
            slot_count,
        });
        board
    }

    fn chunk(generation: u64, index: usize, accumulated: &str) -> SlotUpdate {
        SlotUpdate::Chunk {
            generation,
            index,
            delta: String::new(),
            accumulated: accumulated.into(),
        }
    }

    #[test]
    fn test_placeholders() {
        let board = started(1, 3);
        let texts: Vec<_> = board.slots().iter().map(SlotView::display_text).collect();
        assert_eq!(
            texts,
            vec![
                "Generating suggestion 1...",
                "Generating suggestion 2...",
                "Generating suggestion 3...",
            ]
        );
    }

    #[test]
    fn test_chunks_then_completion() {
        let mut board = started(1, 2);
        assert!(board.apply(&chunk(1, 0, "Hel")));
        assert_eq!(board.slot(0).unwrap().display_text(), "Hel");
        assert!(board.apply(&SlotUpdate::Completed {
            generation: 1,
            index: 0,
            text: "Hello".into(),
        }));
        assert_eq!(board.slot(0).unwrap().candidate(), Some("Hello"));
        assert_eq!(board.slot(1).unwrap().candidate(), None);
    }

    #[test]
    fn test_stale_generation_is_ignored() {
        let mut board = started(1, 1);
        board.apply(&SlotUpdate::BatchStarted {
            generation: 2,
            slot_count: 1,
        });
        assert!(!board.apply(&chunk(1, 0, "old")));
        assert!(!board.apply(&SlotUpdate::BatchStarted {
            generation: 1,
            slot_count: 5,
        }));
        assert_eq!(board.slots().len(), 1);
        assert_eq!(board.slot(0).unwrap().text, "");
    }

    #[test]
    fn test_terminal_slot_is_frozen() {
        let mut board = started(1, 1);
        board.apply(&chunk(1, 0, "part"));
        board.apply(&SlotUpdate::Cancelled {
            generation: 1,
            index: 0,
        });
        assert!(!board.apply(&chunk(1, 0, "partial more")));
        let slot = board.slot(0).unwrap();
        assert_eq!(slot.state, SessionState::Cancelled);
        assert_eq!(slot.display_text(), "part");
    }

    #[test]
    fn test_failure_message() {
        let mut board = started(3, 1);
        board.apply(&SlotUpdate::failed(3, 0, &StreamError::Http { status: 500 }));
        let slot = board.slot(0).unwrap();
        assert_eq!(slot.display_text(), FAILED_SLOT_MESSAGE);
        assert_eq!(
            slot.error.as_deref(),
            Some("Completion provider responded with HTTP status 500")
        );
    }

    #[test]
    fn test_out_of_range_index() {
        let mut board = started(1, 1);
        assert!(!board.apply(&chunk(1, 7, "x")));
    }

    #[test]
    fn test_cleared() {
        let mut board = started(1, 2);
        assert!(board.apply(&SlotUpdate::Cleared { generation: 2 }));
        assert!(board.is_empty());
        assert_eq!(board.generation(), 2);
    }
}
