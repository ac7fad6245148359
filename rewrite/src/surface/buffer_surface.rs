// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{collections::{BTreeMap, VecDeque},
          ops::Range,
          sync::Mutex as StdMutex};

use super::{DirectMutation, DispatchOutcome, EditCommand, EditingSurface,
            SurfaceAttributes, SurfaceEvent};
use crate::lock_or_recover;

/// Oldest events are dropped past this many.
pub const EVENT_LOG_CAPACITY: usize = 1024;

/// An in-memory, well behaved [`EditingSurface`]. It accepts every event, runs every
/// command while editable, and never reasserts anything. Line breaks are stored as `\n`.
///
/// Used by the `rw` binary as a stand-in surface, and by tests (directly or wrapped in
/// [`crate::MockHostSurface`] to add host quirks).
#[derive(Debug)]
pub struct BufferSurface {
    state: StdMutex<BufferState>,
}

#[derive(Debug)]
struct BufferState {
    content: Vec<char>,
    /// Char indices into `content`. Collapsed when `start == end`.
    selection: Range<usize>,
    attributes: SurfaceAttributes,
    has_focus: bool,
    event_log: VecDeque<SurfaceEvent>,
}

impl Default for BufferSurface {
    fn default() -> Self { Self::new("") }
}

impl BufferSurface {
    /// New editable surface holding `text`, caret at the end.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let content: Vec<char> = text.chars().collect();
        let end = content.len();
        let mut entries = BTreeMap::new();
        entries.insert("role".to_string(), "textbox".to_string());
        entries.insert("aria-multiline".to_string(), "true".to_string());
        Self {
            state: StdMutex::new(BufferState {
                content,
                selection: end..end,
                attributes: SurfaceAttributes {
                    editable: true,
                    entries,
                },
                has_focus: false,
                event_log: VecDeque::new(),
            }),
        }
    }

    #[must_use]
    pub fn text(&self) -> String { lock_or_recover!(self.state).content.iter().collect() }

    /// Overwrite the content without any events, as the host itself would.
    pub fn set_text(&self, text: &str) {
        let mut state = lock_or_recover!(self.state);
        state.content = text.chars().collect();
        let end = state.content.len();
        state.selection = end..end;
    }

    #[must_use]
    pub fn selection(&self) -> Range<usize> { lock_or_recover!(self.state).selection.clone() }

    #[must_use]
    pub fn has_focus(&self) -> bool { lock_or_recover!(self.state).has_focus }

    #[must_use]
    pub fn is_editable(&self) -> bool { lock_or_recover!(self.state).attributes.editable }

    #[must_use]
    pub fn events(&self) -> Vec<SurfaceEvent> {
        lock_or_recover!(self.state).event_log.iter().cloned().collect()
    }

    pub fn clear_events(&self) { lock_or_recover!(self.state).event_log.clear(); }

    /// Remove an attribute, as a host regenerating its markup might.
    pub fn remove_attribute(&self, name: &str) {
        lock_or_recover!(self.state).attributes.entries.remove(name);
    }

    fn render_markup(content: &[char]) -> String {
        let text: String = content.iter().collect();
        text.split('\n')
            .map(|line| {
                if line.is_empty() {
                    "<p><br></p>".to_string()
                } else {
                    format!("<p>{}</p>", escape(line))
                }
            })
            .collect()
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

impl BufferState {
    fn replace_selection(&mut self, text: &str) {
        let Range { start, end } = self.selection.clone();
        let tail = self.content.split_off(end);
        self.content.truncate(start);
        self.content.extend(text.chars());
        let caret = self.content.len();
        self.content.extend(tail);
        self.selection = caret..caret;
    }

    /// Returns `false` when there was nothing to remove.
    fn remove_before(&mut self) -> bool {
        if !self.selection.is_empty() {
            self.replace_selection("");
            return true;
        }
        let caret = self.selection.start;
        if caret == 0 {
            return false;
        }
        self.content.remove(caret - 1);
        self.selection = caret - 1..caret - 1;
        true
    }

    fn remove_after(&mut self) -> bool {
        if !self.selection.is_empty() {
            self.replace_selection("");
            return true;
        }
        let caret = self.selection.start;
        if caret >= self.content.len() {
            return false;
        }
        self.content.remove(caret);
        true
    }

    fn clamp_selection(&mut self) {
        let len = self.content.len();
        self.selection = self.selection.start.min(len)..self.selection.end.min(len);
    }
}

impl EditingSurface for BufferSurface {
    fn text_content(&self) -> Option<String> { Some(self.text()) }

    fn rendered_text(&self) -> Option<String> { Some(self.text()) }

    fn markup(&self) -> Option<String> {
        Some(Self::render_markup(&lock_or_recover!(self.state).content))
    }

    fn dispatch_event(&self, event: &SurfaceEvent) -> DispatchOutcome {
        let mut state = lock_or_recover!(self.state);
        if state.event_log.len() >= EVENT_LOG_CAPACITY {
            state.event_log.pop_front();
        }
        state.event_log.push_back(event.clone());
        DispatchOutcome::Accepted
    }

    fn exec_command(&self, command: &EditCommand) -> bool {
        let mut state = lock_or_recover!(self.state);
        if !state.attributes.editable {
            return false;
        }
        state.clamp_selection();
        match command {
            EditCommand::InsertText(text) => state.replace_selection(text),
            EditCommand::InsertLineBreak => state.replace_selection("\n"),
            EditCommand::DeleteBackward => {
                state.remove_before();
            }
            EditCommand::DeleteForward => {
                state.remove_after();
            }
            EditCommand::SelectAll => state.selection = 0..state.content.len(),
        }
        true
    }

    fn select_all_content(&self) -> bool {
        let mut state = lock_or_recover!(self.state);
        state.selection = 0..state.content.len();
        true
    }

    fn collapse_selection_to_end(&self) {
        let mut state = lock_or_recover!(self.state);
        let end = state.content.len();
        state.selection = end..end;
    }

    fn delete_selection(&self) -> bool {
        let mut state = lock_or_recover!(self.state);
        state.clamp_selection();
        if state.selection.is_empty() {
            return false;
        }
        state.replace_selection("");
        true
    }

    fn mutate_directly(&self, mutation: &DirectMutation) {
        let mut state = lock_or_recover!(self.state);
        state.clamp_selection();
        match mutation {
            DirectMutation::InsertTextNode(text) => state.replace_selection(text),
            DirectMutation::InsertLineBreakNode => state.replace_selection("\n"),
            DirectMutation::RemoveCharBefore => {
                state.remove_before();
            }
            DirectMutation::RemoveCharAfter => {
                state.remove_after();
            }
        }
    }

    fn wipe_content(&self) {
        let mut state = lock_or_recover!(self.state);
        state.content.clear();
        state.selection = 0..0;
    }

    fn snapshot_attributes(&self) -> SurfaceAttributes {
        lock_or_recover!(self.state).attributes.clone()
    }

    fn set_attribute(&self, name: &str, value: &str) {
        lock_or_recover!(self.state)
            .attributes
            .entries
            .insert(name.to_string(), value.to_string());
    }

    fn set_editable(&self, editable: bool) {
        lock_or_recover!(self.state).attributes.editable = editable;
    }

    fn focus(&self) { lock_or_recover!(self.state).has_focus = true; }

    fn blur(&self) { lock_or_recover!(self.state).has_focus = false; }
}
