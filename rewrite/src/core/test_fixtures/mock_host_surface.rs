// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{ops::Range,
          sync::atomic::{AtomicUsize, Ordering}};

use crate::{BufferSurface, DirectMutation, DispatchOutcome, EditCommand, EditingSurface,
            SurfaceAttributes, SurfaceEvent};

/// Attribute the host regenerates on every wipe when
/// [`HostQuirk::ReassertAttributesOnWipe`] is set.
pub const GENERATED_ATTRIBUTE: &str = "data-gen";
/// Attribute the host drops on every wipe when [`HostQuirk::ReassertAttributesOnWipe`]
/// is set.
pub const DROPPED_ATTRIBUTE: &str = "aria-label";

/// Adversarial behaviors of real hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostQuirk {
    /// Every key-down has its default action prevented.
    PreventKeyDefaults,
    /// Every edit command is refused.
    RejectExecCommand,
    /// The select-all command and structural select-all do nothing.
    IgnoreSelectAll,
    /// Insert commands of more than one character are refused.
    RejectBulkInsert,
    /// Deletion of any kind (commands, selection, direct) is silently dropped. Only a wipe
    /// removes content.
    ResistDeletion,
    /// Like [`HostQuirk::ResistDeletion`], and wipes are dropped too.
    Immovable,
    /// A wipe makes the host drop [`DROPPED_ATTRIBUTE`], turn off editing, and regenerate
    /// [`GENERATED_ATTRIBUTE`] with a new value.
    ReassertAttributesOnWipe,
    /// On the first `times` change notifications, the host resyncs from its own stale
    /// model (the text the surface was created with), overwriting the write.
    RevertOnChange { times: usize },
}

/// A [`BufferSurface`] with host quirks layered on top.
#[derive(Debug)]
pub struct MockHostSurface {
    inner: BufferSurface,
    quirks: Vec<HostQuirk>,
    stale_model: String,
    reverts_left: AtomicUsize,
    reverts_done: AtomicUsize,
}

impl MockHostSurface {
    #[must_use]
    pub fn new(initial_text: &str, quirks: &[HostQuirk]) -> Self {
        let reverts_left = quirks
            .iter()
            .find_map(|it| match it {
                HostQuirk::RevertOnChange { times } => Some(*times),
                _ => None,
            })
            .unwrap_or(0);
        Self {
            inner: BufferSurface::new(initial_text),
            quirks: quirks.to_vec(),
            stale_model: initial_text.to_string(),
            reverts_left: AtomicUsize::new(reverts_left),
            reverts_done: AtomicUsize::new(0),
        }
    }

    fn has(&self, quirk: HostQuirk) -> bool { self.quirks.contains(&quirk) }

    fn resists_deletion(&self) -> bool {
        self.has(HostQuirk::ResistDeletion) || self.has(HostQuirk::Immovable)
    }

    #[must_use]
    pub fn text(&self) -> String { self.inner.text() }

    pub fn set_text(&self, text: &str) { self.inner.set_text(text); }

    #[must_use]
    pub fn events(&self) -> Vec<SurfaceEvent> { self.inner.events() }

    #[must_use]
    pub fn selection(&self) -> Range<usize> { self.inner.selection() }

    /// How many times the host overwrote content with its stale model.
    #[must_use]
    pub fn reverts_done(&self) -> usize { self.reverts_done.load(Ordering::SeqCst) }

    fn maybe_revert(&self) {
        let should_revert = self
            .reverts_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |it| it.checked_sub(1))
            .is_ok();
        if should_revert {
            self.inner.set_text(&self.stale_model);
            self.reverts_done.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl EditingSurface for MockHostSurface {
    fn text_content(&self) -> Option<String> { self.inner.text_content() }

    fn rendered_text(&self) -> Option<String> { self.inner.rendered_text() }

    fn markup(&self) -> Option<String> { self.inner.markup() }

    fn dispatch_event(&self, event: &SurfaceEvent) -> DispatchOutcome {
        self.inner.dispatch_event(event);
        match event {
            SurfaceEvent::KeyDown(_) if self.has(HostQuirk::PreventKeyDefaults) => {
                DispatchOutcome::DefaultPrevented
            }
            SurfaceEvent::Change => {
                self.maybe_revert();
                DispatchOutcome::Accepted
            }
            _ => DispatchOutcome::Accepted,
        }
    }

    fn exec_command(&self, command: &EditCommand) -> bool {
        let refused = match command {
            _ if self.has(HostQuirk::RejectExecCommand) => true,
            EditCommand::SelectAll => self.has(HostQuirk::IgnoreSelectAll),
            EditCommand::InsertText(text) => {
                self.has(HostQuirk::RejectBulkInsert) && text.chars().count() > 1
            }
            EditCommand::DeleteBackward | EditCommand::DeleteForward => {
                self.resists_deletion()
            }
            EditCommand::InsertLineBreak => false,
        };
        !refused && self.inner.exec_command(command)
    }

    fn select_all_content(&self) -> bool {
        !self.has(HostQuirk::IgnoreSelectAll) && self.inner.select_all_content()
    }

    fn collapse_selection_to_end(&self) { self.inner.collapse_selection_to_end(); }

    fn delete_selection(&self) -> bool {
        !self.resists_deletion() && self.inner.delete_selection()
    }

    fn mutate_directly(&self, mutation: &DirectMutation) {
        let is_deletion = matches!(
            mutation,
            DirectMutation::RemoveCharBefore | DirectMutation::RemoveCharAfter
        );
        if is_deletion && self.resists_deletion() {
            return;
        }
        self.inner.mutate_directly(mutation);
    }

    fn wipe_content(&self) {
        if self.has(HostQuirk::Immovable) {
            return;
        }
        self.inner.wipe_content();
        if self.has(HostQuirk::ReassertAttributesOnWipe) {
            let next_generation = self
                .inner
                .snapshot_attributes()
                .get(GENERATED_ATTRIBUTE)
                .and_then(|it| it.parse::<u64>().ok())
                .map_or(1, |it| it + 1);
            self.inner
                .set_attribute(GENERATED_ATTRIBUTE, &next_generation.to_string());
            self.inner.remove_attribute(DROPPED_ATTRIBUTE);
            self.inner.set_editable(false);
        }
    }

    fn snapshot_attributes(&self) -> SurfaceAttributes { self.inner.snapshot_attributes() }

    fn set_attribute(&self, name: &str, value: &str) {
        self.inner.set_attribute(name, value);
    }

    fn set_editable(&self, editable: bool) { self.inner.set_editable(editable); }

    fn focus(&self) { self.inner.focus(); }

    fn blur(&self) { self.inner.blur(); }
}
