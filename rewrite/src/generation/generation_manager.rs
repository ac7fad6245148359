// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Runs one batch of parallel [`StreamSession`]s per suggestion surface and folds their
//! output into a [`SuggestionSlots`] board.
//!
//! ```text
//! start_batch(action, text)
//!   ├─ cancel every session of the previous batch (hard barrier, see below)
//!   ├─ clock.next() -> generation g, board reset to g
//!   └─ for slot i: session i starts after i * stagger, with prompt variant i and
//!      temperature min(max, base + i * step)
//!        chunk / done / error  ──>  SlotUpdate { generation: g, .. }  ──>  board
//! ```
//!
//! Session callbacks hold the session's state lock while they publish, and cancelling a
//! session takes the same lock. So once [`GenerationManager::start_batch`] or
//! [`GenerationManager::cancel_batch`] returns, no update from the old batch can reach
//! the board or the observer. Updates that raced ahead are dropped anyway because the
//! board ignores stale generations.

use std::sync::{Arc, Mutex as StdMutex};

use tokio::{sync::mpsc::UnboundedSender, task::JoinSet};

use super::{CompletionRequest, CompletionTransport, GenerationSettings, OnChunk, OnDone,
            OnError, ProviderEndpoint, ReqwestTransport, SessionCallbacks, SessionState,
            SlotUpdate, StreamSession, SuggestionSlots, build_user_prompt, plan_slots};
use crate::{BatchError, DEBUG_GENERATION_MOD, EditorSyncEngine, GenerationClock,
            GenerationToken, ReplaceReport, RewriteAction, RewriteConfig, is_blank,
            lock_or_recover, try_get_api_key};

/// Upper bound on the parallel sessions of one batch.
pub const MAX_SLOT_COUNT: usize = 8;

/// The inputs of a batch, kept so that [`GenerationManager::refresh`] can replay them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub action: RewriteAction,
    pub source_text: String,
    pub slot_count: usize,
}

#[derive(Debug)]
struct GenerationBatch {
    generation: u64,
    token: GenerationToken,
    sessions: Vec<StreamSession>,
    tasks: JoinSet<SessionState>,
}

impl GenerationBatch {
    /// Returns the ids of the sessions this call moved to `Cancelled`.
    fn cancel_all(&self) -> Vec<usize> {
        let mut acc = vec![];
        for session in &self.sessions {
            let was_terminal = session.state().is_terminal();
            session.cancel();
            if !was_terminal && session.state() == SessionState::Cancelled {
                acc.push(session.id());
            }
        }
        self.token.cancel();
        acc
    }
}

type SharedBoard = Arc<StdMutex<SuggestionSlots>>;
type Observer = Option<UnboundedSender<SlotUpdate>>;

pub struct GenerationManager {
    transport: Arc<dyn CompletionTransport>,
    endpoint: ProviderEndpoint,
    config: RewriteConfig,
    settings: GenerationSettings,
    clock: GenerationClock,
    board: SharedBoard,
    observer: Observer,
    current: StdMutex<Option<GenerationBatch>>,
    last_request: StdMutex<Option<BatchRequest>>,
}

impl std::fmt::Debug for GenerationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationManager")
            .field("endpoint", &self.endpoint)
            .field("settings", &self.settings)
            .field("generation", &self.clock.current())
            .finish_non_exhaustive()
    }
}

impl GenerationManager {
    #[must_use]
    pub fn new(
        transport: Arc<dyn CompletionTransport>,
        endpoint: ProviderEndpoint,
        config: RewriteConfig,
    ) -> Self {
        Self {
            transport,
            endpoint,
            settings: GenerationSettings::from(&config),
            config,
            clock: GenerationClock::new(),
            board: Arc::new(StdMutex::new(SuggestionSlots::new())),
            observer: None,
            current: StdMutex::new(None),
            last_request: StdMutex::new(None),
        }
    }

    /// Wire up the real HTTP transport using the credentials in the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is set or the HTTP client can't be built.
    pub fn try_from_config(config: RewriteConfig) -> miette::Result<Self> {
        let transport = ReqwestTransport::try_new()?;
        let endpoint = ProviderEndpoint {
            url: config.endpoint.clone(),
            api_key: try_get_api_key()?,
        };
        Ok(Self::new(Arc::new(transport), endpoint, config))
    }

    /// Every update applied to the board is also sent to `sender`.
    #[must_use]
    pub fn with_observer(mut self, sender: UnboundedSender<SlotUpdate>) -> Self {
        self.observer = Some(sender);
        self
    }

    #[must_use]
    pub fn settings(&self) -> &GenerationSettings { &self.settings }

    /// Generation of the most recent batch, `0` before the first one.
    #[must_use]
    pub fn generation(&self) -> u64 { self.clock.current() }

    #[must_use]
    pub fn slots(&self) -> SuggestionSlots { lock_or_recover!(self.board).clone() }

    /// Handles to the sessions of the current batch.
    #[must_use]
    pub fn sessions(&self) -> Vec<StreamSession> {
        lock_or_recover!(self.current)
            .as_ref()
            .map(|it| it.sessions.clone())
            .unwrap_or_default()
    }

    /// [`start_batch_with_slots`](Self::start_batch_with_slots) with the configured slot
    /// count.
    ///
    /// # Errors
    ///
    /// See [`start_batch_with_slots`](Self::start_batch_with_slots).
    pub fn start_batch(
        &self,
        action: RewriteAction,
        source_text: &str,
    ) -> Result<u64, BatchError> {
        self.start_batch_with_slots(action, source_text, self.settings.slot_count)
    }

    /// Supersede the current batch with a new one and return its generation. Must be
    /// called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Only caller mistakes are errors: blank source text, zero slots, or more than
    /// [`MAX_SLOT_COUNT`] slots. Transport and provider failures end up in the affected
    /// slot.
    pub fn start_batch_with_slots(
        &self,
        action: RewriteAction,
        source_text: &str,
        slot_count: usize,
    ) -> Result<u64, BatchError> {
        if is_blank(source_text) {
            return Err(BatchError::EmptySourceText);
        }
        if slot_count == 0 {
            return Err(BatchError::ZeroSlots);
        }
        if slot_count > MAX_SLOT_COUNT {
            return Err(BatchError::TooManySlots {
                requested: slot_count,
                max: MAX_SLOT_COUNT,
            });
        }

        let request = BatchRequest {
            action,
            source_text: source_text.to_string(),
            slot_count,
        };
        *lock_or_recover!(self.last_request) = Some(request.clone());

        let mut current = lock_or_recover!(self.current);

        if let Some(old_batch) = current.take() {
            old_batch.cancel_all();
            DEBUG_GENERATION_MOD.then(|| {
                // % is Display, ? is Debug.
                tracing::debug!(
                    message = "Superseded batch",
                    generation = %old_batch.generation
                );
            });
            // Dropping the JoinSet aborts whatever is left of the old tasks.
            drop(old_batch);
        }

        let token = self.clock.next_token();
        let generation = token.generation();
        publish(
            &self.board,
            self.observer.as_ref(),
            SlotUpdate::BatchStarted {
                generation,
                slot_count,
            },
        );

        let settings = GenerationSettings {
            slot_count,
            ..self.settings.clone()
        };
        let base_prompt = self.config.resolve_prompt(&request.action);
        let mut sessions = Vec::with_capacity(slot_count);
        let mut tasks = JoinSet::new();

        for plan in plan_slots(&base_prompt, &settings) {
            let session = StreamSession::new(
                plan.index,
                plan.prompt_variant.clone(),
                plan.temperature_offset,
                token.child(),
            );
            let completion_request = CompletionRequest::new(
                &settings.model,
                build_user_prompt(&plan.prompt_variant, &request.source_text),
                settings.max_tokens,
                plan.temperature,
            );
            let callbacks = self.slot_callbacks(generation);
            let transport = self.transport.clone();
            let endpoint = self.endpoint.clone();
            let runner = session.clone();
            tasks.spawn(async move {
                runner
                    .run(
                        transport.as_ref(),
                        &endpoint,
                        &completion_request,
                        plan.start_delay,
                        &callbacks,
                    )
                    .await
            });
            sessions.push(session);
        }

        DEBUG_GENERATION_MOD.then(|| {
            // % is Display, ? is Debug.
            tracing::debug!(
                message = "Started batch",
                generation = %generation,
                action = %request.action,
                slot_count = %slot_count
            );
        });

        *current = Some(GenerationBatch {
            generation,
            token,
            sessions,
            tasks,
        });

        Ok(generation)
    }

    /// Cancel every live session of the current batch. Idempotent. Slots that already
    /// completed or failed keep their state.
    pub fn cancel_batch(&self) {
        let current = lock_or_recover!(self.current);
        let Some(batch) = current.as_ref() else {
            return;
        };
        for index in batch.cancel_all() {
            publish(
                &self.board,
                self.observer.as_ref(),
                SlotUpdate::Cancelled {
                    generation: batch.generation,
                    index,
                },
            );
        }
    }

    /// Cancel one slot of the current batch. Returns `false` if there's no such live
    /// slot.
    pub fn cancel_slot(&self, index: usize) -> bool {
        let current = lock_or_recover!(self.current);
        let Some(batch) = current.as_ref() else {
            return false;
        };
        let Some(session) = batch.sessions.iter().find(|it| it.id() == index) else {
            return false;
        };
        if session.state().is_terminal() {
            return false;
        }
        session.cancel();
        publish(
            &self.board,
            self.observer.as_ref(),
            SlotUpdate::Cancelled {
                generation: batch.generation,
                index,
            },
        )
    }

    /// Hide path: cancel the batch and clear the board.
    pub fn dismiss(&self) {
        self.cancel_batch();
        let generation = self.clock.current();
        publish(
            &self.board,
            self.observer.as_ref(),
            SlotUpdate::Cleared { generation },
        );
        lock_or_recover!(self.current).take();
    }

    /// Start a fresh batch for the last `(action, source text)` pair.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::NothingToRefresh`] if no batch was ever started.
    pub fn refresh(&self) -> Result<u64, BatchError> {
        let last_request = lock_or_recover!(self.last_request).clone();
        match last_request {
            Some(it) => self.start_batch_with_slots(it.action, &it.source_text, it.slot_count),
            None => Err(BatchError::NothingToRefresh),
        }
    }

    /// Wait until every session of the current batch has reached a terminal state, then
    /// return the board.
    pub async fn settled(&self) -> SuggestionSlots {
        let tasks = lock_or_recover!(self.current)
            .as_mut()
            .map(|it| std::mem::take(&mut it.tasks));

        if let Some(mut tasks) = tasks {
            while let Some(result) = tasks.join_next().await {
                if let Err(error) = result
                    && error.is_panic()
                {
                    // % is Display, ? is Debug.
                    tracing::error!(message = "Stream session task panicked", error = %error);
                }
            }
        }

        self.slots()
    }

    /// Text of slot `index` if it completed.
    #[must_use]
    pub fn candidate(&self, index: usize) -> Option<String> {
        lock_or_recover!(self.board)
            .slot(index)
            .and_then(|it| it.candidate().map(str::to_string))
    }

    /// Hand the text of a completed slot to `engine`. The batch is dismissed first, the
    /// same way picking a suggestion closes the suggestion box. `None` if the slot has no
    /// completed text.
    pub async fn accept_candidate(
        &self,
        index: usize,
        engine: &EditorSyncEngine,
    ) -> Option<ReplaceReport> {
        let text = self.candidate(index)?;
        self.dismiss();
        Some(engine.replace(&text).await)
    }

    fn slot_callbacks(&self, generation: u64) -> SessionCallbacks {
        let on_chunk: OnChunk = {
            let board = self.board.clone();
            let observer = self.observer.clone();
            Arc::new(move |index, delta, accumulated| {
                publish(
                    &board,
                    observer.as_ref(),
                    SlotUpdate::Chunk {
                        generation,
                        index,
                        delta: delta.to_string(),
                        accumulated: accumulated.to_string(),
                    },
                );
            })
        };

        let on_done: OnDone = {
            let board = self.board.clone();
            let observer = self.observer.clone();
            Arc::new(move |index, text| {
                publish(
                    &board,
                    observer.as_ref(),
                    SlotUpdate::Completed {
                        generation,
                        index,
                        text: text.to_string(),
                    },
                );
            })
        };

        let on_error: OnError = {
            let board = self.board.clone();
            let observer = self.observer.clone();
            Arc::new(move |index, error| {
                publish(
                    &board,
                    observer.as_ref(),
                    SlotUpdate::failed(generation, index, error),
                );
            })
        };

        SessionCallbacks {
            on_chunk,
            on_done,
            on_error,
        }
    }
}

/// Apply `update` to the board and forward it to the observer if the board took it.
/// The send happens under the board lock so the observer sees updates in board order.
fn publish(
    board: &StdMutex<SuggestionSlots>,
    observer: Option<&UnboundedSender<SlotUpdate>>,
    update: SlotUpdate,
) -> bool {
    let mut board = lock_or_recover!(board);
    let applied = board.apply(&update);
    if applied && let Some(sender) = observer {
        sender.send(update).ok();
    }
    applied
}
