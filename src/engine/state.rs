// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Engine lifecycle.
//!
//! Index events can arrive before the engine has loaded its cache. The
//! handle is a small state machine that buffers them:
//!
//! ```text
//! Uninitialized ──ensure_initialized──▶ Initializing ──(load or rebuild,
//!      │                                    │            replay queue)──▶ Ready
//!      └── index/delete: queued ◀───────────┘
//! ```
//!
//! Exactly one caller runs initialization; any other caller of
//! [`EngineHandle::ensure_initialized`] blocks until the engine is ready.
//! If initialization panics, the handle returns to `Uninitialized` and a
//! waiting caller takes over.

use parking_lot::{Condvar, Mutex};
use tracing::{debug, info, warn};

use crate::types::ResultPage;

use super::SearchEngine;

/// An index mutation received before the engine was ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    Index(String),
    Delete(String),
}

/// Where the handle is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Initializing,
    Ready,
}

/// Hands initialization back to the next caller if it unwinds.
struct InitGuard<'a> {
    handle: &'a EngineHandle,
    armed: bool,
}

impl Drop for InitGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("engine initialization unwound, resetting");
            self.handle.lifecycle.lock().state = EngineState::Uninitialized;
            self.handle.ready.notify_all();
        }
    }
}

#[derive(Debug)]
struct Lifecycle {
    state: EngineState,
    queue: Vec<PendingAction>,
}

/// Owning context for a [`SearchEngine`] and its startup queue.
#[derive(Debug)]
pub struct EngineHandle {
    engine: SearchEngine,
    lifecycle: Mutex<Lifecycle>,
    ready: Condvar,
}

impl EngineHandle {
    pub fn new(engine: SearchEngine) -> Self {
        Self {
            engine,
            lifecycle: Mutex::new(Lifecycle {
                state: EngineState::Uninitialized,
                queue: Vec::new(),
            }),
            ready: Condvar::new(),
        }
    }

    pub fn state(&self) -> EngineState {
        self.lifecycle.lock().state
    }

    /// Actions waiting for the engine.
    pub fn pending(&self) -> Vec<PendingAction> {
        self.lifecycle.lock().queue.clone()
    }

    /// The engine, once it is ready.
    pub fn engine(&self) -> Option<&SearchEngine> {
        (self.state() == EngineState::Ready).then_some(&self.engine)
    }

    /// Index `id` now, or queue it until the engine is ready.
    pub fn index(&self, id: &str) {
        self.submit(PendingAction::Index(id.to_string()));
    }

    /// Delete `id` now, or queue it until the engine is ready.
    pub fn delete(&self, id: &str) {
        self.submit(PendingAction::Delete(id.to_string()));
    }

    fn submit(&self, action: PendingAction) {
        {
            let mut lifecycle = self.lifecycle.lock();
            if lifecycle.state != EngineState::Ready {
                debug!(?action, "engine not ready, queueing");
                lifecycle.queue.push(action);
                return;
            }
        }
        self.apply(&action);
    }

    fn apply(&self, action: &PendingAction) {
        match action {
            PendingAction::Index(id) => {
                self.engine.index_one(id);
            }
            PendingAction::Delete(id) => {
                self.engine.delete_one(id);
            }
        }
    }

    /// Bring the engine up: load the cached index, or rebuild it when there
    /// is no usable cache, then replay queued actions in arrival order.
    pub fn ensure_initialized(&self) -> &SearchEngine {
        {
            let mut lifecycle = self.lifecycle.lock();
            loop {
                match lifecycle.state {
                    EngineState::Ready => return &self.engine,
                    EngineState::Initializing => self.ready.wait(&mut lifecycle),
                    EngineState::Uninitialized => {
                        lifecycle.state = EngineState::Initializing;
                        break;
                    }
                }
            }
        }

        let mut guard = InitGuard {
            handle: self,
            armed: true,
        };
        if !self.engine.load_from_cache() {
            self.engine.full_reindex();
        }

        // actions can keep arriving while earlier ones replay
        loop {
            let batch = {
                let mut lifecycle = self.lifecycle.lock();
                if lifecycle.queue.is_empty() {
                    guard.armed = false;
                    lifecycle.state = EngineState::Ready;
                    self.ready.notify_all();
                    break;
                }
                std::mem::take(&mut lifecycle.queue)
            };
            info!(count = batch.len(), "replaying queued index actions");
            for action in &batch {
                self.apply(action);
            }
        }
        &self.engine
    }

    /// Parse and run a query, initializing the engine first if needed.
    pub fn search(&self, raw: &str) -> Vec<ResultPage> {
        let engine = self.ensure_initialized();
        engine.search(&engine.parse_query(raw), None)
    }
}
