//! Persistence bridge: dirty tracking, manual save, autosave, exit guard.
//!
//! DESIGN
//! ======
//! The bridge never performs I/O. It hands the host a [`SaveRequest`] and
//! later receives the result by ticket. Every mutation bumps a generation
//! counter; a request remembers the generation it snapshotted, so a save that
//! completes after further edits leaves the template dirty instead of
//! silently dropping those edits.
//!
//! Only one save is in flight at a time. An autosave that comes due while a
//! save is in flight is pushed back by another delay.
//!
//! ERROR HANDLING
//! ==============
//! Manual-save failures are returned to the engine as a blocking notice.
//! Autosave failures are logged and the timer re-armed so the next cycle
//! retries. Both leave the template dirty.

#[cfg(test)]
#[path = "persist_test.rs"]
mod persist_test;

use fields::template::{Template, TemplateSaveBody};
use fields::FieldId;
use tracing::{error, info, warn};

use crate::autosave::AutosaveTimer;
use crate::consts::AUTOSAVE_DELAY_MS;
use crate::doc::FieldStore;
use crate::net::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Manual,
    Autosave,
}

/// A save the host must send as `PUT /templates/{template_id}`.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub ticket: u64,
    pub kind: SaveKind,
    pub template_id: i64,
    pub body: TemplateSaveBody,
}

#[derive(Debug, Clone)]
struct PendingSave {
    ticket: u64,
    kind: SaveKind,
    generation: u64,
    sent_ids: Vec<FieldId>,
}

/// How a completed save was resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveResolution {
    Saved {
        kind: SaveKind,
        /// `(temporary, server-issued)` id pairs adopted into the store.
        adopted: Vec<(FieldId, FieldId)>,
        /// Edits happened while the request was in flight.
        still_dirty: bool,
    },
    ManualFailed(String),
    AutosaveFailed,
    /// The ticket did not match the in-flight save.
    Stale,
}

/// Where the operator was trying to go when the exit guard fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitTarget {
    /// Tab close or reload.
    Unload,
    /// Browser back.
    Back,
    /// In-app link.
    Navigate(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitDecision {
    Proceed(ExitTarget),
    Confirm,
}

#[derive(Debug)]
pub struct SaveBridge {
    dirty: bool,
    generation: u64,
    next_ticket: u64,
    autosave: AutosaveTimer,
    in_flight: Option<PendingSave>,
    pending_exit: Option<ExitTarget>,
}

impl Default for SaveBridge {
    fn default() -> Self {
        Self::new(AUTOSAVE_DELAY_MS)
    }
}

impl SaveBridge {
    #[must_use]
    pub fn new(autosave_delay_ms: f64) -> Self {
        Self {
            dirty: false,
            generation: 0,
            next_ticket: 1,
            autosave: AutosaveTimer::new(autosave_delay_ms),
            in_flight: None,
            pending_exit: None,
        }
    }

    /// Forget all state, e.g. after loading a different template.
    pub fn reset(&mut self) {
        self.dirty = false;
        self.generation = 0;
        self.autosave.cancel();
        self.in_flight = None;
        self.pending_exit = None;
    }

    /// Record a real edit and restart the autosave countdown.
    pub fn mark_dirty(&mut self, now: f64) {
        self.dirty = true;
        self.generation += 1;
        self.autosave.arm_on_dirty(now);
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    #[must_use]
    pub fn autosave(&self) -> &AutosaveTimer {
        &self.autosave
    }

    /// Start a save of the current store. Returns `None` if a save is
    /// already in flight or the body cannot be encoded.
    pub fn begin_save(&mut self, kind: SaveKind, store: &FieldStore, template: &Template) -> Option<SaveRequest> {
        if self.in_flight.is_some() {
            return None;
        }
        let body = match template.save_body(&store.to_records()) {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, template_id = template.id, "failed to encode fields for save");
                return None;
            }
        };

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.autosave.cancel();
        self.in_flight = Some(PendingSave {
            ticket,
            kind,
            generation: self.generation,
            sent_ids: store.persisted_ids(),
        });

        Some(SaveRequest { ticket, kind, template_id: template.id, body })
    }

    /// Drive the autosave timer. Returns a request when one is due.
    pub fn poll(&mut self, now: f64, store: &FieldStore, template: Option<&Template>) -> Option<SaveRequest> {
        if !self.autosave.poll(now) {
            return None;
        }
        if self.in_flight.is_some() {
            self.autosave.arm_on_dirty(now);
            return None;
        }
        if !self.dirty {
            return None;
        }
        let template = template?;
        self.begin_save(SaveKind::Autosave, store, template)
    }

    /// Resolve the in-flight save identified by `ticket`.
    ///
    /// On success, temporary ids that were sent are replaced by the ids the
    /// server returned at the same position.
    pub fn complete(
        &mut self,
        ticket: u64,
        result: Result<&Template, &ApiError>,
        store: &mut FieldStore,
        now: f64,
    ) -> SaveResolution {
        let Some(pending) = self.in_flight.take_if(|p| p.ticket == ticket) else {
            warn!(ticket, "ignoring result for unknown save");
            return SaveResolution::Stale;
        };

        match result {
            Ok(saved) => {
                let adopted = adopt_ids(&pending.sent_ids, saved, store);
                let still_dirty = pending.generation != self.generation;
                if still_dirty {
                    self.autosave.arm_on_dirty(now);
                } else {
                    self.dirty = false;
                    self.autosave.cancel();
                }
                info!(template_id = saved.id, version = saved.version, still_dirty, "template saved");
                SaveResolution::Saved { kind: pending.kind, adopted, still_dirty }
            }
            Err(e) => match pending.kind {
                SaveKind::Manual => {
                    error!(error = %e, "manual save failed");
                    self.autosave.arm_on_dirty(now);
                    SaveResolution::ManualFailed(e.user_message())
                }
                SaveKind::Autosave => {
                    warn!(error = %e, "autosave failed; will retry");
                    self.autosave.arm_on_dirty(now);
                    SaveResolution::AutosaveFailed
                }
            },
        }
    }

    /// Ask to leave the editor.
    pub fn request_exit(&mut self, target: ExitTarget) -> ExitDecision {
        if !self.dirty {
            return ExitDecision::Proceed(target);
        }
        self.pending_exit = Some(target);
        ExitDecision::Confirm
    }

    /// Answer the exit prompt. Discarding clears the dirty state and
    /// returns where to go; continuing editing returns `None`.
    pub fn resolve_exit(&mut self, discard: bool) -> Option<ExitTarget> {
        let target = self.pending_exit.take()?;
        if !discard {
            return None;
        }
        self.dirty = false;
        self.autosave.cancel();
        Some(target)
    }

    #[must_use]
    pub fn exit_pending(&self) -> bool {
        self.pending_exit.is_some()
    }
}

fn adopt_ids(sent: &[FieldId], saved: &Template, store: &mut FieldStore) -> Vec<(FieldId, FieldId)> {
    if sent.len() != saved.fields.len() {
        if sent.iter().any(FieldId::is_temporary) {
            warn!(sent = sent.len(), returned = saved.fields.len(), "field count changed on save; keeping temporary ids");
        }
        return Vec::new();
    }

    let mut adopted = Vec::new();
    for (old, record) in sent.iter().zip(&saved.fields) {
        if !old.is_temporary() {
            continue;
        }
        let Some(new) = record.id.clone().filter(|id| id.as_persisted().is_some()) else {
            continue;
        };
        if store.replace_id(old, new.clone()) {
            adopted.push((old.clone(), new));
        }
    }
    adopted
}
