//! Field-mapping editor core for placing data-bound fields on PDF templates.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! editor's interaction model: translating raw DOM input events into field
//! mutations, tracking unsaved edits and autosave, hit-testing fields and
//! their resize handles, and drawing the field overlay above the rendered PDF
//! page. The host layer only wires DOM events and timers to the engine and
//! carries out the resulting [`engine::Action`]s (network saves, listener
//! attach/detach, notices).
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`doc`] | Editor field type and the ordered [`doc::FieldStore`] |
//! | [`input`] | Editor modes, the gesture state machine, move/resize math |
//! | [`hit`] | Hit-testing against field bodies and resize handles |
//! | [`viewport`] | Screen ↔ canvas conversion and zoom |
//! | [`persist`] | Dirty tracking, save tickets, exit guard |
//! | [`autosave`] | Single-shot debounce timer |
//! | [`net`] | HTTP client for the template endpoints |
//! | [`render`] | Field overlay rendering |
//! | [`consts`] | Shared numeric constants (thresholds, timings, zoom limits) |

pub mod autosave;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod hit;
pub mod input;
pub mod net;
pub mod persist;
pub mod render;
pub mod viewport;
