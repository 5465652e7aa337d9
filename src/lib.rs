//! # Rester
//!
//! A terminal REST client - compose calls, fire them off, inspect the
//! responses.
//!
//! ## Features
//! - HTTP methods: GET, POST, PUT, DELETE
//! - Editable query params, headers, auth and body per call
//! - Unsaved-change tracking against the last saved baseline
//! - Collections persisted as YAML
//! - cURL import/export
//! - JSON formatting with line numbers and syntax highlighting
//! - Export the response body to $EDITOR
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (State machine)
//! - Dispatch Layer (Tokio runtime)
//!
//! Every accepted submission produces a `Loading` event and then exactly
//! one terminal event; stale events from an abandoned submission are
//! dropped by the app layer.

pub mod constants;
pub mod models;
pub mod storage;
pub mod ui;
pub mod curl;
pub mod error;
pub mod export;
pub mod messages;
pub mod app;
pub mod network;

// Re-export commonly used types
pub use models::{Auth, Call, CallResult, Collection, Method, Row};
pub use curl::{parse_curl, to_curl};
pub use messages::{CallEvent, DispatchCommand, RenderState, UiEvent};
pub use app::{AppState, AppActor};
pub use network::{DispatchActor, Dispatcher};
