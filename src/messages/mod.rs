//! Message types for inter-layer communication in the actor-based architecture.
//!
//! This module defines all messages that flow between the UI, App, and
//! dispatch layers.

pub mod dispatch;
pub mod render;
pub mod ui_events;

pub use dispatch::{CallEvent, DispatchCommand, RequestSpec, Submission};
pub use render::RenderState;
pub use ui_events::UiEvent;
