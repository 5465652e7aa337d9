//! Network layer - call execution off the UI thread
//!
//! The dispatch actor receives execute commands and sends back
//! lifecycle events.

pub mod actor;
pub mod client;

pub use actor::{DispatchActor, Dispatcher};
