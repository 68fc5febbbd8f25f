//! State machine module - Replay name histories as lifecycle events

pub mod covenant;
pub mod event;
pub mod replay;

// Re-export key types
pub use covenant::{CovenantEvents, covenant_events};
pub use event::{ClassifiedEvent, LifecycleEvent, TerminalNotice};
pub use replay::{EventEntry, NameReport, NameStatus, replay, replay_entry};
