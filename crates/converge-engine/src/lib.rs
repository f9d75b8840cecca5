//! Streaming orchestrator for branching turns: one spawned task per
//! connection, relaying tokens from the first accepting candidate model.

pub mod events;
pub mod orchestrator;

pub use events::{BranchRequest, TurnEvent, TurnMetadata};
pub use orchestrator::{Orchestrator, AUTO_SELECTED_MODEL};
