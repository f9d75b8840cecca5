//! Branching conversation graph: in-memory store, tree-shaped node/edge
//! model, and ancestry-based context reconstruction.

pub mod context;
pub mod models;
pub mod store;

pub use context::{build_context, BuiltContext};
pub use models::{Conversation, Edge, Node};
pub use store::{GraphStore, StoreError};
