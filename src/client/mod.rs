//! Client side of the board: a query cache kept consistent with the store
//! through optimistic mutations, and the drag gesture that produces them.

pub mod api;
pub mod cache;
pub mod drag;
pub mod optimistic;

pub use api::{BoardApi, LocalApi};
pub use cache::{CachedValue, QueryCache, QueryKey};
pub use drag::{DragController, DragState, DropIntent, DropRequest, DropTarget};
pub use optimistic::BoardClient;
