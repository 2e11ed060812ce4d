//! Per-dataset marker lifecycle: grouping, clustering and the switch between
//! clustered and flat rendering as the zoom level changes.

pub mod controller;
pub mod debounce;
pub mod state;

pub use controller::{MarkerController, SyncReport};
pub use debounce::Debouncer;
pub use state::RenderState;
