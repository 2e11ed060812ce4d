//! Uploaded datasets: selection, colours and session persistence

pub mod manager;
pub mod palette;

pub use manager::{DatasetManager, DatasetStats, SessionState};
pub use palette::{available_color, PALETTE};
